use std::sync::Arc;

use time::Duration;
use uuid::Uuid;

use super::{Scripted, ScriptedOracle, person, seed, settings};
use reunite_domain::{MatchPolicy, PersonRecord, PersonStatus, Population};
use reunite_service::{MemoryStore, MatchSettings, RecordStore, ReuniteService};

struct Fixture {
	store: MemoryStore,
	subject: PersonRecord,
	candidates: Vec<PersonRecord>,
}

/// One unknown subject and three missing candidates scoring 0.88, 0.96 and 0.90, oldest first.
async fn fixture(oracle: &ScriptedOracle) -> Fixture {
	let store = MemoryStore::new();
	let subject = person(Population::Unknown, Some(1.0), Some(Uuid::new_v4()));
	let mut candidates = Vec::new();

	for (i, (tag, score)) in [(2.0, 0.88), (3.0, 0.96), (4.0, 0.90)].into_iter().enumerate() {
		let mut candidate = person(Population::Missing, Some(tag), Some(Uuid::new_v4()));

		candidate.created_at -= Duration::minutes(10 - i as i64);
		oracle.script(1.0, tag, Scripted::Score(score));
		seed(&store, &candidate).await;
		candidates.push(candidate);
	}

	seed(&store, &subject).await;

	Fixture { store, subject, candidates }
}

fn service(
	store: &MemoryStore,
	oracle: Arc<ScriptedOracle>,
	settings: MatchSettings,
) -> ReuniteService {
	ReuniteService::with_parts(Arc::new(store.clone()), oracle, settings)
}

#[tokio::test]
async fn all_qualifying_matches_every_candidate_above_threshold() {
	let oracle = Arc::new(ScriptedOracle::new());
	let Fixture { store, subject, candidates } = fixture(&oracle).await;
	let service = service(&store, oracle.clone(), settings(MatchPolicy::AllQualifying));
	let report = service.scan(&subject).await;

	assert_eq!(report.matched, 3);
	assert_eq!(store.match_count().await, 3);

	let stored = store
		.get_person(Population::Unknown, subject.person_id)
		.await
		.expect("Failed to load person.")
		.expect("Person must exist.");

	assert_eq!(stored.status, PersonStatus::Resolved);
	// Candidates are handled oldest first with a single scoring slot, so the first one wins the
	// back reference.
	assert_eq!(stored.matched_with, Some(candidates[0].person_id));

	for candidate in &candidates {
		let stored = store
			.get_person(Population::Missing, candidate.person_id)
			.await
			.expect("Failed to load person.")
			.expect("Person must exist.");

		assert_eq!(stored.status, PersonStatus::Resolved);
		assert_eq!(stored.matched_with, Some(subject.person_id));
	}
}

#[tokio::test]
async fn best_only_matches_the_top_candidate() {
	let oracle = Arc::new(ScriptedOracle::new());
	let Fixture { store, subject, candidates } = fixture(&oracle).await;
	let service = service(&store, oracle.clone(), settings(MatchPolicy::BestOnly));
	let report = service.scan(&subject).await;
	let matches = store.all_matches().await;

	assert_eq!(report.scored, 3);
	assert_eq!(report.matched, 1);
	assert_eq!(matches.len(), 1);
	assert_eq!(matches[0].missing_id, candidates[1].person_id);

	let untouched = store
		.get_person(Population::Missing, candidates[0].person_id)
		.await
		.expect("Failed to load person.")
		.expect("Person must exist.");

	assert_eq!(untouched.status, PersonStatus::Unresolved);
}

#[tokio::test]
async fn best_only_tie_goes_to_the_oldest_candidate_under_parallel_scoring() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = MemoryStore::new();
	let subject = person(Population::Missing, Some(1.0), None);
	let mut older = person(Population::Unknown, Some(2.0), None);
	let newer = person(Population::Unknown, Some(3.0), None);

	older.created_at -= Duration::minutes(5);
	oracle.script(1.0, 2.0, Scripted::Score(0.91));
	oracle.script(1.0, 3.0, Scripted::Score(0.91));
	seed(&store, &newer).await;
	seed(&store, &older).await;

	let settings = MatchSettings { candidate_concurrency: 4, ..settings(MatchPolicy::BestOnly) };
	let service = service(&store, oracle.clone(), settings);

	service.scan(&subject).await;

	let matches = store.all_matches().await;

	assert_eq!(matches.len(), 1);
	assert_eq!(matches[0].unknown_id, older.person_id);
}

#[tokio::test]
async fn parallel_scoring_reaches_the_same_matches() {
	let oracle = Arc::new(ScriptedOracle::new());
	let Fixture { store, subject, .. } = fixture(&oracle).await;
	let settings =
		MatchSettings { candidate_concurrency: 4, ..settings(MatchPolicy::AllQualifying) };
	let service = service(&store, oracle.clone(), settings);
	let report = service.scan(&subject).await;

	assert_eq!(report.candidates, 3);
	assert_eq!(report.scored, 3);
	assert_eq!(report.matched, 3);
	assert_eq!(oracle.similarity_calls(), 3);
}
