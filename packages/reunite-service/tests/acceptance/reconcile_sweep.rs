use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{Scripted, ScriptedOracle, build_service, person, seed, settings};
use reunite_domain::{
	MatchPair, MatchPolicy, MatchRecord, MatchStatus, NotificationRecord, PersonRecord,
	PersonStatus, Population, SimilarityScore,
};
use reunite_service::{
	BoxFuture, Error, MatchSettings, MemoryStore, RecordStore, Result, ReuniteService, SweepReport,
};

/// Memory store that can be told to fail resolving unknown persons and creating notifications.
#[derive(Default)]
struct FlakyStore {
	inner: MemoryStore,
	fail_unknown_resolve: AtomicBool,
	fail_notifications: AtomicBool,
}
impl FlakyStore {
	fn heal(&self) {
		self.fail_unknown_resolve.store(false, Ordering::SeqCst);
		self.fail_notifications.store(false, Ordering::SeqCst);
	}
}

fn outage() -> Error {
	Error::Storage { message: "connection reset by peer".to_string() }
}

impl RecordStore for FlakyStore {
	fn insert_person<'a>(&'a self, record: &'a PersonRecord) -> BoxFuture<'a, Result<()>> {
		self.inner.insert_person(record)
	}

	fn get_person<'a>(
		&'a self,
		population: Population,
		person_id: Uuid,
	) -> BoxFuture<'a, Result<Option<PersonRecord>>> {
		self.inner.get_person(population, person_id)
	}

	fn list_scan_candidates<'a>(
		&'a self,
		population: Population,
	) -> BoxFuture<'a, Result<Vec<PersonRecord>>> {
		self.inner.list_scan_candidates(population)
	}

	fn resolve_person<'a>(
		&'a self,
		population: Population,
		person_id: Uuid,
		matched_with: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<PersonRecord>>> {
		if population == Population::Unknown && self.fail_unknown_resolve.load(Ordering::SeqCst) {
			return Box::pin(async { Err(outage()) });
		}

		self.inner.resolve_person(population, person_id, matched_with, now)
	}

	fn insert_match<'a>(
		&'a self,
		record: &'a MatchRecord,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>> {
		self.inner.insert_match(record)
	}

	fn get_match_by_pair<'a>(
		&'a self,
		pair: MatchPair,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>> {
		self.inner.get_match_by_pair(pair)
	}

	fn list_matches_needing_reconcile<'a>(
		&'a self,
		created_before: OffsetDateTime,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>> {
		self.inner.list_matches_needing_reconcile(created_before, limit)
	}

	fn insert_notification<'a>(
		&'a self,
		record: &'a NotificationRecord,
	) -> BoxFuture<'a, Result<bool>> {
		if self.fail_notifications.load(Ordering::SeqCst) {
			return Box::pin(async { Err(outage()) });
		}

		self.inner.insert_notification(record)
	}

	fn list_notifications<'a>(
		&'a self,
		recipient_id: Uuid,
	) -> BoxFuture<'a, Result<Vec<NotificationRecord>>> {
		self.inner.list_notifications(recipient_id)
	}

	fn mark_notification_read<'a>(
		&'a self,
		notification_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<NotificationRecord>>> {
		self.inner.mark_notification_read(notification_id, now)
	}
}

async fn status_of(store: &dyn RecordStore, population: Population, id: Uuid) -> PersonRecord {
	store
		.get_person(population, id)
		.await
		.expect("Failed to load person.")
		.expect("Person must exist.")
}

#[tokio::test]
async fn sweep_completes_a_partially_failed_match() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = Arc::new(FlakyStore::default());
	let service = build_service(store.clone(), oracle.clone(), MatchPolicy::AllQualifying);
	let missing = person(Population::Missing, Some(1.0), Some(Uuid::new_v4()));
	let unknown = person(Population::Unknown, Some(2.0), Some(Uuid::new_v4()));

	oracle.script(1.0, 2.0, Scripted::Score(0.9));
	seed(store.as_ref(), &missing).await;
	seed(store.as_ref(), &unknown).await;
	store.fail_unknown_resolve.store(true, Ordering::SeqCst);
	store.fail_notifications.store(true, Ordering::SeqCst);

	let report = service.scan(&missing).await;

	assert_eq!(report.matched, 1);
	assert_eq!(store.inner.match_count().await, 1);
	assert_eq!(store.inner.notification_count().await, 0);
	// The missing side is resolved even though the unknown side failed.
	assert_eq!(
		status_of(store.as_ref(), Population::Missing, missing.person_id).await.status,
		PersonStatus::Resolved
	);
	assert_eq!(
		status_of(store.as_ref(), Population::Unknown, unknown.person_id).await.status,
		PersonStatus::Unresolved
	);

	let blocked = service.sweep_once().await.expect("Failed to sweep.");

	assert_eq!(blocked, SweepReport { examined: 1, reconciled: 0, notified: 0 });

	store.heal();

	let healed = service.sweep_once().await.expect("Failed to sweep.");

	assert_eq!(healed, SweepReport { examined: 1, reconciled: 1, notified: 2 });

	let unknown_now = status_of(store.as_ref(), Population::Unknown, unknown.person_id).await;

	assert_eq!(unknown_now.status, PersonStatus::Resolved);
	assert_eq!(unknown_now.matched_with, Some(missing.person_id));

	let quiet = service.sweep_once().await.expect("Failed to sweep.");

	assert_eq!(quiet, SweepReport::default());
	assert_eq!(store.inner.notification_count().await, 2);
}

#[tokio::test]
async fn sweep_ignores_rejected_matches() {
	let store = MemoryStore::new();
	let service = build_service(
		Arc::new(store.clone()),
		Arc::new(ScriptedOracle::new()),
		MatchPolicy::AllQualifying,
	);
	let missing = person(Population::Missing, Some(1.0), Some(Uuid::new_v4()));
	let unknown = person(Population::Unknown, Some(2.0), Some(Uuid::new_v4()));
	let pair = MatchPair { missing_id: missing.person_id, unknown_id: unknown.person_id };
	let score = SimilarityScore::new(0.9).expect("Score must be in range.");
	let mut rejected = MatchRecord::pending(pair, score, OffsetDateTime::now_utc());

	rejected.status = MatchStatus::Rejected;
	seed(&store, &missing).await;
	seed(&store, &unknown).await;
	store.insert_match(&rejected).await.expect("Failed to insert match.");

	let report = service.sweep_once().await.expect("Failed to sweep.");

	assert_eq!(report, SweepReport::default());
	assert_eq!(store.notification_count().await, 0);
}

#[tokio::test]
async fn sweep_leaves_young_matches_to_their_scan() {
	let store = MemoryStore::new();
	let settings =
		MatchSettings { sweep_grace: Duration::seconds(30), ..settings(MatchPolicy::AllQualifying) };
	let service = ReuniteService::with_parts(
		Arc::new(store.clone()),
		Arc::new(ScriptedOracle::new()),
		settings,
	);
	let score = SimilarityScore::new(0.9).expect("Score must be in range.");
	let now = OffsetDateTime::now_utc();
	let mut ids = Vec::new();

	for age in [Duration::ZERO, Duration::minutes(2)] {
		let missing = person(Population::Missing, Some(1.0), None);
		let unknown = person(Population::Unknown, Some(2.0), None);
		let pair = MatchPair { missing_id: missing.person_id, unknown_id: unknown.person_id };
		let record = MatchRecord::pending(pair, score, now - age);

		seed(&store, &missing).await;
		seed(&store, &unknown).await;
		store.insert_match(&record).await.expect("Failed to insert match.");
		ids.push(pair);
	}

	let report = service.sweep_once().await.expect("Failed to sweep.");

	assert_eq!(report, SweepReport { examined: 1, reconciled: 1, notified: 0 });

	let young = status_of(&store, Population::Missing, ids[0].missing_id).await;
	let old = status_of(&store, Population::Missing, ids[1].missing_id).await;

	assert_eq!(young.status, PersonStatus::Unresolved);
	assert_eq!(old.status, PersonStatus::Resolved);
	assert_eq!(old.matched_with, Some(ids[1].unknown_id));
}

#[tokio::test]
async fn sweep_with_an_unbounded_grace_examines_nothing() {
	let store = MemoryStore::new();
	let settings =
		MatchSettings { sweep_grace: Duration::MAX, ..settings(MatchPolicy::AllQualifying) };
	let service = ReuniteService::with_parts(
		Arc::new(store.clone()),
		Arc::new(ScriptedOracle::new()),
		settings,
	);
	let missing = person(Population::Missing, Some(1.0), None);
	let unknown = person(Population::Unknown, Some(2.0), None);
	let pair = MatchPair { missing_id: missing.person_id, unknown_id: unknown.person_id };
	let score = SimilarityScore::new(0.9).expect("Score must be in range.");
	let old = OffsetDateTime::now_utc() - Duration::days(3_650);

	seed(&store, &missing).await;
	seed(&store, &unknown).await;
	store
		.insert_match(&MatchRecord::pending(pair, score, old))
		.await
		.expect("Failed to insert match.");

	let report = service.sweep_once().await.expect("Sweep must not fail on an extreme grace.");

	assert_eq!(report, SweepReport::default());

	let untouched = status_of(&store, Population::Missing, missing.person_id).await;

	assert_eq!(untouched.status, PersonStatus::Unresolved);
}

#[tokio::test]
async fn sweep_with_a_zero_batch_examines_nothing() {
	let store = MemoryStore::new();
	let settings = MatchSettings { sweep_batch_size: 0, ..settings(MatchPolicy::AllQualifying) };
	let service = ReuniteService::with_parts(
		Arc::new(store.clone()),
		Arc::new(ScriptedOracle::new()),
		settings,
	);
	let missing = person(Population::Missing, Some(1.0), None);
	let unknown = person(Population::Unknown, Some(2.0), None);
	let pair = MatchPair { missing_id: missing.person_id, unknown_id: unknown.person_id };
	let score = SimilarityScore::new(0.9).expect("Score must be in range.");

	seed(&store, &missing).await;
	seed(&store, &unknown).await;
	store
		.insert_match(&MatchRecord::pending(pair, score, OffsetDateTime::now_utc()))
		.await
		.expect("Failed to insert match.");

	let report = service.sweep_once().await.expect("Failed to sweep.");

	assert_eq!(report, SweepReport::default());
}

#[tokio::test]
async fn sweep_respects_the_batch_size() {
	let store = MemoryStore::new();
	let settings = MatchSettings { sweep_batch_size: 2, ..settings(MatchPolicy::AllQualifying) };
	let service = ReuniteService::with_parts(
		Arc::new(store.clone()),
		Arc::new(ScriptedOracle::new()),
		settings,
	);
	let score = SimilarityScore::new(0.88).expect("Score must be in range.");

	for _ in 0..3 {
		let missing = person(Population::Missing, Some(1.0), None);
		let unknown = person(Population::Unknown, Some(2.0), None);
		let pair = MatchPair { missing_id: missing.person_id, unknown_id: unknown.person_id };

		seed(&store, &missing).await;
		seed(&store, &unknown).await;
		store
			.insert_match(&MatchRecord::pending(pair, score, OffsetDateTime::now_utc()))
			.await
			.expect("Failed to insert match.");
	}

	let first = service.sweep_once().await.expect("Failed to sweep.");
	let second = service.sweep_once().await.expect("Failed to sweep.");

	assert_eq!(first.examined, 2);
	assert_eq!(second.examined, 1);
}
