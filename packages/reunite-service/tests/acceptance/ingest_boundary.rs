use std::sync::Arc;

use uuid::Uuid;

use super::{ScriptedOracle, build_service, person, request, seed};
use reunite_domain::{EmbeddingState, MatchPolicy, PersonProfile, PersonStatus, Population};
use reunite_service::{Error, IngestRequest, MemoryStore, RecordStore};

#[tokio::test]
async fn extraction_failure_keeps_record_without_scan() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);
	let owner = Uuid::new_v4();

	seed(&store, &person(Population::Missing, Some(1.0), None)).await;

	let response = service
		.report_unknown(request(owner, None, "found/blurry.jpg"))
		.await
		.expect("Extraction failure must not reject the record.");

	service.scans.wait_idle().await;

	assert!(!response.embedding_present);
	assert!(!response.scan_submitted);
	assert_eq!(oracle.similarity_calls(), 0);

	let stored = store
		.get_person(Population::Unknown, response.person_id)
		.await
		.expect("Failed to load person.")
		.expect("Record must be stored.");

	assert_eq!(stored.embedding, EmbeddingState::Absent);
	assert_eq!(stored.status, PersonStatus::Unresolved);
	assert_eq!(stored.owner_id, Some(owner));
}

#[tokio::test]
async fn embeddingless_records_are_never_candidates() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);
	let subject = person(Population::Unknown, Some(2.0), None);

	seed(&store, &person(Population::Missing, None, None)).await;
	seed(&store, &person(Population::Missing, None, None)).await;
	seed(&store, &person(Population::Missing, Some(3.0), None)).await;

	let report = service.scan(&subject).await;

	assert_eq!(report.candidates, 1);
	assert_eq!(oracle.similarity_calls(), 1);
}

#[tokio::test]
async fn embeddingless_subject_never_scans() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);
	let subject = person(Population::Unknown, None, None);

	seed(&store, &person(Population::Missing, Some(3.0), None)).await;

	let report = service.scan(&subject).await;

	assert_eq!(report.candidates, 0);
	assert_eq!(oracle.similarity_calls(), 0);
}

#[tokio::test]
async fn resolved_records_are_never_candidates() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);
	let mut resolved = person(Population::Missing, Some(3.0), None);

	resolved.status = PersonStatus::Resolved;
	resolved.matched_with = Some(Uuid::new_v4());
	seed(&store, &resolved).await;

	let report = service.scan(&person(Population::Unknown, Some(2.0), None)).await;

	assert_eq!(report.candidates, 0);
	assert_eq!(oracle.similarity_calls(), 0);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_anything_is_stored() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);
	let owner = Uuid::new_v4();
	let too_old = IngestRequest {
		owner_id: owner,
		profile: PersonProfile {
			name: Some("Asha".to_string()),
			age: Some(212),
			image_ref: Some("missing/asha.jpg".to_string()),
			..PersonProfile::default()
		},
	};
	let cases = [
		(Population::Missing, request(owner, None, "missing/asha.jpg")),
		(Population::Missing, request(owner, Some("  "), "missing/asha.jpg")),
		(Population::Unknown, request(owner, None, " ")),
		(Population::Unknown, request(Uuid::nil(), None, "found/a.jpg")),
		(Population::Missing, too_old),
	];

	for (population, req) in cases {
		let result = match population {
			Population::Missing => service.register_missing(req).await,
			Population::Unknown => service.report_unknown(req).await,
		};

		assert!(matches!(result, Err(Error::InvalidRequest { .. })), "{result:?}");
	}

	assert_eq!(oracle.extract_calls(), 0);
	assert!(
		store
			.list_scan_candidates(Population::Missing)
			.await
			.expect("Failed to list.")
			.is_empty()
	);
	assert_eq!(store.person_count().await, 0);
}

#[tokio::test]
async fn unknown_person_does_not_need_a_name() {
	let oracle = Arc::new(ScriptedOracle::new());
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);

	oracle.face("found/a.jpg", 2.0);

	let response = service
		.report_unknown(request(Uuid::new_v4(), None, "found/a.jpg"))
		.await
		.expect("Failed to report unknown person.");

	service.scans.wait_idle().await;

	assert!(response.embedding_present);
	assert!(response.scan_submitted);
	assert_eq!(store.person_count().await, 1);
}
