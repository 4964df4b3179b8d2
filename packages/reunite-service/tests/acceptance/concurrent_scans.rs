use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use super::{Scripted, ScriptedOracle, build_service, person, seed};
use reunite_domain::{MatchPolicy, PersonRecord, Population};
use reunite_service::{MemoryStore, ReuniteService, ScanReport};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_scans_create_one_match_per_pair() {
	let oracle = Arc::new(ScriptedOracle::with_delay(Duration::from_millis(20)));
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);
	let missing = person(Population::Missing, Some(1.0), Some(Uuid::new_v4()));
	let unknown = person(Population::Unknown, Some(2.0), Some(Uuid::new_v4()));

	oracle.script(1.0, 2.0, Scripted::Score(0.93));
	seed(&store, &missing).await;
	seed(&store, &unknown).await;

	let mut handles = Vec::new();

	for i in 0..8 {
		let subject: PersonRecord = if i % 2 == 0 { missing.clone() } else { unknown.clone() };
		let service: ReuniteService = service.clone();

		handles.push(tokio::spawn(async move { service.scan(&subject).await }));
	}

	let mut total = ScanReport::default();

	for handle in handles {
		let report = handle.await.expect("Scan task panicked.");

		total.matched += report.matched;
		total.duplicates += report.duplicates;
	}

	assert_eq!(total.matched, 1);
	assert_eq!(store.match_count().await, 1);
	assert_eq!(store.notification_count().await, 2);
	assert!(total.duplicates <= 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn background_scans_drain_through_the_pool() {
	let oracle = Arc::new(ScriptedOracle::with_delay(Duration::from_millis(5)));
	let store = MemoryStore::new();
	let service =
		build_service(Arc::new(store.clone()), oracle.clone(), MatchPolicy::AllQualifying);

	for tag in 10..20 {
		seed(&store, &person(Population::Missing, Some(tag as f32), None)).await;
	}

	for tag in 20..30 {
		let subject = person(Population::Unknown, Some(tag as f32), None);
		let scanner = service.clone();

		seed(&store, &subject).await;
		service.scans.submit(async move {
			scanner.scan(&subject).await;
		});
	}

	service.scans.wait_idle().await;

	assert_eq!(service.scans.in_flight(), 0);
	assert_eq!(oracle.similarity_calls(), 100);
	assert_eq!(store.match_count().await, 0);
}
