pub mod ingest;
pub mod matching;
pub mod notifications;
pub mod notify;
pub mod oracle;
pub mod pool;
pub mod reconcile;
pub mod store;

mod error;

pub use error::{Error, Result};
pub use ingest::{IngestRequest, IngestResponse};
pub use matching::ScanReport;
pub use notify::FanoutReport;
pub use oracle::{HttpOracle, SimilarityOracle};
pub use pool::ScanPool;
pub use reconcile::{ReconcileOutcome, SweepReport};
pub use store::{RecordStore, memory::MemoryStore};

use std::{future::Future, pin::Pin, sync::Arc};

use reunite_config::Config;
use reunite_domain::MatchPolicy;
use reunite_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runtime knobs derived from the `[matching]` and `[reconcile]` config sections.
#[derive(Clone, Debug)]
pub struct MatchSettings {
	pub policy: MatchPolicy,
	pub max_concurrent_scans: usize,
	pub candidate_concurrency: usize,
	pub sweep_batch_size: u32,
	pub sweep_grace: time::Duration,
}
impl MatchSettings {
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let policy = MatchPolicy::parse(&cfg.matching.policy)
			.map_err(|err| Error::InvalidRequest { message: err.to_string() })?;

		Ok(Self {
			policy,
			max_concurrent_scans: cfg.matching.max_concurrent_scans as usize,
			candidate_concurrency: cfg.matching.candidate_concurrency as usize,
			sweep_batch_size: cfg.reconcile.batch_size,
			sweep_grace: time::Duration::seconds(cfg.reconcile.grace_seconds),
		})
	}
}
impl Default for MatchSettings {
	fn default() -> Self {
		Self {
			policy: MatchPolicy::AllQualifying,
			max_concurrent_scans: 4,
			candidate_concurrency: 1,
			sweep_batch_size: 100,
			sweep_grace: time::Duration::seconds(30),
		}
	}
}

/// Entry point for ingestion, matching, reconciliation and the notification read API.
///
/// Cloning is cheap and clones share the scan pool, so a clone can be moved into a background scan.
#[derive(Clone)]
pub struct ReuniteService {
	pub store: Arc<dyn RecordStore>,
	pub oracle: Arc<dyn SimilarityOracle>,
	pub settings: MatchSettings,
	pub scans: ScanPool,
}
impl ReuniteService {
	pub fn new(cfg: &Config, db: Db) -> Result<Self> {
		let settings = MatchSettings::from_config(cfg)?;
		let oracle = HttpOracle::new(cfg.oracle.clone());

		Ok(Self::with_parts(Arc::new(db), Arc::new(oracle), settings))
	}

	pub fn with_parts(
		store: Arc<dyn RecordStore>,
		oracle: Arc<dyn SimilarityOracle>,
		settings: MatchSettings,
	) -> Self {
		let scans = ScanPool::new(settings.max_concurrent_scans);

		Self { store, oracle, settings, scans }
	}
}
