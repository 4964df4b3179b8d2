use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub oracle: Oracle,
	#[serde(default)]
	pub matching: Matching,
	#[serde(default)]
	pub reconcile: Reconcile,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Endpoints of the external embedding and similarity service.
#[derive(Clone, Debug, Deserialize)]
pub struct Oracle {
	pub api_base: String,
	#[serde(default = "default_extract_path")]
	pub extract_path: String,
	#[serde(default = "default_similarity_path")]
	pub similarity_path: String,
	/// Deadline for a single `extract` call.
	#[serde(default = "default_extract_timeout_ms")]
	pub extract_timeout_ms: u64,
	/// Deadline for a single `similarity` call.
	#[serde(default = "default_similarity_timeout_ms")]
	pub similarity_timeout_ms: u64,
	/// Optional. Sent as a bearer token when present.
	#[serde(default)]
	pub api_key: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Matching {
	/// One of "all_qualifying" or "best_only".
	pub policy: String,
	pub max_concurrent_scans: u32,
	/// Oracle calls issued in parallel within one scan.
	pub candidate_concurrency: u32,
}
impl Default for Matching {
	fn default() -> Self {
		Self {
			policy: "all_qualifying".to_string(),
			max_concurrent_scans: 4,
			candidate_concurrency: 1,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Reconcile {
	pub enabled: bool,
	pub interval_seconds: u64,
	pub batch_size: u32,
	/// Matches younger than this are left to the scan that created them.
	pub grace_seconds: i64,
}
impl Default for Reconcile {
	fn default() -> Self {
		Self { enabled: true, interval_seconds: 60, batch_size: 100, grace_seconds: 30 }
	}
}

fn default_extract_path() -> String {
	"/extract".to_string()
}

fn default_similarity_path() -> String {
	"/match".to_string()
}

fn default_extract_timeout_ms() -> u64 {
	10_000
}

fn default_similarity_timeout_ms() -> u64 {
	20_000
}
