mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Matching, Oracle, Postgres, Reconcile, Service, Storage};

use std::{fs, path::Path};

pub const MATCH_POLICIES: [&str; 2] = ["all_qualifying", "best_only"];

const MAX_ORACLE_TIMEOUT_MS: u64 = 60_000;
const MAX_GRACE_SECONDS: i64 = 31_536_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::invalid("service.log_level", "must be non-empty."));
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::invalid("storage.postgres.dsn", "must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::invalid("storage.postgres.pool_max_conns", "must be greater than zero."));
	}

	validate_oracle(&cfg.oracle)?;

	if !MATCH_POLICIES.contains(&cfg.matching.policy.as_str()) {
		return Err(Error::invalid(
			"matching.policy",
			"must be one of all_qualifying or best_only.",
		));
	}
	if cfg.matching.max_concurrent_scans == 0 {
		return Err(Error::invalid("matching.max_concurrent_scans", "must be greater than zero."));
	}
	if cfg.matching.candidate_concurrency == 0 {
		return Err(Error::invalid("matching.candidate_concurrency", "must be greater than zero."));
	}
	if cfg.reconcile.enabled {
		if cfg.reconcile.interval_seconds == 0 {
			return Err(Error::invalid(
				"reconcile.interval_seconds",
				"must be greater than zero when reconcile is enabled.",
			));
		}
		if cfg.reconcile.batch_size == 0 {
			return Err(Error::invalid(
				"reconcile.batch_size",
				"must be greater than zero when reconcile is enabled.",
			));
		}
	}
	if cfg.reconcile.grace_seconds < 0 {
		return Err(Error::invalid("reconcile.grace_seconds", "must be zero or greater."));
	}
	if cfg.reconcile.grace_seconds > MAX_GRACE_SECONDS {
		return Err(Error::invalid(
			"reconcile.grace_seconds",
			"must be at most 31536000 seconds (one year).",
		));
	}

	Ok(())
}

fn validate_oracle(oracle: &Oracle) -> Result<()> {
	if oracle.api_base.trim().is_empty() {
		return Err(Error::invalid("oracle.api_base", "must be non-empty."));
	}

	for (field, path) in [
		("oracle.extract_path", &oracle.extract_path),
		("oracle.similarity_path", &oracle.similarity_path),
	] {
		if !path.starts_with('/') {
			return Err(Error::invalid(field, "must start with '/'."));
		}
	}
	for (field, timeout_ms) in [
		("oracle.extract_timeout_ms", oracle.extract_timeout_ms),
		("oracle.similarity_timeout_ms", oracle.similarity_timeout_ms),
	] {
		if timeout_ms == 0 || timeout_ms > MAX_ORACLE_TIMEOUT_MS {
			return Err(Error::invalid(
				field,
				format!("must be between 1 and {MAX_ORACLE_TIMEOUT_MS} milliseconds."),
			));
		}
	}
	for (key, value) in &oracle.default_headers {
		if !value.is_string() {
			return Err(Error::invalid(
				"oracle.default_headers",
				format!("value for {key:?} must be a string."),
			));
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.oracle.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.oracle.api_key = None;
	}

	let trimmed = cfg.oracle.api_base.trim_end_matches('/').len();

	cfg.oracle.api_base.truncate(trimmed);
}
