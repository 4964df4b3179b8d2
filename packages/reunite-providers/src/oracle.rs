//! HTTP client for the face embedding and similarity service.
//!
//! Every call builds its own client bounded by the configured deadline and performs exactly one
//! request. Retrying is left to callers.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::{Error, Result};
use reunite_config::Oracle;
use reunite_domain::{Embedding, SimilarityScore};

/// Scores this far above 1.0 are float noise from the cosine computation and are clamped.
const SCORE_CEILING_TOLERANCE: f64 = 1e-4;

/// Extracts an embedding for the image at `image_ref`. Every failure, including timeouts, is
/// reported as [`Error::ExtractionFailure`].
pub async fn extract(cfg: &Oracle, image_ref: &str) -> Result<Embedding> {
	let body = json!({ "imagePath": image_ref });
	let json = post_json(cfg, &cfg.extract_path, cfg.extract_timeout_ms, &body)
		.await
		.map_err(|err| Error::ExtractionFailure { message: err.to_string() })?;

	parse_extract_response(json)
		.map_err(|err| Error::ExtractionFailure { message: err.to_string() })
}

/// Scores two embeddings. Fails with `Timeout`, `Unavailable` or `InvalidResponse`.
pub async fn similarity(cfg: &Oracle, a: &Embedding, b: &Embedding) -> Result<SimilarityScore> {
	let body = json!({ "embedding1": a.as_slice(), "embedding2": b.as_slice() });
	let json = post_json(cfg, &cfg.similarity_path, cfg.similarity_timeout_ms, &body).await?;

	parse_similarity_response(&json)
}

async fn post_json(cfg: &Oracle, path: &str, timeout_ms: u64, body: &Value) -> Result<Value> {
	let client = Client::builder()
		.timeout(Duration::from_millis(timeout_ms))
		.build()
		.map_err(|err| Error::InvalidConfig { message: err.to_string() })?;
	let url = format!("{}{}", cfg.api_base, path);
	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(body)
		.send()
		.await
		.map_err(|err| Error::from_reqwest(err, timeout_ms))?;
	let status = res.status();

	if status.is_success() {
		return res.json().await.map_err(|err| Error::from_reqwest(err, timeout_ms));
	}

	let detail = res.json::<Value>().await.ok().and_then(|json| error_field(&json));

	Err(classify_status(status, detail))
}

fn classify_status(status: StatusCode, detail: Option<String>) -> Error {
	let message = match detail {
		Some(detail) => format!("HTTP {status}: {detail}"),
		None => format!("HTTP {status}."),
	};

	if status.is_server_error() {
		Error::Unavailable { message }
	} else {
		Error::InvalidResponse { message }
	}
}

fn error_field(json: &Value) -> Option<String> {
	json.get("error").and_then(Value::as_str).map(str::to_string)
}

fn parse_extract_response(json: Value) -> Result<Embedding> {
	if let Some(detail) = error_field(&json) {
		return Err(Error::InvalidResponse { message: detail });
	}

	let values = json.get("embedding").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse {
			message: "Extract response is missing embedding array.".to_string(),
		}
	})?;
	let mut vec = Vec::with_capacity(values.len());

	for value in values {
		let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
			message: "Embedding value must be numeric.".to_string(),
		})?;

		vec.push(number as f32);
	}

	Embedding::new(vec).map_err(|err| Error::InvalidResponse { message: err.to_string() })
}

fn parse_similarity_response(json: &Value) -> Result<SimilarityScore> {
	let raw = json.get("similarity").and_then(Value::as_f64).ok_or_else(|| {
		Error::InvalidResponse {
			message: "Similarity response is missing a numeric score.".to_string(),
		}
	})?;

	normalize_score(raw)
}

/// Maps a cosine similarity onto `[0, 1]`. Negative cosines mean "not similar" and become 0.
fn normalize_score(raw: f64) -> Result<SimilarityScore> {
	let out_of_range = || Error::InvalidResponse {
		message: format!("Similarity score {raw} is outside the range -1.0-1.0."),
	};

	if !raw.is_finite() || raw < -1.0 || raw > 1.0 + SCORE_CEILING_TOLERANCE {
		return Err(out_of_range());
	}

	SimilarityScore::new(raw.clamp(0.0, 1.0)).map_err(|_| out_of_range())
}
