pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Oracle call timed out after {timeout_ms} ms.")]
	Timeout { timeout_ms: u64 },
	#[error("Oracle is unavailable: {message}")]
	Unavailable { message: String },
	#[error("Oracle returned an invalid response: {message}")]
	InvalidResponse { message: String },
	#[error("Embedding extraction failed: {message}")]
	ExtractionFailure { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
}
impl Error {
	/// Scan-level failures that should skip the candidate rather than abort anything.
	pub fn is_transient(&self) -> bool {
		matches!(
			self,
			Self::Timeout { .. } | Self::Unavailable { .. } | Self::InvalidResponse { .. }
		)
	}

	pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
		if err.is_timeout() {
			Self::Timeout { timeout_ms }
		} else if err.is_decode() {
			Self::InvalidResponse { message: err.to_string() }
		} else if err.is_builder() {
			Self::InvalidConfig { message: err.to_string() }
		} else {
			Self::Unavailable { message: err.to_string() }
		}
	}
}
impl From<reqwest::header::InvalidHeaderName> for Error {
	fn from(err: reqwest::header::InvalidHeaderName) -> Self {
		Self::InvalidConfig { message: format!("Invalid default header name: {err}.") }
	}
}
impl From<reqwest::header::InvalidHeaderValue> for Error {
	fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
		Self::InvalidConfig { message: format!("Invalid header value: {err}.") }
	}
}
