pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Oracle error: {message}")]
	Oracle { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<reunite_storage::Error> for Error {
	fn from(err: reunite_storage::Error) -> Self {
		match err {
			reunite_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			reunite_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			reunite_storage::Error::NotFound(message) => Self::NotFound { message },
			reunite_storage::Error::Conflict(message) => Self::Conflict { message },
		}
	}
}

impl From<reunite_providers::Error> for Error {
	fn from(err: reunite_providers::Error) -> Self {
		Self::Oracle { message: err.to_string() }
	}
}
