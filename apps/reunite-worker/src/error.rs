pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Storage(#[from] reunite_storage::Error),
	#[error(transparent)]
	Service(#[from] reunite_service::Error),
}
