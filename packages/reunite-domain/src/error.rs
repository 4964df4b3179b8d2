pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Invalid embedding: {message}")]
	InvalidEmbedding { message: String },
	#[error("Similarity score {value} is outside the range 0.0-1.0.")]
	ScoreOutOfRange { value: f64 },
	#[error("Unknown {kind} label {label:?}.")]
	UnknownLabel { kind: &'static str, label: String },
	#[error("{population} record cannot move from {from} to {to}.")]
	IllegalTransition { population: &'static str, from: &'static str, to: &'static str },
}
