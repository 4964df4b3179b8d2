use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A face embedding produced by the oracle. Always non-empty and finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);
impl Embedding {
	pub fn new(values: Vec<f32>) -> Result<Self> {
		if values.is_empty() {
			return Err(Error::InvalidEmbedding { message: "vector is empty.".to_string() });
		}
		if let Some(index) = values.iter().position(|value| !value.is_finite()) {
			return Err(Error::InvalidEmbedding {
				message: format!("component {index} is not a finite number."),
			});
		}

		Ok(Self(values))
	}

	pub fn as_slice(&self) -> &[f32] {
		&self.0
	}

	pub fn dim(&self) -> usize {
		self.0.len()
	}
}
impl<'de> Deserialize<'de> for Embedding {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let values = Vec::<f32>::deserialize(deserializer)?;

		Self::new(values).map_err(serde::de::Error::custom)
	}
}

/// Whether a record carries an embedding. Absence is a legitimate state: extraction may fail and
/// the record is still kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "vector", rename_all = "snake_case")]
pub enum EmbeddingState {
	Present(Embedding),
	#[default]
	Absent,
}
impl EmbeddingState {
	/// `None` maps to `Absent`. A vector that is present but invalid is an error.
	pub fn from_raw(raw: Option<Vec<f32>>) -> Result<Self> {
		match raw {
			Some(values) => Embedding::new(values).map(Self::Present),
			None => Ok(Self::Absent),
		}
	}

	pub fn is_present(&self) -> bool {
		matches!(self, Self::Present(_))
	}

	pub fn as_embedding(&self) -> Option<&Embedding> {
		match self {
			Self::Present(embedding) => Some(embedding),
			Self::Absent => None,
		}
	}

	pub fn to_raw(&self) -> Option<Vec<f32>> {
		self.as_embedding().map(|embedding| embedding.as_slice().to_vec())
	}
}
impl From<Embedding> for EmbeddingState {
	fn from(embedding: Embedding) -> Self {
		Self::Present(embedding)
	}
}
