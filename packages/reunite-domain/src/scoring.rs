use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Minimum similarity for a pair to become a match record.
pub const MATCH_THRESHOLD: f64 = 0.85;
/// Minimum similarity for the high confidence band.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.95;

/// Kept at the oracle's full precision so threshold checks see the exact score.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SimilarityScore(f64);
impl SimilarityScore {
	pub fn new(value: f64) -> Result<Self> {
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::ScoreOutOfRange { value });
		}

		Ok(Self(value))
	}

	pub fn value(self) -> f64 {
		self.0
	}

	pub fn qualifies(self) -> bool {
		self.0 >= MATCH_THRESHOLD
	}

	pub fn confidence(self) -> ConfidenceLevel {
		ConfidenceLevel::from_similarity(self)
	}

	/// Score as a percentage, for human-facing wording.
	pub fn percent(self) -> f64 {
		self.0 * 100.0
	}
}
impl<'de> Deserialize<'de> for SimilarityScore {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = f64::deserialize(deserializer)?;

		Self::new(value).map_err(serde::de::Error::custom)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
	Low,
	Medium,
	High,
}
impl ConfidenceLevel {
	pub fn from_similarity(score: SimilarityScore) -> Self {
		let value = score.value();

		if value >= HIGH_CONFIDENCE_THRESHOLD {
			Self::High
		} else if value >= MATCH_THRESHOLD {
			Self::Medium
		} else {
			Self::Low
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
		}
	}

	pub fn parse(label: &str) -> Result<Self> {
		match label {
			"low" => Ok(Self::Low),
			"medium" => Ok(Self::Medium),
			"high" => Ok(Self::High),
			other => Err(Error::UnknownLabel { kind: "confidence", label: other.to_string() }),
		}
	}
}

/// How many qualifying candidates one scan may turn into match records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
	/// Every candidate at or above the threshold yields its own match.
	#[default]
	AllQualifying,
	/// Only the highest scoring qualifying candidate yields a match.
	BestOnly,
}
impl MatchPolicy {
	pub fn parse(label: &str) -> Result<Self> {
		match label {
			"all_qualifying" => Ok(Self::AllQualifying),
			"best_only" => Ok(Self::BestOnly),
			other => Err(Error::UnknownLabel { kind: "match policy", label: other.to_string() }),
		}
	}

	/// Filters scored candidates down to those that should become matches, keeping input order.
	/// Ties under `BestOnly` go to the earliest candidate.
	pub fn select_qualifying<T>(
		self,
		scored: Vec<(T, SimilarityScore)>,
	) -> Vec<(T, SimilarityScore)> {
		let qualifying = scored.into_iter().filter(|(_, score)| score.qualifies());

		match self {
			Self::AllQualifying => qualifying.collect(),
			Self::BestOnly => {
				let mut best: Option<(T, SimilarityScore)> = None;

				for (candidate, score) in qualifying {
					if best.as_ref().is_none_or(|(_, current)| score > *current) {
						best = Some((candidate, score));
					}
				}

				best.into_iter().collect()
			},
		}
	}
}
