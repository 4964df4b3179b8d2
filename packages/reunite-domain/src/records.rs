use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
	ConfidenceLevel, EmbeddingState, Error, PersonStatus, Population, Result, SimilarityScore,
};

/// Stands in for a missing or blank name in notification wording.
pub const UNNAMED_PERSON: &str = "an unnamed person";

/// Descriptive fields captured at ingestion. None of them take part in matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
	pub name: Option<String>,
	pub age: Option<i32>,
	pub gender: Option<String>,
	pub height: Option<String>,
	pub weight: Option<String>,
	pub distinguishing_marks: Option<String>,
	/// Last seen location for missing persons, found location for unknown persons.
	pub location: Option<String>,
	/// Last seen date for missing persons, found date for unknown persons.
	pub seen_on: Option<Date>,
	pub image_ref: Option<String>,
}
impl PersonProfile {
	/// Name used in notification wording.
	pub fn display_name(&self) -> &str {
		match self.name.as_deref().map(str::trim) {
			Some(name) if !name.is_empty() => name,
			_ => UNNAMED_PERSON,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
	pub person_id: Uuid,
	pub population: Population,
	pub owner_id: Option<Uuid>,
	pub status: PersonStatus,
	pub embedding: EmbeddingState,
	/// Identity of the record in the complementary population this one was resolved against.
	pub matched_with: Option<Uuid>,
	pub profile: PersonProfile,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl PersonRecord {
	/// Only unresolved records with an embedding take part in a scan, on either side.
	pub fn is_scannable(&self) -> bool {
		self.status.is_active() && self.embedding.is_present()
	}
}

/// A (missing, unknown) pair, always ordered by population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchPair {
	pub missing_id: Uuid,
	pub unknown_id: Uuid,
}
impl MatchPair {
	/// Orders `subject` and `candidate` into a pair. `candidate` must belong to the complementary
	/// population of `subject_population`.
	pub fn from_scan(subject_population: Population, subject_id: Uuid, candidate_id: Uuid) -> Self {
		match subject_population {
			Population::Missing => Self { missing_id: subject_id, unknown_id: candidate_id },
			Population::Unknown => Self { missing_id: candidate_id, unknown_id: subject_id },
		}
	}

	pub fn id_for(&self, population: Population) -> Uuid {
		match population {
			Population::Missing => self.missing_id,
			Population::Unknown => self.unknown_id,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
	Pending,
	Verified,
	Rejected,
}
impl MatchStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Verified => "verified",
			Self::Rejected => "rejected",
		}
	}

	pub fn parse(label: &str) -> Result<Self> {
		match label {
			"pending" => Ok(Self::Pending),
			"verified" => Ok(Self::Verified),
			"rejected" => Ok(Self::Rejected),
			other => Err(Error::UnknownLabel { kind: "match status", label: other.to_string() }),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
	pub match_id: Uuid,
	pub missing_id: Uuid,
	pub unknown_id: Uuid,
	pub similarity: SimilarityScore,
	pub confidence: ConfidenceLevel,
	pub status: MatchStatus,
	pub verified_by: Option<Uuid>,
	#[serde(default, with = "crate::time_serde::option")]
	pub verified_at: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl MatchRecord {
	/// A fresh pending match. Confidence is always derived from the score.
	pub fn pending(pair: MatchPair, similarity: SimilarityScore, now: OffsetDateTime) -> Self {
		Self {
			match_id: Uuid::new_v4(),
			missing_id: pair.missing_id,
			unknown_id: pair.unknown_id,
			similarity,
			confidence: similarity.confidence(),
			status: MatchStatus::Pending,
			verified_by: None,
			verified_at: None,
			created_at: now,
		}
	}

	pub fn pair(&self) -> MatchPair {
		MatchPair { missing_id: self.missing_id, unknown_id: self.unknown_id }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
	Match,
	Sos,
	System,
}
impl NotificationKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Match => "match",
			Self::Sos => "sos",
			Self::System => "system",
		}
	}

	pub fn parse(label: &str) -> Result<Self> {
		match label {
			"match" => Ok(Self::Match),
			"sos" => Ok(Self::Sos),
			"system" => Ok(Self::System),
			other =>
				Err(Error::UnknownLabel { kind: "notification kind", label: other.to_string() }),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
	Low,
	Normal,
	High,
}
impl NotificationPriority {
	pub fn for_confidence(confidence: ConfidenceLevel) -> Self {
		match confidence {
			ConfidenceLevel::High => Self::High,
			ConfidenceLevel::Medium | ConfidenceLevel::Low => Self::Normal,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Normal => "normal",
			Self::High => "high",
		}
	}

	pub fn parse(label: &str) -> Result<Self> {
		match label {
			"low" => Ok(Self::Low),
			"normal" => Ok(Self::Normal),
			"high" => Ok(Self::High),
			other => Err(Error::UnknownLabel {
				kind: "notification priority",
				label: other.to_string(),
			}),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
	pub notification_id: Uuid,
	pub recipient_id: Uuid,
	pub kind: NotificationKind,
	pub title: String,
	pub message: String,
	pub match_id: Option<Uuid>,
	pub missing_id: Option<Uuid>,
	pub unknown_id: Option<Uuid>,
	pub priority: NotificationPriority,
	pub is_read: bool,
	/// Fanout sets this so repeated attempts for the same recipient collapse to one row.
	pub dedupe_key: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
