use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The two disjoint person populations that are matched against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
	/// Reported missing by a relative or guardian.
	Missing,
	/// Found and reported without a known identity.
	Unknown,
}
impl Population {
	pub fn complement(self) -> Self {
		match self {
			Self::Missing => Self::Unknown,
			Self::Unknown => Self::Missing,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Missing => "missing",
			Self::Unknown => "unknown",
		}
	}

	/// Persisted status label for this population.
	pub fn status_label(self, status: PersonStatus) -> &'static str {
		match (self, status) {
			(Self::Missing, PersonStatus::Unresolved) => "missing",
			(Self::Missing, PersonStatus::Resolved) => "found",
			(Self::Unknown, PersonStatus::Unresolved) => "unknown",
			(Self::Unknown, PersonStatus::Resolved) => "identified",
		}
	}

	pub fn parse_status(self, label: &str) -> Result<PersonStatus> {
		[PersonStatus::Unresolved, PersonStatus::Resolved]
			.into_iter()
			.find(|status| self.status_label(*status) == label)
			.ok_or_else(|| Error::UnknownLabel { kind: "person status", label: label.to_string() })
	}
}
impl std::fmt::Display for Population {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonStatus {
	Unresolved,
	Resolved,
}
impl PersonStatus {
	pub fn is_active(self) -> bool {
		matches!(self, Self::Unresolved)
	}

	/// Statuses only move forward. Re-applying the current status is allowed so that concurrent
	/// resolutions converge.
	pub fn can_transition_to(self, next: Self) -> bool {
		!matches!((self, next), (Self::Resolved, Self::Unresolved))
	}

	pub fn transition(self, population: Population, next: Self) -> Result<Self> {
		if self.can_transition_to(next) {
			return Ok(next);
		}

		Err(Error::IllegalTransition {
			population: population.as_str(),
			from: population.status_label(self),
			to: population.status_label(next),
		})
	}
}
