use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{NotificationPriority, Population, SimilarityScore};

/// Which reporter a match notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
	/// Owner of the missing person record.
	MissingReporter,
	/// Owner of the unknown person record.
	UnknownReporter,
}
impl Audience {
	pub fn for_population(population: Population) -> Self {
		match population {
			Population::Missing => Self::MissingReporter,
			Population::Unknown => Self::UnknownReporter,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::MissingReporter => "missing_reporter",
			Self::UnknownReporter => "unknown_reporter",
		}
	}

	/// Key that collapses repeated fanout attempts for one match and audience into one row.
	pub fn dedupe_key(self, match_id: Uuid) -> String {
		format!("match:{match_id}:{}", self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchNotice {
	pub title: String,
	pub message: String,
	pub priority: NotificationPriority,
}

/// Renders the notification text for one audience. `subject_name` is the name the recipient will
/// recognise: the missing person's name for both audiences.
pub fn match_notice(
	audience: Audience,
	subject_name: &str,
	score: SimilarityScore,
) -> MatchNotice {
	let percent = score.percent();
	let priority = NotificationPriority::for_confidence(score.confidence());
	let (title, message) = match audience {
		Audience::MissingReporter => (
			"Possible Match Found",
			format!(
				"A person matching {subject_name} was found ({percent:.2}% similarity). Please verify."
			),
		),
		Audience::UnknownReporter => (
			"Match Found for Unknown Person",
			format!(
				"The unknown person you reported matches {subject_name} ({percent:.2}% similarity). Please verify."
			),
		),
	};

	MatchNotice { title: title.to_string(), message, priority }
}
