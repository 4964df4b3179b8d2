pub mod embedding;
pub mod notice;
pub mod population;
pub mod records;
pub mod scoring;
pub mod time_serde;

mod error;

pub use embedding::{Embedding, EmbeddingState};
pub use error::{Error, Result};
pub use notice::{Audience, MatchNotice};
pub use population::{PersonStatus, Population};
pub use records::{
	MatchPair, MatchRecord, MatchStatus, NotificationKind, NotificationPriority,
	NotificationRecord, PersonProfile, PersonRecord, UNNAMED_PERSON,
};
pub use scoring::{
	ConfidenceLevel, HIGH_CONFIDENCE_THRESHOLD, MATCH_THRESHOLD, MatchPolicy, SimilarityScore,
};
