use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Row shape shared by `missing_persons` and `unknown_persons`.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct PersonRow {
	pub person_id: Uuid,
	pub owner_id: Option<Uuid>,
	pub status: String,
	pub embedding: Option<Vec<f32>>,
	pub matched_with: Option<Uuid>,
	pub name: Option<String>,
	pub age: Option<i32>,
	pub gender: Option<String>,
	pub height: Option<String>,
	pub weight: Option<String>,
	pub distinguishing_marks: Option<String>,
	pub location: Option<String>,
	pub seen_on: Option<Date>,
	pub image_ref: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct MatchRow {
	pub match_id: Uuid,
	pub missing_id: Uuid,
	pub unknown_id: Uuid,
	pub similarity: f64,
	pub confidence: String,
	pub status: String,
	pub verified_by: Option<Uuid>,
	pub verified_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct NotificationRow {
	pub notification_id: Uuid,
	pub recipient_id: Uuid,
	pub kind: String,
	pub title: String,
	pub message: String,
	pub match_id: Option<Uuid>,
	pub missing_id: Option<Uuid>,
	pub unknown_id: Option<Uuid>,
	pub priority: String,
	pub is_read: bool,
	pub read_at: Option<OffsetDateTime>,
	pub dedupe_key: Option<String>,
	pub created_at: OffsetDateTime,
}
