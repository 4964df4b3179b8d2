use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::NotificationRow};

const NOTIFICATION_COLUMNS: &str = "\
notification_id,
	recipient_id,
	kind,
	title,
	message,
	match_id,
	missing_id,
	unknown_id,
	priority,
	is_read,
	read_at,
	dedupe_key,
	created_at";

/// Returns `false` when a row with the same dedupe key already exists.
pub async fn insert_notification(
	executor: &mut PgConnection,
	row: &NotificationRow,
) -> Result<bool> {
	let sql = format!(
		"\
INSERT INTO notifications (
	{NOTIFICATION_COLUMNS}
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
ON CONFLICT (dedupe_key) WHERE dedupe_key IS NOT NULL DO NOTHING"
	);
	let result = sqlx::query(&sql)
		.bind(row.notification_id)
		.bind(row.recipient_id)
		.bind(row.kind.as_str())
		.bind(row.title.as_str())
		.bind(row.message.as_str())
		.bind(row.match_id)
		.bind(row.missing_id)
		.bind(row.unknown_id)
		.bind(row.priority.as_str())
		.bind(row.is_read)
		.bind(row.read_at)
		.bind(row.dedupe_key.as_deref())
		.bind(row.created_at)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() == 1)
}

/// Newest first.
pub async fn list_for_recipient(
	executor: &mut PgConnection,
	recipient_id: Uuid,
) -> Result<Vec<NotificationRow>> {
	let sql = format!(
		"\
SELECT
	{NOTIFICATION_COLUMNS}
FROM notifications
WHERE recipient_id = $1
ORDER BY created_at DESC, notification_id DESC"
	);
	let rows =
		sqlx::query_as::<_, NotificationRow>(&sql).bind(recipient_id).fetch_all(executor).await?;

	Ok(rows)
}

/// Sets the read flag. Marking an already read notification keeps its original `read_at`.
/// Returns `None` when the id is unknown.
pub async fn mark_read(
	executor: &mut PgConnection,
	notification_id: Uuid,
	now: OffsetDateTime,
) -> Result<Option<NotificationRow>> {
	let sql = format!(
		"\
UPDATE notifications
SET
	is_read = TRUE,
	read_at = COALESCE(read_at, $2)
WHERE notification_id = $1
RETURNING
	{NOTIFICATION_COLUMNS}"
	);
	let row = sqlx::query_as::<_, NotificationRow>(&sql)
		.bind(notification_id)
		.bind(now)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}
