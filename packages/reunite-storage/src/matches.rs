use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::MatchRow};

/// Inserts a match unless one already exists for the pair. Returns `None` on a duplicate pair;
/// the existing row is left untouched.
pub async fn insert_match(
	executor: &mut PgConnection,
	row: &MatchRow,
) -> Result<Option<MatchRow>> {
	let inserted = sqlx::query_as::<_, MatchRow>(
		"\
INSERT INTO person_matches (
	match_id,
	missing_id,
	unknown_id,
	similarity,
	confidence,
	status,
	verified_by,
	verified_at,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
ON CONFLICT (missing_id, unknown_id) DO NOTHING
RETURNING
	match_id,
	missing_id,
	unknown_id,
	similarity,
	confidence,
	status,
	verified_by,
	verified_at,
	created_at",
	)
	.bind(row.match_id)
	.bind(row.missing_id)
	.bind(row.unknown_id)
	.bind(row.similarity)
	.bind(row.confidence.as_str())
	.bind(row.status.as_str())
	.bind(row.verified_by)
	.bind(row.verified_at)
	.bind(row.created_at)
	.fetch_optional(executor)
	.await?;

	Ok(inserted)
}

pub async fn get_match_by_pair(
	executor: &mut PgConnection,
	missing_id: Uuid,
	unknown_id: Uuid,
) -> Result<Option<MatchRow>> {
	let row = sqlx::query_as::<_, MatchRow>(
		"\
SELECT
	match_id,
	missing_id,
	unknown_id,
	similarity,
	confidence,
	status,
	verified_by,
	verified_at,
	created_at
FROM person_matches
WHERE missing_id = $1 AND unknown_id = $2",
	)
	.bind(missing_id)
	.bind(unknown_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Non-rejected matches created before `created_before` whose follow-up work is incomplete: one
/// side is unresolved or lacks its cross-reference, or an owner is missing their notification.
pub async fn list_matches_needing_reconcile(
	executor: &mut PgConnection,
	created_before: OffsetDateTime,
	limit: i64,
) -> Result<Vec<MatchRow>> {
	let rows = sqlx::query_as::<_, MatchRow>(
		"\
SELECT
	m.match_id,
	m.missing_id,
	m.unknown_id,
	m.similarity,
	m.confidence,
	m.status,
	m.verified_by,
	m.verified_at,
	m.created_at
FROM person_matches m
JOIN missing_persons mp ON mp.person_id = m.missing_id
JOIN unknown_persons up ON up.person_id = m.unknown_id
WHERE m.status <> 'rejected'
	AND m.created_at <= $1
	AND (
		mp.status <> 'found'
		OR up.status <> 'identified'
		OR mp.matched_with IS NULL
		OR up.matched_with IS NULL
		OR (
			mp.owner_id IS NOT NULL
			AND NOT EXISTS (
				SELECT 1
				FROM notifications n
				WHERE n.dedupe_key = 'match:' || m.match_id::text || ':missing_reporter'
			)
		)
		OR (
			up.owner_id IS NOT NULL
			AND NOT EXISTS (
				SELECT 1
				FROM notifications n
				WHERE n.dedupe_key = 'match:' || m.match_id::text || ':unknown_reporter'
			)
		)
	)
ORDER BY m.created_at ASC, m.match_id ASC
LIMIT $2",
	)
	.bind(created_before)
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
