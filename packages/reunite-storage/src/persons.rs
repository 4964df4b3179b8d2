use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, models::PersonRow};
use reunite_domain::{PersonStatus, Population};

const PERSON_COLUMNS: &str = "\
person_id,
	owner_id,
	status,
	embedding,
	matched_with,
	name,
	age,
	gender,
	height,
	weight,
	distinguishing_marks,
	location,
	seen_on,
	image_ref,
	created_at,
	updated_at";

pub fn table_name(population: Population) -> &'static str {
	match population {
		Population::Missing => "missing_persons",
		Population::Unknown => "unknown_persons",
	}
}

pub async fn insert_person(
	executor: &mut PgConnection,
	population: Population,
	row: &PersonRow,
) -> Result<()> {
	let sql = format!(
		"\
INSERT INTO {table} (
	{PERSON_COLUMNS}
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
		table = table_name(population),
	);

	sqlx::query(&sql)
		.bind(row.person_id)
		.bind(row.owner_id)
		.bind(row.status.as_str())
		.bind(row.embedding.as_deref())
		.bind(row.matched_with)
		.bind(row.name.as_deref())
		.bind(row.age)
		.bind(row.gender.as_deref())
		.bind(row.height.as_deref())
		.bind(row.weight.as_deref())
		.bind(row.distinguishing_marks.as_deref())
		.bind(row.location.as_deref())
		.bind(row.seen_on)
		.bind(row.image_ref.as_deref())
		.bind(row.created_at)
		.bind(row.updated_at)
		.execute(executor)
		.await
		.map_err(|err| {
			Error::from_insert(err, || format!("{population} person {} exists.", row.person_id))
		})?;

	Ok(())
}

pub async fn get_person(
	executor: &mut PgConnection,
	population: Population,
	person_id: Uuid,
) -> Result<Option<PersonRow>> {
	let sql = format!(
		"\
SELECT
	{PERSON_COLUMNS}
FROM {table}
WHERE person_id = $1",
		table = table_name(population),
	);
	let row =
		sqlx::query_as::<_, PersonRow>(&sql).bind(person_id).fetch_optional(executor).await?;

	Ok(row)
}

/// Unresolved records that carry an embedding, oldest first.
pub async fn list_scan_candidates(
	executor: &mut PgConnection,
	population: Population,
) -> Result<Vec<PersonRow>> {
	let sql = format!(
		"\
SELECT
	{PERSON_COLUMNS}
FROM {table}
WHERE status = $1
	AND embedding IS NOT NULL
ORDER BY created_at ASC, person_id ASC",
		table = table_name(population),
	);
	let rows = sqlx::query_as::<_, PersonRow>(&sql)
		.bind(population.status_label(PersonStatus::Unresolved))
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

/// Marks a record resolved against `matched_with`.
///
/// The cross-reference is only written while it is still empty, so the first resolution wins and
/// repeating the update is a no-op. Returns `None` when the record does not exist.
pub async fn resolve_person(
	executor: &mut PgConnection,
	population: Population,
	person_id: Uuid,
	matched_with: Uuid,
	now: OffsetDateTime,
) -> Result<Option<PersonRow>> {
	let sql = format!(
		"\
UPDATE {table}
SET
	status = $1,
	matched_with = COALESCE(matched_with, $2),
	updated_at = CASE
		WHEN status = $1 AND matched_with IS NOT NULL THEN updated_at
		ELSE $3
	END
WHERE person_id = $4
RETURNING
	{PERSON_COLUMNS}",
		table = table_name(population),
	);
	let row = sqlx::query_as::<_, PersonRow>(&sql)
		.bind(population.status_label(PersonStatus::Resolved))
		.bind(matched_with)
		.bind(now)
		.bind(person_id)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}
