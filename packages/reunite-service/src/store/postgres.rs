use time::OffsetDateTime;
use uuid::Uuid;

use crate::{BoxFuture, Error, RecordStore, Result};
use reunite_domain::{
	ConfidenceLevel, EmbeddingState, MatchPair, MatchRecord, MatchStatus, NotificationKind,
	NotificationPriority, NotificationRecord, PersonProfile, PersonRecord, Population,
	SimilarityScore,
};
use reunite_storage::{
	db::Db,
	matches,
	models::{MatchRow, NotificationRow, PersonRow},
	notifications, persons,
};

impl RecordStore for Db {
	fn insert_person<'a>(&'a self, record: &'a PersonRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;

			persons::insert_person(&mut conn, record.population, &person_to_row(record)).await?;

			Ok(())
		})
	}

	fn get_person<'a>(
		&'a self,
		population: Population,
		person_id: Uuid,
	) -> BoxFuture<'a, Result<Option<PersonRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let row = persons::get_person(&mut conn, population, person_id).await?;

			row.map(|row| person_from_row(population, row)).transpose()
		})
	}

	fn list_scan_candidates<'a>(
		&'a self,
		population: Population,
	) -> BoxFuture<'a, Result<Vec<PersonRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let rows = persons::list_scan_candidates(&mut conn, population).await?;

			rows.into_iter().map(|row| person_from_row(population, row)).collect()
		})
	}

	fn resolve_person<'a>(
		&'a self,
		population: Population,
		person_id: Uuid,
		matched_with: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<PersonRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let row =
				persons::resolve_person(&mut conn, population, person_id, matched_with, now).await?;

			row.map(|row| person_from_row(population, row)).transpose()
		})
	}

	fn insert_match<'a>(
		&'a self,
		record: &'a MatchRecord,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let row = matches::insert_match(&mut conn, &match_to_row(record)).await?;

			row.map(match_from_row).transpose()
		})
	}

	fn get_match_by_pair<'a>(
		&'a self,
		pair: MatchPair,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let row =
				matches::get_match_by_pair(&mut conn, pair.missing_id, pair.unknown_id).await?;

			row.map(match_from_row).transpose()
		})
	}

	fn list_matches_needing_reconcile<'a>(
		&'a self,
		created_before: OffsetDateTime,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let rows =
				matches::list_matches_needing_reconcile(&mut conn, created_before, i64::from(limit))
					.await?;

			rows.into_iter().map(match_from_row).collect()
		})
	}

	fn insert_notification<'a>(
		&'a self,
		record: &'a NotificationRecord,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let inserted =
				notifications::insert_notification(&mut conn, &notification_to_row(record)).await?;

			Ok(inserted)
		})
	}

	fn list_notifications<'a>(
		&'a self,
		recipient_id: Uuid,
	) -> BoxFuture<'a, Result<Vec<NotificationRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let rows = notifications::list_for_recipient(&mut conn, recipient_id).await?;

			rows.into_iter().map(notification_from_row).collect()
		})
	}

	fn mark_notification_read<'a>(
		&'a self,
		notification_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<NotificationRecord>>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let row = notifications::mark_read(&mut conn, notification_id, now).await?;

			row.map(notification_from_row).transpose()
		})
	}
}

fn corrupt(what: &str, id: Uuid, err: impl std::fmt::Display) -> Error {
	Error::Storage { message: format!("Stored {what} {id} is invalid: {err}") }
}

fn person_to_row(record: &PersonRecord) -> PersonRow {
	let profile = &record.profile;

	PersonRow {
		person_id: record.person_id,
		owner_id: record.owner_id,
		status: record.population.status_label(record.status).to_string(),
		embedding: record.embedding.to_raw(),
		matched_with: record.matched_with,
		name: profile.name.clone(),
		age: profile.age,
		gender: profile.gender.clone(),
		height: profile.height.clone(),
		weight: profile.weight.clone(),
		distinguishing_marks: profile.distinguishing_marks.clone(),
		location: profile.location.clone(),
		seen_on: profile.seen_on,
		image_ref: profile.image_ref.clone(),
		created_at: record.created_at,
		updated_at: record.updated_at,
	}
}

fn person_from_row(population: Population, row: PersonRow) -> Result<PersonRecord> {
	let status = population
		.parse_status(&row.status)
		.map_err(|err| corrupt("person", row.person_id, err))?;
	let embedding = EmbeddingState::from_raw(row.embedding)
		.map_err(|err| corrupt("person", row.person_id, err))?;

	Ok(PersonRecord {
		person_id: row.person_id,
		population,
		owner_id: row.owner_id,
		status,
		embedding,
		matched_with: row.matched_with,
		profile: PersonProfile {
			name: row.name,
			age: row.age,
			gender: row.gender,
			height: row.height,
			weight: row.weight,
			distinguishing_marks: row.distinguishing_marks,
			location: row.location,
			seen_on: row.seen_on,
			image_ref: row.image_ref,
		},
		created_at: row.created_at,
		updated_at: row.updated_at,
	})
}

fn match_to_row(record: &MatchRecord) -> MatchRow {
	MatchRow {
		match_id: record.match_id,
		missing_id: record.missing_id,
		unknown_id: record.unknown_id,
		similarity: record.similarity.value(),
		confidence: record.confidence.as_str().to_string(),
		status: record.status.as_str().to_string(),
		verified_by: record.verified_by,
		verified_at: record.verified_at,
		created_at: record.created_at,
	}
}

fn match_from_row(row: MatchRow) -> Result<MatchRecord> {
	let id = row.match_id;

	Ok(MatchRecord {
		match_id: row.match_id,
		missing_id: row.missing_id,
		unknown_id: row.unknown_id,
		similarity: SimilarityScore::new(row.similarity).map_err(|err| corrupt("match", id, err))?,
		confidence: ConfidenceLevel::parse(&row.confidence)
			.map_err(|err| corrupt("match", id, err))?,
		status: MatchStatus::parse(&row.status).map_err(|err| corrupt("match", id, err))?,
		verified_by: row.verified_by,
		verified_at: row.verified_at,
		created_at: row.created_at,
	})
}

fn notification_to_row(record: &NotificationRecord) -> NotificationRow {
	NotificationRow {
		notification_id: record.notification_id,
		recipient_id: record.recipient_id,
		kind: record.kind.as_str().to_string(),
		title: record.title.clone(),
		message: record.message.clone(),
		match_id: record.match_id,
		missing_id: record.missing_id,
		unknown_id: record.unknown_id,
		priority: record.priority.as_str().to_string(),
		is_read: record.is_read,
		read_at: None,
		dedupe_key: record.dedupe_key.clone(),
		created_at: record.created_at,
	}
}

fn notification_from_row(row: NotificationRow) -> Result<NotificationRecord> {
	let id = row.notification_id;

	Ok(NotificationRecord {
		notification_id: row.notification_id,
		recipient_id: row.recipient_id,
		kind: NotificationKind::parse(&row.kind).map_err(|err| corrupt("notification", id, err))?,
		title: row.title,
		message: row.message,
		match_id: row.match_id,
		missing_id: row.missing_id,
		unknown_id: row.unknown_id,
		priority: NotificationPriority::parse(&row.priority)
			.map_err(|err| corrupt("notification", id, err))?,
		is_read: row.is_read,
		dedupe_key: row.dedupe_key,
		created_at: row.created_at,
	})
}
