//! The ingestion contract for both populations.
//!
//! Input is validated before anything is written. Embedding extraction may fail without
//! rejecting the record, and the scan runs in the background after the record is stored.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, ReuniteService, Result};
use reunite_domain::{EmbeddingState, PersonProfile, PersonRecord, PersonStatus, Population};

const MAX_AGE: i32 = 150;

#[derive(Clone, Debug, Deserialize)]
pub struct IngestRequest {
	pub owner_id: Uuid,
	pub profile: PersonProfile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IngestResponse {
	pub person_id: Uuid,
	pub embedding_present: bool,
	pub scan_submitted: bool,
}

impl ReuniteService {
	/// Registers a missing person reported by `req.owner_id`.
	pub async fn register_missing(&self, req: IngestRequest) -> Result<IngestResponse> {
		self.ingest(Population::Missing, req).await
	}

	/// Reports a found person whose identity is unknown.
	pub async fn report_unknown(&self, req: IngestRequest) -> Result<IngestResponse> {
		self.ingest(Population::Unknown, req).await
	}

	async fn ingest(&self, population: Population, req: IngestRequest) -> Result<IngestResponse> {
		validate(population, &req)?;

		let IngestRequest { owner_id, profile } = req;
		let image_ref = profile.image_ref.clone().unwrap_or_default();
		let embedding = match self.oracle.extract(&image_ref).await {
			Ok(embedding) => EmbeddingState::Present(embedding),
			Err(err) => {
				tracing::warn!(
					error = %err,
					population = %population,
					"Embedding extraction failed. Storing record without embedding."
				);

				EmbeddingState::Absent
			},
		};
		let now = OffsetDateTime::now_utc();
		let record = PersonRecord {
			person_id: Uuid::new_v4(),
			population,
			owner_id: Some(owner_id),
			status: PersonStatus::Unresolved,
			embedding,
			matched_with: None,
			profile,
			created_at: now,
			updated_at: now,
		};

		self.store.insert_person(&record).await?;

		let embedding_present = record.embedding.is_present();
		let person_id = record.person_id;

		if embedding_present {
			let service = self.clone();

			self.scans.submit(async move {
				service.scan(&record).await;
			});
		}

		tracing::info!(
			person_id = %person_id,
			population = %population,
			embedding_present,
			"Record ingested."
		);

		Ok(IngestResponse { person_id, embedding_present, scan_submitted: embedding_present })
	}
}

fn validate(population: Population, req: &IngestRequest) -> Result<()> {
	let profile = &req.profile;

	if req.owner_id.is_nil() {
		return Err(invalid("owner_id must be set."));
	}
	if profile.image_ref.as_deref().map(str::trim).is_none_or(str::is_empty) {
		return Err(invalid("profile.image_ref must be non-empty."));
	}
	if population == Population::Missing
		&& profile.name.as_deref().map(str::trim).is_none_or(str::is_empty)
	{
		return Err(invalid("profile.name is required for a missing person."));
	}
	if let Some(age) = profile.age
		&& !(0..=MAX_AGE).contains(&age)
	{
		return Err(invalid(format!("profile.age must be between 0 and {MAX_AGE}.")));
	}

	Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
	Error::InvalidRequest { message: message.into() }
}
