use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ReuniteService;
use reunite_domain::{
	Audience, MatchRecord, NotificationKind, NotificationRecord, PersonRecord, Population,
	UNNAMED_PERSON, notice,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FanoutReport {
	pub created: usize,
	/// Recipients that already had this notification.
	pub duplicates: usize,
	/// Sides without an owner to notify.
	pub skipped: usize,
	pub failed: usize,
}

impl ReuniteService {
	/// Creates one notification per present owner of the two matched records.
	///
	/// Each creation is attempted once. Failures are logged and left for the sweep.
	pub async fn fanout(&self, record: &MatchRecord) -> FanoutReport {
		let mut report = FanoutReport::default();
		let missing = self.load_side(record, Population::Missing).await;
		let unknown = self.load_side(record, Population::Unknown).await;
		let subject_name = missing
			.as_ref()
			.map_or(UNNAMED_PERSON, |person| person.profile.display_name())
			.to_string();

		for (population, person) in
			[(Population::Missing, missing), (Population::Unknown, unknown)]
		{
			let audience = Audience::for_population(population);
			let Some(person) = person else {
				report.failed += 1;

				continue;
			};
			let Some(recipient_id) = person.owner_id else {
				report.skipped += 1;

				continue;
			};
			let notification = build_notification(record, audience, recipient_id, &subject_name);

			match self.store.insert_notification(&notification).await {
				Ok(true) => report.created += 1,
				Ok(false) => report.duplicates += 1,
				Err(err) => {
					report.failed += 1;

					tracing::error!(
						error = %err,
						match_id = %record.match_id,
						recipient_id = %recipient_id,
						audience = audience.as_str(),
						"Failed to create match notification."
					);
				},
			}
		}

		report
	}

	async fn load_side(
		&self,
		record: &MatchRecord,
		population: Population,
	) -> Option<PersonRecord> {
		let person_id = record.pair().id_for(population);

		match self.store.get_person(population, person_id).await {
			Ok(Some(person)) => Some(person),
			Ok(None) => {
				tracing::error!(
					match_id = %record.match_id,
					person_id = %person_id,
					"Matched record does not exist."
				);

				None
			},
			Err(err) => {
				tracing::error!(
					error = %err,
					match_id = %record.match_id,
					person_id = %person_id,
					"Failed to load matched record."
				);

				None
			},
		}
	}
}

fn build_notification(
	record: &MatchRecord,
	audience: Audience,
	recipient_id: Uuid,
	subject_name: &str,
) -> NotificationRecord {
	let rendered = notice::match_notice(audience, subject_name, record.similarity);

	NotificationRecord {
		notification_id: Uuid::new_v4(),
		recipient_id,
		kind: NotificationKind::Match,
		title: rendered.title,
		message: rendered.message,
		match_id: Some(record.match_id),
		missing_id: Some(record.missing_id),
		unknown_id: Some(record.unknown_id),
		priority: rendered.priority,
		is_read: false,
		dedupe_key: Some(audience.dedupe_key(record.match_id)),
		created_at: OffsetDateTime::now_utc(),
	}
}
