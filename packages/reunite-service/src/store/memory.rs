use std::{collections::HashMap, sync::Arc};

use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{BoxFuture, Error, RecordStore, Result};
use reunite_domain::{
	Audience, MatchPair, MatchRecord, MatchStatus, NotificationRecord, PersonRecord, PersonStatus,
	Population,
};

#[derive(Default)]
struct MemoryState {
	missing: HashMap<Uuid, PersonRecord>,
	unknown: HashMap<Uuid, PersonRecord>,
	matches: HashMap<MatchPair, MatchRecord>,
	notifications: Vec<NotificationRecord>,
}
impl MemoryState {
	fn people(&self, population: Population) -> &HashMap<Uuid, PersonRecord> {
		match population {
			Population::Missing => &self.missing,
			Population::Unknown => &self.unknown,
		}
	}

	fn people_mut(&mut self, population: Population) -> &mut HashMap<Uuid, PersonRecord> {
		match population {
			Population::Missing => &mut self.missing,
			Population::Unknown => &mut self.unknown,
		}
	}

	fn has_notification(&self, key: &str) -> bool {
		self.notifications.iter().any(|n| n.dedupe_key.as_deref() == Some(key))
	}

	fn needs_reconcile(&self, record: &MatchRecord) -> bool {
		let (Some(missing), Some(unknown)) =
			(self.missing.get(&record.missing_id), self.unknown.get(&record.unknown_id))
		else {
			return false;
		};

		[(Population::Missing, missing), (Population::Unknown, unknown)].into_iter().any(
			|(population, person)| {
				let audience = Audience::for_population(population);

				person.status != PersonStatus::Resolved
					|| person.matched_with.is_none()
					|| (person.owner_id.is_some()
						&& !self.has_notification(&audience.dedupe_key(record.match_id)))
			},
		)
	}
}

/// In-process [`RecordStore`] with the same uniqueness and convergence rules as Postgres.
#[derive(Clone, Default)]
pub struct MemoryStore {
	state: Arc<RwLock<MemoryState>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn person_count(&self) -> usize {
		let state = self.state.read().await;

		state.missing.len() + state.unknown.len()
	}

	pub async fn match_count(&self) -> usize {
		self.state.read().await.matches.len()
	}

	pub async fn notification_count(&self) -> usize {
		self.state.read().await.notifications.len()
	}

	pub async fn all_matches(&self) -> Vec<MatchRecord> {
		let mut matches: Vec<_> = self.state.read().await.matches.values().cloned().collect();

		matches.sort_by_key(|record| (record.created_at, record.match_id));

		matches
	}
}

impl RecordStore for MemoryStore {
	fn insert_person<'a>(&'a self, record: &'a PersonRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut state = self.state.write().await;
			let people = state.people_mut(record.population);

			if people.contains_key(&record.person_id) {
				return Err(Error::Conflict {
					message: format!("{} person {} exists.", record.population, record.person_id),
				});
			}

			people.insert(record.person_id, record.clone());

			Ok(())
		})
	}

	fn get_person<'a>(
		&'a self,
		population: Population,
		person_id: Uuid,
	) -> BoxFuture<'a, Result<Option<PersonRecord>>> {
		Box::pin(async move {
			let state = self.state.read().await;

			Ok(state.people(population).get(&person_id).cloned())
		})
	}

	fn list_scan_candidates<'a>(
		&'a self,
		population: Population,
	) -> BoxFuture<'a, Result<Vec<PersonRecord>>> {
		Box::pin(async move {
			let state = self.state.read().await;
			let mut candidates: Vec<_> = state
				.people(population)
				.values()
				.filter(|record| record.is_scannable())
				.cloned()
				.collect();

			candidates.sort_by_key(|record| (record.created_at, record.person_id));

			Ok(candidates)
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
			let mut state = self.state.write().await;
			let Some(record) = state.people_mut(population).get_mut(&person_id) else {
				return Ok(None);
			};
			let unchanged =
				record.status == PersonStatus::Resolved && record.matched_with.is_some();

			record.status = record
				.status
				.transition(population, PersonStatus::Resolved)
				.map_err(|err| Error::Conflict { message: err.to_string() })?;
			record.matched_with.get_or_insert(matched_with);

			if !unchanged {
				record.updated_at = now;
			}

			Ok(Some(record.clone()))
		})
	}

	fn insert_match<'a>(
		&'a self,
		record: &'a MatchRecord,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>> {
		Box::pin(async move {
			let mut state = self.state.write().await;

			if state.matches.contains_key(&record.pair()) {
				return Ok(None);
			}

			state.matches.insert(record.pair(), record.clone());

			Ok(Some(record.clone()))
		})
	}

	fn get_match_by_pair<'a>(
		&'a self,
		pair: MatchPair,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>> {
		Box::pin(async move { Ok(self.state.read().await.matches.get(&pair).cloned()) })
	}

	fn list_matches_needing_reconcile<'a>(
		&'a self,
		created_before: OffsetDateTime,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>> {
		Box::pin(async move {
			let state = self.state.read().await;
			let mut pending: Vec<_> = state
				.matches
				.values()
				.filter(|record| record.status != MatchStatus::Rejected)
				.filter(|record| record.created_at <= created_before)
				.filter(|record| state.needs_reconcile(record))
				.cloned()
				.collect();

			pending.sort_by_key(|record| (record.created_at, record.match_id));
			pending.truncate(limit as usize);

			Ok(pending)
		})
	}

	fn insert_notification<'a>(
		&'a self,
		record: &'a NotificationRecord,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let mut state = self.state.write().await;

			if let Some(key) = record.dedupe_key.as_deref()
				&& state.has_notification(key)
			{
				return Ok(false);
			}

			state.notifications.push(record.clone());

			Ok(true)
		})
	}

	fn list_notifications<'a>(
		&'a self,
		recipient_id: Uuid,
	) -> BoxFuture<'a, Result<Vec<NotificationRecord>>> {
		Box::pin(async move {
			let state = self.state.read().await;
			let mut listed: Vec<_> = state
				.notifications
				.iter()
				.filter(|record| record.recipient_id == recipient_id)
				.cloned()
				.collect();

			listed.sort_by(|a, b| {
				b.created_at.cmp(&a.created_at).then(b.notification_id.cmp(&a.notification_id))
			});

			Ok(listed)
		})
	}

	fn mark_notification_read<'a>(
		&'a self,
		notification_id: Uuid,
		_now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<NotificationRecord>>> {
		Box::pin(async move {
			let mut state = self.state.write().await;
			let Some(record) =
				state.notifications.iter_mut().find(|n| n.notification_id == notification_id)
			else {
				return Ok(None);
			};

			record.is_read = true;

			Ok(Some(record.clone()))
		})
	}
}
