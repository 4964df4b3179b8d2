//! The record store seam. [`reunite_storage::db::Db`] backs it in production and
//! [`memory::MemoryStore`] keeps everything in process.

pub mod memory;
pub mod postgres;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{BoxFuture, Result};
use reunite_domain::{MatchPair, MatchRecord, NotificationRecord, PersonRecord, Population};

pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Fails with `Conflict` when the id is already taken.
	fn insert_person<'a>(&'a self, record: &'a PersonRecord) -> BoxFuture<'a, Result<()>>;

	fn get_person<'a>(
		&'a self,
		population: Population,
		person_id: Uuid,
	) -> BoxFuture<'a, Result<Option<PersonRecord>>>;

	/// Unresolved records with a present embedding, oldest first.
	fn list_scan_candidates<'a>(
		&'a self,
		population: Population,
	) -> BoxFuture<'a, Result<Vec<PersonRecord>>>;

	/// Moves a record to resolved. The cross-reference is only set while empty, so repeats and
	/// races converge on the first writer. `None` when the record does not exist.
	fn resolve_person<'a>(
		&'a self,
		population: Population,
		person_id: Uuid,
		matched_with: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<PersonRecord>>>;

	/// `None` when a match for the same pair already exists.
	fn insert_match<'a>(
		&'a self,
		record: &'a MatchRecord,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>>;

	fn get_match_by_pair<'a>(
		&'a self,
		pair: MatchPair,
	) -> BoxFuture<'a, Result<Option<MatchRecord>>>;

	/// Non-rejected matches created at or before `created_before` with an unresolved side, a
	/// missing cross-reference, or an owner without their notification.
	fn list_matches_needing_reconcile<'a>(
		&'a self,
		created_before: OffsetDateTime,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>>;

	/// `false` when a notification with the same dedupe key already exists.
	fn insert_notification<'a>(
		&'a self,
		record: &'a NotificationRecord,
	) -> BoxFuture<'a, Result<bool>>;

	/// Newest first.
	fn list_notifications<'a>(
		&'a self,
		recipient_id: Uuid,
	) -> BoxFuture<'a, Result<Vec<NotificationRecord>>>;

	fn mark_notification_read<'a>(
		&'a self,
		notification_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<NotificationRecord>>>;
}
