use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, ReuniteService, Result};
use reunite_domain::NotificationRecord;

impl ReuniteService {
	/// A recipient's notifications, newest first.
	pub async fn list_notifications(&self, recipient_id: Uuid) -> Result<Vec<NotificationRecord>> {
		self.store.list_notifications(recipient_id).await
	}

	/// Idempotent. Fails with `NotFound` for an unknown id.
	pub async fn mark_notification_read(
		&self,
		notification_id: Uuid,
	) -> Result<NotificationRecord> {
		self.store
			.mark_notification_read(notification_id, OffsetDateTime::now_utc())
			.await?
			.ok_or_else(|| Error::NotFound {
				message: format!("Notification {notification_id} does not exist."),
			})
	}
}
