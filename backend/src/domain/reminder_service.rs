use tracing::info;

use crate::domain::errors::LedgerResult;
use crate::domain::models::PendingReminder;
use crate::storage::{DbConnection, ReminderRepository};

/// Read-only view over scheduled reminders
#[derive(Clone)]
pub struct ReminderService {
    db: DbConnection,
    reminders: ReminderRepository,
}

impl ReminderService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            reminders: ReminderRepository::new(),
        }
    }

    /// Unsent reminders of active subscriptions, earliest send date first
    pub async fn pending_reminders(&self) -> LedgerResult<Vec<PendingReminder>> {
        let mut conn = self.db.pool().acquire().await?;
        let pending = self.reminders.list_pending(&mut conn).await?;
        info!("Found {} pending reminder(s)", pending.len());
        Ok(pending)
    }
}
