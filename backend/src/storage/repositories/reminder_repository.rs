use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::models::{PendingReminder, Reminder};

/// Repository for reminder operations
#[derive(Clone, Default)]
pub struct ReminderRepository;

impl ReminderRepository {
    pub fn new() -> Self {
        Self
    }

    /// Schedule an unsent reminder
    pub async fn insert_reminder(
        &self,
        conn: &mut SqliteConnection,
        subscription_id: i64,
        send_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Reminder> {
        let result = sqlx::query(
            r#"
            INSERT INTO reminders (subscription_id, send_date, sent, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            "#,
        )
        .bind(subscription_id)
        .bind(send_date)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(Reminder {
            id: result.last_insert_rowid(),
            subscription_id,
            send_date,
            sent: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Delete every reminder of a subscription, returning how many were removed
    pub async fn delete_for_subscription(
        &self,
        conn: &mut SqliteConnection,
        subscription_id: i64,
    ) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reminders WHERE subscription_id = ?")
            .bind(subscription_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Reminders of one subscription ordered by send date
    #[cfg(test)]
    pub async fn list_for_subscription(
        &self,
        conn: &mut SqliteConnection,
        subscription_id: i64,
    ) -> Result<Vec<Reminder>> {
        let rows = sqlx::query(
            r#"
            SELECT id, subscription_id, send_date, sent, created_at, updated_at
            FROM reminders
            WHERE subscription_id = ?
            ORDER BY send_date ASC, id ASC
            "#,
        )
        .bind(subscription_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(reminder_from_row).collect()
    }

    /// Unsent reminders of subscriptions that are not canceled, with the
    /// renewal date of each subscription's current instance
    pub async fn list_pending(&self, conn: &mut SqliteConnection) -> Result<Vec<PendingReminder>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.subscription_id, r.send_date, r.sent, r.created_at, r.updated_at,
                   s.service_name, s.cost, s.category, s.canceled,
                   i.period_end AS renewal_date
            FROM reminders r
            JOIN subscriptions s ON s.id = r.subscription_id
            LEFT JOIN subscription_instances i ON i.id = s.current_instance_id
            WHERE r.sent = 0 AND s.canceled = 0
            ORDER BY r.send_date ASC, r.id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PendingReminder {
                    reminder: reminder_from_row(row)?,
                    service_name: row.try_get("service_name")?,
                    cost: row.try_get("cost")?,
                    category: row.try_get("category")?,
                    canceled: row.try_get("canceled")?,
                    renewal_date: row.try_get("renewal_date")?,
                })
            })
            .collect()
    }
}

fn reminder_from_row(row: &SqliteRow) -> Result<Reminder> {
    Ok(Reminder {
        id: row.try_get("id")?,
        subscription_id: row.try_get("subscription_id")?,
        send_date: row.try_get("send_date")?,
        sent: row.try_get("sent")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repositories::SubscriptionRepository;
    use crate::storage::DbConnection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_list_and_delete_reminders() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let subscriptions = SubscriptionRepository::new();
        let repo = ReminderRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();
        let now = Utc::now();

        let sub = subscriptions
            .insert_subscription(&mut conn, "Netflix", 15.0, None, false)
            .await
            .unwrap();
        let other = subscriptions
            .insert_subscription(&mut conn, "Hulu", 8.0, None, false)
            .await
            .unwrap();

        repo.insert_reminder(&mut conn, sub.id, date(2025, 5, 9), now).await.unwrap();
        repo.insert_reminder(&mut conn, sub.id, date(2025, 4, 9), now).await.unwrap();
        repo.insert_reminder(&mut conn, other.id, date(2025, 4, 1), now).await.unwrap();

        let listed = repo.list_for_subscription(&mut conn, sub.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].send_date, date(2025, 4, 9));
        assert!(!listed[0].sent);

        let removed = repo.delete_for_subscription(&mut conn, sub.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(repo.list_for_subscription(&mut conn, sub.id).await.unwrap().is_empty());
        assert_eq!(repo.list_for_subscription(&mut conn, other.id).await.unwrap().len(), 1);

        let removed_again = repo.delete_for_subscription(&mut conn, sub.id).await.unwrap();
        assert_eq!(removed_again, 0);
    }

    #[tokio::test]
    async fn test_list_pending_skips_canceled_and_sent() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let subscriptions = SubscriptionRepository::new();
        let repo = ReminderRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();
        let now = Utc::now();

        let active = subscriptions
            .insert_subscription(&mut conn, "Active", 3.0, Some("Tools"), false)
            .await
            .unwrap();
        let canceled = subscriptions
            .insert_subscription(&mut conn, "Canceled", 4.0, None, false)
            .await
            .unwrap();
        let pending = repo.insert_reminder(&mut conn, active.id, date(2025, 6, 1), now).await.unwrap();
        let sent = repo.insert_reminder(&mut conn, active.id, date(2025, 5, 1), now).await.unwrap();
        repo.insert_reminder(&mut conn, canceled.id, date(2025, 6, 1), now).await.unwrap();

        sqlx::query("UPDATE reminders SET sent = 1 WHERE id = ?")
            .bind(sent.id)
            .execute(&mut *conn)
            .await
            .unwrap();
        subscriptions.mark_canceled(&mut conn, canceled.id).await.unwrap();

        let listed = repo.list_pending(&mut conn).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].reminder.id, pending.id);
        assert_eq!(listed[0].service_name, "Active");
        assert_eq!(listed[0].category.as_deref(), Some("Tools"));
        // No instances were appended, so there is no renewal date to report
        assert_eq!(listed[0].renewal_date, None);
    }
}
