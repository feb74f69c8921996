//! Billing instance store.
//!
//! Instances are append-only apart from the single pending/overdue → paid
//! transition. The subscription row carries a pointer to its current instance
//! (latest `period_start`), advanced here in the same transaction that appends
//! a newer instance.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::models::{BillingInstance, PaymentStatus, Subscription};

const INSTANCE_COLUMNS: &str =
    "id, subscription_id, period_start, period_end, payment_status, paid_at";

/// Repository for billing instance operations
#[derive(Clone, Default)]
pub struct InstanceRepository;

impl InstanceRepository {
    pub fn new() -> Self {
        Self
    }

    /// Append a new instance and make it current if it starts no earlier than
    /// the existing current instance. Overlap with earlier periods is not checked.
    pub async fn append_instance(
        &self,
        conn: &mut SqliteConnection,
        subscription_id: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
        status: PaymentStatus,
    ) -> Result<BillingInstance> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscription_instances (subscription_id, period_start, period_end, payment_status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(subscription_id)
        .bind(period_start)
        .bind(period_end)
        .bind(status.as_str())
        .execute(&mut *conn)
        .await?;
        let id = result.last_insert_rowid();

        // Ties go to the newer row, so the highest id wins among equal starts
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET current_instance_id = ?
            WHERE id = ?
              AND (
                current_instance_id IS NULL
                OR (SELECT period_start FROM subscription_instances
                    WHERE id = subscriptions.current_instance_id) <= ?
              )
            "#,
        )
        .bind(id)
        .bind(subscription_id)
        .bind(period_start)
        .execute(&mut *conn)
        .await?;

        Ok(BillingInstance {
            id,
            subscription_id,
            period_start,
            period_end,
            payment_status: status,
            paid_at: None,
        })
    }

    /// Get an instance by ID
    pub async fn get_instance(
        &self,
        conn: &mut SqliteConnection,
        instance_id: i64,
    ) -> Result<Option<BillingInstance>> {
        let sql = format!(
            "SELECT {} FROM subscription_instances WHERE id = ?",
            INSTANCE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(instance_id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(instance_from_row).transpose()
    }

    /// Resolve the current instance of a subscription.
    ///
    /// Follows the stored pointer; rows without one fall back to the instance
    /// with the greatest `period_start` (highest id on ties).
    pub async fn current_instance(
        &self,
        conn: &mut SqliteConnection,
        subscription: &Subscription,
    ) -> Result<Option<BillingInstance>> {
        if let Some(instance_id) = subscription.current_instance_id {
            if let Some(instance) = self.get_instance(conn, instance_id).await? {
                return Ok(Some(instance));
            }
        }
        self.latest_by_period_start(conn, subscription.id).await
    }

    /// Scan for the instance with the greatest `period_start`
    pub async fn latest_by_period_start(
        &self,
        conn: &mut SqliteConnection,
        subscription_id: i64,
    ) -> Result<Option<BillingInstance>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM subscription_instances
            WHERE subscription_id = ?
            ORDER BY period_start DESC, id DESC
            LIMIT 1
            "#,
            INSTANCE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(subscription_id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(instance_from_row).transpose()
    }

    /// Mark an unpaid instance as paid.
    /// Returns false if the instance does not exist or was already paid.
    pub async fn mark_paid(
        &self,
        conn: &mut SqliteConnection,
        instance_id: i64,
        paid_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscription_instances
            SET payment_status = ?, paid_at = ?
            WHERE id = ? AND payment_status <> ?
            "#,
        )
        .bind(PaymentStatus::Paid.as_str())
        .bind(paid_at)
        .bind(instance_id)
        .bind(PaymentStatus::Paid.as_str())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// All instances of a subscription in period order
    pub async fn list_for_subscription(
        &self,
        conn: &mut SqliteConnection,
        subscription_id: i64,
    ) -> Result<Vec<BillingInstance>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM subscription_instances
            WHERE subscription_id = ?
            ORDER BY period_start ASC, id ASC
            "#,
            INSTANCE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(subscription_id)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(instance_from_row).collect()
    }
}

pub(crate) fn instance_from_row(row: &SqliteRow) -> Result<BillingInstance> {
    let status: String = row.try_get("payment_status")?;
    Ok(BillingInstance {
        id: row.try_get("id")?,
        subscription_id: row.try_get("subscription_id")?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        payment_status: status.parse().map_err(|e: String| anyhow!(e))?,
        paid_at: row.try_get("paid_at")?,
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

    async fn setup_test() -> (DbConnection, Subscription) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
        let subscription = SubscriptionRepository::new()
            .insert_subscription(&mut conn, "Netflix", 15.0, None, false)
            .await
            .expect("Failed to insert subscription");
        (db, subscription)
    }

    async fn reload(db: &DbConnection, id: i64) -> Subscription {
        let mut conn = db.pool().acquire().await.unwrap();
        SubscriptionRepository::new()
            .get_subscription(&mut conn, id)
            .await
            .unwrap()
            .expect("subscription should exist")
    }

    #[tokio::test]
    async fn test_current_instance_empty() {
        let (db, subscription) = setup_test().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let current = InstanceRepository::new()
            .current_instance(&mut conn, &subscription)
            .await
            .expect("Failed to resolve current instance");
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn test_append_advances_current_pointer() {
        let (db, subscription) = setup_test().await;
        let repo = InstanceRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();

        let first = repo
            .append_instance(&mut conn, subscription.id, date(2025, 1, 10), date(2025, 2, 10), PaymentStatus::Pending)
            .await
            .unwrap();
        let second = repo
            .append_instance(&mut conn, subscription.id, date(2025, 2, 10), date(2025, 3, 10), PaymentStatus::Pending)
            .await
            .unwrap();
        drop(conn);

        let subscription = reload(&db, subscription.id).await;
        assert_eq!(subscription.current_instance_id, Some(second.id));
        assert_ne!(first.id, second.id);

        let mut conn = db.pool().acquire().await.unwrap();
        let current = repo.current_instance(&mut conn, &subscription).await.unwrap().unwrap();
        assert_eq!(current, second);
    }

    #[tokio::test]
    async fn test_older_instance_does_not_become_current() {
        let (db, subscription) = setup_test().await;
        let repo = InstanceRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();

        let newer = repo
            .append_instance(&mut conn, subscription.id, date(2025, 5, 1), date(2025, 6, 1), PaymentStatus::Pending)
            .await
            .unwrap();
        repo.append_instance(&mut conn, subscription.id, date(2025, 3, 1), date(2025, 4, 1), PaymentStatus::Overdue)
            .await
            .unwrap();
        drop(conn);

        let subscription = reload(&db, subscription.id).await;
        assert_eq!(subscription.current_instance_id, Some(newer.id));
    }

    #[tokio::test]
    async fn test_tie_on_period_start_resolves_to_highest_id() {
        let (db, subscription) = setup_test().await;
        let repo = InstanceRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();

        repo.append_instance(&mut conn, subscription.id, date(2025, 1, 1), date(2025, 2, 1), PaymentStatus::Pending)
            .await
            .unwrap();
        let later = repo
            .append_instance(&mut conn, subscription.id, date(2025, 1, 1), date(2025, 2, 1), PaymentStatus::Pending)
            .await
            .unwrap();

        let scanned = repo
            .latest_by_period_start(&mut conn, subscription.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(scanned.id, later.id);
        drop(conn);

        let subscription = reload(&db, subscription.id).await;
        assert_eq!(subscription.current_instance_id, Some(later.id));
    }

    #[tokio::test]
    async fn test_current_instance_falls_back_to_scan_without_pointer() {
        let (db, subscription) = setup_test().await;
        let repo = InstanceRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();

        let latest = repo
            .append_instance(&mut conn, subscription.id, date(2025, 2, 1), date(2025, 3, 1), PaymentStatus::Pending)
            .await
            .unwrap();

        let mut without_pointer = subscription.clone();
        without_pointer.current_instance_id = None;
        let current = repo.current_instance(&mut conn, &without_pointer).await.unwrap();
        assert_eq!(current.map(|i| i.id), Some(latest.id));
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let (db, subscription) = setup_test().await;
        let repo = InstanceRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();

        let instance = repo
            .append_instance(&mut conn, subscription.id, date(2025, 1, 1), date(2025, 2, 1), PaymentStatus::Overdue)
            .await
            .unwrap();
        let paid_at = date(2025, 2, 3).and_hms_opt(9, 30, 0).unwrap().and_utc();

        assert!(repo.mark_paid(&mut conn, instance.id, paid_at).await.unwrap());
        assert!(!repo.mark_paid(&mut conn, instance.id, paid_at).await.unwrap());
        assert!(!repo.mark_paid(&mut conn, 9999, paid_at).await.unwrap());

        let stored = repo.get_instance(&mut conn, instance.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.paid_at, Some(paid_at));
    }

    #[tokio::test]
    async fn test_list_for_subscription_is_in_period_order() {
        let (db, subscription) = setup_test().await;
        let repo = InstanceRepository::new();
        let mut conn = db.pool().acquire().await.unwrap();

        for (start, end) in [
            (date(2025, 3, 1), date(2025, 4, 1)),
            (date(2025, 1, 1), date(2025, 2, 1)),
            (date(2025, 2, 1), date(2025, 3, 1)),
        ] {
            repo.append_instance(&mut conn, subscription.id, start, end, PaymentStatus::Pending)
                .await
                .unwrap();
        }

        let starts: Vec<NaiveDate> = repo
            .list_for_subscription(&mut conn, subscription.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.period_start)
            .collect();
        assert_eq!(starts, vec![date(2025, 1, 1), date(2025, 2, 1), date(2025, 3, 1)]);
    }
}
