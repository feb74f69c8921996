use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::domain::commands::report::SubscriptionFilter;
use crate::domain::models::{BillingInstance, Subscription, SubscriptionSnapshot};

const SNAPSHOT_SELECT: &str = r#"
    SELECT s.id, s.service_name, s.cost, s.category, s.canceled, s.current_instance_id,
           i.id AS instance_id, i.subscription_id AS instance_subscription_id,
           i.period_start, i.period_end, i.payment_status, i.paid_at
    FROM subscriptions s
    LEFT JOIN subscription_instances i ON i.id = s.current_instance_id
"#;

/// Repository for subscription records
#[derive(Clone, Default)]
pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub fn new() -> Self {
        Self
    }

    /// Insert a subscription with no billing instances yet
    pub async fn insert_subscription(
        &self,
        conn: &mut SqliteConnection,
        service_name: &str,
        cost: f64,
        category: Option<&str>,
        canceled: bool,
    ) -> Result<Subscription> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (service_name, cost, category, canceled)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(service_name)
        .bind(cost)
        .bind(category)
        .bind(canceled)
        .execute(&mut *conn)
        .await?;

        Ok(Subscription {
            id: result.last_insert_rowid(),
            service_name: service_name.to_string(),
            cost,
            category: category.map(str::to_string),
            canceled,
            current_instance_id: None,
        })
    }

    /// Get a subscription by ID
    pub async fn get_subscription(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            r#"
            SELECT id, service_name, cost, category, canceled, current_instance_id
            FROM subscriptions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    /// Persist the editable fields of a subscription
    pub async fn update_details(
        &self,
        conn: &mut SqliteConnection,
        subscription: &Subscription,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET service_name = ?, cost = ?, category = ?
            WHERE id = ?
            "#,
        )
        .bind(&subscription.service_name)
        .bind(subscription.cost)
        .bind(&subscription.category)
        .bind(subscription.id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Set the canceled flag. There is no way back to active.
    pub async fn mark_canceled(&self, conn: &mut SqliteConnection, id: i64) -> Result<()> {
        sqlx::query("UPDATE subscriptions SET canceled = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Subscription joined with its current instance
    pub async fn get_snapshot(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<SubscriptionSnapshot>> {
        let mut query = QueryBuilder::<Sqlite>::new(SNAPSHOT_SELECT);
        query.push(" WHERE s.id = ").push_bind(id);

        let row = query.build().fetch_optional(&mut *conn).await?;
        row.as_ref().map(snapshot_from_row).transpose()
    }

    /// Subscriptions joined with their current instances, ordered by ID
    pub async fn list_snapshots(
        &self,
        conn: &mut SqliteConnection,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<SubscriptionSnapshot>> {
        let mut query = QueryBuilder::<Sqlite>::new(SNAPSHOT_SELECT);
        match filter {
            SubscriptionFilter::All => {}
            SubscriptionFilter::RenewingBy(horizon) => {
                query.push(" WHERE i.period_end <= ").push_bind(*horizon);
            }
            SubscriptionFilter::PaymentStatus(status) => {
                query.push(" WHERE i.payment_status = ").push_bind(status.as_str());
            }
            SubscriptionFilter::Category(category) => {
                query.push(" WHERE s.category = ").push_bind(category.clone());
            }
        }
        query.push(" ORDER BY s.id ASC");

        let rows = query.build().fetch_all(&mut *conn).await?;
        rows.iter().map(snapshot_from_row).collect()
    }

    /// All subscriptions that are not canceled
    pub async fn list_active(&self, conn: &mut SqliteConnection) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT id, service_name, cost, category, canceled, current_instance_id
            FROM subscriptions
            WHERE canceled = 0
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(subscription_from_row).collect()
    }
}

fn subscription_from_row(row: &SqliteRow) -> Result<Subscription> {
    Ok(Subscription {
        id: row.try_get("id")?,
        service_name: row.try_get("service_name")?,
        cost: row.try_get("cost")?,
        category: row.try_get("category")?,
        canceled: row.try_get("canceled")?,
        current_instance_id: row.try_get("current_instance_id")?,
    })
}

fn snapshot_from_row(row: &SqliteRow) -> Result<SubscriptionSnapshot> {
    let subscription = subscription_from_row(row)?;
    let instance_id: Option<i64> = row.try_get("instance_id")?;

    let current_instance = match instance_id {
        Some(id) => {
            let status: String = row.try_get("payment_status")?;
            Some(BillingInstance {
                id,
                subscription_id: row.try_get("instance_subscription_id")?,
                period_start: row.try_get("period_start")?,
                period_end: row.try_get("period_end")?,
                payment_status: status.parse().map_err(|e: String| anyhow::anyhow!(e))?,
                paid_at: row.try_get("paid_at")?,
            })
        }
        None => None,
    };

    Ok(SubscriptionSnapshot {
        subscription,
        current_instance,
    })
}
