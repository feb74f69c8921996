//! Reporting service for the subscription tracker.
//!
//! All reads resolve each subscription against its current billing instance,
//! so renewal dates and payment status always describe the latest period.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::report::{CostSummary, SubscriptionFilter};
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::domain::models::subscription::category_bucket;
use crate::domain::models::{BillingInstance, PaymentStatus, SubscriptionSnapshot};
use crate::domain::period::clamp_to_storable;
use crate::storage::{DbConnection, InstanceRepository, SubscriptionRepository};

/// Service answering listing and cost summary queries
#[derive(Clone)]
pub struct ReportingService {
    db: DbConnection,
    clock: Clock,
    subscriptions: SubscriptionRepository,
    instances: InstanceRepository,
}

impl ReportingService {
    pub fn new(db: DbConnection, clock: Clock) -> Self {
        Self {
            db,
            clock,
            subscriptions: SubscriptionRepository::new(),
            instances: InstanceRepository::new(),
        }
    }

    /// List subscriptions, optionally only those whose current renewal date
    /// falls within `days` days from today (negative values look backwards).
    pub async fn list_subscriptions(
        &self,
        days: Option<i64>,
    ) -> LedgerResult<Vec<SubscriptionSnapshot>> {
        let filter = match days {
            Some(days) => {
                let horizon = horizon_from(self.clock.today(), days)
                    .ok_or_else(|| LedgerError::validation("days is out of range"))?;
                info!("Listing subscriptions renewing on or before {}", horizon);
                SubscriptionFilter::RenewingBy(horizon)
            }
            None => {
                info!("Listing all subscriptions");
                SubscriptionFilter::All
            }
        };
        self.list(&filter).await
    }

    /// Subscriptions whose current instance has the given status
    pub async fn by_payment_status(
        &self,
        status: PaymentStatus,
    ) -> LedgerResult<Vec<SubscriptionSnapshot>> {
        info!("Listing subscriptions with payment status {}", status);
        self.list(&SubscriptionFilter::PaymentStatus(status)).await
    }

    /// Subscriptions with exactly this category
    pub async fn by_category(&self, category: &str) -> LedgerResult<Vec<SubscriptionSnapshot>> {
        info!("Listing subscriptions in category '{}'", category);
        self.list(&SubscriptionFilter::Category(category.to_string()))
            .await
    }

    pub async fn get_subscription(&self, id: i64) -> LedgerResult<SubscriptionSnapshot> {
        let mut conn = self.db.pool().acquire().await?;
        self.subscriptions
            .get_snapshot(&mut conn, id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Subscription not found"))
    }

    /// Full billing history of a subscription in period order
    pub async fn list_instances(&self, id: i64) -> LedgerResult<Vec<BillingInstance>> {
        let mut conn = self.db.pool().acquire().await?;
        if self.subscriptions.get_subscription(&mut conn, id).await?.is_none() {
            return Err(LedgerError::not_found("Subscription not found"));
        }
        Ok(self.instances.list_for_subscription(&mut conn, id).await?)
    }

    /// Monthly and annual totals over subscriptions that are not canceled,
    /// with a per-category breakdown of the monthly cost.
    pub async fn summary(&self) -> LedgerResult<CostSummary> {
        let mut conn = self.db.pool().acquire().await?;
        let active = self.subscriptions.list_active(&mut conn).await?;

        let mut total_monthly_cost = 0.0;
        let mut cost_by_category: BTreeMap<String, f64> = BTreeMap::new();
        for subscription in &active {
            total_monthly_cost += subscription.cost;
            *cost_by_category
                .entry(category_bucket(subscription.category.as_deref()))
                .or_insert(0.0) += subscription.cost;
        }

        info!(
            "Cost summary over {} active subscription(s): {:.2}/month",
            active.len(),
            total_monthly_cost
        );
        Ok(CostSummary {
            total_monthly_cost,
            total_annual_cost: total_monthly_cost * 12.0,
            cost_by_category,
        })
    }

    async fn list(&self, filter: &SubscriptionFilter) -> LedgerResult<Vec<SubscriptionSnapshot>> {
        let mut conn = self.db.pool().acquire().await?;
        let snapshots = self.subscriptions.list_snapshots(&mut conn, filter).await?;
        info!("Found {} subscription(s)", snapshots.len());
        Ok(snapshots)
    }
}

/// `today` shifted by a signed number of days, `None` when out of range
fn horizon_from(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    let horizon = if days >= 0 {
        today.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        today.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    horizon.map(clamp_to_storable)
}
