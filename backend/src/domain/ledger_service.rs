//! Subscription ledger: the write side of the tracker.
//!
//! Every operation runs inside one single-writer transaction: the current
//! state is read, the change is computed, and the result is written before
//! commit. A failed precondition returns before commit, so nothing partial
//! is ever persisted.
//!
//! ## Billing lifecycle
//!
//! - Registering creates the first instance, covering the month that ends on
//!   the declared renewal date. It is `overdue` if that date already passed,
//!   `pending` otherwise.
//! - Paying an instance marks it `paid` and appends the next period, which
//!   starts on the paid period's end and ends one month later.
//! - `pay_current` only accepts payment on the renewal date itself;
//!   `pay_instance` accepts any unpaid instance whose renewal date is not in
//!   the future.

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::subscription::{
    CancelResult, PaymentResult, RegisterSubscriptionCommand, RegistrationResult,
    UpdateSubscriptionCommand,
};
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::domain::models::subscription::normalize_category;
use crate::domain::models::{BillingInstance, PaymentStatus, Subscription, SubscriptionSnapshot};
use crate::domain::period::{
    is_storable, next_period_end, period_start_for, reminder_send_date, MAX_STORABLE_YEAR,
    MIN_STORABLE_YEAR,
};
use crate::storage::{DbConnection, InstanceRepository, ReminderRepository, SubscriptionRepository};

/// Service owning subscription registration, edits, cancellation and payment
#[derive(Clone)]
pub struct SubscriptionLedger {
    db: DbConnection,
    clock: Clock,
    subscriptions: SubscriptionRepository,
    instances: InstanceRepository,
    reminders: ReminderRepository,
}

impl SubscriptionLedger {
    pub fn new(db: DbConnection, clock: Clock) -> Self {
        Self {
            db,
            clock,
            subscriptions: SubscriptionRepository::new(),
            instances: InstanceRepository::new(),
            reminders: ReminderRepository::new(),
        }
    }

    /// Register a subscription together with its first billing instance and,
    /// when the reminder date has not passed, a reminder.
    pub async fn register(
        &self,
        command: RegisterSubscriptionCommand,
    ) -> LedgerResult<RegistrationResult> {
        info!("Registering subscription: {:?}", command);

        let service_name = required_service_name(command.service_name.as_deref())?;
        let cost = command
            .cost
            .as_ref()
            .ok_or_else(|| LedgerError::validation("Missing required field: cost"))?
            .resolve()?;
        let category = normalize_category(command.category.as_deref());
        let period_end = parse_renewal_date(command.renewal_date.as_deref())?;
        let period_start = period_start_for(period_end)
            .ok_or_else(|| LedgerError::validation("renewal_date is out of range"))?;

        let today = self.clock.today();
        let status = PaymentStatus::initial(period_end, today);
        // Canceled subscriptions never own reminders
        let send_date = reminder_send_date(period_end)
            .filter(|send_date| *send_date >= today && !command.canceled);

        let mut tx = self.db.begin_write().await?;

        let mut subscription = self
            .subscriptions
            .insert_subscription(
                tx.conn(),
                &service_name,
                cost,
                category.as_deref(),
                command.canceled,
            )
            .await?;
        let instance = self
            .instances
            .append_instance(tx.conn(), subscription.id, period_start, period_end, status)
            .await?;
        subscription.current_instance_id = Some(instance.id);

        let reminder = match send_date {
            Some(send_date) => Some(
                self.reminders
                    .insert_reminder(tx.conn(), subscription.id, send_date, self.clock.now())
                    .await?,
            ),
            None => None,
        };

        tx.commit().await?;

        info!(
            "Registered subscription {} ({}), first instance {} due {} [{}], reminder: {}",
            subscription.id,
            subscription.service_name,
            instance.id,
            instance.period_end,
            instance.payment_status,
            reminder.is_some()
        );

        Ok(RegistrationResult {
            snapshot: SubscriptionSnapshot {
                subscription,
                current_instance: Some(instance),
            },
            reminder,
        })
    }

    /// Edit service name, cost and/or category. Billing fields are not editable.
    pub async fn update(
        &self,
        id: i64,
        command: UpdateSubscriptionCommand,
    ) -> LedgerResult<SubscriptionSnapshot> {
        info!("Updating subscription {}: {:?}", id, command);

        let mut tx = self.db.begin_write().await?;
        let mut subscription = self.load_subscription(tx.conn(), id).await?;

        if command.is_empty() {
            return Err(LedgerError::validation(
                "No editable fields provided. Only service_name, cost, and category can be updated.",
            ));
        }

        if let Some(service_name) = command.service_name {
            subscription.service_name = service_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| LedgerError::validation("service_name cannot be empty"))?
                .to_string();
        }
        if let Some(cost) = command.cost {
            subscription.cost = cost
                .ok_or_else(|| LedgerError::validation("cost cannot be null"))?
                .resolve()?;
        }
        if let Some(category) = command.category {
            subscription.category = normalize_category(category.as_deref());
        }

        self.subscriptions
            .update_details(tx.conn(), &subscription)
            .await?;
        let current_instance = self
            .instances
            .current_instance(tx.conn(), &subscription)
            .await?;

        tx.commit().await?;

        info!("Updated subscription {}", id);
        Ok(SubscriptionSnapshot {
            subscription,
            current_instance,
        })
    }

    /// Cancel a subscription and drop its reminders. Billing history stays.
    /// Canceling twice is not an error.
    pub async fn cancel(&self, id: i64) -> LedgerResult<CancelResult> {
        info!("Canceling subscription {}", id);

        let mut tx = self.db.begin_write().await?;
        let mut subscription = self.load_subscription(tx.conn(), id).await?;

        if subscription.canceled {
            info!("Subscription {} was already canceled", id);
        } else {
            self.subscriptions.mark_canceled(tx.conn(), id).await?;
            subscription.canceled = true;
        }
        let reminders_removed = self
            .reminders
            .delete_for_subscription(tx.conn(), id)
            .await?;

        tx.commit().await?;

        info!(
            "Canceled subscription {}, removed {} reminder(s)",
            id, reminders_removed
        );
        Ok(CancelResult {
            subscription,
            reminders_removed,
        })
    }

    /// Pay the current instance. Only allowed on its renewal date.
    pub async fn pay_current(&self, id: i64) -> LedgerResult<PaymentResult> {
        info!("Paying current instance of subscription {}", id);
        let today = self.clock.today();

        let mut tx = self.db.begin_write().await?;
        let subscription = self.load_subscription(tx.conn(), id).await?;

        let current = match self
            .instances
            .current_instance(tx.conn(), &subscription)
            .await?
        {
            Some(instance) if instance.period_end == today => instance,
            other => {
                warn!(
                    "Rejected payment for subscription {}: renewal date {:?}, today {}",
                    id,
                    other.map(|i| i.period_end),
                    today
                );
                return Err(LedgerError::validation(
                    "Subscription can only be marked as paid on its renewal date.",
                ));
            }
        };
        if current.is_paid() {
            return Err(LedgerError::validation("Already paid"));
        }

        let result = self.settle(tx.conn(), current).await?;
        tx.commit().await?;

        info!(
            "Paid instance {} of subscription {}, next renewal {}",
            result.paid_instance.id, id, result.next_instance.period_end
        );
        Ok(result)
    }

    /// Pay a specific instance, current or not, as long as it is unpaid and
    /// its renewal date is today or earlier.
    pub async fn pay_instance(
        &self,
        subscription_id: i64,
        instance_id: i64,
    ) -> LedgerResult<PaymentResult> {
        info!(
            "Paying instance {} of subscription {}",
            instance_id, subscription_id
        );
        let today = self.clock.today();

        let mut tx = self.db.begin_write().await?;
        let instance = self
            .instances
            .get_instance(tx.conn(), instance_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Subscription instance not found"))?;

        if instance.subscription_id != subscription_id {
            return Err(LedgerError::validation(
                "Instance does not belong to the given subscription",
            ));
        }
        if instance.is_paid() {
            return Err(LedgerError::validation("Already paid"));
        }
        if instance.period_end > today {
            warn!(
                "Rejected payment for instance {}: renewal date {} is after {}",
                instance_id, instance.period_end, today
            );
            return Err(LedgerError::validation(
                "Cannot pay for a future renewal date.",
            ));
        }

        let result = self.settle(tx.conn(), instance).await?;
        tx.commit().await?;

        info!(
            "Paid instance {} of subscription {}, appended instance {} ending {}",
            instance_id, subscription_id, result.next_instance.id, result.next_instance.period_end
        );
        Ok(result)
    }

    /// Mark `instance` paid and append the period that follows it.
    async fn settle(
        &self,
        conn: &mut SqliteConnection,
        instance: BillingInstance,
    ) -> LedgerResult<PaymentResult> {
        let next_end = next_period_end(instance.period_end)
            .ok_or_else(|| LedgerError::validation("Next billing period is out of range"))?;
        let paid_at = self.clock.now();

        if !self.instances.mark_paid(conn, instance.id, paid_at).await? {
            return Err(LedgerError::validation("Already paid"));
        }
        let paid_instance = BillingInstance {
            payment_status: PaymentStatus::Paid,
            paid_at: Some(paid_at),
            ..instance
        };

        let next_instance = self
            .instances
            .append_instance(
                conn,
                paid_instance.subscription_id,
                paid_instance.period_end,
                next_end,
                PaymentStatus::Pending,
            )
            .await?;

        let subscription = self
            .load_subscription(conn, paid_instance.subscription_id)
            .await?;
        let current_instance = self.instances.current_instance(conn, &subscription).await?;

        Ok(PaymentResult {
            paid_instance,
            next_instance,
            snapshot: SubscriptionSnapshot {
                subscription,
                current_instance,
            },
        })
    }

    async fn load_subscription(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> LedgerResult<Subscription> {
        self.subscriptions
            .get_subscription(conn, id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Subscription not found"))
    }
}

fn required_service_name(service_name: Option<&str>) -> LedgerResult<String> {
    service_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LedgerError::validation("Missing required field: service_name"))
}

fn parse_renewal_date(renewal_date: Option<&str>) -> LedgerResult<NaiveDate> {
    let raw = renewal_date
        .ok_or_else(|| LedgerError::validation("Missing required field: renewal_date"))?;
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(format!(
            "renewal_date must be a date in YYYY-MM-DD format, got '{}'",
            raw
        ))
    })?;
    if !is_storable(date) {
        return Err(LedgerError::validation(format!(
            "renewal_date must be between years {} and {}, got '{}'",
            MIN_STORABLE_YEAR, MAX_STORABLE_YEAR, raw
        )));
    }
    Ok(date)
}
