//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the DTOs defined in the
//! `shared` crate to these internal types.

pub mod subscription {
    use crate::domain::errors::{LedgerError, LedgerResult};
    use crate::domain::models::{BillingInstance, Reminder, Subscription, SubscriptionSnapshot};

    /// Cost as supplied by a caller, before numeric validation.
    #[derive(Debug, Clone, PartialEq)]
    pub enum CostInput {
        Amount(f64),
        Text(String),
    }

    impl CostInput {
        /// Resolve to a finite, non-negative amount.
        pub fn resolve(&self) -> LedgerResult<f64> {
            let amount = match self {
                CostInput::Amount(amount) => *amount,
                CostInput::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                    LedgerError::validation(format!("cost must be numeric, got '{}'", text))
                })?,
            };
            if !amount.is_finite() {
                return Err(LedgerError::validation("cost must be a finite number"));
            }
            if amount < 0.0 {
                return Err(LedgerError::validation("cost cannot be negative"));
            }
            Ok(amount)
        }
    }

    /// Input for registering a new subscription.
    #[derive(Debug, Clone, Default)]
    pub struct RegisterSubscriptionCommand {
        pub service_name: Option<String>,
        pub cost: Option<CostInput>,
        pub category: Option<String>,
        pub canceled: bool,
        /// YYYY-MM-DD
        pub renewal_date: Option<String>,
    }

    /// Input for editing a subscription.
    /// Outer `None` = field not supplied, `Some(None)` = supplied as null.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateSubscriptionCommand {
        pub service_name: Option<Option<String>>,
        pub cost: Option<Option<CostInput>>,
        pub category: Option<Option<String>>,
    }

    impl UpdateSubscriptionCommand {
        pub fn is_empty(&self) -> bool {
            self.service_name.is_none() && self.cost.is_none() && self.category.is_none()
        }
    }

    /// Result of registering a subscription.
    #[derive(Debug, Clone)]
    pub struct RegistrationResult {
        pub snapshot: SubscriptionSnapshot,
        pub reminder: Option<Reminder>,
    }

    /// Result of canceling a subscription.
    #[derive(Debug, Clone)]
    pub struct CancelResult {
        pub subscription: Subscription,
        pub reminders_removed: u64,
    }

    /// Result of paying a billing instance.
    #[derive(Debug, Clone)]
    pub struct PaymentResult {
        pub paid_instance: BillingInstance,
        pub next_instance: BillingInstance,
        pub snapshot: SubscriptionSnapshot,
    }
}

pub mod report {
    use crate::domain::models::PaymentStatus;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    /// Filter applied to the subscription / current-instance join.
    #[derive(Debug, Clone, PartialEq)]
    pub enum SubscriptionFilter {
        All,
        /// Current instance ends on or before this date
        RenewingBy(NaiveDate),
        /// Current instance has this status
        PaymentStatus(PaymentStatus),
        /// Exact category match
        Category(String),
    }

    /// Cost totals over active subscriptions.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CostSummary {
        pub total_monthly_cost: f64,
        pub total_annual_cost: f64,
        pub cost_by_category: BTreeMap<String, f64>,
    }
}
