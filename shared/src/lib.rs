use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Cost as it arrives over the wire. Clients send either a JSON number or a
/// numeric string; the backend decides whether the text is actually numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostValue {
    Number(f64),
    Text(String),
}

/// Request body for registering a subscription.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub service_name: Option<String>,
    pub cost: Option<CostValue>,
    pub category: Option<String>,
    pub canceled: Option<bool>,
    /// Date the first payment is due (YYYY-MM-DD)
    pub renewal_date: Option<String>,
}

/// Request body for editing a subscription. Only these three fields are editable.
///
/// The outer `Option` records whether the key was present at all, the inner one
/// whether it was `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSubscriptionRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub service_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub cost: Option<Option<CostValue>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category: Option<Option<String>>,
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query string for `GET /subscriptions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSubscriptionsQuery {
    /// Only include subscriptions renewing within this many days from today
    pub days: Option<i64>,
}

/// Query string for `GET /subscriptions/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusQuery {
    pub payment_status: Option<String>,
}

/// Subscription joined with its current billing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub id: i64,
    pub service_name: String,
    pub cost: f64,
    /// Period end of the current instance
    pub renewal_date: Option<String>,
    /// Payment status of the current instance
    pub payment_status: Option<String>,
    pub category: Option<String>,
    pub canceled: bool,
    pub current_instance_id: Option<i64>,
    pub current_period_start: Option<String>,
    pub current_period_end: Option<String>,
}

/// One billing period of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingInstanceView {
    pub id: i64,
    pub subscription_id: i64,
    pub period_start: String,
    pub period_end: String,
    pub payment_status: String,
    /// RFC 3339 UTC timestamp, present only once paid
    pub paid_at: Option<String>,
}

/// Result of paying a billing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub paid_instance: BillingInstanceView,
    pub next_instance: BillingInstanceView,
    pub subscription: SubscriptionView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelSubscriptionResponse {
    pub message: String,
    pub id: i64,
    pub canceled: bool,
    pub reminders_removed: u64,
}

/// Unsent reminder enriched with its subscription and current renewal date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderView {
    pub reminder_id: i64,
    pub send_date: String,
    pub sent: bool,
    pub subscription_id: i64,
    pub service_name: String,
    pub cost: f64,
    pub renewal_date: Option<String>,
    pub category: Option<String>,
    pub canceled: bool,
}

/// Cost totals over active subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummaryResponse {
    pub total_monthly_cost: f64,
    pub total_annual_cost: f64,
    pub cost_by_category: BTreeMap<String, f64>,
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
