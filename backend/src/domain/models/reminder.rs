use chrono::{DateTime, NaiveDate, Utc};

/// Notice scheduled for the day before a renewal.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: i64,
    pub subscription_id: i64,
    pub send_date: NaiveDate,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unsent reminder joined with the owning subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReminder {
    pub reminder: Reminder,
    pub service_name: String,
    pub cost: f64,
    pub category: Option<String>,
    pub canceled: bool,
    /// Period end of the subscription's current instance
    pub renewal_date: Option<NaiveDate>,
}
