use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Payment state of a billing instance.
///
/// `Overdue` is decided once, when the instance is created for a renewal date
/// that has already passed. Stored instances do not drift from pending to
/// overdue later. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Overdue,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Paid => "paid",
        }
    }

    /// Status for a freshly created instance ending on `period_end`
    pub fn initial(period_end: NaiveDate, today: NaiveDate) -> Self {
        if period_end < today {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Pending
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "overdue" => Ok(PaymentStatus::Overdue),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(format!(
                "Unknown payment_status '{}'. Expected one of: pending, overdue, paid",
                other
            )),
        }
    }
}

/// One concrete billing period of a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingInstance {
    pub id: i64,
    pub subscription_id: i64,
    pub period_start: NaiveDate,
    /// The renewal date: payment for this period is due on this day
    pub period_end: NaiveDate,
    pub payment_status: PaymentStatus,
    /// Set iff `payment_status` is `Paid`
    pub paid_at: Option<DateTime<Utc>>,
}

impl BillingInstance {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}
