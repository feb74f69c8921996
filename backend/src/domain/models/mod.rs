pub mod instance;
pub mod reminder;
pub mod subscription;

pub use instance::{BillingInstance, PaymentStatus};
pub use reminder::{PendingReminder, Reminder};
pub use subscription::{Subscription, SubscriptionSnapshot};
