//! # Storage Module
//!
//! SQLite persistence for subscriptions, billing instances and reminders.
//!
//! Repositories are stateless and operate on a borrowed `SqliteConnection`, so
//! the same code runs against a pooled connection for reads and inside a
//! [`WriteTransaction`] for ledger writes. All writes go through
//! [`DbConnection::begin_write`], which admits one writer at a time and rolls
//! back on drop.

pub mod connection;
pub mod repositories;

pub use connection::{DbConnection, WriteTransaction};
pub use repositories::{InstanceRepository, ReminderRepository, SubscriptionRepository};
