//! # Domain Module
//!
//! Business rules of the subscription tracker, independent of HTTP.
//!
//! ## Module Organization
//!
//! - **ledger_service**: registration, edits, cancellation and payment; the
//!   only writer of billing instances and reminders
//! - **reminder_service**: read-only listing of pending reminders
//! - **reporting_service**: filtered listings and cost summaries
//! - **period**: calendar-month arithmetic for billing periods
//! - **clock**: injectable source of today's date
//!
//! ## Core Concepts
//!
//! - **Subscription**: a recurring service with a monthly cost
//! - **Billing instance**: one month-long period ending on a renewal date, with
//!   its own payment status
//! - **Current instance**: the instance with the latest period start; its
//!   period end is the subscription's renewal date
//! - **Reminder**: a notice scheduled for the day before a renewal

pub mod clock;
pub mod commands;
pub mod errors;
pub mod ledger_service;
pub mod models;
pub mod period;
pub mod reminder_service;
pub mod reporting_service;

pub use clock::Clock;
pub use errors::{LedgerError, LedgerResult};
pub use ledger_service::SubscriptionLedger;
pub use reminder_service::ReminderService;
pub use reporting_service::ReportingService;
