//! # Subscription Tracker Backend
//!
//! Tracks recurring subscriptions as a ledger of monthly billing periods,
//! with payment rules, renewal reminders and cost reporting.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, mappers)
//!     ↓
//! Domain Layer (ledger, reminders, reporting)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{Clock, ReminderService, ReportingService, SubscriptionLedger};
use crate::io::rest::{reminder_apis, report_apis, subscription_apis};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub ledger: SubscriptionLedger,
    pub reminder_service: ReminderService,
    pub reporting_service: ReportingService,
}

impl AppState {
    /// Wire every service to the same database and clock
    pub fn new(db: DbConnection, clock: Clock) -> Self {
        Self {
            ledger: SubscriptionLedger::new(db.clone(), clock),
            reminder_service: ReminderService::new(db.clone()),
            reporting_service: ReportingService::new(db, clock),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig, clock: Clock) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up application state");
    Ok(AppState::new(db, clock))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: Option<HeaderValue>) -> Router {
    let allow_origin = match cors_origin {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(subscription_apis::router())
        .merge(reminder_apis::router())
        .merge(report_apis::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
