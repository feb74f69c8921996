//! # REST API Interface Layer
//!
//! HTTP endpoints for the subscription tracker. Handlers decode requests into
//! domain commands through the mappers, call a service, and translate the
//! outcome back into a DTO or an [`error::ApiError`].
//!
//! ## Error Translation
//!
//! - Unknown subscription or instance → 404
//! - Invalid input or a rejected payment → 400
//! - Anything else → 500 with a generic message
//!
//! Every error body has the shape `{"error": "..."}`.

pub mod error;
pub mod mappers;
pub mod reminder_apis;
pub mod report_apis;
pub mod subscription_apis;

pub use error::ApiError;
