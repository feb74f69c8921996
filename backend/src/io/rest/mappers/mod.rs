//! Conversions between the `shared` wire DTOs and domain types.

pub mod report_mapper;
pub mod subscription_mapper;
