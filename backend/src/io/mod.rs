//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services: request
//! decoding, DTO mapping and error translation. No business rules live here.

pub mod rest;
