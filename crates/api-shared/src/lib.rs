//! # API Shared
//!
//! Shared definitions for PMS APIs.
//!
//! Contains:
//! - Wire types (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `pms` CLI for common functionality.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
