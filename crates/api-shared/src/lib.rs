//! # API Shared
//!
//! Shared request/response definitions for the triage APIs.
//!
//! Contains:
//! - JSON DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `triage-run` service binary.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
