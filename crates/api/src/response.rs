//! Shared response envelope types for API handlers.
//!
//! Read endpoints use a `{ "data": ... }` envelope; payment confirmations
//! use `{ "message": ..., "data": ... }` so clients get a display string
//! alongside the settled entity. Use these instead of ad-hoc
//! `serde_json::json!` to get compile-time type safety and consistent
//! serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ..., "data": T }` envelope for payment confirmations.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub message: &'static str,
    pub data: T,
}
