//! OpenAPI schema definitions for domain types.
//!
//! `Error` serialises through a private DTO, so its schema is described here
//! in the adapter layer instead of on the domain type.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ErrorCode;

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = crate::domain::Error)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    /// Human-readable message returned to clients.
    #[schema(example = "passwords do not match")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "6f1c2a0e-8a5d-4c8e-9d3b-2f7e5c1a9b40")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. the offending field or `redirectTo`.
    details: Option<serde_json::Value>,
}
