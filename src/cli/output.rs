//! CLI output: JSON rendering of results and errors.

use crate::error::CatalogError;
use serde::Serialize;
use serde_json::json;

/// Stable machine-readable category for an error.
pub fn error_code(e: &CatalogError) -> &'static str {
    match e {
        CatalogError::NotFound { .. } => "not_found",
        CatalogError::PreconditionFailed(_) => "precondition_failed",
        CatalogError::Busy(_) => "busy",
        CatalogError::InvalidName { .. } => "invalid_name",
        CatalogError::CycleDetected(_) => "cycle_detected",
        CatalogError::RenderFailed(_) => "render_failed",
        CatalogError::ConfigError(_) => "config_error",
        CatalogError::StorageError(_) => "storage_error",
    }
}

/// Map an error to the JSON document printed on stderr.
pub fn map_error(e: &CatalogError) -> String {
    json!({
        "error": error_code(e),
        "message": e.to_string(),
        "retryable": e.is_retryable(),
    })
    .to_string()
}

/// Pretty JSON for a command result.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CatalogError::RenderFailed(format!("Failed to encode output: {}", e)))
}
