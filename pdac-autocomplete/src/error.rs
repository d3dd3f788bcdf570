//! Error types for pdac-autocomplete
//!
//! Three families are kept apart:
//! - transport failures ([`LookupError`]), surfaced as rejected lookups
//! - data-shape defects in upstream payloads ([`WidgetError`] variants)
//! - cancellation, which is not an error at all (see `RequestOutcome`)

use thiserror::Error;

/// Transport-level lookup errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Widget error type
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Lookup failed at the transport boundary
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Suggest response lacks a highlighting entry for a record
    #[error("No highlight entry for record {id}")]
    MissingHighlight { id: String },

    /// Verified record lacks `centroide_ll`
    #[error("No centroid for record {id}")]
    MissingCentroid { id: String },

    /// `centroide_ll` is not `POINT(lng lat)`
    #[error("Invalid centroid {value:?} for record {id}")]
    InvalidCentroid { id: String, value: String },

    /// Response body does not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type for widget operations
pub type WidgetResult<T> = Result<T, WidgetError>;
