//! Enriched records handed to the presentation layer and host code

use super::{Address, RawRecord, RecordType};
use serde::Serialize;

/// One entry of the rendered suggestion list
///
/// Immutable once built by the result formatter.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionItem {
    #[serde(flatten)]
    record: RawRecord,
    address: Address,
    highlight: String,
}

impl SuggestionItem {
    pub fn new(record: RawRecord, address: Address, highlight: String) -> Self {
        Self {
            record,
            address,
            highlight,
        }
    }

    pub fn record(&self) -> &RawRecord {
        &self.record
    }

    pub fn record_type(&self) -> RecordType {
        self.record.record_type
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Highlighted HTML snippet (first `suggest` entry)
    pub fn highlight(&self) -> &str {
        &self.highlight
    }
}

/// Record returned by an authoritative lookup, with its inferred address
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedAddress {
    #[serde(flatten)]
    pub record: RawRecord,
    pub address: Address,
    /// Data-quality warning attached during verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
