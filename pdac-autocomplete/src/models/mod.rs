//! Data models for pdac-autocomplete

pub mod address;
pub mod record;
pub mod suggestion;

pub use address::Address;
pub use record::{DocList, Highlight, RawRecord, RecordType, SearchResponse};
pub use suggestion::{SuggestionItem, VerifiedAddress};
