//! # PDAC Common Library
//!
//! Shared code for the PDOK address autocomplete crates:
//! - Error types
//! - EventSink (named-topic publish/subscribe register)
//! - TOML bootstrap configuration and logging settings

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EventSink, SubscriptionId, WILDCARD_TOPIC};
