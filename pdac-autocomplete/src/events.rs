//! Events published to host application code

use crate::models::{SuggestionItem, VerifiedAddress};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SELECT_TOPIC: &str = "select";
pub const UNSELECT_TOPIC: &str = "unselect";
pub const ERROR_TOPIC: &str = "error";

/// Widget event
///
/// Delivered through the controller's `EventSink` under [`WidgetEvent::topic`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetEvent {
    /// An address was verified and confirmed
    Select {
        address: Box<VerifiedAddress>,
        timestamp: DateTime<Utc>,
    },

    /// A previously confirmed address was edited
    Unselect { timestamp: DateTime<Utc> },

    /// A picked suggestion was rejected without verification
    ///
    /// Carries the raw suggestion; the host decides how to surface it.
    Error {
        suggestion: Box<SuggestionItem>,
        timestamp: DateTime<Utc>,
    },
}

impl WidgetEvent {
    pub fn select(address: VerifiedAddress) -> Self {
        WidgetEvent::Select {
            address: Box::new(address),
            timestamp: Utc::now(),
        }
    }

    pub fn unselect() -> Self {
        WidgetEvent::Unselect {
            timestamp: Utc::now(),
        }
    }

    pub fn error(suggestion: SuggestionItem) -> Self {
        WidgetEvent::Error {
            suggestion: Box::new(suggestion),
            timestamp: Utc::now(),
        }
    }

    /// Topic this event is published under
    pub fn topic(&self) -> &'static str {
        match self {
            WidgetEvent::Select { .. } => SELECT_TOPIC,
            WidgetEvent::Unselect { .. } => UNSELECT_TOPIC,
            WidgetEvent::Error { .. } => ERROR_TOPIC,
        }
    }
}
