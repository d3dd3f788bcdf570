//! pdac-autocomplete library interface
//!
//! Turns free-text typing into verified Dutch addresses using the PDOK
//! locatieserver:
//! - [`services::RequestHandler`]: per-endpoint debounced, cancellable,
//!   cached lookups
//! - [`inference`] / [`formatter`]: display names into structured addresses
//! - [`controller::SelectionController`]: pick → verify → confirm state machine
//!
//! Rendering is left to a [`presenter::Presenter`] implementation.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod formatter;
pub mod inference;
pub mod models;
pub mod presenter;
pub mod services;

pub use crate::config::WidgetSettings;
pub use crate::controller::{SelectionController, SelectionState};
pub use crate::error::{LookupError, WidgetError, WidgetResult};
pub use crate::events::WidgetEvent;
pub use crate::models::{Address, RawRecord, RecordType, SuggestionItem, VerifiedAddress};
pub use crate::presenter::Presenter;

use std::sync::Arc;

/// Build a controller talking to the live locatieserver
pub fn build_controller(
    settings: WidgetSettings,
    presenter: Arc<dyn Presenter>,
) -> Result<SelectionController, LookupError> {
    let handler = services::RequestHandler::with_http(settings.api_root.clone(), settings.timeout)?;
    Ok(SelectionController::new(Arc::new(handler), presenter, settings))
}
