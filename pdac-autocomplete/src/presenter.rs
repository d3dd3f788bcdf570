//! Presentation-layer seam
//!
//! The controller drives the UI through these calls; markup, styling and
//! keyboard handling live on the other side.

use crate::models::SuggestionItem;

/// Imperative UI calls made by the controller
pub trait Presenter: Send + Sync {
    /// Replace the suggestion list (empty clears it)
    fn render(&self, items: &[SuggestionItem]);

    fn start_loader(&self);

    fn stop_loader(&self);

    /// Mark the input as holding a confirmed address
    fn check(&self);

    /// Clear the confirmed mark
    fn uncheck(&self);

    /// Show a warning next to the input
    fn warn(&self, message: &str);

    /// Write text back into the input
    ///
    /// Must not feed back into `SelectionController::on_input`.
    fn set_input(&self, text: &str);
}
