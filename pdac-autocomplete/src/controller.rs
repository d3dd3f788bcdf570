//! Selection controller
//!
//! State machine behind the input field:
//!
//! ```text
//! Editing ──pick adres (≥4 fields)──▶ AwaitingVerification ──match──▶ Confirmed
//!    ▲  │                                      │
//!    │  └─pick other type / adres (<4 fields)  └──mismatch──▶ Rejected
//!    └──────────────── any input edit ◀──────────────────────────┘
//! ```
//!
//! Suggestions come from a fuzzy index; only the follow-up `free` lookup is
//! authoritative, so `select` is emitted from its result and never from the
//! picked suggestion itself.
//!
//! Every input edit bumps an epoch. Results that arrive for an older epoch
//! are dropped, so a slow response never overwrites newer state.

use crate::config::WidgetSettings;
use crate::error::{WidgetError, WidgetResult};
use crate::events::WidgetEvent;
use crate::formatter::{format_results, format_verification};
use crate::models::{RecordType, SearchResponse, SuggestionItem, VerifiedAddress};
use crate::presenter::Presenter;
use crate::services::{Endpoint, Query, RequestHandler, RequestOptions, RequestOutcome};
use pdac_common::events::{EventSink, SubscriptionId};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Minimum populated fields (street, housenumber, postal, city) for an
/// `adres` pick to be verified
pub const MIN_VERIFIABLE_FIELDS: usize = 4;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionState {
    Editing,
    AwaitingVerification,
    Confirmed,
    Rejected,
}

#[derive(Debug)]
struct Inner {
    state: SelectionState,
    input: String,
    suggestions: Vec<SuggestionItem>,
    confirmed: Option<VerifiedAddress>,
    epoch: u64,
}

enum Verification {
    Superseded,
    NotFound,
    Found(VerifiedAddress),
}

/// Request/response lifecycle and selection confirmation for one input
pub struct SelectionController {
    id: Uuid,
    handler: Arc<RequestHandler>,
    presenter: Arc<dyn Presenter>,
    events: EventSink<WidgetEvent>,
    settings: WidgetSettings,
    inner: Mutex<Inner>,
}

impl SelectionController {
    pub fn new(
        handler: Arc<RequestHandler>,
        presenter: Arc<dyn Presenter>,
        settings: WidgetSettings,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(widget = %id, api_root = %handler.api_root(), "Creating selection controller");

        Self {
            id,
            handler,
            presenter,
            events: EventSink::new(),
            settings,
            inner: Mutex::new(Inner {
                state: SelectionState::Editing,
                input: String::new(),
                suggestions: Vec::new(),
                confirmed: None,
                epoch: 0,
            }),
        }
    }

    /// Instance id used in log fields
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SelectionState {
        self.inner().state
    }

    /// `true` only while a verified address is confirmed
    pub fn is_checked(&self) -> bool {
        self.state() == SelectionState::Confirmed
    }

    pub fn input(&self) -> String {
        self.inner().input.clone()
    }

    /// Last rendered suggestion list
    pub fn suggestions(&self) -> Vec<SuggestionItem> {
        self.inner().suggestions.clone()
    }

    /// Currently confirmed address
    pub fn confirmed(&self) -> Option<VerifiedAddress> {
        self.inner().confirmed.clone()
    }

    pub fn events(&self) -> &EventSink<WidgetEvent> {
        &self.events
    }

    /// Subscribe to `select`, `unselect`, `error` or `*`
    pub fn on<F>(&self, topic: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &WidgetEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(topic, handler)
    }

    /// Raw text edit
    ///
    /// Leaves any confirmed or rejected state, then fetches suggestions for
    /// the new text (debounced, superseding earlier keystrokes).
    pub async fn on_input(&self, text: &str) {
        let epoch = self.begin_edit(Some(text), SelectionState::Editing);

        if text.trim().is_empty() {
            self.inner().suggestions.clear();
            self.presenter.render(&[]);
            return;
        }

        let query = Query::new()
            .param("q", text)
            .param("fq", &self.settings.type_filter)
            .param("rows", self.settings.suggest_rows);
        let options = RequestOptions::default().with_debounce(self.settings.debounce);

        self.presenter.start_loader();
        let fetched = self.fetch(Endpoint::Suggest, query, options).await;
        self.presenter.stop_loader();
        let items = match fetched {
            Ok(None) => return,
            Ok(Some(response)) => format_results(&response),
            Err(e) => Err(e),
        };

        if !self.is_current(epoch) {
            debug!(widget = %self.id, "Dropping suggestions for stale input");
            return;
        }

        match items {
            Ok(items) => {
                debug!(widget = %self.id, count = items.len(), "Rendering suggestions");
                self.presenter.render(&items);
                self.inner().suggestions = items;
            }
            Err(e) => self.report_failure(&e),
        }
    }

    /// User picked suggestion `index` of the last rendered list
    pub async fn select(&self, index: usize) {
        let Some(item) = self.inner().suggestions.get(index).cloned() else {
            debug!(widget = %self.id, index, "Ignoring pick outside the suggestion list");
            return;
        };
        let formatted = item.address().formatted();

        if item.record_type() != RecordType::Adres {
            // Narrow the search: place → streets, street → addresses
            self.presenter.set_input(&formatted);
            self.on_input(&formatted).await;
            return;
        }

        if item.address().populated_fields() < MIN_VERIFIABLE_FIELDS {
            info!(
                widget = %self.id,
                formatted = %formatted,
                fields = item.address().populated_fields(),
                "Picked address is incomplete"
            );
            self.begin_edit(None, SelectionState::Editing);
            self.publish(WidgetEvent::error(item));
            return;
        }

        let epoch = self.begin_edit(Some(&formatted), SelectionState::AwaitingVerification);
        self.presenter.set_input(&formatted);
        self.presenter.start_loader();

        let verification = self.verify(&formatted).await;
        self.presenter.stop_loader();
        if matches!(verification, Ok(Verification::Superseded)) {
            return;
        }

        if !self.is_current(epoch) {
            debug!(widget = %self.id, "Dropping verification for stale input");
            return;
        }

        match verification {
            Ok(Verification::Found(verified)) if verified.address.formatted() == formatted => {
                self.confirm(verified);
            }
            Ok(Verification::Found(verified)) => {
                info!(
                    widget = %self.id,
                    picked = %formatted,
                    verified = %verified.address.formatted(),
                    "Verification mismatch"
                );
                self.reject(verified.warning.as_deref());
            }
            Ok(Verification::NotFound) => {
                info!(widget = %self.id, picked = %formatted, "Verification found no record");
                self.reject(None);
            }
            Ok(Verification::Superseded) => {}
            Err(e) => {
                self.inner().state = SelectionState::Editing;
                self.report_failure(&e);
            }
        }
    }

    /// Input lost focus
    ///
    /// Warns when the text is not a confirmed address.
    pub fn on_blur(&self) {
        let needs_warning = {
            let inner = self.inner();
            inner.state != SelectionState::Confirmed && !inner.input.trim().is_empty()
        };
        if needs_warning {
            self.presenter.warn(&self.settings.messages.select_from_list);
        }
    }

    /// Fill the input from a geolocation
    ///
    /// The nearest `adres` record is found via `reverse` and fetched via
    /// `lookup`. Lookup by id is authoritative, so the result is confirmed
    /// without a further verification round.
    pub async fn locate(&self, lat: f64, lon: f64) {
        let epoch = self.begin_edit(None, SelectionState::AwaitingVerification);
        self.presenter.start_loader();

        let located = self.resolve_location(lat, lon).await;
        self.presenter.stop_loader();
        if matches!(located, Ok(Verification::Superseded)) {
            return;
        }

        if !self.is_current(epoch) {
            debug!(widget = %self.id, "Dropping geolocation for stale input");
            return;
        }

        match located {
            Ok(Verification::Found(verified)) => {
                let formatted = verified.address.formatted();
                self.inner().input = formatted.clone();
                self.presenter.set_input(&formatted);
                self.confirm(verified);
            }
            Ok(Verification::NotFound) => {
                self.inner().state = SelectionState::Editing;
                self.presenter.warn(&self.settings.messages.no_address_found);
            }
            Ok(Verification::Superseded) => {}
            Err(e) => {
                self.inner().state = SelectionState::Editing;
                self.report_failure(&e);
            }
        }
    }

    /// Start a new epoch in state `next`, leaving any current selection
    ///
    /// Unchecks the input when leaving a verified or rejected pick, and
    /// publishes `unselect` when leaving a confirmed one.
    fn begin_edit(&self, input: Option<&str>, next: SelectionState) -> u64 {
        let (epoch, previous) = {
            let mut inner = self.inner();
            inner.epoch += 1;
            if let Some(text) = input {
                inner.input = text.to_string();
            }
            inner.confirmed = None;
            let previous = std::mem::replace(&mut inner.state, next);
            (inner.epoch, previous)
        };

        if previous != SelectionState::Editing {
            self.presenter.uncheck();
        }
        if previous == SelectionState::Confirmed {
            self.publish(WidgetEvent::unselect());
        }
        epoch
    }

    async fn verify(&self, formatted: &str) -> WidgetResult<Verification> {
        let query = Query::new().param("q", formatted);
        let Some(response) = self
            .fetch(Endpoint::Free, query, RequestOptions::immediate())
            .await?
        else {
            return Ok(Verification::Superseded);
        };

        Ok(match format_verification(&response, self.settings.backfill_postal)? {
            Some(verified) => Verification::Found(verified),
            None => Verification::NotFound,
        })
    }

    async fn resolve_location(&self, lat: f64, lon: f64) -> WidgetResult<Verification> {
        let query = Query::new()
            .param("lat", lat)
            .param("lon", lon)
            .param("fq", "type:adres")
            .param("rows", 1);
        let Some(nearest) = self
            .fetch(Endpoint::Reverse, query, RequestOptions::immediate())
            .await?
        else {
            return Ok(Verification::Superseded);
        };

        let Some(id) = nearest.response.docs.first().map(|doc| doc.id.clone()) else {
            return Ok(Verification::NotFound);
        };

        let query = Query::new().param("id", id);
        let Some(record) = self
            .fetch(Endpoint::Lookup, query, RequestOptions::immediate())
            .await?
        else {
            return Ok(Verification::Superseded);
        };

        Ok(match format_verification(&record, self.settings.backfill_postal)? {
            Some(verified) => Verification::Found(verified),
            None => Verification::NotFound,
        })
    }

    /// Request and decode; `Ok(None)` when superseded
    async fn fetch(
        &self,
        endpoint: Endpoint,
        query: Query,
        options: RequestOptions,
    ) -> WidgetResult<Option<SearchResponse>> {
        match self.handler.request(endpoint, query, options).await? {
            RequestOutcome::Superseded => Ok(None),
            RequestOutcome::Ready(response) => {
                debug!(widget = %self.id, endpoint = %endpoint, cached = response.cached, "Response ready");
                response.search().map(Some)
            }
        }
    }

    fn confirm(&self, verified: VerifiedAddress) {
        info!(widget = %self.id, formatted = %verified.address.formatted(), "Address confirmed");
        {
            let mut inner = self.inner();
            inner.state = SelectionState::Confirmed;
            inner.confirmed = Some(verified.clone());
        }
        self.presenter.check();
        if let Some(warning) = &verified.warning {
            self.presenter.warn(warning);
        }
        self.publish(WidgetEvent::select(verified));
    }

    /// Data-quality warning from the verified record replaces the generic
    /// mismatch message
    fn reject(&self, warning: Option<&str>) {
        self.inner().state = SelectionState::Rejected;
        self.presenter
            .warn(warning.unwrap_or(&self.settings.messages.mismatch));
    }

    fn report_failure(&self, e: &WidgetError) {
        match e {
            WidgetError::Lookup(_) => warn!(widget = %self.id, error = %e, "Lookup failed"),
            _ => error!(widget = %self.id, error = %e, "Unexpected locatieserver payload"),
        }
        self.presenter.warn(&self.settings.messages.lookup_failed);
    }

    fn publish(&self, event: WidgetEvent) {
        let delivered = self.events.publish(event.topic(), &event);
        debug!(widget = %self.id, topic = event.topic(), delivered, "Published event");
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.inner().epoch == epoch
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("events", &self.events)
            .finish()
    }
}
