//! Shared test helpers: scripted transport, recording presenter, fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use pdac_autocomplete::error::LookupError;
use pdac_autocomplete::services::{Query, RequestHandler, Transport};
use pdac_autocomplete::{Presenter, SelectionController, SuggestionItem, WidgetEvent, WidgetSettings};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const API_ROOT: &str = "https://pdok.test/v3_1";

// ============================================================================
// Scripted transport
// ============================================================================

/// In-memory transport answering per endpoint
///
/// Counts started, completed and aborted (dropped mid-flight) calls.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, Result<Value, LookupError>>>,
    latency: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(String, Query)>>,
    started: AtomicUsize,
    completed: AtomicUsize,
    aborted: AtomicUsize,
}

struct AbortGuard<'a> {
    aborted: &'a AtomicUsize,
    armed: bool,
}

impl Drop for AbortGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, endpoint: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Ok(body));
    }

    pub fn fail(&self, endpoint: &str, error: LookupError) {
        self.responses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Err(error));
    }

    pub fn set_latency(&self, endpoint: &str, latency: Duration) {
        self.latency
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), latency);
    }

    /// `(endpoint, query)` for every started call, in order
    pub fn calls(&self) -> Vec<(String, Query)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Query> {
        self.calls()
            .into_iter()
            .filter(|(e, _)| e == endpoint)
            .map(|(_, q)| q)
            .collect()
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str, query: &Query) -> Result<Value, LookupError> {
        let endpoint = url.rsplit('/').next().unwrap_or_default().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.clone(), query.clone()));
        self.started.fetch_add(1, Ordering::SeqCst);

        let mut guard = AbortGuard {
            aborted: &self.aborted,
            armed: true,
        };

        let latency = self.latency.lock().unwrap().get(&endpoint).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        guard.armed = false;
        self.completed.fetch_add(1, Ordering::SeqCst);

        self.responses
            .lock()
            .unwrap()
            .get(&endpoint)
            .cloned()
            .unwrap_or_else(|| Err(LookupError::Api(404, format!("no script for {endpoint}"))))
    }
}

// ============================================================================
// Recording presenter
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    Render(Vec<String>),
    StartLoader,
    StopLoader,
    Check,
    Uncheck,
    Warn(String),
    SetInput(String),
}

#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn renders(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PresenterCall::Render(items) => Some(items),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PresenterCall::Warn(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &PresenterCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn push(&self, call: PresenterCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, items: &[SuggestionItem]) {
        self.push(PresenterCall::Render(
            items.iter().map(|i| i.address().formatted()).collect(),
        ));
    }

    fn start_loader(&self) {
        self.push(PresenterCall::StartLoader);
    }

    fn stop_loader(&self) {
        self.push(PresenterCall::StopLoader);
    }

    fn check(&self) {
        self.push(PresenterCall::Check);
    }

    fn uncheck(&self) {
        self.push(PresenterCall::Uncheck);
    }

    fn warn(&self, message: &str) {
        self.push(PresenterCall::Warn(message.to_string()));
    }

    fn set_input(&self, text: &str) {
        self.push(PresenterCall::SetInput(text.to_string()));
    }
}

// ============================================================================
// Controller harness
// ============================================================================

pub struct Harness {
    pub controller: Arc<SelectionController>,
    pub presenter: Arc<RecordingPresenter>,
    pub transport: Arc<FakeTransport>,
    pub events: Arc<Mutex<Vec<WidgetEvent>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: WidgetSettings) -> Self {
        let transport = FakeTransport::new();
        let presenter = Arc::new(RecordingPresenter::default());
        let handler = Arc::new(RequestHandler::new(API_ROOT, transport.clone()));
        let controller = Arc::new(SelectionController::new(
            handler,
            presenter.clone(),
            settings,
        ));

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);
        controller.on("*", move |_topic, event| {
            events_clone.lock().unwrap().push(event.clone());
        });

        Self {
            controller,
            presenter,
            transport,
            events,
        }
    }

    pub fn event_topics(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.topic()).collect()
    }
}

pub fn test_settings() -> WidgetSettings {
    WidgetSettings {
        api_root: API_ROOT.to_string(),
        ..WidgetSettings::default()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Suggest-style doc (no centroid)
pub fn doc(id: &str, kind: &str, name: &str) -> Value {
    json!({ "id": id, "type": kind, "weergavenaam": name })
}

/// Free/lookup-style `adres` doc with centroid
pub fn verified_doc(id: &str, name: &str, postcode: Option<&str>) -> Value {
    let mut doc = json!({
        "id": id,
        "type": "adres",
        "weergavenaam": name,
        "centroide_ll": "POINT(5.12 52.09)"
    });
    if let Some(postcode) = postcode {
        doc["postcode"] = json!(postcode);
    }
    doc
}

/// Suggest response with a highlight entry per doc
pub fn suggest_body(docs: Vec<Value>) -> Value {
    let highlighting: serde_json::Map<String, Value> = docs
        .iter()
        .map(|d| {
            (
                d["id"].as_str().unwrap().to_string(),
                json!({ "suggest": [d["weergavenaam"].clone()] }),
            )
        })
        .collect();

    json!({
        "response": { "numFound": docs.len(), "docs": docs },
        "highlighting": highlighting
    })
}

/// Free/lookup/reverse response
pub fn docs_body(docs: Vec<Value>) -> Value {
    json!({ "response": { "numFound": docs.len(), "docs": docs } })
}

pub fn q(value: &str) -> Query {
    Query::new().param("q", value)
}
