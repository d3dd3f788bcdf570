//! Request lifecycle manager
//!
//! Turns a stream of lookups into one consistent sequence per endpoint:
//! - each endpoint owns a single "current operation" slot; a new request
//!   atomically replaces the slot and cancels its predecessor
//! - cache hits return at once, without debounce or network access
//! - misses wait out the debounce window; a newer request for the same
//!   endpoint cancels the pending timer (last writer wins)
//! - the transport call races the slot's cancellation token, so a superseded
//!   call is dropped mid-flight and its response can never be observed
//! - only completed, non-cancelled fetches are written to the cache
//!
//! Endpoints are independent: a new `suggest` never cancels a `free` lookup.

use super::endpoint::{Endpoint, Query};
use super::request_cache::RequestCache;
use super::transport::{HttpTransport, Transport};
use crate::error::{LookupError, WidgetResult};
use crate::models::SearchResponse;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default quiet period before a request is sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Per-request options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Cancel the pending request for the same endpoint
    ///
    /// When `false` the request runs detached: it neither cancels the
    /// current one nor can be cancelled by later requests.
    pub cancel_previous: bool,
    /// Quiet period; zero sends immediately
    pub debounce: Duration,
}

impl RequestOptions {
    /// Cancel previous, no debounce
    pub fn immediate() -> Self {
        Self {
            debounce: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            cancel_previous: true,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Raw response body, flagged when served from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub body: Value,
    pub cached: bool,
}

impl Response {
    /// Decode the body as a search response
    pub fn search(&self) -> WidgetResult<SearchResponse> {
        SearchResponse::from_value(&self.body)
    }
}

/// How a request settled
///
/// Supersession is routine, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Ready(Response),
    /// A newer request for the same endpoint took over; result dropped
    Superseded,
}

impl RequestOutcome {
    pub fn into_response(self) -> Option<Response> {
        match self {
            RequestOutcome::Ready(response) => Some(response),
            RequestOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, RequestOutcome::Superseded)
    }
}

struct Slot {
    generation: u64,
    token: CancellationToken,
}

/// Per-endpoint request coordinator
pub struct RequestHandler {
    api_root: String,
    transport: Arc<dyn Transport>,
    cache: RequestCache,
    slots: Mutex<HashMap<Endpoint, Slot>>,
    next_generation: AtomicU64,
}

impl RequestHandler {
    pub fn new(api_root: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let api_root: String = api_root.into();
        Self {
            api_root: api_root.trim_end_matches('/').to_string(),
            transport,
            cache: RequestCache::new(),
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Handler backed by [`HttpTransport`]
    pub fn with_http(api_root: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let transport = HttpTransport::new(timeout)?;
        Ok(Self::new(api_root, Arc::new(transport)))
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// `{api_root}/{endpoint}`
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.api_root, endpoint)
    }

    /// Whether `endpoint` has a registered, not yet settled request
    pub fn is_pending(&self, endpoint: Endpoint) -> bool {
        self.slots().contains_key(&endpoint)
    }

    /// Issue a request
    ///
    /// Resolves with [`RequestOutcome::Superseded`] when a newer request for
    /// the same endpoint took over before this one completed.
    pub async fn request(
        &self,
        endpoint: Endpoint,
        query: Query,
        options: RequestOptions,
    ) -> Result<RequestOutcome, LookupError> {
        let (generation, token) = self.claim_slot(endpoint, options.cancel_previous);

        if let Some(body) = self.cache.get(endpoint, &query) {
            debug!(endpoint = %endpoint, query = %query, cached = true, "Cache hit");
            self.release_slot(endpoint, generation);
            return Ok(RequestOutcome::Ready(Response { body, cached: true }));
        }

        if !options.debounce.is_zero() {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(endpoint = %endpoint, query = %query, "Superseded during debounce");
                    return Ok(RequestOutcome::Superseded);
                }
                _ = tokio::time::sleep(options.debounce) => {}
            }
        }

        let url = self.url(endpoint);
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(endpoint = %endpoint, query = %query, "Aborted in-flight request");
                return Ok(RequestOutcome::Superseded);
            }
            result = self.transport.get_json(&url, &query) => result,
        };
        self.release_slot(endpoint, generation);

        let body = result.map_err(|e| {
            warn!(endpoint = %endpoint, query = %query, error = %e, "Lookup failed");
            e
        })?;

        self.cache.set(endpoint, &query, body.clone());
        Ok(RequestOutcome::Ready(Response {
            body,
            cached: false,
        }))
    }

    /// Register a new operation for `endpoint`, cancelling the current one
    fn claim_slot(&self, endpoint: Endpoint, cancel_previous: bool) -> (u64, CancellationToken) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        if !cancel_previous {
            return (generation, token);
        }

        let previous = self.slots().insert(
            endpoint,
            Slot {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(endpoint = %endpoint, superseded = previous.generation, "Cancelling previous request");
            previous.token.cancel();
        }

        (generation, token)
    }

    /// Clear the slot if it still belongs to `generation`
    fn release_slot(&self, endpoint: Endpoint, generation: u64) {
        let mut slots = self.slots();
        if slots.get(&endpoint).is_some_and(|s| s.generation == generation) {
            slots.remove(&endpoint);
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Endpoint, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn get_json(&self, url: &str, query: &Query) -> Result<Value, LookupError> {
            Ok(json!({ "url": url, "q": query.get("q") }))
        }
    }

    fn handler() -> RequestHandler {
        RequestHandler::new("https://example.test/v3_1/", Arc::new(EchoTransport))
    }

    #[test]
    fn test_url_joins_root_and_endpoint() {
        assert_eq!(handler().url(Endpoint::Lookup), "https://example.test/v3_1/lookup");
    }

    #[test]
    fn test_default_options() {
        let options = RequestOptions::default();
        assert!(options.cancel_previous);
        assert_eq!(options.debounce, Duration::from_millis(100));
        assert!(RequestOptions::immediate().debounce.is_zero());
    }

    #[tokio::test]
    async fn test_slot_released_after_completion() {
        let handler = handler();
        let outcome = handler
            .request(Endpoint::Free, Query::new().param("q", "x"), RequestOptions::immediate())
            .await
            .unwrap();

        let response = outcome.into_response().unwrap();
        assert!(!response.cached);
        assert_eq!(response.body["q"], "x");
        assert!(!handler.is_pending(Endpoint::Free));
        assert_eq!(handler.cache().len(), 1);
    }
}
