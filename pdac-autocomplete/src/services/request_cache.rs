//! Session cache of raw locatieserver responses
//!
//! Keyed by endpoint plus canonical query. Entries never expire and are never
//! evicted; the cache lives as long as the handler that owns it.

use super::endpoint::{Endpoint, Query};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Response cache
#[derive(Debug, Default)]
pub struct RequestCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable key for `(endpoint, query)`
    pub fn key(endpoint: Endpoint, query: &Query) -> String {
        // Both halves serialize deterministically (Query is a sorted map)
        serde_json::to_string(&(endpoint, query)).unwrap_or_else(|_| format!("{endpoint}?{query}"))
    }

    pub fn get(&self, endpoint: Endpoint, query: &Query) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&Self::key(endpoint, query))
            .cloned()
    }

    pub fn set(&self, endpoint: Endpoint, query: &Query, body: Value) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(Self::key(endpoint, query), body);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
