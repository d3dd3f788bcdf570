//! Endpoint keys and canonical query parameters

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Logical locatieserver request channel
///
/// Cancellation and caching are scoped per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Fuzzy type-ahead search
    Suggest,
    /// Free-text authoritative search
    Free,
    /// Lookup by id
    Lookup,
    /// Coordinates to nearest records
    Reverse,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Suggest => "suggest",
            Endpoint::Free => "free",
            Endpoint::Lookup => "lookup",
            Endpoint::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters, kept sorted by name
///
/// Sorting makes the serialized form canonical, so two queries with the same
/// parameters in different insertion order share a cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, String>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
