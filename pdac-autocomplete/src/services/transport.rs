//! HTTP transport to the PDOK locatieserver
//!
//! The [`Transport`] trait is the network seam of the request handler.
//! Dropping the returned future aborts the underlying HTTP call, which is how
//! superseded requests are cancelled at the transport boundary.

use super::endpoint::Query;
use crate::error::LookupError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("pdac-autocomplete/", env!("CARGO_PKG_VERSION"));

/// Network boundary: GET `url` with `query` and decode the JSON body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, query: &Query) -> Result<Value, LookupError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, query: &Query) -> Result<Value, LookupError> {
        tracing::debug!(url = %url, query = %query, "Querying locatieserver");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), error_text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }
}
