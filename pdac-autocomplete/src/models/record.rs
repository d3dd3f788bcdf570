//! Locatieserver response records

use crate::error::{WidgetError, WidgetResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Record type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Place
    Woonplaats,
    /// Street
    Weg,
    /// Postal code area
    Postcode,
    /// Full address
    Adres,
    /// Any other type the server may return (gemeente, perceel, ...)
    #[serde(other)]
    Other,
}

/// Raw record as returned by the search API
///
/// Fields the widget does not interpret are kept in `extra` so the record can
/// be handed back to host code unchanged.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RawRecord {
    /// Record id (key into the highlighting map)
    pub id: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Display name, e.g. "Hoofdstraat 12, 1234AB Voorstad"
    #[serde(rename = "weergavenaam")]
    pub display_name: String,
    /// Street name
    #[serde(rename = "straatnaam", default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    /// House number with letter/addition
    #[serde(rename = "huis_nlt", default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    /// Postal code
    #[serde(rename = "postcode", default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Place name
    #[serde(rename = "woonplaatsnaam", default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    /// WGS84 centroid as `POINT(lng lat)`
    #[serde(rename = "centroide_ll", default, skip_serializing_if = "Option::is_none")]
    pub centroid: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawRecord {
    /// Parse `centroide_ll` into `(lat, lng)`
    ///
    /// Returns `Ok(None)` when the record carries no centroid.
    pub fn coordinates(&self) -> WidgetResult<Option<(f64, f64)>> {
        match &self.centroid {
            None => Ok(None),
            Some(text) => parse_point(text).map(Some).ok_or_else(|| {
                WidgetError::InvalidCentroid {
                    id: self.id.clone(),
                    value: text.clone(),
                }
            }),
        }
    }
}

/// Parse WKT `POINT(lng lat)` into `(lat, lng)`
fn parse_point(text: &str) -> Option<(f64, f64)> {
    let inner = text
        .trim()
        .strip_prefix("POINT")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;

    let mut parts = inner.split_whitespace();
    let lng = parts.next()?.parse::<f64>().ok()?;
    let lat = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lng))
}

/// `response` block of a search response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocList {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<RawRecord>,
}

/// Highlight snippets for one record
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Highlight {
    #[serde(default)]
    pub suggest: Vec<String>,
}

/// Decoded search response
///
/// `highlighting` is only present on `suggest` responses.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    pub response: DocList,
    #[serde(default)]
    pub highlighting: HashMap<String, Highlight>,
}

impl SearchResponse {
    /// Decode a raw response body
    pub fn from_value(body: &serde_json::Value) -> WidgetResult<Self> {
        Self::deserialize(body).map_err(|e| WidgetError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_pdok_fields() {
        let record: RawRecord = serde_json::from_value(json!({
            "id": "adr-1",
            "type": "adres",
            "weergavenaam": "Hoofdstraat 12, 1234AB Voorstad",
            "straatnaam": "Hoofdstraat",
            "huis_nlt": "12",
            "postcode": "1234AB",
            "woonplaatsnaam": "Voorstad",
            "centroide_ll": "POINT(5.1 52.09)",
            "score": 7.5
        }))
        .unwrap();

        assert_eq!(record.record_type, RecordType::Adres);
        assert_eq!(record.postal_code.as_deref(), Some("1234AB"));
        assert_eq!(record.extra.get("score"), Some(&json!(7.5)));
        assert_eq!(record.coordinates().unwrap(), Some((52.09, 5.1)));
    }

    #[test]
    fn test_unknown_type_is_other() {
        let record: RawRecord = serde_json::from_value(json!({
            "id": "gem-1",
            "type": "gemeente",
            "weergavenaam": "Gemeente Voorstad"
        }))
        .unwrap();
        assert_eq!(record.record_type, RecordType::Other);
        assert_eq!(record.coordinates().unwrap(), None);
    }

    #[test]
    fn test_malformed_centroid_is_error() {
        for text in ["POINT(5.1)", "5.1 52.09", "POINT(a b)", "POINT(1 2 3)"] {
            assert_eq!(parse_point(text), None, "{text} should not parse");
        }
        assert_eq!(parse_point(" POINT (4.9 52.37) "), Some((52.37, 4.9)));
    }

    #[test]
    fn test_response_without_highlighting() {
        let response = SearchResponse::from_value(&json!({
            "response": { "numFound": 0, "docs": [] }
        }))
        .unwrap();
        assert!(response.highlighting.is_empty());

        let err = SearchResponse::from_value(&json!({ "docs": [] })).unwrap_err();
        assert!(matches!(err, WidgetError::MalformedResponse(_)));
    }
}
