//! Structured address

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Structured address inferred from a locatieserver record
///
/// The formatted string is derived on demand from the constituent fields and
/// is never stored, so it cannot drift from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    street: Option<String>,
    housenumber: Option<String>,
    postal: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
}

impl Address {
    /// Build an address; empty strings are treated as absent
    pub fn new(
        street: Option<String>,
        housenumber: Option<String>,
        postal: Option<String>,
        city: Option<String>,
    ) -> Self {
        Self {
            street: non_empty(street),
            housenumber: non_empty(housenumber),
            postal: non_empty(postal),
            city: non_empty(city),
            lat: None,
            lng: None,
        }
    }

    pub fn street(&self) -> Option<&str> {
        self.street.as_deref()
    }

    pub fn housenumber(&self) -> Option<&str> {
        self.housenumber.as_deref()
    }

    pub fn postal(&self) -> Option<&str> {
        self.postal.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn lat(&self) -> Option<f64> {
        self.lat
    }

    pub fn lng(&self) -> Option<f64> {
        self.lng
    }

    /// Replace the postal code
    pub fn with_postal(mut self, postal: impl Into<String>) -> Self {
        self.postal = non_empty(Some(postal.into()));
        self
    }

    /// Attach WGS84 coordinates
    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    /// Number of populated fields among street, housenumber, postal, city
    pub fn populated_fields(&self) -> usize {
        [&self.street, &self.housenumber, &self.postal, &self.city]
            .iter()
            .filter(|field| field.is_some())
            .count()
    }

    /// Display string: `"{city}, {street} {housenumber}"`
    ///
    /// A trailing space is appended when the house number is missing; the
    /// input layer uses it to tell an incomplete address apart.
    pub fn formatted(&self) -> String {
        let street_housenumber = [self.street.as_deref(), self.housenumber.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        let mut formatted = format!(
            "{}, {}",
            self.city.as_deref().unwrap_or_default(),
            street_housenumber.trim()
        );
        if self.housenumber.is_none() {
            formatted.push(' ');
        }
        formatted
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Address", 7)?;
        state.serialize_field("street", &self.street)?;
        state.serialize_field("housenumber", &self.housenumber)?;
        state.serialize_field("postal", &self.postal)?;
        state.serialize_field("city", &self.city)?;
        state.serialize_field("formatted", &self.formatted())?;
        state.serialize_field("lat", &self.lat)?;
        state.serialize_field("lng", &self.lng)?;
        state.end()
    }
}
