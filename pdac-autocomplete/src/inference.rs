//! Address inference from locatieserver display names
//!
//! Best-effort parser: the display name is split on commas and whitespace
//! according to the record type. Known failure modes:
//! - a street without a house number on an `adres` record yields the last
//!   street word as house number
//! - commas inside street or place names shift the fragments
//! - fields the record type does not carry are left absent, never guessed
//!
//! The formatting quirks (trailing space when the house number is missing)
//! are relied on by the input layer and must stay as they are.

use crate::models::{Address, RawRecord, RecordType};

/// Infer a structured address from a raw record
///
/// Pure: no coordinates are attached here, see [`RawRecord::coordinates`].
pub fn infer_address(record: &RawRecord) -> Address {
    let mut fragments = record.display_name.split(',').map(str::trim);
    let first = fragments.next().map(str::to_string);
    let second = fragments.next().map(str::to_string);

    let (mut street, mut city, postal_city, street_housenumber) = match record.record_type {
        RecordType::Weg => (first, second, None, None),
        RecordType::Postcode => (first, None, second, None),
        RecordType::Adres => (None, None, second, first),
        RecordType::Woonplaats => (None, first, None, None),
        RecordType::Other => (None, None, None, None),
    };
    let mut postal = None;
    let mut housenumber = None;

    if let Some(fragment) = postal_city {
        let (code, place) = split_postal_city(&fragment);
        postal = code;
        city = Some(place);
    }

    if let Some(fragment) = street_housenumber {
        let mut tokens: Vec<&str> = fragment.split_whitespace().collect();
        housenumber = tokens.pop().map(str::to_string);
        street = Some(tokens.join(" "));
    }

    Address::new(street, housenumber, postal, city)
}

/// Split `"1234 AB Voorstad"` / `"1234AB Voorstad"` into postal code and place
///
/// The first token is the postal code when it starts with a digit. A split
/// Dutch code (four digits, then two letters) keeps both tokens.
fn split_postal_city(fragment: &str) -> (Option<String>, String) {
    let mut tokens: Vec<&str> = fragment.split_whitespace().collect();

    let starts_with_digit = tokens
        .first()
        .and_then(|t| t.chars().next())
        .is_some_and(|c| c.is_ascii_digit());
    if !starts_with_digit {
        return (None, tokens.join(" "));
    }

    let digits = tokens.remove(0);
    let split_letters = digits.len() == 4
        && digits.chars().all(|c| c.is_ascii_digit())
        && !tokens.is_empty()
        && tokens[0].len() == 2
        && tokens[0].chars().all(|c| c.is_ascii_alphabetic());

    let postal = if split_letters {
        format!("{} {}", digits, tokens.remove(0))
    } else {
        digits.to_string()
    };

    (Some(postal), tokens.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(record_type: RecordType, display_name: &str) -> RawRecord {
        RawRecord {
            id: "r1".to_string(),
            record_type,
            display_name: display_name.to_string(),
            street_name: None,
            house_number: None,
            postal_code: None,
            place_name: None,
            centroid: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_adres_with_split_postal_code() {
        let address = infer_address(&record(
            RecordType::Adres,
            "Hoofdstraat 12, 1234 AB Voorstad",
        ));
        assert_eq!(address.street(), Some("Hoofdstraat"));
        assert_eq!(address.housenumber(), Some("12"));
        assert_eq!(address.postal(), Some("1234 AB"));
        assert_eq!(address.city(), Some("Voorstad"));
        assert_eq!(address.formatted(), "Voorstad, Hoofdstraat 12");
    }

    #[test]
    fn test_adres_with_compact_postal_code() {
        let address = infer_address(&record(
            RecordType::Adres,
            "Lange Nieuwstraat 3A, 3512PB Den Haag",
        ));
        assert_eq!(address.street(), Some("Lange Nieuwstraat"));
        assert_eq!(address.housenumber(), Some("3A"));
        assert_eq!(address.postal(), Some("3512PB"));
        assert_eq!(address.city(), Some("Den Haag"));
    }

    #[test]
    fn test_woonplaats_keeps_double_trailing_space() {
        let address = infer_address(&record(RecordType::Woonplaats, "Voorstad"));
        assert_eq!(address.city(), Some("Voorstad"));
        assert_eq!(address.street(), None);
        assert_eq!(address.formatted(), "Voorstad,  ");
    }

    #[test]
    fn test_woonplaats_ignores_municipality_suffix() {
        let address = infer_address(&record(
            RecordType::Woonplaats,
            "Voorstad, Gemeente Buitenwijk, Utrecht",
        ));
        assert_eq!(address.city(), Some("Voorstad"));
        assert_eq!(address.populated_fields(), 1);
    }

    #[test]
    fn test_weg_street_and_city() {
        let address = infer_address(&record(RecordType::Weg, "Hoofdstraat, Voorstad"));
        assert_eq!(address.street(), Some("Hoofdstraat"));
        assert_eq!(address.city(), Some("Voorstad"));
        assert_eq!(address.housenumber(), None);
        assert_eq!(address.formatted(), "Voorstad, Hoofdstraat ");
    }

    #[test]
    fn test_postcode_record() {
        let address = infer_address(&record(RecordType::Postcode, "Hoofdstraat, 1234AB Voorstad"));
        assert_eq!(address.street(), Some("Hoofdstraat"));
        assert_eq!(address.postal(), Some("1234AB"));
        assert_eq!(address.city(), Some("Voorstad"));
        assert_eq!(address.housenumber(), None);
    }

    #[test]
    fn test_split_postal_code_without_place() {
        let address = infer_address(&record(RecordType::Adres, "Hoofdstraat 12, 1234 AB"));
        assert_eq!(address.postal(), Some("1234 AB"));
        assert_eq!(address.city(), None);
        assert_eq!(address.populated_fields(), 3);
    }

    #[test]
    fn test_postal_city_without_code() {
        let address = infer_address(&record(RecordType::Adres, "Hoofdstraat 12, Voorstad"));
        assert_eq!(address.postal(), None);
        assert_eq!(address.city(), Some("Voorstad"));
        assert_eq!(address.populated_fields(), 3);
    }

    #[test]
    fn test_adres_without_comma_has_no_city() {
        let address = infer_address(&record(RecordType::Adres, "Hoofdstraat 12"));
        assert_eq!(address.city(), None);
        assert_eq!(address.housenumber(), Some("12"));
    }

    #[test]
    fn test_other_type_yields_nothing() {
        let address = infer_address(&record(RecordType::Other, "Gemeente Voorstad"));
        assert_eq!(address.populated_fields(), 0);
    }

    #[test]
    fn test_formatting_is_idempotent_over_fields() {
        for (kind, name) in [
            (RecordType::Adres, "Hoofdstraat 12, 1234 AB Voorstad"),
            (RecordType::Weg, "Hoofdstraat, Voorstad"),
            (RecordType::Woonplaats, "Voorstad"),
        ] {
            let first = infer_address(&record(kind, name));
            let rebuilt = Address::new(
                first.street().map(String::from),
                first.housenumber().map(String::from),
                first.postal().map(String::from),
                first.city().map(String::from),
            );
            assert_eq!(rebuilt.formatted(), first.formatted());
        }
    }
}
