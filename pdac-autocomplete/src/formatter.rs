//! Result formatting: raw search responses into suggestion lists and
//! verified addresses

use crate::error::{WidgetError, WidgetResult};
use crate::inference::infer_address;
use crate::models::{Address, RawRecord, SearchResponse, SuggestionItem, VerifiedAddress};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Warning attached when the postal code was copied from a sibling record
pub const POSTAL_BACKFILL_WARNING: &str =
    "No postal code found for this address; using the first one available from similar addresses";

/// Warning attached when the verified record has no postal code at all
pub const MISSING_POSTAL_WARNING: &str = "No postal code found for this address";

/// Build the suggestion list for a `suggest` response
///
/// Records are inferred, ambiguous matches dropped, highlight snippets
/// attached and duplicates (by formatted string) removed, keeping the first.
pub fn format_results(response: &SearchResponse) -> WidgetResult<Vec<SuggestionItem>> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(response.response.docs.len());

    for record in &response.response.docs {
        let mut address = infer_address(record);

        if is_ambiguous(&address) {
            debug!(id = %record.id, formatted = %address.formatted(), "Dropping match without postal code");
            continue;
        }

        let highlight = response
            .highlighting
            .get(&record.id)
            .and_then(|h| h.suggest.first())
            .cloned()
            .ok_or_else(|| WidgetError::MissingHighlight {
                id: record.id.clone(),
            })?;

        if let Some((lat, lng)) = record.coordinates()? {
            address = address.with_coordinates(lat, lng);
        }

        if !seen.insert(address.formatted()) {
            continue;
        }
        items.push(SuggestionItem::new(record.clone(), address, highlight));
    }

    Ok(items)
}

/// Street, house number and city known but no postal code: the index has
/// several candidates for it, so it is not shown.
fn is_ambiguous(address: &Address) -> bool {
    address.street().is_some()
        && address.housenumber().is_some()
        && address.city().is_some()
        && address.postal().is_none()
}

/// Format a single record from an authoritative lookup
///
/// Unlike suggestions, a verified record must carry a centroid. A postal code
/// missing from the display name is taken from the record's `postcode` field.
pub fn format_doc(record: &RawRecord) -> WidgetResult<VerifiedAddress> {
    let (lat, lng) = record
        .coordinates()?
        .ok_or_else(|| WidgetError::MissingCentroid {
            id: record.id.clone(),
        })?;

    let mut address = infer_address(record).with_coordinates(lat, lng);
    if address.postal().is_none() {
        if let Some(postal) = &record.postal_code {
            address = address.with_postal(postal.clone());
        }
    }

    let warning = address.postal().is_none().then(|| {
        warn!(id = %record.id, "Verified record has no postal code");
        MISSING_POSTAL_WARNING.to_string()
    });

    Ok(VerifiedAddress {
        record: record.clone(),
        address,
        warning,
    })
}

/// Format the first doc of a verification response
///
/// With `backfill_postal`, a missing postal code is filled from the first
/// sibling doc that has one and a data-quality warning replaces the
/// missing-postal warning. Returns `Ok(None)` when the response has no docs.
pub fn format_verification(
    response: &SearchResponse,
    backfill_postal: bool,
) -> WidgetResult<Option<VerifiedAddress>> {
    let docs = &response.response.docs;
    let Some(first) = docs.first() else {
        return Ok(None);
    };

    let mut verified = format_doc(first)?;
    if verified.address.postal().is_some() || !backfill_postal {
        return Ok(Some(verified));
    }

    let sibling_postal = docs
        .iter()
        .skip(1)
        .find_map(|doc| doc.postal_code.clone().filter(|p| !p.is_empty()));

    if let Some(postal) = sibling_postal {
        warn!(id = %first.id, postal = %postal, "Backfilling postal code from sibling record");
        verified.address = verified.address.with_postal(postal.clone());
        verified.record.postal_code = Some(postal);
        verified.warning = Some(POSTAL_BACKFILL_WARNING.to_string());
    }

    Ok(Some(verified))
}
