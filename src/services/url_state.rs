//! Bidirectional mapping between [`FilterState`] and URL query parameters.
//!
//! The URL is the externally observable serialization of the filter state:
//! `ptype` (type slug, or the raw id when no slug is known), `lt`
//! (lease|sale|both), and `q` (free text). Sort is session UI state and is
//! not URL-encoded. A legacy URL fragment naming a type slug is honored as a
//! one-time fallback for `ptype`.

use url::form_urlencoded;

use super::labels;
use super::query::{FilterState, ListingType};

/// Property type query parameter.
pub const PARAM_PROPERTY_TYPE: &str = "ptype";
/// Listing type query parameter.
pub const PARAM_LISTING_TYPE: &str = "lt";
/// Free-text search query parameter.
pub const PARAM_SEARCH: &str = "q";

/// Serialize the filter state to a query string (no leading `?`).
///
/// Empty state components are omitted, so a default state serializes to "".
pub fn encode(state: &FilterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if let Some(ptype) = state.property_type.as_deref() {
        let value = labels::property_type_slug(ptype).unwrap_or(ptype);
        serializer.append_pair(PARAM_PROPERTY_TYPE, value);
    }
    if let Some(listing_type) = state.listing_type {
        serializer.append_pair(PARAM_LISTING_TYPE, listing_type.as_str());
    }
    let search = state.search.trim();
    if !search.is_empty() {
        serializer.append_pair(PARAM_SEARCH, search);
    }

    serializer.finish()
}

/// Parse a query string (with or without a leading `?`) into a filter state.
pub fn decode(query: &str) -> FilterState {
    decode_with_fragment(query, None)
}

/// Parse a query string, falling back to a legacy `#slug` fragment for the
/// property type when the query itself carries none.
pub fn decode_with_fragment(query: &str, fragment: Option<&str>) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut state = FilterState::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PARAM_PROPERTY_TYPE => state.property_type = resolve_property_type(value.as_ref()),
            PARAM_LISTING_TYPE => state.listing_type = ListingType::parse(value.as_ref()),
            PARAM_SEARCH => state.search = value.trim().to_string(),
            _ => {}
        }
    }

    if state.property_type.is_none() {
        if let Some(fragment) = fragment {
            let slug = fragment.trim().trim_start_matches('#');
            state.property_type = labels::property_type_id_for_slug(slug).map(str::to_string);
        }
    }

    state
}

/// A `ptype` value may be a known slug or a raw type id.
fn resolve_property_type(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(id) = labels::property_type_id_for_slug(value) {
        return Some(id.to_string());
    }
    Some(value.to_string())
}
