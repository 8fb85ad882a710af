//! Field-fallback chains for loosely-shaped upstream records.
//!
//! The upstream API has shipped the same logical fields under several names over
//! time (and nests some of them). Each chain below is an ordered list of field
//! paths tried in sequence; the first hit wins. Keeping the chains as constants
//! makes the fallback order explicit and testable.

use serde_json::{Map, Value};

/// Paths tried, in order, to resolve a lease space's parent property id.
pub const SPACE_PARENT_ID_PATHS: &[&[&str]] = &[
    &["property_id"],
    &["property", "id"],
    &["propertyId"],
    &["listing_id"],
    &["property_listing_id"],
];

/// Field names tried, in order, for a lease space's size in square feet.
pub const SPACE_SIZE_FIELDS: &[&str] = &["size_sf", "available_sf", "square_feet", "size"];

/// Field names tried, in order, for a record's deal/activity status.
pub const STATUS_FIELDS: &[&str] = &[
    "deal_status_id",
    "deal_status",
    "status_id",
    "status",
    "activity_status",
];

/// Numeric status code meaning "currently on-market".
pub const ACTIVE_STATUS_CODE: i64 = 1;

/// Property type id whose size is expressed in acres rather than square feet.
pub const LAND_PROPERTY_TYPE_ID: &str = "5";

/// Square feet per acre, used for the land-type unit conversion.
pub const SQFT_PER_ACRE: f64 = 43_560.0;

/// Walk a dotted path (`["property", "id"]`) into a JSON object.
pub fn lookup_path<'a>(obj: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = obj.get(*first)?;
    for key in rest {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// First non-null value across an ordered list of paths.
pub fn first_present<'a>(obj: &'a Map<String, Value>, paths: &[&[&str]]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| lookup_path(obj, path))
        .find(|v| !v.is_null())
}

/// Normalize an id value to a canonical join key.
///
/// Upstream ids arrive as numbers or strings depending on the collection;
/// both sides of a join must agree on one spelling.
pub fn join_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                Some(n.to_string())
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// Resolve a lease space's parent property id to a join key.
///
/// The first non-null value in the chain decides; a space whose winning value
/// cannot be normalized resolves to nothing and is dropped by the caller.
pub fn resolve_parent_key(obj: &Map<String, Value>) -> Option<String> {
    first_present(obj, SPACE_PARENT_ID_PATHS).and_then(join_key)
}

/// Parse a size value that may be a number or a loosely formatted string
/// ("12,500 SF"). Only positive results count; anything else is rejected so
/// the next candidate field can be tried.
pub fn parse_size(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_loose_number(s),
        _ => None,
    }?;
    if parsed > 0.0 {
        Some(parsed)
    } else {
        None
    }
}

/// Resolve a lease space's size via the ordered field chain.
pub fn resolve_size(obj: &Map<String, Value>) -> Option<f64> {
    SPACE_SIZE_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field))
        .find_map(parse_size)
}

/// Resolve a record's activity status via the ordered field chain.
///
/// A record with no recognizable status field counts as active: legacy records
/// predate the status fields and are live listings, not closed ones.
pub fn status_is_active(obj: &Map<String, Value>) -> bool {
    for field in STATUS_FIELDS {
        if let Some(active) = interpret_status(obj.get(*field)) {
            return active;
        }
    }
    true
}

/// Interpret one status value; `None` means unrecognizable, try the next field.
fn interpret_status(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Number(n) => n.as_i64().map(|code| code == ACTIVE_STATUS_CODE),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else if let Ok(code) = trimmed.parse::<i64>() {
                Some(code == ACTIVE_STATUS_CODE)
            } else {
                Some(trimmed.eq_ignore_ascii_case("active"))
            }
        }
        _ => None,
    }
}

/// Strip thousands separators and trailing unit suffixes, then parse the
/// leading numeric prefix ("12,500 SF" -> 12500.0).
fn parse_loose_number(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    let mut end = 0;
    for (i, c) in cleaned.char_indices() {
        if c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        return None;
    }
    cleaned[..end].parse().ok()
}
