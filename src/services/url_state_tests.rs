use crate::services::query::{FilterState, ListingType};
use crate::services::url_state::{decode, decode_with_fragment, encode};

#[test]
fn test_round_trip_is_identity() {
    let state = FilterState {
        property_type: Some("3".to_string()),
        listing_type: Some(ListingType::Lease),
        search: "austin".to_string(),
        ..Default::default()
    };

    let query = encode(&state);
    assert_eq!(query, "ptype=industrial&lt=lease&q=austin");
    assert_eq!(decode(&query), state);
}

#[test]
fn test_round_trip_with_unknown_type_id() {
    let state = FilterState {
        property_type: Some("99".to_string()),
        ..Default::default()
    };

    let query = encode(&state);
    assert_eq!(query, "ptype=99");
    assert_eq!(decode(&query), state);
}

#[test]
fn test_round_trip_search_with_spaces() {
    let state = FilterState {
        search: "main street warehouse".to_string(),
        ..Default::default()
    };

    let query = encode(&state);
    assert_eq!(decode(&query), state);
}

#[test]
fn test_default_state_serializes_empty() {
    assert_eq!(encode(&FilterState::default()), "");
    assert_eq!(decode(""), FilterState::default());
}

#[test]
fn test_decode_accepts_leading_question_mark() {
    let state = decode("?lt=both&q=dock");
    assert_eq!(state.listing_type, Some(ListingType::Both));
    assert_eq!(state.search, "dock");
}

#[test]
fn test_decode_numeric_ptype() {
    let state = decode("ptype=3");
    assert_eq!(state.property_type, Some("3".to_string()));
}

#[test]
fn test_decode_ignores_unknown_listing_type() {
    let state = decode("lt=rent");
    assert_eq!(state.listing_type, None);
}

#[test]
fn test_legacy_fragment_fallback() {
    let state = decode_with_fragment("", Some("#industrial"));
    assert_eq!(state.property_type, Some("3".to_string()));

    // query param wins over the fragment
    let state = decode_with_fragment("ptype=office", Some("#industrial"));
    assert_eq!(state.property_type, Some("1".to_string()));

    // unknown fragment slugs are ignored
    let state = decode_with_fragment("", Some("#penthouse"));
    assert_eq!(state.property_type, None);
}

#[test]
fn test_sort_state_is_not_serialized() {
    use crate::services::query::{SortDir, SortKey};
    let state = FilterState {
        sort: Some((SortKey::Size, SortDir::Desc)),
        ..Default::default()
    };
    assert_eq!(encode(&state), "");
}
