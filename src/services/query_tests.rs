use serde_json::json;

use crate::models::{Broker, LeaseSpace, Listing};
use crate::services::aggregate::{build_working_set, AggregateOptions, EnrichedListing};
use crate::services::query::{apply, FilterState, ListingType, SortDir, SortKey};

fn working_set(
    listings: Vec<serde_json::Value>,
    brokers: Vec<serde_json::Value>,
    spaces: Vec<serde_json::Value>,
) -> Vec<EnrichedListing> {
    let listings: Vec<Listing> = listings
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();
    let brokers: Vec<Broker> = brokers
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();
    let spaces: Vec<LeaseSpace> = spaces
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();
    build_working_set(&listings, &brokers, &spaces, AggregateOptions::default())
}

fn keys(view: &[&EnrichedListing]) -> Vec<String> {
    view.iter().filter_map(|l| l.listing.join_key()).collect()
}

#[test]
fn test_property_type_filter_exact_match() {
    let set = working_set(
        vec![
            json!({ "id": 1, "property_type_id": 3 }),
            json!({ "id": 2, "property_type_id": "3" }),
            json!({ "id": 3, "property_type_id": 1 }),
        ],
        vec![],
        vec![],
    );

    let state = FilterState {
        property_type: Some("3".to_string()),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &state)), vec!["1", "2"]);
}

#[test]
fn test_listing_type_filter_is_exclusive() {
    let set = working_set(
        vec![
            json!({ "id": 1, "lease": true, "sale": false }),
            json!({ "id": 2, "lease": false, "sale": true }),
            json!({ "id": 3, "lease": true, "sale": true }),
        ],
        vec![],
        vec![],
    );

    let lease = FilterState {
        listing_type: Some(ListingType::Lease),
        ..Default::default()
    };
    // the dual-flagged listing does NOT satisfy a bare lease filter
    assert_eq!(keys(&apply(&set, &lease)), vec!["1"]);

    let sale = FilterState {
        listing_type: Some(ListingType::Sale),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &sale)), vec!["2"]);

    let both = FilterState {
        listing_type: Some(ListingType::Both),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &both)), vec!["3"]);

    let all = FilterState::default();
    assert_eq!(apply(&set, &all).len(), 3);
}

#[test]
fn test_search_matches_any_field_case_insensitive() {
    let set = working_set(
        vec![
            json!({ "id": 1, "address": "100 Congress Ave", "city": "Austin" }),
            json!({ "id": 2, "city": "Dallas", "sale_listing_web_title": "Austin Gateway Site" }),
            json!({ "id": 3, "city": "Houston", "broker_id": 7 }),
        ],
        vec![json!({ "id": 7, "first_name": "Aus", "last_name": "Tinsley" })],
        vec![],
    );

    let state = FilterState {
        search: "AUSTIN".to_string(),
        ..Default::default()
    };
    // 1 by city, 2 by web title; 3's broker "aus tinsley" has no "austin" substring
    assert_eq!(keys(&apply(&set, &state)), vec!["1", "2"]);
}

#[test]
fn test_search_matches_broker_text() {
    let set = working_set(
        vec![
            json!({ "id": 1, "broker_id": 7 }),
            json!({ "id": 2 }),
        ],
        vec![json!({ "id": 7, "first_name": "Dana", "last_name": "Reyes", "email": "dana@example.com" })],
        vec![],
    );

    let by_name = FilterState {
        search: "reyes".to_string(),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &by_name)), vec!["1"]);

    let by_email = FilterState {
        search: "dana@example".to_string(),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &by_email)), vec!["1"]);
}

#[test]
fn test_filters_and_search_are_conjunctive() {
    let set = working_set(
        vec![
            json!({ "id": 1, "property_type_id": 3, "lease": true, "city": "Austin" }),
            json!({ "id": 2, "property_type_id": 3, "lease": true, "city": "Dallas" }),
            json!({ "id": 3, "property_type_id": 1, "lease": true, "city": "Austin" }),
        ],
        vec![],
        vec![],
    );

    let state = FilterState {
        property_type: Some("3".to_string()),
        listing_type: Some(ListingType::Lease),
        search: "austin".to_string(),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &state)), vec!["1"]);
}

#[test]
fn test_apply_is_idempotent_and_does_not_mutate() {
    let set = working_set(
        vec![
            json!({ "id": 2, "city": "Austin", "building_size_sf": 100 }),
            json!({ "id": 1, "city": "Austin", "building_size_sf": 900 }),
        ],
        vec![],
        vec![],
    );

    let state = FilterState {
        search: "austin".to_string(),
        sort: Some((SortKey::Size, SortDir::Asc)),
        ..Default::default()
    };

    let first = keys(&apply(&set, &state));
    let second = keys(&apply(&set, &state));
    assert_eq!(first, second);
    assert_eq!(first, vec!["2", "1"]);
    // the backing working set keeps its original order
    assert_eq!(set[0].listing.join_key().unwrap(), "2");
}

#[test]
fn test_size_sort_uses_display_value_with_unit_tiebreak() {
    // 43560 SF land parcel displays as 1.00 AC; an office listing with
    // 1 SF available displays as 1 SF. Equal numeric value, different units.
    let set = working_set(
        vec![
            json!({ "id": 1, "property_type_id": "5", "building_size_sf": 43560 }),
            json!({ "id": 2, "property_type_id": "1", "building_size_sf": 1 }),
            json!({ "id": 3, "property_type_id": "1", "building_size_sf": 50000 }),
            json!({ "id": 4 }),
        ],
        vec![],
        vec![],
    );

    let desc = FilterState {
        sort: Some((SortKey::Size, SortDir::Desc)),
        ..Default::default()
    };
    // descending: SF outranks AC at equal numeric value; unknown sorts last
    assert_eq!(keys(&apply(&set, &desc)), vec!["3", "2", "1", "4"]);

    let asc = FilterState {
        sort: Some((SortKey::Size, SortDir::Asc)),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &asc)), vec!["4", "1", "2", "3"]);
}

#[test]
fn test_location_sort_concatenates_parts() {
    let set = working_set(
        vec![
            json!({ "id": 1, "address": "900 Main St", "city": "Waco", "state": "TX", "zip": "76701" }),
            json!({ "id": 2, "address": "100 Elm St", "city": "Dallas", "state": "TX", "zip": "75201" }),
        ],
        vec![],
        vec![],
    );

    let state = FilterState {
        sort: Some((SortKey::Location, SortDir::Asc)),
        ..Default::default()
    };
    assert_eq!(keys(&apply(&set, &state)), vec!["2", "1"]);
}

#[test]
fn test_type_sort_three_way_label_ordering() {
    let set = working_set(
        vec![
            json!({ "id": 1, "lease": true, "sale": true }),
            json!({ "id": 2, "lease": false, "sale": true }),
            json!({ "id": 3, "lease": true, "sale": false }),
        ],
        vec![],
        vec![],
    );

    let state = FilterState {
        sort: Some((SortKey::Type, SortDir::Asc)),
        ..Default::default()
    };
    // "for lease" < "for sale" < "for sale & lease"
    assert_eq!(keys(&apply(&set, &state)), vec!["3", "2", "1"]);
}

#[test]
fn test_toggle_sort_header_behavior() {
    let mut state = FilterState::default();

    state.toggle_sort(SortKey::Size);
    assert_eq!(state.sort, Some((SortKey::Size, SortDir::Asc)));

    state.toggle_sort(SortKey::Size);
    assert_eq!(state.sort, Some((SortKey::Size, SortDir::Desc)));

    // a new key resets to ascending
    state.toggle_sort(SortKey::Location);
    assert_eq!(state.sort, Some((SortKey::Location, SortDir::Asc)));
}

#[test]
fn test_empty_working_set_yields_empty_view() {
    let set: Vec<EnrichedListing> = Vec::new();
    let state = FilterState {
        search: "anything".to_string(),
        ..Default::default()
    };
    assert!(apply(&set, &state).is_empty());
}
