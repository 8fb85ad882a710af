use serde_json::json;

use crate::models::{Broker, LeaseSpace, Listing};
use crate::services::aggregate::{build_working_set, AggregateOptions, SizeDisplay};

fn listing(value: serde_json::Value) -> Listing {
    serde_json::from_value(value).unwrap()
}

fn broker(value: serde_json::Value) -> Broker {
    serde_json::from_value(value).unwrap()
}

fn space(value: serde_json::Value) -> LeaseSpace {
    serde_json::from_value(value).unwrap()
}

fn default_opts() -> AggregateOptions {
    AggregateOptions::default()
}

#[test]
fn test_total_available_sf_sums_active_spaces() {
    let listings = vec![listing(json!({ "id": 1, "lease": true }))];
    let spaces = vec![
        space(json!({ "id": 10, "property_id": 1, "size_sf": "1,200 SF" })),
        space(json!({ "id": 11, "property_id": 1, "size_sf": 800 })),
        // inactive: must not contribute
        space(json!({ "id": 12, "property_id": 1, "size_sf": 5000, "deal_status_id": 2 })),
        // no resolvable parent: dropped
        space(json!({ "id": 13, "size_sf": 9000 })),
        // other property
        space(json!({ "id": 14, "property_id": 2, "size_sf": 400 })),
    ];

    let working = build_working_set(&listings, &[], &spaces, default_opts());
    assert_eq!(working.len(), 1);
    assert_eq!(working[0].total_available_sf, 2000.0);
}

#[test]
fn test_total_available_sf_zero_when_no_spaces_resolve() {
    let listings = vec![listing(json!({ "id": 1, "sale": true }))];
    let spaces = vec![space(json!({ "id": 10, "property_id": 1, "size_sf": "TBD" }))];

    let working = build_working_set(&listings, &[], &spaces, default_opts());
    assert_eq!(working[0].total_available_sf, 0.0);
}

#[test]
fn test_join_key_parity_across_field_spellings() {
    // Space references its parent through a legacy field; listing id is numeric
    let listings = vec![listing(json!({ "id": 42, "lease": true }))];
    let spaces = vec![space(json!({ "id": 1, "listing_id": "42", "size_sf": 750 }))];

    let working = build_working_set(&listings, &[], &spaces, default_opts());
    assert_eq!(working[0].total_available_sf, 750.0);
}

#[test]
fn test_inactive_listings_are_excluded() {
    let listings = vec![
        listing(json!({ "id": 1, "deal_status_id": 1 })),
        listing(json!({ "id": 2, "deal_status_id": 2 })),
        listing(json!({ "id": 3, "status": "Closed" })),
        // no status field at all: conservatively included
        listing(json!({ "id": 4 })),
    ];

    let working = build_working_set(&listings, &[], &[], default_opts());
    let keys: Vec<_> = working.iter().filter_map(|l| l.listing.join_key()).collect();
    assert_eq!(keys, vec!["1", "4"]);
}

#[test]
fn test_broker_attachment_and_escaping() {
    let listings = vec![listing(json!({
        "id": 1,
        "broker_id": 7,
        "second_broker_id": 8
    }))];
    let brokers = vec![
        broker(json!({
            "id": 7,
            "first_name": "Dana",
            "last_name": "O'Neil <Partners>",
            "email": "dana@example.com"
        })),
        broker(json!({ "id": 8, "first_name": "Sam", "last_name": "Velez" })),
    ];

    let working = build_working_set(&listings, &brokers, &[], default_opts());
    let enriched = &working[0];

    assert_eq!(enriched.brokers.len(), 2);
    assert!(enriched.broker_display.contains("mailto:dana@example.com"));
    assert!(enriched.broker_display.contains("O'Neil &lt;Partners&gt;"));
    // no email: plain span, not a broken mailto
    assert!(enriched.broker_display.contains("<span class=\"broker-pill\">Sam Velez</span>"));
    assert!(enriched.broker_search_text.contains("dana o'neil"));
    assert!(enriched.broker_search_text.contains("dana@example.com"));
}

#[test]
fn test_missing_broker_yields_no_chip() {
    let listings = vec![listing(json!({ "id": 1, "broker_id": 999 }))];
    let working = build_working_set(&listings, &[], &[], default_opts());
    assert_eq!(working[0].broker_display, "");
    assert!(working[0].brokers.is_empty());
}

#[test]
fn test_size_display_prefers_available_sf() {
    let listings = vec![listing(json!({
        "id": 1,
        "building_size_sf": 50000,
        "lease": true
    }))];
    let spaces = vec![space(json!({ "id": 10, "property_id": 1, "size_sf": 12500 }))];

    let working = build_working_set(&listings, &[], &spaces, default_opts());
    let display = working[0].size_display();
    assert_eq!(display, SizeDisplay::SquareFeet(12500.0));
    assert_eq!(display.label(), "12,500 SF");
}

#[test]
fn test_size_display_falls_back_to_building_size() {
    let listings = vec![listing(json!({ "id": 1, "building_size_sf": 50000 }))];
    let working = build_working_set(&listings, &[], &[], default_opts());
    assert_eq!(working[0].size_display(), SizeDisplay::SquareFeet(50000.0));
}

#[test]
fn test_size_display_unknown_marker_never_zero() {
    let listings = vec![listing(json!({ "id": 1 }))];
    let working = build_working_set(&listings, &[], &[], default_opts());
    assert_eq!(working[0].size_display(), SizeDisplay::Unknown);
    assert_eq!(working[0].size_display().label(), "—");
}

#[test]
fn test_land_listing_shows_acres() {
    // Scenario from the table display contract: 10000/43560 -> "0.23 AC"
    let listings = vec![listing(json!({
        "id": 1,
        "lease": true,
        "sale": false,
        "building_size_sf": 10000,
        "property_type_id": "5"
    }))];

    let working = build_working_set(&listings, &[], &[], default_opts());
    let display = working[0].size_display();
    assert!(matches!(display, SizeDisplay::Acres(_)));
    assert_eq!(display.label(), "0.23 AC");
}

#[test]
fn test_land_listing_with_available_sf_stays_in_sf() {
    // The acres unit switch applies only when no summed available SF exists
    let listings = vec![listing(json!({
        "id": 1,
        "building_size_sf": 10000,
        "property_type_id": "5"
    }))];
    let spaces = vec![space(json!({ "id": 10, "property_id": 1, "size_sf": 2000 }))];

    let working = build_working_set(&listings, &[], &spaces, default_opts());
    assert_eq!(working[0].size_display(), SizeDisplay::SquareFeet(2000.0));
}

#[test]
fn test_size_debug_only_with_flag() {
    let listings = vec![listing(json!({ "id": 1, "building_size_sf": 5000 }))];
    let spaces = vec![
        space(json!({ "id": 10, "property_id": 1, "size_sf": 100 })),
        space(json!({ "id": 11, "property_id": 1, "size_sf": 250 })),
    ];

    let plain = build_working_set(&listings, &[], &spaces, default_opts());
    assert!(plain[0].size_debug.is_none());

    let debug = build_working_set(&listings, &[], &spaces, AggregateOptions { debug: true });
    let diag = debug[0].size_debug.as_ref().unwrap();
    assert_eq!(diag.space_sizes, vec![100.0, 250.0]);
    assert_eq!(diag.total_available_sf, 350.0);
    assert_eq!(diag.building_size_sf, Some(5000.0));
}

#[test]
fn test_type_label_derivation() {
    let both = build_working_set(
        &[listing(json!({ "id": 1, "lease": true, "sale": true }))],
        &[],
        &[],
        default_opts(),
    );
    assert_eq!(both[0].type_label(), "For Sale & Lease");

    let lease = build_working_set(
        &[listing(json!({ "id": 1, "lease": true }))],
        &[],
        &[],
        default_opts(),
    );
    assert_eq!(lease[0].type_label(), "For Lease");

    let sale = build_working_set(
        &[listing(json!({ "id": 1, "sale": true }))],
        &[],
        &[],
        default_opts(),
    );
    assert_eq!(sale[0].type_label(), "For Sale");
}

#[test]
fn test_description_selection() {
    let lease_desc = build_working_set(
        &[listing(json!({
            "id": 1,
            "lease": true,
            "sale": true,
            "lease_description": "Suite available now.",
            "sale_description": "Owner-user opportunity."
        }))],
        &[],
        &[],
        default_opts(),
    );
    assert_eq!(lease_desc[0].description(), "Suite available now.");

    let fallback = build_working_set(
        &[listing(json!({ "id": 1, "lease": true }))],
        &[],
        &[],
        default_opts(),
    );
    assert_eq!(fallback[0].description(), "No description available.");
}

#[test]
fn test_location_text_elides_missing_parts() {
    let working = build_working_set(
        &[listing(json!({
            "id": 1,
            "address": "414 Commerce Blvd",
            "city": "Dayton",
            "zip": "45402"
        }))],
        &[],
        &[],
        default_opts(),
    );
    assert_eq!(working[0].location_text(), "414 Commerce Blvd, Dayton 45402");
}

#[test]
fn test_subtype_type_line() {
    let working = build_working_set(
        &[listing(json!({
            "id": 1,
            "lease": true,
            "property_subtype_id": 303
        }))],
        &[],
        &[],
        default_opts(),
    );
    assert_eq!(working[0].subtype_type_line(), "Flex Space – For Lease");
}

#[test]
fn test_duplicate_broker_id_last_write_wins() {
    let listings = vec![listing(json!({ "id": 1, "broker_id": 7 }))];
    let brokers = vec![
        broker(json!({ "id": 7, "first_name": "First", "last_name": "Entry" })),
        broker(json!({ "id": 7, "first_name": "Second", "last_name": "Entry" })),
    ];

    let working = build_working_set(&listings, &brokers, &[], default_opts());
    assert_eq!(working[0].brokers[0].name, "Second Entry");
}
