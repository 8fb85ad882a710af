//! Aggregation engine: joins listings with brokers and lease spaces and
//! computes the derived fields the table displays.
//!
//! The working set is rebuilt from scratch on every full reload and never
//! mutated afterwards; filtering and sorting produce new views over the same
//! enriched records.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::fields::SQFT_PER_ACRE;
use crate::models::{Broker, LeaseSpace, Listing};

use super::labels;

/// Shown when a listing carries no usable description.
pub const DESCRIPTION_FALLBACK: &str = "No description available.";

/// Shown when neither available SF nor building size is known. Never zero:
/// zero reads as a real measurement.
pub const SIZE_UNKNOWN_MARKER: &str = "—";

/// Options for [`build_working_set`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Populate per-listing size diagnostics (tooling aid, not a stable interface)
    pub debug: bool,
}

/// Broker reference attached to an enriched listing.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerRef {
    pub id: Option<String>,
    pub name: String,
    pub email: Option<String>,
}

/// Diagnostic breakdown of how a listing's available SF was computed.
#[derive(Debug, Clone, Serialize)]
pub struct SizeDebug {
    /// Resolved size of each active space bucketed under this listing
    pub space_sizes: Vec<f64>,
    pub total_available_sf: f64,
    pub building_size_sf: Option<f64>,
}

/// The size figure a listing displays, including its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeDisplay {
    SquareFeet(f64),
    Acres(f64),
    Unknown,
}

impl SizeDisplay {
    /// Human-readable label ("12,500 SF", "0.23 AC", or the unknown marker).
    pub fn label(&self) -> String {
        match self {
            SizeDisplay::SquareFeet(sf) => format!("{} SF", format_thousands(*sf)),
            SizeDisplay::Acres(acres) => format!("{:.2} AC", acres),
            SizeDisplay::Unknown => SIZE_UNKNOWN_MARKER.to_string(),
        }
    }

    /// Sort key: numeric value plus a unit rank for the tie-break.
    ///
    /// At equal numeric value, SF-denominated rows outrank AC-denominated
    /// rows, so a descending sort shows SF first; ascending reverses that.
    /// Unknown sizes sort below everything.
    pub fn sort_key(&self) -> (f64, u8) {
        match self {
            SizeDisplay::Unknown => (f64::NEG_INFINITY, 0),
            SizeDisplay::Acres(acres) => (*acres, 1),
            SizeDisplay::SquareFeet(sf) => (*sf, 2),
        }
    }
}

/// A listing joined with its brokers and active lease spaces.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedListing {
    #[serde(flatten)]
    pub listing: Listing,
    /// HTML-escaped broker pills for rendering
    pub broker_display: String,
    /// Structured broker array for programmatic consumers
    pub brokers: Vec<BrokerRef>,
    /// Lowercased plain-text broker names and emails, used by search and sort
    pub broker_search_text: String,
    /// Sum of the resolved sizes of this listing's active lease spaces
    pub total_available_sf: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_debug: Option<SizeDebug>,
}

impl EnrichedListing {
    /// Size figure for display and size-sorting.
    ///
    /// Summed available SF takes precedence over raw building size; land
    /// listings fall back to acres; with neither, the unknown marker.
    pub fn size_display(&self) -> SizeDisplay {
        if self.total_available_sf > 0.0 {
            return SizeDisplay::SquareFeet(self.total_available_sf);
        }
        match self.listing.building_size() {
            Some(building) if self.listing.is_land() => {
                SizeDisplay::Acres(building / SQFT_PER_ACRE)
            }
            Some(building) => SizeDisplay::SquareFeet(building),
            None => SizeDisplay::Unknown,
        }
    }

    /// Derived availability label; never stored upstream.
    pub fn type_label(&self) -> &'static str {
        match (self.listing.lease, self.listing.sale) {
            (true, true) => "For Sale & Lease",
            (true, false) => "For Lease",
            _ => "For Sale",
        }
    }

    /// "address, city, state zip" with empty parts elided.
    pub fn location_text(&self) -> String {
        let listing = &self.listing;
        let mut out = String::new();
        for part in [
            listing.address.as_deref(),
            listing.city.as_deref(),
            listing.state.as_deref(),
        ] {
            let part = part.unwrap_or("").trim();
            if part.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(part);
        }
        if let Some(zip) = listing.zip.as_deref() {
            let zip = zip.trim();
            if !zip.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(zip);
            }
        }
        out
    }

    /// Description matching the listing's availability, with a fixed fallback.
    pub fn description(&self) -> &str {
        let listing = &self.listing;
        if listing.lease {
            if let Some(desc) = non_empty(listing.lease_description.as_deref()) {
                return desc;
            }
        }
        if listing.sale {
            if let Some(desc) = non_empty(listing.sale_description.as_deref()) {
                return desc;
            }
        }
        DESCRIPTION_FALLBACK
    }

    /// Primary outbound listing URL (lease first, then sale).
    pub fn primary_url(&self) -> Option<&str> {
        non_empty(self.listing.lease_listing_url.as_deref())
            .or_else(|| non_empty(self.listing.sale_listing_url.as_deref()))
    }

    /// Brochure PDF matching the availability label.
    pub fn brochure_url(&self) -> Option<&str> {
        let listing = &self.listing;
        match (listing.lease, listing.sale) {
            (true, false) => non_empty(listing.lease_pdf_url.as_deref()),
            (false, true) => non_empty(listing.sale_pdf_url.as_deref()),
            _ => non_empty(listing.sale_pdf_url.as_deref())
                .or_else(|| non_empty(listing.lease_pdf_url.as_deref())),
        }
    }

    /// Video tour URL, if either hosting field is present.
    pub fn video_url(&self) -> Option<&str> {
        non_empty(self.listing.you_tube_url.as_deref())
            .or_else(|| non_empty(self.listing.matterport_url.as_deref()))
    }

    /// Subtype display label, when the subtype id is known.
    pub fn subtype_label(&self) -> Option<&'static str> {
        self.listing
            .property_subtype_key()
            .and_then(|id| labels::property_subtype_label(&id))
    }

    /// "Subtype – Availability" line for the expanded card.
    pub fn subtype_type_line(&self) -> String {
        match self.subtype_label() {
            Some(subtype) => format!("{} – {}", subtype, self.type_label()),
            None => self.type_label().to_string(),
        }
    }
}

/// Build the canonical working set from the three upstream collections.
///
/// Inactive listings and spaces are excluded up front; spaces with no
/// resolvable parent are dropped; every join failure degrades the affected
/// field only.
pub fn build_working_set(
    listings: &[Listing],
    brokers: &[Broker],
    spaces: &[LeaseSpace],
    opts: AggregateOptions,
) -> Vec<EnrichedListing> {
    // Broker index; upstream ids are assumed unique, last write wins otherwise
    let broker_index: HashMap<String, &Broker> = brokers
        .iter()
        .filter_map(|broker| broker.join_key().map(|key| (key, broker)))
        .collect();

    // Active spaces grouped by resolved parent property
    let mut spaces_by_property: HashMap<String, Vec<&LeaseSpace>> = HashMap::new();
    for space in spaces {
        if !space.is_active() {
            continue;
        }
        let Some(parent) = space.parent_key() else {
            continue;
        };
        spaces_by_property.entry(parent).or_default().push(space);
    }

    listings
        .iter()
        .filter(|listing| listing.is_active())
        .map(|listing| enrich(listing, &broker_index, &spaces_by_property, opts))
        .collect()
}

fn enrich(
    listing: &Listing,
    broker_index: &HashMap<String, &Broker>,
    spaces_by_property: &HashMap<String, Vec<&LeaseSpace>>,
    opts: AggregateOptions,
) -> EnrichedListing {
    let bucketed = listing
        .join_key()
        .and_then(|key| spaces_by_property.get(&key))
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let space_sizes: Vec<f64> = bucketed.iter().filter_map(|space| space.size_sf()).collect();
    let total_available_sf: f64 = space_sizes.iter().sum();

    let attached: Vec<&Broker> = [&listing.broker_id, &listing.second_broker_id]
        .into_iter()
        .filter_map(|id| id.as_ref())
        .filter_map(crate::models::fields::join_key)
        .filter_map(|key| broker_index.get(&key).copied())
        .collect();

    let broker_display = attached
        .iter()
        .map(|broker| broker_pill(broker))
        .collect::<Vec<_>>()
        .join(" ");

    let broker_search_text = attached
        .iter()
        .flat_map(|broker| {
            [
                Some(broker.display_name()),
                broker.email.as_deref().map(str::to_string),
            ]
        })
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let brokers = attached
        .iter()
        .map(|broker| BrokerRef {
            id: broker.join_key(),
            name: broker.display_name(),
            email: broker.email.clone(),
        })
        .collect();

    let size_debug = opts.debug.then(|| SizeDebug {
        space_sizes: space_sizes.clone(),
        total_available_sf,
        building_size_sf: listing.building_size(),
    });

    EnrichedListing {
        listing: listing.clone(),
        broker_display,
        brokers,
        broker_search_text,
        total_available_sf,
        size_debug,
    }
}

/// One broker chip: a mailto anchor when the email is known, a plain span
/// otherwise. Names and emails are escaped before being embedded.
fn broker_pill(broker: &Broker) -> String {
    let name = escape_html(&broker.display_name());
    match broker.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) => {
            let email = escape_html(email);
            format!(
                "<a href=\"mailto:{email}\" class=\"broker-pill\" data-email=\"{email}\">{name}</a>"
            )
        }
        None => format!("<span class=\"broker-pill\">{name}</span>"),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Group an integer-rounded number with thousands separators.
fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
