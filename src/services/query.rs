//! Query engine: filter, search, and sort over the enriched working set.
//!
//! `apply` is pure and idempotent: it never mutates the working set, and the
//! same state over the same input always yields the same view. Filters are
//! conjunctive; search runs after the type filters; sort runs last.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::aggregate::EnrichedListing;

/// Listing-type filter values.
///
/// Matching is deliberately exclusive: a listing flagged for both sale and
/// lease satisfies only `Both`, not a bare `Lease` or `Sale` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Lease,
    Sale,
    Both,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Lease => "lease",
            ListingType::Sale => "sale",
            ListingType::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lease" => Some(ListingType::Lease),
            "sale" => Some(ListingType::Sale),
            "both" => Some(ListingType::Both),
            _ => None,
        }
    }

    fn matches(&self, listing: &EnrichedListing) -> bool {
        let (lease, sale) = (listing.listing.lease, listing.listing.sale);
        match self {
            ListingType::Lease => lease && !sale,
            ListingType::Sale => sale && !lease,
            ListingType::Both => lease && sale,
        }
    }
}

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Location,
    Size,
    Brokers,
    Type,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn flip(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// User-driven view state over the working set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Property type id (canonical string form); `None` shows all types
    pub property_type: Option<String>,
    /// Listing-type filter; `None` is a no-op
    pub listing_type: Option<ListingType>,
    /// Free-text search, matched case-insensitively
    pub search: String,
    /// Single active sort key and its direction
    pub sort: Option<(SortKey, SortDir)>,
}

impl FilterState {
    /// Column-header click behavior: same key toggles direction, a new key
    /// resets to ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = match self.sort {
            Some((current, dir)) if current == key => Some((key, dir.flip())),
            _ => Some((key, SortDir::Asc)),
        };
    }
}

/// Apply the filter state to the working set, producing a new view.
pub fn apply<'a>(working_set: &'a [EnrichedListing], state: &FilterState) -> Vec<&'a EnrichedListing> {
    let mut view: Vec<&EnrichedListing> = working_set
        .iter()
        .filter(|listing| {
            if let Some(ptype) = state.property_type.as_deref() {
                if listing.listing.property_type_key().as_deref() != Some(ptype) {
                    return false;
                }
            }
            if let Some(listing_type) = state.listing_type {
                if !listing_type.matches(listing) {
                    return false;
                }
            }
            true
        })
        .collect();

    let query = state.search.trim().to_lowercase();
    if !query.is_empty() {
        view.retain(|listing| matches_search(listing, &query));
    }

    if let Some((key, dir)) = state.sort {
        view.sort_by(|a, b| {
            let ordering = compare_by_key(a, b, key);
            match dir {
                SortDir::Asc => ordering,
                SortDir::Desc => ordering.reverse(),
            }
        });
    }

    view
}

/// Any-field, case-insensitive substring match.
fn matches_search(listing: &EnrichedListing, query: &str) -> bool {
    let record = &listing.listing;
    let fields = [
        record.address.as_deref(),
        record.city.as_deref(),
        record.state.as_deref(),
        record.zip.as_deref(),
        Some(listing.broker_search_text.as_str()),
        record.lease_listing_web_title.as_deref(),
        record.sale_listing_web_title.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(query))
}

fn compare_by_key(a: &EnrichedListing, b: &EnrichedListing, key: SortKey) -> Ordering {
    match key {
        SortKey::Location => location_sort_key(a).cmp(&location_sort_key(b)),
        SortKey::Size => {
            // Display-derived value, including the SF/AC unit distinction:
            // at equal numeric value SF outranks AC, unknown sorts lowest
            let (value_a, rank_a) = a.size_display().sort_key();
            let (value_b, rank_b) = b.size_display().sort_key();
            value_a
                .partial_cmp(&value_b)
                .unwrap_or(Ordering::Equal)
                .then(rank_a.cmp(&rank_b))
        }
        SortKey::Brokers => a.broker_search_text.cmp(&b.broker_search_text),
        SortKey::Type => a
            .type_label()
            .to_lowercase()
            .cmp(&b.type_label().to_lowercase()),
    }
}

fn location_sort_key(listing: &EnrichedListing) -> String {
    let record = &listing.listing;
    format!(
        "{} {} {} {}",
        record.address.as_deref().unwrap_or(""),
        record.city.as_deref().unwrap_or(""),
        record.state.as_deref().unwrap_or(""),
        record.zip.as_deref().unwrap_or("")
    )
    .to_lowercase()
}
