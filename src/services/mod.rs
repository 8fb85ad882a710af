//! Service layer: refresh orchestration and the aggregation/query engines.

pub mod aggregate;
#[cfg(test)]
mod aggregate_tests;

pub mod labels;

pub mod query;
#[cfg(test)]
mod query_tests;

pub mod refresh;

pub mod url_state;
#[cfg(test)]
mod url_state_tests;

pub use aggregate::{build_working_set, AggregateOptions, EnrichedListing, SizeDisplay};
pub use query::{apply, FilterState, ListingType, SortDir, SortKey};
pub use refresh::{RefreshController, RefreshError, RefreshOutcome};
