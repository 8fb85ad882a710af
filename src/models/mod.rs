//! Data model for upstream records and the persisted snapshot.

pub mod fields;
pub mod records;
pub mod snapshot;

pub use records::{Broker, LeaseSpace, Listing, Photo};
pub use snapshot::Snapshot;
