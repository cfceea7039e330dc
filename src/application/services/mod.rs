//! Application services

pub mod snapshot;

pub use snapshot::{ImportSummary, Record, SnapshotService};
