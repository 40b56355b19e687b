//! Data source module.
//!
//! This module provides functionality for:
//! - Fetching the meteor and station payloads over HTTP
//! - Decoding raw JSON records
//! - Mapping records to styled map features

mod fetch;
mod mapper;
mod records;

pub use fetch::{FetchChannel, FetchError, FetchOutcome};
pub use mapper::{map_meteors, map_stations, MappedBatch, SnapshotMode};
pub use records::{decode_records, MeteorRecord, StationRecord};
