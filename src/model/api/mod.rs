//! API-compatible types: request bodies and response snapshots.

pub mod ballot;
pub mod election;
