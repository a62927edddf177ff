// src/reading/snapshot.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use crate::region::Region;

/// Point-in-time copy of a populated reading, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub source_url: String,
    pub fetched_at: DateTime<Utc>,
    pub three_hour: String,
    pub twenty_four_hour: BTreeMap<Region, String>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
