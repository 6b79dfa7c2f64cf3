//! Aggregation pipeline descriptors for the tabular-data query endpoint.
//!
//! The endpoint accepts an ordered list of MQL-style stage documents. Only
//! the three stages the dashboard needs are modelled; anything fancier stays
//! server-side. Stage order is meaningful and preserved as given.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// One aggregation pipeline stage.
///
/// Serializes to the wire documents `{"$match": {...}}`, `{"$sort": {...}}`,
/// `{"$limit": N}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stage {
    #[serde(rename = "$match")]
    Match(Value),
    #[serde(rename = "$sort")]
    Sort(Value),
    #[serde(rename = "$limit")]
    Limit(u32),
}

/// Pipeline for the per-machine "current receipt" view: the single most
/// recent scan of one robot inside the lookback window.
pub fn latest_scan_pipeline(
    robot_id: &str,
    now: DateTime<Utc>,
    lookback_hours: u32,
) -> Vec<Stage> {
    let since = now - Duration::hours(i64::from(lookback_hours));
    vec![
        Stage::Match(json!({
            "robot_id": robot_id,
            "time_requested": { "$gte": since.to_rfc3339() },
        })),
        Stage::Sort(json!({ "time_requested": -1 })),
        Stage::Limit(1),
    ]
}

/// Pipeline for the fleet-wide inventory log: the most recent scans across
/// every machine, newest first.
pub fn inventory_log_pipeline(log_limit: u32) -> Vec<Stage> {
    vec![
        Stage::Sort(json!({ "time_requested": -1 })),
        Stage::Limit(log_limit),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
