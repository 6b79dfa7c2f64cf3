//! Core types for rmr-core — Read My Receipts.
//!
//! This module defines the data structures shared across all architectural
//! layers: the wire-shaped [`ScanRecord`] tree as the fleet cloud returns it,
//! the normalised [`GroupedItem`] the dashboard renders, and the fleet
//! topology types ([`LocationGroup`], [`MachineRef`]).
//!
//! Everything below `ScanRecord::data` is optional at every level. The OCR
//! pipeline on the machines emits whatever it managed to read from the paper,
//! so deserialization must never reject a record for a missing subtree.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Placeholder shown when a reading carries no store name.
pub const UNKNOWN_STORE: &str = "Unknown Store";
/// Placeholder shown when a robot id cannot be resolved to a machine name.
pub const UNKNOWN_MACHINE: &str = "Unknown Machine";

// ---------------------------------------------------------------------------
// Receipt line items
// ---------------------------------------------------------------------------

/// One OCR-extracted receipt line, exactly as the aggregation query returns it.
///
/// Both fields are optional: torn paper, glare, or partial frames routinely
/// produce lines with a price but no description, or the other way round.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawItem {
    /// Item description as read by the OCR pipeline. Often polluted with
    /// barcode digit runs and tax-code letters; see [`crate::normalizer`].
    #[serde(default)]
    pub desc: Option<String>,
    /// Line price. Treated as 0 when absent.
    #[serde(default)]
    pub price: Option<f64>,
}

impl RawItem {
    /// Build an item with both fields present (useful in tests).
    pub fn new(desc: impl Into<String>, price: f64) -> Self {
        Self {
            desc: Some(desc.into()),
            price: Some(price),
        }
    }
}

/// One line of a rendered receipt: a cleaned description plus the aggregate
/// of every raw line that normalised to it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedItem {
    /// Cleaned, display-ready description. Also the grouping key.
    pub description: String,
    /// How many raw lines collapsed into this group. Always at least 1.
    pub count: u32,
    /// Sum of the line prices; missing prices contribute zero.
    pub total_price: f64,
}

// ---------------------------------------------------------------------------
// Wire shape — tabular scan records
// ---------------------------------------------------------------------------

/// One row returned by the fleet cloud's tabular-data aggregation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRecord {
    /// When the scan was requested (UTC). Doubles as the query sort key.
    pub time_requested: DateTime<Utc>,
    /// Robot that produced the scan.
    pub robot_id: String,
    /// Scan payload. An absent payload deserialises to the empty default.
    #[serde(default)]
    pub data: ScanData,
}

impl ScanRecord {
    /// The raw line items of this scan, flattened through both optional
    /// layers. Empty when the payload or the readings are absent.
    pub fn raw_items(&self) -> &[RawItem] {
        self.data
            .readings
            .as_ref()
            .and_then(|r| r.items.as_deref())
            .unwrap_or(&[])
    }

    /// Store name for display, falling back to [`UNKNOWN_STORE`].
    pub fn store_name(&self) -> &str {
        self.data
            .readings
            .as_ref()
            .and_then(|r| r.store.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN_STORE)
    }

    /// Totals block of the reading, when one was parsed.
    pub fn metrics(&self) -> Option<Metrics> {
        self.data.readings.as_ref().and_then(|r| r.metrics)
    }
}

/// Payload wrapper inside a [`ScanRecord`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanData {
    /// OCR readings for this scan; absent when the run produced nothing.
    #[serde(default)]
    pub readings: Option<Reading>,
}

/// The OCR output for a single receipt scan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reading {
    /// Store name as printed on the receipt header.
    #[serde(default)]
    pub store: Option<String>,
    /// Receipt line items. `None` and `Some(vec![])` both mean "no items".
    #[serde(default)]
    pub items: Option<Vec<RawItem>>,
    /// Receipt totals block, when the OCR pipeline found one.
    #[serde(default)]
    pub metrics: Option<Metrics>,
}

/// Totals block printed at the bottom of a receipt. Absent numbers display
/// as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

// ---------------------------------------------------------------------------
// Fleet topology
// ---------------------------------------------------------------------------

/// One entry from the machine-listing endpoint: a physical site, the
/// organisation operating it, and the machines deployed there.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationGroup {
    pub location_id: String,
    /// Organisation id, required by the aggregation query endpoint.
    pub organization_id: String,
    pub organization_name: String,
    #[serde(default)]
    pub machines: Vec<MachineRef>,
}

/// A single machine within a [`LocationGroup`].
#[derive(Debug, Clone, Deserialize)]
pub struct MachineRef {
    pub machine_id: String,
    /// Human-readable name. May be missing or blank upstream.
    #[serde(default)]
    pub machine_name: String,
}

impl MachineRef {
    /// Machine name for display, falling back to [`UNKNOWN_MACHINE`].
    pub fn display_name(&self) -> &str {
        if self.machine_name.trim().is_empty() {
            UNKNOWN_MACHINE
        } else {
            &self.machine_name
        }
    }
}

// ---------------------------------------------------------------------------
// Assembled records
// ---------------------------------------------------------------------------

/// One assembled inventory-log record: a scan joined with the machine it came
/// from and its normalised items. Built per request, rendered or exported,
/// then discarded.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Scan time, from the record's `time_requested`.
    pub time: DateTime<Utc>,
    /// Resolved machine name ([`UNKNOWN_MACHINE`] when the robot id is not in
    /// the fleet listing).
    pub machine_name: String,
    /// Store name ([`UNKNOWN_STORE`] when the reading carried none).
    pub store_name: String,
    /// Normalised items; empty when the scan had no parsable lines.
    pub groups: Vec<GroupedItem>,
}

// ---------------------------------------------------------------------------
// View vocabulary
// ---------------------------------------------------------------------------

/// Which dashboard view a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Per-machine "current receipt" view over the lookback window.
    Receipt,
    /// Fleet-wide rolling inventory log.
    Log,
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Receipt => write!(f, "receipt"),
            ViewKind::Log => write!(f, "log"),
        }
    }
}

/// Render state of one machine card or log row.
///
/// The three states must stay visually distinct in the rendered HTML, so
/// every consumer derives the state through [`RecordState::classify`] rather
/// than re-deriving it ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// No record at all inside the query window.
    Empty,
    /// A record exists but no line items survived normalisation.
    NoItems,
    /// A record with at least one grouped item.
    Items,
}

impl RecordState {
    /// Derive the state from a fetched record and its normalised groups.
    pub fn classify(record: Option<&ScanRecord>, groups: &[GroupedItem]) -> Self {
        match record {
            None => RecordState::Empty,
            Some(_) if groups.is_empty() => RecordState::NoItems,
            Some(_) => RecordState::Items,
        }
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordState::Empty => write!(f, "no data"),
            RecordState::NoItems => write!(f, "no items"),
            RecordState::Items => write!(f, "items"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
