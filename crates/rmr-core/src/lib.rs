//! rmr-core — Read My Receipts core library.
//!
//! This crate holds everything the dashboard layers share: the wire-shaped
//! record types, the configuration, the receipt normalizer, and the CSV
//! export of the inventory log.
//!
//! # Architecture
//!
//! ```text
//! Fleet cloud ──► rmr-fleet ──► normalizer ──► rmr-web (HTML)
//!                     │             │
//!                     └─────────────┴──► export (CSV)
//! ```
//!
//! Nothing here performs I/O except [`config::Config::load`]; the cloud
//! client lives in `rmr-fleet` and the HTTP surface in `rmr-web`.

pub mod config;
pub mod export;
pub mod normalizer;
pub mod types;

pub use types::{
    GroupedItem, LocationGroup, LogRecord, MachineRef, Metrics, RawItem, Reading, RecordState,
    ScanData, ScanRecord, ViewKind, UNKNOWN_MACHINE, UNKNOWN_STORE,
};
