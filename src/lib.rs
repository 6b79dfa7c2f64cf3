//! rmr — Read My Receipts
//!
//! Web dashboard for OCR receipt readings from a robot fleet. The binary in
//! this crate is a thin shell; the layers live in their own crates and are
//! re-exported here so integration tests can reach everything through one
//! import.
//!
//! # Architecture
//!
//! ```text
//! cookie ──► credentials ──► FleetClient ──► normalizer ──► HTML views
//!                                │               │
//!                                └───────────────┴──► CSV export
//! ```
//!
//! One `tokio` runtime serves every view. Per-machine queries fan out
//! concurrently and join before rendering; each response body is built in
//! full before it is written.

pub use rmr_core::{config, export, normalizer, types};
pub use rmr_fleet::{client, credentials, query};
pub use rmr_web::{app, epoch, render};

pub use rmr_core::{
    GroupedItem, LocationGroup, LogRecord, MachineRef, Metrics, RawItem, Reading, RecordState,
    ScanRecord, ViewKind, UNKNOWN_MACHINE, UNKNOWN_STORE,
};
pub use rmr_fleet::{FleetClient, FleetError, Stage};
pub use rmr_web::{AppContext, AppState, MachineCard, ViewEpoch};
