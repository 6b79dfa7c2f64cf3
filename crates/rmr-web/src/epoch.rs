//! View-epoch guard.
//!
//! Every view fetch starts by bumping a monotonically increasing epoch and
//! keeping the resulting ticket. When the fetch completes, its results are
//! applied only if no newer fetch has begun in the meantime; otherwise the
//! response says so instead of painting stale data. One guard serves the
//! whole process, matching the single-operator model of the dashboard.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter deciding whether a completed fetch is still the newest.
#[derive(Debug, Default)]
pub struct ViewEpoch {
    current: AtomicU64,
}

/// Proof of participation in one fetch, handed out by [`ViewEpoch::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochTicket(u64);

impl ViewEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch. Invalidates every outstanding ticket and returns
    /// the ticket for this fetch.
    pub fn begin(&self) -> EpochTicket {
        EpochTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` still belongs to the newest fetch.
    pub fn is_current(&self, ticket: EpochTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
