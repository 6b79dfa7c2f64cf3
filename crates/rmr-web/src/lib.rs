//! rmr-web — the Read My Receipts dashboard surface.
//!
//! Server-rendered HTML over `axum`: two views (the per-machine current
//! receipt and the fleet-wide inventory log), a CSV export, and a health
//! probe. Handlers fetch through `rmr-fleet`, normalize through `rmr-core`,
//! and render complete page bodies; nothing is patched incrementally.
//!
//! The module split mirrors the request path: [`app`] builds the shared
//! state and the router, [`handlers`] do the per-request work, [`render`]
//! turns assembled data into HTML, and [`epoch`] guards against a slow fetch
//! overwriting a newer one.

pub mod app;
pub mod epoch;
pub mod handlers;
pub mod render;

pub use app::{init, router, serve, AppContext, AppState};
pub use epoch::{EpochTicket, ViewEpoch};
pub use render::MachineCard;
