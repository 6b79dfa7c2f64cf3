//! rmr-fleet — credential extraction and the fleet cloud API client.
//!
//! Two concerns live here, both upstream of everything the dashboard shows:
//! extracting the operator's API token out of a cloud session cookie
//! ([`credentials`]) and issuing authenticated listing/aggregation calls
//! ([`client`], with the canned pipelines in [`query`]).
//!
//! All errors are typed; the binary decides what is fatal. Initialization
//! failures (no cookie, no token) leave the dashboard in a degraded mode
//! where every view renders the failure instead of data.

pub mod client;
pub mod credentials;
pub mod query;

pub use client::{FleetClient, FleetError};
pub use credentials::{extract_token, token_from_env_or_file, CredentialError, COOKIE_ENV_VAR};
pub use query::{inventory_log_pipeline, latest_scan_pipeline, Stage};
