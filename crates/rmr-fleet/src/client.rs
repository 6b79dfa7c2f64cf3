//! Fleet cloud API client.
//!
//! Thin JSON-over-HTTP wrapper around the two read endpoints the dashboard
//! uses: the machine listing for a fragment and the tabular-data aggregation
//! query. Every call authenticates with the bearer token extracted from the
//! operator's session cookie. No caching and no retry: each view refresh
//! re-issues its queries in full.

use std::time::Duration;

use rmr_core::{LocationGroup, ScanRecord};
use serde::Serialize;

use crate::query::Stage;

/// Typed failure of a fleet API call.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("failed to build fleet HTTP client: {0}")]
    Build(reqwest::Error),
    #[error("fleet API transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("fleet API rejected the credential (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("fleet API returned HTTP {status}")]
    Upstream { status: u16 },
    #[error("fleet API response did not match the expected shape: {0}")]
    Decode(reqwest::Error),
}

/// Client for the fleet cloud API. Cheap to clone.
#[derive(Clone)]
pub struct FleetClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

// The bearer token must never reach log output.
impl std::fmt::Debug for FleetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    organization_id: &'a str,
    stages: &'a [Stage],
}

impl FleetClient {
    /// Build a client against `api_base`, authenticating with `token`.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FleetError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FleetError::Build)?;

        let mut api_base = api_base.into();
        while api_base.ends_with('/') {
            api_base.pop();
        }

        Ok(Self {
            http,
            api_base,
            token: token.into(),
        })
    }

    /// List every location group (and its machines) attached to a fragment.
    pub async fn list_machines_for_fragment(
        &self,
        fragment_id: &str,
    ) -> Result<Vec<LocationGroup>, FleetError> {
        let url = format!("{}/v1/fleet/machines", self.api_base);
        let resp = self
            .http
            .get(&url)
            .query(&[("fragment_id", fragment_id)])
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(resp.status())?;

        let groups: Vec<LocationGroup> = resp.json().await.map_err(FleetError::Decode)?;
        tracing::debug!(fragment_id, groups = groups.len(), "machine listing fetched");
        Ok(groups)
    }

    /// Run an aggregation pipeline against the tabular scan data of one
    /// organisation. Stage order is preserved on the wire.
    pub async fn query_aggregated(
        &self,
        organization_id: &str,
        stages: &[Stage],
    ) -> Result<Vec<ScanRecord>, FleetError> {
        let url = format!("{}/v1/data/query", self.api_base);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&QueryRequest {
                organization_id,
                stages,
            })
            .send()
            .await?;
        check_status(resp.status())?;

        let records: Vec<ScanRecord> = resp.json().await.map_err(FleetError::Decode)?;
        tracing::debug!(
            organization_id,
            records = records.len(),
            "aggregation query returned"
        );
        Ok(records)
    }
}

/// Map upstream status codes onto [`FleetError`] before decoding the body.
fn check_status(status: reqwest::StatusCode) -> Result<(), FleetError> {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(FleetError::Unauthorized {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Err(FleetError::Upstream {
            status: status.as_u16(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
