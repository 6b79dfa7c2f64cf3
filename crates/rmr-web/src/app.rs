//! Application assembly: shared state, router, and serving.
//!
//! There is no global mutable state anywhere in the dashboard. Everything a
//! handler needs lives in one [`AppState`] built at startup and passed to
//! every handler through the router. An initialization failure does not kill
//! the process: the state records the failure and every view renders it
//! until the operator restarts with a working credential.

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use rmr_core::config::Config;
use rmr_fleet::{token_from_env_or_file, FleetClient};

use crate::epoch::ViewEpoch;
use crate::handlers;

/// Everything a live view handler needs, constructed once at startup.
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub fleet: FleetClient,
    pub epoch: ViewEpoch,
}

/// Shared handler state: either a working context or the initialization
/// failure every view must display.
#[derive(Debug)]
pub enum AppState {
    Ready(AppContext),
    Degraded { config: Config, error: String },
}

impl AppState {
    /// The loaded configuration, regardless of initialization outcome.
    pub fn config(&self) -> &Config {
        match self {
            AppState::Ready(ctx) => &ctx.config,
            AppState::Degraded { config, .. } => config,
        }
    }
}

/// Build the shared state: extract the credential and construct the fleet
/// client. Failure yields the degraded state instead of an error so the
/// server still comes up and shows what went wrong.
pub fn init(config: Config) -> Arc<AppState> {
    match build_fleet_client(&config) {
        Ok(fleet) => Arc::new(AppState::Ready(AppContext {
            config,
            fleet,
            epoch: ViewEpoch::new(),
        })),
        Err(err) => {
            tracing::error!("initialization failed, serving degraded: {err:#}");
            Arc::new(AppState::Degraded {
                config,
                error: format!("{err:#}"),
            })
        }
    }
}

fn build_fleet_client(config: &Config) -> anyhow::Result<FleetClient> {
    let token = token_from_env_or_file(config.auth.cookie_file.as_deref())?;
    let fleet = FleetClient::new(
        config.fleet.api_base.as_str(),
        token,
        Duration::from_secs(config.fleet.timeout_secs),
    )?;
    Ok(fleet)
}

/// The dashboard router over a prepared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/receipt", get(handlers::receipt_view))
        .route("/log", get(handlers::log_view))
        .route("/export/log.csv", get(handlers::export_log_csv))
        .route("/healthz", get(handlers::healthz))
        .layer(middleware::from_fn(handlers::request_log))
        .with_state(state)
}

/// Bind `bind` and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "dashboard listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
