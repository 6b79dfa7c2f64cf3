//! View handlers: fetch, normalize, render.
//!
//! Each view handler is one atomic unit of work: bump the epoch, fetch
//! everything the view needs, normalize, render a complete body, and hand it
//! back. Nothing is patched incrementally and nothing is cached between
//! requests. When the state is degraded the handlers skip fetching entirely
//! and render the stored initialization failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use futures::future::try_join_all;
use indexmap::IndexSet;
use rmr_core::normalizer::normalize;
use rmr_core::{export, LogRecord, ScanRecord, ViewKind, UNKNOWN_MACHINE};
use rmr_fleet::{inventory_log_pipeline, latest_scan_pipeline, FleetError};

use crate::app::{AppContext, AppState};
use crate::render::{self, MachineCard};

// ---------------------------------------------------------------------------
// Page routes
// ---------------------------------------------------------------------------

/// `GET /` — the shell. No fleet traffic until a view is picked.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let body = match state.as_ref() {
        AppState::Degraded { error, .. } => render::fatal_fragment(error),
        AppState::Ready(_) => render::index_fragment(),
    };
    Html(render::page(&state.config().ui, None, &body))
}

/// `GET /receipt` — per-machine cards over the lookback window.
pub async fn receipt_view(State(state): State<Arc<AppState>>) -> Html<String> {
    let ui = &state.config().ui;
    let ctx = match state.as_ref() {
        AppState::Degraded { error, .. } => {
            let body = render::fatal_fragment(error);
            return Html(render::page(ui, Some(ViewKind::Receipt), &body));
        }
        AppState::Ready(ctx) => ctx,
    };

    let ticket = ctx.epoch.begin();
    let result = fetch_receipt_cards(ctx).await;
    let body = if !ctx.epoch.is_current(ticket) {
        tracing::debug!(view = %ViewKind::Receipt, "fetch superseded by a newer request");
        render::superseded_fragment(ViewKind::Receipt)
    } else {
        match result {
            Ok(cards) => {
                render::receipt_fragment(&cards, ui, ctx.config.query.lookback_hours)
            }
            Err(err) => {
                tracing::warn!(view = %ViewKind::Receipt, error = %err, "view fetch failed");
                render::error_fragment(&err.to_string())
            }
        }
    };
    Html(render::page(ui, Some(ViewKind::Receipt), &body))
}

/// `GET /log` — the fleet-wide rolling inventory log.
pub async fn log_view(State(state): State<Arc<AppState>>) -> Html<String> {
    let ui = &state.config().ui;
    let ctx = match state.as_ref() {
        AppState::Degraded { error, .. } => {
            let body = render::fatal_fragment(error);
            return Html(render::page(ui, Some(ViewKind::Log), &body));
        }
        AppState::Ready(ctx) => ctx,
    };

    let ticket = ctx.epoch.begin();
    let result = fetch_log_records(ctx).await;
    let body = if !ctx.epoch.is_current(ticket) {
        tracing::debug!(view = %ViewKind::Log, "fetch superseded by a newer request");
        render::superseded_fragment(ViewKind::Log)
    } else {
        match result {
            Ok(records) => render::log_fragment(&records, ui),
            Err(err) => {
                tracing::warn!(view = %ViewKind::Log, error = %err, "view fetch failed");
                render::error_fragment(&err.to_string())
            }
        }
    };
    Html(render::page(ui, Some(ViewKind::Log), &body))
}

// ---------------------------------------------------------------------------
// Export and health
// ---------------------------------------------------------------------------

/// `GET /export/log.csv` — the inventory log as a CSV download.
pub async fn export_log_csv(State(state): State<Arc<AppState>>) -> Response {
    let ctx = match state.as_ref() {
        AppState::Degraded { error, .. } => {
            let msg = format!("initialization failed: {error}");
            return (StatusCode::SERVICE_UNAVAILABLE, msg).into_response();
        }
        AppState::Ready(ctx) => ctx,
    };

    match fetch_log_records(ctx).await {
        Ok(records) => match export::log_to_csv(&records) {
            Ok(csv) => (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"inventory-log.csv\"",
                    ),
                ],
                csv,
            )
                .into_response(),
            Err(err) => {
                tracing::warn!(error = %err, "csv export failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("export failed: {err:#}"))
                    .into_response()
            }
        },
        Err(err) => {
            tracing::warn!(error = %err, "csv export fetch failed");
            (StatusCode::BAD_GATEWAY, format!("fleet query failed: {err}")).into_response()
        }
    }
}

/// `GET /healthz` — 200 when initialized, 503 with the failure otherwise.
pub async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.as_ref() {
        AppState::Ready(_) => (StatusCode::OK, "ok").into_response(),
        AppState::Degraded { error, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("initialization failed: {error}"),
        )
            .into_response(),
    }
}

/// Middleware logging method, path, status, and elapsed time per request.
pub async fn request_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let resp = next.run(req).await;

    tracing::debug!(
        %method,
        path,
        status = resp.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "http request"
    );
    resp
}

// ---------------------------------------------------------------------------
// Fetch plumbing
// ---------------------------------------------------------------------------

/// Assemble the receipt view: list the fragment's machines, then query each
/// machine's latest scan concurrently. Card order follows the listing.
async fn fetch_receipt_cards(ctx: &AppContext) -> Result<Vec<MachineCard>, FleetError> {
    let listing = ctx
        .fleet
        .list_machines_for_fragment(&ctx.config.fleet.fragment_id)
        .await?;
    let now = Utc::now();

    let mut targets = Vec::new();
    for location in &listing {
        for machine in &location.machines {
            targets.push((location, machine));
        }
    }

    let fetches = targets.iter().map(|(location, machine)| {
        let stages =
            latest_scan_pipeline(&machine.machine_id, now, ctx.config.query.lookback_hours);
        let fleet = &ctx.fleet;
        let organization_id = location.organization_id.as_str();
        async move {
            let records = fleet.query_aggregated(organization_id, &stages).await?;
            Ok::<_, FleetError>(records.into_iter().next())
        }
    });
    let latest = try_join_all(fetches).await?;

    Ok(targets
        .iter()
        .zip(latest)
        .map(|((location, machine), record)| {
            let groups = record
                .as_ref()
                .map(|r| normalize(r.raw_items()))
                .unwrap_or_default();
            MachineCard {
                location_id: location.location_id.clone(),
                organization_name: location.organization_name.clone(),
                machine_name: machine.display_name().to_string(),
                record,
                groups,
            }
        })
        .collect())
}

/// Assemble the inventory log: query every organisation in the listing,
/// merge newest-first, and re-apply the fleet-wide limit.
async fn fetch_log_records(ctx: &AppContext) -> Result<Vec<LogRecord>, FleetError> {
    let listing = ctx
        .fleet
        .list_machines_for_fragment(&ctx.config.fleet.fragment_id)
        .await?;

    let mut names: HashMap<&str, &str> = HashMap::new();
    let mut organizations: IndexSet<&str> = IndexSet::new();
    for location in &listing {
        organizations.insert(location.organization_id.as_str());
        for machine in &location.machines {
            names.insert(machine.machine_id.as_str(), machine.display_name());
        }
    }

    let log_limit = ctx.config.query.log_limit;
    let stages = inventory_log_pipeline(log_limit);
    let fetches = organizations.iter().map(|&organization_id| {
        let fleet = &ctx.fleet;
        let stages = &stages;
        async move { fleet.query_aggregated(organization_id, stages).await }
    });
    let mut merged: Vec<ScanRecord> = try_join_all(fetches)
        .await?
        .into_iter()
        .flatten()
        .collect();

    merged.sort_by_key(|record| std::cmp::Reverse(record.time_requested));
    merged.truncate(log_limit as usize);

    Ok(merged
        .into_iter()
        .map(|record| {
            let groups = normalize(record.raw_items());
            LogRecord {
                time: record.time_requested,
                machine_name: names
                    .get(record.robot_id.as_str())
                    .copied()
                    .unwrap_or(UNKNOWN_MACHINE)
                    .to_string(),
                store_name: record.store_name().to_string(),
                groups,
            }
        })
        .collect())
}
