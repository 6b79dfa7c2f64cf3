//! View renderer — pure functions from assembled view data to HTML.
//!
//! No business logic and no normalization here: the handlers assemble the
//! data, these functions only lay it out. Every piece of dynamic text passes
//! through [`escape_html`]. The stylesheet is embedded in the binary so the
//! dashboard works with no files on disk.
//!
//! Each machine card and log row carries one of the three
//! [`RecordState`] CSS classes, so "no data", "no parsable items", and
//! "items" stay visually distinct.

use chrono::{DateTime, Utc};
use rmr_core::config::UiConfig;
use rmr_core::{GroupedItem, LogRecord, RecordState, ScanRecord, ViewKind};

const STYLESHEET: &str = include_str!("style.css");

/// Per-machine card data for the receipt view, assembled by the handler.
#[derive(Debug, Clone)]
pub struct MachineCard {
    pub location_id: String,
    pub organization_name: String,
    pub machine_name: String,
    /// Most recent scan inside the lookback window, if any.
    pub record: Option<ScanRecord>,
    /// Normalised items of that scan.
    pub groups: Vec<GroupedItem>,
}

// ---------------------------------------------------------------------------
// Page shell
// ---------------------------------------------------------------------------

/// Render the full page: head, header with the two view tabs, `content`
/// inside `<main>`, and the export link in the footer.
pub fn page(ui: &UiConfig, active: Option<ViewKind>, content: &str) -> String {
    let title = escape_html(&ui.page_title);
    let mut html = String::with_capacity(4096 + STYLESHEET.len());

    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str("<style>");
    html.push_str(STYLESHEET);
    html.push_str("</style>\n</head>\n<body>\n<header>\n");
    html.push_str(&format!("<h1>{title}</h1>\n"));
    html.push_str("<nav class=\"tabs\">");
    html.push_str(&tab_link(ViewKind::Receipt, "/receipt", "Current Receipt", active));
    html.push_str(&tab_link(ViewKind::Log, "/log", "Inventory Log", active));
    html.push_str("</nav>\n</header>\n<main>\n");
    html.push_str(content);
    html.push_str(
        "\n</main>\n<footer><a href=\"/export/log.csv\">Export inventory log (CSV)</a></footer>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn tab_link(kind: ViewKind, href: &str, label: &str, active: Option<ViewKind>) -> String {
    let class = if active == Some(kind) {
        " class=\"active\""
    } else {
        ""
    };
    format!("<a href=\"{href}\"{class}>{label}</a>")
}

/// Landing content for `/`: no fetch happens until a view is picked.
pub fn index_fragment() -> String {
    "<p class=\"hint\">Pick a view: <a href=\"/receipt\">Current Receipt</a> \
     or <a href=\"/log\">Inventory Log</a>.</p>"
        .to_string()
}

// ---------------------------------------------------------------------------
// Receipt view
// ---------------------------------------------------------------------------

/// Render the per-machine receipt cards.
pub fn receipt_fragment(cards: &[MachineCard], ui: &UiConfig, lookback_hours: u32) -> String {
    if cards.is_empty() {
        return "<p class=\"hint\">No machines are attached to the configured fragment.</p>"
            .to_string();
    }
    let mut html = String::new();
    for card in cards {
        html.push_str(&machine_card(card, ui, lookback_hours));
    }
    html
}

fn machine_card(card: &MachineCard, ui: &UiConfig, lookback_hours: u32) -> String {
    let state = RecordState::classify(card.record.as_ref(), &card.groups);
    let mut html = format!("<section class=\"card {}\">\n", state_class(state));
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(&card.machine_name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} · {}</p>\n",
        escape_html(&card.organization_name),
        escape_html(&card.location_id)
    ));

    match (state, card.record.as_ref()) {
        (RecordState::Empty, _) | (_, None) => {
            html.push_str(&format!(
                "<p class=\"state-empty note\">No scans in the last {lookback_hours} hours.</p>\n"
            ));
        }
        (RecordState::NoItems, Some(record)) => {
            html.push_str(&scan_meta(record, ui));
            html.push_str(
                "<p class=\"no-items\">Receipt scanned, but no line items could be read.</p>\n",
            );
        }
        (RecordState::Items, Some(record)) => {
            html.push_str(&scan_meta(record, ui));
            html.push_str(&items_table(&card.groups));
            if let Some(metrics) = record.metrics() {
                html.push_str(&totals_line(metrics.subtotal, metrics.tax, metrics.total));
            }
        }
    }

    html.push_str("</section>\n");
    html
}

fn scan_meta(record: &ScanRecord, ui: &UiConfig) -> String {
    format!(
        "<p class=\"meta\">Scanned {} · {}</p>\n",
        format_time(record.time_requested, ui),
        escape_html(record.store_name())
    )
}

fn items_table(groups: &[GroupedItem]) -> String {
    let mut html = String::from(
        "<table class=\"items\">\n<tr><th>Item</th><th class=\"num\">Qty</th>\
         <th class=\"num\">Total</th></tr>\n",
    );
    for group in groups {
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            escape_html(&group.description),
            group.count,
            money(group.total_price)
        ));
    }
    html.push_str("</table>\n");
    html
}

fn totals_line(subtotal: Option<f64>, tax: Option<f64>, total: Option<f64>) -> String {
    format!(
        "<p class=\"totals\">Subtotal {} · Tax {} · <span class=\"grand\">Total {}</span></p>\n",
        money(subtotal.unwrap_or(0.0)),
        money(tax.unwrap_or(0.0)),
        money(total.unwrap_or(0.0))
    )
}

// ---------------------------------------------------------------------------
// Inventory log view
// ---------------------------------------------------------------------------

/// Render the fleet-wide inventory log table.
pub fn log_fragment(records: &[LogRecord], ui: &UiConfig) -> String {
    if records.is_empty() {
        return "<p class=\"state-empty note\">No scans recorded anywhere in the fleet.</p>"
            .to_string();
    }
    let mut html = String::from(
        "<table class=\"log\">\n<tr><th>Time</th><th>Machine</th><th>Store</th>\
         <th>Items</th></tr>\n",
    );
    for record in records {
        let state = if record.groups.is_empty() {
            RecordState::NoItems
        } else {
            RecordState::Items
        };
        html.push_str(&format!(
            "<tr class=\"row {}\"><td>{}</td><td>{}</td><td>{}</td><td class=\"items\">{}</td></tr>\n",
            state_class(state),
            format_time(record.time, ui),
            escape_html(&record.machine_name),
            escape_html(&record.store_name),
            items_cell(&record.groups)
        ));
    }
    html.push_str("</table>\n");
    html
}

fn items_cell(groups: &[GroupedItem]) -> String {
    if groups.is_empty() {
        return "no items read".to_string();
    }
    groups
        .iter()
        .map(|g| {
            format!(
                "{} ×{} ({})",
                escape_html(&g.description),
                g.count,
                money(g.total_price)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Status fragments
// ---------------------------------------------------------------------------

/// Shown on every view when startup could not produce a working client.
pub fn fatal_fragment(error: &str) -> String {
    format!(
        "<div class=\"fatal\">Initialization failed: {}</div>",
        escape_html(error)
    )
}

/// Shown when a single view fetch failed; the process keeps serving.
pub fn error_fragment(error: &str) -> String {
    format!(
        "<div class=\"view-error\">Fleet query failed: {}</div>",
        escape_html(error)
    )
}

/// Shown when a newer fetch started before this one finished.
pub fn superseded_fragment(view: ViewKind) -> String {
    format!(
        "<div class=\"superseded\">The {view} view was refreshed while this \
         request was in flight; its result was discarded.</div>"
    )
}

/// CSS class for a record state. The stylesheet gives each of the three its
/// own treatment.
pub fn state_class(state: RecordState) -> &'static str {
    match state {
        RecordState::Empty => "state-empty",
        RecordState::NoItems => "state-no-items",
        RecordState::Items => "state-items",
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Escape text for embedding in HTML element or attribute context.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_time(time: DateTime<Utc>, ui: &UiConfig) -> String {
    escape_html(&time.format(&ui.timestamp_format).to_string())
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
