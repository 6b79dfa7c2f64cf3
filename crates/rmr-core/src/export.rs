//! CSV export of the inventory log.
//!
//! Flattens assembled [`LogRecord`]s into one CSV row per grouped item, with
//! the record's time, machine, and store repeated on each row. Records whose
//! scan produced no parsable items still contribute a single row with the
//! item columns left empty, so gaps in the fleet's output stay visible in the
//! exported sheet. Timestamps are RFC 3339; the display formatting of the
//! HTML views does not apply here. An empty log exports an empty document
//! (the header row is written with the first data row).

use serde::Serialize;

use crate::types::LogRecord;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    time: String,
    machine: &'a str,
    store: &'a str,
    item: Option<&'a str>,
    count: Option<u32>,
    total_price: Option<f64>,
}

/// Render the inventory log as a CSV document.
pub fn log_to_csv(records: &[LogRecord]) -> anyhow::Result<String> {
    let mut out = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        for record in records {
            let time = record.time.to_rfc3339();
            if record.groups.is_empty() {
                writer.serialize(CsvRow {
                    time,
                    machine: &record.machine_name,
                    store: &record.store_name,
                    item: None,
                    count: None,
                    total_price: None,
                })?;
            } else {
                for group in &record.groups {
                    writer.serialize(CsvRow {
                        time: time.clone(),
                        machine: &record.machine_name,
                        store: &record.store_name,
                        item: Some(&group.description),
                        count: Some(group.count),
                        total_price: Some(group.total_price),
                    })?;
                }
            }
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(out)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
