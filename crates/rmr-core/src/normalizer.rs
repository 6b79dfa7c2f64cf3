//! Normalizer — turns noisy OCR receipt lines into grouped, display-ready items.
//!
//! The OCR pipeline on the machines reads descriptions straight off thermal
//! paper, so a line like `MILK 2%` frequently arrives as
//! `MILK 2% 123456789012 A`: the printed barcode digits and the register's
//! tax-code letter get glued onto the name. [`normalize`] strips that noise,
//! drops lines that carry no usable description at all, and aggregates
//! duplicate lines into one [`GroupedItem`] per cleaned description.
//!
//! # Cleaning passes
//!
//! Per description, two trailing-strip passes run together until the string
//! stops changing, then whitespace runs are collapsed:
//!
//! 1. strip a trailing barcode run: whitespace, 12+ digits, optionally
//!    followed by a detached uppercase tax code;
//! 2. strip a trailing single uppercase tax-code letter.
//!
//! If stripping consumes essentially the whole name (fewer than 2 characters
//! remain), a fallback re-derives the description from the original text by
//! deleting every 12+ digit run wherever it sits, which recovers names whose
//! barcode was not strictly trailing. Descriptions that still end up shorter
//! than 2 characters, or consist purely of digits, are dropped.
//!
//! Grouping preserves first-occurrence order; duplicate descriptions add to
//! the existing group's count and price total. The routine never fails:
//! malformed input is dropped, not reported.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::types::{GroupedItem, RawItem};

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

// Trailing barcode run, optionally carrying a detached uppercase tax code.
static RE_TRAILING_BARCODE: OnceLock<Regex> = OnceLock::new();
// Trailing single uppercase tax-code letter.
static RE_TRAILING_TAX_CODE: OnceLock<Regex> = OnceLock::new();
// Any 12+ digit run, used by the fallback irrespective of position.
static RE_DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

fn re_trailing_barcode() -> &'static Regex {
    RE_TRAILING_BARCODE
        .get_or_init(|| Regex::new(r"\s+\d{12,}\s*[A-Z]*\s*$").expect("trailing barcode regex"))
}

fn re_trailing_tax_code() -> &'static Regex {
    RE_TRAILING_TAX_CODE
        .get_or_init(|| Regex::new(r"\s+[A-Z]\s*$").expect("trailing tax code regex"))
}

fn re_digit_run() -> &'static Regex {
    RE_DIGIT_RUN.get_or_init(|| Regex::new(r"\d{12,}").expect("digit run regex"))
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Clean, filter, and group a slice of raw OCR receipt lines.
///
/// Returns one [`GroupedItem`] per distinct cleaned description, ordered by
/// first occurrence in the input. Lines whose description is absent, empty,
/// too short after cleaning, or purely numeric contribute nothing. A missing
/// price counts as zero. Never fails.
pub fn normalize(items: &[RawItem]) -> Vec<GroupedItem> {
    let mut groups: IndexMap<String, GroupedItem> = IndexMap::new();

    for item in items {
        let Some(desc) = item.desc.as_deref() else {
            continue;
        };
        if desc.trim().is_empty() {
            continue;
        }
        let Some(description) = clean_description(desc) else {
            continue;
        };

        let price = item.price.unwrap_or(0.0);
        match groups.get_mut(&description) {
            Some(group) => {
                group.count += 1;
                group.total_price += price;
            }
            None => {
                groups.insert(
                    description.clone(),
                    GroupedItem {
                        description,
                        count: 1,
                        total_price: price,
                    },
                );
            }
        }
    }

    groups.into_values().collect()
}

/// Clean a single description, returning `None` when nothing usable remains.
///
/// Exposed for the CSV export and the benchmarks; [`normalize`] is the
/// grouping entry point.
pub fn clean_description(desc: &str) -> Option<String> {
    let stripped = strip_trailing_noise(desc);
    let mut candidate = collapse_whitespace(&stripped);

    if candidate.chars().count() < 2 {
        // The trailing strip ate the whole name. Re-derive from the original
        // text, deleting barcode runs wherever they sit.
        candidate = collapse_whitespace(&re_digit_run().replace_all(desc, ""));
    }

    if candidate.chars().count() < 2 || candidate.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(candidate)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run both trailing-strip passes until the string stops changing.
///
/// Stacked noise ("NAME <barcode> <barcode>", "NAME <barcode> F") needs more
/// than one round. Every replacement only removes characters, so the loop
/// terminates.
fn strip_trailing_noise(desc: &str) -> String {
    let mut current = desc.to_string();
    loop {
        let next = {
            let after_barcode = re_trailing_barcode().replace(&current, "");
            re_trailing_tax_code()
                .replace(after_barcode.as_ref(), "")
                .into_owned()
        };
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
