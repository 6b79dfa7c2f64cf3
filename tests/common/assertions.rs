//! Domain-specific assertion macros for rmr harnesses.
//!
//! These add context-rich failure messages: a failed group assertion lists
//! the descriptions that were present, and a failed HTML assertion prints
//! the whole response body so the broken fragment is visible in the test
//! output.

use rmr_core::GroupedItem;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Group assertions
// ---------------------------------------------------------------------------

/// Assert that a grouped-item slice contains a group with the expected
/// description, count, and total price.
///
/// ```rust
/// assert_group!(groups, "MILK 2%", 2, 7.98);
/// ```
#[macro_export]
macro_rules! assert_group {
    ($groups:expr, $desc:expr, $count:expr, $total:expr) => {{
        let groups: &[rmr_core::GroupedItem] = &$groups;
        let desc: &str = $desc;
        match groups.iter().find(|g| g.description == desc) {
            Some(group) => {
                if group.count != $count {
                    panic!(
                        "assert_group! failed: {:?} has count {}, expected {}",
                        desc, group.count, $count
                    );
                }
                let total: f64 = $total;
                if (group.total_price - total).abs() > 1e-9 {
                    panic!(
                        "assert_group! failed: {:?} has total {}, expected {}",
                        desc, group.total_price, total
                    );
                }
            }
            None => panic!(
                "assert_group! failed: no group {:?}.\n  Available: {:?}",
                desc,
                groups.iter().map(|g| &g.description).collect::<Vec<_>>()
            ),
        }
    }};
}

/// Assert the exact first-appearance order of group descriptions.
///
/// ```rust
/// assert_group_order!(groups, ["MILK 2%", "BANANA", "BREAD WHT"]);
/// ```
#[macro_export]
macro_rules! assert_group_order {
    ($groups:expr, [$($desc:expr),* $(,)?]) => {{
        let groups: &[rmr_core::GroupedItem] = &$groups;
        let actual: Vec<&str> = groups.iter().map(|g| g.description.as_str()).collect();
        let expected: Vec<&str> = vec![$($desc),*];
        if actual != expected {
            panic!(
                "assert_group_order! failed:\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// HTML assertions
// ---------------------------------------------------------------------------

/// Assert that a response body contains a fragment, printing the whole body
/// on failure.
#[macro_export]
macro_rules! assert_html_contains {
    ($html:expr, $needle:expr) => {{
        let html: &str = &$html;
        let needle: &str = $needle;
        if !html.contains(needle) {
            panic!(
                "assert_html_contains! failed: {:?} not found in response.\n---\n{}\n---",
                needle, html
            );
        }
    }};
}

/// Assert that a response body does not contain a fragment.
#[macro_export]
macro_rules! assert_html_lacks {
    ($html:expr, $needle:expr) => {{
        let html: &str = &$html;
        let needle: &str = $needle;
        if html.contains(needle) {
            panic!(
                "assert_html_lacks! failed: {:?} unexpectedly present in response.\n---\n{}\n---",
                needle, html
            );
        }
    }};
}

/// Assert that fragments appear in the given order within a response body.
///
/// ```rust
/// assert_html_order!(html, ["Aisle Rover 1", "Aisle Rover 2"]);
/// ```
#[macro_export]
macro_rules! assert_html_order {
    ($html:expr, [$($needle:expr),* $(,)?]) => {{
        let html: &str = &$html;
        let mut last: Option<(usize, &str)> = None;
        $(
            let needle: &str = $needle;
            let pos = match html.find(needle) {
                Some(pos) => pos,
                None => panic!(
                    "assert_html_order! failed: {:?} not found in response.\n---\n{}\n---",
                    needle, html
                ),
            };
            if let Some((last_pos, last_needle)) = last {
                if pos < last_pos {
                    panic!(
                        "assert_html_order! failed: {:?} appears before {:?}",
                        needle, last_needle
                    );
                }
            }
            last = Some((pos, needle));
        )*
        let _ = last;
    }};
}

// ---------------------------------------------------------------------------
// Normalizer output invariants
// ---------------------------------------------------------------------------

/// Assert the structural invariants every normalizer output must satisfy:
/// unique descriptions, at least two characters each, never all digits,
/// whitespace-collapsed, and a count of at least one.
pub fn assert_grouped_invariants(groups: &[GroupedItem]) {
    let mut seen = HashSet::new();
    for group in groups {
        assert!(
            seen.insert(group.description.as_str()),
            "duplicate group description: {:?}",
            group.description
        );
        assert!(
            group.description.chars().count() >= 2,
            "group description shorter than two characters: {:?}",
            group.description
        );
        assert!(
            !group.description.chars().all(|c| c.is_ascii_digit()),
            "group description is all digits: {:?}",
            group.description
        );
        let collapsed = group
            .description
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        assert!(
            group.description == collapsed,
            "group description is not whitespace-collapsed: {:?}",
            group.description
        );
        assert!(
            group.count >= 1,
            "group {:?} has a zero count",
            group.description
        );
    }
}
