//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;

/// Longest worksheet name Excel accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Format an amount with a fixed number of decimals and a thousands separator
pub fn format_amount(amount: Decimal, decimal_places: u32, thousands_sep: &str, decimal_sep: &str) -> String {
    let rounded = amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", decimal_places as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push_str(&thousands_sep.chars().rev().collect::<String>());
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let mut result: String = grouped.chars().rev().collect();

    if let Some(frac) = frac_part {
        result.push_str(decimal_sep);
        result.push_str(&frac);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        result.insert(0, '-');
    }
    result
}

/// Make a string usable as a worksheet name
///
/// Drops the characters Excel forbids (`[ ] : * ? / \`), truncates to 31
/// characters and then trims surrounding spaces and apostrophes.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let truncated = truncate_trimmed(&cleaned, MAX_SHEET_NAME_LEN);
    if truncated.is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}

/// Excel rejects names that start or end with an apostrophe, so trimming
/// happens after the cut.
fn truncate_trimmed(name: &str, max: usize) -> String {
    let truncated: String = name.chars().take(max).collect();
    truncated
        .trim_matches(|c: char| c.is_whitespace() || c == '\'')
        .to_string()
}

/// Hands out worksheet names that are unique within one workbook
///
/// Excel compares sheet names case-insensitively.
#[derive(Debug, Default)]
pub struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name, appending ` (n)` when it is already taken
    pub fn claim(&mut self, name: &str) -> String {
        let base = sanitize_sheet_name(name);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }
        let mut n = 2;
        loop {
            let suffix = format!(" ({})", n);
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            let candidate = truncate_trimmed(&base, keep) + &suffix;
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}
