//! Date helper functions

use crate::content::parse_iso_date;

/// Shown when an item has no usable date
pub const UNDATED_LABEL: &str = "Recently";

/// Format an ISO date string for display
///
/// # Examples
/// ```ignore
/// display_date("2024-01-15", "%B %d, %Y") // -> "January 15, 2024"
/// display_date("", "%B %d, %Y")           // -> "Recently"
/// ```
pub fn display_date(iso: &str, format: &str) -> String {
    match parse_iso_date(iso) {
        Some(date) => date.format(format).to_string(),
        None => UNDATED_LABEL.to_string(),
    }
}

/// Convert a Moment.js-style format to a chrono format
pub fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}
