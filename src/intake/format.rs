//! Text helpers shared by the intake and projection stages

use chrono::{DateTime, NaiveDateTime, Utc};

/// Display format of feed dates, e.g. `March 5, 2024`
const FEED_DATE_FORMAT: &str = "%B %-d, %Y";

/// Escape text for embedding in HTML, quotes included
///
/// Maps `&`, `<`, `>`, `"` and `'` to `&amp;`, `&lt;`, `&gt;`, `&quot;` and
/// `&#039;`.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn feed_date(at: &DateTime<Utc>) -> String {
    at.format(FEED_DATE_FORMAT).to_string()
}

/// Same as [`feed_date`] for timestamps stored without a zone
pub fn feed_date_naive(at: &NaiveDateTime) -> String {
    at.format(FEED_DATE_FORMAT).to_string()
}
