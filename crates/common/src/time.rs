//! Timestamp formatting helpers.

use chrono::{DateTime, Utc};

/// Format a suspension expiry for user-facing messages.
///
/// Produces the en-US style used in suspension errors, e.g.
/// `"Aug 25, 2026, 02:30 PM"`.
#[must_use]
pub fn format_suspension_expiry(until: DateTime<Utc>) -> String {
    until.format("%b %-d, %Y, %I:%M %p").to_string()
}
