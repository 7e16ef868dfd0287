//! String formatting utilities for UI rendering.

use chrono::{DateTime, Utc};

/// Abbreviate a note id to its first 8 characters.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Format a transport timestamp for display.
pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>, pretty: bool) -> String {
    match timestamp {
        Some(ts) if pretty => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        Some(ts) => ts.to_rfc3339(),
        None => "-".to_string(),
    }
}
