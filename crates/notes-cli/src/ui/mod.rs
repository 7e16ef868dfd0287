//! UI primitives for the Notes CLI.
//!
//! - **Context**: TTY and color detection, output mode resolution
//! - **Render**: Badges, key-value receipts, note tables, errors
//! - **Progress**: Spinner shown while the topic history loads
//! - **Format**: Short ids and timestamps

mod context;
pub mod format;
pub mod progress;
pub mod render;

pub use context::UiContext;
pub use format::{format_timestamp, short_id};
pub use progress::Spinner;
pub use render::{hint, notes_table, print_error, receipt, Badge};
