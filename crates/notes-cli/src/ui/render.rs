//! Rendering primitives for CLI output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use owo_colors::OwoColorize;

use notes_core::NoteSummary;

use super::context::UiContext;
use super::format::format_timestamp;

/// Badge types for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Err,
}

impl Badge {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Ok => "[OK]",
            Self::Warn => "[WARN]",
            Self::Err => "[ERR]",
        }
    }
}

/// Render a badge with optional message.
pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let text = kind.text();
    let rendered = if ctx.color {
        match kind {
            Badge::Ok => text.green().to_string(),
            Badge::Warn => text.yellow().to_string(),
            Badge::Err => text.red().to_string(),
        }
    } else {
        text.to_string()
    };

    if message.is_empty() {
        rendered
    } else {
        format!("{} {}", rendered, message)
    }
}

/// Render a key-value pair.
///
/// Pretty mode: "Key: value" with dim key
/// Plain mode: "key=value"
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        let label = format!("{}:", key);
        if ctx.color {
            format!("{} {}", label.dimmed(), value)
        } else {
            format!("{} {}", label, value)
        }
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

/// Render a hint line.
pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.mode.is_pretty() {
        if ctx.color {
            format!("{} {}", "Hint:".dimmed(), text)
        } else {
            format!("Hint: {}", text)
        }
    } else {
        format!("hint={}", text)
    }
}

/// Render a receipt (summary block after an action).
///
/// Pretty mode: Badge + indented key-value pairs
/// Plain mode: status=ok + key=value lines
pub fn receipt(ctx: &UiContext, title: &str, items: &[(&str, &str)]) -> String {
    let mut lines = Vec::new();

    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Ok, title));
        for (key, value) in items {
            lines.push(format!("  {}", kv(ctx, key, value)));
        }
    } else {
        lines.push("status=ok".to_string());
        for (key, value) in items {
            lines.push(kv(ctx, key, value));
        }
    }

    lines.join("\n")
}

/// Render note summaries.
///
/// Pretty mode: bordered table with a header
/// Plain mode: one `id encrypted timestamp` line per note
pub fn notes_table(ctx: &UiContext, notes: &[NoteSummary]) -> String {
    let pretty = ctx.mode.is_pretty();
    let rows: Vec<Vec<String>> = notes
        .iter()
        .map(|note| {
            vec![
                note.id.clone(),
                if note.encrypted { "yes" } else { "no" }.to_string(),
                format_timestamp(note.timestamp.as_ref(), pretty),
            ]
        })
        .collect();

    if !pretty {
        return rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Encrypted", "Published"]);
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Format an error message with optional hint.
///
/// Pretty mode: "[ERR] message" with optional "Hint: ..." on next line
/// Plain mode: "error=message" with optional "hint=suggestion"
pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let mut lines = Vec::new();

    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Err, message));
        if let Some(h) = error_hint {
            lines.push(hint(ctx, h));
        }
    } else {
        lines.push(format!("error={}", message));
        if let Some(h) = error_hint {
            lines.push(format!("hint={}", h));
        }
    }

    lines.join("\n")
}

/// Print an error message to stderr with optional hint.
pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::context::OutputMode;

    fn plain_ctx() -> UiContext {
        UiContext {
            color: false,
            mode: OutputMode::Plain,
        }
    }

    fn pretty_ctx() -> UiContext {
        UiContext {
            color: false,
            mode: OutputMode::Pretty,
        }
    }

    fn summary(id: &str, encrypted: bool) -> NoteSummary {
        NoteSummary {
            id: id.to_string(),
            encrypted,
            timestamp: None,
        }
    }

    #[test]
    fn test_receipt_plain() {
        let out = receipt(&plain_ctx(), "Published", &[("ID", "abc"), ("Password", "xyz")]);
        assert_eq!(out, "status=ok\nid=abc\npassword=xyz");
    }

    #[test]
    fn test_receipt_pretty() {
        let out = receipt(&pretty_ctx(), "Published", &[("ID", "abc")]);
        assert!(out.starts_with("[OK] Published"));
        assert!(out.contains("  ID: abc"));
    }

    #[test]
    fn test_notes_table_plain() {
        let out = notes_table(&plain_ctx(), &[summary("a1", false), summary("b2", true)]);
        assert_eq!(out, "a1 no -\nb2 yes -");
    }

    #[test]
    fn test_notes_table_pretty_has_header() {
        let out = notes_table(&pretty_ctx(), &[summary("a1", true)]);
        assert!(out.contains("Encrypted"));
        assert!(out.contains("a1"));
    }

    #[test]
    fn test_error_message_modes() {
        assert_eq!(
            error_message(&plain_ctx(), "boom", Some("retry")),
            "error=boom\nhint=retry"
        );
        assert_eq!(error_message(&pretty_ctx(), "boom", None), "[ERR] boom");
    }
}
