//! List notes command handler.

use notes_core::NoteSummary;

use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::errors::classify;
use crate::ui::{hint, notes_table, Spinner};

pub async fn handle_list(ctx: &AppContext<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_context(args.json);
    let directory = ctx.open_directory(None, false)?;
    let notes = {
        let spinner = Spinner::start(&ui, "Loading topic history");
        let notes = directory.list_notes().await.map_err(classify)?;
        spinner.finish();
        notes
    };
    directory.close().await;

    let notes = select(notes, args);

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        if !ctx.quiet() && ui.mode.is_pretty() {
            println!("No notes on {}", directory.topic());
            println!("{}", hint(&ui, "notes create --body \"...\""));
        }
        return Ok(());
    }

    println!("{}", notes_table(&ui, &notes));
    Ok(())
}

/// Apply the encryption filter, then keep the most recent `limit`.
fn select(notes: Vec<NoteSummary>, args: &ListArgs) -> Vec<NoteSummary> {
    let mut notes: Vec<NoteSummary> = notes
        .into_iter()
        .filter(|note| !(args.encrypted_only && !note.encrypted))
        .filter(|note| !(args.plain_only && note.encrypted))
        .collect();
    if let Some(limit) = args.limit {
        let skip = notes.len().saturating_sub(limit);
        notes.drain(..skip);
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, encrypted: bool) -> NoteSummary {
        NoteSummary {
            id: id.to_string(),
            encrypted,
            timestamp: None,
        }
    }

    fn args() -> ListArgs {
        ListArgs {
            encrypted_only: false,
            plain_only: false,
            limit: None,
            json: false,
        }
    }

    fn ids(notes: &[NoteSummary]) -> Vec<&str> {
        notes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_select_filters() {
        let notes = vec![summary("a", false), summary("b", true), summary("c", false)];

        let mut encrypted = args();
        encrypted.encrypted_only = true;
        assert_eq!(ids(&select(notes.clone(), &encrypted)), vec!["b"]);

        let mut plain = args();
        plain.plain_only = true;
        assert_eq!(ids(&select(notes, &plain)), vec!["a", "c"]);
    }

    #[test]
    fn test_select_limit_keeps_latest() {
        let notes = vec![summary("a", false), summary("b", false), summary("c", false)];
        let mut limited = args();
        limited.limit = Some(2);
        assert_eq!(ids(&select(notes.clone(), &limited)), vec!["b", "c"]);

        limited.limit = Some(10);
        assert_eq!(select(notes, &limited).len(), 3);
    }
}
