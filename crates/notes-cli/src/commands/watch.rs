//! Watch command handler: print notes as they arrive on the topic.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::WatchArgs;
use crate::errors::classify;
use crate::ui::format_timestamp;

/// How often the merged log is rescanned for new notes.
const WATCH_INTERVAL: Duration = Duration::from_millis(250);

pub async fn handle_watch(ctx: &AppContext<'_>, args: &WatchArgs) -> anyhow::Result<()> {
    if args.limit == Some(0) {
        return Ok(());
    }

    let ui = ctx.ui_context(args.json);
    let directory = ctx.open_directory(None, false)?;
    let mut seen: HashSet<String> = directory
        .list_notes()
        .await
        .map_err(classify)?
        .into_iter()
        .map(|note| note.id)
        .collect();
    debug!(existing = seen.len(), "watching for new notes");

    if !ctx.quiet() && !ui.mode.is_json() {
        eprintln!("Watching {} (Ctrl-C to stop)", directory.topic());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(WATCH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut printed = 0usize;

    'watch: loop {
        tokio::select! {
            _ = &mut ctrl_c => break 'watch,
            _ = ticker.tick() => {
                for note in directory.list_notes().await.map_err(classify)? {
                    if !seen.insert(note.id.clone()) {
                        continue;
                    }
                    if ui.mode.is_json() {
                        println!("{}", serde_json::to_string(&note)?);
                    } else {
                        let lock = if note.encrypted { "encrypted" } else { "plain" };
                        let when = format_timestamp(note.timestamp.as_ref(), ui.mode.is_pretty());
                        println!("{} {} {}", note.id, lock, when);
                    }
                    printed += 1;
                    if args.limit.is_some_and(|limit| printed >= limit) {
                        break 'watch;
                    }
                }
            }
        }
    }

    directory.close().await;
    Ok(())
}
