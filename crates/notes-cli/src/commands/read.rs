//! Read note command handler.

use std::io::IsTerminal;
use std::sync::Arc;

use notes_core::PasswordPrompt;
use zeroize::Zeroizing;

use crate::app::{read_password_from_env, AppContext, TerminalPrompt};
use crate::cli::ReadArgs;
use crate::errors::{classify, CliError};
use crate::ui::Spinner;

pub async fn handle_read(ctx: &AppContext<'_>, args: &ReadArgs) -> anyhow::Result<()> {
    let interactive = std::io::stdin().is_terminal() && !args.no_input;
    let password = args
        .password
        .clone()
        .map(Zeroizing::new)
        .or_else(read_password_from_env);
    let prompt: Option<Arc<dyn PasswordPrompt>> = if password.is_none() && interactive {
        Some(Arc::new(TerminalPrompt))
    } else {
        None
    };

    let ui = ctx.ui_context(args.json);
    let directory = ctx.open_directory(prompt, false)?;
    {
        let spinner = Spinner::start(&ui, "Loading topic history");
        directory.ensure_initialized().await.map_err(classify)?;
        spinner.finish();
    }

    let content = directory
        .read_note(&args.id, password.as_ref().map(|p| p.as_str()))
        .await
        .map_err(classify)?;
    directory.close().await;

    let Some(content) = content else {
        return Err(CliError::not_found(
            format!("Note {} not found on {}", args.id, directory.topic()),
            "Run `notes list` to see note IDs on this topic.",
        )
        .into());
    };

    if ui.mode.is_json() {
        let output = serde_json::json!({
            "id": args.id,
            "content": content,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", content);
    }
    Ok(())
}
