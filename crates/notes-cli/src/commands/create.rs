//! Create note command handler.

use std::io::IsTerminal;

use crate::app::{new_note_password, read_note_body, AppContext};
use crate::cli::CreateArgs;
use crate::errors::classify;
use crate::ui::render::badge;
use crate::ui::{hint, receipt, Badge};

pub async fn handle_create(ctx: &AppContext<'_>, args: &CreateArgs) -> anyhow::Result<()> {
    let interactive = std::io::stdin().is_terminal() && !args.no_input;
    let body = read_note_body(args.no_input, args.body.clone())?;
    let password = if args.password {
        Some(new_note_password(interactive)?)
    } else {
        None
    };

    let directory = ctx.open_directory(None, args.authenticate)?;
    let result = match &password {
        Some(password) => directory.create_note_with_password(&body, password).await,
        None => directory.create_note(&body, args.encrypt).await,
    }
    .map_err(classify)?;
    directory.close().await;

    let encrypted = args.encrypt || password.is_some();
    let ui = ctx.ui_context(args.json);
    if ui.mode.is_json() {
        let output = serde_json::json!({
            "id": result.id,
            "password": result.password,
            "encrypted": encrypted,
            "topic": directory.topic().as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if ctx.quiet() {
        println!("{}", result.id);
        if let Some(token) = &result.password {
            println!("{}", token);
        }
        return Ok(());
    }

    let mut items = vec![("ID", result.id.as_str())];
    if let Some(token) = &result.password {
        items.push(("Password", token.as_str()));
    }
    println!("{}", receipt(&ui, "Published note", &items));
    if result.password.is_some() && ui.mode.is_pretty() {
        println!(
            "{}",
            badge(
                &ui,
                Badge::Warn,
                "The password is not stored anywhere; share it with readers now."
            )
        );
    }
    if ui.mode.is_pretty() {
        let read_cmd = if encrypted {
            format!("notes read {} --password <PASSWORD>", result.id)
        } else {
            format!("notes read {}", result.id)
        };
        println!("{}", hint(&ui, &read_cmd));
    }
    Ok(())
}
