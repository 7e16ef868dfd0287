//! Notes CLI - publish short notes to a shared topic and read them back
//!
//! This is the command-line interface for shared notes. It wires the core
//! directory to a SQLite topic log and handles input, output, and exit codes.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{create, list, misc, read, watch};
use crate::constants::LOG_ENV;
use crate::errors::CliError;
use crate::ui::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli).await {
        let ui_ctx = ctx.ui_context(false);

        if let Some(cli_err) = e.downcast_ref::<CliError>() {
            print_error(&ui_ctx, &cli_err.to_string(), cli_err.hint());
            std::process::exit(cli_err.exit_code());
        }

        let error_msg = format!("{:#}", e);
        let hint = extract_error_hint(&error_msg);
        print_error(&ui_ctx, &error_msg, hint.as_deref());
        std::process::exit(1);
    }
}

/// Install the stderr log subscriber.
///
/// `NOTES_LOG` holds an `EnvFilter` directive (default `warn`); `-v` and
/// `-vv` override it with `debug` and `trace`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Provide contextual hints for common error patterns.
fn extract_error_hint(error: &str) -> Option<String> {
    let error_lower = error.to_lowercase();

    if error_lower.contains("failed to open note store") {
        return Some("Check --store / NOTES_STORE points at a writable path.".to_string());
    }

    if error_lower.contains("backfill failed") || error_lower.contains("subscribe failed") {
        return Some("The topic log could not be loaded; retry the command.".to_string());
    }

    if error_lower.contains("failed to parse config") {
        return Some("Fix the TOML or point NOTES_CONFIG at another file.".to_string());
    }

    None
}

async fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Create(args) => create::handle_create(ctx, args).await,
        Commands::Read(args) => read::handle_read(ctx, args).await,
        Commands::List(args) => list::handle_list(ctx, args).await,
        Commands::Watch(args) => watch::handle_watch(ctx, args).await,
        Commands::Completions(args) => misc::handle_completions(args.shell),
    }
}
