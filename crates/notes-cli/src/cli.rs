use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use notes_core::VERSION;

/// Notes - publish short notes to a shared topic, optionally password-encrypted
#[derive(Parser)]
#[command(name = "notes")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the topic log database
    #[arg(short, long, global = true, env = "NOTES_STORE")]
    pub store: Option<String>,

    /// Topic notes are published on
    #[arg(short, long, global = true, env = "NOTES_TOPIC")]
    pub topic: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Arguments for the `create` command
#[derive(Args)]
pub struct CreateArgs {
    /// Note body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Encrypt with a generated password token
    #[arg(short, long, conflicts_with = "password")]
    pub encrypt: bool,

    /// Encrypt with a password you choose (prompted, or NOTES_PASSWORD)
    #[arg(short, long)]
    pub password: bool,

    /// Attach an integrity tag so wrong passwords fail explicitly
    #[arg(long)]
    pub authenticate: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `read` command
#[derive(Args)]
pub struct ReadArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Password for an encrypted note
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Only show encrypted notes
    #[arg(long, conflicts_with = "plain_only")]
    pub encrypted_only: bool,

    /// Only show plaintext notes
    #[arg(long)]
    pub plain_only: bool,

    /// Limit number of results (most recent)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `watch` command
#[derive(Args)]
pub struct WatchArgs {
    /// Stop after this many new notes
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output each note as a JSON line
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish a new note
    Create(CreateArgs),

    /// Read a note by ID
    Read(ReadArgs),

    /// List notes on the topic
    List(ListArgs),

    /// Print notes as they arrive
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
