//! Application context for the Notes CLI.
//!
//! Bundles CLI arguments with lazily resolved settings and builds the note
//! directory commands operate on.

use std::sync::Arc;

use anyhow::Context;
use once_cell::unsync::OnceCell;
use tracing::debug;

use notes_core::{Codec, NoteDirectory, PasswordPrompt, SqliteTransport, Topic};

use crate::cli::Cli;
use crate::errors::CliError;
use crate::ui::UiContext;

use super::resolver::Settings;

pub struct AppContext<'a> {
    cli: &'a Cli,
    settings: OnceCell<Settings>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            settings: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Effective settings, resolved on first use.
    pub fn settings(&self) -> anyhow::Result<&Settings> {
        self.settings.get_or_try_init(|| Settings::resolve(self.cli))
    }

    /// UI context for a command that may emit JSON.
    pub fn ui_context(&self, json: bool) -> UiContext {
        UiContext::from_env(json, self.cli.no_color)
    }

    /// Open the topic log and build a directory over it.
    ///
    /// `authenticate` forces integrity tags on new notes even when the config
    /// leaves them off.
    pub fn open_directory(
        &self,
        prompt: Option<Arc<dyn PasswordPrompt>>,
        authenticate: bool,
    ) -> anyhow::Result<NoteDirectory> {
        let settings = self.settings()?;
        let topic = Topic::new(settings.topic.as_str())
            .map_err(|e| CliError::invalid_input(format!("Invalid topic: {}", e)))?;
        let transport = SqliteTransport::open(&settings.store_path).with_context(|| {
            format!("Failed to open note store {}", settings.store_path.display())
        })?;
        debug!(
            store = %settings.store_path.display(),
            topic = %topic,
            config = ?settings.config_path,
            "opening directory"
        );

        let codec = Codec::new().authenticated(authenticate || settings.authenticate);
        let directory = NoteDirectory::new(Arc::new(transport), topic).with_codec(codec);
        Ok(match prompt {
            Some(prompt) => directory.with_password_prompt(prompt),
            None => directory,
        })
    }
}
