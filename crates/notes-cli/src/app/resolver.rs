//! Path and topic resolution.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{
    default_config_path, default_store_path, read_config, NotesConfig, DEFAULT_TOPIC,
};
use crate::constants::CONFIG_ENV;

/// Effective settings after applying precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub topic: String,
    pub authenticate: bool,
    /// Config file that was read, if any
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings for `cli`.
    ///
    /// Flags and their env vars (clap merges `--store`/`NOTES_STORE`) win over
    /// the config file, which wins over XDG defaults. A missing config file is
    /// not an error; an unreadable one is.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = resolve_config_path()?;
        let (config, loaded_from) = if config_path.exists() {
            (read_config(&config_path)?, Some(config_path))
        } else {
            (NotesConfig::default(), None)
        };

        let mut settings = Self::merge(
            cli.store.as_deref(),
            cli.topic.as_deref(),
            &config,
            default_store_path,
        )?;
        settings.config_path = loaded_from;
        Ok(settings)
    }

    fn merge(
        store_flag: Option<&str>,
        topic_flag: Option<&str>,
        config: &NotesConfig,
        default_store: impl FnOnce() -> anyhow::Result<PathBuf>,
    ) -> anyhow::Result<Self> {
        let store_path = match store_flag.or(config.store.path.as_deref()) {
            Some(path) => PathBuf::from(path),
            None => default_store()?,
        };
        let topic = topic_flag
            .or(config.topic.name.as_deref())
            .unwrap_or(DEFAULT_TOPIC)
            .to_string();

        Ok(Self {
            store_path,
            topic,
            authenticate: config.security.authenticate,
            config_path: None,
        })
    }
}

/// Resolve the config file path, checking NOTES_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SecuritySection, StoreSection, TopicSection};

    fn fallback() -> anyhow::Result<PathBuf> {
        Ok(PathBuf::from("/xdg/notes/notes.db"))
    }

    fn config(store: Option<&str>, topic: Option<&str>) -> NotesConfig {
        NotesConfig {
            store: StoreSection {
                path: store.map(str::to_string),
            },
            topic: TopicSection {
                name: topic.map(str::to_string),
            },
            security: SecuritySection { authenticate: true },
        }
    }

    #[test]
    fn test_flags_win() {
        let settings = Settings::merge(
            Some("/flag.db"),
            Some("/flag/topic"),
            &config(Some("/config.db"), Some("/config/topic")),
            fallback,
        )
        .unwrap();
        assert_eq!(settings.store_path, PathBuf::from("/flag.db"));
        assert_eq!(settings.topic, "/flag/topic");
        assert!(settings.authenticate);
    }

    #[test]
    fn test_config_beats_defaults() {
        let settings = Settings::merge(
            None,
            None,
            &config(Some("/config.db"), Some("/config/topic")),
            fallback,
        )
        .unwrap();
        assert_eq!(settings.store_path, PathBuf::from("/config.db"));
        assert_eq!(settings.topic, "/config/topic");
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::merge(None, None, &NotesConfig::default(), fallback).unwrap();
        assert_eq!(settings.store_path, PathBuf::from("/xdg/notes/notes.db"));
        assert_eq!(settings.topic, DEFAULT_TOPIC);
        assert!(!settings.authenticate);
    }
}
