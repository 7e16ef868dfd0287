use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Topic used when neither flag, env, nor config names one.
pub const DEFAULT_TOPIC: &str = "/shared-notes/1/note/json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub topic: TopicSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TopicSection {
    pub name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SecuritySection {
    /// Attach an integrity tag to every encrypted note
    #[serde(default)]
    pub authenticate: bool,
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("notes.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<NotesConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("notes"));
        }
    }
    Ok(home_dir()?.join(".config").join("notes"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("notes"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("notes"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: NotesConfig = toml::from_str(
            r#"
            [store]
            path = "/var/notes.db"

            [topic]
            name = "/team/1/note/json"

            [security]
            authenticate = true
            "#,
        )
        .unwrap();
        assert_eq!(config.store.path.as_deref(), Some("/var/notes.db"));
        assert_eq!(config.topic.name.as_deref(), Some("/team/1/note/json"));
        assert!(config.security.authenticate);
    }

    #[test]
    fn test_sections_are_optional() {
        let config: NotesConfig = toml::from_str("[topic]\nname = \"/t\"\n").unwrap();
        assert!(config.store.path.is_none());
        assert!(!config.security.authenticate);

        let empty: NotesConfig = toml::from_str("").unwrap();
        assert!(empty.topic.name.is_none());
    }

    #[test]
    fn test_unreadable_config_mentions_path() {
        let err = read_config(Path::new("/nonexistent/notes/config.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/notes/config.toml"));
    }
}
