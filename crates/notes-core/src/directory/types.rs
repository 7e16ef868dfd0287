//! Public types for the note directory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default upper bound on retained transport messages.
pub const DEFAULT_MAX_MESSAGES: usize = 10_000;

/// Outcome of publishing a note.
#[derive(Clone, Serialize)]
pub struct NoteResult {
    /// Identifier readers use to look the note up
    pub id: String,

    /// Generated password token; share it out-of-band with readers
    pub password: Option<String>,
}

impl fmt::Debug for NoteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteResult")
            .field("id", &self.id)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A note visible in the directory, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSummary {
    pub id: String,
    pub encrypted: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Lifecycle of a directory instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryState {
    /// No backfill has completed yet
    Uninitialized,
    /// Backfill or subscription setup in flight
    Initializing,
    /// History loaded and live feed active
    Subscribed,
    /// Subscription cancelled; the directory no longer serves requests
    Closed,
}

impl fmt::Display for DirectoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DirectoryState::Uninitialized => "uninitialized",
            DirectoryState::Initializing => "initializing",
            DirectoryState::Subscribed => "subscribed",
            DirectoryState::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Supplies a password when an encrypted note is read without one.
pub trait PasswordPrompt: Send + Sync {
    /// Return the password for `note_id`, or `None` to give up.
    fn password_for(&self, note_id: &str) -> Option<String>;
}

impl<F> PasswordPrompt for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn password_for(&self, note_id: &str) -> Option<String> {
        self(note_id)
    }
}

/// Tunables for a directory instance.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Maximum retained messages; oldest are evicted first. `None` is unbounded.
    pub max_messages: Option<usize>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            max_messages: Some(DEFAULT_MAX_MESSAGES),
        }
    }
}

impl DirectoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = Some(max_messages.max(1));
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_messages = None;
        self
    }
}
