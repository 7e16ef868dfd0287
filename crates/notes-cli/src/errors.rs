//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes so scripts can tell a missing note
//! from a wrong password.

use std::fmt;

use notes_core::NoteError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Note not found
    NotFound { message: String, hint: String },

    /// Wrong password or no password available
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, .. } => write!(f, "{}", message),
            CliError::AuthFailed { message, .. } => write!(f, "{}", message),
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            CliError::NotFound { hint, .. } => Some(hint.as_str()),
            CliError::AuthFailed { hint, .. } => hint.as_deref(),
            CliError::InvalidInput(_) => None,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Map core errors that have a dedicated exit code; everything else stays a
/// general failure.
pub fn classify(err: NoteError) -> anyhow::Error {
    match err {
        NoteError::Decrypt(e) => CliError::auth_failed_with_hint(
            format!("Could not decrypt note: {}", e),
            "Check the password token shared with the note.",
        )
        .into(),
        NoteError::PasswordRequired(id) => CliError::auth_failed_with_hint(
            format!("Note {} is encrypted", id),
            "Pass --password or set NOTES_PASSWORD.",
        )
        .into(),
        NoteError::InvalidInput(message) => CliError::invalid_input(message).into(),
        other => anyhow::Error::new(other),
    }
}
