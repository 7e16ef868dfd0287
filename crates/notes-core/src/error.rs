//! Error types for notes core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;

/// Result type alias for note operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Core error type for note directory operations.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Publishing a note to the topic failed
    #[error("Publish failed: {0}")]
    Publish(#[source] TransportError),

    /// Historical backfill failed; initialization can be retried
    #[error("Backfill failed: {0}")]
    Backfill(#[source] TransportError),

    /// Opening the live subscription failed; initialization can be retried
    #[error("Subscribe failed: {0}")]
    Subscribe(#[source] TransportError),

    /// The note was found but could not be decrypted
    #[error("Decryption failed: {0}")]
    Decrypt(#[from] DecryptError),

    /// The note is encrypted and no password was supplied or prompted for
    #[error("Password required for note {0}")]
    PasswordRequired(String),

    /// The directory has been closed
    #[error("Note directory is closed")]
    Closed,

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// In-process state error (poisoned lock)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encryption error
    #[error("Encryption error: {0}")]
    Crypto(String),
}

/// Failure to recover plaintext from an encrypted note.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptError {
    /// The note carries no encryption parameters
    #[error("note has no encryption parameters")]
    MissingParams,

    /// The password does not recover valid content
    #[error("invalid password")]
    InvalidPassword,

    /// The ciphertext or its parameters could not be processed
    #[error("cipher failure: {0}")]
    CipherFailure(String),
}

/// Failure to parse a transport payload as a note.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not valid UTF-8 JSON, or not a well-formed note record
    #[error("malformed note payload: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

/// Errors reported by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport is not reachable or has shut down
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// The transport's backing store failed
    #[error("transport storage error: {0}")]
    Storage(String),

    /// The transport refused the request
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<rusqlite::Error> for TransportError {
    fn from(err: rusqlite::Error) -> Self {
        TransportError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Storage(err.to_string())
    }
}
