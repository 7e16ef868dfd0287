//! # Notes Core
//!
//! Core library for shared notes: short plaintext or password-encrypted text
//! notes published on a pub/sub topic and looked up later by identifier.
//!
//! This crate provides the wire format, the cryptography, and the directory
//! that reconciles a topic's history with its live feed, independent of the
//! CLI interface.
//!
//! ## Architecture
//!
//! - **codec**: Note wire record, PBKDF2 + AES-CTR content encryption
//! - **directory**: Note creation and lookup over a merged backfill + live view
//! - **transport**: Pub/sub transport trait plus in-memory and SQLite topic logs

pub mod codec;
pub mod directory;
pub mod error;
pub mod transport;

pub use codec::{Codec, EncryptionParams, Note};
pub use directory::{
    DirectoryConfig, DirectoryState, NoteDirectory, NoteResult, NoteSummary, PasswordPrompt,
};
pub use error::{DecryptError, NoteError, ParseError, Result, TransportError};
pub use transport::{MemoryTransport, SqliteTransport, Topic, Transport};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
