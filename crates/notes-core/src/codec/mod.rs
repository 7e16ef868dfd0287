//! Note codec.
//!
//! Turns a logical note (text plus optional password) into a [`Note`] record
//! and back, and a [`Note`] into transport payload bytes and back.
//!
//! ## Security Model
//!
//! - PBKDF2-HMAC-SHA256, 131072 iterations, 16-byte key, 32-byte random salt
//! - AES-CTR with a random 16-byte IV
//! - Authentication is opt-in ([`Codec::authenticated`]). Without it there is
//!   no integrity tag and a wrong password is only detected when the recovered
//!   bytes are not valid UTF-8.

pub mod crypto;
pub mod note;

pub use note::{
    new_note_id, parse_from_transport, serialize_for_transport, EncryptionParams, Note,
};

use crate::error::{DecryptError, NoteError, Result};
use crypto::{apply_keystream, compute_mac, derive_key, random_bytes, verify_mac};

/// AES-CTR IV length in bytes.
pub const IV_LENGTH: usize = 16;

/// PBKDF2 salt length in bytes.
pub const SALT_LENGTH: usize = 32;

/// PBKDF2 iteration count for new notes.
pub const DEFAULT_ITERATION_COUNT: u32 = 131_072;

/// Derived key length for new notes (AES-128).
pub const DEFAULT_KEY_LENGTH: usize = 16;

/// Upper bound on the iteration count accepted from the wire.
pub const MAX_ITERATION_COUNT: u32 = 10_000_000;

/// Key lengths the cipher accepts.
pub const SUPPORTED_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Stateless note encoder/decoder.
///
/// The only state is configuration for newly encrypted notes; decoding always
/// follows the parameters stored in the note. Safe to share across
/// directories.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    iterations: u32,
    authenticate: bool,
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATION_COUNT,
            authenticate: false,
        }
    }
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the PBKDF2 iteration count for new notes.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.clamp(1, MAX_ITERATION_COUNT);
        self
    }

    /// Attach an HMAC tag to newly encrypted notes.
    pub fn authenticated(mut self, authenticate: bool) -> Self {
        self.authenticate = authenticate;
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Build a note from `content`, encrypting it when a password is given.
    ///
    /// Returns the note and, when encrypted, the hex-encoded derived key.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Crypto` if the cipher cannot be initialized.
    pub fn encode_note(
        &self,
        content: &str,
        password: Option<&str>,
    ) -> Result<(Note, Option<String>)> {
        let Some(password) = password else {
            return Ok((Note::plaintext(content), None));
        };

        let iv: [u8; IV_LENGTH] = random_bytes();
        let salt: [u8; SALT_LENGTH] = random_bytes();
        let key = derive_key(password, &salt, self.iterations, DEFAULT_KEY_LENGTH);

        let mut ciphertext = content.as_bytes().to_vec();
        apply_keystream(&key, &iv, &mut ciphertext)
            .map_err(|e| NoteError::Crypto(e.to_string()))?;
        let mac = if self.authenticate {
            let tag = compute_mac(&key, &iv, &ciphertext)
                .map_err(|e| NoteError::Crypto(e.to_string()))?;
            Some(hex::encode(tag))
        } else {
            None
        };

        let note = Note {
            id: new_note_id(),
            content: hex::encode(&ciphertext),
            encryption_params: Some(EncryptionParams {
                iv: hex::encode(iv),
                salt: hex::encode(salt),
                iteration_count: self.iterations,
                derived_key_length: DEFAULT_KEY_LENGTH,
                mac,
            }),
        };
        Ok((note, Some(key.to_hex())))
    }

    /// Recover the plaintext of an encrypted note.
    ///
    /// # Errors
    ///
    /// - [`DecryptError::MissingParams`] if the note is plaintext
    /// - [`DecryptError::CipherFailure`] if the content or parameters cannot be decoded
    /// - [`DecryptError::InvalidPassword`] if the MAC does not verify or the
    ///   result is not valid UTF-8
    pub fn decode_note(
        &self,
        note: &Note,
        password: &str,
    ) -> std::result::Result<String, DecryptError> {
        let params = note
            .encryption_params
            .as_ref()
            .ok_or(DecryptError::MissingParams)?;

        let iv = hex::decode(&params.iv)
            .map_err(|e| DecryptError::CipherFailure(format!("iv is not hex: {}", e)))?;
        let salt = hex::decode(&params.salt)
            .map_err(|e| DecryptError::CipherFailure(format!("salt is not hex: {}", e)))?;
        let mut data = hex::decode(&note.content)
            .map_err(|e| DecryptError::CipherFailure(format!("content is not hex: {}", e)))?;

        if !SUPPORTED_KEY_LENGTHS.contains(&params.derived_key_length) {
            return Err(DecryptError::CipherFailure(format!(
                "unsupported key length: {}",
                params.derived_key_length
            )));
        }
        if params.iteration_count == 0 || params.iteration_count > MAX_ITERATION_COUNT {
            return Err(DecryptError::CipherFailure(format!(
                "iteration count out of range: {}",
                params.iteration_count
            )));
        }

        let key = derive_key(
            password,
            &salt,
            params.iteration_count,
            params.derived_key_length,
        );

        if let Some(mac) = &params.mac {
            let tag = hex::decode(mac)
                .map_err(|e| DecryptError::CipherFailure(format!("mac is not hex: {}", e)))?;
            verify_mac(&key, &iv, &data, &tag)?;
        }

        apply_keystream(&key, &iv, &mut data)?;
        String::from_utf8(data).map_err(|_| DecryptError::InvalidPassword)
    }
}
