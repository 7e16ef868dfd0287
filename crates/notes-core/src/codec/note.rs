//! Note wire record.
//!
//! A note travels as the UTF-8 JSON encoding of [`Note`]. Peers on a shared
//! topic may publish anything, so parsing is strict: a payload either yields a
//! fully-formed note or a [`ParseError`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{IV_LENGTH, MAX_ITERATION_COUNT, SUPPORTED_KEY_LENGTHS};
use crate::error::ParseError;

/// Length in bytes of an HMAC-SHA256 tag.
const MAC_LENGTH: usize = 32;

/// An immutable note as published on the topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Client-generated identifier
    pub id: String,

    /// Plaintext, or hex-encoded ciphertext when `encryption_params` is set
    pub content: String,

    /// Parameters needed to re-derive the key and reverse the cipher
    pub encryption_params: Option<EncryptionParams>,
}

/// Key derivation and cipher parameters stored alongside ciphertext.
///
/// Byte strings are hex-encoded. Every field except `mac` is required; an
/// object missing any of them is rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    /// AES-CTR initial counter block
    pub iv: String,

    /// PBKDF2 salt
    pub salt: String,

    /// PBKDF2 iteration count
    pub iteration_count: u32,

    /// Derived key length in bytes (selects AES-128/192/256)
    pub derived_key_length: usize,

    /// Optional HMAC-SHA256 tag over `iv || ciphertext`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

impl Note {
    /// Build a plaintext note with a fresh identifier.
    pub fn plaintext(content: impl Into<String>) -> Self {
        Self {
            id: new_note_id(),
            content: content.into(),
            encryption_params: None,
        }
    }

    /// Whether the content is ciphertext.
    pub fn is_encrypted(&self) -> bool {
        self.encryption_params.is_some()
    }

    /// Check the structural invariants a well-formed note must satisfy.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.id.trim().is_empty() {
            return Err(ParseError::Malformed("note id is empty".to_string()));
        }
        if let Some(params) = &self.encryption_params {
            params.validate()?;
        }
        Ok(())
    }
}

impl EncryptionParams {
    fn validate(&self) -> Result<(), ParseError> {
        let iv = decode_hex_field("iv", &self.iv)?;
        if iv.len() != IV_LENGTH {
            return Err(ParseError::Malformed(format!(
                "iv must be {} bytes (got {})",
                IV_LENGTH,
                iv.len()
            )));
        }

        let salt = decode_hex_field("salt", &self.salt)?;
        if salt.is_empty() {
            return Err(ParseError::Malformed("salt is empty".to_string()));
        }

        if self.iteration_count == 0 || self.iteration_count > MAX_ITERATION_COUNT {
            return Err(ParseError::Malformed(format!(
                "iteration_count out of range: {}",
                self.iteration_count
            )));
        }

        if !SUPPORTED_KEY_LENGTHS.contains(&self.derived_key_length) {
            return Err(ParseError::Malformed(format!(
                "unsupported derived_key_length: {}",
                self.derived_key_length
            )));
        }

        if let Some(mac) = &self.mac {
            let tag = decode_hex_field("mac", mac)?;
            if tag.len() != MAC_LENGTH {
                return Err(ParseError::Malformed(format!(
                    "mac must be {} bytes (got {})",
                    MAC_LENGTH,
                    tag.len()
                )));
            }
        }

        Ok(())
    }
}

fn decode_hex_field(name: &str, value: &str) -> Result<Vec<u8>, ParseError> {
    hex::decode(value).map_err(|e| ParseError::Malformed(format!("{} is not hex: {}", name, e)))
}

/// Generate a new note identifier: 32 lowercase hex characters.
pub fn new_note_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Encode a note as transport payload bytes.
pub fn serialize_for_transport(note: &Note) -> Result<Vec<u8>, ParseError> {
    Ok(serde_json::to_vec(note)?)
}

/// Decode transport payload bytes into a validated note.
pub fn parse_from_transport(bytes: &[u8]) -> Result<Note, ParseError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::Malformed(format!("payload is not UTF-8: {}", e)))?;
    let note: Note = serde_json::from_str(text)?;
    note.validate()?;
    Ok(note)
}
