//! Key derivation and content cipher.
//!
//! - **PBKDF2-HMAC-SHA256** derives the symmetric key from an NFKC-normalized
//!   password and a random salt.
//! - **AES-CTR** (128-bit big-endian counter) encrypts the content. The
//!   derived key length selects AES-128, AES-192 or AES-256.
//! - **HMAC-SHA256** optionally tags `iv || ciphertext`.
//!
//! Key material lives in [`Zeroizing`] buffers and is wiped on drop.

use aes::{Aes128, Aes192, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::DecryptError;

type HmacSha256 = Hmac<Sha256>;

/// Domain separator for the MAC key.
const MAC_KEY_LABEL: &[u8] = b"note-mac";

/// A symmetric key derived from a password.
pub struct DerivedKey {
    key: Zeroizing<Vec<u8>>,
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&*self.key)
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Fill a fixed-size array from the OS RNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Derive a key with PBKDF2-HMAC-SHA256 over the NFKC form of `password`.
///
/// Same password, salt and parameters always produce the same key.
pub fn derive_key(password: &str, salt: &[u8], iterations: u32, key_length: usize) -> DerivedKey {
    let normalized = Zeroizing::new(password.nfkc().collect::<String>());
    let mut key = Zeroizing::new(vec![0u8; key_length]);
    pbkdf2::pbkdf2_hmac::<Sha256>(normalized.as_bytes(), salt, iterations, &mut key);
    DerivedKey { key }
}

/// XOR `data` in place with the AES-CTR keystream for `key` and `iv`.
///
/// Encryption and decryption are the same operation.
pub fn apply_keystream(key: &DerivedKey, iv: &[u8], data: &mut [u8]) -> Result<(), DecryptError> {
    let key = key.as_bytes();
    let result = match key.len() {
        16 => Ctr128BE::<Aes128>::new_from_slices(key, iv).map(|mut c| c.apply_keystream(data)),
        24 => Ctr128BE::<Aes192>::new_from_slices(key, iv).map(|mut c| c.apply_keystream(data)),
        32 => Ctr128BE::<Aes256>::new_from_slices(key, iv).map(|mut c| c.apply_keystream(data)),
        other => {
            return Err(DecryptError::CipherFailure(format!(
                "unsupported key length: {}",
                other
            )))
        }
    };
    result.map_err(|e| DecryptError::CipherFailure(format!("cipher init failed: {}", e)))
}

fn mac_for(key: &DerivedKey, iv: &[u8], ciphertext: &[u8]) -> Result<HmacSha256, DecryptError> {
    let mut kdf = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .map_err(|e| DecryptError::CipherFailure(format!("mac key init failed: {}", e)))?;
    kdf.update(MAC_KEY_LABEL);
    let mac_key = Zeroizing::new(kdf.finalize().into_bytes().to_vec());

    let mut mac = <HmacSha256 as Mac>::new_from_slice(&mac_key)
        .map_err(|e| DecryptError::CipherFailure(format!("mac init failed: {}", e)))?;
    mac.update(iv);
    mac.update(ciphertext);
    Ok(mac)
}

/// Compute the authentication tag over `iv || ciphertext`.
pub fn compute_mac(
    key: &DerivedKey,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, DecryptError> {
    Ok(mac_for(key, iv, ciphertext)?.finalize().into_bytes().to_vec())
}

/// Verify a tag in constant time. A mismatch means the key is wrong or the
/// ciphertext was altered.
pub fn verify_mac(
    key: &DerivedKey,
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<(), DecryptError> {
    mac_for(key, iv, ciphertext)?
        .verify_slice(tag)
        .map_err(|_| DecryptError::InvalidPassword)
}
