//! # Authenticated Encryption
//!
//! XChaCha20-Poly1305 seal/open with associated data. Every ciphertext this
//! crate produces is authenticated; open fails closed on any mismatch of
//! key, nonce, associated data, or ciphertext bytes.
//!
//! ## Security Invariants
//!
//! - Keys zeroize on drop and never implement `Serialize`.
//! - A decryption failure is reported as a single opaque [`CryptoError::Aead`]
//!   value; callers cannot distinguish a wrong key from tampered bytes.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::XChaCha20Poly1305;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// AEAD key length in bytes.
pub const AEAD_KEY_SIZE: usize = 32;

/// AEAD nonce length in bytes (XChaCha20 extended nonce).
pub const AEAD_NONCE_SIZE: usize = 24;

/// Poly1305 authentication tag length in bytes.
pub const AEAD_TAG_SIZE: usize = 16;

/// A 256-bit XChaCha20-Poly1305 key. Zeroized on drop.
pub struct AeadKey(Zeroizing<[u8; AEAD_KEY_SIZE]>);

impl AeadKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; AEAD_KEY_SIZE]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; AEAD_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AeadKey(<secret>)")
    }
}

/// Encrypt `plaintext` under `key` and `nonce`, binding `aad` into the tag.
///
/// The returned ciphertext is `plaintext.len() + AEAD_TAG_SIZE` bytes.
pub fn seal(
    key: &AeadKey,
    nonce: &[u8; AEAD_NONCE_SIZE],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .encrypt(
            nonce.into(),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CryptoError::Aead("encryption failed".to_string()))
}

/// Decrypt and authenticate `ciphertext`. Fails if the key, nonce, associated
/// data, or ciphertext do not match what [`seal`] produced.
pub fn open(
    key: &AeadKey,
    nonce: &[u8; AEAD_NONCE_SIZE],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(
            nonce.into(),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CryptoError::Aead("decryption failed".to_string()))
}
