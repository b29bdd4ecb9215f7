//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors from the primitive layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material is malformed or unusable.
    #[error("key error: {0}")]
    Key(String),

    /// A signature did not verify.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Authenticated encryption or decryption failed. Decryption failure
    /// carries no detail: the cipher does not distinguish a wrong key from
    /// tampered ciphertext.
    #[error("aead failure: {0}")]
    Aead(String),

    /// Key derivation failed (bad parameters or salt).
    #[error("key derivation failed: {0}")]
    Kdf(String),
}
