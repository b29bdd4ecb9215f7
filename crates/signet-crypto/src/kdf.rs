//! # Key Derivation
//!
//! Two derivation paths with distinct inputs:
//!
//! - [`derive_key`]: Argon2id, for low-entropy passwords guarding keystore
//!   files and individual key entries.
//! - [`expand_key`]: HKDF-SHA256, for high-entropy agreement output feeding
//!   envelope encryption.
//!
//! ## Security Invariants
//!
//! - Argon2id cost parameters are stored alongside the ciphertext they
//!   protect, so files stay readable after defaults change.
//! - HKDF salt and info are fixed domain labels; two contexts never share a
//!   derived key.

use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::aead::{AeadKey, AEAD_KEY_SIZE};
use crate::error::CryptoError;

/// Minimum accepted salt length in bytes for password derivation.
pub const MIN_SALT_LEN: usize = 8;

/// Argon2id cost parameters, persisted next to whatever they protect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of iterations.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 19_456,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

/// Derive an AEAD key from a password with Argon2id.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<AeadKey, CryptoError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::Kdf(format!(
            "salt must be at least {MIN_SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    let argon_params = Params::new(
        params.m_cost,
        params.t_cost,
        params.p_cost,
        Some(AEAD_KEY_SIZE),
    )
    .map_err(|e| CryptoError::Kdf(format!("invalid parameters: {e}")))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);
    let mut key = [0u8; AEAD_KEY_SIZE];
    argon
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| CryptoError::Kdf(format!("derivation failed: {e}")))?;
    Ok(AeadKey::from_bytes(key))
}

/// Expand high-entropy keying material into an AEAD key with HKDF-SHA256.
pub fn expand_key(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<AeadKey, CryptoError> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut key = [0u8; AEAD_KEY_SIZE];
    hkdf.expand(info, &mut key)
        .map_err(|e| CryptoError::Kdf(format!("expansion failed: {e}")))?;
    Ok(AeadKey::from_bytes(key))
}
