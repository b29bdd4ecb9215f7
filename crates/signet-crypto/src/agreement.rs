//! # X25519 Key Agreement
//!
//! Diffie-Hellman key agreement for envelope encryption. A recipient holds a
//! long-lived [`AgreementSecret`] whose public half travels in its
//! certificate; a sender generates a one-shot [`EphemeralAgreement`] per
//! envelope. Both sides arrive at the same [`SessionSecret`], which feeds
//! HKDF to produce the envelope's AEAD key.
//!
//! ## Security Invariants
//!
//! - Secrets do not implement `Serialize` and zeroize on drop.
//! - [`EphemeralAgreement::agree`] consumes the secret: an ephemeral key
//!   cannot be reused across envelopes.

use rand_core::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use x25519_dalek::{EphemeralSecret, PublicKey, SharedSecret, StaticSecret};

use crate::error::CryptoError;
use crate::hex::{hex_prefix, hex_to_bytes, to_hex};

/// An X25519 public key (32 bytes) for key agreement.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AgreementPublicKey([u8; 32]);

/// A long-lived X25519 secret. The decryption half of a participant's
/// credential.
pub struct AgreementSecret {
    secret: StaticSecret,
}

/// A one-shot X25519 secret generated per sealed envelope.
pub struct EphemeralAgreement {
    secret: EphemeralSecret,
}

/// The shared secret both sides of an agreement derive. Input keying
/// material for HKDF, never used as a cipher key directly.
pub struct SessionSecret(SharedSecret);

// ---------------------------------------------------------------------------
// AgreementPublicKey impls
// ---------------------------------------------------------------------------

impl AgreementPublicKey {
    /// Create a public key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 64 {
            return Err(CryptoError::Key(format!(
                "agreement key hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(CryptoError::Key)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for AgreementPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AgreementPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for AgreementPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AgreementPublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for AgreementPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// AgreementSecret impls
// ---------------------------------------------------------------------------

impl AgreementSecret {
    /// Generate a new random secret from the system RNG.
    pub fn generate() -> Self {
        Self {
            secret: StaticSecret::random_from_rng(OsRng),
        }
    }

    /// Create a secret from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            secret: StaticSecret::from(*seed),
        }
    }

    /// The public half of this secret.
    pub fn public(&self) -> AgreementPublicKey {
        AgreementPublicKey(PublicKey::from(&self.secret).to_bytes())
    }

    /// Agree with a peer's public key.
    pub fn agree(&self, peer: &AgreementPublicKey) -> SessionSecret {
        SessionSecret(self.secret.diffie_hellman(&PublicKey::from(peer.0)))
    }
}

impl std::fmt::Debug for AgreementSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AgreementSecret(<private>)")
    }
}

// ---------------------------------------------------------------------------
// EphemeralAgreement impls
// ---------------------------------------------------------------------------

impl EphemeralAgreement {
    /// Generate a new one-shot secret from the system RNG.
    pub fn generate() -> Self {
        Self {
            secret: EphemeralSecret::random_from_rng(OsRng),
        }
    }

    /// The public half, to be embedded in the envelope header.
    pub fn public(&self) -> AgreementPublicKey {
        AgreementPublicKey(PublicKey::from(&self.secret).to_bytes())
    }

    /// Agree with a peer's public key, consuming this secret.
    pub fn agree(self, peer: &AgreementPublicKey) -> SessionSecret {
        SessionSecret(self.secret.diffie_hellman(&PublicKey::from(peer.0)))
    }
}

impl std::fmt::Debug for EphemeralAgreement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EphemeralAgreement(<private>)")
    }
}

// ---------------------------------------------------------------------------
// SessionSecret impls
// ---------------------------------------------------------------------------

impl SessionSecret {
    /// The raw shared secret bytes, for key derivation only.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionSecret(<secret>)")
    }
}
