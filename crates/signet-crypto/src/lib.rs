//! # signet-crypto — Cryptographic Primitives for the Signet Stack
//!
//! The primitive layer every higher crate builds on:
//!
//! - **Ed25519** signing and verification for message authentication.
//! - **X25519** key agreement (long-lived and ephemeral) for envelope
//!   encryption.
//! - **XChaCha20-Poly1305** authenticated encryption with associated data.
//! - **HKDF-SHA256** session-key expansion and **Argon2id** password-based
//!   derivation for the keystore.
//!
//! ## Security Invariants
//!
//! - Private material never serializes: none of [`SigningKeyPair`],
//!   [`AgreementSecret`], [`EphemeralAgreement`], [`SessionSecret`], or
//!   [`AeadKey`] implement `Serialize`, and their `Debug` output is
//!   redacted.
//! - Secrets are zeroized on drop (dalek zeroize features, [`AeadKey`]
//!   wraps `Zeroizing`).
//! - Public keys and signatures serialize as lowercase hex strings.

pub mod aead;
pub mod agreement;
pub mod error;
pub mod kdf;
pub mod signing;

mod hex;

// Re-export primary types.
pub use aead::{AeadKey, AEAD_KEY_SIZE, AEAD_NONCE_SIZE, AEAD_TAG_SIZE};
pub use agreement::{AgreementPublicKey, AgreementSecret, EphemeralAgreement, SessionSecret};
pub use error::CryptoError;
pub use kdf::KdfParams;
pub use signing::{Signature, SigningKeyPair, SigningPublicKey};
