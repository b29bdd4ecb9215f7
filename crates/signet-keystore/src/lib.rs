//! # Signet Keystore
//!
//! The password-protected credential store: named key entries (private seeds
//! plus their certificate chains) and a set of trusted third-party
//! certificates, persisted as a single encrypted file.
//!
//! The whole store is sealed under a key derived from the store password with
//! Argon2id; individual entries may additionally carry their own password.
//! [`Keystore::identity`] materializes a [`signet_credential::Identity`] from
//! an entry, which is the only way key material leaves the store.
//!
//! ## Security Invariants
//!
//! - The file preamble (magic, version, header) is authenticated as AEAD
//!   associated data; a tampered preamble fails the open.
//! - Seed material is zeroized on drop and never serialized outside the
//!   store's encrypted body.
//! - Saving re-randomizes the store salt and nonce; two saves of the same
//!   store never produce the same ciphertext.

pub mod error;
mod file;
pub mod store;

pub use error::KeystoreError;
pub use store::Keystore;
