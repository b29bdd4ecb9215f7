//! # Signet Credentials
//!
//! Participant credentials: certificates binding a participant identifier to
//! its public keys, chains ordering those certificates leaf-first, and
//! [`Identity`], the private-key holder that performs every secret-key
//! operation in the stack.
//!
//! A certificate carries two public keys with separate jobs: an Ed25519 key
//! for signature verification and an X25519 key for key agreement. Keeping
//! the keys separate avoids cross-protocol reuse of a single key pair.
//!
//! ## Security Invariants
//!
//! - An [`Identity`] can only be constructed when its private keys match the
//!   public keys in its leaf certificate.
//! - Private keys never leave the [`Identity`]: signing and agreement are
//!   methods, not accessors.

pub mod certificate;
pub mod chain;
pub mod error;
pub mod identity;

pub use certificate::{Certificate, Fingerprint, KeyUsage};
pub use chain::CertificateChain;
pub use error::CertificateError;
pub use identity::Identity;
