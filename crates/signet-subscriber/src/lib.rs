//! # Signet Subscriber
//!
//! The participant-facing façade. A [`Subscriber`] binds one identity to one
//! directory for its lifetime and exposes exactly two operations: sign a
//! message and encrypt it to a recipient, or decrypt a received envelope and
//! verify its sender.
//!
//! Everything underneath — certificate resolution, usage policy, the wire
//! codec — is composed here, and every failure surfaces as one of the
//! operation-level [`SubscriberError`] kinds.
//!
//! ## Security Invariants
//!
//! - No plaintext is released before decryption and signature verification
//!   both succeed.
//! - A resolved certificate is used only when its subject matches the
//!   identifier it was resolved for and its declared usages permit the
//!   operation.

pub mod error;
pub mod subscriber;

pub use error::SubscriberError;
pub use subscriber::Subscriber;
