//! Credential error types.

use signet_core::{ParticipantId, Timestamp};

use crate::certificate::KeyUsage;

/// Errors raised while validating certificates, chains, and identities.
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    /// The certificate's validity window has passed.
    #[error("certificate for '{subject}' expired at {not_after}")]
    Expired {
        subject: ParticipantId,
        not_after: Timestamp,
    },

    /// The certificate's validity window has not started.
    #[error("certificate for '{subject}' is not valid until {not_before}")]
    NotYetValid {
        subject: ParticipantId,
        not_before: Timestamp,
    },

    /// The certificate does not permit the requested key usage.
    #[error("certificate for '{subject}' does not permit {usage} use")]
    UsageNotPermitted {
        subject: ParticipantId,
        usage: KeyUsage,
    },

    /// A certificate chain must contain at least a leaf certificate.
    #[error("certificate chain is empty")]
    EmptyChain,

    /// Private keys must match the public keys in the leaf certificate.
    #[error("private keys do not match the leaf certificate for '{subject}'")]
    KeyMismatch { subject: ParticipantId },

    /// `not_before` must not be later than `not_after`.
    #[error("certificate validity window is inverted: {not_before} > {not_after}")]
    InvalidValidity {
        not_before: Timestamp,
        not_after: Timestamp,
    },
}
