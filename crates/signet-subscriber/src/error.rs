//! Operation-level error taxonomy.

use signet_core::ParticipantId;
use signet_credential::CertificateError;
use signet_crypto::CryptoError;
use signet_directory::DirectoryError;
use signet_envelope::EnvelopeError;

/// Errors surfaced by the two subscriber operations.
///
/// The kinds carry distinct operational meaning: `UnknownParticipant` will
/// not change on retry, `DirectoryUnavailable` may, `Certificate` is a
/// policy violation, `DecryptionFailed` means the message is unusable for
/// this identity, and `SignatureInvalid` means the message decrypted but its
/// origin cannot be trusted.
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    /// The directory has no certificate for the participant.
    #[error("unknown participant '{participant}'")]
    UnknownParticipant { participant: ParticipantId },

    /// A directory backend could not be reached; worth retrying.
    #[error("directory unavailable: {reason}")]
    DirectoryUnavailable { reason: String },

    /// The resolved certificate does not permit the operation.
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// The envelope could not be decrypted for this identity.
    #[error("message could not be decrypted: {reason}")]
    DecryptionFailed { reason: String },

    /// The envelope decrypted but its signature did not verify.
    #[error("message signature is invalid: {reason}")]
    SignatureInvalid { reason: String },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SubscriberError {
    /// Whether retrying the same operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DirectoryUnavailable { .. })
    }
}

impl From<DirectoryError> for SubscriberError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::UnknownParticipant { participant } => {
                Self::UnknownParticipant { participant }
            }
            DirectoryError::Unavailable { reason } => Self::DirectoryUnavailable { reason },
        }
    }
}

impl From<EnvelopeError> for SubscriberError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Malformed { reason } => Self::DecryptionFailed { reason },
            EnvelopeError::UnsupportedVersion(version) => Self::DecryptionFailed {
                reason: format!("unsupported envelope version {version}"),
            },
            EnvelopeError::Authentication => Self::DecryptionFailed {
                reason: "envelope failed authentication".to_string(),
            },
            EnvelopeError::Signature { reason } => Self::SignatureInvalid { reason },
            EnvelopeError::Crypto(e) => Self::Crypto(e),
            EnvelopeError::Io(e) => Self::Io(e),
        }
    }
}
