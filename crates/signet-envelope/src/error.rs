//! Envelope error types.

use signet_crypto::CryptoError;

/// Errors raised while sealing or opening an envelope.
///
/// `Authentication` and `Signature` are deliberately separate: the former
/// means the ciphertext could not be decrypted for this identity (wrong
/// recipient, or tampering anywhere in the stream), the latter means the
/// decrypted message fails to verify against the sender's certificate.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The byte stream does not have envelope structure.
    #[error("envelope is malformed: {reason}")]
    Malformed { reason: String },

    /// The stream declares a format version this build does not read.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    /// A segment failed authenticated decryption.
    #[error("envelope failed authentication")]
    Authentication,

    /// The enclosed signature did not verify.
    #[error("envelope signature rejected: {reason}")]
    Signature { reason: String },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EnvelopeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
