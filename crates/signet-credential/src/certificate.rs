//! Participant certificates.
//!
//! A certificate binds a participant identifier to an Ed25519 verification
//! key and an X25519 agreement key for a bounded validity window. Signet
//! certificates are distributed over authenticated channels (a local trust
//! store or TLS), so they carry no issuer signature of their own; trust comes
//! from where a certificate was obtained, not from its bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use signet_core::{ParticipantId, Timestamp};
use signet_crypto::{AgreementPublicKey, SigningPublicKey};

use crate::error::CertificateError;

/// Domain label mixed into every certificate fingerprint.
const FINGERPRINT_LABEL: &[u8] = b"signet/certificate/v1/fingerprint";

/// What a certificate's keys may be used for.
///
/// An empty usage list on a certificate permits every usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUsage {
    /// The Ed25519 key may verify signatures from the subject.
    Signing,
    /// The X25519 key may receive encrypted payloads for the subject.
    Encryption,
}

impl std::fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signing => f.write_str("signing"),
            Self::Encryption => f.write_str("encryption"),
        }
    }
}

/// A participant certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    subject: ParticipantId,
    signing_key: SigningPublicKey,
    agreement_key: AgreementPublicKey,
    usages: Vec<KeyUsage>,
    not_before: Timestamp,
    not_after: Timestamp,
}

/// SHA-256 fingerprint of a certificate's subject and public keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

// ---------------------------------------------------------------------------
// Certificate impls
// ---------------------------------------------------------------------------

impl Certificate {
    /// Create a certificate, rejecting inverted validity windows.
    pub fn new(
        subject: ParticipantId,
        signing_key: SigningPublicKey,
        agreement_key: AgreementPublicKey,
        usages: Vec<KeyUsage>,
        not_before: Timestamp,
        not_after: Timestamp,
    ) -> Result<Self, CertificateError> {
        if not_before > not_after {
            return Err(CertificateError::InvalidValidity {
                not_before,
                not_after,
            });
        }
        Ok(Self {
            subject,
            signing_key,
            agreement_key,
            usages,
            not_before,
            not_after,
        })
    }

    /// The participant this certificate belongs to.
    pub fn subject(&self) -> &ParticipantId {
        &self.subject
    }

    /// The Ed25519 verification key.
    pub fn signing_key(&self) -> &SigningPublicKey {
        &self.signing_key
    }

    /// The X25519 agreement key.
    pub fn agreement_key(&self) -> &AgreementPublicKey {
        &self.agreement_key
    }

    /// The declared key usages. Empty means unrestricted.
    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    /// Start of the validity window.
    pub fn not_before(&self) -> Timestamp {
        self.not_before
    }

    /// End of the validity window (inclusive).
    pub fn not_after(&self) -> Timestamp {
        self.not_after
    }

    /// Whether this certificate permits `usage`.
    pub fn permits(&self, usage: KeyUsage) -> bool {
        self.usages.is_empty() || self.usages.contains(&usage)
    }

    /// Check that this certificate permits `usage`.
    pub fn check_usage(&self, usage: KeyUsage) -> Result<(), CertificateError> {
        if self.permits(usage) {
            Ok(())
        } else {
            Err(CertificateError::UsageNotPermitted {
                subject: self.subject.clone(),
                usage,
            })
        }
    }

    /// Check that `at` falls inside the validity window.
    ///
    /// An inverted window, which can only arrive through deserialization,
    /// fails this check for every `at`.
    pub fn check_validity(&self, at: Timestamp) -> Result<(), CertificateError> {
        if at < self.not_before {
            return Err(CertificateError::NotYetValid {
                subject: self.subject.clone(),
                not_before: self.not_before,
            });
        }
        if at > self.not_after {
            return Err(CertificateError::Expired {
                subject: self.subject.clone(),
                not_after: self.not_after,
            });
        }
        Ok(())
    }

    /// Whether `at` falls inside the validity window.
    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        self.check_validity(at).is_ok()
    }

    /// The SHA-256 fingerprint over the subject and both public keys.
    ///
    /// The validity window and usages are excluded: the fingerprint
    /// identifies key material, so renewing a certificate with the same
    /// keys keeps its fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_LABEL);
        hasher.update([0x00]);
        hasher.update(self.subject.as_str().as_bytes());
        hasher.update([0x00]);
        hasher.update(self.signing_key.as_bytes());
        hasher.update(self.agreement_key.as_bytes());
        Fingerprint(hasher.finalize().into())
    }
}

// ---------------------------------------------------------------------------
// Fingerprint impls
// ---------------------------------------------------------------------------

impl Fingerprint {
    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The first 16 hex characters, for logs.
    pub fn short(&self) -> String {
        self.to_hex()[..16].to_string()
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({}...)", self.short())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
