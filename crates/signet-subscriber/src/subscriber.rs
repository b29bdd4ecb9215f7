//! The subscriber façade.

use std::io::{Read, Write};

use signet_core::ParticipantId;
use signet_credential::{Identity, KeyUsage};
use signet_directory::Directory;
use signet_envelope::{seal, EnvelopeReader, VerifiedPlaintext};

use crate::error::SubscriberError;

/// One participant's messaging engine: an identity to act as, a directory to
/// resolve peers through, and no other state.
///
/// Both operations are synchronous and take `&self`; one subscriber may
/// serve concurrent calls for different messages.
pub struct Subscriber<D> {
    identity: Identity,
    directory: D,
}

impl<D: Directory> Subscriber<D> {
    /// Bind `identity` to `directory`.
    pub fn new(identity: Identity, directory: D) -> Self {
        Self {
            identity,
            directory,
        }
    }

    /// The participant this subscriber acts as.
    pub fn participant(&self) -> &ParticipantId {
        self.identity.participant()
    }

    /// Sign everything `source` yields and encrypt it to `recipient`,
    /// writing the envelope to `sink`.
    ///
    /// The recipient's certificate is resolved through the directory and
    /// must permit encryption use. The source is read exactly once; on
    /// failure the sink may hold partial output and its cleanup is the
    /// caller's.
    pub fn sign_and_encrypt_to<R: Read, W: Write>(
        &self,
        recipient: &ParticipantId,
        source: &mut R,
        sink: &mut W,
    ) -> Result<(), SubscriberError> {
        let certificate = self.directory.resolve(recipient)?;
        certificate.check_usage(KeyUsage::Encryption)?;
        tracing::debug!("sealing message from '{}' to '{recipient}'", self.participant());
        seal(&self.identity, &certificate, source, sink)?;
        Ok(())
    }

    /// Decrypt an envelope addressed to this identity and verify its sender.
    ///
    /// The sender reference is taken from the envelope header, resolved
    /// through the directory, and must both match the resolved certificate's
    /// subject and permit signing use. The returned reader yields plaintext
    /// only because the whole message already decrypted and verified.
    pub fn decrypt_and_verify_from<R: Read>(
        &self,
        source: R,
    ) -> Result<VerifiedPlaintext, SubscriberError> {
        let reader = EnvelopeReader::new(source)?;
        let sender = reader.sender().clone();
        let certificate = self.directory.resolve(&sender)?;
        if certificate.subject() != &sender {
            return Err(SubscriberError::SignatureInvalid {
                reason: format!(
                    "resolved certificate subject '{}' does not match envelope sender '{sender}'",
                    certificate.subject()
                ),
            });
        }
        certificate.check_usage(KeyUsage::Signing)?;
        tracing::debug!("opening envelope from '{sender}' for '{}'", self.participant());
        Ok(reader.open(&self.identity, &certificate)?)
    }
}

impl<D> std::fmt::Debug for Subscriber<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscriber({})", self.identity.participant())
    }
}
