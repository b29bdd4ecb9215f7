//! Private-key identities.

use signet_core::{ParticipantId, Timestamp};
use signet_crypto::{
    AgreementPublicKey, AgreementSecret, SessionSecret, Signature, SigningKeyPair,
};

use crate::certificate::Certificate;
use crate::chain::CertificateChain;
use crate::error::CertificateError;

/// A participant's private keys together with the certificate chain that
/// publishes their public halves.
///
/// Construction verifies that both private keys match the leaf certificate,
/// so a well-typed `Identity` is always self-consistent. All secret-key
/// operations happen through methods here; the keys themselves are never
/// handed out.
pub struct Identity {
    signing: SigningKeyPair,
    agreement: AgreementSecret,
    chain: CertificateChain,
}

impl Identity {
    /// Assemble an identity, verifying keys against the leaf certificate.
    pub fn new(
        signing: SigningKeyPair,
        agreement: AgreementSecret,
        chain: CertificateChain,
    ) -> Result<Self, CertificateError> {
        let leaf = chain.leaf();
        if signing.public() != *leaf.signing_key() || agreement.public() != *leaf.agreement_key() {
            return Err(CertificateError::KeyMismatch {
                subject: leaf.subject().clone(),
            });
        }
        Ok(Self {
            signing,
            agreement,
            chain,
        })
    }

    /// Generate a fresh identity with random keys and a single unrestricted
    /// leaf certificate covering the given validity window.
    pub fn generate(
        participant: ParticipantId,
        not_before: Timestamp,
        not_after: Timestamp,
    ) -> Result<Self, CertificateError> {
        let signing = SigningKeyPair::generate();
        let agreement = AgreementSecret::generate();
        let leaf = Certificate::new(
            participant,
            signing.public(),
            agreement.public(),
            vec![],
            not_before,
            not_after,
        )?;
        Self::new(signing, agreement, CertificateChain::single(leaf))
    }

    /// The participant this identity belongs to.
    pub fn participant(&self) -> &ParticipantId {
        self.chain.leaf().subject()
    }

    /// The leaf certificate.
    pub fn certificate(&self) -> &Certificate {
        self.chain.leaf()
    }

    /// The full certificate chain, leaf first.
    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }

    /// Sign `message` with the private Ed25519 key.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing.sign(message)
    }

    /// Run X25519 agreement between the private key and `peer`.
    pub fn agree(&self, peer: &AgreementPublicKey) -> SessionSecret {
        self.agreement.agree(peer)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({})", self.participant())
    }
}
