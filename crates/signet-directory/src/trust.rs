//! Trust-store-backed directory.

use std::collections::BTreeMap;

use signet_core::{ParticipantId, Timestamp};
use signet_credential::Certificate;
use signet_keystore::Keystore;

use crate::error::DirectoryError;
use crate::Directory;

/// A directory over a closed set of certificates, typically the contents of
/// a keystore: its trusted certificates plus the leaf certificate of every
/// key entry, so a store always resolves its own subjects.
///
/// When several certificates are held for one participant, resolution
/// returns the one currently valid with the latest expiry; remaining ties
/// break on `not_before` and then on the signing key, so the pick is
/// deterministic. This backend is local and never reports unavailable.
pub struct TrustDirectory {
    certificates: BTreeMap<ParticipantId, Vec<Certificate>>,
}

impl TrustDirectory {
    /// Index the resolvable certificates of `store`.
    ///
    /// The directory copies what it needs; the store can be dropped (and its
    /// secrets with it) afterwards.
    pub fn from_keystore(store: &Keystore) -> Self {
        Self::from_certificates(store.resolvable_certificates().cloned())
    }

    /// Index an explicit set of certificates.
    pub fn from_certificates(certificates: impl IntoIterator<Item = Certificate>) -> Self {
        let mut index: BTreeMap<ParticipantId, Vec<Certificate>> = BTreeMap::new();
        for certificate in certificates {
            index
                .entry(certificate.subject().clone())
                .or_default()
                .push(certificate);
        }
        Self {
            certificates: index,
        }
    }

    /// Number of distinct subjects this directory can resolve.
    pub fn subject_count(&self) -> usize {
        self.certificates.len()
    }
}

impl Directory for TrustDirectory {
    fn resolve(&self, participant: &ParticipantId) -> Result<Certificate, DirectoryError> {
        let now = Timestamp::now();
        let best = self
            .certificates
            .get(participant)
            .into_iter()
            .flatten()
            .filter(|c| c.is_valid_at(now))
            .max_by_key(|c| (c.not_after(), c.not_before(), c.signing_key().to_hex()));
        match best {
            Some(certificate) => Ok(certificate.clone()),
            None => Err(DirectoryError::UnknownParticipant {
                participant: participant.clone(),
            }),
        }
    }
}
