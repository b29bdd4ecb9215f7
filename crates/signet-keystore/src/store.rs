//! In-memory keystore and its entry model.

use std::collections::BTreeMap;
use std::path::Path;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use signet_core::{ParticipantId, Timestamp};
use signet_credential::{Certificate, CertificateChain, CertificateError, Identity};
use signet_crypto::aead;
use signet_crypto::kdf::{derive_key, KdfParams};
use signet_crypto::{AgreementSecret, SigningKeyPair, AEAD_NONCE_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::KeystoreError;
use crate::file::{self, FileContents};

const SEED_LEN: usize = 32;
const ENTRY_SALT_LEN: usize = 32;

/// Private seed material of a key entry.
///
/// `Plain` seeds are protected only by the store password; `Protected` seeds
/// carry an inner AEAD box under a per-entry password, with the entry alias
/// as associated data so a sealed box cannot be moved between aliases.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub(crate) enum SeedMaterial {
    Plain {
        signing_seed: [u8; SEED_LEN],
        agreement_seed: [u8; SEED_LEN],
    },
    Protected {
        #[zeroize(skip)]
        kdf: KdfParams,
        salt: [u8; ENTRY_SALT_LEN],
        nonce: [u8; AEAD_NONCE_SIZE],
        sealed: Vec<u8>,
    },
}

/// A named key entry: who it belongs to, its seeds, and the chain proving
/// the matching public keys.
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct KeyEntry {
    pub participant: ParticipantId,
    pub material: SeedMaterial,
    pub chain: CertificateChain,
}

/// A credential store: own key entries by alias plus trusted certificates.
///
/// Mutations act on the in-memory store; nothing touches disk until
/// [`Keystore::save`].
pub struct Keystore {
    entries: BTreeMap<String, KeyEntry>,
    trusted: Vec<Certificate>,
    params: KdfParams,
}

impl Keystore {
    /// An empty store with default Argon2id parameters.
    pub fn new() -> Self {
        Self::with_kdf_params(KdfParams::default())
    }

    /// An empty store with explicit Argon2id parameters.
    pub fn with_kdf_params(params: KdfParams) -> Self {
        Self {
            entries: BTreeMap::new(),
            trusted: Vec::new(),
            params,
        }
    }

    /// Load a store from `path`, unsealing it with `store_password`.
    pub fn open(path: &Path, store_password: &str) -> Result<Self, KeystoreError> {
        let data = std::fs::read(path)?;
        let (contents, params) = file::decode(&data, store_password)?;
        Ok(Self {
            entries: contents.entries,
            trusted: contents.trusted,
            params,
        })
    }

    /// Seal the store under `store_password` and write it to `path`.
    ///
    /// The store salt and nonce are re-randomized on every save.
    pub fn save(&self, path: &Path, store_password: &str) -> Result<(), KeystoreError> {
        let contents = FileContents {
            entries: self.entries.clone(),
            trusted: self.trusted.clone(),
        };
        let data = file::encode(&contents, self.params, store_password)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// The Argon2id parameters used when sealing this store.
    pub fn kdf_params(&self) -> KdfParams {
        self.params
    }

    /// Aliases of all key entries, in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether a key entry exists under `alias`.
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Add a certificate to the trusted set.
    pub fn add_trusted_certificate(&mut self, certificate: Certificate) {
        self.trusted.push(certificate);
    }

    /// Certificates this store can vouch for: the trusted set plus the leaf
    /// certificate of every key entry, so a store resolves its own subjects.
    pub fn resolvable_certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.trusted
            .iter()
            .chain(self.entries.values().map(|e| e.chain.leaf()))
    }

    /// Insert a key entry from explicit seeds, replacing any entry under the
    /// same alias. The seeds must match the chain's leaf certificate.
    pub fn insert_key(
        &mut self,
        alias: &str,
        signing_seed: &[u8; SEED_LEN],
        agreement_seed: &[u8; SEED_LEN],
        chain: CertificateChain,
        key_password: Option<&str>,
    ) -> Result<(), KeystoreError> {
        let leaf = chain.leaf();
        let signing_public = SigningKeyPair::from_seed(signing_seed).public();
        let agreement_public = AgreementSecret::from_seed(agreement_seed).public();
        if signing_public != *leaf.signing_key() || agreement_public != *leaf.agreement_key() {
            return Err(CertificateError::KeyMismatch {
                subject: leaf.subject().clone(),
            }
            .into());
        }
        let material = match key_password {
            None => SeedMaterial::Plain {
                signing_seed: *signing_seed,
                agreement_seed: *agreement_seed,
            },
            Some(password) => {
                seal_seeds(alias, signing_seed, agreement_seed, password, self.params)?
            }
        };
        let entry = KeyEntry {
            participant: leaf.subject().clone(),
            material,
            chain,
        };
        self.entries.insert(alias.to_string(), entry);
        Ok(())
    }

    /// Generate a fresh key pair and unrestricted single-certificate chain
    /// for `participant`, store it under `alias`, and return the
    /// materialized identity.
    pub fn generate_identity(
        &mut self,
        alias: &str,
        participant: ParticipantId,
        not_before: Timestamp,
        not_after: Timestamp,
        key_password: Option<&str>,
    ) -> Result<Identity, KeystoreError> {
        let mut signing_seed = Zeroizing::new([0u8; SEED_LEN]);
        OsRng.fill_bytes(signing_seed.as_mut());
        let mut agreement_seed = Zeroizing::new([0u8; SEED_LEN]);
        OsRng.fill_bytes(agreement_seed.as_mut());

        let signing = SigningKeyPair::from_seed(&signing_seed);
        let agreement = AgreementSecret::from_seed(&agreement_seed);
        let leaf = Certificate::new(
            participant,
            signing.public(),
            agreement.public(),
            vec![],
            not_before,
            not_after,
        )?;
        let chain = CertificateChain::single(leaf);
        self.insert_key(
            alias,
            &signing_seed,
            &agreement_seed,
            chain.clone(),
            key_password,
        )?;
        Ok(Identity::new(signing, agreement, chain)?)
    }

    /// Materialize the identity stored under `alias`.
    ///
    /// A password supplied for an unprotected entry is ignored; a protected
    /// entry without a password fails with
    /// [`KeystoreError::KeyPasswordRequired`].
    pub fn identity(
        &self,
        alias: &str,
        key_password: Option<&str>,
    ) -> Result<Identity, KeystoreError> {
        let entry = self
            .entries
            .get(alias)
            .ok_or_else(|| KeystoreError::UnknownAlias {
                alias: alias.to_string(),
            })?;
        let (signing_seed, agreement_seed) = match &entry.material {
            SeedMaterial::Plain {
                signing_seed,
                agreement_seed,
            } => (
                Zeroizing::new(*signing_seed),
                Zeroizing::new(*agreement_seed),
            ),
            SeedMaterial::Protected {
                kdf,
                salt,
                nonce,
                sealed,
            } => {
                let password = key_password.ok_or_else(|| KeystoreError::KeyPasswordRequired {
                    alias: alias.to_string(),
                })?;
                open_seeds(alias, password, kdf, salt, nonce, sealed)?
            }
        };
        let signing = SigningKeyPair::from_seed(&signing_seed);
        let agreement = AgreementSecret::from_seed(&agreement_seed);
        Ok(Identity::new(signing, agreement, entry.chain.clone())?)
    }
}

impl Default for Keystore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Keystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystore")
            .field("entries", &self.entries.len())
            .field("trusted", &self.trusted.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Per-entry seed sealing
// ---------------------------------------------------------------------------

fn seal_seeds(
    alias: &str,
    signing_seed: &[u8; SEED_LEN],
    agreement_seed: &[u8; SEED_LEN],
    password: &str,
    params: KdfParams,
) -> Result<SeedMaterial, KeystoreError> {
    let mut salt = [0u8; ENTRY_SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; AEAD_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(password.as_bytes(), &salt, &params)?;
    let mut plain = Zeroizing::new([0u8; SEED_LEN * 2]);
    plain[..SEED_LEN].copy_from_slice(signing_seed);
    plain[SEED_LEN..].copy_from_slice(agreement_seed);
    let sealed = aead::seal(&key, &nonce, alias.as_bytes(), plain.as_ref())?;
    Ok(SeedMaterial::Protected {
        kdf: params,
        salt,
        nonce,
        sealed,
    })
}

fn open_seeds(
    alias: &str,
    password: &str,
    kdf: &KdfParams,
    salt: &[u8; ENTRY_SALT_LEN],
    nonce: &[u8; AEAD_NONCE_SIZE],
    sealed: &[u8],
) -> Result<(Zeroizing<[u8; SEED_LEN]>, Zeroizing<[u8; SEED_LEN]>), KeystoreError> {
    let key = derive_key(password.as_bytes(), salt, kdf)?;
    let plain = Zeroizing::new(
        aead::open(&key, nonce, alias.as_bytes(), sealed).map_err(|_| {
            KeystoreError::WrongKeyPassword {
                alias: alias.to_string(),
            }
        })?,
    );
    if plain.len() != SEED_LEN * 2 {
        return Err(KeystoreError::Malformed {
            reason: format!("key entry '{alias}' has invalid seed material"),
        });
    }
    let mut signing_seed = Zeroizing::new([0u8; SEED_LEN]);
    signing_seed.copy_from_slice(&plain[..SEED_LEN]);
    let mut agreement_seed = Zeroizing::new([0u8; SEED_LEN]);
    agreement_seed.copy_from_slice(&plain[SEED_LEN..]);
    Ok((signing_seed, agreement_seed))
}
