//! Keystore error types.

use signet_credential::CertificateError;
use signet_crypto::CryptoError;

/// Errors raised while loading, saving, and querying a keystore.
#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    /// Reading or writing the store file failed.
    #[error("keystore io: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not parse as a keystore.
    #[error("keystore file is malformed: {reason}")]
    Malformed { reason: String },

    /// The file declares a format version this build does not read.
    #[error("unsupported keystore version {0}")]
    UnsupportedVersion(u8),

    /// The store could not be decrypted. Indistinguishable from a corrupted
    /// or tampered file.
    #[error("keystore could not be opened: wrong password or corrupted store")]
    WrongStorePassword,

    /// No key entry exists under the requested alias.
    #[error("no key entry for alias '{alias}'")]
    UnknownAlias { alias: String },

    /// The entry is sealed under its own password and none was supplied.
    #[error("key entry '{alias}' requires a key password")]
    KeyPasswordRequired { alias: String },

    /// The supplied per-entry password failed to open the entry.
    #[error("wrong password for key entry '{alias}'")]
    WrongKeyPassword { alias: String },

    /// Store contents failed to serialize.
    #[error("keystore serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Certificate(#[from] CertificateError),
}
