//! On-disk keystore format, version 1.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "SGKS"
//! 4       1     format version (0x01)
//! 5       2     header length H, u16 little-endian
//! 7       H     bincode header { kdf, salt, nonce }
//! 7+H     rest  XChaCha20-Poly1305 ciphertext of the bincode contents
//! ```
//!
//! The bytes `0..7+H` are the associated data of the ciphertext, so the
//! preamble cannot be altered without failing the open. Decoding validates in
//! stages: length, magic, version, header, AEAD open, contents.

use std::collections::BTreeMap;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use signet_credential::Certificate;
use signet_crypto::aead;
use signet_crypto::kdf::{derive_key, KdfParams};
use signet_crypto::AEAD_NONCE_SIZE;

use crate::error::KeystoreError;
use crate::store::KeyEntry;

pub(crate) const MAGIC: &[u8; 4] = b"SGKS";
pub(crate) const VERSION: u8 = 0x01;

/// Magic, version byte, and u16 header length.
const PREAMBLE_LEN: usize = 7;

const STORE_SALT_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
pub(crate) struct FileHeader {
    pub kdf: KdfParams,
    pub salt: [u8; STORE_SALT_LEN],
    pub nonce: [u8; AEAD_NONCE_SIZE],
}

#[derive(Serialize, Deserialize)]
pub(crate) struct FileContents {
    pub entries: BTreeMap<String, KeyEntry>,
    pub trusted: Vec<Certificate>,
}

fn malformed(reason: impl Into<String>) -> KeystoreError {
    KeystoreError::Malformed {
        reason: reason.into(),
    }
}

/// Serialize and seal `contents` under `password`, with fresh salt and nonce.
pub(crate) fn encode(
    contents: &FileContents,
    params: KdfParams,
    password: &str,
) -> Result<Vec<u8>, KeystoreError> {
    let mut salt = [0u8; STORE_SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; AEAD_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let header = FileHeader {
        kdf: params,
        salt,
        nonce,
    };
    let header_bytes = bincode::serialize(&header)?;
    let header_len = u16::try_from(header_bytes.len())
        .map_err(|_| malformed("header exceeds format bounds"))?;

    let mut out = Vec::with_capacity(PREAMBLE_LEN + header_bytes.len());
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_bytes);

    let key = derive_key(password.as_bytes(), &salt, &params)?;
    let body = bincode::serialize(contents)?;
    let ciphertext = aead::seal(&key, &nonce, &out, &body)?;
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open a serialized store, validating in stages.
pub(crate) fn decode(
    data: &[u8],
    password: &str,
) -> Result<(FileContents, KdfParams), KeystoreError> {
    if data.len() < PREAMBLE_LEN {
        return Err(malformed("file too short"));
    }
    if &data[0..4] != MAGIC {
        return Err(malformed("not a signet keystore"));
    }
    if data[4] != VERSION {
        return Err(KeystoreError::UnsupportedVersion(data[4]));
    }
    let header_len = u16::from_le_bytes([data[5], data[6]]) as usize;
    let body_start = PREAMBLE_LEN + header_len;
    if data.len() < body_start {
        return Err(malformed("truncated header"));
    }
    let header: FileHeader = bincode::deserialize(&data[PREAMBLE_LEN..body_start])
        .map_err(|e| malformed(format!("header does not decode: {e}")))?;

    let key = derive_key(password.as_bytes(), &header.salt, &header.kdf)?;
    let body = aead::open(&key, &header.nonce, &data[..body_start], &data[body_start..])
        .map_err(|_| KeystoreError::WrongStorePassword)?;
    let contents: FileContents =
        bincode::deserialize(&body).map_err(|e| malformed(format!("contents do not decode: {e}")))?;
    Ok((contents, header.kdf))
}
