//! Wire constants and derivation helpers for envelope format v1.

use serde::{Deserialize, Serialize};
use signet_core::ParticipantId;
use signet_crypto::kdf::expand_key;
use signet_crypto::{AeadKey, CryptoError, SessionSecret, AEAD_NONCE_SIZE, AEAD_TAG_SIZE};

use crate::error::EnvelopeError;

pub(crate) const MAGIC: &[u8; 4] = b"SGNV";

/// Envelope format version written and accepted by this build.
pub const ENVELOPE_VERSION: u8 = 0x01;

/// Maximum plaintext bytes per data segment.
pub const MAX_SEGMENT_PLAINTEXT: usize = 64 * 1024;

/// Magic, version byte, and u16 header length.
pub(crate) const PREAMBLE_BASE: usize = 7;

/// Upper bound on the bincode header; anything larger is rejected unread.
pub(crate) const MAX_HEADER_LEN: usize = 1024;

pub(crate) const MIN_SEGMENT_CIPHERTEXT: usize = AEAD_TAG_SIZE;
pub(crate) const MAX_SEGMENT_CIPHERTEXT: usize = MAX_SEGMENT_PLAINTEXT + AEAD_TAG_SIZE;

pub(crate) const KIND_DATA: u8 = 0x00;
pub(crate) const KIND_TRAILER: u8 = 0x01;

/// Set on the nonce counter of the signature trailer.
pub(crate) const FINAL_FLAG: u64 = 1 << 63;

pub(crate) const NONCE_SEED_LEN: usize = 16;

const KEY_LABEL: &[u8] = b"signet/envelope/v1/key";
const SIG_LABEL: &[u8] = b"signet/envelope/v1/sig";

/// The bincode-encoded part of the preamble.
#[derive(Serialize, Deserialize)]
pub(crate) struct EnvelopeHeader {
    pub sender: ParticipantId,
    pub ephemeral_public: [u8; 32],
    pub nonce_seed: [u8; NONCE_SEED_LEN],
}

/// Encode the full preamble: magic, version, header length, header.
pub(crate) fn encode_preamble(header: &EnvelopeHeader) -> Result<Vec<u8>, EnvelopeError> {
    let header_bytes = bincode::serialize(header)
        .map_err(|e| EnvelopeError::malformed(format!("header does not encode: {e}")))?;
    if header_bytes.len() > MAX_HEADER_LEN {
        return Err(EnvelopeError::malformed("header exceeds format bounds"));
    }
    let mut preamble = Vec::with_capacity(PREAMBLE_BASE + header_bytes.len());
    preamble.extend_from_slice(MAGIC);
    preamble.push(ENVELOPE_VERSION);
    preamble.extend_from_slice(&(header_bytes.len() as u16).to_le_bytes());
    preamble.extend_from_slice(&header_bytes);
    Ok(preamble)
}

/// The nonce of segment `counter`: seed, then the counter big-endian, with
/// the top bit marking the signature trailer.
pub(crate) fn segment_nonce(
    seed: &[u8; NONCE_SEED_LEN],
    counter: u64,
    is_trailer: bool,
) -> [u8; AEAD_NONCE_SIZE] {
    let counter = if is_trailer {
        counter | FINAL_FLAG
    } else {
        counter
    };
    let mut nonce = [0u8; AEAD_NONCE_SIZE];
    nonce[..NONCE_SEED_LEN].copy_from_slice(seed);
    nonce[NONCE_SEED_LEN..].copy_from_slice(&counter.to_be_bytes());
    nonce
}

/// Derive the session key from the agreement output, bound to both ends.
pub(crate) fn session_key(
    shared: &SessionSecret,
    sender: &ParticipantId,
    recipient: &ParticipantId,
) -> Result<AeadKey, CryptoError> {
    let mut info = Vec::with_capacity(sender.as_str().len() + recipient.as_str().len() + 1);
    info.extend_from_slice(sender.as_str().as_bytes());
    info.push(0x00);
    info.extend_from_slice(recipient.as_str().as_bytes());
    expand_key(shared.as_bytes(), KEY_LABEL, &info)
}

/// The byte string the trailer signature covers.
pub(crate) fn signature_input(
    sender: &ParticipantId,
    recipient: &ParticipantId,
    plaintext_digest: &[u8; 32],
) -> Vec<u8> {
    let mut input = Vec::with_capacity(
        SIG_LABEL.len() + sender.as_str().len() + recipient.as_str().len() + 32 + 3,
    );
    input.extend_from_slice(SIG_LABEL);
    input.push(0x00);
    input.extend_from_slice(sender.as_str().as_bytes());
    input.push(0x00);
    input.extend_from_slice(recipient.as_str().as_bytes());
    input.push(0x00);
    input.extend_from_slice(plaintext_digest);
    input
}
