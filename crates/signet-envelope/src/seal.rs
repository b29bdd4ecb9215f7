//! Envelope sealing.

use std::io::{Read, Write};

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use signet_credential::{Certificate, Identity};
use signet_crypto::{aead, EphemeralAgreement};

use crate::error::EnvelopeError;
use crate::format::{
    encode_preamble, segment_nonce, session_key, signature_input, EnvelopeHeader, KIND_DATA,
    KIND_TRAILER, MAX_SEGMENT_PLAINTEXT, NONCE_SEED_LEN,
};

/// Seal everything `source` yields into an envelope on `sink`.
///
/// The source is read exactly once, in segment-sized chunks, so memory use
/// stays constant regardless of message size. On error the sink may hold a
/// partial envelope; callers that need all-or-nothing output should write
/// through a temporary file.
pub fn seal<R: Read, W: Write>(
    identity: &Identity,
    recipient: &Certificate,
    source: &mut R,
    sink: &mut W,
) -> Result<(), EnvelopeError> {
    let ephemeral = EphemeralAgreement::generate();
    let mut nonce_seed = [0u8; NONCE_SEED_LEN];
    OsRng.fill_bytes(&mut nonce_seed);

    let header = EnvelopeHeader {
        sender: identity.participant().clone(),
        ephemeral_public: *ephemeral.public().as_bytes(),
        nonce_seed,
    };
    let preamble = encode_preamble(&header)?;
    sink.write_all(&preamble)?;

    let shared = ephemeral.agree(recipient.agreement_key());
    let key = session_key(&shared, identity.participant(), recipient.subject())?;

    let mut hasher = Sha256::new();
    let mut counter: u64 = 0;
    let mut chunk = vec![0u8; MAX_SEGMENT_PLAINTEXT];
    loop {
        let filled = read_full(source, &mut chunk)?;
        if filled == 0 {
            break;
        }
        let plaintext = &chunk[..filled];
        hasher.update(plaintext);
        let nonce = segment_nonce(&nonce_seed, counter, false);
        let ciphertext = aead::seal(&key, &nonce, &preamble, plaintext)?;
        write_segment(sink, KIND_DATA, &ciphertext)?;
        counter += 1;
    }

    let digest: [u8; 32] = hasher.finalize().into();
    let message = signature_input(identity.participant(), recipient.subject(), &digest);
    let signature = identity.sign(&message);
    let nonce = segment_nonce(&nonce_seed, counter, true);
    let ciphertext = aead::seal(&key, &nonce, &preamble, signature.as_bytes())?;
    write_segment(sink, KIND_TRAILER, &ciphertext)?;
    sink.flush()?;
    Ok(())
}

fn write_segment<W: Write>(sink: &mut W, kind: u8, ciphertext: &[u8]) -> Result<(), EnvelopeError> {
    sink.write_all(&[kind])?;
    sink.write_all(&(ciphertext.len() as u32).to_le_bytes())?;
    sink.write_all(ciphertext)?;
    Ok(())
}

/// Read until `buf` is full or the source is exhausted.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
