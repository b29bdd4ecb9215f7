//! Envelope opening.

use std::io::{Cursor, Read};

use sha2::{Digest, Sha256};
use signet_core::ParticipantId;
use signet_credential::{Certificate, Identity};
use signet_crypto::{aead, AgreementPublicKey, Signature};

use crate::error::EnvelopeError;
use crate::format::{
    segment_nonce, session_key, signature_input, EnvelopeHeader, ENVELOPE_VERSION, KIND_DATA,
    KIND_TRAILER, MAGIC, MAX_HEADER_LEN, MAX_SEGMENT_CIPHERTEXT, MIN_SEGMENT_CIPHERTEXT,
    PREAMBLE_BASE,
};

/// An envelope whose preamble has been read and validated.
///
/// Opening is two-phase: [`EnvelopeReader::new`] consumes just enough of the
/// stream to learn the sender, so the caller can resolve the sender's
/// certificate before committing to [`EnvelopeReader::open`].
pub struct EnvelopeReader<R> {
    source: R,
    preamble: Vec<u8>,
    header: EnvelopeHeader,
}

impl<R: Read> EnvelopeReader<R> {
    /// Read and validate the preamble from `source`.
    pub fn new(mut source: R) -> Result<Self, EnvelopeError> {
        let mut magic = [0u8; 4];
        read_exact_or(&mut source, &mut magic, "the preamble")?;
        if &magic != MAGIC {
            return Err(EnvelopeError::malformed("not a signet envelope"));
        }
        let mut version = [0u8; 1];
        read_exact_or(&mut source, &mut version, "the preamble")?;
        if version[0] != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(version[0]));
        }
        let mut len_bytes = [0u8; 2];
        read_exact_or(&mut source, &mut len_bytes, "the preamble")?;
        let header_len = u16::from_le_bytes(len_bytes) as usize;
        if header_len > MAX_HEADER_LEN {
            return Err(EnvelopeError::malformed("header length out of bounds"));
        }
        let mut header_bytes = vec![0u8; header_len];
        read_exact_or(&mut source, &mut header_bytes, "the header")?;
        let header: EnvelopeHeader = bincode::deserialize(&header_bytes)
            .map_err(|e| EnvelopeError::malformed(format!("header does not decode: {e}")))?;

        let mut preamble = Vec::with_capacity(PREAMBLE_BASE + header_len);
        preamble.extend_from_slice(&magic);
        preamble.push(version[0]);
        preamble.extend_from_slice(&len_bytes);
        preamble.extend_from_slice(&header_bytes);
        Ok(Self {
            source,
            preamble,
            header,
        })
    }

    /// The sender reference carried in the header.
    ///
    /// Unauthenticated until [`EnvelopeReader::open`] succeeds; use it only
    /// to resolve the sender's certificate.
    pub fn sender(&self) -> &ParticipantId {
        &self.header.sender
    }

    /// Decrypt the remaining stream for `identity` and verify the enclosed
    /// signature against `sender_certificate`.
    ///
    /// The certificate must be the one resolved for [`EnvelopeReader::sender`];
    /// decrypted bytes are buffered and released only after the whole stream
    /// authenticates and the signature verifies.
    pub fn open(
        mut self,
        identity: &Identity,
        sender_certificate: &Certificate,
    ) -> Result<VerifiedPlaintext, EnvelopeError> {
        let ephemeral = AgreementPublicKey::from_bytes(self.header.ephemeral_public);
        let shared = identity.agree(&ephemeral);
        let key = session_key(&shared, &self.header.sender, identity.participant())?;

        let mut plaintext = Vec::new();
        let mut hasher = Sha256::new();
        let mut counter: u64 = 0;
        let signature = loop {
            let Some(kind) = read_kind(&mut self.source)? else {
                return Err(EnvelopeError::malformed(
                    "stream ends before the signature trailer",
                ));
            };
            let ciphertext = read_segment_body(&mut self.source)?;
            match kind {
                KIND_DATA => {
                    let nonce = segment_nonce(&self.header.nonce_seed, counter, false);
                    let segment = aead::open(&key, &nonce, &self.preamble, &ciphertext)
                        .map_err(|_| EnvelopeError::Authentication)?;
                    hasher.update(&segment);
                    plaintext.extend_from_slice(&segment);
                    counter += 1;
                }
                KIND_TRAILER => {
                    let nonce = segment_nonce(&self.header.nonce_seed, counter, true);
                    let sig_bytes = aead::open(&key, &nonce, &self.preamble, &ciphertext)
                        .map_err(|_| EnvelopeError::Authentication)?;
                    break Signature::from_slice(&sig_bytes).map_err(|_| {
                        EnvelopeError::Signature {
                            reason: "trailer does not carry a signature".to_string(),
                        }
                    })?;
                }
                other => {
                    return Err(EnvelopeError::malformed(format!(
                        "unknown segment kind 0x{other:02x}"
                    )))
                }
            }
        };

        if read_kind(&mut self.source)?.is_some() {
            return Err(EnvelopeError::malformed(
                "bytes after the signature trailer",
            ));
        }

        let digest: [u8; 32] = hasher.finalize().into();
        let message = signature_input(&self.header.sender, identity.participant(), &digest);
        sender_certificate
            .signing_key()
            .verify(&message, &signature)
            .map_err(|_| EnvelopeError::Signature {
                reason: "signature does not verify against the sender certificate".to_string(),
            })?;

        Ok(VerifiedPlaintext {
            sender: self.header.sender,
            cursor: Cursor::new(plaintext),
        })
    }
}

/// The decrypted, signature-verified message: a finite forward-only reader
/// that also reports the authenticated sender.
pub struct VerifiedPlaintext {
    sender: ParticipantId,
    cursor: Cursor<Vec<u8>>,
}

impl VerifiedPlaintext {
    /// The authenticated sender.
    pub fn sender(&self) -> &ParticipantId {
        &self.sender
    }

    /// Total message length in bytes.
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }
}

impl Read for VerifiedPlaintext {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl std::fmt::Debug for VerifiedPlaintext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedPlaintext")
            .field("sender", &self.sender)
            .field("len", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Stream helpers
// ---------------------------------------------------------------------------

/// Read a segment kind byte, or `None` at a clean end of stream.
fn read_kind<R: Read>(source: &mut R) -> Result<Option<u8>, EnvelopeError> {
    let mut byte = [0u8; 1];
    loop {
        match source.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

fn read_segment_body<R: Read>(source: &mut R) -> Result<Vec<u8>, EnvelopeError> {
    let mut len_bytes = [0u8; 4];
    read_exact_or(source, &mut len_bytes, "a segment length")?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    if !(MIN_SEGMENT_CIPHERTEXT..=MAX_SEGMENT_CIPHERTEXT).contains(&len) {
        return Err(EnvelopeError::malformed("segment length out of range"));
    }
    let mut ciphertext = vec![0u8; len];
    read_exact_or(source, &mut ciphertext, "a segment")?;
    Ok(ciphertext)
}

fn read_exact_or<R: Read>(
    source: &mut R,
    buf: &mut [u8],
    what: &str,
) -> Result<(), EnvelopeError> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            EnvelopeError::malformed(format!("stream ends inside {what}"))
        } else {
            e.into()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::Timestamp;

    use crate::format::MAX_SEGMENT_PLAINTEXT;
    use crate::seal::seal;

    fn identity(name: &str) -> Identity {
        Identity::generate(
            name.parse().unwrap(),
            Timestamp::parse("2020-01-01T00:00:00Z").unwrap(),
            Timestamp::parse("2099-01-01T00:00:00Z").unwrap(),
        )
        .unwrap()
    }

    fn sealed(sender: &Identity, recipient: &Identity, message: &[u8]) -> Vec<u8> {
        let mut sink = Vec::new();
        seal(sender, recipient.certificate(), &mut &message[..], &mut sink).unwrap();
        sink
    }

    fn open_all(
        envelope: &[u8],
        recipient: &Identity,
        sender_certificate: &Certificate,
    ) -> Result<(ParticipantId, Vec<u8>), EnvelopeError> {
        let reader = EnvelopeReader::new(envelope)?;
        let mut verified = reader.open(recipient, sender_certificate)?;
        let sender = verified.sender().clone();
        let mut bytes = Vec::new();
        verified.read_to_end(&mut bytes)?;
        Ok((sender, bytes))
    }

    /// Byte ranges of each segment (kind byte through ciphertext end).
    fn segment_ranges(envelope: &[u8]) -> Vec<std::ops::Range<usize>> {
        let header_len = u16::from_le_bytes([envelope[5], envelope[6]]) as usize;
        let mut at = PREAMBLE_BASE + header_len;
        let mut ranges = Vec::new();
        while at < envelope.len() {
            let len = u32::from_le_bytes([
                envelope[at + 1],
                envelope[at + 2],
                envelope[at + 3],
                envelope[at + 4],
            ]) as usize;
            ranges.push(at..at + 5 + len);
            at += 5 + len;
        }
        ranges
    }

    #[test]
    fn test_roundtrip() {
        let alice = identity("alice");
        let bob = identity("bob");
        let envelope = sealed(&alice, &bob, b"the quick brown fox");
        let (sender, bytes) = open_all(&envelope, &bob, alice.certificate()).unwrap();
        assert_eq!(sender.as_str(), "alice");
        assert_eq!(bytes, b"the quick brown fox");
    }

    #[test]
    fn test_roundtrip_empty_message() {
        let alice = identity("alice");
        let bob = identity("bob");
        let envelope = sealed(&alice, &bob, b"");
        let (_, bytes) = open_all(&envelope, &bob, alice.certificate()).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_roundtrip_multi_segment() {
        let alice = identity("alice");
        let bob = identity("bob");
        let message: Vec<u8> = (0..MAX_SEGMENT_PLAINTEXT + 5)
            .map(|i| (i % 251) as u8)
            .collect();
        let envelope = sealed(&alice, &bob, &message);
        let (_, bytes) = open_all(&envelope, &bob, alice.certificate()).unwrap();
        assert_eq!(bytes, message);
    }

    #[test]
    fn test_sender_known_before_open() {
        let alice = identity("alice");
        let bob = identity("bob");
        let envelope = sealed(&alice, &bob, b"hi");
        let reader = EnvelopeReader::new(&envelope[..]).unwrap();
        assert_eq!(reader.sender().as_str(), "alice");
    }

    #[test]
    fn test_wrong_recipient_fails_authentication() {
        let alice = identity("alice");
        let bob = identity("bob");
        let carol = identity("carol");
        let envelope = sealed(&alice, &bob, b"for bob only");
        assert!(matches!(
            open_all(&envelope, &carol, alice.certificate()),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_tampered_data_segment() {
        let alice = identity("alice");
        let bob = identity("bob");
        let mut envelope = sealed(&alice, &bob, b"payload");
        let ranges = segment_ranges(&envelope);
        envelope[ranges[0].start + 5] ^= 0x01;
        assert!(matches!(
            open_all(&envelope, &bob, alice.certificate()),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_tampered_sender_in_header() {
        let sender = identity("alicf");
        let bob = identity("bob");
        let mut envelope = sealed(&sender, &bob, b"payload");
        // Flip the last character of the sender id to another valid one; the
        // header still decodes but key derivation and AAD both change.
        let at = envelope.windows(5).position(|w| w == b"alicf").unwrap();
        envelope[at + 4] = b'e';
        assert!(matches!(
            open_all(&envelope, &bob, sender.certificate()),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_reordered_segments() {
        let alice = identity("alice");
        let bob = identity("bob");
        let message: Vec<u8> = (0..2 * MAX_SEGMENT_PLAINTEXT)
            .map(|i| (i % 251) as u8)
            .collect();
        let envelope = sealed(&alice, &bob, &message);
        let ranges = segment_ranges(&envelope);
        assert_eq!(ranges.len(), 3);

        let mut swapped = envelope[..ranges[0].start].to_vec();
        swapped.extend_from_slice(&envelope[ranges[1].clone()]);
        swapped.extend_from_slice(&envelope[ranges[0].clone()]);
        swapped.extend_from_slice(&envelope[ranges[2].clone()]);
        assert!(matches!(
            open_all(&swapped, &bob, alice.certificate()),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_dropped_segment() {
        let alice = identity("alice");
        let bob = identity("bob");
        let message: Vec<u8> = (0..2 * MAX_SEGMENT_PLAINTEXT)
            .map(|i| (i % 251) as u8)
            .collect();
        let envelope = sealed(&alice, &bob, &message);
        let ranges = segment_ranges(&envelope);

        let mut shortened = envelope[..ranges[0].start].to_vec();
        shortened.extend_from_slice(&envelope[ranges[1].clone()]);
        shortened.extend_from_slice(&envelope[ranges[2].clone()]);
        assert!(matches!(
            open_all(&shortened, &bob, alice.certificate()),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_flipped_kind_byte() {
        let alice = identity("alice");
        let bob = identity("bob");
        let mut envelope = sealed(&alice, &bob, b"payload");
        let ranges = segment_ranges(&envelope);
        // Retype the trailer as a data segment; the nonce no longer matches.
        envelope[ranges[1].start] = KIND_DATA;
        assert!(matches!(
            open_all(&envelope, &bob, alice.certificate()),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_truncated_before_trailer() {
        let alice = identity("alice");
        let bob = identity("bob");
        let envelope = sealed(&alice, &bob, b"payload");
        let ranges = segment_ranges(&envelope);
        let cut = &envelope[..ranges[1].start];
        assert!(matches!(
            open_all(cut, &bob, alice.certificate()),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_truncated_inside_segment() {
        let alice = identity("alice");
        let bob = identity("bob");
        let envelope = sealed(&alice, &bob, b"payload");
        let cut = &envelope[..envelope.len() - 3];
        assert!(matches!(
            open_all(cut, &bob, alice.certificate()),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_bytes_after_trailer() {
        let alice = identity("alice");
        let bob = identity("bob");
        let mut envelope = sealed(&alice, &bob, b"payload");
        envelope.push(0x00);
        assert!(matches!(
            open_all(&envelope, &bob, alice.certificate()),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unknown_segment_kind() {
        let alice = identity("alice");
        let bob = identity("bob");
        let mut envelope = sealed(&alice, &bob, b"payload");
        let ranges = segment_ranges(&envelope);
        envelope[ranges[0].start] = 0x7F;
        assert!(matches!(
            open_all(&envelope, &bob, alice.certificate()),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_segment_length_out_of_range() {
        let alice = identity("alice");
        let bob = identity("bob");
        let mut envelope = sealed(&alice, &bob, b"payload");
        let ranges = segment_ranges(&envelope);
        let len_at = ranges[0].start + 1;
        envelope[len_at..len_at + 4]
            .copy_from_slice(&(MAX_SEGMENT_CIPHERTEXT as u32 + 1).to_le_bytes());
        assert!(matches!(
            open_all(&envelope, &bob, alice.certificate()),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_bad_magic() {
        let alice = identity("alice");
        let bob = identity("bob");
        let mut envelope = sealed(&alice, &bob, b"payload");
        envelope[0] = b'X';
        assert!(matches!(
            EnvelopeReader::new(&envelope[..]),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let alice = identity("alice");
        let bob = identity("bob");
        let mut envelope = sealed(&alice, &bob, b"payload");
        envelope[4] = 0x02;
        assert!(matches!(
            EnvelopeReader::new(&envelope[..]),
            Err(EnvelopeError::UnsupportedVersion(0x02))
        ));
    }

    #[test]
    fn test_header_length_out_of_bounds() {
        let mut stream = Vec::new();
        stream.extend_from_slice(MAGIC);
        stream.push(ENVELOPE_VERSION);
        stream.extend_from_slice(&2048u16.to_le_bytes());
        stream.extend_from_slice(&[0u8; 2048]);
        assert!(matches!(
            EnvelopeReader::new(&stream[..]),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_wrong_sender_certificate_fails_signature() {
        let alice = identity("alice");
        let impostor = identity("alice");
        let bob = identity("bob");
        let envelope = sealed(&alice, &bob, b"payload");
        // Same participant id, different keys: decryption succeeds, the
        // signature check does not.
        assert!(matches!(
            open_all(&envelope, &bob, impostor.certificate()),
            Err(EnvelopeError::Signature { .. })
        ));
    }

    #[test]
    fn test_verified_plaintext_reader() {
        let alice = identity("alice");
        let bob = identity("bob");
        let envelope = sealed(&alice, &bob, b"abcdef");
        let reader = EnvelopeReader::new(&envelope[..]).unwrap();
        let mut verified = reader.open(&bob, alice.certificate()).unwrap();
        assert_eq!(verified.len(), 6);
        assert!(!verified.is_empty());

        let mut first = [0u8; 4];
        verified.read_exact(&mut first).unwrap();
        assert_eq!(&first, b"abcd");
        let mut rest = Vec::new();
        verified.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"ef");
    }
}
