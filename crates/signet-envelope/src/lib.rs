//! # Signet Envelope
//!
//! The wire codec: a sealed envelope is a signed-then-encrypted message from
//! one participant to exactly one recipient, carried as an opaque byte
//! stream.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "SGNV"
//! 4       1     format version (0x01)
//! 5       2     header length H, u16 little-endian
//! 7       H     bincode header { sender, ephemeral_public, nonce_seed }
//! then segments until end of stream:
//!         1     segment kind: 0x00 data, 0x01 signature trailer
//!         4     ciphertext length, u32 little-endian
//!         ...   XChaCha20-Poly1305 ciphertext
//! ```
//!
//! Data segments carry up to 64 KiB of plaintext each, so sealing runs in
//! constant memory over sources of any size. The final segment is the
//! signature trailer: the sender's Ed25519 signature over a digest of the
//! whole plaintext, bound to both participant identifiers.
//!
//! ## Security Invariants
//!
//! - The preamble is associated data of every segment; altering it breaks
//!   every segment's authentication.
//! - Segment nonces encode the segment's position and kind, so segments
//!   cannot be reordered, duplicated, dropped, or re-typed undetected.
//! - The session key binds both participant identifiers; an envelope cannot
//!   be re-targeted at another recipient, and the enclosed signature repeats
//!   the binding.
//! - Opening releases no plaintext before the whole stream is decrypted and
//!   the signature verified.

pub mod error;
pub mod format;
pub mod open;
pub mod seal;

pub use error::EnvelopeError;
pub use format::{ENVELOPE_VERSION, MAX_SEGMENT_PLAINTEXT};
pub use open::{EnvelopeReader, VerifiedPlaintext};
pub use seal::seal;
