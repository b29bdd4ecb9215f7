//! # signet-cli — command line for the signet messaging stack
//!
//! Provides the `signet` binary. One invocation processes one message:
//!
//! ```bash
//! # seal: sign a file and encrypt it for a recipient
//! signet --recipient bob --source letter.txt --sink letter.sgnv \
//!     --keystore alice.sgks --store-pass secret --alias main
//!
//! # open: decrypt a received envelope and verify its sender
//! signet --source letter.sgnv --sink letter.txt \
//!     --keystore bob.sgks --store-pass secret --alias main
//! ```
//!
//! The presence of `--recipient` selects the seal direction. Peers are
//! resolved through the keystore's trusted certificates, optionally falling
//! back to a remote directory endpoint given with `--remote`.
//!
//! The sink is written through a temporary file in its own directory and
//! persisted only when the operation succeeds, so a failed run never leaves
//! a partial output file behind.

pub mod message;

pub use message::{run_message, MessageArgs};
