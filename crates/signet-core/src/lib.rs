//! # signet-core — Shared Types for the Signet Stack
//!
//! Foundation types used across the workspace:
//!
//! - [`ParticipantId`] — validated network-wide participant identifier,
//!   the lookup key for directory resolution.
//! - [`Timestamp`] — UTC-only timestamp at seconds precision, used for
//!   certificate validity windows.
//!
//! This crate carries no cryptography and no I/O.

pub mod participant;
pub mod time;

// Re-export primary types.
pub use participant::{ParticipantId, ParticipantIdError, MAX_PARTICIPANT_ID_LEN};
pub use time::{Timestamp, TimestampError};
