//! # Participant Identifiers
//!
//! A [`ParticipantId`] names one participant network-wide and is the key
//! every directory lookup resolves. Identifiers are assigned by the network
//! operator, not generated here.
//!
//! ## Invariants
//!
//! - Non-empty, at most [`MAX_PARTICIPANT_ID_LEN`] bytes.
//! - ASCII letters, digits, `.`, `_`, and `-` only. The NUL byte can never
//!   occur, so `0x00` is a safe separator wherever identifiers are bound
//!   into key-derivation or signature inputs.
//! - Validated at every construction site, including deserialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Maximum length of a participant identifier in bytes.
pub const MAX_PARTICIPANT_ID_LEN: usize = 64;

/// Validation failure for a participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticipantIdError {
    #[error("participant identifier must not be empty")]
    Empty,

    #[error("participant identifier is {0} bytes, maximum is {MAX_PARTICIPANT_ID_LEN}")]
    TooLong(usize),

    #[error("participant identifier contains {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

/// An opaque, validated participant identifier.
///
/// Immutable and comparable; usable as a map key. Serializes as the plain
/// string; deserialization re-validates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create an identifier, validating length and character set.
    pub fn new(id: impl Into<String>) -> Result<Self, ParticipantIdError> {
        let id = id.into();
        validate(&id)?;
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ParticipantId {
    type Err = ParticipantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

fn validate(id: &str) -> Result<(), ParticipantIdError> {
    if id.is_empty() {
        return Err(ParticipantIdError::Empty);
    }
    if id.len() > MAX_PARTICIPANT_ID_LEN {
        return Err(ParticipantIdError::TooLong(id.len()));
    }
    for (position, character) in id.chars().enumerate() {
        let ok = character.is_ascii_alphanumeric() || matches!(character, '.' | '_' | '-');
        if !ok {
            return Err(ParticipantIdError::InvalidCharacter {
                character,
                position,
            });
        }
    }
    Ok(())
}
