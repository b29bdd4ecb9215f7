//! Directory error types.

use signet_core::ParticipantId;

/// Outcome of a failed resolution.
///
/// The two variants are deliberately distinct: `UnknownParticipant` is a
/// definitive answer that retrying will not change, `Unavailable` is a
/// transient backend condition worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// No backend knows this participant.
    #[error("unknown participant '{participant}'")]
    UnknownParticipant { participant: ParticipantId },

    /// A backend that might know the participant could not be reached.
    #[error("directory unavailable: {reason}")]
    Unavailable { reason: String },
}

impl DirectoryError {
    /// Whether retrying the same resolution can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Errors constructing a remote directory endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The endpoint string is not a URL.
    #[error("invalid directory endpoint: {0}")]
    Parse(#[from] url::ParseError),

    /// The URL cannot carry path segments (e.g. `mailto:`).
    #[error("directory endpoint cannot be a base URL")]
    CannotBeABase,

    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
