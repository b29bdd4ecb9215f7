//! Network-backed directory.

use std::time::Duration;

use reqwest::StatusCode;
use signet_core::{ParticipantId, Timestamp};
use signet_credential::Certificate;
use url::Url;

use crate::error::{DirectoryError, EndpointError};
use crate::Directory;

/// A directory served by an HTTP endpoint.
///
/// Resolution issues `GET {base}/participants/{id}` and expects the
/// certificate as JSON. A 404 is a definitive "unknown participant"; every
/// transport failure, timeout, and unexpected response maps to the
/// retryable "unavailable". A certificate outside its validity window is
/// treated as not found.
///
/// The timeout bounds both connecting and the whole request, so a stalled
/// endpoint surfaces as unavailable instead of blocking the caller.
pub struct RemoteDirectory {
    base: Url,
    client: reqwest::blocking::Client,
}

impl RemoteDirectory {
    /// Point at `endpoint` with the given request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, EndpointError> {
        let base = Url::parse(endpoint)?;
        if base.cannot_be_a_base() {
            return Err(EndpointError::CannotBeABase);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { base, client })
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    fn participant_url(&self, participant: &ParticipantId) -> Result<Url, DirectoryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::Unavailable {
                reason: "endpoint cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["participants", participant.as_str()]);
        Ok(url)
    }

    fn unavailable(reason: impl Into<String>) -> DirectoryError {
        DirectoryError::Unavailable {
            reason: reason.into(),
        }
    }
}

impl Directory for RemoteDirectory {
    fn resolve(&self, participant: &ParticipantId) -> Result<Certificate, DirectoryError> {
        let url = self.participant_url(participant)?;
        tracing::debug!("querying remote directory: {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Self::unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::UnknownParticipant {
                participant: participant.clone(),
            });
        }
        if !status.is_success() {
            return Err(Self::unavailable(format!("endpoint returned {status}")));
        }

        let certificate: Certificate = response
            .json()
            .map_err(|e| Self::unavailable(format!("malformed response: {e}")))?;
        if certificate.subject() != participant {
            return Err(Self::unavailable(format!(
                "response subject '{}' does not match requested '{participant}'",
                certificate.subject()
            )));
        }
        if !certificate.is_valid_at(Timestamp::now()) {
            return Err(DirectoryError::UnknownParticipant {
                participant: participant.clone(),
            });
        }
        Ok(certificate)
    }
}
