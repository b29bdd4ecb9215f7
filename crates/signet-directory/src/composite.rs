//! Ordered-fallback composition of directory backends.

use signet_core::ParticipantId;
use signet_credential::Certificate;

use crate::error::DirectoryError;
use crate::Directory;

/// Consults backends in priority order; the first resolved certificate wins.
///
/// The fold over per-backend outcomes:
///
/// - a success returns immediately, later backends are never consulted;
/// - "unknown participant" is remembered and the next backend is tried;
/// - "unavailable" is remembered and the next backend is tried.
///
/// When every backend has failed, the composite reports unknown if at least
/// one backend answered definitively, otherwise the last unavailability. An
/// empty composite resolves nothing and reports unavailable.
pub struct CompositeDirectory {
    backends: Vec<Box<dyn Directory>>,
}

impl CompositeDirectory {
    /// Compose `backends` in priority order, highest priority first.
    pub fn new(backends: Vec<Box<dyn Directory>>) -> Self {
        Self { backends }
    }

    /// Append a backend at the lowest priority.
    pub fn push(&mut self, backend: Box<dyn Directory>) {
        self.backends.push(backend);
    }

    /// Number of composed backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Directory for CompositeDirectory {
    fn resolve(&self, participant: &ParticipantId) -> Result<Certificate, DirectoryError> {
        let mut saw_not_found = false;
        let mut last_unavailable = None;
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.resolve(participant) {
                Ok(certificate) => {
                    tracing::debug!("resolved '{participant}' via backend {index}");
                    return Ok(certificate);
                }
                Err(DirectoryError::UnknownParticipant { .. }) => {
                    tracing::debug!("backend {index} does not know '{participant}'");
                    saw_not_found = true;
                }
                Err(err @ DirectoryError::Unavailable { .. }) => {
                    tracing::debug!("backend {index} unavailable for '{participant}': {err}");
                    last_unavailable = Some(err);
                }
            }
        }
        if saw_not_found {
            Err(DirectoryError::UnknownParticipant {
                participant: participant.clone(),
            })
        } else {
            Err(last_unavailable.unwrap_or_else(|| DirectoryError::Unavailable {
                reason: "no directory backends configured".to_string(),
            }))
        }
    }
}
