//! # Signet Directory
//!
//! Resolution of participant identifiers to their current certificates.
//!
//! The [`Directory`] trait is the single seam: a backend answers
//! `resolve(id)` with a certificate, a definitive "unknown participant", or
//! a retryable "unavailable". Backends provided here:
//!
//! - [`TrustDirectory`] — the closed set of certificates held in a keystore.
//! - [`RemoteDirectory`] — an HTTPS endpoint queried per resolution.
//! - [`CompositeDirectory`] — ordered fallback over other backends.
//! - [`CachedDirectory`] — a bounded-time cache over any backend.
//!
//! Backends are composed, never merged: a composite consults one backend at
//! a time and the first definitive answer wins.

pub mod cache;
pub mod composite;
pub mod error;
pub mod remote;
pub mod trust;

use signet_core::ParticipantId;
use signet_credential::Certificate;

pub use cache::CachedDirectory;
pub use composite::CompositeDirectory;
pub use error::{DirectoryError, EndpointError};
pub use remote::RemoteDirectory;
pub use trust::TrustDirectory;

/// A participant directory: identifier in, certificate out.
///
/// Implementations must be safe for concurrent resolution; a resolved
/// certificate is a snapshot and carries no liveness guarantee beyond its
/// validity window.
pub trait Directory: Send + Sync {
    /// Resolve `participant` to its current certificate.
    fn resolve(&self, participant: &ParticipantId) -> Result<Certificate, DirectoryError>;
}

impl<D: Directory + ?Sized> Directory for Box<D> {
    fn resolve(&self, participant: &ParticipantId) -> Result<Certificate, DirectoryError> {
        (**self).resolve(participant)
    }
}

impl<D: Directory + ?Sized> Directory for std::sync::Arc<D> {
    fn resolve(&self, participant: &ParticipantId) -> Result<Certificate, DirectoryError> {
        (**self).resolve(participant)
    }
}
