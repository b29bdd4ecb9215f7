//! Bounded-time caching wrapper.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use signet_core::{ParticipantId, Timestamp};
use signet_credential::Certificate;

use crate::error::DirectoryError;
use crate::Directory;

struct CachedCertificate {
    certificate: Certificate,
    fetched_at: Instant,
}

/// A TTL cache over another backend.
///
/// A hit is served only while its TTL has not elapsed and the certificate is
/// still inside its validity window; both are re-checked on every hit, so a
/// certificate that expired while cached is never handed out. Failures are
/// never cached: a miss always reaches the inner backend, and only a
/// successful resolution replaces a stale slot.
pub struct CachedDirectory<D> {
    inner: D,
    ttl: Duration,
    entries: RwLock<HashMap<ParticipantId, CachedCertificate>>,
}

impl<D: Directory> CachedDirectory<D> {
    /// Wrap `inner` with a cache holding certificates for up to `ttl`.
    pub fn new(inner: D, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<D: Directory> Directory for CachedDirectory<D> {
    fn resolve(&self, participant: &ParticipantId) -> Result<Certificate, DirectoryError> {
        let now = Timestamp::now();
        {
            let entries = self.entries.read();
            if let Some(slot) = entries.get(participant) {
                if slot.fetched_at.elapsed() < self.ttl && slot.certificate.is_valid_at(now) {
                    return Ok(slot.certificate.clone());
                }
            }
        }
        let certificate = self.inner.resolve(participant)?;
        self.entries.write().insert(
            participant.clone(),
            CachedCertificate {
                certificate: certificate.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(certificate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use signet_credential::Identity;

    fn valid_certificate(name: &str) -> Certificate {
        Identity::generate(
            name.parse().unwrap(),
            Timestamp::parse("2020-01-01T00:00:00Z").unwrap(),
            Timestamp::parse("2099-01-01T00:00:00Z").unwrap(),
        )
        .unwrap()
        .certificate()
        .clone()
    }

    fn expired_certificate(name: &str) -> Certificate {
        Identity::generate(
            name.parse().unwrap(),
            Timestamp::parse("2000-01-01T00:00:00Z").unwrap(),
            Timestamp::parse("2001-01-01T00:00:00Z").unwrap(),
        )
        .unwrap()
        .certificate()
        .clone()
    }

    /// Backend that counts calls and can be scripted to fail first.
    struct Counting {
        certificate: Certificate,
        fail_first: AtomicUsize,
        calls: Arc<AtomicUsize>,
    }

    impl Counting {
        fn new(certificate: Certificate, fail_first: usize) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    certificate,
                    fail_first: AtomicUsize::new(fail_first),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl Directory for Counting {
        fn resolve(&self, _participant: &ParticipantId) -> Result<Certificate, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self
                .fail_first
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(DirectoryError::Unavailable {
                    reason: "scripted outage".to_string(),
                });
            }
            Ok(self.certificate.clone())
        }
    }

    #[test]
    fn test_second_hit_served_from_cache() {
        let (inner, calls) = Counting::new(valid_certificate("alice"), 0);
        let cached = CachedDirectory::new(inner, Duration::from_secs(300));
        let id = "alice".parse().unwrap();

        cached.resolve(&id).unwrap();
        cached.resolve(&id).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_ttl_always_misses() {
        let (inner, calls) = Counting::new(valid_certificate("alice"), 0);
        let cached = CachedDirectory::new(inner, Duration::ZERO);
        let id = "alice".parse().unwrap();

        cached.resolve(&id).unwrap();
        cached.resolve(&id).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failures_not_cached() {
        let (inner, calls) = Counting::new(valid_certificate("alice"), 1);
        let cached = CachedDirectory::new(inner, Duration::from_secs(300));
        let id = "alice".parse().unwrap();

        assert!(cached.resolve(&id).is_err());
        assert!(cached.resolve(&id).is_ok());
        assert!(cached.resolve(&id).is_ok());
        // First call failed, second resolved, third was a cache hit.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expired_certificate_never_served_from_cache() {
        let (inner, calls) = Counting::new(expired_certificate("alice"), 0);
        let cached = CachedDirectory::new(inner, Duration::from_secs(300));
        let id = "alice".parse().unwrap();

        // The fake hands out an expired certificate; the cache stores it but
        // must re-check validity and fall through on the next hit.
        cached.resolve(&id).unwrap();
        cached.resolve(&id).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_resolution() {
        let (inner, _) = Counting::new(valid_certificate("alice"), 0);
        let cached = CachedDirectory::new(inner, Duration::from_secs(300));
        let id: ParticipantId = "alice".parse().unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..16 {
                        assert!(cached.resolve(&id).is_ok());
                    }
                });
            }
        });
    }
}
