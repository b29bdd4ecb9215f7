//! Certificate chains.

use serde::{Deserialize, Serialize};

use crate::certificate::Certificate;
use crate::error::CertificateError;

/// An ordered list of certificates, leaf first.
///
/// The leaf is the end-entity certificate whose keys the subject actually
/// holds; any further certificates describe the parties that vouched for it.
/// A chain always contains at least the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateChain {
    certificates: Vec<Certificate>,
}

impl CertificateChain {
    /// Build a chain from leaf-first certificates.
    pub fn new(certificates: Vec<Certificate>) -> Result<Self, CertificateError> {
        if certificates.is_empty() {
            return Err(CertificateError::EmptyChain);
        }
        Ok(Self { certificates })
    }

    /// A chain holding a single leaf certificate.
    pub fn single(leaf: Certificate) -> Self {
        Self {
            certificates: vec![leaf],
        }
    }

    /// The end-entity certificate.
    pub fn leaf(&self) -> &Certificate {
        // new() and single() both guarantee a non-empty vector.
        &self.certificates[0]
    }

    /// All certificates, leaf first.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Number of certificates in the chain.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false for a constructed chain; present for slice-like APIs.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Iterate leaf first.
    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}
