//! Certificate chain building.
//!
//! Walks issuer links from the signer upward: trust-store anchors first, then
//! any caller-supplied intermediates. The walk stops at a self-signed
//! certificate or when no issuer can be found, in which case the partial
//! chain is returned as-is.

use tracing::trace;

use crate::certificate::Certificate;
use crate::store::TrustStore;

/// Ordered chain, index 0 = signer, ascending issuers after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain {
    certs: Vec<Certificate>,
}

impl CertificateChain {
    /// The signer (leaf) certificate.
    #[must_use]
    pub fn leaf(&self) -> &Certificate {
        &self.certs[0]
    }

    /// The topmost certificate reached.
    #[must_use]
    pub fn top(&self) -> &Certificate {
        &self.certs[self.certs.len() - 1]
    }

    /// All certificates, leaf first.
    #[must_use]
    pub fn certificates(&self) -> &[Certificate] {
        &self.certs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Always false: a chain holds at least the signer.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The walk ended at a self-signed certificate.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.top().is_self_signed()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certs.iter()
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.iter()
    }
}

/// Builds chains against a trust store and an optional intermediate pool.
#[derive(Debug, Clone, Copy)]
pub struct ChainBuilder<'a> {
    store: &'a TrustStore,
    intermediates: &'a [Certificate],
}

impl<'a> ChainBuilder<'a> {
    #[must_use]
    pub const fn new(store: &'a TrustStore) -> Self {
        Self {
            store,
            intermediates: &[],
        }
    }

    /// Also consult `intermediates` when no anchor issued a certificate.
    ///
    /// Pool members only ever extend the chain; they are not trusted.
    #[must_use]
    pub const fn with_intermediates(mut self, intermediates: &'a [Certificate]) -> Self {
        self.intermediates = intermediates;
        self
    }

    /// Most issuer hops a single walk may take.
    ///
    /// Well-formed data never revisits a certificate, so this only bites on
    /// cyclic issuer graphs.
    #[must_use]
    pub fn max_hops(&self) -> usize {
        self.store.len() + self.intermediates.len() + 2
    }

    /// Assemble the chain for `signer`.
    #[must_use]
    pub fn build(&self, signer: &Certificate) -> CertificateChain {
        let mut certs = vec![signer.clone()];
        let max_hops = self.max_hops();

        for _ in 0..max_hops {
            let current = &certs[certs.len() - 1];
            if current.is_self_signed() {
                break;
            }
            let Some(issuer) = self.find_issuer(current) else {
                trace!(subject = %current.subject(), issuer = %current.issuer(), "no issuer found, chain is partial");
                break;
            };
            let issuer = issuer.clone();
            certs.push(issuer);
        }

        CertificateChain { certs }
    }

    fn find_issuer(&self, cert: &Certificate) -> Option<&'a Certificate> {
        self.store.find_issuer_of(cert).or_else(|| {
            self.intermediates
                .iter()
                .find(|c| cert.names_as_issuer(c) && cert.verify_signed_by(c).is_ok())
        })
    }
}
