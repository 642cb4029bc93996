//! In-memory trust store of accepted root certificates.
//!
//! Built once from a trust-list artifact, read-only afterwards. Only
//! certificates that passed the root test at load time are admitted, so every
//! anchor has `subject == issuer`.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace};

use crate::certificate::{Certificate, CertificateInfo};
use crate::config::TrustListConfig;
use crate::container::extract_attachment;
use crate::decoder::{decode_trust_list, DecodeReport};
use crate::error::{Result, TrustError};

/// Alias prefix for stored anchors (`aatl-cert-0`, `aatl-cert-1`, ...).
const ALIAS_PREFIX: &str = "aatl-cert-";

/// Load statistics, kept for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// `<Certificate>` elements found in the trust list
    pub candidates: usize,
    /// Roots admitted to the store
    pub loaded: usize,
    /// Decoded entries dropped because they are not roots
    pub skipped_non_root: usize,
    /// Entries that failed to decode
    pub failed: usize,
}

/// A stored anchor with its alias.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    pub alias: String,
    pub certificate: Certificate,
}

/// Listing view of an anchor.
#[derive(Debug, Clone, Serialize)]
pub struct AnchorInfo {
    pub alias: String,
    #[serde(flatten)]
    pub certificate: CertificateInfo,
}

/// Immutable collection of trusted root certificates.
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    anchors: Vec<TrustAnchor>,
    stats: LoadStats,
}

impl TrustStore {
    /// Build a store from root certificates.
    ///
    /// Certificates failing the self-signed test are dropped.
    pub fn from_roots(roots: impl IntoIterator<Item = Certificate>) -> Self {
        let mut store = Self::default();
        for cert in roots {
            store.stats.candidates += 1;
            store.admit(cert);
        }
        store
    }

    /// Build a store from a decoded trust list.
    #[must_use]
    pub fn from_report(report: &DecodeReport) -> Self {
        let mut store = Self::default();
        for cert in report.roots() {
            store.admit(cert.clone());
        }
        store.stats.candidates = report.candidates();
        store.stats.skipped_non_root = report.non_root_count();
        store.stats.failed = report.failures.len();

        debug!(
            loaded = store.stats.loaded,
            failed = store.stats.failed,
            skipped_non_root = store.stats.skipped_non_root,
            "trust-list loading completed"
        );
        store
    }

    /// Build a store from the trust-list document itself
    /// (the `SecuritySettings.xml` body).
    #[must_use]
    pub fn from_trust_list(document: &[u8], config: &TrustListConfig) -> Self {
        Self::from_report(&decode_trust_list(document, config.verify_root_signatures))
    }

    /// Build a store from the container document holding the trust list.
    pub fn from_container(container: &[u8], config: &TrustListConfig) -> Result<Self> {
        debug!(attachment = %config.attachment_name, "loading trust list from container");
        let document = extract_attachment(container, &config.attachment_name)?;
        Ok(Self::from_trust_list(&document, config))
    }

    /// Read a container document from disk and build a store from it.
    pub async fn load(path: &Path, config: &TrustListConfig) -> Result<Self> {
        let path_str = path.display().to_string();
        let container = tokio::fs::read(path)
            .await
            .map_err(|e| TrustError::io(&path_str, e))?;
        Self::from_container(&container, config)
    }

    fn admit(&mut self, cert: Certificate) {
        if !cert.is_self_signed() {
            debug!(subject = %cert.subject(), "refusing non-root certificate");
            self.stats.skipped_non_root += 1;
            return;
        }
        let alias = format!("{ALIAS_PREFIX}{}", self.anchors.len());
        trace!(
            %alias,
            subject = %cert.subject(),
            not_after = %cert.not_after(),
            "loaded trust-list root certificate"
        );
        self.anchors.push(TrustAnchor {
            alias,
            certificate: cert,
        });
        self.stats.loaded += 1;
    }

    /// Number of anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Statistics from the load that produced this store.
    #[must_use]
    pub const fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Every anchor certificate, in load order.
    pub fn all_anchors(&self) -> impl Iterator<Item = &Certificate> {
        self.anchors.iter().map(|a| &a.certificate)
    }

    /// Anchors with their aliases.
    #[must_use]
    pub fn anchors(&self) -> &[TrustAnchor] {
        &self.anchors
    }

    /// The store holds a certificate byte-identical to `cert`.
    #[must_use]
    pub fn contains(&self, cert: &Certificate) -> bool {
        self.all_anchors().any(|a| a == cert)
    }

    /// Find the anchor that issued `cert`.
    ///
    /// A candidate must carry `cert`'s issuer name as its subject and its key
    /// must verify `cert`'s signature. Name matches that fail verification
    /// are skipped and the scan continues.
    #[must_use]
    pub fn find_issuer_of(&self, cert: &Certificate) -> Option<&Certificate> {
        self.all_anchors()
            .filter(|anchor| cert.names_as_issuer(anchor))
            .find(|anchor| match cert.verify_signed_by(anchor) {
                Ok(()) => true,
                Err(e) => {
                    trace!(anchor = %anchor.subject(), error = %e, "issuer name matched but signature did not verify");
                    false
                }
            })
    }

    /// Listing view of every anchor.
    #[must_use]
    pub fn describe(&self) -> Vec<AnchorInfo> {
        self.anchors()
            .iter()
            .map(|a| AnchorInfo {
                alias: a.alias.clone(),
                certificate: a.certificate.info(),
            })
            .collect()
    }
}
