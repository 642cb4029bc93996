//! Chain validation against the trust store, and the operator override path.
//!
//! Both entry points always return a [`ValidationResult`]; failures are
//! reported in it, never raised.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::certificate::Certificate;
use crate::chain::{CertificateChain, ChainBuilder};
use crate::store::TrustStore;

/// Message for a custom certificate that neither appears in nor issues any
/// member of the signer's chain.
pub const CUSTOM_CERT_MISMATCH: &str =
    "Custom certificate is not part of the chain and is not a valid issuer";

/// Outcome of a single validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// The chain leads to an accepted anchor
    pub valid: bool,
    /// The signer is outside its validity window right now
    pub expired: bool,
    /// The signer was inside its validity window at the supplied signing time
    pub valid_at_signing_time: bool,
    /// Why validation failed
    pub error_message: Option<String>,
}

impl ValidationResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    fn accepted(signer: &Certificate, options: &ValidationOptions) -> Self {
        Self {
            valid: true,
            expired: signer.is_expired_at(options.now()),
            valid_at_signing_time: options
                .signing_time
                .is_some_and(|t| signer.is_valid_at(t)),
            error_message: None,
        }
    }
}

/// Per-call inputs beyond the signer certificate.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Untrusted certificates that may fill gaps between signer and anchor
    pub intermediates: Vec<Certificate>,
    /// Signing time claimed by the signature, for `valid_at_signing_time`
    pub signing_time: Option<DateTime<Utc>>,
    /// Evaluate validity windows at this instant instead of now
    pub at: Option<DateTime<Utc>>,
}

impl ValidationOptions {
    fn now(&self) -> DateTime<Utc> {
        self.at.unwrap_or_else(Utc::now)
    }
}

/// Why a path failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path does not chain with any of the trust anchors")]
    NoTrustAnchor,

    #[error("subject/issuer name chaining check failed for {subject}")]
    NameChaining { subject: String },

    #[error("signature check failed for {subject}: {reason}")]
    Signature { subject: String, reason: String },

    #[error("basic constraints check failed: {subject} is not a CA certificate")]
    NotCa { subject: String },

    #[error("validity check failed for {subject}: not valid at {at}")]
    Validity { subject: String, at: DateTime<Utc> },

    #[error("key usage check failed: {subject} may not sign certificates")]
    KeyUsage { subject: String },

    #[error("path length constraint violated at {subject}: {below} intermediates below, pathLen {max}")]
    PathLength { subject: String, max: u32, below: usize },

    #[error("unrecognized critical extension {oid} in {subject}")]
    UnhandledCriticalExtension { subject: String, oid: String },
}

/// Validates signer certificates against a shared, immutable trust store.
///
/// Cheap to clone; every call builds its own chain and result.
#[derive(Debug, Clone)]
pub struct ChainValidator {
    store: Arc<TrustStore>,
}

impl ChainValidator {
    #[must_use]
    pub const fn new(store: Arc<TrustStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &TrustStore {
        &self.store
    }

    /// Build the signer's chain without validating it.
    #[must_use]
    pub fn build_chain(&self, signer: &Certificate, options: &ValidationOptions) -> CertificateChain {
        ChainBuilder::new(&self.store)
            .with_intermediates(&options.intermediates)
            .build(signer)
    }

    /// Validate `signer` against the trust anchors, evaluated now.
    #[must_use]
    pub fn validate(&self, signer: &Certificate) -> ValidationResult {
        self.validate_with(signer, &ValidationOptions::default())
    }

    /// Validate `signer` against the trust anchors.
    ///
    /// Chain trust and the signer's own expiry are reported independently:
    /// an expired signer under a trusted chain is `valid && expired`.
    #[must_use]
    pub fn validate_with(&self, signer: &Certificate, options: &ValidationOptions) -> ValidationResult {
        let chain = self.build_chain(signer, options);

        let result = match validate_path(&chain, &self.store, options.now()) {
            Ok(()) => ValidationResult::accepted(signer, options),
            Err(e) => ValidationResult::failed(e.to_string()),
        };

        debug!(
            subject = %signer.subject(),
            chain_len = chain.len(),
            valid = result.valid,
            expired = result.expired,
            error = result.error_message.as_deref().unwrap_or(""),
            "certificate chain validated"
        );
        result
    }

    /// Accept `signer` when an operator-supplied certificate vouches for it.
    #[must_use]
    pub fn validate_with_custom_cert(&self, signer: &Certificate, custom: &Certificate) -> ValidationResult {
        self.validate_with_custom_cert_opts(signer, custom, &ValidationOptions::default())
    }

    /// Custom-certificate validation with explicit options.
    ///
    /// Succeeds when `custom` is byte-identical to a member of the signer's
    /// chain, or failing that, when its key verifies the signature of any
    /// chain member. The trust store is only used to extend the chain.
    #[must_use]
    pub fn validate_with_custom_cert_opts(
        &self,
        signer: &Certificate,
        custom: &Certificate,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let chain = self.build_chain(signer, options);

        let in_chain = chain.iter().any(|member| member == custom);
        let issues_member = !in_chain && chain.iter().any(|member| member.verify_signed_by(custom).is_ok());

        debug!(
            subject = %signer.subject(),
            custom = %custom.subject(),
            in_chain,
            issues_member,
            "custom certificate checked"
        );

        if in_chain || issues_member {
            ValidationResult::accepted(signer, options)
        } else {
            ValidationResult::failed(CUSTOM_CERT_MISMATCH)
        }
    }
}

/// Standards-style path validation of a built chain.
///
/// The path runs from the leaf up to, but excluding, the first trust anchor
/// reached. Every link is name- and signature-checked; every issuer inside
/// the path must be a CA valid at `at`, with keyCertSign when keyUsage is
/// present and within its pathLenConstraint. No member may carry a critical
/// extension outside the recognized set. The leaf's validity window is left
/// to the caller. Revocation is not consulted.
pub fn validate_path(
    chain: &CertificateChain,
    store: &TrustStore,
    at: DateTime<Utc>,
) -> Result<(), PathError> {
    let (path, anchor) = split_at_anchor(chain.certificates(), store)?;

    for (depth, cert) in path.iter().enumerate() {
        let issuer = path.get(depth + 1).unwrap_or(anchor);

        if let Some(oid) = cert.unhandled_critical_extension() {
            return Err(PathError::UnhandledCriticalExtension {
                subject: cert.subject().to_string(),
                oid: oid.to_string(),
            });
        }
        if !cert.names_as_issuer(issuer) {
            return Err(PathError::NameChaining {
                subject: cert.subject().to_string(),
            });
        }
        cert.verify_signed_by(issuer)
            .map_err(|e| PathError::Signature {
                subject: cert.subject().to_string(),
                reason: e.to_string(),
            })?;

        if depth > 0 {
            if !cert.can_issue() {
                return Err(PathError::NotCa {
                    subject: cert.subject().to_string(),
                });
            }
            if !cert.is_valid_at(at) {
                return Err(PathError::Validity {
                    subject: cert.subject().to_string(),
                    at,
                });
            }
            if !cert.allows_cert_sign() {
                return Err(PathError::KeyUsage {
                    subject: cert.subject().to_string(),
                });
            }
            if let Some(max) = cert.path_len_constraint() {
                // Self-issued intermediates do not count.
                let below = path[1..depth].iter().filter(|c| !c.is_self_signed()).count();
                if below > max as usize {
                    return Err(PathError::PathLength {
                        subject: cert.subject().to_string(),
                        max,
                        below,
                    });
                }
            }
        }
    }

    Ok(())
}

/// Split the chain into the path to validate and the anchor that ends it.
fn split_at_anchor<'c>(
    certs: &'c [Certificate],
    store: &'c TrustStore,
) -> Result<(&'c [Certificate], &'c Certificate), PathError> {
    for (i, cert) in certs.iter().enumerate() {
        if store.contains(cert) {
            return Ok((&certs[..i], cert));
        }
        if let Some(anchor) = store.find_issuer_of(cert) {
            return Ok((&certs[..=i], anchor));
        }
    }
    Err(PathError::NoTrustAnchor)
}
