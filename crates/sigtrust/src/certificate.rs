//! Decoded X.509 certificate value.
//!
//! A [`Certificate`] owns its DER encoding and caches the fields the chain
//! builder and validator look at on every request. Clones are cheap and share
//! the same allocation, so the trust store can hand anchors out freely.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use x509_parser::certificate::X509Certificate;
use x509_parser::error::X509Error;
use x509_parser::prelude::FromDer;
use x509_parser::time::ASN1Time;

use crate::error::{Result, TrustError};
use crate::hash::sha256_fingerprint;

/// An immutable, decoded X.509 certificate.
///
/// Equality and hashing are defined over the DER bytes, so two certificates
/// are equal exactly when their encodings are identical.
#[derive(Clone)]
pub struct Certificate {
    inner: Arc<CertificateInner>,
}

struct CertificateInner {
    der: Vec<u8>,
    subject_raw: Vec<u8>,
    issuer_raw: Vec<u8>,
    subject: String,
    issuer: String,
    serial: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    fingerprint: String,
    /// `cA` flag from basicConstraints, `None` when the extension is absent
    ca_flag: Option<bool>,
    /// Raw version field (0 = v1, 2 = v3)
    version: u32,
    /// `keyCertSign` bit, `None` when keyUsage is absent
    key_cert_sign: Option<bool>,
    /// basicConstraints `pathLenConstraint`
    path_len: Option<u32>,
    /// First critical extension this crate does not process
    unhandled_critical: Option<String>,
}

impl Certificate {
    /// Decode a single DER-encoded certificate.
    ///
    /// Trailing bytes after the certificate are rejected.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (rest, cert) =
            X509Certificate::from_der(der).map_err(|e| TrustError::decode(0, e))?;
        if !rest.is_empty() {
            return Err(TrustError::decode(
                0,
                format!("{} trailing bytes after certificate", rest.len()),
            ));
        }

        let validity = cert.validity();
        let not_before = asn1_to_utc(validity.not_before)
            .ok_or_else(|| TrustError::decode(0, "notBefore out of range"))?;
        let not_after = asn1_to_utc(validity.not_after)
            .ok_or_else(|| TrustError::decode(0, "notAfter out of range"))?;

        let (ca_flag, path_len) = match cert.basic_constraints() {
            Ok(Some(bc)) => (Some(bc.value.ca), bc.value.path_len_constraint),
            Ok(None) => (None, None),
            // Duplicate or malformed extension: never usable as an issuer.
            Err(_) => (Some(false), None),
        };
        let key_cert_sign = match cert.key_usage() {
            Ok(Some(ku)) => Some(ku.value.key_cert_sign()),
            Ok(None) => None,
            Err(_) => Some(false),
        };
        let unhandled_critical = cert
            .extensions()
            .iter()
            .map(|ext| (ext.critical, ext.oid.to_id_string()))
            .find(|(critical, oid)| *critical && !is_known_extension(oid))
            .map(|(_, oid)| oid);

        Ok(Self {
            inner: Arc::new(CertificateInner {
                subject_raw: cert.subject().as_raw().to_vec(),
                issuer_raw: cert.issuer().as_raw().to_vec(),
                subject: cert.subject().to_string(),
                issuer: cert.issuer().to_string(),
                serial: cert.raw_serial_as_string(),
                not_before,
                not_after,
                fingerprint: sha256_fingerprint(der),
                ca_flag,
                version: cert.version().0,
                key_cert_sign,
                path_len,
                unhandled_critical,
                der: der.to_vec(),
            }),
        })
    }

    /// DER encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.inner.der
    }

    /// Subject distinguished name (human-readable).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.inner.subject
    }

    /// Issuer distinguished name (human-readable).
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.inner.issuer
    }

    /// Serial number (colon-separated hex).
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.inner.serial
    }

    #[must_use]
    pub fn not_before(&self) -> DateTime<Utc> {
        self.inner.not_before
    }

    #[must_use]
    pub fn not_after(&self) -> DateTime<Utc> {
        self.inner.not_after
    }

    /// SHA-256 of the DER encoding (hex).
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.inner.fingerprint
    }

    /// Subject and issuer names are identical.
    ///
    /// This is a structural test on the encoded names only. It does not prove
    /// the certificate signed itself; see [`Self::verifies_own_signature`].
    #[must_use]
    pub fn is_self_signed(&self) -> bool {
        self.inner.subject_raw == self.inner.issuer_raw
    }

    /// This certificate's issuer name equals `candidate`'s subject name.
    #[must_use]
    pub fn names_as_issuer(&self, candidate: &Self) -> bool {
        self.inner.issuer_raw == candidate.inner.subject_raw
    }

    /// Check that this certificate's signature verifies under `issuer`'s
    /// public key.
    pub fn verify_signed_by(&self, issuer: &Self) -> std::result::Result<(), X509Error> {
        let child = self.parsed()?;
        let parent = issuer.parsed()?;
        child.verify_signature(Some(parent.public_key()))
    }

    /// Check the signature against this certificate's own public key.
    #[must_use]
    pub fn verifies_own_signature(&self) -> bool {
        self.parsed()
            .and_then(|cert| cert.verify_signature(None))
            .is_ok()
    }

    /// `at` falls inside `[not_before, not_after]`.
    #[must_use]
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.inner.not_before <= at && at <= self.inner.not_after
    }

    /// True when `at` is past `not_after` or before `not_before`.
    #[must_use]
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        !self.is_valid_at(at)
    }

    /// Whether this certificate may act as an issuer in a path.
    ///
    /// v3 certificates need basicConstraints `cA=TRUE`; v1/v2 certificates
    /// predate the extension and are accepted.
    #[must_use]
    pub fn can_issue(&self) -> bool {
        self.inner
            .ca_flag
            .unwrap_or(self.inner.version < 2)
    }

    /// keyUsage permits signing certificates, or keyUsage is absent.
    #[must_use]
    pub fn allows_cert_sign(&self) -> bool {
        self.inner.key_cert_sign.unwrap_or(true)
    }

    /// Maximum number of non-self-issued intermediates allowed below this CA.
    #[must_use]
    pub fn path_len_constraint(&self) -> Option<u32> {
        self.inner.path_len
    }

    /// OID of a critical extension that path validation cannot honour.
    #[must_use]
    pub fn unhandled_critical_extension(&self) -> Option<&str> {
        self.inner.unhandled_critical.as_deref()
    }

    /// Serializable summary for listings.
    #[must_use]
    pub fn info(&self) -> CertificateInfo {
        CertificateInfo {
            subject: self.inner.subject.clone(),
            issuer: self.inner.issuer.clone(),
            serial: self.inner.serial.clone(),
            not_before: self.inner.not_before,
            not_after: self.inner.not_after,
            fingerprint: self.inner.fingerprint.clone(),
            self_signed: self.is_self_signed(),
        }
    }

    fn parsed(&self) -> std::result::Result<X509Certificate<'_>, X509Error> {
        X509Certificate::from_der(&self.inner.der)
            .map(|(_, cert)| cert)
            .map_err(|_| X509Error::InvalidCertificate)
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.der == other.inner.der
    }
}

impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.der.hash(state);
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.inner.subject)
            .field("issuer", &self.inner.issuer)
            .field("fingerprint", &self.inner.fingerprint)
            .finish()
    }
}

/// Human-facing description of a certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// Subject distinguished name
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    /// Serial number (hex)
    pub serial: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// SHA-256 fingerprint of DER bytes (hex)
    pub fingerprint: String,
    /// Subject equals issuer
    pub self_signed: bool,
}

/// Extensions path validation either enforces or may safely ignore.
fn is_known_extension(oid: &str) -> bool {
    matches!(
        oid,
        "2.5.29.14" // subjectKeyIdentifier
        | "2.5.29.15" // keyUsage
        | "2.5.29.17" // subjectAltName
        | "2.5.29.18" // issuerAltName
        | "2.5.29.19" // basicConstraints
        | "2.5.29.30" // nameConstraints
        | "2.5.29.31" // cRLDistributionPoints
        | "2.5.29.32" // certificatePolicies
        | "2.5.29.33" // policyMappings
        | "2.5.29.35" // authorityKeyIdentifier
        | "2.5.29.36" // policyConstraints
        | "2.5.29.37" // extKeyUsage
        | "2.5.29.46" // freshestCRL
        | "2.5.29.54" // inhibitAnyPolicy
        | "1.3.6.1.5.5.7.1.1" // authorityInfoAccess
        | "1.3.6.1.5.5.7.1.11" // subjectInfoAccess
    )
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: ASN1Time) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(t.timestamp(), 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{issue, issue_with, params, self_signed_root, Validity};
    use rcgen::{BasicConstraints, CustomExtension, IsCa, KeyUsagePurpose};

    #[test]
    fn root_is_self_signed_and_verifies_itself() {
        let root = self_signed_root("Test Root CA");
        let cert = Certificate::from_der(root.der()).unwrap();

        assert!(cert.is_self_signed());
        assert!(cert.verifies_own_signature());
        assert!(cert.can_issue());
        assert!(cert.subject().contains("Test Root CA"));
        assert_eq!(cert.fingerprint().len(), 64);
    }

    #[test]
    fn leaf_verifies_under_its_issuer_only() {
        let root = self_signed_root("Root A");
        let other = self_signed_root("Root B");
        let leaf = issue("Signer", &root, Validity::Current, false);

        let leaf_cert = Certificate::from_der(leaf.der()).unwrap();
        let root_cert = Certificate::from_der(root.der()).unwrap();
        let other_cert = Certificate::from_der(other.der()).unwrap();

        assert!(!leaf_cert.is_self_signed());
        assert!(leaf_cert.names_as_issuer(&root_cert));
        assert!(leaf_cert.verify_signed_by(&root_cert).is_ok());
        assert!(leaf_cert.verify_signed_by(&other_cert).is_err());
        assert!(!leaf_cert.can_issue());
    }

    #[test]
    fn expiry_is_judged_against_the_given_instant() {
        let root = self_signed_root("Root");
        let leaf = issue("Old Signer", &root, Validity::Expired, false);
        let cert = Certificate::from_der(leaf.der()).unwrap();

        assert!(cert.is_expired_at(Utc::now()));
        assert!(cert.is_valid_at(cert.not_before()));
        assert!(cert.is_valid_at(cert.not_after()));
    }

    #[test]
    fn equality_follows_der_bytes() {
        let root = self_signed_root("Root");
        let a = Certificate::from_der(root.der()).unwrap();
        let b = Certificate::from_der(root.der()).unwrap();
        let other = Certificate::from_der(self_signed_root("Root").der()).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, other);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let root = self_signed_root("Root");
        let mut der = root.der().to_vec();
        der.extend_from_slice(&[0, 0, 0]);

        let err = Certificate::from_der(&der).unwrap_err();
        assert!(matches!(err, TrustError::CertificateDecode { .. }));
    }

    #[test]
    fn issuer_constraints_are_read_from_extensions() {
        let root = self_signed_root("Root");
        let plain = Certificate::from_der(root.der()).unwrap();
        assert!(plain.allows_cert_sign());
        assert_eq!(plain.path_len_constraint(), None);
        assert_eq!(plain.unhandled_critical_extension(), None);

        let mut p = params("Restricted CA", Validity::Current, true);
        p.is_ca = IsCa::Ca(BasicConstraints::Constrained(1));
        p.key_usages = vec![KeyUsagePurpose::DigitalSignature];
        let mut ext = CustomExtension::from_oid_content(&[1, 3, 6, 1, 4, 1, 55555, 7], vec![0x05, 0x00]);
        ext.set_criticality(true);
        p.custom_extensions.push(ext);
        let restricted = Certificate::from_der(issue_with(p, &root).der()).unwrap();

        assert!(restricted.can_issue());
        assert!(!restricted.allows_cert_sign());
        assert_eq!(restricted.path_len_constraint(), Some(1));
        assert_eq!(restricted.unhandled_critical_extension(), Some("1.3.6.1.4.1.55555.7"));
    }
}
