//! Certificate decoding: single blobs and whole trust-list documents.
//!
//! A trust list carries its roots as repeated `<Certificate>BASE64</Certificate>`
//! elements. Entries are decoded independently; a malformed entry is
//! recorded in the [`DecodeReport`] and skipped, never fatal.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::certificate::Certificate;
use crate::error::{Result, TrustError};

const CERT_START_TAG: &str = "<Certificate>";
const CERT_END_TAG: &str = "</Certificate>";
const PEM_MARKER: &[u8] = b"-----BEGIN";
/// ASN.1 SEQUENCE, the first byte of any DER certificate.
const DER_SEQUENCE: u8 = 0x30;

/// Decode one certificate from DER, PEM or bare Base64 bytes.
pub fn decode_certificate(bytes: &[u8]) -> Result<Certificate> {
    let trimmed = bytes.trim_ascii();
    if trimmed.first() == Some(&DER_SEQUENCE) {
        return Certificate::from_der(trimmed);
    }
    if trimmed.starts_with(PEM_MARKER) {
        let parsed = pem::parse(trimmed).map_err(|e| TrustError::decode(0, e))?;
        if parsed.tag() != "CERTIFICATE" {
            return Err(TrustError::decode(
                0,
                format!("unexpected PEM block {:?}", parsed.tag()),
            ));
        }
        return Certificate::from_der(parsed.contents());
    }
    let der = decode_base64(trimmed).map_err(|e| TrustError::decode(0, e))?;
    Certificate::from_der(&der)
}

/// One successfully decoded trust-list entry.
#[derive(Debug, Clone)]
pub struct DecodedEntry {
    /// Position among all `<Certificate>` elements in the document
    pub index: usize,
    pub certificate: Certificate,
    /// Passed the self-signed test and may enter the trust store
    pub root_candidate: bool,
}

/// A trust-list entry that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Position among all `<Certificate>` elements in the document
    pub index: usize,
    pub reason: String,
}

/// Outcome of decoding a whole trust-list document.
#[derive(Debug, Clone, Default)]
pub struct DecodeReport {
    /// Decoded entries, in document order
    pub entries: Vec<DecodedEntry>,
    /// Entries that failed to decode, in document order
    pub failures: Vec<DecodeFailure>,
}

impl DecodeReport {
    /// Total `<Certificate>` elements seen.
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.entries.len() + self.failures.len()
    }

    /// Entries eligible for the trust store.
    pub fn roots(&self) -> impl Iterator<Item = &Certificate> {
        self.entries
            .iter()
            .filter(|e| e.root_candidate)
            .map(|e| &e.certificate)
    }

    /// Number of decoded entries that are not root candidates.
    #[must_use]
    pub fn non_root_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.root_candidate).count()
    }
}

/// Scan a trust-list document for `<Certificate>` elements and decode each.
///
/// The text is scanned for literal tag pairs rather than parsed as XML, so
/// surrounding structure and namespaces are irrelevant. An unterminated
/// start tag ends the scan.
///
/// With `verify_root_signatures`, a root candidate must also verify its own
/// signature; otherwise the subject/issuer name test alone decides.
#[must_use]
pub fn decode_trust_list(document: &[u8], verify_root_signatures: bool) -> DecodeReport {
    let text = String::from_utf8_lossy(document);
    let mut report = DecodeReport::default();

    for (index, payload) in certificate_payloads(&text).enumerate() {
        let decoded = decode_base64(payload.as_bytes())
            .map_err(|e| e.to_string())
            .and_then(|der| Certificate::from_der(&der).map_err(|e| e.to_string()));

        match decoded {
            Ok(certificate) => {
                let root_candidate = certificate.is_self_signed()
                    && (!verify_root_signatures || certificate.verifies_own_signature());
                if !root_candidate {
                    debug!(index, subject = %certificate.subject(), "trust-list entry is not a root, dropping");
                }
                report.entries.push(DecodedEntry {
                    index,
                    certificate,
                    root_candidate,
                });
            }
            Err(reason) => {
                warn!(index, error = %reason, "failed to decode trust-list certificate");
                report.failures.push(DecodeFailure { index, reason });
            }
        }
    }

    report
}

/// Iterate over the trimmed inner text of every `<Certificate>` element.
fn certificate_payloads(text: &str) -> impl Iterator<Item = &str> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        let start = cursor + text[cursor..].find(CERT_START_TAG)? + CERT_START_TAG.len();
        let end = start + text[start..].find(CERT_END_TAG)?;
        cursor = end + CERT_END_TAG.len();
        Some(text[start..end].trim())
    })
}

/// Base64 decode, tolerating line breaks and indentation inside the payload.
fn decode_base64(input: &[u8]) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact)
}
