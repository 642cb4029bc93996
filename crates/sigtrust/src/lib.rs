//! # sigtrust
//!
//! Trust validation for document-signing certificates against a curated
//! list of root authorities (an AATL-style trust list).
//!
//! The trust list ships as a `SecuritySettings.xml` attachment inside a PDF.
//! It is read once at startup into an immutable [`TrustStore`]; after that,
//! any number of validation calls can run in parallel against it.
//!
//! ## Data Flow
//!
//! ```text
//! Startup (once)
//!   container PDF -> extract_trust_list_xml() -> decode_trust_list()
//!   -> self-signed roots only -> TrustStore -> TrustGate (ready)
//!
//! Per request
//!   signer cert -> ChainBuilder (anchors, then caller intermediates)
//!   -> validate_path() -> ValidationResult { valid, expired, ... }
//!
//! Operator override
//!   signer cert + custom cert -> ChainBuilder
//!   -> custom in chain? custom issued a member? -> ValidationResult
//! ```
//!
//! Revocation (CRL/OCSP) is never consulted, so validation does no I/O.
//!
//! ## Known limitation
//!
//! Roots are recognised by `subject == issuer` on the encoded names, which a
//! crafted certificate can satisfy without holding the matching key. Set
//! [`TrustListConfig::verify_root_signatures`] to additionally require a
//! valid self-signature.

pub mod certificate;
pub mod chain;
pub mod config;
pub mod container;
pub mod decoder;
pub mod error;
pub mod gate;
pub mod hash;
pub mod store;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use certificate::{Certificate, CertificateInfo};
pub use chain::{CertificateChain, ChainBuilder};
pub use config::TrustListConfig;
pub use container::{extract_attachment, extract_trust_list_xml, list_attachments, TRUST_LIST_ATTACHMENT};
pub use decoder::{decode_certificate, decode_trust_list, DecodeFailure, DecodeReport, DecodedEntry};
pub use error::{Result, TrustError};
pub use gate::TrustGate;
pub use store::{AnchorInfo, LoadStats, TrustAnchor, TrustStore};
pub use validate::{validate_path, ChainValidator, PathError, ValidationOptions, ValidationResult, CUSTOM_CERT_MISMATCH};
