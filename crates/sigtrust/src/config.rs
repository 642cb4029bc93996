//! Trust-list loading configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::container::TRUST_LIST_ATTACHMENT;

/// How the trust list is located and which roots are admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustListConfig {
    /// Container document holding the trust list. Only consulted by
    /// [`crate::TrustGate::initialize_from_config`].
    #[serde(default)]
    pub artifact_path: Option<PathBuf>,

    /// Name of the attachment carrying the certificates.
    #[serde(default = "default_attachment_name")]
    pub attachment_name: String,

    /// Require root candidates to verify their own signature, on top of the
    /// subject == issuer name test. Off by default: turning it on changes
    /// which roots are accepted.
    #[serde(default)]
    pub verify_root_signatures: bool,
}

impl Default for TrustListConfig {
    fn default() -> Self {
        Self {
            artifact_path: None,
            attachment_name: default_attachment_name(),
            verify_root_signatures: false,
        }
    }
}

impl TrustListConfig {
    /// Config pointing at a container document on disk.
    pub fn with_artifact(path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parse from a JSON document, falling back to defaults for absent fields.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::TrustError::Config(e.to_string()))
    }
}

fn default_attachment_name() -> String {
    String::from(TRUST_LIST_ATTACHMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_security_settings() {
        let config = TrustListConfig::default();
        assert_eq!(config.attachment_name, "SecuritySettings.xml");
        assert!(!config.verify_root_signatures);
        assert!(config.artifact_path.is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = TrustListConfig::from_json(r#"{"artifact_path": "/srv/tl12.pdf"}"#).unwrap();
        assert_eq!(config, TrustListConfig::with_artifact("/srv/tl12.pdf"));
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = TrustListConfig::from_json("{").unwrap_err();
        assert!(matches!(err, crate::TrustError::Config(_)));
    }
}
