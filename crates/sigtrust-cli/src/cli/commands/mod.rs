//! Command implementations.

pub mod anchors;
pub mod attachments;
pub mod validate;

use anyhow::Context as _;
use sigtrust::{TrustGate, TrustListConfig};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Trust-list container path
    pub trust_list: Option<PathBuf>,

    /// Require roots to verify their own signature
    pub strict_roots: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl Context {
    /// Get the trust-list path, returning an error if not set.
    pub fn require_trust_list(&self) -> anyhow::Result<&PathBuf> {
        self.trust_list.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "Trust list required.\n\n\
                 Set it with one of:\n  \
                 1. --trust-list <PDF>\n  \
                 2. SIGTRUST_TRUST_LIST environment variable\n  \
                 3. trust_list = \"...\" in the config file"
            )
        })
    }

    /// Library configuration for this invocation.
    pub fn trust_config(&self) -> anyhow::Result<TrustListConfig> {
        Ok(TrustListConfig {
            verify_root_signatures: self.strict_roots,
            ..TrustListConfig::with_artifact(self.require_trust_list()?)
        })
    }

    /// Read the trust-list container from disk.
    pub async fn read_container(&self) -> anyhow::Result<Vec<u8>> {
        let path = self.require_trust_list()?;
        tokio::fs::read(path)
            .await
            .with_context(|| format!("reading trust list {}", path.display()))
    }

    /// Load the trust store through the readiness gate.
    ///
    /// Any load error aborts the command: running without a trust list
    /// would make every verdict meaningless.
    pub async fn trust_gate(&self) -> anyhow::Result<TrustGate> {
        let gate = TrustGate::new();
        gate.initialize_from_config(&self.trust_config()?)
            .await
            .context("failed to load trust list")?;
        Ok(gate)
    }
}
