//! One-time trust-store initialization with a readiness gate.
//!
//! The store is populated exactly once per gate. Callers that arrive while
//! initialization is running wait for it; callers that ask for a validator
//! before it has completed get [`TrustError::NotReady`]. A second
//! initialization is rejected with [`TrustError::AlreadyInitialized`].
//!
//! The gate is an ordinary value: share it via `Arc` and pass it to whoever
//! needs to validate.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::config::TrustListConfig;
use crate::error::{Result, TrustError};
use crate::store::TrustStore;
use crate::validate::ChainValidator;

/// Holds the process's trust store once it is built.
#[derive(Debug, Default)]
pub struct TrustGate {
    cell: OnceCell<Arc<TrustStore>>,
}

impl TrustGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the gate by running `load`.
    ///
    /// Concurrent callers queue behind the first; only one `load` runs. On
    /// error the gate stays empty and the error is returned. Startup code
    /// should treat that as fatal.
    pub async fn initialize<F, Fut>(&self, load: F) -> Result<Arc<TrustStore>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TrustStore>>,
    {
        if self.cell.initialized() {
            return Err(TrustError::AlreadyInitialized);
        }

        let mut ran = false;
        let store = self
            .cell
            .get_or_try_init(|| {
                ran = true;
                async move { load().await.map(Arc::new) }
            })
            .await
            .inspect_err(|e| error!(error = %e, "trust store initialization failed"))?;

        if !ran {
            return Err(TrustError::AlreadyInitialized);
        }

        info!(anchors = store.len(), "trust store ready");
        Ok(Arc::clone(store))
    }

    /// Load the container named by `config.artifact_path` and populate the gate.
    pub async fn initialize_from_config(&self, config: &TrustListConfig) -> Result<Arc<TrustStore>> {
        let path = config
            .artifact_path
            .clone()
            .ok_or_else(|| TrustError::Config("artifact_path is not set".into()))?;
        debug!(path = %path.display(), "initializing trust store from artifact");
        self.initialize(|| async move { TrustStore::load(&path, config).await })
            .await
    }

    /// Populate the gate from an already-built store.
    pub async fn initialize_with_store(&self, store: TrustStore) -> Result<Arc<TrustStore>> {
        self.initialize(|| async move { Ok(store) }).await
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    /// The trust store, once initialization has completed.
    pub fn store(&self) -> Result<Arc<TrustStore>> {
        self.cell.get().cloned().ok_or(TrustError::NotReady)
    }

    /// A validator over the trust store, once initialization has completed.
    pub fn validator(&self) -> Result<ChainValidator> {
        self.store().map(ChainValidator::new)
    }
}
