use std::sync::Arc;

use vitae_core::identity::IdentityVerifier;
use vitae_core::store::DocumentStore;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor. Wrapped in `Arc` so cloning is cheap. Built once at process
/// start; handlers reach the store and verifier only through it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityVerifier>,
    config: AppConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityVerifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                store,
                identity,
                config,
            }),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    pub fn identity(&self) -> &dyn IdentityVerifier {
        self.inner.identity.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }
}
