//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Store;
use crate::services::auth::TokenSigner;
use crate::services::payment::{PaymentError, PaymentGateway, RazorpayClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the data store, token signer and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Store,
    tokens: TokenSigner,
    gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Create application state backed by the Razorpay API.
    ///
    /// # Errors
    ///
    /// Returns an error if the Razorpay HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, PaymentError> {
        let gateway = Arc::new(RazorpayClient::new(&config.razorpay)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Create application state with an explicit payment gateway.
    #[must_use]
    pub fn with_gateway(config: StorefrontConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        let store = Store::new(config.data_file.clone());
        let tokens = TokenSigner::new(
            config.auth.token_secret.clone(),
            config.auth.token_ttl_days,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                gateway,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the flat-file store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the session token signer.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }

    /// Get a reference to the payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }
}
