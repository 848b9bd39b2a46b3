//! # Paymennt Client
//!
//! Entry point of the crate. Owns credentials, environment, codec and the
//! HTTP capability, and hands out per-resource operation facades.

use crate::checkout::CheckoutOperations;
use crate::config::{ClientConfig, Environment};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::transport::ApiTransport;
use paymennt_core::{JsonCodec, PaymenntResult};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Client for the Paymennt merchant API.
///
/// Cheap to clone and safe to share across tasks; no call mutates it.
#[derive(Debug, Clone)]
pub struct PaymenntClient {
    environment: Environment,
    transport: ApiTransport,
    codec: JsonCodec,
}

impl PaymenntClient {
    /// Create a client backed by `reqwest`
    pub fn new(config: ClientConfig) -> PaymenntResult<Self> {
        let http = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(http))
    }

    /// Create a client that sends through a caller-supplied HTTP capability
    pub fn with_transport(
        config: ClientConfig,
        http: Arc<dyn HttpTransport>,
    ) -> PaymenntResult<Self> {
        let base_url = config.resolved_base_url()?;
        let transport = ApiTransport::new(config.credentials, base_url, http)?;

        info!(
            environment = %config.environment,
            base_url = %transport.base_url(),
            "Initialized Paymennt client"
        );

        Ok(Self {
            environment: config.environment,
            transport,
            codec: JsonCodec::new(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymenntResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::new(config)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn codec(&self) -> &JsonCodec {
        &self.codec
    }

    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    /// Checkout endpoints
    pub fn checkout(&self) -> CheckoutOperations<'_> {
        CheckoutOperations::new(&self.transport, &self.codec)
    }
}
