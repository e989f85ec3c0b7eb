//! Connection context and the client that builds pickers from it.

use picker_schema::PickerOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::capability::CapabilityLoader;
use crate::config::ProxyConfig;
use crate::proxy::PickerProxy;

/// Service URLs of an established session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUrls {
    /// Where the picker module code lives
    pub picker_url: String,
    pub upload_url: Option<String>,
    pub cdn_url: Option<String>,
}

/// Signed policy for restricted accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    pub policy: String,
    pub signature: String,
}

/// Connection context handed to the picker implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionContext {
    pub api_key: String,
    pub session: SessionUrls,
    pub security: Option<Security>,
}

impl ConnectionContext {
    /// Create a context for the given key and picker endpoint.
    pub fn new(api_key: impl Into<String>, picker_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            session: SessionUrls {
                picker_url: picker_url.into(),
                ..Default::default()
            },
            security: None,
        }
    }

    /// Attach a signed policy.
    pub fn with_security(mut self, policy: impl Into<String>, signature: impl Into<String>) -> Self {
        self.security = Some(Security {
            policy: policy.into(),
            signature: signature.into(),
        });
        self
    }

    /// Endpoint reference passed to the capability loader.
    pub fn endpoint(&self) -> &str {
        &self.session.picker_url
    }
}

/// Entry point for building pickers.
///
/// Bundles the connection context with the loader used to fetch the picker
/// implementation.
#[derive(Clone)]
pub struct PickerClient {
    context: ConnectionContext,
    loader: Arc<dyn CapabilityLoader>,
    config: ProxyConfig,
}

impl PickerClient {
    /// Create a client with the default proxy configuration.
    pub fn new(context: ConnectionContext, loader: Arc<dyn CapabilityLoader>) -> Self {
        Self {
            context,
            loader,
            config: ProxyConfig::default(),
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: ProxyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Build a picker handle. Loading starts in the background immediately.
    pub fn picker(&self, options: Option<PickerOptions>) -> PickerProxy {
        PickerProxy::spawn(
            self.context.clone(),
            Arc::clone(&self.loader),
            options.unwrap_or_default(),
            &self.config,
        )
    }
}

impl fmt::Debug for PickerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerClient")
            .field("context", &self.context)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_picker_url() {
        let context = ConnectionContext::new("key-123", "https://static.example.com/picker/v1")
            .with_security("eyJwb2xpY3kiOnt9fQ==", "abc123");

        assert_eq!(context.endpoint(), "https://static.example.com/picker/v1");
        assert!(context.session.upload_url.is_none());
        assert_eq!(context.security.unwrap().signature, "abc123");
    }
}
