//! # Core Configuration Module
//!
//! Provides configuration management for the collection sync core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all necessary dependencies and settings for the core library.
//! It enforces fail-fast validation so a misconfigured service is rejected
//! before any remote call is made.
//!
//! ## Required Dependencies
//!
//! - `SessionProvider` - Supplies the session id attached to every mutation
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//!
//! When the `desktop-shims` feature is enabled, a `ReqwestHttpClient` honouring
//! the configured request timeout is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use bridge_desktop::EnvSessionProvider;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .session_provider(Arc::new(EnvSessionProvider::new("STEAM_SESSION_ID")))
//!     .request_timeout(Duration::from_secs(30))
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No session provider: fails with an actionable error message
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing session provider");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HttpClient, SessionProvider};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Core configuration for the collection sync core.
///
/// This struct holds all dependencies and settings required to initialize
/// the core library. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP client used by the remote connector
    pub http_client: Arc<dyn HttpClient>,

    /// Source of the session id sent with mutations (required)
    pub session_provider: Arc<dyn SessionProvider>,

    /// Override for the Web API base URL; `None` uses the provider default
    pub api_base_url: Option<String>,

    /// Override for the community site base URL; `None` uses the provider default
    pub community_base_url: Option<String>,

    /// Per-request timeout. `None` means requests may wait indefinitely.
    pub request_timeout: Option<Duration>,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("session_provider", &"SessionProvider { ... }")
            .field("api_base_url", &self.api_base_url)
            .field("community_base_url", &self.community_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder();
    /// ```
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Base URL overrides are absolute http(s) URLs
    /// - The request timeout, when set, is non-zero
    /// - The event buffer can hold at least one event
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api_base_url {
            validate_base_url("api_base_url", url)?;
        }

        if let Some(url) = &self.community_base_url {
            validate_base_url("community_base_url", url)?;
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Request timeout must be greater than zero. \
                 Omit .request_timeout() to disable timeouts."
                    .to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_base_url(field: &'static str, value: &str) -> Result<()> {
    let parsed = Url::parse(value).map_err(|e| Error::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl {
                field,
                reason: format!("unsupported scheme '{}', expected http or https", other),
            })
        }
    }

    if parsed.host_str().is_none() {
        return Err(Error::InvalidUrl {
            field,
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the remote service. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Other hosts: inject a platform HTTP client."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Option<Duration>) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = match timeout {
        Some(timeout) => ReqwestHttpClient::with_timeout(timeout),
        None => ReqwestHttpClient::new(),
    }
    .map_err(|e| Error::Internal(format!("Failed to initialize default HttpClient: {}", e)))?;

    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Option<Duration>) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    session_provider: Option<Arc<dyn SessionProvider>>,
    api_base_url: Option<String>,
    community_base_url: Option<String>,
    request_timeout: Option<Duration>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the HTTP client implementation.
    ///
    /// Optional when the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the session provider implementation (required).
    pub fn session_provider(mut self, provider: Arc<dyn SessionProvider>) -> Self {
        self.session_provider = Some(provider);
        self
    }

    /// Overrides the Web API base URL (collection details).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Overrides the community site base URL (membership mutations).
    pub fn community_base_url(mut self, url: impl Into<String>) -> Self {
        self.community_base_url = Some(url.into());
        self
    }

    /// Applies a timeout to every remote request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the event bus capacity.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The session provider is missing
    /// - No HTTP client was injected and no platform default is available
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let session_provider = self.session_provider.ok_or_else(|| Error::CapabilityMissing {
            capability: "SessionProvider".to_string(),
            message: "SessionProvider implementation is required for membership mutations. \
                     Use .session_provider() to set it."
                .to_string(),
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(self.request_timeout)?,
        };

        let config = CoreConfig {
            http_client,
            session_provider,
            api_base_url: self.api_base_url,
            community_base_url: self.community_base_url,
            request_timeout: self.request_timeout,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, HttpRequest, HttpResponse};

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("mock".to_string()))
        }
    }

    struct MockSessionProvider;

    #[async_trait]
    impl SessionProvider for MockSessionProvider {
        async fn current_session_id(&self) -> std::result::Result<String, BridgeError> {
            Ok("session".to_string())
        }
    }

    fn base_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .http_client(Arc::new(MockHttpClient))
            .session_provider(Arc::new(MockSessionProvider))
    }

    #[test]
    fn test_builder_with_required_fields() {
        let config = base_builder().build().unwrap();

        assert!(config.api_base_url.is_none());
        assert!(config.community_base_url.is_none());
        assert!(config.request_timeout.is_none());
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_requires_session_provider() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(MockHttpClient))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "SessionProvider");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client_without_shims() {
        let result = CoreConfig::builder()
            .session_provider(Arc::new(MockSessionProvider))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "HttpClient");
                assert!(message.contains("desktop-shims"));
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_default_http_client() {
        let config = CoreConfig::builder()
            .session_provider(Arc::new(MockSessionProvider))
            .request_timeout(Duration::from_secs(5))
            .build()
            .expect("desktop defaults should succeed");

        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_builder_with_overrides() {
        let config = base_builder()
            .api_base_url("http://127.0.0.1:8080")
            .community_base_url("https://community.example.com/")
            .request_timeout(Duration::from_secs(10))
            .event_buffer_size(16)
            .build()
            .unwrap();

        assert_eq!(config.api_base_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(
            config.community_base_url.as_deref(),
            Some("https://community.example.com/")
        );
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.event_buffer_size, 16);
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let result = base_builder().api_base_url("not a url").build();

        assert!(matches!(
            result,
            Err(Error::InvalidUrl {
                field: "api_base_url",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = base_builder()
            .community_base_url("ftp://steamcommunity.com")
            .build();

        match result {
            Err(Error::InvalidUrl { field, reason }) => {
                assert_eq!(field, "community_base_url");
                assert!(reason.contains("ftp"));
            }
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_event_buffer() {
        let result = base_builder().event_buffer_size(0).build();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Event buffer size must be greater than 0"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = base_builder().request_timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_is_cloneable_and_debug_hides_bridges() {
        let config = base_builder().build().unwrap();
        let cloned = config.clone();

        assert_eq!(cloned.event_buffer_size, config.event_buffer_size);
        let debug = format!("{:?}", cloned);
        assert!(debug.contains("SessionProvider { ... }"));
    }
}
