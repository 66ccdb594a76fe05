//! Session Providers for Desktop Hosts
//!
//! The remote service authenticates membership mutations with a `sessionid`
//! cookie. Desktop hosts usually obtain it from an exported cookie header or
//! an environment variable.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    session::SessionProvider,
};
use tracing::debug;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "sessionid";

/// Session provider returning a fixed session id
#[derive(Clone)]
pub struct StaticSessionProvider {
    session_id: String,
}

impl StaticSessionProvider {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

impl std::fmt::Debug for StaticSessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSessionProvider")
            .field("session_id", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session_id(&self) -> Result<String> {
        Ok(self.session_id.clone())
    }
}

/// Session provider reading the session id out of a `Cookie` header value
/// such as `browserid=1; sessionid=abc; steamCountry=US`.
#[derive(Clone)]
pub struct CookieSessionProvider {
    cookie_header: String,
}

impl CookieSessionProvider {
    pub fn new(cookie_header: impl Into<String>) -> Self {
        Self {
            cookie_header: cookie_header.into(),
        }
    }

    /// Extract the value of `name` from a cookie header.
    ///
    /// Returns `None` when the cookie is absent or empty.
    pub fn extract<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
        cookie_header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

impl std::fmt::Debug for CookieSessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSessionProvider")
            .field("cookie_header", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl SessionProvider for CookieSessionProvider {
    async fn current_session_id(&self) -> Result<String> {
        Self::extract(&self.cookie_header, SESSION_COOKIE)
            .map(str::to_string)
            .ok_or_else(|| {
                BridgeError::NotAvailable(format!("cookie '{}' not present", SESSION_COOKIE))
            })
    }
}

/// Session provider reading an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvSessionProvider {
    variable: String,
}

impl EnvSessionProvider {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for EnvSessionProvider {
    async fn current_session_id(&self) -> Result<String> {
        debug!(variable = %self.variable, "Reading session id from environment");

        match std::env::var(&self.variable) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(BridgeError::NotAvailable(format!(
                "environment variable '{}' is not set",
                self.variable
            ))),
        }
    }
}
