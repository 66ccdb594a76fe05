//! Session Credential Abstraction
//!
//! Mutating calls against the remote service must carry the current session
//! id. Where that id comes from (a browser cookie jar, an environment variable,
//! a keychain) is a host concern, so the core only sees this trait.

use async_trait::async_trait;

use crate::error::Result;

/// Supplies the session id attached to every mutating request.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::session::SessionProvider;
///
/// async fn session(provider: &dyn SessionProvider) -> Result<String> {
///     provider.current_session_id().await
/// }
/// ```
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Return the session id to use right now.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotAvailable`](crate::error::BridgeError::NotAvailable)
    /// when no session can be found.
    async fn current_session_id(&self) -> Result<String>;
}
