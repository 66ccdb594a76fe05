//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the host bridges
//! using desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `SessionProvider` backed by a fixed value, a cookie header, or an
//!   environment variable
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{CookieSessionProvider, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let session = CookieSessionProvider::new(std::env::var("STEAM_COOKIES")?);
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod http;
mod session;

pub use http::ReqwestHttpClient;
pub use session::{CookieSessionProvider, EnvSessionProvider, StaticSessionProvider, SESSION_COOKIE};
