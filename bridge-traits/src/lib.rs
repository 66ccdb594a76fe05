//! # Host Bridge Traits
//!
//! Contracts between the collection sync core and everything outside it.
//!
//! ## Overview
//!
//! The core never talks to the network, reads cookies, or writes logs to a
//! concrete destination. Each of those capabilities is a trait defined here
//! and implemented per host (`bridge-desktop` ships the defaults) or per
//! remote service (`provider-steam-workshop`).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Raw async HTTP requests
//! - [`RemoteCollectionClient`](collection::RemoteCollectionClient) - Fetch collection
//!   details and mutate collection membership
//!
//! ### Credentials
//! - [`SessionProvider`](session::SessionProvider) - Session id attached to mutations
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should map transport failures to [`BridgeError::Transport`] and responses
//! that do not match the expected schema to [`BridgeError::MalformedResponse`],
//! so the core can classify failures without inspecting message strings.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single implementation can be
//! shared by the concurrent fetch and mutation calls of a sync run.

pub mod collection;
pub mod error;
pub mod http;
pub mod session;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use collection::{
    CollectionDetails, CollectionDetailsBatch, CollectionItem, ItemKind, MutationAck,
    RemoteCollectionClient, STATUS_OK,
};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use session::SessionProvider;
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
