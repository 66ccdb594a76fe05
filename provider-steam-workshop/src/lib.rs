//! # Steam Workshop Provider
//!
//! Implements `RemoteCollectionClient` for Steam Workshop collections.
//!
//! ## Overview
//!
//! This module provides:
//! - Batched collection-details fetches via `ISteamRemoteStorage/GetCollectionDetails/v1`
//! - Membership mutations via `sharedfiles/addchild` and `sharedfiles/removechild`
//! - Form encoding with Steam's indexed list parameters
//! - Schema validation of every response body
//!
//! Requests are sent once. Retry and rate limiting are left to the caller.

pub mod connector;
pub mod error;
pub mod form;
pub mod types;

pub use connector::{SteamEndpoints, SteamWorkshopConnector, DEFAULT_API_BASE, DEFAULT_COMMUNITY_BASE};
pub use error::{Result, SteamWorkshopError};
