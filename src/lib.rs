//! Workspace umbrella crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `collection-sync-workspace`
//! and enable `desktop-shims` to get the reqwest-backed HTTP client wired into
//! [`core_service::CoreService`] without touching each crate.

#[cfg(feature = "desktop-shims")]
pub use core_service::{CoreDependencies, CoreError, CoreService};
