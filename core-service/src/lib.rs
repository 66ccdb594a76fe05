//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, session) into
//! the sync core: a [`SteamWorkshopConnector`] talks to the remote service and a
//! [`SyncOrchestrator`] drives each run. Desktop apps typically enable the
//! `desktop-shims` feature, which supplies a reqwest-backed HTTP client and
//! the session providers from `bridge-desktop`.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{HttpClient, RemoteCollectionClient, SessionProvider};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, Receiver, DEFAULT_EVENT_BUFFER_SIZE};
use core_sync::{SyncOrchestrator, SyncReport};
use provider_steam_workshop::{
    SteamEndpoints, SteamWorkshopConnector, DEFAULT_API_BASE, DEFAULT_COMMUNITY_BASE,
};
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub session_provider: Arc<dyn SessionProvider>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        session_provider: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            http_client,
            session_provider,
        }
    }
}

impl From<&CoreConfig> for CoreDependencies {
    fn from(config: &CoreConfig) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            Arc::clone(&config.session_provider),
        )
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    event_bus: Arc<EventBus>,
    orchestrator: Arc<SyncOrchestrator>,
}

impl CoreService {
    /// Create a new service against the public Steam hosts.
    pub fn new(deps: CoreDependencies) -> Self {
        Self::assemble(
            deps,
            SteamEndpoints::default(),
            None,
            Arc::new(EventBus::new(DEFAULT_EVENT_BUFFER_SIZE)),
        )
    }

    /// Create a service from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InitializationFailed`] if the configuration no longer
    /// validates (its fields are public and may have been edited after `build()`).
    pub fn from_config(config: CoreConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

        let endpoints = SteamEndpoints::new(
            config.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE),
            config
                .community_base_url
                .as_deref()
                .unwrap_or(DEFAULT_COMMUNITY_BASE),
        );
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));

        Ok(Self::assemble(
            CoreDependencies::from(&config),
            endpoints,
            config.request_timeout,
            event_bus,
        ))
    }

    fn assemble(
        deps: CoreDependencies,
        endpoints: SteamEndpoints,
        request_timeout: Option<std::time::Duration>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        info!(
            api_base = %endpoints.api_base,
            community_base = %endpoints.community_base,
            timeout_ms = request_timeout.map(|t| t.as_millis() as u64),
            "Initializing core service"
        );

        let connector: Arc<dyn RemoteCollectionClient> = Arc::new(
            SteamWorkshopConnector::with_endpoints(Arc::clone(&deps.http_client), endpoints)
                .with_request_timeout(request_timeout),
        );
        let orchestrator = SyncOrchestrator::new(connector, Arc::clone(&deps.session_provider))
            .with_event_bus(Arc::clone(&event_bus));

        Self {
            deps: Arc::new(deps),
            event_bus,
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Make `target_id` hold exactly the leaf items of `source_ids`.
    pub async fn sync(&self, target_id: &str, source_ids: &[String]) -> Result<SyncReport> {
        Ok(self.orchestrator.sync(target_id, source_ids).await?)
    }

    /// Subscribe to sync and session events. Past events are not replayed.
    pub fn subscribe_events(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Uses the default reqwest client and reads the session id from the
/// environment variable `session_var` on every apply phase.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_service::bootstrap_desktop;
///
/// let core = bootstrap_desktop("STEAM_SESSION_ID")?;
/// let report = core.sync("100", &["200".to_string()]).await?;
/// println!("{} mutations applied", report.applied.len());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(session_var: &str) -> Result<CoreService> {
    use bridge_desktop::EnvSessionProvider;

    let config = CoreConfig::builder()
        .session_provider(Arc::new(EnvSessionProvider::new(session_var)))
        .build()?;
    CoreService::from_config(config)
}
