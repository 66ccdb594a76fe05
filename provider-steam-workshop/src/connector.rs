//! Steam Workshop connector implementation
//!
//! Implements the `RemoteCollectionClient` trait on top of the Steam Web API
//! (`ISteamRemoteStorage/GetCollectionDetails`) and the community site's
//! `sharedfiles/addchild` and `sharedfiles/removechild` form endpoints.

use async_trait::async_trait;
use bridge_traits::collection::{CollectionDetailsBatch, MutationAck, RemoteCollectionClient};
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::SteamWorkshopError;
use crate::form::FormBody;
use crate::types::{GetCollectionDetailsEnvelope, RemoveChildResponse};

/// Steam Web API base URL
pub const DEFAULT_API_BASE: &str = "https://api.steampowered.com";

/// Steam Community base URL
pub const DEFAULT_COMMUNITY_BASE: &str = "https://steamcommunity.com";

const COLLECTION_DETAILS_ENDPOINT: &str = "GetCollectionDetails";
const ADD_CHILD_ENDPOINT: &str = "addchild";
const REMOVE_CHILD_ENDPOINT: &str = "removechild";

/// Base URLs of the two Steam hosts the connector talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamEndpoints {
    pub api_base: String,
    pub community_base: String,
}

impl Default for SteamEndpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            community_base: DEFAULT_COMMUNITY_BASE.to_string(),
        }
    }
}

impl SteamEndpoints {
    pub fn new(api_base: impl Into<String>, community_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            community_base: community_base.into(),
        }
    }

    fn collection_details_url(&self) -> String {
        format!(
            "{}/ISteamRemoteStorage/GetCollectionDetails/v1/",
            self.api_base.trim_end_matches('/')
        )
    }

    fn add_child_url(&self) -> String {
        format!(
            "{}/sharedfiles/addchild",
            self.community_base.trim_end_matches('/')
        )
    }

    fn remove_child_url(&self) -> String {
        format!(
            "{}/sharedfiles/removechild",
            self.community_base.trim_end_matches('/')
        )
    }
}

/// What a request produced once the transport status has been interpreted
#[derive(Debug)]
enum TransportBody {
    Body(Bytes),
    /// 3xx: the body is treated as empty and the caller skips processing
    Redirected,
}

/// Steam Workshop API connector
///
/// Implements `RemoteCollectionClient` for Steam Workshop collections.
///
/// # Features
///
/// - One batched `GetCollectionDetails` call per fetch, whatever the batch size
/// - Schema validation of every JSON body
/// - Redirects on mutations reported as [`MutationAck::Redirected`] instead of failing
///
/// # Example
///
/// ```ignore
/// use provider_steam_workshop::SteamWorkshopConnector;
/// use bridge_traits::collection::RemoteCollectionClient;
///
/// let connector = SteamWorkshopConnector::new(http_client);
/// let batch = connector.fetch_collection_details(&["123".to_string()]).await?;
/// ```
pub struct SteamWorkshopConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    endpoints: SteamEndpoints,

    /// Applied to every request when set; otherwise requests never time out
    request_timeout: Option<Duration>,
}

impl SteamWorkshopConnector {
    /// Create a connector against the public Steam hosts
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_endpoints(http_client, SteamEndpoints::default())
    }

    /// Create a connector against custom hosts (proxies, test servers)
    pub fn with_endpoints(http_client: Arc<dyn HttpClient>, endpoints: SteamEndpoints) -> Self {
        Self {
            http_client,
            endpoints,
            request_timeout: None,
        }
    }

    /// Apply a timeout to every request
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn endpoints(&self) -> &SteamEndpoints {
        &self.endpoints
    }

    /// POST a form and interpret the transport status
    ///
    /// 2xx resolves with the body, 3xx resolves as [`TransportBody::Redirected`],
    /// anything else is an error carrying the status and body text.
    #[instrument(skip(self, form), fields(url = %url))]
    async fn post_form(
        &self,
        endpoint: &str,
        url: String,
        form: FormBody,
    ) -> std::result::Result<TransportBody, SteamWorkshopError> {
        let mut request = HttpRequest::new(HttpMethod::Post, url).form(form.encode());
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = self.http_client.execute(request).await?;

        Self::interpret(endpoint, response)
    }

    fn interpret(
        endpoint: &str,
        response: HttpResponse,
    ) -> std::result::Result<TransportBody, SteamWorkshopError> {
        let status = response.status;

        if response.is_success() {
            debug!(endpoint, status, "Steam request succeeded");
            Ok(TransportBody::Body(response.body))
        } else if response.is_redirect() {
            warn!(endpoint, status, "Steam request redirected; session may be missing or expired");
            Ok(TransportBody::Redirected)
        } else {
            warn!(endpoint, status, "Steam request failed");
            Err(SteamWorkshopError::HttpStatus {
                endpoint: endpoint.to_string(),
                status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            })
        }
    }

    fn parse<T: DeserializeOwned>(
        endpoint: &str,
        body: &[u8],
    ) -> std::result::Result<T, SteamWorkshopError> {
        serde_json::from_slice(body).map_err(|e| SteamWorkshopError::ParseError {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    fn mutation_form(collection_id: &str, item_id: &str, session_id: &str) -> FormBody {
        FormBody::new()
            .field("id", collection_id)
            .field("childid", item_id)
            .field("sessionid", session_id)
    }
}

#[async_trait]
impl RemoteCollectionClient for SteamWorkshopConnector {
    #[instrument(skip(self, collection_ids), fields(count = collection_ids.len()))]
    async fn fetch_collection_details(
        &self,
        collection_ids: &[String],
    ) -> Result<CollectionDetailsBatch> {
        debug!(?collection_ids, "Fetching collection details");

        let form = FormBody::new()
            .field("collectioncount", collection_ids.len())
            .list("publishedfileids", collection_ids);

        let body = match self
            .post_form(
                COLLECTION_DETAILS_ENDPOINT,
                self.endpoints.collection_details_url(),
                form,
            )
            .await?
        {
            TransportBody::Body(body) => body,
            TransportBody::Redirected => {
                return Err(SteamWorkshopError::Redirected {
                    endpoint: COLLECTION_DETAILS_ENDPOINT.to_string(),
                }
                .into())
            }
        };

        let envelope: GetCollectionDetailsEnvelope =
            Self::parse(COLLECTION_DETAILS_ENDPOINT, &body)?;
        let batch = CollectionDetailsBatch::from(envelope.response);

        info!(
            status = batch.status,
            collections = batch.collections.len(),
            "Fetched collection details"
        );

        Ok(batch)
    }

    #[instrument(skip(self, session_id))]
    async fn add_child(
        &self,
        collection_id: &str,
        item_id: &str,
        session_id: &str,
    ) -> Result<MutationAck> {
        let form = Self::mutation_form(collection_id, item_id, session_id);

        // Only transport-level success matters; the body is not inspected.
        match self
            .post_form(ADD_CHILD_ENDPOINT, self.endpoints.add_child_url(), form)
            .await?
        {
            TransportBody::Body(_) => Ok(MutationAck::Completed),
            TransportBody::Redirected => Ok(MutationAck::Redirected),
        }
    }

    #[instrument(skip(self, session_id))]
    async fn remove_child(
        &self,
        collection_id: &str,
        item_id: &str,
        session_id: &str,
    ) -> Result<MutationAck> {
        let form = Self::mutation_form(collection_id, item_id, session_id);

        match self
            .post_form(REMOVE_CHILD_ENDPOINT, self.endpoints.remove_child_url(), form)
            .await?
        {
            TransportBody::Body(body) => {
                let response: RemoveChildResponse = Self::parse(REMOVE_CHILD_ENDPOINT, &body)?;
                Ok(MutationAck::Status(response.success))
            }
            TransportBody::Redirected => Ok(MutationAck::Redirected),
        }
    }
}
