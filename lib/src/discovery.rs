//! Registry client with a per-query TTL cache.

use crate::error::{Result, RouterError};
use crate::http::{HttpRequest, HttpTransport};
use crate::types::{DiscoveryRequest, DiscoveryResponse, Provider};
use crate::utils::join_url;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    providers: Vec<Provider>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Looks up providers in the registry.
///
/// Results of [`DiscoveryClient::discover`] are cached by the constraint tuple
/// for the TTL the registry returns. Expired entries are never served.
pub struct DiscoveryClient {
    registry_url: String,
    transport: Arc<dyn HttpTransport>,
    cache: DashMap<String, CacheEntry>,
}

impl DiscoveryClient {
    pub fn new(registry_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            registry_url: registry_url.into(),
            transport,
            cache: DashMap::new(),
        }
    }

    /// Providers for `request.api` satisfying every constraint on the request,
    /// truncated to `request.limit`.
    pub async fn discover(&self, request: &DiscoveryRequest) -> Result<Vec<Provider>> {
        let key = request.cache_key();

        if let Some(entry) = self.cache.get(&key) {
            if entry.is_fresh(Instant::now()) {
                debug!(key = %key, "discovery cache hit");
                return Ok(request.filter(&entry.providers));
            }
        }

        let url = join_url(&self.registry_url, "discover");
        debug!(url = %url, api = %request.api, "querying registry");

        let response = self
            .transport
            .send(HttpRequest::post_json(url, request)?)
            .await
            .map_err(|e| RouterError::discovery(e.to_string()))?;

        if !response.is_success() {
            return Err(RouterError::discovery(format!(
                "Registry returned {}",
                response.status_code
            )));
        }

        let body: DiscoveryResponse = response
            .json()
            .map_err(|e| RouterError::discovery(format!("invalid registry response: {e}")))?;

        let filtered = request.filter(&body.providers);
        self.cache.insert(
            key,
            CacheEntry {
                providers: body.providers,
                expires_at: Instant::now() + Duration::from_secs(body.cache_ttl),
            },
        );

        Ok(filtered)
    }

    /// Direct registry lookup by id. Never touches the cache.
    pub async fn get_provider(&self, id: &str) -> Result<Provider> {
        let url = join_url(
            &self.registry_url,
            &format!("provider/{}", urlencoding::encode(id)),
        );
        debug!(url = %url, "fetching provider");

        let response = self
            .transport
            .send(HttpRequest::get(url))
            .await
            .map_err(|e| RouterError::discovery(format!("Failed to get provider: {e}")))?;

        if !response.is_success() {
            return Err(RouterError::ProviderNotFound(id.to_string()));
        }

        response
            .json()
            .map_err(|e| RouterError::discovery(format!("Failed to get provider: {e}")))
    }

    /// Drop every cached entry, fresh or not.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached query shapes, including expired ones not yet replaced
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for DiscoveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryClient")
            .field("registry_url", &self.registry_url)
            .field("cached_queries", &self.cache.len())
            .finish()
    }
}
