//! Wire and value types shared by discovery, payment and the router.

use crate::chain::Chain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A priced API endpoint as listed by the registry.
///
/// Snapshots are never modified after they are received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub url: String,
    /// Payout address for this provider
    pub wallet: String,
    /// Price per call in USDC
    pub price: f64,
    pub reputation: f64,
    /// Expected latency in milliseconds
    pub latency: f64,
}

/// Registry query. Also the shape of the discovery cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    pub api: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_reputation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl DiscoveryRequest {
    pub fn new(api: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    #[must_use]
    pub fn min_reputation(mut self, reputation: f64) -> Self {
        self.min_reputation = Some(reputation);
        self
    }

    #[must_use]
    pub fn max_latency(mut self, latency: f64) -> Self {
        self.max_latency = Some(latency);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Canonical cache key over the constraint tuple.
    ///
    /// `limit` is excluded: it is applied after retrieval regardless of
    /// whether the providers came from the cache or the registry.
    pub fn cache_key(&self) -> String {
        fn part(value: Option<f64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
        }
        format!(
            "{}:{}:{}:{}",
            self.api,
            part(self.max_price),
            part(self.min_reputation),
            part(self.max_latency)
        )
    }

    /// Whether a provider satisfies every constraint present on this request
    pub fn accepts(&self, provider: &Provider) -> bool {
        self.max_price.is_none_or(|max| provider.price <= max)
            && self.min_reputation.is_none_or(|min| provider.reputation >= min)
            && self.max_latency.is_none_or(|max| provider.latency <= max)
    }

    /// Apply the constraints, then truncate to `limit`.
    pub fn filter(&self, providers: &[Provider]) -> Vec<Provider> {
        providers
            .iter()
            .filter(|p| self.accepts(p))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

/// Registry response to `POST /discover`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub providers: Vec<Provider>,
    /// Freshness window in seconds
    #[serde(rename = "cacheTTL")]
    pub cache_ttl: u64,
}

/// Record of a completed or waived transfer.
///
/// Created once per call that reaches the provider and handed to the HTTP
/// layer by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Transaction signature, or [`crate::constants::FREE_CALL_TOKEN`] for zero-cost calls
    pub token: String,
    pub to: String,
    pub amount: f64,
    pub resource: String,
    pub chain: Chain,
    pub timestamp: DateTime<Utc>,
}

impl Payment {
    /// Whether this payment was waived rather than settled on-chain
    pub fn is_free(&self) -> bool {
        self.token == crate::constants::FREE_CALL_TOKEN
    }
}

/// Per-call overrides. Nothing here outlives the call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    pub max_price: Option<f64>,
    pub min_reputation: Option<f64>,
    pub max_latency: Option<f64>,
    pub prefer_cheap: bool,
    /// Pin a provider by id, bypassing the selection policy
    pub provider_id: Option<String>,
    /// Provider request deadline in milliseconds
    pub timeout_ms: Option<u64>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    #[must_use]
    pub fn min_reputation(mut self, reputation: f64) -> Self {
        self.min_reputation = Some(reputation);
        self
    }

    #[must_use]
    pub fn max_latency(mut self, latency: f64) -> Self {
        self.max_latency = Some(latency);
        self
    }

    #[must_use]
    pub fn prefer_cheap(mut self) -> Self {
        self.prefer_cheap = true;
        self
    }

    #[must_use]
    pub fn provider(mut self, id: impl Into<String>) -> Self {
        self.provider_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Build the discovery query for this call
    pub fn discovery_request(&self, api: &str, limit: usize) -> DiscoveryRequest {
        DiscoveryRequest {
            api: api.to_string(),
            max_price: self.max_price,
            min_reputation: self.min_reputation,
            max_latency: self.max_latency,
            limit: Some(limit),
        }
    }
}

/// Body sent to `POST {provider}/call`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    pub api: String,
    pub params: serde_json::Value,
}

/// Result of a successful routed call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: T,
    pub provider_id: String,
    /// Price paid in USDC
    pub cost: f64,
    /// Wall-clock time from discovery to decoded response, in milliseconds
    pub latency: u64,
    pub timestamp: DateTime<Utc>,
}
