//! The call pipeline: discover, select, check funds, pay, invoke.

use crate::chain::Chain;
use crate::constants::{
    DEFAULT_REGISTRY_URL, DEFAULT_SOLANA_RPC_URL, DEFAULT_TIMEOUT_MS, DISCOVERY_LIMIT,
    PAYMENT_CHAIN_HEADER, PAYMENT_HEADER,
};
use crate::discovery::DiscoveryClient;
use crate::error::{Result, RouterError};
use crate::http::{CurlTransport, HttpRequest, HttpResponse, HttpTransport};
use crate::payment::{Ledger, PaymentClient};
use crate::selection::{BestProvider, ProviderSelector};
use crate::signer::TransactionSigner;
use crate::types::{ApiResponse, CallOptions, CallRequest, Payment, Provider};
use crate::utils::{duration_ms, join_url};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline progress goes out at `info` with logging on, `debug` otherwise.
macro_rules! step {
    ($router:expr, $($arg:tt)+) => {
        if $router.config.logging {
            info!($($arg)+)
        } else {
            debug!($($arg)+)
        }
    };
}

/// Router settings fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    pub registry: String,
    pub chain: Chain,
    pub rpc_url: String,
    pub logging: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY_URL.to_string(),
            chain: Chain::default(),
            rpc_url: DEFAULT_SOLANA_RPC_URL.to_string(),
            logging: true,
        }
    }
}

/// Builder for [`X402Router`].
#[must_use]
pub struct RouterBuilder {
    signer: Arc<dyn TransactionSigner>,
    config: RouterConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    ledger: Option<Arc<dyn Ledger>>,
    selector: Option<Arc<dyn ProviderSelector>>,
}

impl RouterBuilder {
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(mut self, url: impl Into<String>) -> Self {
        self.config.registry = url.into();
        self
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.config.chain = chain;
        self
    }

    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.rpc_url = url.into();
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.config.logging = enabled;
        self
    }

    /// Replace the curl transport used for registry and provider requests.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the Solana RPC ledger built from `rpc_url`.
    pub fn ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Replace the default selection policy.
    pub fn selector(mut self, selector: impl ProviderSelector + 'static) -> Self {
        self.selector = Some(Arc::new(selector));
        self
    }

    pub fn build(self) -> Result<X402Router> {
        let RouterBuilder {
            signer,
            config,
            transport,
            ledger,
            selector,
        } = self;

        if config.registry.trim().is_empty() {
            return Err(RouterError::config_missing(
                "No registry URL configured. Set one with 'x402-router config set registry <URL>'.",
            ));
        }

        let transport = transport.unwrap_or_else(|| {
            Arc::new(CurlTransport::new().user_agent(concat!(
                "x402-router/",
                env!("CARGO_PKG_VERSION")
            )))
        });

        let payment = match ledger {
            Some(ledger) => PaymentClient::new(signer, config.chain, Some(ledger)),
            None => PaymentClient::with_rpc(signer, config.chain, &config.rpc_url),
        };

        Ok(X402Router {
            discovery: DiscoveryClient::new(&config.registry, Arc::clone(&transport)),
            payment,
            transport,
            selector: selector.unwrap_or_else(|| Arc::new(BestProvider)),
            config,
        })
    }
}

/// Routes API calls to paid providers.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use x402_router_lib::{CallOptions, FileSigner, X402Router};
/// # async fn example() -> x402_router_lib::Result<()> {
/// let signer = Arc::new(FileSigner::from_file("id.json")?);
/// let router = X402Router::builder(signer).build()?;
///
/// let response = router
///     .call::<serde_json::Value>(
///         "weather",
///         serde_json::json!({"city": "Lisbon"}),
///         &CallOptions::new().max_price(0.5),
///     )
///     .await?;
/// println!("paid {} to {}", response.cost, response.provider_id);
/// # Ok(())
/// # }
/// ```
pub struct X402Router {
    config: RouterConfig,
    discovery: DiscoveryClient,
    payment: PaymentClient,
    transport: Arc<dyn HttpTransport>,
    selector: Arc<dyn ProviderSelector>,
}

impl X402Router {
    pub fn builder(signer: Arc<dyn TransactionSigner>) -> RouterBuilder {
        RouterBuilder {
            signer,
            config: RouterConfig::default(),
            transport: None,
            ledger: None,
            selector: None,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn payer(&self) -> solana_sdk::pubkey::Pubkey {
        self.payment.payer()
    }

    /// Route one call to `api` and decode the provider's `data` as `T`.
    ///
    /// A payment that has been confirmed is not refunded if the provider call
    /// then fails.
    pub async fn call<T: DeserializeOwned>(
        &self,
        api: &str,
        params: Value,
        options: &CallOptions,
    ) -> Result<ApiResponse<T>> {
        let start = Instant::now();

        match self.execute(api, params, options, start).await {
            Ok(response) => {
                step!(self, latency_ms = response.latency, "request completed");
                Ok(response)
            }
            Err(e) => {
                if e.is_post_payment() {
                    warn!(api, error = %e, "request failed after payment, payment is not refunded");
                } else {
                    warn!(api, error = %e, "request failed");
                }
                Err(e)
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        api: &str,
        params: Value,
        options: &CallOptions,
        start: Instant,
    ) -> Result<ApiResponse<T>> {
        step!(self, api, "discovering providers");
        let providers = self
            .discovery
            .discover(&options.discovery_request(api, DISCOVERY_LIMIT))
            .await?;
        if providers.is_empty() {
            return Err(RouterError::NoProviders(api.to_string()));
        }

        let provider = match options.provider_id.as_deref() {
            Some(id) => self.discovery.get_provider(id).await?,
            None => self.selector.select(&providers, options)?,
        };
        step!(self, provider = %provider.id, price = provider.price, "using provider");

        self.ensure_funds(provider.price).await?;

        let resource = format!("{}/{}", provider.url.trim_end_matches('/'), api);
        let payment = self
            .payment
            .create_payment(&provider.wallet, provider.price, &resource)
            .await?;
        step!(self, token = %payment.token, amount = payment.amount, "payment ready");

        let data = self
            .call_provider(&provider, api, params, &payment, options)
            .await?;

        Ok(ApiResponse {
            data,
            provider_id: provider.id,
            cost: provider.price,
            latency: duration_ms(start.elapsed()),
            timestamp: Utc::now(),
        })
    }

    async fn ensure_funds(&self, required: f64) -> Result<()> {
        let available = self.payment.get_balance().await?;
        debug!(available, required, "balance checked");
        if available < required {
            return Err(RouterError::InsufficientFunds {
                required,
                available,
            });
        }
        Ok(())
    }

    async fn call_provider<T: DeserializeOwned>(
        &self,
        provider: &Provider,
        api: &str,
        params: Value,
        payment: &Payment,
        options: &CallOptions,
    ) -> Result<T> {
        let timeout_ms = options.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        let deadline = Duration::from_millis(timeout_ms);

        let body = CallRequest {
            api: api.to_string(),
            params,
        };
        let request = HttpRequest::post_json(join_url(&provider.url, "call"), &body)?
            .header(PAYMENT_HEADER, payment.token.as_str())
            .header(PAYMENT_CHAIN_HEADER, payment.chain.as_str())
            .timeout(deadline);

        // Dropping the send future on expiry aborts the request.
        let response = match tokio::time::timeout(deadline, self.transport.send(request)).await {
            Err(_) | Ok(Err(RouterError::Timeout { .. })) => {
                return Err(RouterError::Timeout { timeout_ms })
            }
            Ok(result) => result?,
        };

        interpret_response(&response)
    }

    /// Spendable balance of the signer on the configured chain.
    pub async fn get_balance(&self) -> Result<f64> {
        self.payment.get_balance().await
    }

    /// Forget all cached discovery results.
    pub fn clear_cache(&self) {
        self.discovery.clear_cache();
    }
}

impl std::fmt::Debug for X402Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X402Router")
            .field("config", &self.config)
            .field("discovery", &self.discovery)
            .field("payment", &self.payment)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SuccessBody<T> {
    data: T,
}

#[derive(Deserialize, Default)]
struct FailureBody {
    message: Option<String>,
    error: Option<String>,
}

fn interpret_response<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    if response.is_payment_required() {
        let body: FailureBody = response.json().unwrap_or_default();
        return Err(RouterError::PaymentRejected(
            body.message.unwrap_or_else(|| "Payment required".to_string()),
        ));
    }

    if !response.is_success() {
        let body: FailureBody = response.json().unwrap_or_default();
        let detail = body.error.unwrap_or_else(|| {
            let text = response.text();
            if text.trim().is_empty() {
                format!("HTTP {}", response.status_code)
            } else {
                text.trim().to_string()
            }
        });
        return Err(RouterError::Provider {
            status: response.status_code,
            detail,
        });
    }

    let body: SuccessBody<T> = response
        .json()
        .map_err(|e| RouterError::Http(format!("Invalid provider response: {e}")))?;
    Ok(body.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn response(status: u32, body: &str) -> HttpResponse {
        HttpResponse {
            status_code: status,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_interpret_success_unwraps_data() {
        let value: Value = interpret_response(&response(200, r#"{"data":{"ok":true}}"#)).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_interpret_402_is_payment_rejected() {
        let err =
            interpret_response::<Value>(&response(402, r#"{"message":"proof expired"}"#)).unwrap_err();
        assert!(matches!(err, RouterError::PaymentRejected(ref m) if m == "proof expired"));
    }

    #[test]
    fn test_interpret_402_without_message() {
        let err = interpret_response::<Value>(&response(402, "")).unwrap_err();
        assert!(matches!(err, RouterError::PaymentRejected(ref m) if m == "Payment required"));
    }

    #[test]
    fn test_interpret_other_failure_is_provider_error() {
        let err = interpret_response::<Value>(&response(500, r#"{"error":"upstream down"}"#))
            .unwrap_err();
        match err {
            RouterError::Provider { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = interpret_response::<Value>(&response(503, "")).unwrap_err();
        assert!(matches!(err, RouterError::Provider { status: 503, ref detail } if detail == "HTTP 503"));
    }

    #[test]
    fn test_interpret_malformed_success_body() {
        let err = interpret_response::<Value>(&response(200, "not json")).unwrap_err();
        assert!(matches!(err, RouterError::Http(_)));
        assert!(err.is_post_payment());
    }

    #[test]
    fn test_router_config_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.registry, DEFAULT_REGISTRY_URL);
        assert_eq!(config.chain, Chain::Solana);
        assert_eq!(config.rpc_url, DEFAULT_SOLANA_RPC_URL);
        assert!(config.logging);
    }
}
