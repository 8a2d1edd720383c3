//! x402-router-lib - Client-side router for pay-per-call APIs
//!
//! A call names a logical API. The router discovers providers in a registry,
//! selects one under price, latency and reputation constraints, pays it in
//! USDC and forwards the call with the payment proof attached.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chain;
pub mod config;
pub mod constants;
pub mod currency;
pub mod discovery;
pub mod error;
pub mod http;
pub mod payment;
pub mod router;
pub mod selection;
pub mod signer;
pub mod types;
pub mod utils;

pub use chain::Chain;
pub use config::{Config, Preferences, WalletPaths};
pub use currency::{currencies, format_usdc, Currency};
pub use discovery::DiscoveryClient;
pub use error::{Result, RouterError};
pub use http::{CurlTransport, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use payment::{Ledger, PaymentClient, SolanaRpcLedger};
pub use router::{RouterBuilder, RouterConfig, X402Router};
pub use selection::{select_best_provider, BestProvider, ProviderSelector};
pub use signer::{FileSigner, SigningRequest, TransactionSigner, WalletRequests, WalletSigner};
pub use types::{ApiResponse, CallOptions, CallRequest, DiscoveryRequest, Payment, Provider};
