//! Error types for the router library.
//!
//! Every failure in the call pipeline is a [`RouterError`]. Each step keeps its
//! own variant so callers can tell a discovery failure from a rejected payment
//! without parsing messages.

use thiserror::Error;

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug)]
pub enum RouterError {
    // ==================== Configuration ====================
    #[error("{0}")]
    ConfigMissing(String),

    #[error("{0}")]
    InvalidConfig(String),

    #[error("Could not find config directory. Ensure your home directory is accessible or pass --config.")]
    NoConfigDir,

    #[error("Unknown chain '{0}'. Supported chains: solana, ethereum, base.")]
    UnknownChain(String),

    // ==================== Discovery ====================
    #[error("Failed to discover providers: {0}")]
    Discovery(String),

    #[error("Provider '{0}' was not found in the registry.")]
    ProviderNotFound(String),

    #[error("No providers available for {0}")]
    NoProviders(String),

    #[error("No provider satisfies the requested constraints.")]
    NoQualifyingProvider,

    // ==================== Payment ====================
    #[error("Payment failed: {0}")]
    Payment(String),

    #[error("Insufficient funds: this call costs {required} USDC but your balance is {available} USDC.")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Invalid amount '{0}'. Expected a finite, non-negative number.")]
    InvalidAmount(String),

    // ==================== Provider call ====================
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Payment rejected by provider: {0}")]
    PaymentRejected(String),

    #[error("Provider error (HTTP {status}): {detail}")]
    Provider { status: u32, detail: String },

    #[error("{0}")]
    Http(String),

    // ==================== Wallet ====================
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    // ==================== External Library Errors ====================
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file format: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to save config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network request failed: {0}")]
    Curl(#[from] curl::Error),
}

impl RouterError {
    /// Create a discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a payment error
    pub fn payment(msg: impl Into<String>) -> Self {
        Self::Payment(msg.into())
    }

    /// Create a signing error
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Create a wallet error
    pub fn wallet(msg: impl Into<String>) -> Self {
        Self::Wallet(msg.into())
    }

    /// Create a config missing error
    pub fn config_missing(msg: impl Into<String>) -> Self {
        Self::ConfigMissing(msg.into())
    }

    /// True when the failure happened after a payment may already have been
    /// confirmed on-chain. Such payments are never refunded automatically.
    pub fn is_post_payment(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::PaymentRejected(_)
                | Self::Provider { .. }
                | Self::Http(_)
                | Self::Curl(_)
        )
    }
}
