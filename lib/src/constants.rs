//! Constants used throughout the router library

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;

/// Name of the directory under `$HOME` holding router files
pub const APP_DIR: &str = ".x402-router";

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Registry used when none is configured
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.x402apis.io";

/// Solana mainnet-beta RPC endpoint
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default provider request timeout in milliseconds (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Number of candidates requested from discovery for each call
pub const DISCOVERY_LIMIT: usize = 10;

/// Proof token attached to zero-cost calls. Carries no cryptographic proof.
pub const FREE_CALL_TOKEN: &str = "free-api-call";

/// Header carrying the payment proof token
pub const PAYMENT_HEADER: &str = "X-Payment";

/// Header carrying the settlement chain tag
pub const PAYMENT_CHAIN_HEADER: &str = "X-Payment-Chain";

/// Mainnet USDC mint
pub const USDC_MINT: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

/// Size of a Solana keypair in bytes (32 bytes private + 32 bytes public)
pub const SOLANA_KEYPAIR_BYTES: usize = 64;

/// Get the router home directory (`~/.x402-router/`)
///
/// Returns `None` if the home directory cannot be determined.
pub fn router_home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DIR))
}

/// Get the default config file path (`~/.x402-router/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    router_home_dir().map(|p| p.join(CONFIG_FILE))
}
