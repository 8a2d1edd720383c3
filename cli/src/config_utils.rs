//! Configuration and wallet loading shared by the commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use x402_router_lib::{Chain, Config, FileSigner, X402Router};

/// Load configuration from `--config` or the default location.
pub fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    Config::load_from(config_path).context("Failed to load configuration")
}

/// Path the config will be written to
pub fn config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::default_config_path()?),
    }
}

/// Load the keypair configured for `chain`.
pub fn load_signer(config: &Config, chain: Chain) -> Result<FileSigner> {
    let path = config.require_wallet(chain)?;
    Ok(FileSigner::from_file(path)?)
}

/// Build a router for `chain` signing with `signer`.
pub fn build_router(
    config: &Config,
    chain: Chain,
    signer: Arc<dyn x402_router_lib::TransactionSigner>,
) -> Result<X402Router> {
    X402Router::builder(signer)
        .config(config.router_config(chain))
        .build()
        .context("Failed to set up router")
}

/// Absolute form of `path` when it exists
pub fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
