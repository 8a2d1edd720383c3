//! `balance`: USDC balance of the configured wallet

use crate::colors::Colors;
use crate::config_utils::{build_router, load_config, load_signer};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use x402_router_lib::utils::truncate_address;
use x402_router_lib::{format_usdc, Chain};

pub async fn balance_command(config_override: Option<&PathBuf>, chain: Option<Chain>) -> Result<()> {
    let config = load_config(config_override)?;
    let chain = chain.unwrap_or(config.default_chain);
    let signer = Arc::new(load_signer(&config, chain)?);
    let router = build_router(&config, chain, signer)?;

    let balance = router
        .get_balance()
        .await
        .with_context(|| format!("Failed to read {} balance", chain.display_name()))?;

    println!(
        "{} {}",
        Colors::key("Chain:"),
        Colors::chain(chain.display_name())
    );
    println!(
        "{} {}",
        Colors::key("Wallet:"),
        Colors::address(&truncate_address(&router.payer().to_string(), 4))
    );
    println!(
        "{} {}",
        Colors::key("Balance:"),
        Colors::amount(&format!("{} USDC", format_usdc(balance)))
    );
    if !chain.is_supported() {
        println!(
            "{}",
            Colors::dim(&format!(
                "{} balances are not tracked yet and always read as zero.",
                chain.display_name()
            ))
        );
    }

    Ok(())
}
