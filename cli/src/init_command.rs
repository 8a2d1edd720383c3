//! `init`: point the config at an existing keypair file

use crate::colors::Colors;
use crate::config_utils::{absolute, config_path};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use x402_router_lib::utils::truncate_address;
use x402_router_lib::{Chain, Config, FileSigner, TransactionSigner};

pub fn init_command(
    config_override: Option<&PathBuf>,
    keypair: &Path,
    chain: Chain,
    registry: Option<&str>,
) -> Result<()> {
    let signer = FileSigner::from_file(keypair)?;
    let path = config_path(config_override)?;

    let mut config = Config::load_or_default(Some(&path))
        .with_context(|| format!("Existing config at {} is unreadable", path.display()))?;
    config.wallet.set(chain, absolute(keypair));
    config.default_chain = chain;
    if let Some(url) = registry {
        config.registry = url.to_string();
    }

    let written = config.save_to(Some(&path))?;
    tracing::debug!(path = %written.display(), %chain, "config written");

    println!(
        "{} {}",
        Colors::success("Config written to"),
        Colors::path(&written.display().to_string())
    );
    println!(
        "  {} {} {}",
        Colors::key("Wallet:"),
        Colors::address(&truncate_address(&signer.pubkey().to_string(), 4)),
        Colors::dim(&format!("({})", chain.display_name()))
    );
    println!("  {} {}", Colors::key("Registry:"), config.registry);
    if !chain.is_supported() {
        println!(
            "  {}",
            Colors::warning(&format!(
                "Payments on {} are not supported yet; calls will fail.",
                chain.display_name()
            ))
        );
    }

    Ok(())
}
