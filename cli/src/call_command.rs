//! `call`: route one paid API call

use crate::cli::{CallArgs, OutputFormat};
use crate::colors::Colors;
use crate::config_utils::{build_router, load_config, load_signer};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use x402_router_lib::utils::truncate_address;
use x402_router_lib::{
    format_usdc, ApiResponse, CallOptions, Config, FileSigner, RouterError, TransactionSigner,
    WalletRequests, WalletSigner,
};

pub async fn call_command(config_override: Option<&PathBuf>, args: &CallArgs) -> Result<()> {
    let config = load_config(config_override)?;
    let chain = config.default_chain;
    let local = Arc::new(load_signer(&config, chain)?);

    let signer: Arc<dyn TransactionSigner> = if args.confirm {
        let (wallet, requests) = WalletSigner::connect(local.pubkey());
        tokio::spawn(confirm_loop(requests, Arc::clone(&local), args.api.clone()));
        Arc::new(wallet)
    } else {
        local
    };

    let router = build_router(&config, chain, signer)?;
    let options = call_options(&config, args);
    let params = parse_params(&args.params);

    let response: ApiResponse<Value> = router
        .call(&args.api, params, &options)
        .await
        .with_context(|| format!("Call to '{}' failed", args.api))?;

    print_response(&response, args.output_format)
}

/// Preferences from the config file, overridden by flags
fn call_options(config: &Config, args: &CallArgs) -> CallOptions {
    let mut options = config.call_options();
    if args.max_price.is_some() {
        options.max_price = args.max_price;
    }
    if args.min_reputation.is_some() {
        options.min_reputation = args.min_reputation;
    }
    if args.max_latency.is_some() {
        options.max_latency = args.max_latency;
    }
    if args.timeout.is_some() {
        options.timeout_ms = args.timeout;
    }
    options.prefer_cheap |= args.prefer_cheap;
    options.provider_id = args.provider.clone();
    options
}

/// JSON parameters pass through; anything else becomes `{"input": raw}`.
fn parse_params(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({ "input": raw }))
}

/// Answer signing requests by asking on the terminal first.
async fn confirm_loop(mut requests: WalletRequests, local: Arc<FileSigner>, api: String) {
    while let Some(request) = requests.next().await {
        let (transaction, reply) = request.into_parts();
        let prompt = format!(
            "Sign payment from {} for '{api}'?",
            truncate_address(&local.pubkey().to_string(), 4)
        );

        let answer = tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(true)) => match local.sign_transaction(transaction).await {
                Ok(signed) => reply.approve(signed),
                Err(e) => reply.fail(e),
            },
            Ok(Ok(false)) => reply.reject("declined by user"),
            Ok(Err(e)) => reply.fail(RouterError::wallet(format!(
                "confirmation prompt failed: {e}"
            ))),
            Err(e) => reply.fail(RouterError::wallet(format!(
                "confirmation prompt failed: {e}"
            ))),
        }
    }
}

fn print_response(response: &ApiResponse<Value>, format: OutputFormat) -> Result<()> {
    match format.resolve() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Text | OutputFormat::Auto => {
            println!("{} {}", Colors::key("Provider:"), response.provider_id);
            println!(
                "{} {}",
                Colors::key("Cost:"),
                Colors::amount(&format_usdc(response.cost))
            );
            println!("{} {}ms", Colors::key("Latency:"), response.latency);
            println!();
            let body = serde_json::to_string_pretty(&response.data)
                .context("Failed to render provider response")?;
            println!("{body}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn args(extra: &[&str]) -> CallArgs {
        let mut argv = vec!["x402-router", "call", "weather", "{}"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Call(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_params() {
        assert_eq!(
            parse_params(r#"{"city":"Lisbon"}"#),
            serde_json::json!({"city": "Lisbon"})
        );
        assert_eq!(
            parse_params("hello world"),
            serde_json::json!({"input": "hello world"})
        );
        assert_eq!(parse_params("42"), serde_json::json!(42));
    }

    #[test]
    fn test_flags_override_preferences() {
        let mut config = Config::default();
        config.preferences.max_price = Some(1.0);
        config.preferences.timeout_ms = 5_000;

        let options = call_options(&config, &args(&["--max-price", "0.2", "--provider", "p1"]));
        assert_eq!(options.max_price, Some(0.2));
        assert_eq!(options.timeout_ms, Some(5_000));
        assert_eq!(options.provider_id.as_deref(), Some("p1"));
        assert!(!options.prefer_cheap);
    }

    #[test]
    fn test_preferences_apply_without_flags() {
        let mut config = Config::default();
        config.preferences.prefer_cheap = true;
        config.preferences.max_price = Some(0.3);

        let options = call_options(&config, &args(&["--timeout", "750"]));
        assert!(options.prefer_cheap);
        assert_eq!(options.max_price, Some(0.3));
        assert_eq!(options.timeout_ms, Some(750));
    }
}
