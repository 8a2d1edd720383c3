//! Error display helpers with actionable suggestions.

use crate::colors::Colors;
use x402_router_lib::RouterError;

/// Get a suggestion for how to fix an error, if available.
pub fn get_suggestion(err: &anyhow::Error) -> Option<String> {
    if let Some(router_err) = err.downcast_ref::<RouterError>() {
        return get_router_error_suggestion(router_err);
    }

    let msg = err.to_string().to_lowercase();

    if msg.contains("permission denied") {
        return Some("Check file permissions or run with appropriate privileges.".into());
    }

    None
}

fn get_router_error_suggestion(err: &RouterError) -> Option<String> {
    match err {
        RouterError::ConfigMissing(_) => Some(
            "Run 'x402-router init --keypair <PATH>' to point the router at a wallet.".into(),
        ),

        RouterError::NoConfigDir => {
            Some("Could not determine home directory. Set HOME or pass --config.".into())
        }

        RouterError::InvalidConfig(_) | RouterError::TomlParse(_) => {
            Some("Run 'x402-router config' to view your current configuration.".into())
        }

        RouterError::UnknownChain(_) => Some("Use one of: solana, ethereum, base.".into()),

        RouterError::Discovery(_) => {
            Some("Check the registry URL with 'x402-router config get registry'.".into())
        }

        RouterError::NoProviders(api) => Some(format!(
            "No provider is registered for '{api}'. Check the API name."
        )),

        RouterError::NoQualifyingProvider => Some(
            "Relax --max-price, --min-reputation or --max-latency, or pin one with --provider."
                .into(),
        ),

        RouterError::InsufficientFunds { .. } => Some(
            "Check your balance with 'x402-router balance' and add USDC to your wallet.".into(),
        ),

        RouterError::Timeout { .. } => Some(
            "The provider did not answer in time. Raise the limit with --timeout. \
             The payment for this call is not refunded."
                .into(),
        ),

        RouterError::PaymentRejected(_) | RouterError::Provider { .. } => Some(
            "The payment for this call was sent and is not refunded. \
             Try another provider with --provider."
                .into(),
        ),

        RouterError::Wallet(msg) if msg.starts_with("signing rejected") => None,

        RouterError::Wallet(_) | RouterError::Signing(_) => Some(
            "Check that the keypair file configured under [wallet] exists and is valid.".into(),
        ),

        _ => None,
    }
}

/// Format an error with its suggestion for display.
pub fn format_error_with_suggestion(err: &anyhow::Error) -> String {
    let mut output = format!("{} {err:#}", Colors::error("Error:"));

    if let Some(suggestion) = get_suggestion(err) {
        output.push_str(&format!("\n\n{}:\n", Colors::info("Suggestion")));
        output.push_str(&suggestion);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_suggestion() {
        let err = RouterError::ConfigMissing("test".into());
        let suggestion = get_router_error_suggestion(&err).unwrap();
        assert!(suggestion.contains("x402-router init"));
    }

    #[test]
    fn test_post_payment_failures_mention_refund() {
        let err = RouterError::PaymentRejected("proof expired".into());
        assert!(get_router_error_suggestion(&err)
            .unwrap()
            .contains("not refunded"));
    }

    #[test]
    fn test_format_includes_context_and_suggestion() {
        colored::control::set_override(false);
        let err = anyhow::Error::new(RouterError::InsufficientFunds {
            required: 5.0,
            available: 1.0,
        })
        .context("Call to 'weather' failed");

        let text = format_error_with_suggestion(&err);
        assert!(text.starts_with("Error: Call to 'weather' failed: Insufficient funds"));
        assert!(text.contains("x402-router balance"));
    }
}
