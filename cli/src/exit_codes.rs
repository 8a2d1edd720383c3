//! Exit codes for the x402-router CLI.
//!
//! Each failure category gets its own code so scripts can react without
//! parsing error text.

use x402_router_lib::RouterError;

/// Process exit codes.
///
/// Argument errors exit with 2, which clap reports itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution
    #[allow(dead_code)]
    Success = 0,

    /// General/unknown error
    GeneralError = 1,

    /// Configuration error (missing config, invalid config)
    ConfigError = 3,

    /// Registry or provider could not be reached or answered with an error
    NetworkError = 4,

    /// Payment failed or was rejected by the provider
    PaymentFailed = 5,

    /// Balance below the provider's price
    InsufficientFunds = 6,

    /// User declined the signing prompt
    UserCancelled = 7,

    /// Wallet or signing error
    AuthError = 8,

    /// No provider found
    NotFound = 9,

    /// Provider request timed out
    Timeout = 10,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<&anyhow::Error> for ExitCode {
    fn from(err: &anyhow::Error) -> Self {
        if let Some(router_err) = err.downcast_ref::<RouterError>() {
            return ExitCode::from(router_err);
        }

        let msg = err.to_string().to_lowercase();
        if msg.contains("timed out") {
            ExitCode::Timeout
        } else if msg.contains("config") {
            ExitCode::ConfigError
        } else {
            ExitCode::GeneralError
        }
    }
}

impl From<&RouterError> for ExitCode {
    fn from(err: &RouterError) -> Self {
        match err {
            RouterError::ConfigMissing(_)
            | RouterError::InvalidConfig(_)
            | RouterError::NoConfigDir
            | RouterError::UnknownChain(_)
            | RouterError::TomlParse(_)
            | RouterError::TomlSerialize(_) => ExitCode::ConfigError,

            RouterError::Discovery(_)
            | RouterError::Provider { .. }
            | RouterError::Http(_)
            | RouterError::Curl(_) => ExitCode::NetworkError,

            RouterError::NoProviders(_)
            | RouterError::NoQualifyingProvider
            | RouterError::ProviderNotFound(_) => ExitCode::NotFound,

            RouterError::Payment(_)
            | RouterError::PaymentRejected(_)
            | RouterError::InvalidAmount(_) => ExitCode::PaymentFailed,

            RouterError::InsufficientFunds { .. } => ExitCode::InsufficientFunds,

            RouterError::Wallet(msg) if msg.starts_with("signing rejected") => {
                ExitCode::UserCancelled
            }
            RouterError::Wallet(_) | RouterError::Signing(_) => ExitCode::AuthError,

            RouterError::Timeout { .. } => ExitCode::Timeout,

            RouterError::Json(_) | RouterError::Io(_) => ExitCode::GeneralError,
        }
    }
}
