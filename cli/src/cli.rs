use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use x402_router_lib::Chain;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
}

fn parse_chain(s: &str) -> Result<Chain, String> {
    s.parse::<Chain>().map_err(|e| e.to_string())
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Text on a terminal, JSON when piped
    #[default]
    Auto,
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    /// Resolve `Auto` against stdout: `Text` for a terminal, `Json` otherwise.
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "x402-router")]
#[command(about = "Route paid API calls to the best x402 provider", long_about = None)]
#[command(version)]
#[command(styles = styles())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short = 'C', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbosity", action = clap::ArgAction::Count, global = true, help_heading = "Display Options")]
    pub verbosity: u8,

    /// Do not print log messages
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help_heading = "Display Options"
    )]
    pub quiet: bool,

    /// Control color output
    #[arg(
        long,
        value_name = "MODE",
        default_value = "auto",
        global = true,
        help_heading = "Display Options"
    )]
    pub color: ColorMode,
}

impl Cli {
    /// Log filter directive implied by `-v` / `-q`
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "off";
        }
        match self.verbosity {
            0 => "warn,x402_router_lib=info",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a config file pointing at an existing keypair
    #[command(after_help = "Examples:
  x402-router init --keypair ~/.config/solana/id.json
  x402-router init --keypair ./payer.json --registry https://registry.example")]
    Init {
        /// Path to a keypair file (JSON array of 64 bytes)
        #[arg(long, value_name = "PATH")]
        keypair: PathBuf,

        /// Chain the keypair pays on
        #[arg(long, value_name = "CHAIN", default_value = "solana", value_parser = parse_chain)]
        chain: Chain,

        /// Registry URL
        #[arg(long, value_name = "URL")]
        registry: Option<String>,
    },

    /// Call an API through the best available provider
    #[command(after_help = "Examples:
  x402-router call weather '{\"city\": \"Lisbon\"}'
  x402-router call translate 'hello world' --max-price 0.05 --prefer-cheap
  x402-router call weather '{}' --provider acme-weather --timeout 5000")]
    Call(CallArgs),

    /// Show the USDC balance of the configured wallet
    Balance {
        /// Chain to check (defaults to the configured chain)
        #[arg(long, value_name = "CHAIN", value_parser = parse_chain)]
        chain: Option<Chain>,
    },

    /// Show or change configuration
    #[command(after_help = "Examples:
  x402-router config
  x402-router config get preferences.max_price
  x402-router config set preferences.prefer_cheap true")]
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CallArgs {
    /// Logical API name, e.g. `weather`
    #[arg(value_name = "API")]
    pub api: String,

    /// Parameters as JSON; anything else is sent as {"input": PARAMS}
    #[arg(value_name = "PARAMS")]
    pub params: String,

    /// Maximum price per call in USDC
    #[arg(long, value_name = "USDC", help_heading = "Selection Options")]
    pub max_price: Option<f64>,

    /// Minimum provider reputation
    #[arg(long, value_name = "SCORE", help_heading = "Selection Options")]
    pub min_reputation: Option<f64>,

    /// Maximum expected provider latency in milliseconds
    #[arg(long, value_name = "MS", help_heading = "Selection Options")]
    pub max_latency: Option<f64>,

    /// Pick the cheapest qualifying provider
    #[arg(long, help_heading = "Selection Options")]
    pub prefer_cheap: bool,

    /// Use this provider id instead of selecting one
    #[arg(long = "provider", value_name = "ID", help_heading = "Selection Options")]
    pub provider: Option<String>,

    /// Provider request timeout in milliseconds
    #[arg(long, value_name = "MS", help_heading = "Payment Options")]
    pub timeout: Option<u64>,

    /// Ask before signing the payment
    #[arg(long, env = "X402_ROUTER_CONFIRM", help_heading = "Payment Options")]
    pub confirm: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "auto")]
    pub output_format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print one value by dotted key
    Get {
        /// Key such as `registry` or `preferences.max_price`
        key: String,
    },
    /// Set one value by dotted key and save
    Set {
        key: String,
        value: String,
    },
}
