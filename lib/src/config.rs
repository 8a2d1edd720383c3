//! User configuration stored at `~/.x402-router/config.toml`.

use crate::chain::Chain;
use crate::constants::{DEFAULT_REGISTRY_URL, DEFAULT_SOLANA_RPC_URL, DEFAULT_TIMEOUT_MS};
use crate::error::{Result, RouterError};
use crate::router::RouterConfig;
use crate::types::CallOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_registry() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default)]
    pub default_chain: Chain,
    /// Solana RPC endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default = "default_true")]
    pub logging: bool,
    #[serde(default)]
    pub wallet: WalletPaths,
    #[serde(default)]
    pub preferences: Preferences,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            default_chain: Chain::default(),
            rpc_url: None,
            logging: true,
            wallet: WalletPaths::default(),
            preferences: Preferences::default(),
        }
    }
}

/// Keypair file per chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solana: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethereum: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PathBuf>,
}

impl WalletPaths {
    pub fn get(&self, chain: Chain) -> Option<&Path> {
        match chain {
            Chain::Solana => self.solana.as_deref(),
            Chain::Ethereum => self.ethereum.as_deref(),
            Chain::Base => self.base.as_deref(),
        }
    }

    pub fn set(&mut self, chain: Chain, path: PathBuf) {
        match chain {
            Chain::Solana => self.solana = Some(path),
            Chain::Ethereum => self.ethereum = Some(path),
            Chain::Base => self.base = Some(path),
        }
    }
}

/// Defaults applied to every call unless overridden on the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preferences {
    #[serde(default)]
    pub prefer_cheap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            prefer_cheap: false,
            max_price: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load config from `config_path` or the default location.
    pub fn load_from(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let config_path = Self::resolve_path(config_path)?;

        if !config_path.exists() {
            return Err(RouterError::config_missing(format!(
                "Config file not found at {}. Run 'x402-router init' to create one.",
                config_path.display()
            )));
        }

        let config = Self::read(&config_path)?;
        config.validate().map_err(|e| {
            RouterError::InvalidConfig(format!(
                "Invalid configuration in {}: {e}",
                config_path.display()
            ))
        })?;
        Ok(config)
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(None::<&str>)
    }

    /// Load config, returning the default if the file doesn't exist.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let config_path = Self::resolve_path(config_path)?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::read(&config_path)
    }

    fn read(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            RouterError::InvalidConfig(format!(
                "Failed to read config file at {}: {e}",
                config_path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            RouterError::InvalidConfig(format!(
                "Failed to parse config file at {}: {e}",
                config_path.display()
            ))
        })
    }

    fn resolve_path(config_path: Option<impl AsRef<Path>>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(path.as_ref().to_path_buf()),
            None => Self::default_config_path(),
        }
    }

    /// Get the default config file path (`~/.x402-router/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        crate::constants::default_config_path().ok_or(RouterError::NoConfigDir)
    }

    /// Validate and write the config to `config_path` or the default location.
    ///
    /// The file is readable by the owner only.
    pub fn save_to(&self, config_path: Option<impl AsRef<Path>>) -> Result<PathBuf> {
        self.validate()?;

        let config_path = Self::resolve_path(config_path)?;
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
            set_secure_dir_permissions(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, &content)?;
        set_secure_file_permissions(&config_path)?;

        Ok(config_path)
    }

    pub fn save(&self) -> Result<PathBuf> {
        self.save_to(None::<&str>)
    }

    pub fn validate(&self) -> Result<()> {
        validate_url("registry", &self.registry)?;
        if let Some(url) = &self.rpc_url {
            validate_url("rpc_url", url)?;
        }
        if let Some(max) = self.preferences.max_price {
            if !max.is_finite() || max < 0.0 {
                return Err(RouterError::InvalidConfig(format!(
                    "preferences.max_price must be a non-negative number, got {max}"
                )));
            }
        }
        if self.preferences.timeout_ms == 0 {
            return Err(RouterError::InvalidConfig(
                "preferences.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Keypair file configured for `chain`.
    pub fn require_wallet(&self, chain: Chain) -> Result<&Path> {
        self.wallet.get(chain).ok_or_else(|| {
            RouterError::config_missing(format!(
                "No {} wallet configured. Run 'x402-router init --keypair <PATH> --chain {chain}'.",
                chain.display_name()
            ))
        })
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc_url.as_deref().unwrap_or(DEFAULT_SOLANA_RPC_URL)
    }

    /// Router settings for `chain`
    pub fn router_config(&self, chain: Chain) -> RouterConfig {
        RouterConfig {
            registry: self.registry.clone(),
            chain,
            rpc_url: self.rpc_url().to_string(),
            logging: self.logging,
        }
    }

    /// Call options seeded from `[preferences]`
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            max_price: self.preferences.max_price,
            prefer_cheap: self.preferences.prefer_cheap,
            timeout_ms: Some(self.preferences.timeout_ms),
            ..Default::default()
        }
    }

    /// Read a value by dotted key, e.g. `preferences.max_price`.
    pub fn get(&self, key: &str) -> Result<toml::Value> {
        let root = toml::Value::try_from(self)?;
        key.split('.')
            .try_fold(&root, |value, part| value.get(part))
            .cloned()
            .ok_or_else(|| RouterError::InvalidConfig(format!("Config key '{key}' is not set")))
    }

    /// Set a value by dotted key.
    ///
    /// `raw` becomes a boolean for `true`/`false`, a number when it parses as
    /// one, and a string otherwise. The change is rejected if the result is
    /// not a valid config; `self` is left untouched then.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut root = toml::Value::try_from(&*self)?;
        let parts: Vec<&str> = key.split('.').collect();
        let Some((last, parents)) = parts.split_last() else {
            return Err(RouterError::InvalidConfig("Empty config key".to_string()));
        };

        let mut table = root
            .as_table_mut()
            .ok_or_else(|| RouterError::InvalidConfig("Config is not a table".to_string()))?;
        for part in parents {
            table = table
                .entry(part.to_string())
                .or_insert(toml::Value::Table(toml::map::Map::new()))
                .as_table_mut()
                .ok_or_else(|| {
                    RouterError::InvalidConfig(format!("Config key '{part}' is not a section"))
                })?;
        }
        table.insert(last.to_string(), parse_value(raw));

        let updated: Config = root
            .try_into()
            .map_err(|e| RouterError::InvalidConfig(format!("Cannot set '{key}': {e}")))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Interpret a command-line value the way `config set` does.
pub fn parse_value(raw: &str) -> toml::Value {
    match raw {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return toml::Value::Integer(n);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => toml::Value::Float(n),
        _ => toml::Value::String(raw.to_string()),
    }
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(RouterError::InvalidConfig(format!(
            "{field} must be an http(s) URL, got '{url}'"
        )))
    }
}

#[cfg(unix)]
fn set_secure_file_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_secure_file_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_secure_dir_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_secure_dir_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
