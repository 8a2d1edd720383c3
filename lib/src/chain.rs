//! Settlement chains a payment can be tagged with.

use crate::error::RouterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain name constants for use in configuration and headers
pub mod chains {
    pub const SOLANA: &str = "solana";
    pub const ETHEREUM: &str = "ethereum";
    pub const BASE: &str = "base";
}

/// Settlement chain.
///
/// Only [`Chain::Solana`] has a payment implementation. The other chains can
/// be configured but payments on them fail and their balance reads as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Solana,
    Ethereum,
    Base,
}

impl Chain {
    pub const ALL: [Chain; 3] = [Chain::Solana, Chain::Ethereum, Chain::Base];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Solana => chains::SOLANA,
            Chain::Ethereum => chains::ETHEREUM,
            Chain::Base => chains::BASE,
        }
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Solana => "Solana",
            Chain::Ethereum => "Ethereum",
            Chain::Base => "Base",
        }
    }

    /// Whether payments can be made on this chain
    pub fn is_supported(&self) -> bool {
        matches!(self, Chain::Solana)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            chains::SOLANA => Ok(Chain::Solana),
            chains::ETHEREUM => Ok(Chain::Ethereum),
            chains::BASE => Ok(Chain::Base),
            _ => Err(RouterError::UnknownChain(s.to_string())),
        }
    }
}
