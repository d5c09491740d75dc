use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const ACTIVE_CHAIN_VAR: &str = "ACTIVE_CHAIN";

fn default_poll_interval_secs() -> u64 {
    4
}

fn default_log_block_span() -> u64 {
    crate::gateway::rpc::DEFAULT_LOG_SPAN
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Overrides the RPC URL derived from chain and client id.
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub chat_contract: Address,
    #[serde(default)]
    pub status_contract: Address,
    #[serde(default)]
    pub wallet_address: Option<Address>,
    /// Addresses offered in the chat sidebar.
    #[serde(default)]
    pub contacts: Vec<Address>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// First block scanned for `StatusUpdated` logs.
    #[serde(default)]
    pub start_block: u64,
    /// Widest block range requested per `eth_getLogs` call.
    #[serde(default = "default_log_block_span")]
    pub log_block_span: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chat_contract: Address::ZERO,
            status_contract: Address::ZERO,
            wallet_address: None,
            contacts: Vec::new(),
            poll_interval_secs: default_poll_interval_secs(),
            start_block: 0,
            log_block_span: default_log_block_span(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    let config = match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    };

    if config.chat_contract == Address::ZERO {
        log::warn!("chat_contract is not configured; chat reads will fail");
    }
    if config.status_contract == Address::ZERO {
        log::warn!("status_contract is not configured; the news feed will stay empty");
    }
    config
}

/// Chains the client knows an RPC slug for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chain {
    #[default]
    Mumbai,
    Polygon,
    Ethereum,
    Sepolia,
    Custom(u64),
}

impl Chain {
    pub fn id(&self) -> u64 {
        match self {
            Chain::Mumbai => 80_001,
            Chain::Polygon => 137,
            Chain::Ethereum => 1,
            Chain::Sepolia => 11_155_111,
            Chain::Custom(id) => *id,
        }
    }

    pub fn slug(&self) -> Option<&'static str> {
        match self {
            Chain::Mumbai => Some("mumbai"),
            Chain::Polygon => Some("polygon"),
            Chain::Ethereum => Some("ethereum"),
            Chain::Sepolia => Some("sepolia"),
            Chain::Custom(_) => None,
        }
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mumbai" => Ok(Chain::Mumbai),
            "polygon" => Ok(Chain::Polygon),
            "ethereum" | "mainnet" => Ok(Chain::Ethereum),
            "sepolia" => Ok(Chain::Sepolia),
            other => match other.parse::<u64>() {
                Ok(80_001) => Ok(Chain::Mumbai),
                Ok(137) => Ok(Chain::Polygon),
                Ok(1) => Ok(Chain::Ethereum),
                Ok(11_155_111) => Ok(Chain::Sepolia),
                Ok(id) => Ok(Chain::Custom(id)),
                Err(_) => Err(format!("unknown chain `{s}`")),
            },
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slug() {
            Some(slug) => f.write_str(slug),
            None => write!(f, "chain {}", self.id()),
        }
    }
}

/// Process environment, read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub client_id: Option<String>,
    pub chain: Chain,
}

impl Environment {
    pub fn from_process() -> Self {
        Self::from_vars(env::var(CLIENT_ID_VAR).ok(), env::var(ACTIVE_CHAIN_VAR).ok())
    }

    pub fn from_vars(client_id: Option<String>, chain: Option<String>) -> Self {
        let client_id = client_id.filter(|id| !id.trim().is_empty());
        let chain = match chain {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                log::warn!("{err}; falling back to {}", Chain::default());
                Chain::default()
            }),
            None => Chain::default(),
        };
        Self { client_id, chain }
    }

    /// Explicit URL wins; otherwise the hosted endpoint for chain + client id.
    pub fn rpc_url(&self, config: &AppConfig) -> Option<String> {
        if let Some(url) = &config.rpc_url {
            return Some(url.clone());
        }
        let slug = self.chain.slug()?;
        let client_id = self.client_id.as_deref()?;
        Some(format!("https://{slug}.rpc.thirdweb.com/{client_id}"))
    }
}
