//! Configuration management for notarychain

use serde::Deserialize;
use std::fs;

use crate::error::ChainError;

/// Hex length of a SHA-256 digest; a longer zero prefix can never be met.
pub const MAX_DIFFICULTY: u32 = 64;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub chain: ChainConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_difficulty() -> u32 {
    5
}

pub fn load_config() -> Result<Config, ChainError> {
    let config_str = fs::read_to_string("config.toml").unwrap_or_default();
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ChainError> {
    let config: Config = if config_str.is_empty() {
        // Sane defaults when config.toml is absent
        Config::default()
    } else {
        toml::from_str(config_str).map_err(|e| ChainError::Config(e.to_string()))?
    };

    // Validate critical values
    if config.chain.difficulty > MAX_DIFFICULTY {
        return Err(ChainError::Config(format!(
            "chain.difficulty must be at most {} (the hash is {} hex characters), got {}",
            MAX_DIFFICULTY, MAX_DIFFICULTY, config.chain.difficulty
        )));
    }

    Ok(config)
}
