use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use assetreg_contract::ContractConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming the contract package id.
pub const ENV_CHAINCODE_ID: &str = "CHAINCODE_ID";
/// Environment variable naming the address the contract would be served on.
pub const ENV_SERVER_ADDRESS: &str = "CHAINCODE_SERVER_ADDRESS";

/// Where create events go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    None,
    #[default]
    Log,
}

/// Host configuration, built once at start-up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub chaincode_id: String,
    pub server_address: String,
    pub tls_disabled: bool,
    pub state_file: PathBuf,
    pub notifications: NotificationMode,
    pub contract: ContractConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            chaincode_id: String::new(),
            server_address: "0.0.0.0:9999".into(),
            tls_disabled: true,
            state_file: PathBuf::from("assetreg-state.bin"),
            notifications: NotificationMode::default(),
            contract: ContractConfig::default(),
        }
    }
}

impl HostConfig {
    /// Read the optional TOML file, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                Self::from_toml_str(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Override identity settings from `lookup`; unset or empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(ENV_CHAINCODE_ID).filter(|v| !v.is_empty()) {
            self.chaincode_id = id;
        }
        if let Some(addr) = lookup(ENV_SERVER_ADDRESS).filter(|v| !v.is_empty()) {
            self.server_address = addr;
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("rendering config as TOML")
    }
}
