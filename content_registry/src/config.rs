//! Configuration for a registry and its host.

use content_registry_integrity::AgentId;
use serde::{Deserialize, Serialize};

use crate::registry::ContentRegistry;
use crate::state::ContractState;

/// Error types for configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configured admin is the null identity
    #[error("admin must not be the null identity")]
    NullAdmin,

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for a content registry deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Initial admin identity
    pub admin: AgentId,
    /// Start with submissions and flags paused
    #[serde(default)]
    pub start_paused: bool,
    /// Block height of the first call
    #[serde(default)]
    pub genesis_height: u64,
    /// Height advance applied before each call
    #[serde(default = "default_blocks_per_call")]
    pub blocks_per_call: u64,
    /// Capacity of the event broadcast channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Receipts retained for inspection (newest first)
    #[serde(default = "default_receipt_history")]
    pub receipt_history: usize,
}

fn default_blocks_per_call() -> u64 { 1 }
fn default_event_buffer() -> usize { 256 }
fn default_receipt_history() -> usize { 1_000 }

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            admin: AgentId::new("admin"),
            start_paused: false,
            genesis_height: 0,
            blocks_per_call: default_blocks_per_call(),
            event_buffer: default_event_buffer(),
            receipt_history: default_receipt_history(),
        }
    }
}

impl RegistryConfig {
    /// Create a new config with the given admin.
    pub fn new(admin: impl Into<AgentId>) -> Self {
        Self {
            admin: admin.into(),
            ..Default::default()
        }
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.is_null() {
            return Err(ConfigError::NullAdmin);
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::Invalid {
                field: "event_buffer",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The injected process-wide state for a fresh registry.
    pub fn contract_state(&self) -> ContractState {
        ContractState {
            admin: self.admin.clone(),
            paused: self.start_paused,
        }
    }

    /// Build an empty registry from this config.
    pub fn build_registry(&self) -> Result<ContentRegistry, ConfigError> {
        self.validate()?;
        Ok(ContentRegistry::with_height(
            self.contract_state(),
            self.genesis_height,
        ))
    }
}
