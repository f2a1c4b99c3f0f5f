//! Process-wide contract state.

use content_registry_integrity::AgentId;
use serde::{Deserialize, Serialize};

/// Admin identity and pause switch, injected into the registry at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// The only identity allowed to pause, hand over admin, or force a status
    pub admin: AgentId,
    /// While set, submissions and flags are refused
    #[serde(default)]
    pub paused: bool,
}

impl ContractState {
    pub fn new(admin: AgentId) -> Self {
        Self {
            admin,
            paused: false,
        }
    }

    pub fn is_admin(&self, caller: &AgentId) -> bool {
        &self.admin == caller
    }
}
