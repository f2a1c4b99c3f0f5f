//! Full-state snapshots for persistence between runs.

use std::collections::BTreeMap;

use content_registry_integrity::{ContentId, ContentRecord, MAX_FLAGGERS};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::flaggers::FlaggerSet;
use crate::registry::{ContentRegistry, FIRST_CONTENT_ID};
use crate::state::ContractState;

/// Error types for snapshot restore.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A record id is not below the id counter
    #[error("record {content_id} is not below next id {next_content_id}")]
    IdOutOfRange {
        content_id: ContentId,
        next_content_id: ContentId,
    },

    /// Id counter below the first assignable id
    #[error("next id {0} is below the first content id")]
    CounterBelowFirstId(ContentId),

    /// Record is stored under a different id than it carries
    #[error("record keyed {key} carries id {content_id}")]
    MismatchedId { key: ContentId, content_id: ContentId },

    /// Stored flag count disagrees with the flagger set
    #[error("record {content_id} has flag count {flag_count} but {flaggers} flaggers")]
    FlagCountMismatch {
        content_id: ContentId,
        flag_count: u32,
        flaggers: usize,
    },

    /// Flagger set is over the cap or has duplicates
    #[error("flagger set for record {0} is malformed")]
    MalformedFlaggers(ContentId),

    /// Flagger set with no record
    #[error("flagger set for unknown record {0}")]
    OrphanFlaggers(ContentId),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializable image of a [`ContentRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub state: ContractState,
    pub block_height: u64,
    pub next_content_id: ContentId,
    pub records: BTreeMap<ContentId, ContentRecord>,
    #[serde(default)]
    pub flaggers: BTreeMap<ContentId, FlaggerSet>,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the invariants a live registry maintains.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.next_content_id < FIRST_CONTENT_ID {
            return Err(SnapshotError::CounterBelowFirstId(self.next_content_id));
        }

        for (&key, record) in &self.records {
            if key != record.content_id {
                return Err(SnapshotError::MismatchedId {
                    key,
                    content_id: record.content_id,
                });
            }
            if key < FIRST_CONTENT_ID || key >= self.next_content_id {
                return Err(SnapshotError::IdOutOfRange {
                    content_id: key,
                    next_content_id: self.next_content_id,
                });
            }

            let flaggers = self.flaggers.get(&key).map_or(0, FlaggerSet::len);
            if record.flag_count as usize != flaggers {
                return Err(SnapshotError::FlagCountMismatch {
                    content_id: key,
                    flag_count: record.flag_count,
                    flaggers,
                });
            }
        }

        for (&key, set) in &self.flaggers {
            if !self.records.contains_key(&key) {
                return Err(SnapshotError::OrphanFlaggers(key));
            }
            let mut seen = std::collections::BTreeSet::new();
            if set.len() > MAX_FLAGGERS || !set.iter().all(|agent| seen.insert(agent)) {
                return Err(SnapshotError::MalformedFlaggers(key));
            }
        }

        Ok(())
    }
}

impl ContentRegistry {
    /// Capture the full state. Pending events are not part of the snapshot.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            state: self.state.clone(),
            block_height: self.block_height,
            next_content_id: self.next_content_id,
            records: self.records.clone(),
            flaggers: self.flaggers.clone(),
        }
    }

    /// Rebuild a registry from a snapshot, refusing one that breaks an invariant.
    pub fn restore(snapshot: RegistrySnapshot) -> Result<Self, SnapshotError> {
        snapshot.validate().inspect_err(|e| {
            warn!(error = %e, "Refusing corrupt registry snapshot");
        })?;

        Ok(Self {
            state: snapshot.state,
            records: snapshot.records,
            flaggers: snapshot.flaggers,
            next_content_id: snapshot.next_content_id,
            block_height: snapshot.block_height,
            journal: Vec::new(),
        })
    }
}
