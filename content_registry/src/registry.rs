//! The content record store.
//!
//! Every mutating entry point validates fully before it writes, so a failed
//! call leaves records, flagger sets, counters and the event journal exactly
//! as they were.

use std::collections::BTreeMap;

use content_registry_integrity::{
    parse_status, validate_submission, AgentId, ContentId, ContentMetadata, ContentRecord,
    ContentStatus, RegistryError, FLAG_THRESHOLD,
};
use tracing::{debug, info};

use crate::events::ContentEvent;
use crate::flaggers::FlaggerSet;
use crate::state::ContractState;

/// Id given to the first submitted record.
pub const FIRST_CONTENT_ID: ContentId = 1;

/// Keyed store of content records with admin-gated review.
#[derive(Debug, Clone)]
pub struct ContentRegistry {
    pub(crate) state: ContractState,
    pub(crate) records: BTreeMap<ContentId, ContentRecord>,
    pub(crate) flaggers: BTreeMap<ContentId, FlaggerSet>,
    pub(crate) next_content_id: ContentId,
    pub(crate) block_height: u64,
    /// Events from successful calls not yet taken by the host
    pub(crate) journal: Vec<ContentEvent>,
}

impl ContentRegistry {
    /// Create an empty registry governed by `state`.
    pub fn new(state: ContractState) -> Self {
        Self {
            state,
            records: BTreeMap::new(),
            flaggers: BTreeMap::new(),
            next_content_id: FIRST_CONTENT_ID,
            block_height: 0,
            journal: Vec::new(),
        }
    }

    /// Create an empty registry starting at `height`.
    pub fn with_height(state: ContractState, height: u64) -> Self {
        Self {
            block_height: height,
            ..Self::new(state)
        }
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Hand the admin role to `new_admin`.
    pub fn transfer_admin(
        &mut self,
        caller: &AgentId,
        new_admin: AgentId,
    ) -> Result<bool, RegistryError> {
        self.ensure_admin(caller, "transfer_admin")?;
        if new_admin.is_null() {
            debug!(caller = %caller, "transfer_admin rejected: null identity");
            return Err(RegistryError::ZeroAddress);
        }

        let previous = std::mem::replace(&mut self.state.admin, new_admin.clone());
        info!(previous = %previous, new_admin = %new_admin, "Admin transferred");
        self.journal.push(ContentEvent::AdminTransferred {
            previous,
            new_admin,
        });
        Ok(true)
    }

    /// Set the pause switch, returning its new value.
    pub fn set_paused(&mut self, caller: &AgentId, pause: bool) -> Result<bool, RegistryError> {
        self.ensure_admin(caller, "set_paused")?;

        self.state.paused = pause;
        info!(paused = pause, "Pause switch set");
        self.journal.push(ContentEvent::PauseChanged { paused: pause });
        Ok(pause)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Store a new record and return its id.
    pub fn submit_content(
        &mut self,
        caller: &AgentId,
        hash: impl Into<String>,
        metadata: ContentMetadata,
    ) -> Result<ContentId, RegistryError> {
        let hash = hash.into();

        if self.state.paused {
            debug!(caller = %caller, "submit_content rejected: paused");
            return Err(RegistryError::Paused);
        }
        let category = validate_submission(&hash, &metadata).inspect_err(|e| {
            debug!(caller = %caller, error = %e, "submit_content rejected");
        })?;

        let content_id = self.next_content_id;
        let record = ContentRecord {
            content_id,
            hash: hash.clone(),
            submitter: caller.clone(),
            source: metadata.source,
            timestamp: metadata.timestamp,
            category,
            status: ContentStatus::Pending,
            submit_time: self.block_height,
            flag_count: 0,
        };

        self.records.insert(content_id, record);
        self.next_content_id += 1;

        info!(
            content_id,
            submitter = %caller,
            category = %category,
            height = self.block_height,
            "Content submitted"
        );
        self.journal.push(ContentEvent::ContentSubmitted {
            content_id,
            submitter: caller.clone(),
            hash,
        });
        Ok(content_id)
    }

    /// Record a flag from `caller` against `content_id`.
    ///
    /// Reaching [`FLAG_THRESHOLD`] distinct flaggers moves the record to
    /// `flagged`; further flags keep it there.
    pub fn flag_content(
        &mut self,
        caller: &AgentId,
        content_id: ContentId,
    ) -> Result<bool, RegistryError> {
        self.check_flag(caller, content_id).inspect_err(|e| {
            debug!(caller = %caller, content_id, error = %e, "flag_content rejected");
        })?;

        let record = self
            .records
            .get_mut(&content_id)
            .ok_or(RegistryError::ContentNotFound)?;
        let count = self
            .flaggers
            .entry(content_id)
            .or_default()
            .try_insert(caller.clone())?;

        record.flag_count += 1;
        debug_assert_eq!(record.flag_count as usize, count);

        if record.flag_count >= FLAG_THRESHOLD {
            if record.status != ContentStatus::Flagged {
                info!(content_id, flag_count = record.flag_count, "Flag threshold reached");
            }
            record.status = ContentStatus::Flagged;
        }

        info!(
            content_id,
            flagger = %caller,
            flag_count = record.flag_count,
            "Content flagged"
        );
        self.journal.push(ContentEvent::ContentFlagged {
            content_id,
            flagger: caller.clone(),
        });
        Ok(true)
    }

    /// Every precondition of [`Self::flag_content`], in order.
    fn check_flag(&self, caller: &AgentId, content_id: ContentId) -> Result<(), RegistryError> {
        if self.state.paused {
            return Err(RegistryError::Paused);
        }
        let record = self
            .records
            .get(&content_id)
            .ok_or(RegistryError::ContentNotFound)?;
        if !record.status.accepts_flags() {
            return Err(RegistryError::InvalidStatus);
        }
        match self.flaggers.get(&content_id) {
            Some(flaggers) => flaggers.check_insert(caller),
            None => Ok(()),
        }
    }

    /// Overwrite the status of a record. Admin only.
    ///
    /// Any of the four statuses is accepted, including moving a record back
    /// out of `rejected`.
    pub fn update_status(
        &mut self,
        caller: &AgentId,
        content_id: ContentId,
        new_status: &str,
    ) -> Result<bool, RegistryError> {
        self.ensure_admin(caller, "update_status")?;
        let Some(record) = self.records.get_mut(&content_id) else {
            debug!(content_id, "update_status rejected: not found");
            return Err(RegistryError::ContentNotFound);
        };
        let new_status = parse_status(new_status).inspect_err(|_| {
            debug!(content_id, new_status, "update_status rejected: invalid status");
        })?;

        let previous = record.status;
        record.status = new_status;

        info!(content_id, from = %previous, to = %new_status, "Status updated");
        self.journal.push(ContentEvent::StatusChanged {
            content_id,
            new_status,
        });
        Ok(true)
    }

    fn ensure_admin(&self, caller: &AgentId, operation: &str) -> Result<(), RegistryError> {
        if self.state.is_admin(caller) {
            Ok(())
        } else {
            debug!(caller = %caller, operation, "Rejected: caller is not admin");
            Err(RegistryError::NotAuthorized)
        }
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn get_content(&self, content_id: ContentId) -> Option<&ContentRecord> {
        self.records.get(&content_id)
    }

    pub fn get_content_status(&self, content_id: ContentId) -> Result<ContentStatus, RegistryError> {
        self.records
            .get(&content_id)
            .map(|r| r.status)
            .ok_or(RegistryError::ContentNotFound)
    }

    pub fn get_flag_count(&self, content_id: ContentId) -> Result<u32, RegistryError> {
        self.records
            .get(&content_id)
            .map(|r| r.flag_count)
            .ok_or(RegistryError::ContentNotFound)
    }

    /// Id the next successful submission will receive
    pub fn get_next_id(&self) -> ContentId {
        self.next_content_id
    }

    pub fn get_admin(&self) -> &AgentId {
        &self.state.admin
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// False, not an error, when the record or its flagger set is missing.
    pub fn has_flagged(&self, content_id: ContentId, user: &AgentId) -> bool {
        self.flaggers
            .get(&content_id)
            .is_some_and(|flaggers| flaggers.contains(user))
    }

    /// Flaggers of a record in the order they flagged it.
    pub fn get_flaggers(&self, content_id: ContentId) -> Option<Vec<AgentId>> {
        if !self.records.contains_key(&content_id) {
            return None;
        }
        Some(
            self.flaggers
                .get(&content_id)
                .map(FlaggerSet::to_vec)
                .unwrap_or_default(),
        )
    }

    pub fn content_count(&self) -> usize {
        self.records.len()
    }

    /// Records currently in `status`, in id order.
    pub fn contents_by_status(&self, status: ContentStatus) -> Vec<&ContentRecord> {
        self.records
            .values()
            .filter(|r| r.status == status)
            .collect()
    }

    /// All records in id order.
    pub fn contents(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.values()
    }

    pub fn state(&self) -> &ContractState {
        &self.state
    }

    // =========================================================================
    // Height & events
    // =========================================================================

    /// Current block height, stamped on new records as `submit_time`.
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Move the block height forward. Heights never go backwards, so a lower
    /// value is ignored.
    pub fn set_block_height(&mut self, height: u64) {
        if height >= self.block_height {
            self.block_height = height;
        }
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<ContentEvent> {
        std::mem::take(&mut self.journal)
    }

    pub fn pending_events(&self) -> &[ContentEvent] {
        &self.journal
    }
}
