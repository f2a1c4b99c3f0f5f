//! Notification events emitted by successful registry calls.
//!
//! Events are observational. Governance, reputation or oracle layers are
//! expected to consume them (or poll the read accessors); they never feed
//! back into registry state.

use content_registry_integrity::{AgentId, ContentId, ContentStatus};
use serde::{Deserialize, Serialize};

/// A state change worth telling subscribers about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContentEvent {
    ContentSubmitted {
        content_id: ContentId,
        submitter: AgentId,
        hash: String,
    },
    ContentFlagged {
        content_id: ContentId,
        flagger: AgentId,
    },
    StatusChanged {
        content_id: ContentId,
        new_status: ContentStatus,
    },
    AdminTransferred {
        previous: AgentId,
        new_admin: AgentId,
    },
    PauseChanged {
        paused: bool,
    },
}

impl ContentEvent {
    /// Record the event refers to, if any
    pub fn content_id(&self) -> Option<ContentId> {
        match self {
            Self::ContentSubmitted { content_id, .. }
            | Self::ContentFlagged { content_id, .. }
            | Self::StatusChanged { content_id, .. } => Some(*content_id),
            Self::AdminTransferred { .. } | Self::PauseChanged { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ContentSubmitted { .. } => "content_submitted",
            Self::ContentFlagged { .. } => "content_flagged",
            Self::StatusChanged { .. } => "status_changed",
            Self::AdminTransferred { .. } => "admin_transferred",
            Self::PauseChanged { .. } => "pause_changed",
        }
    }
}

/// An event as published by the host, with its position in the call log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Sequence number of the call that produced the event
    pub sequence: u64,
    /// Block height the call was applied at
    pub height: u64,
    pub event: ContentEvent,
}
