//! Serialized call execution.
//!
//! The host is the single-writer boundary around a [`ContentRegistry`]:
//! calls are applied one at a time under a write lock, each one at its own
//! block height, and each one either commits fully or changes nothing.
//! Events from committed calls are fanned out to subscribers afterwards.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use content_registry_integrity::{
    AgentId, ContentId, ContentMetadata, ContentRecord, ContentStatus, RegistryError,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::config::{ConfigError, RegistryConfig};
use crate::events::{ContentEvent, EventEnvelope};
use crate::registry::ContentRegistry;
use crate::snapshot::RegistrySnapshot;

/// A mutating registry entry point with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    TransferAdmin {
        new_admin: AgentId,
    },
    SetPaused {
        pause: bool,
    },
    SubmitContent {
        hash: String,
        metadata: ContentMetadata,
    },
    FlagContent {
        content_id: ContentId,
    },
    UpdateStatus {
        content_id: ContentId,
        new_status: String,
    },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransferAdmin { .. } => "transfer_admin",
            Self::SetPaused { .. } => "set_paused",
            Self::SubmitContent { .. } => "submit_content",
            Self::FlagContent { .. } => "flag_content",
            Self::UpdateStatus { .. } => "update_status",
        }
    }

    /// Apply this call to `registry` on behalf of `sender`.
    pub fn apply(
        &self,
        registry: &mut ContentRegistry,
        sender: &AgentId,
    ) -> Result<CallValue, RegistryError> {
        match self {
            Self::TransferAdmin { new_admin } => registry
                .transfer_admin(sender, new_admin.clone())
                .map(CallValue::Bool),
            Self::SetPaused { pause } => registry.set_paused(sender, *pause).map(CallValue::Bool),
            Self::SubmitContent { hash, metadata } => registry
                .submit_content(sender, hash.clone(), metadata.clone())
                .map(CallValue::ContentId),
            Self::FlagContent { content_id } => registry
                .flag_content(sender, *content_id)
                .map(CallValue::Bool),
            Self::UpdateStatus {
                content_id,
                new_status,
            } => registry
                .update_status(sender, *content_id, new_status)
                .map(CallValue::Bool),
        }
    }
}

/// Success value of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallValue {
    Bool(bool),
    ContentId(ContentId),
}

impl fmt::Display for CallValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::ContentId(id) => write!(f, "{id}"),
        }
    }
}

/// A call together with the identity invoking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: AgentId,
    #[serde(flatten)]
    pub call: Call,
}

/// Outcome of one applied call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Position in the host's call log, starting at 1
    pub sequence: u64,
    pub height: u64,
    pub sender: AgentId,
    pub call: Call,
    pub result: Result<CallValue, RegistryError>,
    /// Events emitted by the call; empty when it failed
    pub events: Vec<ContentEvent>,
    pub applied_at: DateTime<Utc>,
}

impl Receipt {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

struct HostState {
    registry: ContentRegistry,
    next_sequence: u64,
    receipts: VecDeque<Receipt>,
}

/// Single-writer host for a content registry.
///
/// Cloning the host yields another handle to the same registry.
#[derive(Clone)]
pub struct RegistryHost {
    inner: Arc<RwLock<HostState>>,
    events_tx: broadcast::Sender<EventEnvelope>,
    blocks_per_call: u64,
    receipt_history: usize,
}

impl RegistryHost {
    /// Create a host around a fresh registry built from `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        let registry = config.build_registry()?;
        Ok(Self::with_registry(registry, config))
    }

    /// Create a host around an existing (for example restored) registry.
    pub fn with_registry(registry: ContentRegistry, config: &RegistryConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_buffer.max(1));
        Self {
            inner: Arc::new(RwLock::new(HostState {
                registry,
                next_sequence: 1,
                receipts: VecDeque::new(),
            })),
            events_tx,
            blocks_per_call: config.blocks_per_call,
            receipt_history: config.receipt_history,
        }
    }

    /// Subscribe to events from calls applied after this point.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events_tx.subscribe()
    }

    /// Apply one call. Failures are reported in the receipt, not as `Err`.
    pub async fn execute(&self, sender: AgentId, call: Call) -> Receipt {
        let mut state = self.inner.write().await;

        let height = state
            .registry
            .block_height()
            .saturating_add(self.blocks_per_call);
        state.registry.set_block_height(height);

        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let result = call.apply(&mut state.registry, &sender);
        let events = state.registry.take_events();

        debug!(
            sequence,
            height,
            call = call.name(),
            ok = result.is_ok(),
            "Applied call"
        );

        for event in &events {
            // No subscribers is fine; events are still on the receipt.
            let _ = self.events_tx.send(EventEnvelope {
                sequence,
                height,
                event: event.clone(),
            });
        }

        let receipt = Receipt {
            sequence,
            height,
            sender,
            call,
            result,
            events,
            applied_at: Utc::now(),
        };

        state.receipts.push_front(receipt.clone());
        while state.receipts.len() > self.receipt_history {
            state.receipts.pop_back();
        }

        receipt
    }

    /// Apply a transaction.
    pub async fn submit(&self, tx: Transaction) -> Receipt {
        self.execute(tx.sender, tx.call).await
    }

    /// Apply transactions in order, one receipt per transaction.
    pub async fn execute_all(&self, txs: impl IntoIterator<Item = Transaction>) -> Vec<Receipt> {
        let mut receipts = Vec::new();
        for tx in txs {
            receipts.push(self.submit(tx).await);
        }
        receipts
    }

    /// Most recent receipts, newest first.
    pub async fn recent_receipts(&self, limit: usize) -> Vec<Receipt> {
        let state = self.inner.read().await;
        state.receipts.iter().take(limit).cloned().collect()
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub async fn get_content(&self, content_id: ContentId) -> Option<ContentRecord> {
        self.inner.read().await.registry.get_content(content_id).cloned()
    }

    pub async fn get_content_status(
        &self,
        content_id: ContentId,
    ) -> Result<ContentStatus, RegistryError> {
        self.inner.read().await.registry.get_content_status(content_id)
    }

    pub async fn get_flag_count(&self, content_id: ContentId) -> Result<u32, RegistryError> {
        self.inner.read().await.registry.get_flag_count(content_id)
    }

    pub async fn get_next_id(&self) -> ContentId {
        self.inner.read().await.registry.get_next_id()
    }

    pub async fn get_admin(&self) -> AgentId {
        self.inner.read().await.registry.get_admin().clone()
    }

    pub async fn is_paused(&self) -> bool {
        self.inner.read().await.registry.is_paused()
    }

    pub async fn has_flagged(&self, content_id: ContentId, user: &AgentId) -> bool {
        self.inner.read().await.registry.has_flagged(content_id, user)
    }

    pub async fn get_flaggers(&self, content_id: ContentId) -> Option<Vec<AgentId>> {
        self.inner.read().await.registry.get_flaggers(content_id)
    }

    pub async fn contents_by_status(&self, status: ContentStatus) -> Vec<ContentRecord> {
        let state = self.inner.read().await;
        state
            .registry
            .contents_by_status(status)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn contents(&self) -> Vec<ContentRecord> {
        self.inner.read().await.registry.contents().cloned().collect()
    }

    pub async fn block_height(&self) -> u64 {
        self.inner.read().await.registry.block_height()
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.inner.read().await.registry.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> RegistryHost {
        RegistryHost::from_config(&RegistryConfig::new("admin")).unwrap()
    }

    fn submit(hash: &str) -> Call {
        Call::SubmitContent {
            hash: hash.to_string(),
            metadata: ContentMetadata::new("src", 1, "sports"),
        }
    }

    #[tokio::test]
    async fn test_each_call_gets_its_own_height() {
        let host = host();
        let first = host.execute(AgentId::new("a"), submit("QmA")).await;
        let second = host.execute(AgentId::new("a"), submit("QmB")).await;

        assert_eq!((first.sequence, first.height), (1, 1));
        assert_eq!((second.sequence, second.height), (2, 2));
        assert_eq!(host.get_content(2).await.unwrap().submit_time, 2);
    }

    #[tokio::test]
    async fn test_failed_call_consumes_height_only() {
        let host = host();
        let receipt = host
            .execute(AgentId::new("a"), Call::SetPaused { pause: true })
            .await;

        assert_eq!(receipt.result, Err(RegistryError::NotAuthorized));
        assert!(receipt.events.is_empty());
        assert_eq!(host.block_height().await, 1);
        assert!(!host.is_paused().await);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let host = host();
        let mut rx = host.subscribe();

        host.execute(AgentId::new("a"), submit("QmA")).await;
        let envelope = rx.recv().await.unwrap();

        assert_eq!(envelope.sequence, 1);
        assert_eq!(
            envelope.event,
            ContentEvent::ContentSubmitted {
                content_id: 1,
                submitter: AgentId::new("a"),
                hash: "QmA".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_receipt_history_is_bounded() {
        let config = RegistryConfig {
            receipt_history: 2,
            ..RegistryConfig::new("admin")
        };
        let host = RegistryHost::from_config(&config).unwrap();
        for hash in ["Qm1", "Qm2", "Qm3"] {
            host.execute(AgentId::new("a"), submit(hash)).await;
        }

        let recent = host.recent_receipts(10).await;
        let sequences: Vec<u64> = recent.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![3, 2]);
    }

    #[test]
    fn test_call_value_display() {
        assert_eq!(CallValue::Bool(true).to_string(), "true");
        assert_eq!(CallValue::ContentId(12).to_string(), "12");
    }

    #[test]
    fn test_transaction_wire_format() {
        let json = r#"{"sender":"bob","call":"flag_content","content_id":4}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.sender, AgentId::new("bob"));
        assert_eq!(tx.call, Call::FlagContent { content_id: 4 });
    }
}
