//! Content Registry for the Elohim curation platform
//!
//! Owns submitted news content and the review signals attached to it:
//!
//! - **Submission**: validated, append-only content records with sequential ids
//! - **Flagging**: one flag per identity per record, bounded flagger sets,
//!   automatic move to `flagged` once enough identities object
//! - **Review**: admin-driven status changes, pause switch, admin handover
//! - **Notifications**: every successful mutation emits a [`ContentEvent`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                RegistryHost                  │
//! │   (one call at a time, height, receipts)     │
//! │                                              │
//! │   ┌──────────────────────────────────────┐   │
//! │   │          ContentRegistry             │   │
//! │   │  ContractState │ records │ flaggers  │   │
//! │   └──────────────────────────────────────┘   │
//! │                    │ events                  │
//! │            broadcast::Sender                 │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use content_registry::{ContentRegistry, ContractState};
//! use content_registry_integrity::{AgentId, ContentMetadata, ContentStatus};
//!
//! let admin = AgentId::new("admin");
//! let mut registry = ContentRegistry::new(ContractState::new(admin));
//!
//! let alice = AgentId::new("alice");
//! let id = registry
//!     .submit_content(&alice, "QmHash", ContentMetadata::new("bbc.co.uk", 1_700_000_000, "politics"))
//!     .unwrap();
//!
//! assert_eq!(id, 1);
//! assert_eq!(registry.get_content_status(id).unwrap(), ContentStatus::Pending);
//! ```

pub mod config;
pub mod events;
pub mod flaggers;
pub mod host;
pub mod registry;
pub mod snapshot;
pub mod state;

// Re-export main types
pub use config::{ConfigError, RegistryConfig};
pub use events::{ContentEvent, EventEnvelope};
pub use flaggers::FlaggerSet;
pub use host::{Call, CallValue, Receipt, RegistryHost, Transaction};
pub use registry::ContentRegistry;
pub use snapshot::{RegistrySnapshot, SnapshotError};
pub use state::ContractState;
