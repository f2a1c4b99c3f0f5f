//! Content Registry Integrity
//!
//! Defines the data model for the curation registry: submitted content
//! records, their review status, the fixed category vocabulary and the
//! field limits every submission is checked against.
//!
//! This crate holds no state. The store that owns records and flagger sets
//! lives in `content_registry`; everything here is shared between the store,
//! its host and any client that wants to pre-validate a submission.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod validation;

pub use error::RegistryError;
pub use validation::{parse_category, parse_status, validate_submission};

// =============================================================================
// Limits
// =============================================================================

/// Maximum length of a content hash, in characters
pub const MAX_HASH_LEN: usize = 64;

/// Maximum length of a content source, in characters
pub const MAX_SOURCE_LEN: usize = 128;

/// Maximum length of a category name, in characters
pub const MAX_CATEGORY_LEN: usize = 32;

/// Maximum number of distinct flaggers recorded per content record
pub const MAX_FLAGGERS: usize = 100;

/// Flag count at which a record is automatically moved to `flagged`
pub const FLAG_THRESHOLD: u32 = 5;

/// Burn principal used as the null identity
pub const BURN_ADDRESS: &str = "SP000000000000000000002Q6VF78";

/// Identifier assigned to a content record. The first record gets 1.
pub type ContentId = u64;

// =============================================================================
// Identity
// =============================================================================

/// An account principal that invokes registry calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(principal: impl Into<String>) -> Self {
        Self(principal.into())
    }

    /// The designated null/burn identity.
    pub fn burn() -> Self {
        Self(BURN_ADDRESS.to_string())
    }

    /// True for the burn principal and for an empty principal.
    pub fn is_null(&self) -> bool {
        self.0.is_empty() || self.0 == BURN_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Category
// =============================================================================

/// News category a record is filed under.
///
/// The set is closed; anything else is rejected at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Politics,
    Economy,
    Technology,
    Health,
    Environment,
    Sports,
    Entertainment,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Politics => "politics",
            Self::Economy => "economy",
            Self::Technology => "technology",
            Self::Health => "health",
            Self::Environment => "environment",
            Self::Sports => "sports",
            Self::Entertainment => "entertainment",
            Self::Other => "other",
        }
    }

    /// All categories in declaration order
    pub fn all() -> [Self; 8] {
        [
            Self::Politics,
            Self::Economy,
            Self::Technology,
            Self::Health,
            Self::Environment,
            Self::Sports,
            Self::Entertainment,
            Self::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RegistryError;

    /// Exact, case-sensitive match against the category names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(RegistryError::InvalidCategory)
    }
}

// =============================================================================
// Status
// =============================================================================

/// Review state of a content record.
///
/// ```text
/// pending ──(5 flags / admin)──► flagged
///    │                              │
///    └────────(admin)──► verified ◄─┘
///                        rejected   (no further flags; admin may still move it)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
    Flagged,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Flagged => "flagged",
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Pending, Self::Verified, Self::Rejected, Self::Flagged]
    }

    /// Whether new flags are still accepted in this state
    pub fn accepts_flags(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(RegistryError::InvalidStatus)
    }
}

// =============================================================================
// Records
// =============================================================================

/// Submission metadata as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Where the content was published
    pub source: String,
    /// Caller-supplied publication time; must be non-zero
    pub timestamp: u64,
    /// Category name; must be one of [`Category::all`]
    pub category: String,
}

impl ContentMetadata {
    pub fn new(source: impl Into<String>, timestamp: u64, category: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            timestamp,
            category: category.into(),
        }
    }
}

/// A stored content record.
///
/// Everything except `status` and `flag_count` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub content_id: ContentId,
    /// Content-addressed identifier
    pub hash: String,
    pub submitter: AgentId,
    pub source: String,
    pub timestamp: u64,
    pub category: Category,
    pub status: ContentStatus,
    /// Block height at which the record was created
    pub submit_time: u64,
    pub flag_count: u32,
}
