//! Error kinds returned by registry calls.

use serde::{Deserialize, Serialize};

/// Every way a registry call can fail.
///
/// Each kind carries a stable numeric code so that off-process clients can
/// match on failures without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RegistryError {
    #[error("caller is not the registry admin")]
    NotAuthorized,

    #[error("registry is paused")]
    Paused,

    #[error("content hash is empty")]
    InvalidHash,

    #[error("content metadata is incomplete")]
    InvalidMetadata,

    #[error("content not found")]
    ContentNotFound,

    #[error("caller has already flagged this content")]
    AlreadyFlagged,

    #[error("invalid content status")]
    InvalidStatus,

    #[error("null identity is not a valid admin")]
    ZeroAddress,

    #[error("string exceeds its length limit")]
    StringTooLong,

    #[error("unknown content category")]
    InvalidCategory,

    /// Flagger set is at capacity. Not expected in normal operation.
    #[error("flagger list is full")]
    FlaggerOverflow,
}

impl RegistryError {
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized => 100,
            Self::Paused => 101,
            Self::InvalidHash => 102,
            Self::InvalidMetadata => 103,
            Self::ContentNotFound => 104,
            Self::AlreadyFlagged => 105,
            Self::InvalidStatus => 106,
            Self::ZeroAddress => 107,
            Self::StringTooLong => 108,
            Self::InvalidCategory => 109,
            Self::FlaggerOverflow => 500,
        }
    }
}
