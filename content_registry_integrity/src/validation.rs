//! Submission validation.
//!
//! All checks run before the store touches any state, so a rejected call
//! never leaves a partial record behind.

use crate::{
    Category, ContentMetadata, ContentStatus, RegistryError, MAX_CATEGORY_LEN, MAX_HASH_LEN,
    MAX_SOURCE_LEN,
};

fn exceeds(value: &str, limit: usize) -> bool {
    value.chars().count() > limit
}

/// Validate a submission and resolve its category.
///
/// Checks run in a fixed order: empty hash, field lengths, missing metadata,
/// then category membership. The first failure wins.
pub fn validate_submission(
    hash: &str,
    metadata: &ContentMetadata,
) -> Result<Category, RegistryError> {
    if hash.is_empty() {
        return Err(RegistryError::InvalidHash);
    }

    if exceeds(hash, MAX_HASH_LEN)
        || exceeds(&metadata.source, MAX_SOURCE_LEN)
        || exceeds(&metadata.category, MAX_CATEGORY_LEN)
    {
        return Err(RegistryError::StringTooLong);
    }

    if metadata.source.is_empty() || metadata.timestamp == 0 || metadata.category.is_empty() {
        return Err(RegistryError::InvalidMetadata);
    }

    parse_category(&metadata.category)
}

pub fn parse_category(value: &str) -> Result<Category, RegistryError> {
    value.parse()
}

pub fn parse_status(value: &str) -> Result<ContentStatus, RegistryError> {
    value.parse()
}
