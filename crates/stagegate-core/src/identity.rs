// Rust guideline compliant 2026-10-12

//! Hash-based identifiers for items and transition records.

use crate::{Error, Item, Result};
use sha2::{Digest, Sha256};

/// Prefix carried by every item ID.
pub const ITEM_PREFIX: &str = "idea-";

/// Prefix carried by every transition record ID.
pub const RECORD_PREFIX: &str = "trn-";

/// Generates an item ID from its creation inputs.
///
/// # Arguments
///
/// * `title` - Item title
/// * `author` - Item author
/// * `timestamp` - Creation time
/// * `nonce` - Disambiguates items created with identical inputs
pub fn generate_id(title: &str, author: &str, timestamp: i64, nonce: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(author.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update(nonce.to_le_bytes());

    let hex = format!("{:x}", hasher.finalize());
    format!("{}{}", ITEM_PREFIX, &hex[..6])
}

/// Generates a transition record ID.
pub fn generate_record_id(item_id: &str, actor: &str, timestamp: i64, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(item_id.as_bytes());
    hasher.update(actor.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update(sequence.to_le_bytes());

    let hex = format!("{:x}", hasher.finalize());
    format!("{}{}", RECORD_PREFIX, &hex[..10])
}

/// Validates the `idea-` prefixed hex format.
///
/// # Errors
///
/// Returns an error if the prefix is missing or the suffix is not 4-12
/// lowercase hex characters.
pub fn validate_id_format(id: &str) -> Result<()> {
    let suffix = id
        .strip_prefix(ITEM_PREFIX)
        .ok_or_else(|| Error::InvalidItem(format!("ID must start with '{}': {}", ITEM_PREFIX, id)))?;

    let valid_len = (4..=12).contains(&suffix.len());
    let valid_chars = suffix
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

    if !valid_len || !valid_chars {
        return Err(Error::InvalidItem(format!("Invalid ID format: {}", id)));
    }

    Ok(())
}

/// Resolves a partial ID (with or without prefix) against known items.
///
/// # Errors
///
/// Returns an error if:
/// - The partial ID is shorter than 3 characters
/// - No item matches
/// - More than one item matches
pub fn resolve_partial_id(partial: &str, items: &[Item]) -> Result<String> {
    let needle = partial.trim().to_lowercase();
    let needle = needle.strip_prefix(ITEM_PREFIX).unwrap_or(&needle).to_string();

    if needle.len() < 3 {
        return Err(Error::InvalidItem(format!(
            "Partial ID must have at least 3 characters: {}",
            partial
        )));
    }

    if let Some(exact) = items
        .iter()
        .find(|item| item.id.strip_prefix(ITEM_PREFIX) == Some(needle.as_str()))
    {
        return Ok(exact.id.clone());
    }

    let matches: Vec<String> = items
        .iter()
        .filter(|item| {
            item.id
                .strip_prefix(ITEM_PREFIX)
                .is_some_and(|suffix| suffix.starts_with(&needle))
        })
        .map(|item| item.id.clone())
        .collect();

    match matches.len() {
        0 => Err(Error::NotFound(partial.to_string())),
        1 => Ok(matches[0].clone()),
        _ => Err(Error::AmbiguousId(partial.to_string(), matches)),
    }
}
