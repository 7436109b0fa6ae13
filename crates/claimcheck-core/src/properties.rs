//! # Property Validator (C3)
//!
//! Enforces count/size/reserved-name rules on user-supplied message
//! properties before any broker or blob I/O happens.

use shared_types::{PropertyError, PropertyValue};
use std::collections::HashMap;

/// Default total-size cap in octets.
pub const DEFAULT_MAX_BYTES: usize = 65_536;

/// Validate a caller-supplied property map.
///
/// `reserved` is the set of property keys the caller may not use (the
/// four reserved attribute names). `max_count` is the configured
/// `maxAllowedProperties` ceiling.
pub fn validate(
    properties: &HashMap<String, PropertyValue>,
    reserved: &[&str],
    max_count: usize,
    max_bytes: usize,
) -> Result<(), PropertyError> {
    if properties.is_empty() {
        return Ok(());
    }

    if properties.len() > max_count {
        return Err(PropertyError::TooMany {
            count: properties.len(),
            max: max_count,
        });
    }

    if let Some(key) = properties.keys().find(|k| reserved.contains(&k.as_str())) {
        return Err(PropertyError::Reserved { key: key.clone() });
    }

    let total_bytes: usize = properties
        .iter()
        .map(|(key, value)| key.len() + value.octet_len())
        .sum();

    if total_bytes > max_bytes {
        return Err(PropertyError::TooLarge {
            bytes: total_bytes,
            max: max_bytes,
        });
    }

    Ok(())
}
