//! # Prefix Validator (C2)
//!
//! Rejects blob-key prefixes that would violate the backend's charset or
//! length rules before they can corrupt a minted key. `blobKeyPrefix`
//! length plus a v4 UUID's 36 characters must not exceed the blob
//! backend's max key length (1024 here), capping the prefix at 988 bytes.

use shared_types::ConfigError;

/// Maximum length of a blob identifier minted by [`crate::config::fresh_identifier`].
pub const IDENTIFIER_LENGTH: usize = 36;

/// Blob backend's max key length.
pub const MAX_KEY_LENGTH: usize = 1024;

/// Maximum allowed prefix length, derived from [`MAX_KEY_LENGTH`] minus
/// [`IDENTIFIER_LENGTH`].
pub const MAX_PREFIX_LENGTH: usize = MAX_KEY_LENGTH - IDENTIFIER_LENGTH;

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')
}

/// Validate a candidate blob-key prefix. Accepts `None`/empty.
pub fn validate(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Ok(());
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::PrefixTooLong {
            len: prefix.len(),
            max: MAX_PREFIX_LENGTH,
        });
    }

    if !prefix.chars().all(is_allowed_char) {
        return Err(ConfigError::InvalidPrefixCharset {
            prefix: prefix.to_string(),
        });
    }

    Ok(())
}
