//! # Configuration (C4)
//!
//! Holds every tunable the pipeline reads. Setters that can fail (the blob
//! key prefix) validate synchronously: an invalid value is rejected at set
//! time and the prior value is retained.

use crate::prefix;
use shared_types::{
    AccessTier, ConfigError, LEGACY_SIZE_ATTRIBUTE, MODERN_SIZE_ATTRIBUTE,
};

/// Bodies longer than this many UTF-8 octets are offloaded, unless
/// [`Config::always_through_blob`] forces it regardless of size.
pub const DEFAULT_MESSAGE_SIZE_THRESHOLD: usize = 262_144;

/// The broker's own per-message application-property cap.
pub const BROKER_PROPERTY_CAP: usize = 10;

/// Properties the core reserves for itself (the pointer marker, the size
/// marker, and the user-agent stamp draw from this headroom).
pub const CORE_RESERVED_PROPERTIES: usize = 1;

/// Ceiling on user-supplied properties after the core's own additions:
/// the broker cap minus what the core reserves.
pub const DEFAULT_MAX_ALLOWED_PROPERTIES: usize = BROKER_PROPERTY_CAP - CORE_RESERVED_PROPERTIES;

/// Pipeline configuration. Construct with [`Config::default`] and adjust
/// with the setters; `blob_key_prefix` goes through [`Config::set_blob_key_prefix`]
/// rather than being a plain public field, since it must validate.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub message_size_threshold: usize,
    pub always_through_blob: bool,
    pub cleanup_blob_on_delete: bool,
    blob_key_prefix: String,
    pub ignore_payload_not_found: bool,
    pub use_legacy_reserved_attribute_name: bool,
    pub payload_support_enabled: bool,
    pub blob_access_tier: Option<AccessTier>,
    pub encryption_scope: Option<String>,
    pub customer_provided_key: Option<String>,
    max_allowed_properties: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            message_size_threshold: DEFAULT_MESSAGE_SIZE_THRESHOLD,
            always_through_blob: false,
            cleanup_blob_on_delete: true,
            blob_key_prefix: String::new(),
            ignore_payload_not_found: false,
            use_legacy_reserved_attribute_name: true,
            payload_support_enabled: true,
            blob_access_tier: None,
            encryption_scope: None,
            customer_provided_key: None,
            max_allowed_properties: DEFAULT_MAX_ALLOWED_PROPERTIES,
        }
    }
}

impl Config {
    /// Current blob key prefix.
    #[must_use]
    pub fn blob_key_prefix(&self) -> &str {
        &self.blob_key_prefix
    }

    /// Set the blob key prefix, validating it atomically: on failure the
    /// prior prefix is left untouched.
    pub fn set_blob_key_prefix(&mut self, prefix: impl Into<String>) -> Result<(), ConfigError> {
        let prefix = prefix.into();
        prefix::validate(&prefix)?;
        self.blob_key_prefix = prefix;
        Ok(())
    }

    /// Current ceiling on user-supplied properties.
    #[must_use]
    pub fn max_allowed_properties(&self) -> usize {
        self.max_allowed_properties
    }

    /// Set the ceiling on user-supplied properties, validating it against
    /// the broker's own per-message property cap: on failure the prior
    /// value is left untouched.
    pub fn set_max_allowed_properties(&mut self, value: usize) -> Result<(), ConfigError> {
        if value > DEFAULT_MAX_ALLOWED_PROPERTIES {
            return Err(ConfigError::InvalidMaxProperties {
                value,
                max: DEFAULT_MAX_ALLOWED_PROPERTIES,
            });
        }
        self.max_allowed_properties = value;
        Ok(())
    }

    /// The size-marker property key selected by
    /// `useLegacyReservedAttributeName`.
    #[must_use]
    pub fn reserved_attribute_name(&self) -> &'static str {
        if self.use_legacy_reserved_attribute_name {
            LEGACY_SIZE_ATTRIBUTE
        } else {
            MODERN_SIZE_ATTRIBUTE
        }
    }

    /// Whether a body of this size should be offloaded under this config.
    #[must_use]
    pub fn should_offload(&self, body_len: usize) -> bool {
        self.always_through_blob || body_len > self.message_size_threshold
    }
}

/// Mint a fresh blob key: `blob_key_prefix || fresh_identifier()`.
///
/// Each call draws a new v4 UUID (122 bits of randomness) in canonical
/// 36-character hyphenated form; collisions are treated as impossible.
#[must_use]
pub fn mint_key(config: &Config) -> String {
    format!("{}{}", config.blob_key_prefix(), fresh_identifier())
}

/// Draw a fresh, canonically-formatted v4 UUID string.
#[must_use]
pub fn fresh_identifier() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.message_size_threshold, 262_144);
        assert!(!config.always_through_blob);
        assert!(config.cleanup_blob_on_delete);
        assert_eq!(config.blob_key_prefix(), "");
        assert!(!config.ignore_payload_not_found);
        assert!(config.use_legacy_reserved_attribute_name);
        assert!(config.payload_support_enabled);
        assert_eq!(config.max_allowed_properties(), 9);
    }

    #[test]
    fn reserved_attribute_name_follows_the_legacy_flag() {
        let mut config = Config::default();
        assert_eq!(config.reserved_attribute_name(), LEGACY_SIZE_ATTRIBUTE);
        config.use_legacy_reserved_attribute_name = false;
        assert_eq!(config.reserved_attribute_name(), MODERN_SIZE_ATTRIBUTE);
    }

    #[test]
    fn invalid_prefix_leaves_prior_value_untouched() {
        let mut config = Config::default();
        config.set_blob_key_prefix("good/prefix").unwrap();
        let err = config.set_blob_key_prefix("invalid@prefix");
        assert!(err.is_err());
        assert_eq!(config.blob_key_prefix(), "good/prefix");
    }

    #[test]
    fn mint_key_prepends_the_prefix() {
        let mut config = Config::default();
        config.set_blob_key_prefix("tenant-a/").unwrap();
        let key = mint_key(&config);
        assert!(key.starts_with("tenant-a/"));
        assert_eq!(key.len(), "tenant-a/".len() + crate::prefix::IDENTIFIER_LENGTH);
    }

    #[test]
    fn fresh_identifier_is_unique_across_calls() {
        let a = fresh_identifier();
        let b = fresh_identifier();
        assert_ne!(a, b);
        assert_eq!(a.len(), crate::prefix::IDENTIFIER_LENGTH);
    }

    #[test]
    fn max_allowed_properties_rejects_values_beyond_the_broker_headroom() {
        let mut config = Config::default();
        config.set_max_allowed_properties(3).unwrap();
        assert_eq!(config.max_allowed_properties(), 3);

        let err = config.set_max_allowed_properties(10);
        assert!(matches!(err, Err(ConfigError::InvalidMaxProperties { value: 10, max: 9 })));
        assert_eq!(config.max_allowed_properties(), 3);
    }

    #[test]
    fn should_offload_honours_threshold_and_force_flag() {
        let mut config = Config {
            message_size_threshold: 1024,
            ..Config::default()
        };
        assert!(!config.should_offload(1024));
        assert!(config.should_offload(1025));
        config.always_through_blob = true;
        assert!(config.should_offload(1));
    }
}
