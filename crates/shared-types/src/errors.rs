//! # Error Types
//!
//! Error enums shared between `claimcheck-core`'s components. Library
//! errors use `thiserror` throughout; only the `claimcheck-cli` binary
//! reaches for `anyhow` at the top level.

use thiserror::Error;

/// A configuration value was rejected; the mutation never took effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("blob key prefix {prefix:?} contains characters outside [A-Za-z0-9._/-]")]
    InvalidPrefixCharset { prefix: String },

    #[error("blob key prefix is {len} bytes, exceeding the {max} byte cap")]
    PrefixTooLong { len: usize, max: usize },

    #[error("maxAllowedProperties {value} exceeds the {max} properties the broker leaves after the core's own reserved attributes")]
    InvalidMaxProperties { value: usize, max: usize },
}

/// Application properties supplied by the caller violated a C3 rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("{count} properties exceeds the cap of {max}")]
    TooMany { count: usize, max: usize },

    #[error("property key {key:?} is reserved for internal use")]
    Reserved { key: String },

    #[error("total property size {bytes} bytes exceeds the cap of {max} bytes")]
    TooLarge { bytes: usize, max: usize },
}

/// The payload store adapter (C5) failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadStoreError {
    #[error("blob not found: {key}")]
    NotFound { key: String },

    #[error("payload store backend failure: {reason}")]
    BackendFailure { reason: String },
}

/// The pointer codec (C1) failed to decode a body as a pointer record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointerCodecError {
    #[error("pointer body is not valid UTF-8/JSON: {reason}")]
    Malformed { reason: String },

    #[error("pointer field {field:?} is empty or whitespace-only")]
    EmptyField { field: &'static str },
}

/// Underlying broker transport failure, independent of the claim-check
/// logic layered on top of it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("broker transport failure: {reason}")]
pub struct BackendFailure {
    pub reason: String,
}

/// Umbrella failure surfaced by the send pipeline (C6).
#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid property: {0}")]
    Property(#[from] PropertyError),

    #[error("payload store failure: {0}")]
    PayloadStore(#[from] PayloadStoreError),

    #[error("broker transport failure: {0}")]
    Transport(#[from] BackendFailure),
}

/// Umbrella failure surfaced by the receive pipeline (C7).
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("failed to decode pointer body: {0}")]
    Codec(#[from] PointerCodecError),

    #[error("payload store failure: {0}")]
    PayloadStore(#[from] PayloadStoreError),

    #[error("broker transport failure: {0}")]
    Transport(#[from] BackendFailure),
}
