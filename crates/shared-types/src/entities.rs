//! # Core Domain Entities
//!
//! The wire-level shapes the claim-check pipeline passes between the
//! application, the broker transport, and the blob transport.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property key reserved for the modern size marker.
pub const MODERN_SIZE_ATTRIBUTE: &str = "ExtendedPayloadSize";

/// Property key reserved for the legacy size marker (predecessor system).
pub const LEGACY_SIZE_ATTRIBUTE: &str = "ServiceBusLargePayloadSize";

/// Property key marking a message body as a pointer record.
pub const POINTER_MARKER_ATTRIBUTE: &str = "com.azure.servicebus.extended.BlobPointer";

/// Property key carrying the extended-client user-agent stamp.
pub const USER_AGENT_ATTRIBUTE: &str = "ExtendedClientUserAgent";

/// Value of [`POINTER_MARKER_ATTRIBUTE`] when a body has been offloaded.
pub const POINTER_MARKER_VALUE: &str = "true";

/// All four reserved property names, in one place for validation.
pub fn reserved_attribute_names() -> [&'static str; 4] {
    [
        MODERN_SIZE_ATTRIBUTE,
        LEGACY_SIZE_ATTRIBUTE,
        POINTER_MARKER_ATTRIBUTE,
        USER_AGENT_ATTRIBUTE,
    ]
}

/// A scalar application-property value.
///
/// Broker application properties are untyped key/value pairs; this enum
/// covers the scalar types the pipeline itself ever sets or reads, and is
/// what callers supply for their own properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl PropertyValue {
    /// Octet length of `toString(value)`, used by the property-size limit.
    pub fn octet_len(&self) -> usize {
        match self {
            PropertyValue::String(s) => s.len(),
            PropertyValue::Int(i) => i.to_string().len(),
            PropertyValue::Bool(b) => b.to_string().len(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

/// A `{container, key}` reference to a blob, the body placed on the wire in
/// place of an offloaded payload.
///
/// Serialised with the exact field names `containerName`/`blobName` so a
/// legacy consumer of the predecessor system can still recognise it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerRecord {
    #[serde(rename = "containerName")]
    pub container: String,
    #[serde(rename = "blobName")]
    pub key: String,
}

impl PointerRecord {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

/// Optional hints forwarded to the blob transport at put time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobPutHints {
    pub access_tier: Option<AccessTier>,
    pub encryption_scope: Option<String>,
    pub customer_provided_key: Option<String>,
}

/// Storage access tier hint, forwarded to the blob transport unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTier {
    Hot,
    Cool,
    Archive,
}

/// A message as handed to the broker transport on send.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutgoingMessage {
    pub body: Vec<u8>,
    pub properties: HashMap<String, PropertyValue>,
}

impl OutgoingMessage {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            properties: HashMap::new(),
        }
    }
}

/// A raw message as received from the broker transport, before resolution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrokerMessage {
    pub message_id: String,
    pub body: Vec<u8>,
    pub properties: HashMap<String, PropertyValue>,
}

/// A message handed to application code after the receive pipeline has
/// resolved any pointer and stripped the reserved properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMessage {
    pub message_id: String,
    pub body: Vec<u8>,
    pub properties: HashMap<String, PropertyValue>,
    pub payload_from_blob: bool,
    pub pointer: Option<PointerRecord>,
}
