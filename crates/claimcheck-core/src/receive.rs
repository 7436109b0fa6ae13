//! # Receive Pipeline (C7)
//!
//! Per message: detect the pointer marker, decode the pointer, fetch the
//! body from the payload store, strip the reserved properties, and hand
//! back a unified [`ResolvedMessage`] view regardless of whether the body
//! was offloaded.

use crate::codec;
use crate::payload_store::PayloadStore;
use crate::transport::BrokerTransport;
use shared_types::{
    BrokerMessage, ReceiveError, ResolvedMessage, LEGACY_SIZE_ATTRIBUTE, MODERN_SIZE_ATTRIBUTE,
    POINTER_MARKER_ATTRIBUTE, POINTER_MARKER_VALUE, PropertyValue, USER_AGENT_ATTRIBUTE,
};
use std::sync::Arc;
use std::time::Duration;

/// The receive side of the claim-check pipeline.
pub struct ReceivePipeline<B: BrokerTransport, S: PayloadStore> {
    broker: Arc<B>,
    payload_store: Arc<S>,
}

/// Outcome of pulling a batch from the broker: the messages that resolved
/// successfully, plus one entry per message that failed to resolve (bad
/// pointer, missing blob). A single bad message never blocks delivery of
/// the rest of the batch.
#[derive(Debug, Default)]
pub struct ReceiveBatch {
    pub messages: Vec<ResolvedMessage>,
    pub failures: Vec<ReceiveError>,
}

fn is_pointer_marked(value: Option<&PropertyValue>) -> bool {
    match value {
        Some(PropertyValue::String(s)) => s == POINTER_MARKER_VALUE,
        Some(PropertyValue::Bool(b)) => *b,
        _ => false,
    }
}

fn strip_reserved_properties(message: &mut BrokerMessage) {
    for key in [
        POINTER_MARKER_ATTRIBUTE,
        LEGACY_SIZE_ATTRIBUTE,
        MODERN_SIZE_ATTRIBUTE,
        USER_AGENT_ATTRIBUTE,
    ] {
        message.properties.remove(key);
    }
}

impl<B: BrokerTransport, S: PayloadStore> ReceivePipeline<B, S> {
    pub fn new(broker: Arc<B>, payload_store: Arc<S>) -> Self {
        Self {
            broker,
            payload_store,
        }
    }

    /// Resolve a single already-received broker message. Exposed at
    /// crate visibility so the push processor can resolve messages it
    /// pulls itself (it needs the original [`BrokerMessage`] afterwards
    /// to complete or abandon it, which the batch `receive` above does
    /// not retain).
    pub(crate) async fn resolve(&self, mut raw: BrokerMessage) -> Result<ResolvedMessage, ReceiveError> {
        let from_blob = is_pointer_marked(raw.properties.get(POINTER_MARKER_ATTRIBUTE));

        let (body, pointer) = if from_blob {
            let pointer = codec::decode(&raw.body)?;
            let fetched = self.payload_store.get(&pointer).await;
            match &fetched {
                Ok(_) => claimcheck_telemetry::BLOB_OPERATIONS
                    .with_label_values(&["get", "success"])
                    .inc(),
                Err(_) => claimcheck_telemetry::BLOB_OPERATIONS
                    .with_label_values(&["get", "failure"])
                    .inc(),
            }
            let body = fetched?.unwrap_or_default();
            (body, Some(pointer))
        } else {
            (std::mem::take(&mut raw.body), None)
        };

        strip_reserved_properties(&mut raw);
        claimcheck_telemetry::MESSAGES_RESOLVED
            .with_label_values(&[if from_blob { "blob" } else { "inline" }])
            .inc();

        Ok(ResolvedMessage {
            message_id: raw.message_id,
            body,
            properties: raw.properties,
            payload_from_blob: from_blob,
            pointer,
        })
    }

    /// Pull up to `max_messages` from the broker and resolve each. A
    /// decode/fetch failure on one message never discards the messages
    /// around it: the outer `Result` only ever fails for the broker fetch
    /// itself, and every per-message resolve outcome lands in the returned
    /// [`ReceiveBatch`], successes in `messages` and failures in `failures`.
    pub async fn receive(
        &self,
        max_messages: u32,
        wait: Duration,
    ) -> Result<ReceiveBatch, ReceiveError> {
        let raw_messages = self.broker.receive(max_messages, wait).await?;
        let mut batch = ReceiveBatch::default();
        for raw in raw_messages {
            match self.resolve(raw).await {
                Ok(resolved) => batch.messages.push(resolved),
                Err(err) => batch.failures.push(err),
            }
        }
        Ok(batch)
    }
}
