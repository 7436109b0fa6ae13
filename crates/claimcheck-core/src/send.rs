//! # Send Pipeline (C6)
//!
//! Per message: decide whether to offload, optionally store the body,
//! build the outgoing message with pointer body + marker properties +
//! user-agent stamp, then hand it to the broker transport. The batch path
//! re-evaluates the offload decision independently for every body and
//! packs messages into byte-budgeted broker batches, splitting and
//! sending oversized messages individually.

use crate::batch::MessageBatch;
use crate::config::Config;
use crate::payload_store::PayloadStore;
use crate::transport::BrokerTransport;
use crate::{codec, properties};
use shared_types::{
    reserved_attribute_names, OutgoingMessage, PropertyValue, SendError, POINTER_MARKER_ATTRIBUTE,
    POINTER_MARKER_VALUE, USER_AGENT_ATTRIBUTE,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Broker batch byte budget (observed example: Azure Service Bus's 1 MiB
/// default). Messages that do not fit even alone are sent individually.
pub const DEFAULT_BATCH_MAX_BYTES: usize = 1_048_576;

/// The send side of the claim-check pipeline.
pub struct SendPipeline<B: BrokerTransport, S: PayloadStore> {
    config: Config,
    broker: Arc<B>,
    payload_store: Arc<S>,
    user_agent: String,
    batch_max_bytes: usize,
}

impl<B: BrokerTransport, S: PayloadStore> SendPipeline<B, S> {
    pub fn new(
        config: Config,
        broker: Arc<B>,
        payload_store: Arc<S>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            config,
            broker,
            payload_store,
            user_agent: user_agent.into(),
            batch_max_bytes: DEFAULT_BATCH_MAX_BYTES,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Build the outgoing message for one body, offloading it to the
    /// payload store when the size/policy decision calls for it. Does not
    /// talk to the broker.
    async fn prepare(
        &self,
        body: Vec<u8>,
        user_properties: HashMap<String, PropertyValue>,
    ) -> Result<OutgoingMessage, SendError> {
        if !self.config.payload_support_enabled {
            let mut message = OutgoingMessage::new(body);
            message.properties = user_properties;
            message.properties.insert(
                USER_AGENT_ATTRIBUTE.to_string(),
                PropertyValue::from(self.user_agent.clone()),
            );
            claimcheck_telemetry::MESSAGES_SENT_INLINE.inc();
            return Ok(message);
        }

        let reserved = reserved_attribute_names();
        properties::validate(
            &user_properties,
            &reserved,
            self.config.max_allowed_properties(),
            properties::DEFAULT_MAX_BYTES,
        )?;

        let size = body.len();
        let mut outgoing_body = body.clone();
        let mut message_properties = user_properties;

        if self.config.should_offload(size) {
            let key = crate::config::mint_key(&self.config);
            let timer = claimcheck_telemetry::HistogramTimer::new(&claimcheck_telemetry::BLOB_PUT_DURATION);
            let stored = self.payload_store.store(key, &body).await;
            drop(timer);
            let pointer = match stored {
                Ok(pointer) => {
                    claimcheck_telemetry::BLOB_OPERATIONS
                        .with_label_values(&["put", "success"])
                        .inc();
                    pointer
                }
                Err(err) => {
                    claimcheck_telemetry::BLOB_OPERATIONS
                        .with_label_values(&["put", "failure"])
                        .inc();
                    return Err(err.into());
                }
            };
            outgoing_body = codec::encode(&pointer);
            message_properties.insert(
                self.config.reserved_attribute_name().to_string(),
                PropertyValue::Int(size as i64),
            );
            message_properties.insert(
                POINTER_MARKER_ATTRIBUTE.to_string(),
                PropertyValue::from(POINTER_MARKER_VALUE),
            );
            claimcheck_telemetry::MESSAGES_OFFLOADED.inc();
        } else {
            claimcheck_telemetry::MESSAGES_SENT_INLINE.inc();
        }

        message_properties.insert(
            USER_AGENT_ATTRIBUTE.to_string(),
            PropertyValue::from(self.user_agent.clone()),
        );

        Ok(OutgoingMessage {
            body: outgoing_body,
            properties: message_properties,
        })
    }

    /// Send a single body with its own properties.
    pub async fn send(
        &self,
        body: Vec<u8>,
        user_properties: HashMap<String, PropertyValue>,
    ) -> Result<(), SendError> {
        let message = self.prepare(body, user_properties).await?;
        self.broker.send(message).await?;
        Ok(())
    }

    /// Send a batch of bodies sharing a common property set. Each body's
    /// offload decision and validation is re-evaluated independently; a
    /// validation failure aborts the whole call before any broker flush it
    /// has not yet caused.
    pub async fn send_batch(
        &self,
        bodies: Vec<Vec<u8>>,
        common_properties: HashMap<String, PropertyValue>,
    ) -> Result<(), SendError> {
        let mut prepared = Vec::with_capacity(bodies.len());
        for body in bodies {
            prepared.push(self.prepare(body, common_properties.clone()).await?);
        }

        let mut batch = MessageBatch::new(self.batch_max_bytes);
        for message in prepared {
            if batch.try_add(message.clone()) {
                continue;
            }

            let flushed = batch.take();
            if !flushed.is_empty() {
                self.broker.send_batch(flushed).await?;
            }

            if !batch.try_add(message.clone()) {
                // Doesn't fit even in a fresh, empty batch: send alone.
                self.broker.send(message).await?;
            }
        }

        let remaining = batch.take();
        if !remaining.is_empty() {
            self.broker.send_batch(remaining).await?;
        }

        Ok(())
    }
}
