//! # Blocking Surface
//!
//! The blocking and asynchronous surfaces share the exact same semantics,
//! validation, ordering, and property rules — they differ only in how
//! completion is observed. These wrappers do not reimplement the pipeline;
//! they drive the same [`crate::send::SendPipeline`] /
//! [`crate::receive::ReceivePipeline`] / [`crate::lifecycle::LifecycleOps`]
//! methods to completion on a current-thread Tokio runtime.

use crate::lifecycle::{CleanupTally, LifecycleOps, RenewTally};
use crate::payload_store::PayloadStore;
use crate::receive::{ReceiveBatch, ReceivePipeline};
use crate::send::SendPipeline;
use crate::transport::BrokerTransport;
use shared_types::{
    BackendFailure, BrokerMessage, PropertyValue, ReceiveError, ResolvedMessage, SendError,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Builder;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    // A fresh current-thread runtime per call keeps this wrapper free of
    // shared state; callers driving many blocking calls in a hot loop
    // should prefer the async surface directly.
    Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("failed to start a current-thread runtime for the blocking surface")
        .block_on(future)
}

/// Blocking wrapper over [`SendPipeline`].
pub struct BlockingSendPipeline<B: BrokerTransport, S: PayloadStore>(SendPipeline<B, S>);

impl<B: BrokerTransport, S: PayloadStore> BlockingSendPipeline<B, S> {
    pub fn new(inner: SendPipeline<B, S>) -> Self {
        Self(inner)
    }

    pub fn send(
        &self,
        body: Vec<u8>,
        user_properties: HashMap<String, PropertyValue>,
    ) -> Result<(), SendError> {
        block_on(self.0.send(body, user_properties))
    }

    pub fn send_batch(
        &self,
        bodies: Vec<Vec<u8>>,
        common_properties: HashMap<String, PropertyValue>,
    ) -> Result<(), SendError> {
        block_on(self.0.send_batch(bodies, common_properties))
    }
}

/// Blocking wrapper over [`ReceivePipeline`].
pub struct BlockingReceivePipeline<B: BrokerTransport, S: PayloadStore>(ReceivePipeline<B, S>);

impl<B: BrokerTransport, S: PayloadStore> BlockingReceivePipeline<B, S> {
    pub fn new(inner: ReceivePipeline<B, S>) -> Self {
        Self(inner)
    }

    pub fn receive(&self, max_messages: u32, wait: Duration) -> Result<ReceiveBatch, ReceiveError> {
        block_on(self.0.receive(max_messages, wait))
    }
}

/// Blocking wrapper over [`LifecycleOps`].
pub struct BlockingLifecycleOps<B: BrokerTransport, S: PayloadStore>(LifecycleOps<B, S>);

impl<B: BrokerTransport, S: PayloadStore> BlockingLifecycleOps<B, S> {
    pub fn new(inner: LifecycleOps<B, S>) -> Self {
        Self(inner)
    }

    pub fn delete_payload(&self, resolved: &ResolvedMessage) {
        block_on(self.0.delete_payload(resolved))
    }

    pub fn delete_payload_batch(&self, messages: &[ResolvedMessage]) -> CleanupTally {
        block_on(self.0.delete_payload_batch(messages))
    }

    pub fn renew_lock(&self, message: &BrokerMessage) -> Result<(), BackendFailure> {
        block_on(self.0.renew_lock(message))
    }

    pub fn renew_lock_batch(&self, messages: &[BrokerMessage]) -> RenewTally {
        block_on(self.0.renew_lock_batch(messages))
    }
}
