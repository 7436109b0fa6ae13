//! # Client
//!
//! Bundles the send pipeline, receive pipeline, and lifecycle operations
//! over one broker/blob pair, plus the at-most-one-processor slot: a
//! client installs at most one push processor at a time, and installing a
//! new one stops the prior one first rather than running both.

use crate::config::Config;
use crate::lifecycle::LifecycleOps;
use crate::payload_store::PayloadStore;
use crate::processor::{self, Processor};
use crate::receive::ReceivePipeline;
use crate::send::SendPipeline;
use crate::transport::BrokerTransport;
use shared_types::ReceiveError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A claim-check client over one broker/blob pair.
pub struct Client<B: BrokerTransport + 'static, S: PayloadStore + 'static> {
    pub send: SendPipeline<B, S>,
    pub receive: Arc<ReceivePipeline<B, S>>,
    pub lifecycle: LifecycleOps<B, S>,
    broker: Arc<B>,
    processor: Option<Processor>,
}

impl<B: BrokerTransport + 'static, S: PayloadStore + 'static> Client<B, S> {
    pub fn new(config: Config, broker: Arc<B>, payload_store: Arc<S>, user_agent: impl Into<String>) -> Self {
        let send = SendPipeline::new(config.clone(), broker.clone(), payload_store.clone(), user_agent);
        let receive = Arc::new(ReceivePipeline::new(broker.clone(), payload_store.clone()));
        let lifecycle = LifecycleOps::new(config, broker.clone(), payload_store);
        Self {
            send,
            receive,
            lifecycle,
            broker,
            processor: None,
        }
    }

    /// Install a push processor, replacing any currently running one.
    /// The prior processor is dropped (which aborts its poll loop)
    /// before the new one is spawned, enforcing at most one processor
    /// per client instance.
    pub fn install_processor<H, Fut>(
        &mut self,
        max_messages: u32,
        wait: Duration,
        handler: H,
        on_resolve_error: impl FnMut(ReceiveError) + Send + 'static,
    ) where
        H: FnMut(shared_types::ResolvedMessage) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), String>> + Send,
    {
        self.processor = None;
        self.processor = Some(processor::spawn(
            self.broker.clone(),
            self.receive.clone(),
            max_messages,
            wait,
            handler,
            on_resolve_error,
        ));
    }

    /// Stop any installed processor without installing a new one.
    pub async fn stop_processor(&mut self) {
        if let Some(processor) = self.processor.take() {
            processor.stop().await;
        }
    }

    /// Tear the client down: stop the processor (if any), then close the
    /// sender, then the receiver. `send` and `receive` share one broker
    /// connection here, so closing each in turn means calling
    /// [`BrokerTransport::close`] once the processor is no longer driving
    /// either of them — there is nothing left for the sender or receiver
    /// to release on their own once the shared connection is closed.
    pub async fn close(&mut self) -> Result<(), shared_types::BackendFailure> {
        self.stop_processor().await;
        self.broker.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload_store::BlobPayloadStore;
    use crate::transport::fakes::{InMemoryBlob, InMemoryBroker};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    #[tokio::test]
    async fn installing_a_new_processor_replaces_the_old_one() {
        let config = Config::default();
        let blob = Arc::new(InMemoryBlob::new("payloads"));
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(BlobPayloadStore::new(blob, "payloads", &config));
        let mut client = Client::new(config, broker.clone(), store, "claimcheck/1.0");

        client
            .send
            .send(b"one".to_vec(), HashMap::new())
            .await
            .unwrap();

        let first_seen = Arc::new(AtomicUsize::new(0));
        let first_seen_clone = first_seen.clone();
        client.install_processor(1, Duration::from_millis(5), move |_m| {
            first_seen_clone.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        }, |_| {});

        for _ in 0..50 {
            if first_seen.load(Ordering::SeqCst) > 0 {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(first_seen.load(Ordering::SeqCst), 1);

        let second_seen = Arc::new(AtomicUsize::new(0));
        let second_seen_clone = second_seen.clone();
        client.install_processor(1, Duration::from_millis(5), move |_m| {
            second_seen_clone.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        }, |_| {});

        client
            .send
            .send(b"two".to_vec(), HashMap::new())
            .await
            .unwrap();

        for _ in 0..50 {
            if second_seen.load(Ordering::SeqCst) > 0 {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        client.stop_processor().await;

        assert_eq!(second_seen.load(Ordering::SeqCst), 1);
        assert_eq!(first_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_stops_the_processor_then_closes_the_broker_transport() {
        let config = Config::default();
        let blob = Arc::new(InMemoryBlob::new("payloads"));
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(BlobPayloadStore::new(blob, "payloads", &config));
        let mut client = Client::new(config, broker.clone(), store, "claimcheck/1.0");

        client.install_processor(1, Duration::from_millis(5), |_m| async { Ok(()) }, |_| {});

        client.close().await.unwrap();

        assert!(broker.closed.load(Ordering::SeqCst));
    }
}
