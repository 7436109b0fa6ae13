//! # Push Processor
//!
//! A background task that polls the broker, resolves each message through
//! the claim-check pipeline, and hands it to a caller-supplied handler.
//! The handler's outcome drives the ack: success completes the message,
//! failure abandons it for redelivery. A resolve failure (bad pointer,
//! missing blob) is reported to the caller's error handler and the raw
//! message is abandoned rather than left to time out silently.

use crate::payload_store::PayloadStore;
use crate::receive::ReceivePipeline;
use crate::transport::BrokerTransport;
use shared_types::{ReceiveError, ResolvedMessage};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::warn;

/// A running processor task. Dropping it stops the task, which is how
/// "installing a new processor replaces the prior one" is enforced by
/// [`crate::client::Client`]: it simply drops the old handle before
/// storing the new one.
pub struct Processor {
    handle: Option<JoinHandle<()>>,
}

impl Processor {
    /// Stop the processor and wait for the in-flight poll to unwind.
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Spawn a processor loop. `handler` runs once per resolved message;
/// returning `Err` abandons the message instead of completing it.
pub fn spawn<B, S, H, Fut>(
    broker: Arc<B>,
    receive: Arc<ReceivePipeline<B, S>>,
    max_messages: u32,
    wait: Duration,
    mut handler: H,
    mut on_resolve_error: impl FnMut(ReceiveError) + Send + 'static,
) -> Processor
where
    B: BrokerTransport + 'static,
    S: PayloadStore + 'static,
    H: FnMut(ResolvedMessage) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), String>> + Send,
{
    let handle = tokio::spawn(async move {
        loop {
            let raws = match broker.receive(max_messages, wait).await {
                Ok(raws) => raws,
                Err(err) => {
                    warn!(error = %err, "processor poll failed; retrying");
                    sleep(wait).await;
                    continue;
                }
            };

            if raws.is_empty() {
                sleep(wait).await;
                continue;
            }

            for raw in raws {
                let ack_handle = raw.clone();
                match receive.resolve(raw).await {
                    Ok(resolved) => match handler(resolved).await {
                        Ok(()) => {
                            if let Err(err) = broker.complete(&ack_handle).await {
                                warn!(message_id = %ack_handle.message_id, error = %err, "failed to complete message");
                            }
                        }
                        Err(reason) => {
                            warn!(message_id = %ack_handle.message_id, %reason, "handler failed; abandoning message");
                            if let Err(err) = broker.abandon(&ack_handle).await {
                                warn!(message_id = %ack_handle.message_id, error = %err, "failed to abandon message");
                            }
                        }
                    },
                    Err(err) => {
                        if let Err(abandon_err) = broker.abandon(&ack_handle).await {
                            warn!(message_id = %ack_handle.message_id, error = %abandon_err, "failed to abandon unresolvable message");
                        }
                        on_resolve_error(err);
                    }
                }
            }
        }
    });

    Processor {
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::payload_store::BlobPayloadStore;
    use crate::send::SendPipeline;
    use crate::transport::fakes::{InMemoryBlob, InMemoryBroker};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn successful_handler_completes_the_message() {
        let config = Config::default();
        let blob = Arc::new(InMemoryBlob::new("payloads"));
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(BlobPayloadStore::new(blob, "payloads", &config));
        let send = SendPipeline::new(config, broker.clone(), store.clone(), "claimcheck/1.0");
        let receive = Arc::new(ReceivePipeline::new(broker.clone(), store));

        send.send(b"hello".to_vec(), HashMap::new()).await.unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_handler = seen.clone();
        let processor = spawn(
            broker.clone(),
            receive,
            1,
            Duration::from_millis(10),
            move |_resolved| {
                seen_in_handler.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            },
            |_err| {},
        );

        for _ in 0..50 {
            if seen.load(Ordering::SeqCst) == 1 {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        processor.stop().await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(broker.completed.lock().unwrap().len(), 1);
        assert!(broker.abandoned.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_handler_abandons_the_message() {
        let config = Config::default();
        let blob = Arc::new(InMemoryBlob::new("payloads"));
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(BlobPayloadStore::new(blob, "payloads", &config));
        let send = SendPipeline::new(config, broker.clone(), store.clone(), "claimcheck/1.0");
        let receive = Arc::new(ReceivePipeline::new(broker.clone(), store));

        send.send(b"hello".to_vec(), HashMap::new()).await.unwrap();

        let processor = spawn(
            broker.clone(),
            receive,
            1,
            Duration::from_millis(10),
            |_resolved| async { Err("handler exploded".to_string()) },
            |_err| {},
        );

        for _ in 0..50 {
            if !broker.abandoned.lock().unwrap().is_empty() {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        processor.stop().await;

        assert_eq!(broker.abandoned.lock().unwrap().len(), 1);
        assert!(broker.completed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dropping_the_processor_stops_the_poll_loop() {
        let config = Config::default();
        let blob = Arc::new(InMemoryBlob::new("payloads"));
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(BlobPayloadStore::new(blob, "payloads", &config));
        let receive = Arc::new(ReceivePipeline::new(broker.clone(), store));

        let processor = spawn(
            broker.clone(),
            receive,
            1,
            Duration::from_millis(5),
            |_resolved| async { Ok(()) },
            |_err| {},
        );
        drop(processor);
        sleep(Duration::from_millis(20)).await;
        assert_eq!(broker.completed.lock().unwrap().len(), 0);
    }
}
