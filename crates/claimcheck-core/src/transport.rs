//! # Capability Traits
//!
//! The broker and blob backends are external collaborators; the pipeline
//! depends only on these capability interfaces so tests can inject fakes
//! without pulling in a concrete SDK type. Production implementations
//! (a real broker SDK, a real blob SDK) live outside this crate and
//! implement these traits.

use async_trait::async_trait;
use shared_types::{BackendFailure, BlobPutHints, BrokerMessage, OutgoingMessage, PayloadStoreError};
use std::time::Duration;

/// Raw blob backend operations, underneath the semantic wrapper in
/// [`crate::payload_store`].
#[async_trait]
pub trait BlobTransport: Send + Sync {
    /// Create the container if it does not already exist.
    async fn ensure_container(&self) -> Result<(), PayloadStoreError>;

    /// Upload `body` under `key`, overwriting any existing blob at that key.
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        hints: &BlobPutHints,
    ) -> Result<(), PayloadStoreError>;

    /// Download the blob at `key`. Returns `Ok(None)` if it does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PayloadStoreError>;

    /// Delete the blob at `key`. Not-found is success, not an error.
    async fn delete(&self, key: &str) -> Result<(), PayloadStoreError>;
}

/// Raw broker backend operations the send/receive pipelines drive.
#[async_trait]
pub trait BrokerTransport: Send + Sync {
    /// Send a single message.
    async fn send(&self, message: OutgoingMessage) -> Result<(), BackendFailure>;

    /// Send a batch of already-packed messages as one unit.
    async fn send_batch(&self, batch: Vec<OutgoingMessage>) -> Result<(), BackendFailure>;

    /// Pull up to `max_messages` messages, waiting at most `wait` for the
    /// first one to arrive.
    async fn receive(
        &self,
        max_messages: u32,
        wait: Duration,
    ) -> Result<Vec<BrokerMessage>, BackendFailure>;

    /// Extend the lock on an in-flight message.
    async fn renew_lock(&self, message: &BrokerMessage) -> Result<(), BackendFailure>;

    /// Acknowledge successful processing of a message.
    async fn complete(&self, message: &BrokerMessage) -> Result<(), BackendFailure>;

    /// Return a message to the queue for redelivery (handler failed).
    async fn abandon(&self, message: &BrokerMessage) -> Result<(), BackendFailure>;

    /// Release the underlying connection/link. Called once, after the last
    /// in-flight send/receive/lifecycle call on this transport has
    /// returned. The default no-op suits fakes and any backend whose
    /// connection has no explicit teardown step.
    async fn close(&self) -> Result<(), BackendFailure> {
        Ok(())
    }
}

/// In-memory fakes for the two transports: a `HashMap` behind a `Mutex`,
/// `Send + Sync`, used only by tests.
#[cfg(any(test, feature = "test-support"))]
pub mod fakes {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// In-memory blob store, keyed by blob name within a single container.
    #[derive(Default)]
    pub struct InMemoryBlob {
        container: String,
        data: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl InMemoryBlob {
        pub fn new(container: impl Into<String>) -> Self {
            Self {
                container: container.into(),
                data: Mutex::new(HashMap::new()),
            }
        }

        pub fn container(&self) -> &str {
            &self.container
        }

        /// Test helper: inspect whether a key is present.
        pub fn contains(&self, key: &str) -> bool {
            self.data.lock().unwrap().contains_key(key)
        }

        /// Test helper: count of blobs currently stored.
        pub fn len(&self) -> usize {
            self.data.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl BlobTransport for InMemoryBlob {
        async fn ensure_container(&self) -> Result<(), PayloadStoreError> {
            Ok(())
        }

        async fn put(
            &self,
            key: &str,
            body: &[u8],
            _hints: &BlobPutHints,
        ) -> Result<(), PayloadStoreError> {
            self.data
                .lock()
                .unwrap()
                .insert(key.to_string(), body.to_vec());
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PayloadStoreError> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        async fn delete(&self, key: &str) -> Result<(), PayloadStoreError> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }
    }

    /// In-memory broker: an FIFO queue of sent messages and a counter of
    /// completed/abandoned/renewed calls, for assertions in tests.
    #[derive(Default)]
    pub struct InMemoryBroker {
        queue: Mutex<VecDeque<BrokerMessage>>,
        next_id: Mutex<u64>,
        pub completed: Mutex<Vec<String>>,
        pub abandoned: Mutex<Vec<String>>,
        pub lock_renewals: Mutex<Vec<String>>,
        pub closed: std::sync::atomic::AtomicBool,
    }

    impl InMemoryBroker {
        pub fn new() -> Self {
            Self::default()
        }

        fn next_message_id(&self) -> String {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            format!("msg-{}", *next_id)
        }

        pub fn enqueued_len(&self) -> usize {
            self.queue.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BrokerTransport for InMemoryBroker {
        async fn send(&self, message: OutgoingMessage) -> Result<(), BackendFailure> {
            let id = self.next_message_id();
            self.queue.lock().unwrap().push_back(BrokerMessage {
                message_id: id,
                body: message.body,
                properties: message.properties,
            });
            Ok(())
        }

        async fn send_batch(&self, batch: Vec<OutgoingMessage>) -> Result<(), BackendFailure> {
            for message in batch {
                self.send(message).await?;
            }
            Ok(())
        }

        async fn receive(
            &self,
            max_messages: u32,
            _wait: Duration,
        ) -> Result<Vec<BrokerMessage>, BackendFailure> {
            let mut queue = self.queue.lock().unwrap();
            let mut received = Vec::new();
            for _ in 0..max_messages {
                match queue.pop_front() {
                    Some(message) => received.push(message),
                    None => break,
                }
            }
            Ok(received)
        }

        async fn renew_lock(&self, message: &BrokerMessage) -> Result<(), BackendFailure> {
            self.lock_renewals
                .lock()
                .unwrap()
                .push(message.message_id.clone());
            Ok(())
        }

        async fn complete(&self, message: &BrokerMessage) -> Result<(), BackendFailure> {
            self.completed
                .lock()
                .unwrap()
                .push(message.message_id.clone());
            Ok(())
        }

        async fn abandon(&self, message: &BrokerMessage) -> Result<(), BackendFailure> {
            self.abandoned
                .lock()
                .unwrap()
                .push(message.message_id.clone());
            Ok(())
        }

        async fn close(&self) -> Result<(), BackendFailure> {
            self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }
}
