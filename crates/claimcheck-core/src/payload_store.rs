//! # Payload Store Adapter (C5)
//!
//! A thin semantic wrapper over [`crate::transport::BlobTransport`]:
//! `store`/`get`/`delete` in terms of [`PointerRecord`]s, applying the
//! not-found policy and forwarding the optional tier/encryption hints from
//! [`Config`].

use crate::config::Config;
use async_trait::async_trait;
use shared_types::{BlobPutHints, PayloadStoreError, PointerRecord};
use std::sync::Arc;

use crate::transport::BlobTransport;

/// Semantic operations the send/receive pipelines perform against the
/// blob side channel.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Store `body` under a fresh key and return the pointer to it.
    async fn store(&self, key: String, body: &[u8]) -> Result<PointerRecord, PayloadStoreError>;

    /// Fetch the body a pointer refers to.
    ///
    /// Returns `Ok(None)` only when the blob is missing and
    /// `ignorePayloadNotFound` is enabled; otherwise a missing blob
    /// surfaces as `Err(PayloadStoreError::NotFound)`.
    async fn get(&self, pointer: &PointerRecord) -> Result<Option<Vec<u8>>, PayloadStoreError>;

    /// Delete the blob a pointer refers to. At-most-once, best-effort:
    /// deleting an already-deleted blob is not an error.
    async fn delete(&self, pointer: &PointerRecord) -> Result<(), PayloadStoreError>;
}

/// Default [`PayloadStore`] implementation, backed by any
/// [`BlobTransport`].
pub struct BlobPayloadStore<T: BlobTransport> {
    transport: Arc<T>,
    container: String,
    hints: BlobPutHints,
    ignore_payload_not_found: bool,
    container_ensured: tokio::sync::OnceCell<()>,
}

impl<T: BlobTransport> BlobPayloadStore<T> {
    pub fn new(transport: Arc<T>, container: impl Into<String>, config: &Config) -> Self {
        Self {
            transport,
            container: container.into(),
            hints: BlobPutHints {
                access_tier: config.blob_access_tier,
                encryption_scope: config.encryption_scope.clone(),
                customer_provided_key: config.customer_provided_key.clone(),
            },
            ignore_payload_not_found: config.ignore_payload_not_found,
            container_ensured: tokio::sync::OnceCell::new(),
        }
    }

    async fn ensure_container(&self) -> Result<(), PayloadStoreError> {
        self.container_ensured
            .get_or_try_init(|| self.transport.ensure_container())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<T: BlobTransport> PayloadStore for BlobPayloadStore<T> {
    async fn store(&self, key: String, body: &[u8]) -> Result<PointerRecord, PayloadStoreError> {
        self.ensure_container().await?;
        self.transport.put(&key, body, &self.hints).await?;
        Ok(PointerRecord::new(self.container.clone(), key))
    }

    async fn get(&self, pointer: &PointerRecord) -> Result<Option<Vec<u8>>, PayloadStoreError> {
        match self.transport.get(&pointer.key).await? {
            Some(body) => Ok(Some(body)),
            None if self.ignore_payload_not_found => Ok(None),
            None => Err(PayloadStoreError::NotFound {
                key: pointer.key.clone(),
            }),
        }
    }

    async fn delete(&self, pointer: &PointerRecord) -> Result<(), PayloadStoreError> {
        match self.transport.delete(&pointer.key).await {
            Ok(()) => Ok(()),
            Err(PayloadStoreError::NotFound { .. }) => Ok(()),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fakes::InMemoryBlob;

    fn store_with(config: Config) -> BlobPayloadStore<InMemoryBlob> {
        BlobPayloadStore::new(Arc::new(InMemoryBlob::new("payloads")), "payloads", &config)
    }

    #[tokio::test]
    async fn store_then_get_round_trips_the_body() {
        let store = store_with(Config::default());
        let pointer = store.store("k1".into(), b"hello").await.unwrap();
        assert_eq!(pointer.container, "payloads");
        assert_eq!(pointer.key, "k1");
        let body = store.get(&pointer).await.unwrap();
        assert_eq!(body, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn get_missing_blob_fails_by_default() {
        let store = store_with(Config::default());
        let pointer = PointerRecord::new("payloads", "missing");
        assert!(matches!(
            store.get(&pointer).await,
            Err(PayloadStoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn get_missing_blob_returns_none_when_ignored() {
        let mut config = Config::default();
        config.ignore_payload_not_found = true;
        let store = store_with(config);
        let pointer = PointerRecord::new("payloads", "missing");
        assert_eq!(store.get(&pointer).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_is_a_no_op_on_missing_blob() {
        let store = store_with(Config::default());
        let pointer = PointerRecord::new("payloads", "never-stored");
        assert!(store.delete(&pointer).await.is_ok());
    }

    #[tokio::test]
    async fn delete_twice_is_idempotent() {
        let store = store_with(Config::default());
        let pointer = store.store("k1".into(), b"hello").await.unwrap();
        store.delete(&pointer).await.unwrap();
        store.delete(&pointer).await.unwrap();
    }
}
