//! End-to-end tests driving the claim-check client as a whole, exercising
//! scenarios that cross module boundaries (codec + config + transport +
//! send/receive/lifecycle together) rather than a single pipeline stage in
//! isolation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use claimcheck_core::config::Config;
use claimcheck_core::payload_store::BlobPayloadStore;
use claimcheck_core::transport::fakes::{InMemoryBlob, InMemoryBroker};
use claimcheck_core::Client;
use shared_types::{PropertyValue, SendError};

fn client(config: Config) -> (Client<InMemoryBroker, BlobPayloadStore<InMemoryBlob>>, Arc<InMemoryBlob>) {
    let blob = Arc::new(InMemoryBlob::new("payloads"));
    let broker = Arc::new(InMemoryBroker::new());
    let store = Arc::new(BlobPayloadStore::new(blob.clone(), "payloads", &config));
    (Client::new(config, broker, store, "claimcheck-tests/1.0"), blob)
}

#[tokio::test]
async fn small_message_round_trips_without_touching_the_blob_store() {
    let mut config = Config::default();
    config.message_size_threshold = 1024;
    let (client, blob) = client(config);

    client
        .send
        .send(b"Small test message".to_vec(), HashMap::new())
        .await
        .unwrap();

    assert!(blob.is_empty());
    let resolved = client.receive.receive(1, Duration::ZERO).await.unwrap();
    assert_eq!(resolved.messages[0].body, b"Small test message");
    assert!(!resolved.messages[0].payload_from_blob);
}

#[tokio::test]
async fn oversized_message_round_trips_through_the_blob_store_and_cleans_up() {
    let mut config = Config::default();
    config.message_size_threshold = 1024;
    let (client, blob) = client(config);

    let body = vec![b'a'; 2048];
    client.send.send(body.clone(), HashMap::new()).await.unwrap();
    assert_eq!(blob.len(), 1);

    let resolved = client.receive.receive(1, Duration::ZERO).await.unwrap();
    let message = &resolved.messages[0];
    assert_eq!(message.body, body);
    assert!(message.payload_from_blob);

    client.lifecycle.delete_payload(message).await;
    assert!(blob.is_empty());
}

#[tokio::test]
async fn batch_send_preserves_caller_order_on_the_broker_side() {
    let mut config = Config::default();
    config.message_size_threshold = 1024;
    let (client, blob) = client(config);

    client
        .send
        .send_batch(
            vec![b"first".to_vec(), vec![b'a'; 2048], b"third".to_vec()],
            HashMap::new(),
        )
        .await
        .unwrap();

    assert_eq!(blob.len(), 1);
    let resolved = client.receive.receive(3, Duration::ZERO).await.unwrap();
    assert_eq!(resolved.messages.len(), 3);
    assert_eq!(resolved.messages[0].body, b"first");
    assert_eq!(resolved.messages[1].body, vec![b'a'; 2048]);
    assert_eq!(resolved.messages[2].body, b"third");
}

#[tokio::test]
async fn too_many_properties_is_rejected_before_any_blob_put() {
    let mut config = Config::default();
    config.set_max_allowed_properties(3).unwrap();
    let (client, blob) = client(config);

    let mut props = HashMap::new();
    for i in 0..4 {
        props.insert(format!("p{i}"), PropertyValue::Int(i));
    }

    let err = client
        .send
        .send(vec![b'a'; 9999], props)
        .await
        .unwrap_err();
    assert!(matches!(err, SendError::Property(_)));
    assert!(blob.is_empty());
}

#[tokio::test]
async fn invalid_blob_key_prefix_is_rejected_and_leaves_config_untouched() {
    let mut config = Config::default();
    assert!(config.set_blob_key_prefix("good/prefix").is_ok());
    assert!(config.set_blob_key_prefix("invalid@prefix").is_err());
    assert_eq!(config.blob_key_prefix(), "good/prefix");

    let overlong = "a".repeat(1000);
    assert!(config.set_blob_key_prefix(overlong).is_err());
    assert_eq!(config.blob_key_prefix(), "good/prefix");
}

#[tokio::test]
async fn client_processor_completes_successfully_handled_messages() {
    let config = Config::default();
    let (mut client, _blob) = client(config);

    client
        .send
        .send(b"hello".to_vec(), HashMap::new())
        .await
        .unwrap();

    let seen = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let seen_clone = seen.clone();
    client.install_processor(
        1,
        Duration::from_millis(10),
        move |_resolved| {
            seen_clone.store(true, std::sync::atomic::Ordering::SeqCst);
            async { Ok(()) }
        },
        |_err| {},
    );

    for _ in 0..50 {
        if seen.load(std::sync::atomic::Ordering::SeqCst) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    client.stop_processor().await;

    assert!(seen.load(std::sync::atomic::Ordering::SeqCst));
}
