use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use claimcheck_core::config::Config;
use claimcheck_core::payload_store::BlobPayloadStore;
use claimcheck_core::transport::fakes::{InMemoryBlob, InMemoryBroker};
use claimcheck_core::Client;
use claimcheck_telemetry::TelemetryConfig;
use tracing::info;

#[derive(Parser)]
#[command(name = "claimcheck", about = "Claim-check messaging pipeline demo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a message through the pipeline and receive it back, reporting
    /// whether its body was offloaded to the blob store.
    Demo {
        /// Offload threshold in bytes.
        #[arg(long, default_value_t = 262_144)]
        threshold: usize,

        /// Size of the demo message body in bytes.
        #[arg(long, default_value_t = 4096)]
        body_size: usize,

        /// Blob key prefix.
        #[arg(long, default_value = "")]
        key_prefix: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry_config = TelemetryConfig::from_env();
    let _telemetry = claimcheck_telemetry::init_telemetry(telemetry_config)?;

    let cli = Cli::parse();
    match cli.command {
        Command::Demo {
            threshold,
            body_size,
            key_prefix,
        } => run_demo(threshold, body_size, key_prefix).await,
    }
}

async fn run_demo(threshold: usize, body_size: usize, key_prefix: String) -> Result<()> {
    let mut config = Config::default();
    config.message_size_threshold = threshold;
    if !key_prefix.is_empty() {
        config.set_blob_key_prefix(key_prefix)?;
    }

    let blob = Arc::new(InMemoryBlob::new("payloads"));
    let broker = Arc::new(InMemoryBroker::new());
    let store = Arc::new(BlobPayloadStore::new(blob.clone(), "payloads", &config));
    let client = Client::new(config, broker, store, concat!("claimcheck-cli/", env!("CARGO_PKG_VERSION")));

    let body = vec![b'x'; body_size];
    client.send.send(body.clone(), HashMap::new()).await?;
    info!(body_size, blob_count = blob.len(), "message sent");

    let resolved = client.receive.receive(1, Duration::from_millis(50)).await?;
    let message = resolved
        .messages
        .first()
        .ok_or_else(|| anyhow::anyhow!("no message received"))?;

    info!(
        payload_from_blob = message.payload_from_blob,
        resolved_len = message.body.len(),
        "message received and resolved"
    );
    assert_eq!(message.body, body, "resolved body must match what was sent");

    client.lifecycle.delete_payload(message).await;
    info!(blob_count = blob.len(), "post-ack cleanup complete");

    Ok(())
}
