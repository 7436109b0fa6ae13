//! # claimcheck-core
//!
//! The claim-check extension for message broker clients: oversized message
//! bodies are offloaded to a blob store and replaced on the wire with a
//! small pointer record, then resolved transparently back to their
//! original bytes on receive.
//!
//! The pipeline is split the way the wire protocol in `shared_types`
//! implies: [`codec`] and [`prefix`] handle the pointer record itself,
//! [`properties`] and [`config`] hold validation and tunables, [`transport`]
//! defines the capability traits a broker/blob backend implements,
//! [`payload_store`] and [`batch`] sit between the pipelines and the raw
//! transports, and [`send`]/[`receive`]/[`lifecycle`]/[`processor`] are the
//! pipeline stages themselves. [`blocking`] mirrors the async surface for
//! callers without a Tokio runtime, and [`client`] bundles all of the above
//! into one handle per broker/blob pair.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod batch;
pub mod blocking;
pub mod client;
pub mod codec;
pub mod config;
pub mod lifecycle;
pub mod payload_store;
pub mod prefix;
pub mod processor;
pub mod properties;
pub mod receive;
pub mod send;
pub mod transport;

pub use batch::MessageBatch;
pub use client::Client;
pub use config::Config;
pub use lifecycle::{CleanupTally, LifecycleOps, RenewTally};
pub use payload_store::{BlobPayloadStore, PayloadStore};
pub use processor::Processor;
pub use receive::ReceivePipeline;
pub use send::SendPipeline;
pub use transport::{BlobTransport, BrokerTransport};
