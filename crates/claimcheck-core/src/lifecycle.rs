//! # Lifecycle Operations (C8)
//!
//! Post-ack blob cleanup and lock-renewal passthrough. Cleanup failures
//! are always swallowed after logging: they must never couple the
//! message-processing path to the blob backend's availability once the
//! broker ack has already succeeded. Batch variants isolate per-message
//! failures and report a tally instead of raising.

use crate::config::Config;
use crate::payload_store::PayloadStore;
use crate::transport::BrokerTransport;
use shared_types::{BrokerMessage, ResolvedMessage};
use std::sync::Arc;
use tracing::warn;

/// Outcome tally for a batch cleanup call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupTally {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome tally for a batch lock-renewal call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenewTally {
    pub succeeded: usize,
    pub failed: usize,
}

/// Post-ack lifecycle operations, layered over the payload store and
/// broker transport.
pub struct LifecycleOps<B: BrokerTransport, S: PayloadStore> {
    config: Config,
    broker: Arc<B>,
    payload_store: Arc<S>,
}

impl<B: BrokerTransport, S: PayloadStore> LifecycleOps<B, S> {
    pub fn new(config: Config, broker: Arc<B>, payload_store: Arc<S>) -> Self {
        Self {
            config,
            broker,
            payload_store,
        }
    }

    /// Reclaim the blob backing a resolved message, if any. Never fails:
    /// a cleanup error is logged and swallowed.
    pub async fn delete_payload(&self, resolved: &ResolvedMessage) {
        if !self.config.cleanup_blob_on_delete || !resolved.payload_from_blob {
            return;
        }
        let Some(pointer) = &resolved.pointer else {
            return;
        };

        if let Err(err) = self.payload_store.delete(pointer).await {
            claimcheck_telemetry::CLEANUP_FAILURES.inc();
            warn!(
                message_id = %resolved.message_id,
                container = %pointer.container,
                key = %pointer.key,
                error = %err,
                "blob cleanup failed; leaving payload for external reclamation"
            );
        }
    }

    /// Reclaim the blobs backing a batch of resolved messages. One
    /// message's cleanup failure never stops the others. When cleanup is
    /// disabled globally the whole call is a no-op and every message is
    /// tallied as skipped.
    pub async fn delete_payload_batch(&self, messages: &[ResolvedMessage]) -> CleanupTally {
        if !self.config.cleanup_blob_on_delete {
            return CleanupTally {
                skipped: messages.len(),
                ..Default::default()
            };
        }

        let mut tally = CleanupTally::default();
        for resolved in messages {
            let pointer = match (resolved.payload_from_blob, resolved.pointer.as_ref()) {
                (true, Some(pointer)) => pointer,
                _ => {
                    tally.skipped += 1;
                    continue;
                }
            };

            match self.payload_store.delete(pointer).await {
                Ok(()) => tally.succeeded += 1,
                Err(err) => {
                    claimcheck_telemetry::CLEANUP_FAILURES.inc();
                    warn!(
                        message_id = %resolved.message_id,
                        error = %err,
                        "blob cleanup failed during batch delete"
                    );
                    tally.failed += 1;
                }
            }
        }
        tally
    }

    /// Extend the lock on a single in-flight message. Pass-through to the
    /// broker transport.
    pub async fn renew_lock(&self, message: &BrokerMessage) -> Result<(), shared_types::BackendFailure> {
        let result = self.broker.renew_lock(message).await;
        if result.is_err() {
            claimcheck_telemetry::LOCK_RENEWAL_FAILURES.inc();
        }
        result
    }

    /// Extend the locks on a batch of in-flight messages, isolating
    /// per-message failures into a tally rather than aborting the batch.
    pub async fn renew_lock_batch(&self, messages: &[BrokerMessage]) -> RenewTally {
        let mut tally = RenewTally::default();
        for message in messages {
            match self.broker.renew_lock(message).await {
                Ok(()) => tally.succeeded += 1,
                Err(err) => {
                    claimcheck_telemetry::LOCK_RENEWAL_FAILURES.inc();
                    warn!(message_id = %message.message_id, error = %err, "lock renewal failed");
                    tally.failed += 1;
                }
            }
        }
        tally
    }
}
