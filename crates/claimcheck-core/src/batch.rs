//! # Byte-Budgeted Batch Container
//!
//! A small stand-in for the broker SDK's own batch object: messages are
//! offered one at a time and refused once the byte budget would be
//! exceeded. This is internal to the send pipeline's packing algorithm and
//! does not vary by broker backend, so (unlike [`crate::transport`]) it is
//! a concrete type rather than a capability trait.

use shared_types::OutgoingMessage;

fn estimated_size(message: &OutgoingMessage) -> usize {
    let properties_size: usize = message
        .properties
        .iter()
        .map(|(key, value)| key.len() + value.octet_len())
        .sum();
    message.body.len() + properties_size
}

/// A batch of outgoing messages bounded by a total byte budget.
pub struct MessageBatch {
    max_bytes: usize,
    used_bytes: usize,
    messages: Vec<OutgoingMessage>,
}

impl MessageBatch {
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            messages: Vec::new(),
        }
    }

    /// Number of messages currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Try to add a message to the batch. Returns `false` (and leaves the
    /// batch unchanged) if it would exceed the byte budget.
    #[must_use]
    pub fn try_add(&mut self, message: OutgoingMessage) -> bool {
        let size = estimated_size(&message);
        if self.used_bytes + size > self.max_bytes {
            return false;
        }
        self.used_bytes += size;
        self.messages.push(message);
        true
    }

    /// Drain the batch, resetting it to empty.
    pub fn take(&mut self) -> Vec<OutgoingMessage> {
        self.used_bytes = 0;
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn message(body_len: usize) -> OutgoingMessage {
        OutgoingMessage {
            body: vec![0u8; body_len],
            properties: HashMap::new(),
        }
    }

    #[test]
    fn accepts_messages_within_budget() {
        let mut batch = MessageBatch::new(100);
        assert!(batch.try_add(message(40)));
        assert!(batch.try_add(message(40)));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn refuses_once_budget_would_be_exceeded() {
        let mut batch = MessageBatch::new(100);
        assert!(batch.try_add(message(60)));
        assert!(!batch.try_add(message(60)));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn refuses_a_message_too_large_even_alone_on_an_empty_batch() {
        let mut batch = MessageBatch::new(10);
        assert!(!batch.try_add(message(50)));
        assert!(batch.is_empty());
    }

    #[test]
    fn take_resets_the_batch() {
        let mut batch = MessageBatch::new(100);
        assert!(batch.try_add(message(10)));
        let drained = batch.take();
        assert_eq!(drained.len(), 1);
        assert!(batch.is_empty());
    }
}
