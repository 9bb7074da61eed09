//! Device transport trait: the seam between the companion and the watch link
//!
//! A transport assigns a transaction id to each submitted message and later
//! resolves it exactly once, as delivered or failed. Backends (in-memory,
//! NATS) implement `DeviceTransport`.

use crate::types::{DeliveryOutcome, DeviceMessage, TransactionId};
use async_trait::async_trait;
use tokio::sync::oneshot;

pub mod memory;
pub mod nats;

/// Core trait for device transports
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Submit a message for asynchronous delivery
    ///
    /// Never fails at the call site: a transport that cannot queue the
    /// message resolves the returned submission as failed right away.
    async fn submit(&self, message: &DeviceMessage) -> Submission;

    /// Transport name (e.g., "memory", "nats")
    fn name(&self) -> &str;
}

/// Caller side of a submitted message
pub struct Submission {
    transaction_id: TransactionId,
    outcome: oneshot::Receiver<DeliveryOutcome>,
}

impl Submission {
    /// Create a submission and the resolver the transport keeps
    pub fn channel(transaction_id: TransactionId) -> (Self, DeliveryResolver) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                transaction_id: transaction_id.clone(),
                outcome: rx,
            },
            DeliveryResolver { transaction_id, tx },
        )
    }

    /// Create a submission that has already failed
    pub fn failed(transaction_id: TransactionId, error_message: impl Into<String>) -> Self {
        let (submission, resolver) = Self::channel(transaction_id);
        resolver.failed(error_message);
        submission
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// Wait for the transport to resolve this transaction
    ///
    /// Returns `None` if the transport dropped the resolver without
    /// reporting an outcome.
    pub async fn outcome(self) -> Option<DeliveryOutcome> {
        self.outcome.await.ok()
    }
}

/// Transport side of a submitted message
///
/// Consumed by `delivered` or `failed`, so a transaction resolves at most once.
#[derive(Debug)]
pub struct DeliveryResolver {
    transaction_id: TransactionId,
    tx: oneshot::Sender<DeliveryOutcome>,
}

impl DeliveryResolver {
    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// Report successful delivery
    pub fn delivered(self) {
        let outcome = DeliveryOutcome::Delivered {
            transaction_id: self.transaction_id,
        };
        // Receiver gone means nobody is waiting on this transaction any more
        let _ = self.tx.send(outcome);
    }

    /// Report failed delivery with the transport's error message
    pub fn failed(self, error_message: impl Into<String>) {
        let outcome = DeliveryOutcome::Failed {
            transaction_id: self.transaction_id,
            error_message: error_message.into(),
        };
        let _ = self.tx.send(outcome);
    }
}
