//! Message dispatcher: projects configuration to a device message and
//! tracks its delivery
//!
//! Every send spawns a continuation that waits for the transport's outcome
//! and logs it keyed by transaction id. The continuation runs whether or not
//! the caller keeps the returned `Delivery`.

use crate::transport::DeviceTransport;
use crate::types::{Configuration, DeliveryOutcome, DeliveryState, DeviceMessage, TransactionId};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::instrument::WithSubscriber;

/// Sends device messages through a transport
#[derive(Clone)]
pub struct MessageDispatcher {
    transport: Arc<dyn DeviceTransport>,
}

impl MessageDispatcher {
    pub fn new(transport: impl DeviceTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Create a dispatcher over an already shared transport
    pub fn with_transport(transport: Arc<dyn DeviceTransport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Send a configuration to the device
    ///
    /// No clamping or unit conversion: the time value is forwarded as-is.
    pub async fn send(&self, config: Configuration) -> Delivery {
        let message = DeviceMessage::from(config);
        let submission = self.transport.submit(&message).await;
        let transaction_id = submission.transaction_id().clone();

        tracing::debug!(
            transaction_id = %transaction_id,
            transport = self.transport.name(),
            text = %message.text,
            time = ?message.time,
            "Device message submitted"
        );

        let (tx, rx) = oneshot::channel();
        let id = transaction_id.clone();
        tokio::spawn(
            async move {
                let outcome = submission.outcome().await;
                log_outcome(&id, outcome.as_ref());
                // Handle dropped means the caller chose fire-and-forget
                let _ = tx.send(outcome);
            }
            .with_current_subscriber(),
        );

        Delivery {
            transaction_id,
            outcome: rx,
            finished: None,
        }
    }
}

fn log_outcome(transaction_id: &TransactionId, outcome: Option<&DeliveryOutcome>) {
    match outcome {
        Some(DeliveryOutcome::Delivered { transaction_id }) => {
            tracing::info!(
                transaction_id = %transaction_id,
                "Successfully delivered message"
            );
        }
        Some(DeliveryOutcome::Failed {
            transaction_id,
            error_message,
        }) => {
            tracing::warn!(
                transaction_id = %transaction_id,
                error = %error_message,
                "Unable to deliver message"
            );
        }
        None => {
            tracing::debug!(
                transaction_id = %transaction_id,
                "Transport released message without an outcome"
            );
        }
    }
}

/// Handle to a single in-flight send
pub struct Delivery {
    transaction_id: TransactionId,
    outcome: oneshot::Receiver<Option<DeliveryOutcome>>,
    finished: Option<Option<DeliveryOutcome>>,
}

impl Delivery {
    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// Wait for the outcome
    ///
    /// Returns `None` if the transport released the transaction without
    /// resolving it. Pends forever if the transport never resolves it.
    pub async fn outcome(self) -> Option<DeliveryOutcome> {
        match self.finished {
            Some(finished) => finished,
            None => self.outcome.await.ok().flatten(),
        }
    }

    /// Poll the current state without waiting
    pub fn try_state(&mut self) -> DeliveryState {
        if self.finished.is_none() {
            match self.outcome.try_recv() {
                Ok(outcome) => self.finished = Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => return DeliveryState::Pending,
                Err(oneshot::error::TryRecvError::Closed) => self.finished = Some(None),
            }
        }

        match &self.finished {
            Some(Some(outcome)) => DeliveryState::from(outcome),
            _ => DeliveryState::Unresolved,
        }
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("transaction_id", &self.transaction_id)
            .field("finished", &self.finished)
            .finish()
    }
}
