//! In-memory device transport for testing and single-process hosts
//!
//! Records every submitted message together with its encoded dictionary and
//! hands out sequential transaction ids. In manual mode transactions stay
//! pending until `deliver` or `fail` is called for them. A message the codec
//! cannot encode is recorded and resolved as failed.

use super::{DeliveryResolver, DeviceTransport, Submission};
use crate::codec::{self, MessageKeys};
use crate::config::CompanionConfig;
use crate::error::{CompanionError, Result};
use crate::types::{DeviceMessage, TransactionId};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// How the memory transport resolves submitted messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Leave transactions pending until resolved explicitly
    #[default]
    Manual,
    /// Resolve every submission as delivered
    AutoDeliver,
    /// Resolve every submission as failed with this message
    AutoFail(String),
}

/// Memory transport configuration
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Id assigned to the first submitted message
    pub first_transaction_id: u64,
    pub mode: DeliveryMode,
    /// Dictionary keys used to encode each message
    pub keys: MessageKeys,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            first_transaction_id: 1,
            mode: DeliveryMode::Manual,
            keys: MessageKeys::default(),
        }
    }
}

impl From<&CompanionConfig> for MemoryConfig {
    fn from(config: &CompanionConfig) -> Self {
        Self {
            keys: config.keys,
            ..Default::default()
        }
    }
}

/// A message accepted by the memory transport
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedMessage {
    pub transaction_id: TransactionId,
    pub message: DeviceMessage,
    /// Encoded dictionary, `None` when the codec rejected the message
    pub payload: Option<Bytes>,
}

struct State {
    next_id: u64,
    submitted: Vec<SubmittedMessage>,
    pending: HashMap<TransactionId, DeliveryResolver>,
}

/// In-memory device transport
///
/// Cloning shares the underlying state, so a test can keep a handle while
/// the dispatcher owns another.
#[derive(Clone)]
pub struct MemoryTransport {
    state: Arc<Mutex<State>>,
    mode: DeliveryMode,
    keys: MessageKeys,
}

impl MemoryTransport {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_id: config.first_transaction_id,
                submitted: Vec::new(),
                pending: HashMap::new(),
            })),
            mode: config.mode,
            keys: config.keys,
        }
    }

    /// Transport that acknowledges every message immediately
    pub fn auto_deliver() -> Self {
        Self::new(MemoryConfig {
            mode: DeliveryMode::AutoDeliver,
            ..Default::default()
        })
    }

    /// Transport that rejects every message with `error_message`
    pub fn auto_fail(error_message: impl Into<String>) -> Self {
        Self::new(MemoryConfig {
            mode: DeliveryMode::AutoFail(error_message.into()),
            ..Default::default()
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| CompanionError::Provider(format!("Memory transport lock poisoned: {}", e)))
    }

    fn take_pending(&self, transaction_id: &TransactionId) -> Result<DeliveryResolver> {
        self.lock()?
            .pending
            .remove(transaction_id)
            .ok_or_else(|| CompanionError::NotFound(transaction_id.to_string()))
    }

    /// Resolve a pending transaction as delivered
    pub fn deliver(&self, transaction_id: impl Into<TransactionId>) -> Result<()> {
        let resolver = self.take_pending(&transaction_id.into())?;
        resolver.delivered();
        Ok(())
    }

    /// Resolve a pending transaction as failed
    pub fn fail(
        &self,
        transaction_id: impl Into<TransactionId>,
        error_message: impl Into<String>,
    ) -> Result<()> {
        let resolver = self.take_pending(&transaction_id.into())?;
        resolver.failed(error_message);
        Ok(())
    }

    /// Drop a pending transaction without resolving it
    pub fn abandon(&self, transaction_id: impl Into<TransactionId>) -> Result<()> {
        self.take_pending(&transaction_id.into()).map(drop)
    }

    /// All messages submitted so far, in submission order
    pub fn submitted(&self) -> Result<Vec<SubmittedMessage>> {
        Ok(self.lock()?.submitted.clone())
    }

    pub fn submit_count(&self) -> Result<usize> {
        Ok(self.lock()?.submitted.len())
    }

    /// Ids of transactions still waiting for an outcome
    pub fn pending(&self) -> Result<Vec<TransactionId>> {
        let mut ids: Vec<TransactionId> = self.lock()?.pending.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[async_trait]
impl DeviceTransport for MemoryTransport {
    async fn submit(&self, message: &DeviceMessage) -> Submission {
        let mut state = match self.lock() {
            Ok(state) => state,
            Err(e) => return Submission::failed(TransactionId::generate(), e.to_string()),
        };

        let transaction_id = TransactionId::from(state.next_id);
        state.next_id += 1;

        let encoded = codec::encode(message, &self.keys);
        state.submitted.push(SubmittedMessage {
            transaction_id: transaction_id.clone(),
            message: message.clone(),
            payload: encoded.as_ref().ok().cloned(),
        });

        if let Err(e) = encoded {
            tracing::debug!(
                transaction_id = %transaction_id,
                error = %e,
                "Memory transport could not encode message"
            );
            return Submission::failed(transaction_id, e.to_string());
        }

        let (submission, resolver) = Submission::channel(transaction_id);
        match &self.mode {
            DeliveryMode::Manual => {
                state
                    .pending
                    .insert(resolver.transaction_id().clone(), resolver);
            }
            DeliveryMode::AutoDeliver => resolver.delivered(),
            DeliveryMode::AutoFail(error_message) => resolver.failed(error_message.clone()),
        }

        tracing::debug!(
            transaction_id = %submission.transaction_id(),
            mode = ?self.mode,
            "Message accepted by memory transport"
        );

        submission
    }

    fn name(&self) -> &str {
        "memory"
    }
}
