//! NATS JetStream device transport
//!
//! Publishes the encoded message dictionary to the device subject. The
//! JetStream publish ack is the delivery confirmation; a publish error, an
//! ack error or an ack that misses `request_timeout_secs` resolves the
//! transaction as failed.

mod config;

pub use config::NatsTransportConfig;

use super::{DeviceTransport, Submission};
use crate::codec::{self, MessageKeys};
use crate::config::CompanionConfig;
use crate::error::{CompanionError, Result};
use crate::types::{DeviceMessage, TransactionId};
use async_nats::jetstream;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// NATS JetStream device transport
pub struct NatsTransport {
    jetstream: jetstream::Context,
    keys: MessageKeys,
    config: Arc<NatsTransportConfig>,
}

impl NatsTransport {
    /// Connect to NATS and make sure the device stream exists
    pub async fn connect(config: NatsTransportConfig, keys: MessageKeys) -> Result<Self> {
        let client = build_connect_options(&config)
            .connect(&config.url)
            .await
            .map_err(|e| CompanionError::Connection(format!("{}: {}", config.url, e)))?;

        tracing::info!(url = %config.url, "Connected to NATS");

        let jetstream = jetstream::new(client);
        ensure_stream(&jetstream, &config).await?;

        Ok(Self {
            jetstream,
            keys,
            config: Arc::new(config),
        })
    }

    /// Connect using the `[nats]` section and dictionary keys of `config`
    ///
    /// Returns `None` when no NATS link is configured.
    pub async fn from_companion_config(config: &CompanionConfig) -> Result<Option<Self>> {
        match &config.nats {
            Some(nats) => Ok(Some(Self::connect(nats.clone(), config.keys).await?)),
            None => Ok(None),
        }
    }

    pub fn config(&self) -> &NatsTransportConfig {
        &self.config
    }

    pub fn keys(&self) -> &MessageKeys {
        &self.keys
    }
}

#[async_trait]
impl DeviceTransport for NatsTransport {
    async fn submit(&self, message: &DeviceMessage) -> Submission {
        let transaction_id = TransactionId::generate();

        let payload = match codec::encode(message, &self.keys) {
            Ok(payload) => payload,
            Err(e) => return Submission::failed(transaction_id, e.to_string()),
        };

        let subject = self.config.device_subject();
        let mut headers = async_nats::HeaderMap::new();
        headers.insert("Nats-Msg-Id", transaction_id.as_str());

        let (submission, resolver) = Submission::channel(transaction_id);
        let jetstream = self.jetstream.clone();
        let ack_timeout = self.config.ack_timeout();
        let span = tracing::debug_span!(
            "nats_delivery",
            transaction_id = %resolver.transaction_id(),
            subject = %subject
        );

        // The ack resolves the transaction from a background task
        tokio::spawn(
            async move {
                let ack = match jetstream
                    .publish_with_headers(subject, headers, payload)
                    .await
                {
                    Ok(ack_fut) => match tokio::time::timeout(ack_timeout, ack_fut).await {
                        Ok(ack) => ack.map_err(|e| format!("ack failed: {}", e)),
                        Err(_) => Err(format!("ack timed out after {}s", ack_timeout.as_secs())),
                    },
                    Err(e) => Err(e.to_string()),
                };

                match ack {
                    Ok(ack) => {
                        tracing::debug!(sequence = ack.sequence, "Device message acknowledged");
                        resolver.delivered();
                    }
                    Err(reason) => resolver.failed(reason),
                }
            }
            .instrument(span),
        );

        submission
    }

    fn name(&self) -> &str {
        "nats"
    }
}

/// Build NATS connect options from config
fn build_connect_options(config: &NatsTransportConfig) -> async_nats::ConnectOptions {
    let mut opts = async_nats::ConnectOptions::new()
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .request_timeout(Some(config.ack_timeout()));

    if let Some(ref token) = config.token {
        opts = opts.token(token.clone());
    }

    opts
}

/// Ensure the device stream exists so publishes are acknowledged
async fn ensure_stream(js: &jetstream::Context, config: &NatsTransportConfig) -> Result<()> {
    let stream_config = jetstream::stream::Config {
        name: config.stream_name.clone(),
        subjects: config.stream_subjects(),
        storage: jetstream::stream::StorageType::Memory,
        ..Default::default()
    };

    js.get_or_create_stream(stream_config)
        .await
        .map_err(|e| CompanionError::Connection(format!(
            "Failed to create stream '{}': {}",
            config.stream_name, e
        )))?;

    tracing::debug!(stream = %config.stream_name, "Device stream ready");
    Ok(())
}
