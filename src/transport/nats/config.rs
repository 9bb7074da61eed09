//! NATS device transport configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and subject settings for the NATS device link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NatsTransportConfig {
    /// NATS server URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Subject prefix; messages go to `<subject_prefix>.<device_id>`
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Target device identifier
    #[serde(default = "default_device_id")]
    pub device_id: String,

    /// JetStream stream capturing device messages
    #[serde(default = "default_stream_name")]
    pub stream_name: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Request timeout, also the limit on waiting for a publish ack
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional auth token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_subject_prefix() -> String {
    "forgetmenot.device".to_string()
}

fn default_device_id() -> String {
    "default".to_string()
}

fn default_stream_name() -> String {
    "FORGETMENOT_DEVICE".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for NatsTransportConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            subject_prefix: default_subject_prefix(),
            device_id: default_device_id(),
            stream_name: default_stream_name(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            token: None,
        }
    }
}

impl NatsTransportConfig {
    /// Subject the configured device listens on
    pub fn device_subject(&self) -> String {
        format!("{}.{}", self.subject_prefix, self.device_id)
    }

    /// How long a publish ack is awaited before the send fails
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Subjects captured by the stream (all devices under the prefix)
    pub fn stream_subjects(&self) -> Vec<String> {
        vec![format!("{}.>", self.subject_prefix)]
    }
}
