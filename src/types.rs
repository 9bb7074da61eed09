//! Core types for the configuration-delivery exchange
//!
//! Payload types use camelCase JSON serialization to match what the
//! settings surface returns.

use crate::error::{CompanionError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Configuration returned by the settings surface
///
/// Trusted as-is: missing fields fall back to empty values and no range
/// checks are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Reminder text shown on the watch
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message_text: String,

    /// Delay or time of day for the reminder
    #[serde(default)]
    pub time: Option<TimeValue>,
}

impl Configuration {
    pub fn new(message_text: impl Into<String>, time: Option<TimeValue>) -> Self {
        Self {
            message_text: message_text.into(),
            time,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A time-like value as entered in the settings form
///
/// Every JSON number is accepted and kept as sent: integers that fit `i64`,
/// larger unsigned integers, and everything else as `f64`. Strings such as
/// `"08:30"` are kept as text. Whether a value fits the device dictionary
/// is decided by the codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl From<i64> for TimeValue {
    fn from(value: i64) -> Self {
        TimeValue::Integer(value)
    }
}

impl From<u64> for TimeValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => TimeValue::Integer(v),
            Err(_) => TimeValue::Unsigned(value),
        }
    }
}

impl From<f64> for TimeValue {
    fn from(value: f64) -> Self {
        TimeValue::Float(value)
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        TimeValue::Text(value.to_string())
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeValue::Integer(v) => write!(f, "{}", v),
            TimeValue::Unsigned(v) => write!(f, "{}", v),
            TimeValue::Float(v) => write!(f, "{}", v),
            TimeValue::Text(s) => f.write_str(s),
        }
    }
}

/// The message sent to the device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMessage {
    pub text: String,
    pub time: Option<TimeValue>,
}

impl From<Configuration> for DeviceMessage {
    fn from(config: Configuration) -> Self {
        Self {
            text: config.message_text,
            time: config.time,
        }
    }
}

/// Transport-assigned identifier correlating a send with its outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a unique transaction id (txn-<uuid>)
    pub fn generate() -> Self {
        Self(format!("txn-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for TransactionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a single send, produced by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Device acknowledged the message
    Delivered { transaction_id: TransactionId },
    /// Transport gave up on the message
    Failed {
        transaction_id: TransactionId,
        error_message: String,
    },
}

impl DeliveryOutcome {
    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            DeliveryOutcome::Delivered { transaction_id } => transaction_id,
            DeliveryOutcome::Failed { transaction_id, .. } => transaction_id,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    /// Convert into a `Result`, mapping failure to `CompanionError::Delivery`
    pub fn into_result(self) -> Result<TransactionId> {
        match self {
            DeliveryOutcome::Delivered { transaction_id } => Ok(transaction_id),
            DeliveryOutcome::Failed {
                transaction_id,
                error_message,
            } => Err(CompanionError::Delivery {
                transaction_id: transaction_id.to_string(),
                message: error_message,
            }),
        }
    }
}

/// Observable state of a single send
///
/// `Pending → {Delivered | Failed}`; both end states are terminal.
/// `Unresolved` means the transport released the transaction without
/// ever reporting an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Pending,
    Delivered,
    Failed,
    Unresolved,
}

impl DeliveryState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeliveryState::Pending)
    }
}

impl From<&DeliveryOutcome> for DeliveryState {
    fn from(outcome: &DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Delivered { .. } => DeliveryState::Delivered,
            DeliveryOutcome::Failed { .. } => DeliveryState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_camel_case() {
        let config: Configuration =
            serde_json::from_str(r#"{"messageText":"Buy milk","time":1700000000}"#).unwrap();
        assert_eq!(config.message_text, "Buy milk");
        assert_eq!(config.time, Some(TimeValue::Integer(1_700_000_000)));
    }

    #[test]
    fn test_configuration_missing_fields_default() {
        let config: Configuration = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Configuration::default());

        let config: Configuration =
            serde_json::from_str(r#"{"messageText":null,"time":null}"#).unwrap();
        assert_eq!(config.message_text, "");
        assert!(config.time.is_none());
    }

    #[test]
    fn test_time_value_text() {
        let config: Configuration =
            serde_json::from_str(r#"{"messageText":"Pills","time":"08:30"}"#).unwrap();
        assert_eq!(config.time, Some(TimeValue::Text("08:30".to_string())));
    }

    #[test]
    fn test_time_value_keeps_any_number() {
        let time = |json: &str| serde_json::from_str::<Configuration>(json).unwrap().time;

        assert_eq!(
            time(r#"{"time":1700000000.5}"#),
            Some(TimeValue::Float(1_700_000_000.5))
        );
        assert_eq!(time(r#"{"time":1.7e9}"#), Some(TimeValue::Float(1.7e9)));
        assert_eq!(
            time(r#"{"time":9223372036854775808}"#),
            Some(TimeValue::Unsigned(9_223_372_036_854_775_808))
        );
        assert_eq!(time(r#"{"time":-5}"#), Some(TimeValue::Integer(-5)));
    }

    #[test]
    fn test_time_value_rejects_objects() {
        assert!(serde_json::from_str::<Configuration>(r#"{"time":{}}"#).is_err());
        assert!(serde_json::from_str::<Configuration>(r#"{"time":[1]}"#).is_err());
        assert!(serde_json::from_str::<Configuration>(r#"{"messageText":5}"#).is_err());
    }

    #[test]
    fn test_time_value_from_u64() {
        assert_eq!(TimeValue::from(42u64), TimeValue::Integer(42));
        assert_eq!(TimeValue::from(u64::MAX), TimeValue::Unsigned(u64::MAX));
        assert_eq!(TimeValue::from(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_device_message_projection() {
        let msg =
            DeviceMessage::from(Configuration::new("Buy milk", Some(TimeValue::Integer(42))));
        assert_eq!(msg.text, "Buy milk");
        assert_eq!(msg.time, Some(TimeValue::Integer(42)));

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"text": "Buy milk", "time": 42}));
    }

    #[test]
    fn test_device_message_keeps_null_time() {
        let msg = DeviceMessage::from(Configuration::default());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"text": "", "time": null}));
    }

    #[test]
    fn test_transaction_id_display() {
        assert_eq!(TransactionId::from(42u64).to_string(), "42");
        assert!(TransactionId::generate().as_str().starts_with("txn-"));
    }

    #[test]
    fn test_outcome_into_result() {
        let ok = DeliveryOutcome::Delivered {
            transaction_id: "7".into(),
        };
        assert_eq!(ok.clone().into_result().unwrap(), TransactionId::from(7u64));
        assert_eq!(DeliveryState::from(&ok), DeliveryState::Delivered);

        let failed = DeliveryOutcome::Failed {
            transaction_id: "8".into(),
            error_message: "timeout".to_string(),
        };
        assert!(!failed.is_delivered());
        assert_eq!(failed.transaction_id().as_str(), "8");
        assert!(matches!(
            failed.into_result(),
            Err(CompanionError::Delivery { .. })
        ));
    }

    #[test]
    fn test_delivery_state_terminal() {
        assert!(!DeliveryState::Pending.is_terminal());
        assert!(DeliveryState::Delivered.is_terminal());
        assert!(DeliveryState::Failed.is_terminal());
        assert!(DeliveryState::Unresolved.is_terminal());
    }
}
