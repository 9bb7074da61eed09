//! Settings-surface payload decoding
//!
//! The settings page hands back its result as a URL-encoded JSON string.
//! Decoding never panics: every malformed input becomes a `ParseError`.

use crate::error::ParseError;
use crate::types::Configuration;

/// Response the host reports when the user closes the settings page
/// without saving.
pub const CANCELLED_RESPONSE: &str = "CANCELLED";

/// URL-decode and parse a settings-surface payload
pub fn decode_configuration(raw: &str) -> std::result::Result<Configuration, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == CANCELLED_RESPONSE {
        return Err(ParseError::Cancelled);
    }

    let decoded =
        urlencoding::decode(trimmed).map_err(|e| ParseError::Encoding(e.to_string()))?;
    let config = serde_json::from_str(&decoded)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeValue;

    fn encode(json: &str) -> String {
        urlencoding::encode(json).into_owned()
    }

    #[test]
    fn test_decode_valid_payload() {
        let raw = encode(r#"{"messageText":"Buy milk","time":1700000000}"#);
        let config = decode_configuration(&raw).unwrap();
        assert_eq!(config.message_text, "Buy milk");
        assert_eq!(config.time, Some(TimeValue::Integer(1_700_000_000)));
    }

    #[test]
    fn test_decode_unencoded_json() {
        // Already-plain JSON passes through percent-decoding untouched
        let config = decode_configuration(r#"{"messageText":"Stretch"}"#).unwrap();
        assert_eq!(config.message_text, "Stretch");
        assert!(config.time.is_none());
    }

    #[test]
    fn test_decode_preserves_plus_sign() {
        let raw = encode(r#"{"messageText":"1+1","time":"08:30"}"#);
        let config = decode_configuration(&raw).unwrap();
        assert_eq!(config.message_text, "1+1");
    }

    #[test]
    fn test_decode_unicode_text() {
        let raw = encode(r#"{"messageText":"Gyógyszer ⏰","time":5}"#);
        let config = decode_configuration(&raw).unwrap();
        assert_eq!(config.message_text, "Gyógyszer ⏰");
    }

    #[test]
    fn test_decode_truncated_payload() {
        let raw = encode(r#"{"messageText":"Buy mi"#);
        assert!(matches!(
            decode_configuration(&raw),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_non_object() {
        assert!(matches!(
            decode_configuration("%5B1%2C2%5D"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(matches!(
            decode_configuration("%FF%FE"),
            Err(ParseError::Encoding(_))
        ));
    }

    #[test]
    fn test_decode_cancelled() {
        assert!(matches!(decode_configuration(""), Err(ParseError::Cancelled)));
        assert!(matches!(
            decode_configuration("CANCELLED"),
            Err(ParseError::Cancelled)
        ));
    }
}
