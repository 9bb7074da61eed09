//! Configuration handler: settings surface in, device message out

use crate::dispatcher::{Delivery, MessageDispatcher};
use crate::error::{CompanionError, Result};
use crate::launcher::SettingsLauncher;
use crate::payload;
use std::sync::Arc;
use url::Url;

/// Reacts to the two configuration events raised by the host
pub struct ConfigurationHandler {
    settings_url: Url,
    launcher: Arc<dyn SettingsLauncher>,
    dispatcher: MessageDispatcher,
}

impl ConfigurationHandler {
    pub fn new(
        settings_url: Url,
        launcher: impl SettingsLauncher + 'static,
        dispatcher: MessageDispatcher,
    ) -> Self {
        Self {
            settings_url,
            launcher: Arc::new(launcher),
            dispatcher,
        }
    }

    pub fn settings_url(&self) -> &Url {
        &self.settings_url
    }

    /// Direct the user to the settings surface
    ///
    /// A launcher error is logged and dropped.
    pub async fn on_request_configuration(&self) {
        tracing::info!(url = %self.settings_url, "Opening settings surface");

        if let Err(e) = self.launcher.open(&self.settings_url).await {
            tracing::warn!(
                url = %self.settings_url,
                error = %e,
                "Failed to open settings surface"
            );
        }
    }

    /// Decode the settings surface result and send it to the device
    ///
    /// A malformed payload is logged once and aborts the exchange without
    /// sending anything.
    pub async fn on_configuration_result(&self, raw: &str) -> Result<Delivery> {
        let config = match payload::decode_configuration(raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "ParseError: configuration payload rejected");
                return Err(CompanionError::Parse(e));
            }
        };

        tracing::info!(
            message_text = %config.message_text,
            time = ?config.time,
            "Configuration window returned"
        );

        Ok(self.dispatcher.send(config).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::launcher::MemoryLauncher;
    use crate::transport::memory::MemoryTransport;
    use crate::types::TimeValue;
    use async_trait::async_trait;

    fn settings_url() -> Url {
        Url::parse("http://szilardhuber.github.io/pebble-forgetmenot/").unwrap()
    }

    fn handler(transport: &MemoryTransport, launcher: &MemoryLauncher) -> ConfigurationHandler {
        ConfigurationHandler::new(
            settings_url(),
            launcher.clone(),
            MessageDispatcher::new(transport.clone()),
        )
    }

    #[tokio::test]
    async fn test_request_configuration_opens_url() {
        let transport = MemoryTransport::default();
        let launcher = MemoryLauncher::new();
        let handler = handler(&transport, &launcher);

        handler.on_request_configuration().await;
        handler.on_request_configuration().await;

        assert_eq!(launcher.opened().unwrap(), vec![settings_url(), settings_url()]);
        assert_eq!(transport.submit_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_result_sends_one_message() {
        let transport = MemoryTransport::auto_deliver();
        let launcher = MemoryLauncher::new();
        let handler = handler(&transport, &launcher);

        let raw = urlencoding::encode(r#"{"messageText":"Pills","time":"21:00"}"#);
        let delivery = handler.on_configuration_result(&raw).await.unwrap();

        let submitted = transport.submitted().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].message.text, "Pills");
        assert_eq!(submitted[0].message.time, Some(TimeValue::Text("21:00".to_string())));
        assert_eq!(delivery.transaction_id(), &submitted[0].transaction_id);
    }

    #[tokio::test]
    async fn test_malformed_result_sends_nothing() {
        let transport = MemoryTransport::auto_deliver();
        let launcher = MemoryLauncher::new();
        let handler = handler(&transport, &launcher);

        let err = handler
            .on_configuration_result("%7B%22messageText")
            .await
            .unwrap_err();
        assert!(matches!(err, CompanionError::Parse(ParseError::Malformed(_))));

        let err = handler.on_configuration_result("CANCELLED").await.unwrap_err();
        assert!(matches!(err, CompanionError::Parse(ParseError::Cancelled)));

        assert_eq!(transport.submit_count().unwrap(), 0);
    }

    struct BrokenLauncher;

    #[async_trait]
    impl SettingsLauncher for BrokenLauncher {
        async fn open(&self, _url: &Url) -> Result<()> {
            Err(CompanionError::Provider("webview unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_launcher_failure_is_contained() {
        let transport = MemoryTransport::default();
        let handler = ConfigurationHandler::new(
            settings_url(),
            BrokenLauncher,
            MessageDispatcher::new(transport.clone()),
        );

        handler.on_request_configuration().await;
        assert_eq!(transport.submit_count().unwrap(), 0);
    }
}
