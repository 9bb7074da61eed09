//! Lifecycle controller: the typed host event surface
//!
//! The host raises `Ready` once per process start, after which the
//! configuration handler is registered and configuration events are routed
//! to it. Events are handled one at a time; no two handlers run concurrently.

use crate::config::CompanionConfig;
use crate::dispatcher::{Delivery, MessageDispatcher};
use crate::error::Result;
use crate::handler::ConfigurationHandler;
use crate::launcher::SettingsLauncher;
use crate::transport::DeviceTransport;
use tokio::sync::mpsc;

/// Events raised by the host platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Host finished starting the companion
    Ready,
    /// User asked to configure the app
    RequestConfiguration,
    /// Settings surface closed, carrying its URL-encoded result
    ConfigurationResult(String),
}

/// Owns the configuration handler and routes host events to it
pub struct LifecycleController {
    handler: ConfigurationHandler,
    registered: bool,
}

impl LifecycleController {
    pub fn new(handler: ConfigurationHandler) -> Self {
        Self {
            handler,
            registered: false,
        }
    }

    /// Build a controller from crate configuration
    ///
    /// The transport is supplied by the host; `MemoryConfig::from` and
    /// `NatsTransport::from_companion_config` build one from the same config.
    pub fn from_config(
        config: &CompanionConfig,
        launcher: impl SettingsLauncher + 'static,
        transport: impl DeviceTransport + 'static,
    ) -> Result<Self> {
        let handler = ConfigurationHandler::new(
            config.settings_url()?,
            launcher,
            MessageDispatcher::new(transport),
        );
        Ok(Self::new(handler))
    }

    pub fn is_ready(&self) -> bool {
        self.registered
    }

    pub fn handler(&self) -> &ConfigurationHandler {
        &self.handler
    }

    /// Register the configuration handler
    ///
    /// A duplicate `ready` logs a warning and is ignored.
    pub fn on_ready(&mut self) {
        if self.registered {
            tracing::warn!("Duplicate ready event ignored; handler already registered");
            return;
        }
        self.registered = true;
        tracing::info!(url = %self.handler.settings_url(), "Companion ready");
    }

    pub async fn on_request_configuration(&self) {
        if !self.registered {
            tracing::debug!("Configuration request before ready; no handler registered");
            return;
        }
        self.handler.on_request_configuration().await;
    }

    /// Route a settings result to the handler
    ///
    /// Returns the delivery handle when a message was submitted.
    pub async fn on_configuration_result(&self, raw: &str) -> Option<Delivery> {
        if !self.registered {
            tracing::debug!("Configuration result before ready; no handler registered");
            return None;
        }
        // Parse errors are already logged by the handler
        self.handler.on_configuration_result(raw).await.ok()
    }

    /// Dispatch a single host event
    pub async fn handle(&mut self, event: HostEvent) -> Option<Delivery> {
        match event {
            HostEvent::Ready => {
                self.on_ready();
                None
            }
            HostEvent::RequestConfiguration => {
                self.on_request_configuration().await;
                None
            }
            HostEvent::ConfigurationResult(raw) => self.on_configuration_result(&raw).await,
        }
    }

    /// Process host events until the channel closes
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::info!("Host event channel closed");
    }
}
