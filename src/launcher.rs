//! Settings surface launcher
//!
//! The settings form is an external web page. A `SettingsLauncher` asks the
//! host to show it; whether the page actually loads is only visible to the
//! user.

use crate::error::{CompanionError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use url::Url;

/// Directs the user to the settings surface
#[async_trait]
pub trait SettingsLauncher: Send + Sync {
    /// Ask the host to open `url` in its webview
    async fn open(&self, url: &Url) -> Result<()>;
}

/// Launcher that records opened URLs, for tests and headless hosts
#[derive(Clone, Default)]
pub struct MemoryLauncher {
    opened: Arc<Mutex<Vec<Url>>>,
}

impl MemoryLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs opened so far, oldest first
    pub fn opened(&self) -> Result<Vec<Url>> {
        let opened = self
            .opened
            .lock()
            .map_err(|e| CompanionError::Provider(format!("Launcher lock poisoned: {}", e)))?;
        Ok(opened.clone())
    }
}

#[async_trait]
impl SettingsLauncher for MemoryLauncher {
    async fn open(&self, url: &Url) -> Result<()> {
        self.opened
            .lock()
            .map_err(|e| CompanionError::Provider(format!("Launcher lock poisoned: {}", e)))?
            .push(url.clone());
        Ok(())
    }
}
