//! # forgetmenot-companion
//!
//! Companion-side configuration delivery for the ForgetMeNot reminder watch app.
//!
//! ## Overview
//!
//! The user edits a reminder message and a time value on an external settings
//! page. The companion decodes the page's result, turns it into a device
//! message and submits it over an asynchronous transport, logging the
//! delivery outcome by transaction id.
//!
//! ## Quick Start
//!
//! ```rust
//! use forgetmenot_companion::{CompanionConfig, HostEvent, LifecycleController};
//! use forgetmenot_companion::launcher::MemoryLauncher;
//! use forgetmenot_companion::transport::memory::MemoryTransport;
//!
//! # async fn example() -> forgetmenot_companion::Result<()> {
//! let mut companion = LifecycleController::from_config(
//!     &CompanionConfig::default(),
//!     MemoryLauncher::new(),
//!     MemoryTransport::auto_deliver(),
//! )?;
//!
//! companion.handle(HostEvent::Ready).await;
//! companion.handle(HostEvent::RequestConfiguration).await;
//!
//! let payload = "%7B%22messageText%22%3A%22Buy%20milk%22%2C%22time%22%3A1700000000%7D";
//! if let Some(delivery) = companion
//!     .handle(HostEvent::ConfigurationResult(payload.to_string()))
//!     .await
//! {
//!     println!("Outcome: {:?}", delivery.outcome().await);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! - **memory** - in-memory transport for testing and single-process hosts
//! - **nats** - NATS JetStream link carrying the encoded message dictionary
//!
//! ## Architecture
//!
//! - **LifecycleController** - typed host event surface (`ready`, request, result)
//! - **ConfigurationHandler** - opens the settings page, decodes its result
//! - **MessageDispatcher** - submits device messages and tracks their outcome
//! - **DeviceTransport** trait - core abstraction all backends implement

pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod launcher;
pub mod lifecycle;
pub mod payload;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export core types
pub use config::CompanionConfig;
pub use dispatcher::{Delivery, MessageDispatcher};
pub use error::{CompanionError, ParseError, Result};
pub use handler::ConfigurationHandler;
pub use launcher::{MemoryLauncher, SettingsLauncher};
pub use lifecycle::{HostEvent, LifecycleController};
pub use transport::{DeliveryResolver, DeviceTransport, Submission};
pub use types::{
    Configuration, DeliveryOutcome, DeliveryState, DeviceMessage, TimeValue, TransactionId,
};

// Re-export transports for convenience
pub use transport::memory::{DeliveryMode, MemoryConfig, MemoryTransport};
pub use transport::nats::{NatsTransport, NatsTransportConfig};
