//! Picker Proxy - Deferred File Picker
//!
//! Hands out a picker handle immediately while the real picker implementation
//! is fetched in the background:
//! - One acquisition per handle, started at construction
//! - Control calls queued in issue order until the picker is ready
//! - A failed load answers every call with the same error
//! - Pluggable capability loaders (registry, cache, mocks)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              PickerClient               │
//! │   (connection context + loader)         │
//! └────────────────┬────────────────────────┘
//!                  │ picker(options)
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │              PickerProxy                │
//! │   open / close / cancel / crop          │
//! └────────────────┬────────────────────────┘
//!                  │ command queue
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │                Driver                   │
//! │   Loading ─► Ready │ Failed             │
//! └──────┬─────────────────────────┬────────┘
//!        ▼                         ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ CapabilityLoader │     │ PickerInstance   │
//! │ (acquire once)   │     │ (real picker)    │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use picker_proxy::{picker, ConnectionContext, MockLoader, PickerClient};
//!
//! # async fn run() -> Result<(), picker_proxy::PickerError> {
//! let loader = Arc::new(MockLoader::default());
//! let client = PickerClient::new(
//!     ConnectionContext::new("key-123", "https://static.example.com/picker/v1"),
//!     loader,
//! );
//!
//! let proxy = picker(&client, None);
//! proxy.open().await?;
//! proxy.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod config;
pub mod context;
mod driver;
pub mod error;
pub mod journal;
pub mod proxy;
pub mod types;

// Re-export main types for convenience
pub use capability::{
    CachedLoader, CapabilityLoader, MockFactory, MockLoader, MockPicker, ModuleRegistry,
    PickerFactory, PickerInstance,
};
pub use config::{LoadingCancelPolicy, ProxyConfig};
pub use context::{ConnectionContext, PickerClient, Security, SessionUrls};
pub use error::{InstanceError, LoadError, PickerError};
pub use journal::{JournalEntry, JournalStats, OperationJournal, Outcome};
pub use proxy::{Operation, PickerProxy};
pub use types::*;

pub use picker_schema::{CropTarget, PickerOptions};

/// Build a picker for `client`.
///
/// Returns at once; the implementation is acquired in the background and
/// the handle's operations wait for it. `None` uses default options.
pub fn picker(client: &PickerClient, options: Option<PickerOptions>) -> PickerProxy {
    client.picker(options)
}
