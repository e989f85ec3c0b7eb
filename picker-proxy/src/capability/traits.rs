//! Core traits at the capability boundary.
//!
//! `CapabilityLoader` resolves a factory, `PickerFactory` builds the real
//! picker, and `PickerInstance` is what the proxy forwards calls to.

use async_trait::async_trait;
use picker_schema::{CropTarget, PickerOptions};
use std::sync::Arc;

use crate::context::ConnectionContext;
use crate::error::{InstanceError, LoadError};

/// Resolves a module id against an endpoint into a picker factory.
///
/// Whether a call is a cold load or a cache hit is up to the implementation;
/// callers must not be able to tell the difference.
#[async_trait]
pub trait CapabilityLoader: Send + Sync {
    /// Fetch the factory for `module_id` from `endpoint`.
    async fn acquire(
        &self,
        endpoint: &str,
        module_id: &str,
    ) -> Result<Arc<dyn PickerFactory>, LoadError>;
}

/// Builds picker instances from a connection context and options.
pub trait PickerFactory: Send + Sync {
    /// Construct a picker. `options` must be used as given.
    fn create(
        &self,
        context: &ConnectionContext,
        options: PickerOptions,
    ) -> Result<Arc<dyn PickerInstance>, LoadError>;
}

/// A fully loaded picker.
///
/// `open`, `close` and `cancel` must be idempotent: repeating them leaves the
/// same end state as calling them once.
#[async_trait]
pub trait PickerInstance: Send + Sync {
    /// Show the picker.
    async fn open(&self) -> Result<(), InstanceError>;

    /// Hide the picker and release its resources.
    async fn close(&self) -> Result<(), InstanceError>;

    /// Abort the current selection or upload.
    async fn cancel(&self) -> Result<(), InstanceError>;

    /// Open the crop tool for the given files or URLs.
    async fn crop(&self, files: Vec<CropTarget>) -> Result<(), InstanceError>;
}
