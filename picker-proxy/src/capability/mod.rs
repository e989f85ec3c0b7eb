//! Capability loading seam.
//!
//! The picker implementation is not linked in; it is resolved at runtime by a
//! [`CapabilityLoader`] from an endpoint reference and a module id. This
//! module defines that seam plus a few loaders:
//! - In-process registry of factories
//! - Caching decorator sharing one factory per endpoint and module
//! - Mock collaborators for testing

pub mod cache;
pub mod mock;
pub mod registry;
pub mod traits;

pub use cache::CachedLoader;
pub use mock::{MockFactory, MockLoader, MockPicker};
pub use registry::ModuleRegistry;
pub use traits::{CapabilityLoader, PickerFactory, PickerInstance};
