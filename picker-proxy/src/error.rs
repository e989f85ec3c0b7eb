//! Error types for picker loading and forwarded operations.

use std::sync::Arc;

use crate::types::OperationKind;

/// Failure while acquiring the picker implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// No module registered under this id
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Module registered but switched off
    #[error("Module disabled: {0}")]
    ModuleDisabled(String),

    /// Endpoint reference cannot be used
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Module code could not be fetched
    #[error("Network error: {0}")]
    Network(String),

    /// Module fetched but its factory failed
    #[error("Initialization failed: {0}")]
    Initialization(String),
}

/// Failure reported by a loaded picker instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    /// Instance cannot serve the call right now
    #[error("Picker unavailable: {0}")]
    Unavailable(String),

    /// Caller-supplied hook refused the request
    #[error("Rejected: {reason}")]
    Rejected { reason: String },

    /// Operation failed inside the instance
    #[error("Operation failed: {0}")]
    Failed(String),
}

/// Error returned by the proxy's control operations.
///
/// Cloneable so a single acquisition failure can be handed to every caller.
/// The `Acquisition` variant shares one `Arc` across all of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PickerError {
    /// The one acquisition attempt failed
    #[error("Picker failed to load: {0}")]
    Acquisition(#[source] Arc<LoadError>),

    /// The instance was reached but the operation failed
    #[error("Picker {op} failed: {source}")]
    Operation {
        op: OperationKind,
        #[source]
        source: InstanceError,
    },

    /// Loading was aborted by a cancel issued while loading
    #[error("Picker load aborted by cancel")]
    Aborted,

    /// The proxy was built outside a tokio runtime
    #[error("No tokio runtime available to load the picker")]
    NoRuntime,

    /// The driver task ended before answering
    #[error("Picker driver stopped")]
    DriverStopped,
}

impl PickerError {
    /// The underlying load error, if this is an acquisition failure.
    pub fn load_error(&self) -> Option<&Arc<LoadError>> {
        match self {
            Self::Acquisition(err) => Some(err),
            _ => None,
        }
    }

    /// The instance error, if a forwarded operation failed.
    pub fn instance_error(&self) -> Option<&InstanceError> {
        match self {
            Self::Operation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LoadError> for PickerError {
    fn from(err: LoadError) -> Self {
        Self::Acquisition(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_acquisition_error_is_shared() {
        let err = PickerError::from(LoadError::Network("network down".to_string()));
        let copy = err.clone();

        let (a, b) = (err.load_error().unwrap(), copy.load_error().unwrap());
        assert!(Arc::ptr_eq(a, b));
        assert!(copy.to_string().contains("network down"));
        assert!(copy.source().unwrap().to_string().contains("network down"));
    }

    #[test]
    fn test_operation_error_message() {
        let err = PickerError::Operation {
            op: OperationKind::Crop,
            source: InstanceError::Rejected {
                reason: "too large".to_string(),
            },
        };

        assert_eq!(err.to_string(), "Picker crop failed: Rejected: too large");
        assert!(err.load_error().is_none());
    }
}
