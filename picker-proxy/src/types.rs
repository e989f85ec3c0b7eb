//! Common types for the picker-proxy crate.

use picker_schema::CropTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PickerError;

/// Identifier of the capability module holding the picker implementation.
pub const PICKER_MODULE_ID: &str = "picker";

/// The four control operations a picker exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Open,
    Close,
    Cancel,
    Crop,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Cancel => "cancel",
            Self::Crop => "crop",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control operation together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerCall {
    Open,
    Close,
    Cancel,
    Crop(Vec<CropTarget>),
}

impl PickerCall {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Open => OperationKind::Open,
            Self::Close => OperationKind::Close,
            Self::Cancel => OperationKind::Cancel,
            Self::Crop(_) => OperationKind::Crop,
        }
    }
}

/// Acquisition state of a proxy.
///
/// `Ready` and `Failed` are terminal; there is no transition back to `Loading`.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(PickerError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// The acquisition error, if the load failed.
    pub fn error(&self) -> Option<&PickerError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
