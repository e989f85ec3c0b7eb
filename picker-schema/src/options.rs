//! Picker configuration options.
//!
//! A flat record of optional settings. Unset fields stay `None` and are left
//! for the picker implementation to default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::callbacks::PickerCallbacks;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// How the picker is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    /// Modal overlay on top of the page
    Overlay,
    /// Rendered inside a host container
    Inline,
    /// Compact drop target only
    DropPane,
}

/// Layout of the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    List,
    Grid,
}

/// Where uploaded files are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct StoreOptions {
    /// Storage provider (e.g. "s3", "gcs")
    pub location: Option<String>,
    /// Provider region
    pub region: Option<String>,
    /// Key prefix inside the container
    pub path: Option<String>,
    /// Bucket or container name
    pub container: Option<String>,
    /// "public" or "private"
    pub access: Option<String>,
}

/// Pixel dimensions used by image resize limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Crop tool settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CropOptions {
    /// Fixed aspect ratio (width / height)
    pub aspect_ratio: Option<f64>,
    /// Require cropping before upload
    pub force: bool,
}

/// Image transformations offered to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TransformOptions {
    pub crop: Option<CropOptions>,
    pub circle: Option<bool>,
    pub rotate: Option<bool>,
}

/// Options for a picker instance.
///
/// Passed through unmodified to the loaded picker implementation. The
/// `callbacks` field is runtime-only and never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PickerOptions {
    // ========== Sources & Selection ==========
    /// Source identifiers the user may pick from
    pub from_sources: Option<Vec<String>>,
    /// Accepted MIME types or file extensions
    pub accept: Option<Vec<String>>,
    /// Maximum number of files
    pub max_files: Option<u32>,
    /// Minimum number of files
    pub min_files: Option<u32>,
    /// Maximum file size in bytes
    pub max_size: Option<u64>,

    // ========== Presentation ==========
    pub display_mode: Option<DisplayMode>,
    /// Host element id for inline and drop-pane modes
    pub container: Option<String>,
    pub view_type: Option<ViewType>,
    /// Locale code (e.g. "en", "de")
    pub lang: Option<String>,
    /// Overrides for interface strings
    pub custom_text: Option<HashMap<String, String>>,

    // ========== Upload ==========
    /// Parallel chunk uploads per file
    pub concurrency: Option<u32>,
    /// Parallel file uploads
    pub max_concurrent_uploads: Option<u32>,
    pub store_to: Option<StoreOptions>,
    pub upload_in_background: Option<bool>,
    pub start_upload_when_max_files_reached: Option<bool>,
    pub hide_modal_when_uploading: Option<bool>,
    pub allow_manual_retry: Option<bool>,
    /// How long error notices stay visible
    pub errors_timeout_ms: Option<u64>,

    // ========== Images ==========
    pub image_max: Option<ImageDimensions>,
    pub image_min: Option<ImageDimensions>,
    pub image_dim: Option<ImageDimensions>,
    pub transformations: Option<TransformOptions>,
    pub disable_transformer: Option<bool>,

    // ========== Hooks ==========
    #[serde(skip)]
    #[cfg_attr(feature = "typescript", ts(skip))]
    pub callbacks: PickerCallbacks,
}

impl PickerOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the available sources.
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict accepted file types.
    pub fn with_accept<I, S>(mut self, accept: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept = Some(accept.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_files(mut self, min: u32) -> Self {
        self.min_files = Some(min);
        self
    }

    pub fn with_max_files(mut self, max: u32) -> Self {
        self.max_files = Some(max);
        self
    }

    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = Some(mode);
        self
    }

    /// Render into the given host container.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_store_to(mut self, store: StoreOptions) -> Self {
        self.store_to = Some(store);
        self
    }

    pub fn with_transformations(mut self, transformations: TransformOptions) -> Self {
        self.transformations = Some(transformations);
        self
    }

    /// Attach lifecycle and upload hooks.
    pub fn with_callbacks(mut self, callbacks: PickerCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}
