//! Picker Schema - passive data types for the deferred file picker
//!
//! Everything in this crate is plain data handed verbatim to a remotely loaded
//! picker implementation:
//!
//! - **Options**: display, source, limit, storage and transform settings
//! - **Callbacks**: lifecycle and upload hooks the picker may invoke
//! - **Files**: uploaded-file metadata, upload responses and crop targets
//!
//! Nothing here validates or defaults a value. Interpreting options is the
//! loaded implementation's job.
//!
//! # Example
//!
//! ```
//! use picker_schema::{DisplayMode, PickerOptions};
//!
//! let options = PickerOptions::new()
//!     .with_min_files(2)
//!     .with_max_files(5)
//!     .with_display_mode(DisplayMode::Inline);
//!
//! assert_eq!(options.max_files, Some(5));
//! ```

pub mod callbacks;
pub mod file;
pub mod options;

// Re-export main types
pub use callbacks::{PickerCallbacks, SelectionVerdict};
pub use file::{
    CropData, CropTarget, LocalFile, PickerFileMetadata, PickerResponse, RotateData,
    UploadProgress,
};
pub use options::{
    CropOptions, DisplayMode, ImageDimensions, PickerOptions, StoreOptions, TransformOptions,
    ViewType,
};
