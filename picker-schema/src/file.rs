//! File metadata reported by the picker, and crop inputs sent to it.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Crop rectangle applied to an image before upload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CropData {
    /// Left, top
    pub position: [f64; 2],
    /// Width, height
    pub dimensions: [f64; 2],
}

/// Rotation applied to an image before upload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RotateData {
    pub value: i32,
}

/// Metadata for a file handled by the picker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PickerFileMetadata {
    pub filename: String,
    /// Storage handle, set once uploaded
    pub handle: Option<String>,
    pub mimetype: Option<String>,
    /// Path or URL the file was picked from
    pub original_path: Option<String>,
    /// Size in bytes
    pub size: u64,
    /// Source identifier (e.g. "local_file_system")
    pub source: Option<String>,
    pub url: Option<String>,
    pub upload_id: Option<String>,
    /// Object key in the storage container
    pub key: Option<String>,
    pub container: Option<String>,
    /// "Stored" or "InTransit"
    pub status: Option<String>,
    /// Alternative text for images
    pub alt: Option<String>,
    pub cropped: Option<CropData>,
    pub rotated: Option<RotateData>,
}

impl PickerFileMetadata {
    /// Metadata with only a filename.
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }
}

/// Result of an upload session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PickerResponse {
    pub files_uploaded: Vec<PickerFileMetadata>,
    pub files_failed: Vec<PickerFileMetadata>,
}

impl PickerResponse {
    /// Whether every file was uploaded.
    pub fn is_complete(&self) -> bool {
        self.files_failed.is_empty()
    }
}

/// Progress of a single file upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub total_percent: f64,
    pub total_bytes: u64,
}

/// In-memory file handed to the crop tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            data,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A file or URL to open in the crop tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropTarget {
    Url(String),
    File(LocalFile),
}

impl CropTarget {
    /// Display name: the URL itself or the file name.
    pub fn name(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::File(file) => &file.name,
        }
    }
}

impl From<&str> for CropTarget {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for CropTarget {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<LocalFile> for CropTarget {
    fn from(file: LocalFile) -> Self {
        Self::File(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_target_conversions() {
        let targets: Vec<CropTarget> = vec![
            "https://cdn.example.com/a.png".into(),
            LocalFile::new("b.jpg", vec![0xff, 0xd8])
                .with_mime_type("image/jpeg")
                .into(),
        ];

        assert_eq!(targets[0].name(), "https://cdn.example.com/a.png");
        assert_eq!(targets[1].name(), "b.jpg");
        assert!(matches!(&targets[1], CropTarget::File(f) if f.mime_type.as_deref() == Some("image/jpeg")));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "filesUploaded": [{ "filename": "a.png", "size": 120, "handle": "h1" }],
            "filesFailed": []
        }"#;

        let response: PickerResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_complete());
        assert_eq!(response.files_uploaded[0].handle.as_deref(), Some("h1"));
        assert_eq!(response.files_uploaded[0].size, 120);
    }
}
