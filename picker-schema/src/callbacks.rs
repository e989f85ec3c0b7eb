//! Lifecycle and upload hooks carried inside [`PickerOptions`](crate::PickerOptions).
//!
//! Hooks are invoked by the loaded picker implementation, never by the proxy
//! that hands the options over.

use std::fmt;
use std::sync::Arc;

use crate::file::{PickerFileMetadata, PickerResponse, UploadProgress};

/// Outcome of the file-selection hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionVerdict {
    /// Keep the file in the selection
    Accept,
    /// Drop the file and show the reason to the user
    Reject { reason: String },
}

impl SelectionVerdict {
    /// Reject with a user-facing reason.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

pub type LifecycleHook = Arc<dyn Fn() + Send + Sync>;
pub type SelectionHook = Arc<dyn Fn(&PickerFileMetadata) -> SelectionVerdict + Send + Sync>;
pub type FileHook = Arc<dyn Fn(&PickerFileMetadata) + Send + Sync>;
pub type ProgressHook = Arc<dyn Fn(&PickerFileMetadata, &UploadProgress) + Send + Sync>;
pub type FailureHook = Arc<dyn Fn(&PickerFileMetadata, &str) + Send + Sync>;
pub type FilesHook = Arc<dyn Fn(&[PickerFileMetadata]) + Send + Sync>;
pub type ResponseHook = Arc<dyn Fn(&PickerResponse) + Send + Sync>;

/// Optional hooks for picker lifecycle and upload events.
#[derive(Clone, Default)]
pub struct PickerCallbacks {
    pub on_open: Option<LifecycleHook>,
    pub on_close: Option<LifecycleHook>,
    pub on_cancel: Option<LifecycleHook>,
    /// Called for each selected file; may veto the selection
    pub on_file_selected: Option<SelectionHook>,
    pub on_file_upload_started: Option<FileHook>,
    pub on_file_upload_progress: Option<ProgressHook>,
    pub on_file_upload_finished: Option<FileHook>,
    pub on_file_upload_failed: Option<FailureHook>,
    pub on_upload_started: Option<FilesHook>,
    pub on_upload_done: Option<ResponseHook>,
}

impl PickerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_open(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(hook));
        self
    }

    pub fn on_cancel(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(hook));
        self
    }

    pub fn on_file_selected(
        mut self,
        hook: impl Fn(&PickerFileMetadata) -> SelectionVerdict + Send + Sync + 'static,
    ) -> Self {
        self.on_file_selected = Some(Arc::new(hook));
        self
    }

    pub fn on_file_upload_started(
        mut self,
        hook: impl Fn(&PickerFileMetadata) + Send + Sync + 'static,
    ) -> Self {
        self.on_file_upload_started = Some(Arc::new(hook));
        self
    }

    pub fn on_file_upload_progress(
        mut self,
        hook: impl Fn(&PickerFileMetadata, &UploadProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_file_upload_progress = Some(Arc::new(hook));
        self
    }

    pub fn on_file_upload_finished(
        mut self,
        hook: impl Fn(&PickerFileMetadata) + Send + Sync + 'static,
    ) -> Self {
        self.on_file_upload_finished = Some(Arc::new(hook));
        self
    }

    /// Called with the file and the failure message.
    pub fn on_file_upload_failed(
        mut self,
        hook: impl Fn(&PickerFileMetadata, &str) + Send + Sync + 'static,
    ) -> Self {
        self.on_file_upload_failed = Some(Arc::new(hook));
        self
    }

    pub fn on_upload_started(
        mut self,
        hook: impl Fn(&[PickerFileMetadata]) + Send + Sync + 'static,
    ) -> Self {
        self.on_upload_started = Some(Arc::new(hook));
        self
    }

    pub fn on_upload_done(mut self, hook: impl Fn(&PickerResponse) + Send + Sync + 'static) -> Self {
        self.on_upload_done = Some(Arc::new(hook));
        self
    }

    /// Run the selection hook, accepting when none is set.
    pub fn check_selection(&self, file: &PickerFileMetadata) -> SelectionVerdict {
        self.on_file_selected
            .as_ref()
            .map(|hook| hook(file))
            .unwrap_or(SelectionVerdict::Accept)
    }

    /// Names of the hooks that are set.
    pub fn registered(&self) -> Vec<&'static str> {
        [
            ("on_open", self.on_open.is_some()),
            ("on_close", self.on_close.is_some()),
            ("on_cancel", self.on_cancel.is_some()),
            ("on_file_selected", self.on_file_selected.is_some()),
            ("on_file_upload_started", self.on_file_upload_started.is_some()),
            ("on_file_upload_progress", self.on_file_upload_progress.is_some()),
            ("on_file_upload_finished", self.on_file_upload_finished.is_some()),
            ("on_file_upload_failed", self.on_file_upload_failed.is_some()),
            ("on_upload_started", self.on_upload_started.is_some()),
            ("on_upload_done", self.on_upload_done.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

impl fmt::Debug for PickerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerCallbacks")
            .field("registered", &self.registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_defaults_to_accept() {
        let callbacks = PickerCallbacks::new();
        let file = PickerFileMetadata::named("photo.png");

        assert!(callbacks.check_selection(&file).is_accepted());
    }

    #[test]
    fn test_selection_veto_is_a_value() {
        let callbacks = PickerCallbacks::new().on_file_selected(|file| {
            if file.filename.ends_with(".exe") {
                SelectionVerdict::reject("Executables are not allowed")
            } else {
                SelectionVerdict::Accept
            }
        });

        let verdict = callbacks.check_selection(&PickerFileMetadata::named("setup.exe"));
        assert_eq!(
            verdict,
            SelectionVerdict::Reject {
                reason: "Executables are not allowed".to_string()
            }
        );
        assert!(callbacks
            .check_selection(&PickerFileMetadata::named("notes.txt"))
            .is_accepted());
    }

    #[test]
    fn test_upload_hooks_are_settable() {
        let failures = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&failures);
        let callbacks = PickerCallbacks::new()
            .on_upload_started(|_files| {})
            .on_file_upload_started(|_file| {})
            .on_file_upload_finished(|_file| {})
            .on_file_upload_failed(move |file, message| {
                if let Ok(mut seen) = seen.lock() {
                    seen.push(format!("{}: {}", file.filename, message));
                }
            });

        assert_eq!(
            callbacks.registered(),
            vec![
                "on_file_upload_started",
                "on_file_upload_finished",
                "on_file_upload_failed",
                "on_upload_started",
            ]
        );

        if let Some(hook) = &callbacks.on_file_upload_failed {
            hook(&PickerFileMetadata::named("big.mov"), "too large");
        }
        assert_eq!(*failures.lock().unwrap(), vec!["big.mov: too large".to_string()]);
    }

    #[test]
    fn test_debug_lists_registered_hooks() {
        let callbacks = PickerCallbacks::new().on_open(|| {}).on_cancel(|| {});

        assert_eq!(callbacks.registered(), vec!["on_open", "on_cancel"]);
        assert!(format!("{:?}", callbacks).contains("on_cancel"));
    }
}
