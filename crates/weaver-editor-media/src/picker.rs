//! File picker affordance.
//!
//! Opening the picker is a pure presentation side effect. The selection comes
//! back later through [`crate::MediaInsertionController::begin_upload`].

use smol_str::SmolStr;

use crate::config::VideoUploadConfig;

/// What the host should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRequest {
    pub accept: SmolStr,
    pub multiple: bool,
}

impl From<&VideoUploadConfig> for PickerRequest {
    fn from(config: &VideoUploadConfig) -> Self {
        Self {
            accept: config.accept.clone(),
            multiple: config.multiple,
        }
    }
}

/// Host-side file selection dialog (hidden `<input type="file">`, native dialog, ...).
pub trait FilePicker {
    fn open(&self, request: &PickerRequest);
}
