use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::MediaError;

/// Settings for the video embed placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoUploadConfig {
    /// Width attribute written on committed video nodes.
    pub width: SmolStr,
    /// `accept` filter passed to the file picker.
    pub accept: SmolStr,
    /// Whether the picker allows selecting several files.
    ///
    /// Only the first selected file is ever uploaded.
    pub multiple: bool,
    /// Return input focus to the document after a commit.
    pub focus_after_commit: bool,
}

impl Default for VideoUploadConfig {
    fn default() -> Self {
        Self {
            width: SmolStr::new_static("100%"),
            accept: SmolStr::new_static("video/*"),
            multiple: true,
            focus_after_commit: true,
        }
    }
}

impl VideoUploadConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, MediaError> {
        let config: Self = serde_json::from_str(json)?;
        if config.width.trim().is_empty() {
            return Err(MediaError::Config("width must not be empty".into()));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, MediaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
