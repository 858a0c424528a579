//! weaver-editor-media: video embed placeholder logic for the editor.
//!
//! This crate provides:
//! - `MediaDocument` trait for the document transaction surface
//! - `PlainDocument` - in-memory block document implementation
//! - `MediaInsertionController` - drives one placeholder to a committed video or removal
//! - `EmbedSession` - wires a controller to a shared document on a single thread
//! - Labels and a presentation model for the placeholder popover

pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod labels;
pub mod picker;
pub mod session;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod transaction;
pub mod types;
pub mod upload;

pub use config::VideoUploadConfig;
pub use controller::{ControllerState, MediaInsertionController, Mode, Outcome, PendingUpload};
pub use document::{MediaDocument, PlainDocument};
pub use error::{MediaError, UploadError};
pub use labels::{EnglishLabels, LabelKey, Localizer, PlaceholderView, StatusRow, Tab, TabView};
pub use picker::{FilePicker, PickerRequest};
pub use session::EmbedSession;
pub use smol_str::SmolStr;
pub use transaction::{Range, Step, Transaction, TransactionReceipt};
pub use types::{Block, BlockKind, FileHandle, NodeId, Position, ResolvedMedia, UploadedMedia};
pub use upload::{LocalUploadService, UploadService};
