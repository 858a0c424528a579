//! Media insertion controller.
//!
//! Drives one video placeholder to committed media or removal. The committed
//! video keeps the placeholder's identity, so later link submissions or a
//! delete still act on that node and [`Outcome`] records the latest of them.
//! The controller never holds a position. Every document mutation
//! re-resolves the placeholder by identity immediately before the transaction
//! is built, since an upload may have been in flight while the rest of the
//! document changed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::VideoUploadConfig;
use crate::document::MediaDocument;
use crate::error::{MediaError, UploadError};
use crate::picker::{FilePicker, PickerRequest};
use crate::transaction::{Range, TransactionReceipt};
use crate::types::{Block, FileHandle, NodeId, ResolvedMedia, UploadedMedia, is_absolute_url};
use crate::upload::LocalUploadService;

/// Input mode of the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Waiting for a file or a link.
    #[default]
    AwaitingInput,
    /// At least one upload is pending. `in_flight` is never zero.
    Uploading { in_flight: usize },
}

/// State exposed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub mode: Mode,
    /// Contents of the link field, updated on every keystroke.
    pub link_text: String,
}

/// The most recent terminal transition of the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed(ResolvedMedia),
    Removed,
}

/// An upload that has been started but not yet resolved.
///
/// Holds neither a position nor a document borrow, so the document stays free
/// for other edits while [`PendingUpload::run`] is awaited. Every pending upload
/// must end in [`MediaInsertionController::finish_upload`] or, if it is dropped
/// unresolved, [`MediaInsertionController::abandon_upload`].
#[must_use = "the upload does nothing until `run` is awaited"]
pub struct PendingUpload<U> {
    service: Arc<U>,
    file: FileHandle,
    node: NodeId,
}

impl<U: LocalUploadService> PendingUpload<U> {
    /// The file being uploaded.
    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// Hand the file to the upload service and wait for it to resolve.
    pub async fn run(self) -> Result<Vec<UploadedMedia>, UploadError> {
        debug!(node = %self.node, file = %self.file.name, bytes = self.file.len(), "uploading");
        self.service.upload(vec![self.file]).await
    }
}

/// Controller bound 1:1 to a video placeholder node.
pub struct MediaInsertionController<U> {
    node: NodeId,
    upload: Arc<U>,
    config: VideoUploadConfig,
    state: ControllerState,
    outcome: Option<Outcome>,
}

impl<U: LocalUploadService> MediaInsertionController<U> {
    pub fn new(node: NodeId, upload: Arc<U>, config: VideoUploadConfig) -> Self {
        Self {
            node,
            upload,
            config,
            state: ControllerState::default(),
            outcome: None,
        }
    }

    // === State accessors ===

    pub fn node(&self) -> &NodeId {
        &self.node
    }

    pub fn config(&self) -> &VideoUploadConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state.mode, Mode::Uploading { .. })
    }

    pub fn link_text(&self) -> &str {
        &self.state.link_text
    }

    pub fn set_link_text(&mut self, text: impl Into<String>) {
        self.state.link_text = text.into();
    }

    /// How the placeholder ended, if it has.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    // === Operations ===

    /// Ask the host to open the file picker.
    pub fn open_upload_picker<P: FilePicker + ?Sized>(&self, picker: &P) {
        picker.open(&PickerRequest::from(&self.config));
    }

    /// Start uploading the first of `files`.
    ///
    /// Preconditions are checked before the mode changes, so a rejected call
    /// never shows a loading state. Extra files are ignored.
    pub fn begin_upload<D: MediaDocument + ?Sized>(
        &mut self,
        doc: &D,
        files: Vec<FileHandle>,
    ) -> Result<PendingUpload<U>, MediaError> {
        if !doc.is_attached() {
            debug!(node = %self.node, "ignoring file selection on detached document");
            return Err(MediaError::Detached);
        }
        let selected = files.len();
        let Some(file) = files.into_iter().next() else {
            debug!(node = %self.node, "ignoring empty file selection");
            return Err(MediaError::NoFiles);
        };
        if !doc.contains(&self.node) {
            return Err(MediaError::NodeGone {
                node: self.node.clone(),
            });
        }
        if selected > 1 {
            debug!(node = %self.node, selected, "only the first selected file is uploaded");
        }

        self.state.mode = match self.state.mode {
            Mode::AwaitingInput => Mode::Uploading { in_flight: 1 },
            Mode::Uploading { in_flight } => Mode::Uploading {
                in_flight: in_flight + 1,
            },
        };
        info!(node = %self.node, file = %file.name, mime = %file.mime_type, "upload started");

        Ok(PendingUpload {
            service: Arc::clone(&self.upload),
            file,
            node: self.node.clone(),
        })
    }

    /// Commit the result of an upload started with [`Self::begin_upload`].
    ///
    /// The first returned source is committed at the placeholder's current
    /// position. Failures return the controller to `AwaitingInput` once no
    /// other upload is pending.
    pub fn finish_upload<D: MediaDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        result: Result<Vec<UploadedMedia>, UploadError>,
    ) -> Result<TransactionReceipt, MediaError> {
        let committed = match result {
            Ok(uploaded) => match uploaded.into_iter().next() {
                Some(first) => {
                    let media = ResolvedMedia::new(first.src, self.config.width.clone());
                    self.commit(doc, media)
                }
                None => Err(UploadError::EmptyResponse.into()),
            },
            Err(err) => Err(err.into()),
        };
        if let Err(err) = &committed {
            warn!(node = %self.node, error = %err, "upload not committed");
        }
        self.settle_upload();
        committed
    }

    /// Settle an upload that will never resolve (its future was dropped).
    pub fn abandon_upload(&mut self) {
        if !self.is_uploading() {
            return;
        }
        warn!(node = %self.node, error = %UploadError::Cancelled, "upload abandoned");
        self.settle_upload();
    }

    /// Commit the current link text as the video source.
    ///
    /// The text must be an absolute URL; anything else is rejected before the
    /// document is touched.
    pub fn submit_link<D: MediaDocument + ?Sized>(
        &mut self,
        doc: &mut D,
    ) -> Result<TransactionReceipt, MediaError> {
        if !is_absolute_url(&self.state.link_text) {
            debug!(node = %self.node, "rejecting link that is not an absolute URL");
            return Err(MediaError::InvalidLink {
                text: self.state.link_text.clone(),
            });
        }
        let media = ResolvedMedia::new(self.state.link_text.trim(), self.config.width.clone());
        self.commit(doc, media)
    }

    /// Set the link text and commit it in one go.
    pub fn submit_link_text<D: MediaDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        url: impl Into<String>,
    ) -> Result<TransactionReceipt, MediaError> {
        self.set_link_text(url);
        self.submit_link(doc)
    }

    /// Remove the node, whatever the current mode.
    ///
    /// An upload still in flight is not cancelled. Its result is dropped when
    /// it arrives because the node can no longer be resolved. After a commit
    /// this removes the committed video and the outcome becomes `Removed`.
    pub fn request_delete<D: MediaDocument + ?Sized>(&mut self, doc: &mut D) -> bool {
        let removed = doc.remove_node(&self.node);
        if removed {
            if let Mode::Uploading { in_flight } = self.state.mode {
                info!(node = %self.node, in_flight, "node removed with upload pending");
            } else {
                info!(node = %self.node, "node removed");
            }
            self.outcome = Some(Outcome::Removed);
        } else {
            debug!(node = %self.node, "delete requested for missing node");
        }
        removed
    }

    fn commit<D: MediaDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        media: ResolvedMedia,
    ) -> Result<TransactionReceipt, MediaError> {
        if !doc.is_attached() {
            return Err(MediaError::Detached);
        }
        // Resolve here, never earlier: the document may have moved on.
        let Some(pos) = doc.node_position(&self.node) else {
            warn!(node = %self.node, src = %media.src, "node gone, dropping commit");
            return Err(MediaError::NodeGone {
                node: self.node.clone(),
            });
        };

        let mut tx = doc
            .transaction()
            .replace_range(Range::node(pos), Block::video(self.node.clone(), media.clone()));
        if self.config.focus_after_commit {
            tx = tx.set_focus();
        }
        let receipt = tx.commit(doc)?;

        info!(node = %self.node, pos = pos.index(), src = %media.src, "video committed");
        self.outcome = Some(Outcome::Committed(media));
        Ok(receipt)
    }

    fn settle_upload(&mut self) {
        self.state.mode = match self.state.mode {
            Mode::Uploading { in_flight } if in_flight > 1 => Mode::Uploading {
                in_flight: in_flight - 1,
            },
            _ => Mode::AwaitingInput,
        };
        debug!(node = %self.node, mode = ?self.state.mode, "upload settled");
    }
}
