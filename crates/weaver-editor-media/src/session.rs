//! Single-threaded wiring between a controller and a shared document.
//!
//! The host editor owns the document behind `Rc<RefCell<_>>` and keeps editing
//! it while uploads are pending. The session never holds a borrow across the
//! upload `.await`, so typing elsewhere (or deleting the placeholder) stays
//! possible until the upload resolves.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::Instrument;

use crate::controller::{ControllerState, MediaInsertionController};
use crate::document::MediaDocument;
use crate::error::MediaError;
use crate::labels::{Localizer, PlaceholderView};
use crate::picker::FilePicker;
use crate::transaction::TransactionReceipt;
use crate::types::{FileHandle, NodeId};
use crate::upload::LocalUploadService;

/// A placeholder's controller bound to the document it lives in.
pub struct EmbedSession<D, U> {
    doc: Rc<RefCell<D>>,
    controller: RefCell<MediaInsertionController<U>>,
}

impl<D: MediaDocument, U: LocalUploadService> EmbedSession<D, U> {
    pub fn new(doc: Rc<RefCell<D>>, controller: MediaInsertionController<U>) -> Self {
        Self {
            doc,
            controller: RefCell::new(controller),
        }
    }

    pub fn document(&self) -> &Rc<RefCell<D>> {
        &self.doc
    }

    pub fn node(&self) -> NodeId {
        self.controller.borrow().node().clone()
    }

    /// Snapshot of the controller state for rendering.
    pub fn state(&self) -> ControllerState {
        self.controller.borrow().state().clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.controller.borrow().is_uploading()
    }

    pub fn set_link_text(&self, text: impl Into<String>) {
        self.controller.borrow_mut().set_link_text(text);
    }

    pub fn open_upload_picker<P: FilePicker + ?Sized>(&self, picker: &P) {
        self.controller.borrow().open_upload_picker(picker);
    }

    /// Presentation model for the current state.
    pub fn view<L: Localizer + ?Sized>(&self, localizer: &L) -> PlaceholderView {
        PlaceholderView::from_state(self.controller.borrow().state(), localizer)
    }

    /// Upload the first of `files` and commit it once the service resolves.
    ///
    /// Dropping the returned future before it resolves settles the upload, so
    /// the loading state never outlives it.
    pub async fn submit_files(
        &self,
        files: Vec<FileHandle>,
    ) -> Result<TransactionReceipt, MediaError> {
        let pending = {
            let doc = self.doc.borrow();
            self.controller.borrow_mut().begin_upload(&*doc, files)?
        };
        let guard = SettleOnDrop {
            controller: &self.controller,
            armed: true,
        };
        let span = tracing::debug_span!("video_upload", node = %pending.node());
        let result = pending.run().instrument(span).await;
        guard.disarm();

        let mut doc = self.doc.borrow_mut();
        self.controller.borrow_mut().finish_upload(&mut *doc, result)
    }

    /// Commit the current link text.
    pub fn submit_link(&self) -> Result<TransactionReceipt, MediaError> {
        let mut doc = self.doc.borrow_mut();
        self.controller.borrow_mut().submit_link(&mut *doc)
    }

    /// Set the link text and commit it.
    pub fn submit_link_text(&self, url: impl Into<String>) -> Result<TransactionReceipt, MediaError> {
        let mut doc = self.doc.borrow_mut();
        self.controller.borrow_mut().submit_link_text(&mut *doc, url)
    }

    pub fn request_delete(&self) -> bool {
        let mut doc = self.doc.borrow_mut();
        self.controller.borrow_mut().request_delete(&mut *doc)
    }
}

/// Abandons an in-flight upload unless disarmed once it resolves.
struct SettleOnDrop<'a, U: LocalUploadService> {
    controller: &'a RefCell<MediaInsertionController<U>>,
    armed: bool,
}

impl<U: LocalUploadService> SettleOnDrop<'_, U> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<U: LocalUploadService> Drop for SettleOnDrop<'_, U> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.abandon_upload(),
            Err(_) => tracing::error!("controller borrowed while dropping a pending upload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::VideoUploadConfig;
    use crate::controller::{Mode, Outcome};
    use crate::document::PlainDocument;
    use crate::error::UploadError;
    use crate::labels::EnglishLabels;
    use crate::types::{Block, Position, ResolvedMedia, UploadedMedia};
    use crate::upload::test_support::{EchoUpload, GatedUpload, video};

    fn make_session<U: LocalUploadService>(
        upload: Arc<U>,
    ) -> (Rc<RefCell<PlainDocument>>, EmbedSession<PlainDocument, U>) {
        let doc = Rc::new(RefCell::new(PlainDocument::from_blocks(vec![
            Block::paragraph("p1", "before"),
            Block::paragraph("p2", "after"),
        ])));
        let node = doc.borrow_mut().insert_placeholder(1);
        let controller = MediaInsertionController::new(node, upload, VideoUploadConfig::default());
        (Rc::clone(&doc), EmbedSession::new(doc, controller))
    }

    #[tokio::test]
    async fn test_upload_round_trip() {
        let (doc, session) = make_session(Arc::new(EchoUpload::default()));
        let receipt = session
            .submit_files(vec![video("clip.mp4")])
            .await
            .unwrap();

        assert!(receipt.focused);
        assert!(!session.is_uploading());
        let doc = doc.borrow();
        assert_eq!(
            doc.block(&session.node()).and_then(Block::media),
            Some(&ResolvedMedia::new("https://cdn.example/clip.mp4", "100%"))
        );
    }

    #[tokio::test]
    async fn test_delete_while_upload_pending() {
        let upload = Arc::new(GatedUpload::default());
        let gate = upload.gate();
        let (doc, session) = make_session(upload);

        let (committed, ()) = tokio::join!(session.submit_files(vec![video("a.mp4")]), async {
            while !session.is_uploading() {
                tokio::task::yield_now().await;
            }
            assert!(session.request_delete());
            gate.send(Ok(vec![UploadedMedia::new("a.mp4")])).unwrap();
        });

        assert!(matches!(committed, Err(MediaError::NodeGone { .. })));
        let doc = doc.borrow();
        assert_eq!(doc.applied(), 0);
        assert_eq!(doc.len(), 2);
        assert!(doc.blocks().iter().all(|b| b.media().is_none()));
        assert_eq!(session.state().mode, Mode::AwaitingInput);
        assert_eq!(
            session.controller.borrow().outcome(),
            Some(&Outcome::Removed)
        );
    }

    #[tokio::test]
    async fn test_edits_during_upload_shift_commit_position() {
        let upload = Arc::new(GatedUpload::default());
        let gate = upload.gate();
        let (doc, session) = make_session(upload);

        let (committed, ()) = tokio::join!(session.submit_files(vec![video("a.mp4")]), async {
            while !session.is_uploading() {
                tokio::task::yield_now().await;
            }
            doc.borrow_mut()
                .insert_block(0, Block::paragraph("p0", "typed while uploading"));
            gate.send(Ok(vec![UploadedMedia::new("a.mp4")])).unwrap();
        });

        committed.unwrap();
        let doc = doc.borrow();
        assert_eq!(doc.node_position(&session.node()), Some(Position(2)));
        insta::assert_snapshot!(doc.to_string(), @r#"
        [p0] p "typed while uploading"
        [p1] p "before"
        [video-1] video src=a.mp4 width=100%
        [p2] p "after"
        (focused)
        "#);
    }

    #[tokio::test]
    async fn test_failed_upload_shows_input_again() {
        let upload = Arc::new(GatedUpload::default());
        let gate = upload.gate();
        let (doc, session) = make_session(upload);

        let (committed, ()) = tokio::join!(session.submit_files(vec![video("a.mp4")]), async {
            while !session.is_uploading() {
                tokio::task::yield_now().await;
            }
            assert!(session.view(&EnglishLabels).is_uploading());
            gate.send(Err(UploadError::Failed("413".into()))).unwrap();
        });

        assert!(matches!(committed, Err(MediaError::Upload(_))));
        assert!(!session.view(&EnglishLabels).is_uploading());
        assert!(doc.borrow().block(&session.node()).is_some_and(Block::is_placeholder));
    }

    #[tokio::test]
    async fn test_dropped_upload_clears_loading() {
        let upload = Arc::new(GatedUpload::default());
        let _gate = upload.gate();
        let (doc, session) = make_session(upload);

        tokio::select! {
            _ = session.submit_files(vec![video("a.mp4")]) => panic!("gated upload resolved"),
            () = async {
                while !session.is_uploading() {
                    tokio::task::yield_now().await;
                }
            } => {}
        }

        assert_eq!(session.state().mode, Mode::AwaitingInput);
        assert!(!session.view(&EnglishLabels).is_uploading());
        assert_eq!(doc.borrow().applied(), 0);
        assert!(doc.borrow().block(&session.node()).is_some_and(Block::is_placeholder));
    }

    #[tokio::test]
    async fn test_empty_selection_never_shows_loading() {
        let (doc, session) = make_session(Arc::new(EchoUpload::default()));
        let err = session.submit_files(Vec::new()).await.unwrap_err();

        assert!(matches!(err, MediaError::NoFiles));
        assert_eq!(session.state().mode, Mode::AwaitingInput);
        assert_eq!(doc.borrow().applied(), 0);
    }

    #[test]
    fn test_link_submission() {
        let (doc, session) = make_session(Arc::new(EchoUpload::default()));
        session.set_link_text("https://example.com/v.mp4");
        assert_eq!(session.state().link_text, "https://example.com/v.mp4");

        session.submit_link().unwrap();
        assert_eq!(doc.borrow().applied(), 1);
        assert!(doc.borrow().has_focus());
    }

    #[test]
    fn test_blank_link_is_not_submittable() {
        let (doc, session) = make_session(Arc::new(EchoUpload::default()));
        assert!(!session.view(&EnglishLabels).link_submittable);

        let err = session.submit_link().unwrap_err();
        assert!(matches!(err, MediaError::InvalidLink { .. }));
        assert!(matches!(
            session.submit_link_text("not a url"),
            Err(MediaError::InvalidLink { .. })
        ));
        assert_eq!(doc.borrow().applied(), 0);

        session.set_link_text("https://example.com/v.mp4");
        assert!(session.view(&EnglishLabels).link_submittable);
    }
}
