//! Upload service abstraction.
//!
//! The service is handed to the controller at construction. It owns transport,
//! retries and timeouts; the controller only sees the resolved sources or an
//! [`UploadError`].

use crate::error::UploadError;
use crate::types::{FileHandle, UploadedMedia};

/// Turns raw file data into servable media references.
///
/// `LocalUploadService` is usable on single-threaded targets (wasm). The
/// `UploadService` variant requires `Send` futures for native hosts.
#[trait_variant::make(UploadService: Send)]
pub trait LocalUploadService {
    /// Upload `files`, resolving with at least one result per non-empty input.
    async fn upload(&self, files: Vec<FileHandle>) -> Result<Vec<UploadedMedia>, UploadError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Upload services for tests.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use smol_str::SmolStr;
    use tokio::sync::oneshot;

    use super::*;

    /// Resolves immediately, naming each result after its file.
    #[derive(Default)]
    pub struct EchoUpload {
        pub calls: RefCell<Vec<Vec<SmolStr>>>,
    }

    impl LocalUploadService for EchoUpload {
        async fn upload(
            &self,
            files: Vec<FileHandle>,
        ) -> Result<Vec<UploadedMedia>, UploadError> {
            self.calls
                .borrow_mut()
                .push(files.iter().map(|f| f.name.clone()).collect());
            Ok(files
                .iter()
                .map(|f| UploadedMedia::new(format!("https://cdn.example/{}", f.name)))
                .collect())
        }
    }

    /// Hands back a scripted result for each call.
    #[derive(Default)]
    pub struct ScriptedUpload {
        pub responses: RefCell<VecDeque<Result<Vec<UploadedMedia>, UploadError>>>,
        pub calls: RefCell<Vec<Vec<SmolStr>>>,
    }

    impl ScriptedUpload {
        pub fn respond(self, result: Result<Vec<UploadedMedia>, UploadError>) -> Self {
            self.responses.borrow_mut().push_back(result);
            self
        }
    }

    impl LocalUploadService for ScriptedUpload {
        async fn upload(
            &self,
            files: Vec<FileHandle>,
        ) -> Result<Vec<UploadedMedia>, UploadError> {
            self.calls
                .borrow_mut()
                .push(files.iter().map(|f| f.name.clone()).collect());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(UploadError::Failed("no scripted response".into())))
        }
    }

    /// Stays pending until the test resolves it through the returned sender.
    #[derive(Default)]
    pub struct GatedUpload {
        pending: RefCell<VecDeque<oneshot::Receiver<Result<Vec<UploadedMedia>, UploadError>>>>,
    }

    impl GatedUpload {
        /// Queue a gate for the next upload call.
        pub fn gate(&self) -> oneshot::Sender<Result<Vec<UploadedMedia>, UploadError>> {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push_back(rx);
            tx
        }
    }

    impl LocalUploadService for GatedUpload {
        async fn upload(
            &self,
            _files: Vec<FileHandle>,
        ) -> Result<Vec<UploadedMedia>, UploadError> {
            let rx = self.pending.borrow_mut().pop_front();
            match rx {
                Some(rx) => rx.await.unwrap_or(Err(UploadError::Cancelled)),
                None => Err(UploadError::Failed("no gate queued".into())),
            }
        }
    }

    pub fn video(name: &str) -> FileHandle {
        FileHandle::with_mime(name, "video/mp4", vec![0u8; 8])
    }
}
