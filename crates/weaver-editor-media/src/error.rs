//! Error types for media embed operations.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NodeId;

/// Errors surfaced by the media insertion controller and the document surface.
///
/// None of these are fatal to the surrounding editor. Each one means a single
/// operation on a single placeholder was abandoned.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum MediaError {
    /// The editor or its document is destroyed or detached.
    #[error("document is detached")]
    #[diagnostic(code(weaver::media::detached))]
    Detached,

    /// File submission with an empty selection.
    #[error("no files selected")]
    #[diagnostic(code(weaver::media::no_files))]
    NoFiles,

    /// The node no longer exists when a transaction was about to be built.
    #[error("node {node} is no longer in the document")]
    #[diagnostic(
        code(weaver::media::node_gone),
        help("the node was removed or replaced while this operation was pending")
    )]
    NodeGone { node: NodeId },

    /// Link text that is empty or not an absolute URL.
    #[error("not a valid video link: {text:?}")]
    #[diagnostic(code(weaver::media::invalid_link), help("enter an absolute URL such as https://..."))]
    InvalidLink { text: String },

    /// A transaction step addressed a range outside the document.
    #[error("range {start}..{end} is out of bounds for a document of {len} nodes")]
    #[diagnostic(code(weaver::media::range))]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    /// Upload service failure.
    #[error(transparent)]
    #[diagnostic(code(weaver::media::upload))]
    Upload(#[from] UploadError),

    /// Invalid configuration.
    #[error("invalid media config: {0}")]
    #[diagnostic(code(weaver::media::config))]
    Config(String),
}

impl From<serde_json::Error> for MediaError {
    fn from(e: serde_json::Error) -> Self {
        MediaError::Config(e.to_string())
    }
}

/// Errors reported by an upload service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadError {
    /// Transport or server failure.
    #[error("upload failed: {0}")]
    Failed(String),

    /// The service resolved without any result.
    #[error("upload service returned no results")]
    EmptyResponse,

    /// The upload was aborted before resolving, either by a service that
    /// supports aborting or because the pending upload was dropped.
    #[error("upload cancelled")]
    Cancelled,
}
