//! Core media embed types: node identity, positions, file handles, and blocks.
//!
//! These types carry no document state of their own. Positions in particular are
//! only ever obtained from a live document and must not outlive the call that
//! produced them.

use std::fmt;

use bytes::Bytes;
use mime_sniffer::MimeTypeSniffer;
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, ToSmolStr};

/// Fallback MIME type when sniffing can't identify the data.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Stable logical identity of a document node.
///
/// Unlike a [`Position`], identity survives edits elsewhere in the document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(SmolStr);

impl NodeId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Live block index of a node.
///
/// Only valid until the document is next mutated. Re-resolve through
/// [`crate::MediaDocument::node_position`] instead of holding onto one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(pub usize);

impl Position {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether `text` is an absolute URL (`scheme:rest`), as a `type="url"` field requires.
pub fn is_absolute_url(text: &str) -> bool {
    let Some((scheme, rest)) = text.trim().split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

/// A file selected by the user, before upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHandle {
    /// Original filename
    pub name: SmolStr,
    /// MIME type (sniffed from bytes unless given explicitly)
    pub mime_type: SmolStr,
    /// Raw file bytes
    pub data: Bytes,
}

impl FileHandle {
    /// Create a handle, sniffing the MIME type from the data.
    pub fn new(name: impl Into<SmolStr>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let mime_type = data
            .sniff_mime_type()
            .unwrap_or(OCTET_STREAM)
            .to_smolstr();
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }

    /// Create a handle with a known MIME type.
    pub fn with_mime(
        name: impl Into<SmolStr>,
        mime_type: impl Into<SmolStr>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check the MIME type against an `accept` filter such as `video/*`.
    ///
    /// Comma-separated lists are supported. `*` and `*/*` accept everything.
    pub fn matches_accept(&self, accept: &str) -> bool {
        accept.split(',').map(str::trim).any(|pattern| {
            match pattern {
                "" => false,
                "*" | "*/*" => true,
                _ => match pattern.strip_suffix("/*") {
                    Some(top) => self
                        .mime_type
                        .split_once('/')
                        .is_some_and(|(t, _)| t.eq_ignore_ascii_case(top)),
                    None => self.mime_type.eq_ignore_ascii_case(pattern),
                },
            }
        })
    }
}

/// One result returned by the upload service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Servable source URL for the uploaded file
    pub src: SmolStr,
}

impl UploadedMedia {
    pub fn new(src: impl Into<SmolStr>) -> Self {
        Self { src: src.into() }
    }
}

/// Media payload committed into the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub src: SmolStr,
    pub width: SmolStr,
}

impl ResolvedMedia {
    pub fn new(src: impl Into<SmolStr>, width: impl Into<SmolStr>) -> Self {
        Self {
            src: src.into(),
            width: width.into(),
        }
    }
}

/// What a block holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Plain text paragraph.
    Paragraph(SmolStr),
    /// "A video will go here." Awaiting upload or link.
    VideoPlaceholder,
    /// Committed video node.
    Video(ResolvedMedia),
}

/// A top-level document node with its logical identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: impl Into<NodeId>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn paragraph(id: impl Into<NodeId>, text: impl Into<SmolStr>) -> Self {
        Self::new(id, BlockKind::Paragraph(text.into()))
    }

    pub fn placeholder(id: impl Into<NodeId>) -> Self {
        Self::new(id, BlockKind::VideoPlaceholder)
    }

    pub fn video(id: impl Into<NodeId>, media: ResolvedMedia) -> Self {
        Self::new(id, BlockKind::Video(media))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, BlockKind::VideoPlaceholder)
    }

    /// The committed media, if this is a video block.
    pub fn media(&self) -> Option<&ResolvedMedia> {
        match &self.kind {
            BlockKind::Video(media) => Some(media),
            _ => None,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BlockKind::Paragraph(text) => write!(f, "[{}] p {:?}", self.id, text.as_str()),
            BlockKind::VideoPlaceholder => write!(f, "[{}] video-placeholder", self.id),
            BlockKind::Video(media) => {
                write!(f, "[{}] video src={} width={}", self.id, media.src, media.width)
            }
        }
    }
}
