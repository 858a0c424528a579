//! Document transaction surface and a plain in-memory implementation.
//!
//! Defines the `MediaDocument` trait the media controller drives, so hosts can
//! back it with whatever document model they run (plain fields, reactive
//! signals, CRDT) while sharing the placeholder logic.

use std::fmt;

use tracing::debug;
use web_time::Instant;

use crate::error::MediaError;
use crate::transaction::{Step, Transaction, TransactionReceipt};
use crate::types::{Block, NodeId, Position};

/// Core trait for documents that can host a video placeholder.
///
/// The document is the single source of truth. Implementations are expected to
/// serialize transactions internally (single writer), so callers only need the
/// position to be fresh at construction time, not mutual exclusion.
pub trait MediaDocument {
    // === Required ===

    /// Whether the document is still attached to a live editor.
    fn is_attached(&self) -> bool;

    /// Current live position of a node, or `None` if it no longer exists.
    fn node_position(&self, node: &NodeId) -> Option<Position>;

    /// Apply a transaction atomically.
    fn apply(&mut self, tx: Transaction) -> Result<TransactionReceipt, MediaError>;

    /// Remove a node by identity. Returns false if it was already gone.
    fn remove_node(&mut self, node: &NodeId) -> bool;

    // === Provided ===

    /// Start building a transaction against this document.
    fn transaction(&self) -> Transaction {
        Transaction::new()
    }

    fn contains(&self, node: &NodeId) -> bool {
        self.node_position(node).is_some()
    }
}

/// Simple field-based implementation of `MediaDocument`.
///
/// A flat list of top-level blocks plus focus and attachment flags. Use this for
/// non-reactive contexts or as a base for testing.
#[derive(Clone, Debug)]
pub struct PlainDocument {
    blocks: Vec<Block>,
    focused: bool,
    attached: bool,
    applied: usize,
    next_id: u64,
}

impl Default for PlainDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PlainDocument {
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            focused: false,
            attached: true,
            applied: 0,
            next_id: 1,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, node: &NodeId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == node)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Number of transactions applied so far.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Insert a block directly, outside any transaction.
    ///
    /// Stands in for edits made elsewhere in the editor. `index` is clamped.
    pub fn insert_block(&mut self, index: usize, block: Block) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Insert a fresh video placeholder and return its identity.
    pub fn insert_placeholder(&mut self, index: usize) -> NodeId {
        let id = loop {
            let candidate = NodeId::new(format!("video-{}", self.next_id));
            self.next_id += 1;
            if self.block(&candidate).is_none() {
                break candidate;
            }
        };
        self.insert_block(index, Block::placeholder(id.clone()));
        id
    }

    /// Tear down the document, as when the editor is destroyed.
    pub fn destroy(&mut self) {
        self.attached = false;
        self.focused = false;
    }

    fn validate(&self, steps: &[Step]) -> Result<(), MediaError> {
        let mut len = self.blocks.len();
        for step in steps {
            if let Step::ReplaceRange { range, .. } = step {
                if range.start > range.end || range.end > len {
                    return Err(MediaError::RangeOutOfBounds {
                        start: range.start,
                        end: range.end,
                        len,
                    });
                }
                len = len - range.len() + 1;
            }
        }
        Ok(())
    }
}

impl MediaDocument for PlainDocument {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn node_position(&self, node: &NodeId) -> Option<Position> {
        if !self.attached {
            return None;
        }
        self.blocks.iter().position(|b| &b.id == node).map(Position)
    }

    fn apply(&mut self, tx: Transaction) -> Result<TransactionReceipt, MediaError> {
        if !self.attached {
            return Err(MediaError::Detached);
        }
        self.validate(tx.steps())?;

        let steps = tx.into_steps();
        let count = steps.len();
        let mut focused = false;
        for step in steps {
            match step {
                Step::ReplaceRange { range, block } => {
                    self.blocks
                        .splice(std::ops::Range::from(range), std::iter::once(block));
                }
                Step::SetFocus => {
                    self.focused = true;
                    focused = true;
                }
            }
        }
        self.applied += 1;
        debug!(steps = count, len = self.blocks.len(), "applied transaction");

        Ok(TransactionReceipt {
            steps: count,
            focused,
            doc_len_after: self.blocks.len(),
            timestamp: Instant::now(),
        })
    }

    fn remove_node(&mut self, node: &NodeId) -> bool {
        if !self.attached {
            return false;
        }
        match self.blocks.iter().position(|b| &b.id == node) {
            Some(index) => {
                self.blocks.remove(index);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for PlainDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{block}")?;
        }
        if self.focused {
            writeln!(f, "(focused)")?;
        }
        Ok(())
    }
}
