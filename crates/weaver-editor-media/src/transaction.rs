//! Document transactions.
//!
//! A `Transaction` is an ordered list of steps that a [`MediaDocument`] applies
//! atomically: either every step lands or none does. Build one with the chained
//! builder and finish with [`Transaction::commit`].

use web_time::Instant;

use crate::document::MediaDocument;
use crate::error::MediaError;
use crate::types::{Block, Position};

/// A range of top-level nodes, measured in block indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// The one-node span occupied by the node at `pos`.
    pub fn node(pos: Position) -> Self {
        Self::new(pos.index(), pos.index() + 1)
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize range so start <= end.
    pub fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start..r.end
    }
}

/// One step of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Remove the nodes in `range` and insert `block` at its start.
    ///
    /// A caret range inserts without removing anything.
    ReplaceRange { range: Range, block: Block },
    /// Return input focus to the document.
    SetFocus,
}

/// Ordered, atomic set of document steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    steps: Vec<Step>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_range(mut self, range: impl Into<Range>, block: Block) -> Self {
        self.steps.push(Step::ReplaceRange {
            range: range.into().normalize(),
            block,
        });
        self
    }

    pub fn set_focus(mut self) -> Self {
        self.steps.push(Step::SetFocus);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply this transaction to `doc`.
    pub fn commit<D: MediaDocument + ?Sized>(
        self,
        doc: &mut D,
    ) -> Result<TransactionReceipt, MediaError> {
        doc.apply(self)
    }
}

/// Record of an applied transaction.
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    /// Number of steps applied
    pub steps: usize,
    /// Whether a `SetFocus` step was part of the transaction
    pub focused: bool,
    /// Document length in nodes after the transaction
    pub doc_len_after: usize,
    pub timestamp: Instant,
}
