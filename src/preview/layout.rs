//! Rendered block geometry for the preview pane
//!
//! Every frame the preview renderer rebuilds a `PreviewLayout`: one entry
//! per top-level markdown block, carrying its measured position in the
//! scrollable content. Section matching stores `BlockRef`s into this layout;
//! the revision stamp makes stale references resolve to `None` instead of
//! pointing at the wrong block after an edit.

// Some geometry accessors are only exercised by tests
#![allow(dead_code)]

use crate::editor::Viewport;

// ─────────────────────────────────────────────────────────────────────────────
// BlockRef
// ─────────────────────────────────────────────────────────────────────────────

/// Reference to a rendered preview block.
///
/// Only valid for the layout built from the same document revision; `block`
/// lookups with a stale revision return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    /// Document revision the layout was built from
    pub revision: u64,
    /// Index into the layout's block list
    pub index: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// RenderedBlock
// ─────────────────────────────────────────────────────────────────────────────

/// What kind of markdown block a layout entry came from.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Heading with its level and plain text (inline markup already removed)
    Heading { level: u8, text: String },
    Paragraph,
    CodeBlock,
    Quote,
    List,
    Rule,
    Table,
    Html,
}

/// Measured geometry of one rendered block, in content-space coordinates.
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    /// Offset of the block's top edge from the top of the content
    pub top: f32,
    /// Rendered height of the block
    pub height: f32,
    /// The kind of block this is
    pub kind: BlockKind,
}

impl RenderedBlock {
    /// Offset of the block's bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PreviewLayout
// ─────────────────────────────────────────────────────────────────────────────

/// The rendered geometry of the whole preview, one entry per top-level block.
///
/// Blocks appear in document order. The layout is rebuilt every frame, so
/// positions stay correct across resizes and font changes; the revision only
/// advances when the document content changes.
#[derive(Debug, Clone, Default)]
pub struct PreviewLayout {
    revision: u64,
    blocks: Vec<RenderedBlock>,
    total_height: f32,
}

impl PreviewLayout {
    /// Build a layout from measured blocks.
    pub fn new(revision: u64, blocks: Vec<RenderedBlock>, total_height: f32) -> Self {
        Self {
            revision,
            blocks,
            total_height,
        }
    }

    /// Document revision this layout was built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of blocks in the layout.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the layout has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in document order.
    pub fn blocks(&self) -> &[RenderedBlock] {
        &self.blocks
    }

    /// Total height of the scrollable preview content.
    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    /// Resolve a block reference.
    ///
    /// Returns `None` if the reference was taken from another revision or is
    /// out of bounds, so callers degrade to doing nothing rather than
    /// scrolling to the wrong place.
    pub fn block(&self, block_ref: BlockRef) -> Option<&RenderedBlock> {
        if block_ref.revision != self.revision {
            return None;
        }
        self.blocks.get(block_ref.index)
    }

    /// Reference to the block at an index, if it exists.
    pub fn block_ref(&self, index: usize) -> Option<BlockRef> {
        if index < self.blocks.len() {
            Some(BlockRef {
                revision: self.revision,
                index,
            })
        } else {
            None
        }
    }

    /// Reference to the first block, if any.
    pub fn first_block(&self) -> Option<BlockRef> {
        self.block_ref(0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PreviewView
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the synchronizer needs to know about the preview pane.
#[derive(Debug, Default)]
pub struct PreviewView {
    /// Scroll state of the preview pane
    pub viewport: Viewport,
    /// Block geometry from the last rendered frame
    pub layout: PreviewLayout,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout(revision: u64) -> PreviewLayout {
        PreviewLayout::new(
            revision,
            vec![
                RenderedBlock {
                    top: 0.0,
                    height: 30.0,
                    kind: BlockKind::Heading {
                        level: 1,
                        text: "Title".to_string(),
                    },
                },
                RenderedBlock {
                    top: 38.0,
                    height: 60.0,
                    kind: BlockKind::Paragraph,
                },
            ],
            120.0,
        )
    }

    #[test]
    fn test_block_lookup() {
        let layout = sample_layout(3);
        let first = layout.first_block().unwrap();
        assert_eq!(first, BlockRef { revision: 3, index: 0 });

        let block = layout.block(first).unwrap();
        assert_eq!(block.top, 0.0);
        assert_eq!(block.bottom(), 30.0);
    }

    #[test]
    fn test_stale_revision_resolves_to_none() {
        let layout = sample_layout(3);
        let stale = BlockRef {
            revision: 2,
            index: 0,
        };
        assert!(layout.block(stale).is_none());
    }

    #[test]
    fn test_out_of_bounds_resolves_to_none() {
        let layout = sample_layout(3);
        let missing = BlockRef {
            revision: 3,
            index: 10,
        };
        assert!(layout.block(missing).is_none());
        assert!(layout.block_ref(10).is_none());
    }

    #[test]
    fn test_empty_layout() {
        let layout = PreviewLayout::default();
        assert!(layout.is_empty());
        assert!(layout.first_block().is_none());
        assert_eq!(layout.total_height(), 0.0);
    }
}
