//! Preview module for Tandem
//!
//! The rendered half of the split view: a read-only markdown renderer that
//! measures the geometry of every block it paints, and the layout types the
//! scroll synchronizer consumes.

mod layout;
mod renderer;

// Only export what's actually used by the app
pub use layout::{BlockKind, BlockRef, PreviewLayout, PreviewView, RenderedBlock};
pub use renderer::PreviewRenderer;
