//! Editor module for Tandem
//!
//! This module contains the source text editor widget, the per-line layout
//! metrics it produces, and the viewport state shared by both panes.

mod metrics;
mod view;
mod widget;

// Only export what's actually used by the app
pub use metrics::{count_lines, LineMetrics};
pub use view::{clamp_scroll, EditorView, Viewport};
pub use widget::EditorWidget;
