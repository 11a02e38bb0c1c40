//! Scroll viewport state for a pane
//!
//! Both the editor and the preview track their scroll position through a
//! `Viewport`, refreshed from the pane's scroll area every frame. The
//! synchronizer reads positions from here and writes animated targets back.

// Not every viewport accessor has a caller outside tests
#![allow(dead_code)]

use super::metrics::LineMetrics;

/// Clamp a scroll offset into `[0, max]`.
///
/// Non-finite values (NaN propagates through `clamp`) reset to the top
/// rather than poisoning the scroll position.
pub fn clamp_scroll(value: f32, max: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Viewport
// ─────────────────────────────────────────────────────────────────────────────

/// Scroll state of one pane.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport {
    /// Current scroll offset from the top of the content
    scroll_top: f32,
    /// Visible height of the pane
    viewport_height: f32,
    /// Total height of the scrollable content
    content_height: f32,
}

impl Viewport {
    /// Refresh the viewport from a pane's scroll output.
    ///
    /// The scroll offset is clamped against the new maximum, so a shrinking
    /// document cannot leave the viewport past the end.
    pub fn update(&mut self, scroll_top: f32, viewport_height: f32, content_height: f32) {
        self.viewport_height = viewport_height.max(0.0);
        self.content_height = content_height.max(0.0);
        self.scroll_top = clamp_scroll(scroll_top, self.max_scroll_top());
    }

    /// Current scroll offset.
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    /// Visible height of the pane.
    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Total height of the scrollable content.
    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// Largest valid scroll offset (zero when the content fits).
    pub fn max_scroll_top(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Set the scroll offset, clamped into the valid range.
    pub fn set_scroll_top(&mut self, value: f32) {
        self.scroll_top = clamp_scroll(value, self.max_scroll_top());
    }

    /// Whether the viewport is scrolled to the bottom, within a tolerance.
    ///
    /// Content that fits entirely in the viewport counts as at the bottom.
    pub fn is_at_bottom(&self, tolerance: f32) -> bool {
        self.scroll_top >= self.max_scroll_top() - tolerance
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EditorView
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the synchronizer needs to know about the editor pane.
#[derive(Debug, Default)]
pub struct EditorView {
    /// Scroll state of the editor pane
    pub viewport: Viewport,
    /// Line offsets from the last layout pass
    pub metrics: LineMetrics,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
