//! Bidirectional scroll synchronization between editor and preview
//!
//! Scrolling one pane animates the other toward the structurally equivalent
//! position: the same fractional depth into the same section. Positions
//! translate through the section pixel spans on each side, so the mapping
//! stays accurate even when the panes render at wildly different heights.
//!
//! Programmatic scrolls feed back through the same scroll events as user
//! input, so syncing naively would ping-pong between the panes. An origin
//! token with a short debounce window suppresses the echo: the pane that
//! started a gesture stays the origin until the window lapses.

// Allow dead code for state-machine API not wired into the toolbar (toggle, origin)
#![allow(dead_code)]

use std::time::{Duration, Instant};

use log::debug;

use crate::editor::{clamp_scroll, EditorView, LineMetrics};
use crate::preview::{PreviewLayout, PreviewView};
use crate::sync::animate::ScrollAnimation;
use crate::sync::section::SectionManager;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for scroll synchronization.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a pane holds the scroll origin after its last scroll event
    pub debounce_duration: Duration,
    /// Whether sync targets are animated or applied immediately
    pub smooth_scrolling: bool,
    /// Animation duration in seconds
    pub animation_duration: f32,
    /// Minimum offset change worth syncing, in pixels
    pub min_scroll_delta: f32,
    /// Slack when deciding a pane is scrolled to the bottom, in pixels
    pub bottom_tolerance: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(16),
            smooth_scrolling: true,
            animation_duration: 0.15,
            min_scroll_delta: 5.0,
            bottom_tolerance: 2.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Core types
// ─────────────────────────────────────────────────────────────────────────────

/// Which pane started the current scroll gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    Editor,
    Preview,
    None,
}

/// A pane an animation can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPane {
    Editor,
    Preview,
}

/// Structural position of a pane's viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFactors {
    /// Index of the section under the viewport top
    pub section_index: usize,
    /// Fractional depth into that section's pixel span, in `[0, 1]`
    pub section_ratio: f32,
    /// Whether the pane is scrolled to the bottom
    pub is_bottom: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// ScrollSync
// ─────────────────────────────────────────────────────────────────────────────

/// State machine for bidirectional sync scrolling.
#[derive(Debug)]
pub struct ScrollSync {
    config: SyncConfig,
    enabled: bool,
    scroll_origin: ScrollOrigin,
    last_scroll_time: Option<Instant>,
    animation: Option<(SyncPane, ScrollAnimation)>,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSync {
    pub fn new() -> Self {
        Self {
            config: SyncConfig::default(),
            enabled: true,
            scroll_origin: ScrollOrigin::None,
            last_scroll_time: None,
            animation: None,
        }
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable sync. Disabling cancels any running animation and
    /// releases the scroll origin.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.animation = None;
            self.scroll_origin = ScrollOrigin::None;
            self.last_scroll_time = None;
        }
    }

    /// Toggle sync on or off, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Cancel any in-flight animation.
    ///
    /// Called when the document is replaced: a sync started against the old
    /// content must not keep driving the fresh panes toward a stale target.
    pub fn cancel_animation(&mut self) {
        self.animation = None;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Origin tracking
    // ─────────────────────────────────────────────────────────────────────

    /// Record that a pane scrolled from user input.
    pub fn mark_scroll(&mut self, origin: ScrollOrigin) {
        self.scroll_origin = origin;
        self.last_scroll_time = Some(Instant::now());
    }

    /// Whether a scroll event from `origin` should drive the other pane.
    ///
    /// The origin pane always may; the opposite pane only after the current
    /// origin has been quiet for a few debounce windows. This is what keeps
    /// programmatic echo scrolls from bouncing the gesture back.
    pub fn should_sync_from(&self, origin: ScrollOrigin) -> bool {
        if !self.enabled {
            return false;
        }
        if self.scroll_origin == ScrollOrigin::None {
            return true;
        }
        if self.scroll_origin == origin {
            return true;
        }
        if let Some(last_time) = self.last_scroll_time {
            last_time.elapsed() >= self.config.debounce_duration * 3
        } else {
            true
        }
    }

    /// Release the scroll origin once its debounce window has lapsed.
    pub fn release_origin(&mut self) {
        if let Some(last_time) = self.last_scroll_time {
            if last_time.elapsed() >= self.config.debounce_duration * 2 {
                self.scroll_origin = ScrollOrigin::None;
                self.last_scroll_time = None;
            }
        }
    }

    pub fn origin(&self) -> ScrollOrigin {
        self.scroll_origin
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scroll factors
    // ─────────────────────────────────────────────────────────────────────

    /// Where the editor viewport sits in the section structure.
    ///
    /// Returns `None` when there are no sections to measure against.
    pub fn editor_factors(
        &self,
        sections: &SectionManager,
        editor: &EditorView,
    ) -> Option<ScrollFactors> {
        let scroll_top = editor.viewport.scroll_top();
        let line = editor.metrics.line_at_offset(scroll_top);
        let section_index = sections.section_index_at_line(line)?;

        let (span_start, span_end) = editor_span(sections, &editor.metrics, section_index)?;
        let section_ratio = span_ratio(scroll_top, span_start, span_end);

        Some(ScrollFactors {
            section_index,
            section_ratio,
            is_bottom: editor.viewport.is_at_bottom(self.config.bottom_tolerance),
        })
    }

    /// Where the preview viewport sits in the section structure.
    ///
    /// The section is the last matched one whose block starts at or above the
    /// viewport top. Returns `None` when no section has a preview match.
    pub fn preview_factors(
        &self,
        sections: &SectionManager,
        preview: &PreviewView,
    ) -> Option<ScrollFactors> {
        let scroll_top = preview.viewport.scroll_top();

        let mut section_index = None;
        for (index, section) in sections.sections().iter().enumerate() {
            let Some(block) = section
                .preview_block()
                .and_then(|r| preview.layout.block(r))
            else {
                continue;
            };
            if block.top <= scroll_top {
                section_index = Some(index);
            } else {
                break;
            }
        }

        // Scrolled above the first matched block: treat as its very top.
        let section_index = section_index.or_else(|| {
            sections.sections().iter().position(|section| {
                section
                    .preview_block()
                    .and_then(|r| preview.layout.block(r))
                    .is_some()
            })
        })?;

        let (span_start, span_end) = preview_span(sections, &preview.layout, section_index)?;
        let section_ratio = span_ratio(scroll_top, span_start, span_end);

        Some(ScrollFactors {
            section_index,
            section_ratio,
            is_bottom: preview.viewport.is_at_bottom(self.config.bottom_tolerance),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────

    /// Animate the preview toward the editor's current position.
    ///
    /// Does nothing when sync is disabled, when there are no sections, or
    /// when the section's preview span cannot be resolved against the
    /// current layout.
    pub fn sync_to_preview(
        &mut self,
        sections: &SectionManager,
        editor: &EditorView,
        preview: &PreviewView,
    ) {
        if !self.enabled {
            return;
        }
        let Some(factors) = self.editor_factors(sections, editor) else {
            return;
        };

        let max = preview.viewport.max_scroll_top();
        let target = if factors.is_bottom {
            max
        } else {
            let Some((span_start, span_end)) =
                preview_span(sections, &preview.layout, factors.section_index)
            else {
                debug!(
                    "Section {} has no preview span, skipping sync",
                    factors.section_index
                );
                return;
            };
            span_start + factors.section_ratio * (span_end - span_start)
        };

        let target = clamp_scroll(target, max);
        self.start_animation(SyncPane::Preview, preview.viewport.scroll_top(), target);
    }

    /// Animate the editor toward the preview's current position.
    pub fn sync_to_editor(
        &mut self,
        sections: &SectionManager,
        preview: &PreviewView,
        editor: &EditorView,
    ) {
        if !self.enabled {
            return;
        }
        let Some(factors) = self.preview_factors(sections, preview) else {
            return;
        };

        let max = editor.viewport.max_scroll_top();
        let target = if factors.is_bottom {
            max
        } else {
            let Some((span_start, span_end)) =
                editor_span(sections, &editor.metrics, factors.section_index)
            else {
                return;
            };
            span_start + factors.section_ratio * (span_end - span_start)
        };

        let target = clamp_scroll(target, max);
        self.start_animation(SyncPane::Editor, editor.viewport.scroll_top(), target);
    }

    fn start_animation(&mut self, pane: SyncPane, current: f32, target: f32) {
        if (target - current).abs() < self.config.min_scroll_delta {
            return;
        }

        // An in-flight animation already heading there keeps running;
        // restarting it every frame would reset the easing mid-gesture.
        if let Some((running_pane, animation)) = &self.animation {
            if *running_pane == pane
                && (animation.target() - target).abs() < self.config.min_scroll_delta
            {
                return;
            }
        }

        let duration = if self.config.smooth_scrolling {
            self.config.animation_duration
        } else {
            0.0
        };
        // A newer sync replaces whatever was still in flight.
        self.animation = Some((pane, ScrollAnimation::new(current, target, duration)));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Animation driving
    // ─────────────────────────────────────────────────────────────────────

    /// Advance the running animation and apply its value to the driven pane.
    ///
    /// Returns `true` while an animation drove a pane this frame, so the
    /// caller knows to request another frame.
    pub fn tick(&mut self, editor: &mut EditorView, preview: &mut PreviewView) -> bool {
        let Some((pane, animation)) = &self.animation else {
            return false;
        };

        let step = animation.step();
        match pane {
            SyncPane::Editor => editor.viewport.set_scroll_top(step.value),
            SyncPane::Preview => preview.viewport.set_scroll_top(step.value),
        }

        if step.finished {
            self.animation = None;
        }
        true
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// The pane the running animation drives, if any.
    pub fn animating_pane(&self) -> Option<SyncPane> {
        self.animation.as_ref().map(|(pane, _)| *pane)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Span helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Fractional position of `offset` within `[start, end)`, clamped to `[0, 1]`.
fn span_ratio(offset: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if span > 0.0 {
        ((offset - start) / span).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Pixel span of a section in the editor, from line metrics.
fn editor_span(
    sections: &SectionManager,
    metrics: &LineMetrics,
    section_index: usize,
) -> Option<(f32, f32)> {
    let section = sections.sections().get(section_index)?;
    let start = metrics.offset_of_line(section.start_line());
    let end = metrics.offset_of_line(section.end_line());
    Some((start, end.max(start)))
}

/// Pixel span of a section in the preview, from its matched block to the
/// next section's block (or the end of the content for the last section).
///
/// `None` when the section, or the next section needed to bound the span,
/// has no block in this layout.
fn preview_span(
    sections: &SectionManager,
    layout: &PreviewLayout,
    section_index: usize,
) -> Option<(f32, f32)> {
    let section = sections.sections().get(section_index)?;
    let block = section.preview_block().and_then(|r| layout.block(r))?;

    let start = block.top;
    let end = match sections.sections().get(section_index + 1) {
        Some(next) => next.preview_block().and_then(|r| layout.block(r))?.top,
        None => layout.total_height(),
    };

    Some((start, end.max(start)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
