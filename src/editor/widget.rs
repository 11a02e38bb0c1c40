//! Text editor widget for Tandem
//!
//! This module implements the source pane using egui's TextEdit inside a
//! vertical ScrollArea. Besides editing, the widget reports everything the
//! scroll synchronizer needs: the current scroll offset, the viewport and
//! content heights, and per-line metrics read from the laid-out galley.

use crate::editor::metrics::LineMetrics;
use crate::state::Document;
use eframe::egui::{self, FontId, ScrollArea, TextEdit, Ui};
use log::debug;
use std::sync::Arc;

/// Result of showing the editor widget.
pub struct EditorOutput {
    /// Whether the content was modified this frame.
    pub changed: bool,
    /// Scroll offset of the editor pane.
    pub scroll_offset: f32,
    /// Visible height of the editor pane.
    pub viewport_height: f32,
    /// Total height of the scrollable content.
    pub content_height: f32,
    /// Content-space offsets of the logical lines, from the laid-out text.
    pub metrics: LineMetrics,
}

/// The source text editor widget.
///
/// Wraps egui's TextEdit with:
/// - Revision tracking on the edited `Document`
/// - Word wrap controlled from Settings
/// - Line metrics extracted from the galley for scroll synchronization
/// - An optional externally driven scroll offset (sync animations)
///
/// # Example
///
/// ```ignore
/// let output = EditorWidget::new(&mut document)
///     .font_size(settings.font_size)
///     .word_wrap(settings.word_wrap)
///     .scroll_to(animated_offset)
///     .show(ui);
/// ```
pub struct EditorWidget<'a> {
    /// The document being edited.
    document: &'a mut Document,
    /// Font size for the editor.
    font_size: f32,
    /// Whether to show a frame around the editor.
    frame: bool,
    /// Whether word wrap is enabled.
    word_wrap: bool,
    /// ID for the editor (for state persistence).
    id: Option<egui::Id>,
    /// Scroll offset to apply this frame (None leaves the user in control).
    scroll_to: Option<f32>,
}

impl<'a> EditorWidget<'a> {
    /// Create a new editor widget for the given document.
    pub fn new(document: &'a mut Document) -> Self {
        Self {
            document,
            font_size: 14.0,
            frame: false,
            word_wrap: true,
            id: None,
            scroll_to: None,
        }
    }

    /// Set the font size for the editor.
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set whether word wrap is enabled.
    #[must_use]
    pub fn word_wrap(mut self, wrap: bool) -> Self {
        self.word_wrap = wrap;
        self
    }

    /// Set a custom ID for the editor.
    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    /// Drive the scroll position this frame (used by sync animations).
    #[must_use]
    pub fn scroll_to(mut self, offset: Option<f32>) -> Self {
        self.scroll_to = offset;
        self
    }

    /// Show the editor widget and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorOutput {
        let id = self.id.unwrap_or_else(|| ui.id().with("editor"));

        // Store original content for change detection
        let original_content = self.document.content.clone();

        // Capture values for the layouter closure
        let font_size = self.font_size;
        let word_wrap = self.word_wrap;
        let font_id = FontId::monospace(font_size);

        let layout_font = font_id.clone();
        let mut layouter = move |ui: &Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let layout_job = if word_wrap {
                egui::text::LayoutJob::simple(
                    text.to_owned(),
                    layout_font.clone(),
                    ui.visuals().text_color(),
                    wrap_width,
                )
            } else {
                egui::text::LayoutJob::simple_singleline(
                    text.to_owned(),
                    layout_font.clone(),
                    ui.visuals().text_color(),
                )
            };
            ui.fonts(|f| f.layout_job(layout_job))
        };

        let content = &mut self.document.content;

        let mut scroll_area = ScrollArea::vertical()
            .id_source(id.with("scroll"))
            .auto_shrink([false, false]);

        // A sync animation overrides the scroll position for this frame
        if let Some(offset) = self.scroll_to {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        let scroll_output = scroll_area.show(ui, |ui| {
            let text_edit = TextEdit::multiline(content)
                .id(id)
                .frame(self.frame)
                .font(font_id.clone())
                .desired_width(f32::INFINITY)
                .layouter(&mut layouter);

            text_edit.show(ui)
        });

        let text_output = scroll_output.inner;

        let changed = self.document.content != original_content;
        if changed {
            self.document.mark_edited();
            debug!("Editor content changed");
        }

        // Galley rows are galley-relative; shift them into scroll-content
        // coordinates so line offsets line up with the scroll offset.
        let galley_top = text_output.galley_pos.y - scroll_output.inner_rect.min.y
            + scroll_output.state.offset.y;
        let metrics = line_metrics_from_galley(
            &text_output.galley,
            galley_top,
            scroll_output.content_size.y,
        );

        EditorOutput {
            changed,
            scroll_offset: scroll_output.state.offset.y,
            viewport_height: scroll_output.inner_rect.height(),
            content_height: scroll_output.content_size.y,
            metrics,
        }
    }
}

/// Build line metrics from galley rows.
///
/// With word wrap a logical line covers several rows; a row ends its logical
/// line when `ends_with_newline` is set, so only the first row of each
/// logical line contributes a top offset.
fn line_metrics_from_galley(
    galley: &egui::Galley,
    base_offset: f32,
    total_height: f32,
) -> LineMetrics {
    let mut tops = Vec::new();
    let mut at_line_start = true;

    for row in &galley.rows {
        if at_line_start {
            tops.push(base_offset + row.min_y());
        }
        at_line_start = row.ends_with_newline;
    }

    // Empty content still has one (empty) line
    if tops.is_empty() {
        tops.push(base_offset.max(0.0));
    }

    LineMetrics::from_tops(tops, total_height)
}
