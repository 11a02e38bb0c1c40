//! Read-only markdown preview renderer
//!
//! Renders the parsed markdown AST block by block inside a vertical
//! ScrollArea, and measures the rect every top-level block actually occupied
//! while painting. Those measured rects become the `PreviewLayout` the scroll
//! synchronizer works with, so the geometry is always the rendered truth
//! rather than an estimate.

use crate::markdown::{HeadingLevel, ListType, MarkdownDocument, MarkdownNode, MarkdownNodeType};
use crate::preview::layout::{BlockKind, PreviewLayout, RenderedBlock};
use eframe::egui::{
    self, Color32, CursorIcon, FontId, ScrollArea, Sense, Stroke, TextFormat, Ui,
};
use log::warn;

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Color palette for the rendered preview.
#[derive(Debug, Clone, Copy)]
pub struct PreviewColors {
    /// Background color
    pub background: Color32,
    /// Primary text color
    pub text: Color32,
    /// Strong emphasis text color
    pub strong: Color32,
    /// Heading text color
    pub heading: Color32,
    /// Code background color
    pub code_bg: Color32,
    /// Code text color
    pub code_text: Color32,
    /// Block quote border color
    pub quote_border: Color32,
    /// Block quote text color
    pub quote_text: Color32,
    /// Link color
    pub link: Color32,
    /// Horizontal rule color
    pub hr: Color32,
    /// List bullet/number color
    pub list_marker: Color32,
    /// Task list checkbox color
    pub checkbox: Color32,
}

impl PreviewColors {
    /// Pick the palette matching the current visuals.
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        if visuals.dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Dark theme colors.
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(220, 220, 220),
            strong: Color32::from_rgb(255, 255, 255),
            heading: Color32::from_rgb(100, 180, 255),
            code_bg: Color32::from_rgb(45, 45, 45),
            code_text: Color32::from_rgb(200, 200, 150),
            quote_border: Color32::from_rgb(80, 80, 80),
            quote_text: Color32::from_rgb(180, 180, 180),
            link: Color32::from_rgb(100, 180, 255),
            hr: Color32::from_rgb(80, 80, 80),
            list_marker: Color32::from_rgb(150, 150, 150),
            checkbox: Color32::from_rgb(100, 180, 255),
        }
    }

    /// Light theme colors.
    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(30, 30, 30),
            strong: Color32::from_rgb(0, 0, 0),
            heading: Color32::from_rgb(0, 100, 180),
            code_bg: Color32::from_rgb(245, 245, 245),
            code_text: Color32::from_rgb(80, 80, 80),
            quote_border: Color32::from_rgb(200, 200, 200),
            quote_text: Color32::from_rgb(100, 100, 100),
            link: Color32::from_rgb(0, 100, 180),
            hr: Color32::from_rgb(200, 200, 200),
            list_marker: Color32::from_rgb(100, 100, 100),
            checkbox: Color32::from_rgb(0, 100, 180),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PreviewRenderer
// ─────────────────────────────────────────────────────────────────────────────

/// Result of showing the preview.
pub struct PreviewOutput {
    /// Scroll offset of the preview pane.
    pub scroll_offset: f32,
    /// Visible height of the preview pane.
    pub viewport_height: f32,
    /// Total height of the scrollable content.
    pub content_height: f32,
    /// Measured geometry of every rendered block.
    pub layout: PreviewLayout,
}

/// The rendered preview widget.
///
/// # Example
///
/// ```ignore
/// let output = PreviewRenderer::new(&parsed, document.revision())
///     .font_size(settings.font_size)
///     .scroll_to(animated_offset)
///     .show(ui);
/// ```
pub struct PreviewRenderer<'a> {
    /// The parsed document to render.
    document: &'a MarkdownDocument,
    /// Revision of the source the document was parsed from.
    revision: u64,
    /// Base font size.
    font_size: f32,
    /// ID for the preview scroll area.
    id: Option<egui::Id>,
    /// Scroll offset to apply this frame (None leaves the user in control).
    scroll_to: Option<f32>,
}

impl<'a> PreviewRenderer<'a> {
    /// Create a renderer for a parsed document.
    pub fn new(document: &'a MarkdownDocument, revision: u64) -> Self {
        Self {
            document,
            revision,
            font_size: 14.0,
            id: None,
            scroll_to: None,
        }
    }

    /// Set the base font size.
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set a custom ID for the preview.
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

    /// Render the preview and return the measured layout.
    pub fn show(self, ui: &mut Ui) -> PreviewOutput {
        let id = self.id.unwrap_or_else(|| ui.id().with("preview"));
        let colors = PreviewColors::from_visuals(ui.visuals());
        let font_size = self.font_size;

        ui.painter()
            .rect_filled(ui.max_rect(), 0.0, colors.background);

        let mut scroll_area = ScrollArea::vertical()
            .id_source(id.with("scroll"))
            .auto_shrink([false, false]);

        // A sync animation overrides the scroll position for this frame
        if let Some(offset) = self.scroll_to {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        let scroll_output = scroll_area.show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 8.0;
            ui.set_min_width(ui.available_width());

            // Content-space origin; block rects are measured relative to it
            let content_top = ui.cursor().min.y;

            let mut blocks = Vec::with_capacity(self.document.blocks().len());
            for node in self.document.blocks() {
                let response = ui.scope(|ui| {
                    render_block(ui, node, &colors, font_size);
                });
                let rect = response.response.rect;
                blocks.push(RenderedBlock {
                    top: rect.min.y - content_top,
                    height: rect.height(),
                    kind: block_kind(node),
                });
            }
            blocks
        });

        let blocks = scroll_output.inner;
        let content_height = scroll_output.content_size.y;

        PreviewOutput {
            scroll_offset: scroll_output.state.offset.y,
            viewport_height: scroll_output.inner_rect.height(),
            content_height,
            layout: PreviewLayout::new(self.revision, blocks, content_height),
        }
    }
}

/// Classify a top-level node for the layout.
fn block_kind(node: &MarkdownNode) -> BlockKind {
    match &node.node_type {
        MarkdownNodeType::Heading { level } => BlockKind::Heading {
            level: *level as u8,
            text: node.text_content(),
        },
        MarkdownNodeType::CodeBlock { .. } => BlockKind::CodeBlock,
        MarkdownNodeType::BlockQuote => BlockKind::Quote,
        MarkdownNodeType::List { .. } => BlockKind::List,
        MarkdownNodeType::ThematicBreak => BlockKind::Rule,
        MarkdownNodeType::Table { .. } => BlockKind::Table,
        MarkdownNodeType::HtmlBlock(_) => BlockKind::Html,
        _ => BlockKind::Paragraph,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Rendering
// ─────────────────────────────────────────────────────────────────────────────

fn render_block(ui: &mut Ui, node: &MarkdownNode, colors: &PreviewColors, font_size: f32) {
    match &node.node_type {
        MarkdownNodeType::Heading { level } => {
            render_heading(ui, node, colors, font_size, *level);
        }
        MarkdownNodeType::Paragraph => {
            render_paragraph(ui, node, colors, font_size);
        }
        MarkdownNodeType::CodeBlock { info, literal } => {
            render_code_block(ui, colors, font_size, info, literal);
        }
        MarkdownNodeType::BlockQuote => {
            render_block_quote(ui, node, colors, font_size);
        }
        MarkdownNodeType::List { list_type, tight } => {
            render_list(ui, node, colors, font_size, *list_type, *tight);
        }
        MarkdownNodeType::ThematicBreak => {
            render_rule(ui, colors);
        }
        MarkdownNodeType::Table { alignments, .. } => {
            render_table(ui, node, colors, font_size, alignments);
        }
        MarkdownNodeType::HtmlBlock(html) => {
            render_html_block(ui, colors, font_size, html);
        }
        // Anything unexpected at block level renders as plain text
        _ => {
            render_paragraph(ui, node, colors, font_size);
        }
    }
}

fn render_heading(
    ui: &mut Ui,
    node: &MarkdownNode,
    colors: &PreviewColors,
    base_font_size: f32,
    level: HeadingLevel,
) {
    // Font sizes for different heading levels
    let font_size = match level {
        HeadingLevel::H1 => base_font_size * 1.8,
        HeadingLevel::H2 => base_font_size * 1.5,
        HeadingLevel::H3 => base_font_size * 1.3,
        HeadingLevel::H4 => base_font_size * 1.15,
        HeadingLevel::H5 => base_font_size * 1.05,
        HeadingLevel::H6 => base_font_size,
    };

    // Small top margin for separation from previous content
    let top_margin = match level {
        HeadingLevel::H1 => 8.0,
        HeadingLevel::H2 => 6.0,
        _ => 4.0,
    };
    ui.add_space(top_margin);

    ui.horizontal(|ui| {
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(node.text_content())
                .size(font_size)
                .strong()
                .color(colors.heading),
        );
    });
}

fn render_paragraph(ui: &mut Ui, node: &MarkdownNode, colors: &PreviewColors, font_size: f32) {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = ui.available_width();

    let format = TextFormat {
        font_id: FontId::proportional(font_size),
        color: colors.text,
        ..Default::default()
    };
    for child in &node.children {
        append_inline(&mut job, child, &format, colors, font_size);
    }

    // A paragraph holding a single link opens it on click
    let links = collect_links(node);
    if links.len() == 1 {
        let response = ui.add(egui::Label::new(job).sense(Sense::click()));
        let (url, title) = &links[0];
        if response.hovered() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }
        let hover = if title.is_empty() { url } else { title };
        if response.on_hover_text(hover).clicked() {
            if let Err(e) = open::that(url) {
                warn!("Failed to open link '{}': {}", url, e);
            }
        }
    } else {
        ui.label(job);
    }
}

/// Append an inline node (and its children) to a layout job.
fn append_inline(
    job: &mut egui::text::LayoutJob,
    node: &MarkdownNode,
    format: &TextFormat,
    colors: &PreviewColors,
    font_size: f32,
) {
    match &node.node_type {
        MarkdownNodeType::Text(text) => {
            job.append(text, 0.0, format.clone());
        }
        MarkdownNodeType::SoftBreak => {
            job.append(" ", 0.0, format.clone());
        }
        MarkdownNodeType::LineBreak => {
            job.append("\n", 0.0, format.clone());
        }
        MarkdownNodeType::Code(code) => {
            let mut code_format = format.clone();
            code_format.font_id = FontId::monospace(font_size);
            code_format.color = colors.code_text;
            code_format.background = colors.code_bg;
            job.append(code, 0.0, code_format);
        }
        MarkdownNodeType::Emphasis => {
            let mut italic = format.clone();
            italic.italics = true;
            for child in &node.children {
                append_inline(job, child, &italic, colors, font_size);
            }
        }
        MarkdownNodeType::Strong => {
            let mut strong = format.clone();
            strong.color = colors.strong;
            for child in &node.children {
                append_inline(job, child, &strong, colors, font_size);
            }
        }
        MarkdownNodeType::Strikethrough => {
            let mut strike = format.clone();
            strike.strikethrough = Stroke::new(1.0, format.color);
            for child in &node.children {
                append_inline(job, child, &strike, colors, font_size);
            }
        }
        MarkdownNodeType::Link { .. } => {
            let mut link = format.clone();
            link.color = colors.link;
            link.underline = Stroke::new(1.0, colors.link);
            for child in &node.children {
                append_inline(job, child, &link, colors, font_size);
            }
        }
        MarkdownNodeType::Image { url, .. } => {
            // Images render as their alt text (or the URL when there is none)
            let mut alt = format.clone();
            alt.italics = true;
            alt.color = colors.quote_text;
            if node.children.is_empty() {
                job.append(url, 0.0, alt);
            } else {
                for child in &node.children {
                    append_inline(job, child, &alt, colors, font_size);
                }
            }
        }
        MarkdownNodeType::HtmlInline(html) => {
            let mut raw = format.clone();
            raw.color = colors.quote_text;
            job.append(html, 0.0, raw);
        }
        _ => {
            for child in &node.children {
                append_inline(job, child, format, colors, font_size);
            }
        }
    }
}

/// Collect all link targets inside a node as (url, title) pairs.
fn collect_links(node: &MarkdownNode) -> Vec<(String, String)> {
    let mut links = Vec::new();
    collect_links_into(node, &mut links);
    links
}

fn collect_links_into(node: &MarkdownNode, links: &mut Vec<(String, String)>) {
    if let MarkdownNodeType::Link { url, title } = &node.node_type {
        links.push((url.clone(), title.clone()));
    }
    for child in &node.children {
        collect_links_into(child, links);
    }
}

fn render_code_block(ui: &mut Ui, colors: &PreviewColors, font_size: f32, info: &str, literal: &str) {
    egui::Frame::none()
        .fill(colors.code_bg)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            if !info.is_empty() {
                ui.label(
                    egui::RichText::new(info)
                        .size(font_size * 0.8)
                        .color(colors.quote_text),
                );
            }
            ui.label(
                egui::RichText::new(literal.trim_end_matches('\n'))
                    .font(FontId::monospace(font_size))
                    .color(colors.code_text),
            );
        });
}

fn render_block_quote(ui: &mut Ui, node: &MarkdownNode, colors: &PreviewColors, font_size: f32) {
    let quote_colors = PreviewColors {
        text: colors.quote_text,
        ..*colors
    };

    let response = ui.scope(|ui| {
        ui.horizontal_top(|ui| {
            ui.add_space(12.0);
            ui.vertical(|ui| {
                for child in &node.children {
                    render_block(ui, child, &quote_colors, font_size);
                }
            });
        });
    });

    // Border bar down the left edge of the quote
    let rect = response.response.rect;
    ui.painter().rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(rect.min.x + 2.0, rect.min.y),
            egui::pos2(rect.min.x + 5.0, rect.max.y),
        ),
        0.0,
        colors.quote_border,
    );
}

fn render_list(
    ui: &mut Ui,
    node: &MarkdownNode,
    colors: &PreviewColors,
    font_size: f32,
    list_type: ListType,
    tight: bool,
) {
    if tight {
        ui.spacing_mut().item_spacing.y = 2.0;
    }

    for (i, item) in node.children.iter().enumerate() {
        let marker = match &item.node_type {
            MarkdownNodeType::TaskItem { checked: true } => "☑".to_string(),
            MarkdownNodeType::TaskItem { checked: false } => "☐".to_string(),
            _ => match list_type {
                ListType::Bullet => "•".to_string(),
                ListType::Ordered { start, delimiter } => {
                    format!("{}{}", start + i as u32, delimiter)
                }
            },
        };
        let marker_color = match &item.node_type {
            MarkdownNodeType::TaskItem { .. } => colors.checkbox,
            _ => colors.list_marker,
        };

        ui.horizontal_top(|ui| {
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(marker)
                    .size(font_size)
                    .color(marker_color),
            );
            ui.vertical(|ui| {
                for child in &item.children {
                    render_block(ui, child, colors, font_size);
                }
            });
        });
    }
}

fn render_rule(ui: &mut Ui, colors: &PreviewColors) {
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), 8.0),
        Sense::hover(),
    );
    ui.painter().line_segment(
        [
            egui::pos2(rect.min.x, rect.center().y),
            egui::pos2(rect.max.x, rect.center().y),
        ],
        Stroke::new(1.0, colors.hr),
    );
}

fn render_table(
    ui: &mut Ui,
    node: &MarkdownNode,
    colors: &PreviewColors,
    font_size: f32,
    alignments: &[crate::markdown::TableAlignment],
) {
    use crate::markdown::TableAlignment;

    let table_id = egui::Id::new(("preview_table", node.start_line));
    egui::Grid::new(table_id)
        .striped(true)
        .spacing(egui::vec2(12.0, 4.0))
        .show(ui, |ui| {
            for row in &node.children {
                let header = matches!(
                    row.node_type,
                    MarkdownNodeType::TableRow { header: true }
                );
                for (col, cell) in row.children.iter().enumerate() {
                    let text = cell.text_content();
                    let rich = if header {
                        egui::RichText::new(text)
                            .size(font_size)
                            .strong()
                            .color(colors.strong)
                    } else {
                        egui::RichText::new(text).size(font_size).color(colors.text)
                    };
                    match alignments.get(col) {
                        Some(TableAlignment::Right) => {
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| ui.label(rich),
                            );
                        }
                        _ => {
                            ui.label(rich);
                        }
                    }
                }
                ui.end_row();
            }
        });
}

fn render_html_block(ui: &mut Ui, colors: &PreviewColors, font_size: f32, html: &str) {
    // Raw HTML is shown verbatim rather than interpreted
    ui.label(
        egui::RichText::new(html.trim_end())
            .font(FontId::monospace(font_size * 0.9))
            .color(colors.quote_text),
    );
}
