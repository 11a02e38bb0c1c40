//! Main application module for Tandem
//!
//! This module implements the eframe App trait for the main application:
//! the split editor/preview layout, the per-frame scroll sync pipeline,
//! file handling, and window state persistence.

// Keyboard handling closure pattern is clearer than the suggested alternative
#![allow(clippy::option_map_unit_fn)]

use crate::config::WindowSize;
use crate::editor::{EditorView, EditorWidget};
use crate::files::dialogs::{open_file_dialog, save_file_dialog};
use crate::markdown::{parse_markdown, MarkdownDocument};
use crate::preview::{PreviewRenderer, PreviewView};
use crate::state::AppState;
use crate::sync::{ScrollOrigin, ScrollSync, SectionManager, SyncPane};
use eframe::egui;
use log::{debug, info, warn};

/// Keyboard shortcut actions that need to be deferred.
///
/// These actions are detected in the input handling closure and executed
/// afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// Save current file (Ctrl+S)
    Save,
    /// Save As dialog (Ctrl+Shift+S)
    SaveAs,
    /// Open file dialog (Ctrl+O)
    Open,
    /// New document (Ctrl+N)
    New,
}

/// Action deferred behind the unsaved-changes confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingAction {
    /// Close the application
    Exit,
    /// Replace the document with a fresh one
    NewFile,
    /// Replace the document with one picked in the open dialog
    OpenFile,
}

/// The main application struct that holds all state and implements eframe::App.
pub struct TandemApp {
    /// Central application state
    state: AppState,
    /// Parsed markdown AST the preview renders from
    parsed: MarkdownDocument,
    /// Document revision `parsed` and `sections` were built from
    parsed_revision: Option<u64>,
    /// Heading-delimited partition of the source
    sections: SectionManager,
    /// Scroll state and line metrics of the editor pane
    editor_view: EditorView,
    /// Scroll state and block layout of the preview pane
    preview_view: PreviewView,
    /// Bidirectional scroll synchronizer
    sync: ScrollSync,
    /// Action waiting on the unsaved-changes confirmation dialog
    pending_action: Option<PendingAction>,
    /// Error message shown in a modal window
    error_message: Option<String>,
    /// Track if we should exit (after confirmation)
    should_exit: bool,
    /// Scroll both panes back to the top next frame (after open/new)
    reset_scroll: bool,
    /// Last known window size (for detecting changes)
    last_window_size: Option<egui::Vec2>,
    /// Last known window position (for detecting changes)
    last_window_pos: Option<egui::Pos2>,
}

impl TandemApp {
    /// Create a new TandemApp instance.
    ///
    /// This initializes the application state from the config file and
    /// restores the last opened file if there was one.
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        info!("Initializing Tandem");

        let state = AppState::new();

        let mut sync = ScrollSync::new();
        sync.set_enabled(state.settings.sync_scroll_enabled);

        Self {
            state,
            parsed: MarkdownDocument::default(),
            parsed_revision: None,
            sections: SectionManager::default(),
            editor_view: EditorView::default(),
            preview_view: PreviewView::default(),
            sync,
            pending_action: None,
            error_message: None,
            should_exit: false,
            reset_scroll: false,
            last_window_size: None,
            last_window_pos: None,
        }
    }

    /// Get the window title based on current state.
    ///
    /// Returns a title in the format: "Filename - Tandem".
    fn window_title(&self) -> String {
        const APP_NAME: &str = "Tandem";
        format!("{} - {}", self.state.document.title(), APP_NAME)
    }

    /// Track window size/position changes for persistence.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let mut changed = false;

        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                let current_size = rect.size();
                let current_pos = rect.min;

                let size_changed = self
                    .last_window_size
                    .map(|s| (s - current_size).length() > 1.0)
                    .unwrap_or(true);

                let pos_changed = self
                    .last_window_pos
                    .map(|p| (p - current_pos).length() > 1.0)
                    .unwrap_or(true);

                if size_changed || pos_changed {
                    self.last_window_size = Some(current_size);
                    self.last_window_pos = Some(current_pos);
                    changed = true;
                }
            }
        });

        if changed {
            if let (Some(size), Some(pos)) = (self.last_window_size, self.last_window_pos) {
                let maximized = ctx.input(|i| i.viewport().maximized.unwrap_or(false));

                self.state.update_settings(|settings| {
                    settings.window_size = WindowSize {
                        width: size.x,
                        height: size.y,
                        x: Some(pos.x),
                        y: Some(pos.y),
                        maximized,
                    };
                });

                debug!(
                    "Window state updated: {}x{} at ({}, {}), maximized: {}",
                    size.x, size.y, pos.x, pos.y, maximized
                );
            }
        }
    }

    /// Rebuild the parsed document and section list when the content changed.
    ///
    /// The section list only needs the source text, so it is rebuilt even if
    /// parsing fails and the preview keeps showing the last good AST.
    fn reparse_if_needed(&mut self) {
        let revision = self.state.document.revision();
        if self.parsed_revision == Some(revision) {
            return;
        }

        self.sections = SectionManager::from_source(&self.state.document.content);

        match parse_markdown(&self.state.document.content) {
            Ok(parsed) => self.parsed = parsed,
            Err(e) => warn!("Markdown parse failed: {}", e),
        }

        self.parsed_revision = Some(revision);
        debug!(
            "Document revision {}: {} sections",
            revision,
            self.sections.len()
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // UI
    // ─────────────────────────────────────────────────────────────────────

    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("New").clicked() {
                    self.handle_new_file();
                }
                if ui.button("Open").clicked() {
                    self.handle_open_file();
                }
                if ui.button("Save").clicked() {
                    self.handle_save_file();
                }
                if ui.button("Save As").clicked() {
                    self.handle_save_as_file();
                }

                ui.separator();

                let mut sync_enabled = self.sync.enabled();
                if ui
                    .checkbox(&mut sync_enabled, "Sync scroll")
                    .on_hover_text("Keep the editor and preview scrolled to the same section")
                    .changed()
                {
                    debug!("Sync scrolling toggled: {}", sync_enabled);
                    self.sync.set_enabled(sync_enabled);
                    self.state
                        .update_settings(|settings| settings.sync_scroll_enabled = sync_enabled);
                }

                let mut word_wrap = self.state.settings.word_wrap;
                if ui.checkbox(&mut word_wrap, "Wrap").changed() {
                    self.state
                        .update_settings(|settings| settings.word_wrap = word_wrap);
                }
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let path_display = self
                    .state
                    .document
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "Untitled".to_string());
                ui.label(path_display);

                if self.state.document.is_modified() {
                    ui.label("(modified)");
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{} lines", self.state.document.line_count()));
                    ui.separator();
                    ui.label(format!("{} sections", self.sections.len()));
                });
            });
        });
    }

    /// Render the editor and preview panes and route their scroll events
    /// through the synchronizer.
    fn render_panes(
        &mut self,
        ctx: &egui::Context,
        editor_drive: Option<f32>,
        preview_drive: Option<f32>,
    ) {
        let window_width = ctx.screen_rect().width();
        let mut editor_scrolled = false;
        let mut preview_scrolled = false;

        let panel_response = egui::SidePanel::left("editor_panel")
            .resizable(true)
            .default_width(window_width * self.state.settings.split_ratio)
            .min_width(200.0)
            .show(ctx, |ui| {
                let output = EditorWidget::new(&mut self.state.document)
                    .font_size(self.state.settings.font_size)
                    .word_wrap(self.state.settings.word_wrap)
                    .id(egui::Id::new("source_editor"))
                    .scroll_to(editor_drive)
                    .show(ui);

                if output.changed {
                    debug!("Content modified in editor");
                }

                // Compare against last frame's offset before the viewport is
                // updated below. A driven pane is never a user scroll.
                if editor_drive.is_none()
                    && (output.scroll_offset - self.editor_view.viewport.scroll_top()).abs() > 1.0
                {
                    editor_scrolled = true;
                }

                self.editor_view.metrics = output.metrics;
                self.editor_view.viewport.update(
                    output.scroll_offset,
                    output.viewport_height,
                    output.content_height,
                );
            });

        // Persist the split position as a ratio of the window width
        if window_width > 0.0 {
            let ratio = (panel_response.response.rect.width() / window_width).clamp(0.1, 0.9);
            if (ratio - self.state.settings.split_ratio).abs() > 0.005 {
                self.state
                    .update_settings(|settings| settings.split_ratio = ratio);
            }
        }

        // Parse edits from this frame before the preview renders them
        self.reparse_if_needed();

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = PreviewRenderer::new(&self.parsed, self.state.document.revision())
                .font_size(self.state.settings.font_size)
                .id(egui::Id::new("preview_pane"))
                .scroll_to(preview_drive)
                .show(ui);

            if preview_drive.is_none()
                && (output.scroll_offset - self.preview_view.viewport.scroll_top()).abs() > 1.0
            {
                preview_scrolled = true;
            }

            self.preview_view.viewport.update(
                output.scroll_offset,
                output.viewport_height,
                output.content_height,
            );
            self.preview_view.layout = output.layout;
        });

        // Match sections against the freshly measured layout
        self.sections.match_preview(&self.preview_view.layout);

        // Route scroll events. The origin gate is checked before marking so
        // an echo from the opposite pane cannot steal the gesture.
        if editor_scrolled && self.sync.should_sync_from(ScrollOrigin::Editor) {
            self.sync.mark_scroll(ScrollOrigin::Editor);
            self.sync
                .sync_to_preview(&self.sections, &self.editor_view, &self.preview_view);
        } else if preview_scrolled && self.sync.should_sync_from(ScrollOrigin::Preview) {
            self.sync.mark_scroll(ScrollOrigin::Preview);
            self.sync
                .sync_to_editor(&self.sections, &self.preview_view, &self.editor_view);
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        // Confirmation dialog for unsaved changes
        if self.pending_action.is_some() {
            egui::Window::new("Unsaved Changes")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("The document has unsaved changes.");
                    ui.separator();
                    ui.horizontal(|ui| {
                        // Save first, then proceed only if the save went through
                        if ui.button("Save").clicked() {
                            self.handle_save_file();
                            if !self.state.has_unsaved_changes() {
                                self.run_pending_action();
                            }
                        }
                        if ui.button("Discard").clicked() {
                            self.run_pending_action();
                        }
                        if ui.button("Cancel").clicked() {
                            self.pending_action = None;
                        }
                    });
                });
        }

        // Error modal
        if let Some(message) = self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new("⚠").size(24.0));
                    ui.label(&message);
                    ui.separator();
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // File handling
    // ─────────────────────────────────────────────────────────────────────

    fn run_pending_action(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };
        match action {
            PendingAction::Exit => self.should_exit = true,
            PendingAction::NewFile => self.do_new_file(),
            PendingAction::OpenFile => self.do_open_file(),
        }
    }

    fn handle_new_file(&mut self) {
        if self.state.has_unsaved_changes() {
            self.pending_action = Some(PendingAction::NewFile);
        } else {
            self.do_new_file();
        }
    }

    fn do_new_file(&mut self) {
        info!("Creating new document");
        self.state.new_document();
        self.reset_views();
    }

    fn handle_open_file(&mut self) {
        if self.state.has_unsaved_changes() {
            self.pending_action = Some(PendingAction::OpenFile);
        } else {
            self.do_open_file();
        }
    }

    fn do_open_file(&mut self) {
        // Start in the current file's directory, falling back to the last
        // opened file's directory
        let initial_dir = self
            .state
            .document
            .path()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .or_else(|| {
                self.state
                    .settings
                    .last_file
                    .as_ref()
                    .and_then(|p| p.parent())
                    .map(|p| p.to_path_buf())
            });

        let Some(path) = open_file_dialog(initial_dir.as_deref()) else {
            debug!("File dialog cancelled");
            return;
        };

        info!("Opening file: {}", path.display());
        match self.state.open_file(path.clone()) {
            Ok(_) => self.reset_views(),
            Err(e) => {
                warn!("Failed to open file {}: {}", path.display(), e);
                self.error_message = Some(format!("Failed to open {}:\n{}", path.display(), e));
            }
        }
    }

    /// Handle the "Save" action.
    ///
    /// Saves to the existing file path; with no path, falls through to
    /// "Save As".
    fn handle_save_file(&mut self) {
        if self.state.document.path().is_some() {
            match self.state.save_document() {
                Ok(_) => debug!("File saved successfully"),
                Err(e) => {
                    warn!("Failed to save file: {}", e);
                    self.error_message = Some(format!("Failed to save file:\n{}", e));
                }
            }
        } else {
            self.handle_save_as_file();
        }
    }

    /// Handle the "Save As" action.
    fn handle_save_as_file(&mut self) {
        let initial_dir = self
            .state
            .document
            .path()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf());

        let default_name = self
            .state
            .document
            .path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "untitled.md".to_string());

        if let Some(path) = save_file_dialog(initial_dir.as_deref(), Some(&default_name)) {
            info!("Saving file as: {}", path.display());
            if let Err(e) = self.state.save_document_as(path) {
                warn!("Failed to save file: {}", e);
                self.error_message = Some(format!("Failed to save file:\n{}", e));
            }
        } else {
            debug!("Save dialog cancelled");
        }
    }

    /// Reset per-document view state after the document was replaced.
    ///
    /// Cancels any in-flight sync animation: its target belongs to the old
    /// document and would scroll the new one away from the top.
    fn reset_views(&mut self) {
        self.editor_view = EditorView::default();
        self.preview_view = PreviewView::default();
        self.parsed_revision = None;
        self.sync.cancel_animation();
        self.reset_scroll = true;
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            // Ctrl+Shift+S: Save As (check first since it's more specific)
            if i.modifiers.ctrl && i.modifiers.shift && i.key_pressed(egui::Key::S) {
                debug!("Keyboard shortcut: Ctrl+Shift+S (Save As)");
                return Some(KeyboardAction::SaveAs);
            }

            // Ctrl+S: Save
            if i.modifiers.ctrl && !i.modifiers.shift && i.key_pressed(egui::Key::S) {
                debug!("Keyboard shortcut: Ctrl+S (Save)");
                return Some(KeyboardAction::Save);
            }

            // Ctrl+O: Open
            if i.modifiers.ctrl && i.key_pressed(egui::Key::O) {
                debug!("Keyboard shortcut: Ctrl+O (Open)");
                return Some(KeyboardAction::Open);
            }

            // Ctrl+N: New document
            if i.modifiers.ctrl && i.key_pressed(egui::Key::N) {
                debug!("Keyboard shortcut: Ctrl+N (New)");
                return Some(KeyboardAction::New);
            }

            None
        })
        .map(|action| match action {
            KeyboardAction::Save => self.handle_save_file(),
            KeyboardAction::SaveAs => self.handle_save_as_file(),
            KeyboardAction::Open => self.handle_open_file(),
            KeyboardAction::New => self.handle_new_file(),
        });
    }
}

impl eframe::App for TandemApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Advance the sync animation before the panes are drawn, so the
        // driven pane renders this frame's value. The pane is captured first
        // because the final step drops the animation.
        let driven_pane = self.sync.animating_pane();
        let animated = self.sync.tick(&mut self.editor_view, &mut self.preview_view);

        let (editor_drive, preview_drive) = if self.reset_scroll {
            self.reset_scroll = false;
            (Some(0.0), Some(0.0))
        } else {
            (
                (animated && driven_pane == Some(SyncPane::Editor))
                    .then(|| self.editor_view.viewport.scroll_top()),
                (animated && driven_pane == Some(SyncPane::Preview))
                    .then(|| self.preview_view.viewport.scroll_top()),
            )
        };

        // Update window title if it changed
        let title = self.window_title();
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));

        // Track window size/position changes for persistence
        self.update_window_state(ctx);

        // Handle close request from the window
        if ctx.input(|i| i.viewport().close_requested())
            && !self.should_exit
            && self.state.has_unsaved_changes()
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.pending_action = Some(PendingAction::Exit);
        }

        self.render_toolbar(ctx);
        self.render_status_bar(ctx);
        self.render_panes(ctx, editor_drive, preview_drive);
        self.render_dialogs(ctx);

        self.handle_keyboard_shortcuts(ctx);

        // Let the origin lapse once its debounce window has passed
        self.sync.release_origin();

        // Keep frames coming while an animation is in flight
        if animated || self.sync.is_animating() {
            ctx.request_repaint();
        }

        // Request exit if confirmed
        if self.should_exit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.state.shutdown();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }

    /// Auto-save interval in seconds.
    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}
