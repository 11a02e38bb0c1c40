//! Application state management for Tandem
//!
//! This module defines the `Document` struct holding the markdown source
//! being edited and the central `AppState` struct that ties the document
//! to user settings and persistence.

// Allow dead code - with_settings and some accessors are only used by tests
#![allow(dead_code)]

use crate::config::{load_settings, save_settings_silent, Settings};
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// The markdown document currently being edited.
///
/// Holds the source text together with a revision counter. The revision is
/// bumped on every content change, and downstream consumers (the markdown
/// parse cache, the section list, the preview layout) use it to decide when
/// their derived data is stale.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document content
    pub content: String,
    /// Original content (for detecting modifications)
    original_content: String,
    /// File path (None for unsaved/new documents)
    path: Option<PathBuf>,
    /// Content revision counter - incremented on every edit
    revision: u64,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            content: String::new(),
            original_content: String::new(),
            path: None,
            revision: 0,
        }
    }

    /// Create a document with content loaded from a file.
    pub fn from_file(path: PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| Error::FileRead {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self {
            content: content.clone(),
            original_content: content,
            path: Some(path),
            revision: 0,
        })
    }

    /// Get the file path (None for unsaved documents).
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Get the content revision counter.
    ///
    /// Incremented whenever the content changes, so derived data keyed on
    /// the revision can be invalidated cheaply.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Check if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.content != self.original_content
    }

    /// Get the display title for this document.
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled");

        if self.is_modified() {
            format!("{}*", name)
        } else {
            name.to_string()
        }
    }

    /// Replace the content and bump the revision.
    pub fn set_content(&mut self, new_content: String) {
        if new_content != self.content {
            self.content = new_content;
            self.revision = self.revision.wrapping_add(1);
        }
    }

    /// Record that the content was edited in place (e.g., by egui's TextEdit).
    ///
    /// Call this AFTER the widget has modified `content` directly, so the
    /// revision counter stays in step with the text.
    pub fn mark_edited(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Mark the current content as saved (updates original_content).
    pub fn mark_saved(&mut self) {
        self.original_content = self.content.clone();
    }

    /// Set the file path (e.g., after "Save As").
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// Number of source lines in the document.
    ///
    /// An empty document counts as a single empty line, matching what the
    /// editor displays.
    pub fn line_count(&self) -> usize {
        crate::editor::count_lines(&self.content)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Central application state struct.
///
/// This struct holds all persistent runtime state for the application:
/// - The document being edited
/// - User settings (loaded from config)
///
/// # Example
///
/// ```ignore
/// let mut state = AppState::new();
/// state.document.set_content("# Hello".to_string());
/// ```
#[derive(Debug)]
pub struct AppState {
    /// The document being edited
    pub document: Document,
    /// User settings (loaded from config)
    pub settings: Settings,
    /// Whether settings have been modified and need saving
    settings_dirty: bool,
}

impl AppState {
    /// Create a new AppState with settings loaded from config.
    ///
    /// This initializes the application state by:
    /// 1. Loading settings from the config file (with graceful fallback to defaults)
    /// 2. Reopening the last edited file, if one is recorded and still readable
    /// 3. Falling back to an empty document otherwise
    pub fn new() -> Self {
        let settings = load_settings();
        info!("AppState initialized with settings");

        let document = match settings.last_file.clone() {
            Some(path) => match Document::from_file(path.clone()) {
                Ok(doc) => {
                    debug!("Restored last file: {}", path.display());
                    doc
                }
                Err(e) => {
                    warn!("{}. Starting with an empty document.", e);
                    Document::new()
                }
            },
            None => Document::new(),
        };

        Self {
            document,
            settings,
            settings_dirty: false,
        }
    }

    /// Create AppState with custom settings (useful for testing).
    ///
    /// Does not touch the filesystem; starts with an empty document.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            document: Document::new(),
            settings,
            settings_dirty: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Open a file, replacing the current document.
    pub fn open_file(&mut self, path: PathBuf) -> Result<()> {
        self.document = Document::from_file(path.clone())?;
        info!("Opened file: {}", path.display());

        self.settings.last_file = Some(path);
        self.settings_dirty = true;
        Ok(())
    }

    /// Replace the current document with a new empty one.
    pub fn new_document(&mut self) {
        self.document = Document::new();
        self.settings.last_file = None;
        self.settings_dirty = true;
        debug!("Created new document");
    }

    /// Save the document to its file path.
    ///
    /// Returns an error if the document has no path (use `save_document_as`).
    pub fn save_document(&mut self) -> Result<()> {
        let path = self
            .document
            .path()
            .cloned()
            .ok_or_else(|| Error::Application("No file path set. Use 'Save As' instead.".to_string()))?;

        std::fs::write(&path, &self.document.content).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e,
        })?;

        self.document.mark_saved();
        info!("Saved file: {}", path.display());
        Ok(())
    }

    /// Save the document to a new path.
    pub fn save_document_as(&mut self, path: PathBuf) -> Result<()> {
        std::fs::write(&path, &self.document.content).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e,
        })?;

        self.document.set_path(path.clone());
        self.document.mark_saved();

        self.settings.last_file = Some(path.clone());
        self.settings_dirty = true;

        info!("Saved file as: {}", path.display());
        Ok(())
    }

    /// Check if the document has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.document.is_modified()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Update settings and mark as dirty.
    pub fn update_settings<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.settings_dirty = true;
    }

    /// Mark settings as dirty (needing to be saved).
    pub fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Save settings to config file if modified.
    ///
    /// Returns `true` if settings were saved.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty {
            self.settings.last_file = self.document.path().cloned();

            if save_settings_silent(&self.settings) {
                self.settings_dirty = false;
                info!("Settings saved");
                return true;
            }
            warn!("Failed to save settings");
        }
        false
    }

    /// Force save settings to config file.
    pub fn save_settings(&mut self) -> bool {
        self.settings_dirty = true;
        self.save_settings_if_dirty()
    }

    /// Prepare state for application shutdown.
    ///
    /// Saves settings and performs any necessary cleanup.
    pub fn shutdown(&mut self) {
        self.save_settings();
        info!("AppState shutdown complete");
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Document Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.path().is_none());
        assert!(doc.content.is_empty());
        assert!(!doc.is_modified());
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn test_document_modification_tracking() {
        let mut doc = Document::new();
        assert!(!doc.is_modified());

        doc.set_content("new content".to_string());
        assert!(doc.is_modified());

        doc.mark_saved();
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_document_title() {
        let mut doc = Document::new();
        assert_eq!(doc.title(), "Untitled");

        doc.set_content("modified".to_string());
        assert_eq!(doc.title(), "Untitled*");

        doc.set_path(PathBuf::from("/test/document.md"));
        assert_eq!(doc.title(), "document.md*");

        doc.mark_saved();
        assert_eq!(doc.title(), "document.md");
    }

    #[test]
    fn test_document_revision_bumps_on_change() {
        let mut doc = Document::new();
        assert_eq!(doc.revision(), 0);

        doc.set_content("first".to_string());
        assert_eq!(doc.revision(), 1);

        // Setting identical content is not a change
        doc.set_content("first".to_string());
        assert_eq!(doc.revision(), 1);

        doc.mark_edited();
        assert_eq!(doc.revision(), 2);
    }

    #[test]
    fn test_document_line_count() {
        let mut doc = Document::new();
        assert_eq!(doc.line_count(), 1);

        doc.set_content("one\ntwo\nthree".to_string());
        assert_eq!(doc.line_count(), 3);

        doc.set_content("one\ntwo\n".to_string());
        assert_eq!(doc.line_count(), 3);
    }

    #[test]
    fn test_document_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("test.md");
        std::fs::write(&path, "# Hello").unwrap();

        let doc = Document::from_file(path.clone()).unwrap();
        assert_eq!(doc.content, "# Hello");
        assert_eq!(doc.path(), Some(&path));
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_document_from_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("does_not_exist.md");

        let result = Document::from_file(path);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("does_not_exist.md"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AppState Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_appstate_with_settings() {
        let mut settings = Settings::default();
        settings.font_size = 18.0;

        let state = AppState::with_settings(settings);
        assert_eq!(state.settings.font_size, 18.0);
        assert!(!state.has_unsaved_changes());
    }

    #[test]
    fn test_appstate_open_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\n\nBody").unwrap();

        let mut state = AppState::with_settings(Settings::default());
        state.open_file(path.clone()).unwrap();

        assert_eq!(state.document.content, "# Notes\n\nBody");
        assert_eq!(state.settings.last_file, Some(path));
        assert!(state.settings_dirty);
    }

    #[test]
    fn test_appstate_save_document_without_path() {
        let mut state = AppState::with_settings(Settings::default());
        state.document.set_content("unsaved".to_string());

        let result = state.save_document();
        assert!(result.is_err());
    }

    #[test]
    fn test_appstate_save_document_as() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("out.md");

        let mut state = AppState::with_settings(Settings::default());
        state.document.set_content("# Saved".to_string());
        assert!(state.has_unsaved_changes());

        state.save_document_as(path.clone()).unwrap();

        assert!(!state.has_unsaved_changes());
        assert_eq!(state.document.path(), Some(&path));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Saved");
    }

    #[test]
    fn test_appstate_save_then_modify() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.md");
        std::fs::write(&path, "original").unwrap();

        let mut state = AppState::with_settings(Settings::default());
        state.open_file(path.clone()).unwrap();
        assert!(!state.has_unsaved_changes());

        state.document.set_content("changed".to_string());
        assert!(state.has_unsaved_changes());

        state.save_document().unwrap();
        assert!(!state.has_unsaved_changes());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "changed");
    }

    #[test]
    fn test_appstate_new_document_clears_last_file() {
        let mut settings = Settings::default();
        settings.last_file = Some(PathBuf::from("/somewhere/file.md"));

        let mut state = AppState::with_settings(settings);
        state.new_document();

        assert!(state.settings.last_file.is_none());
        assert!(state.settings_dirty);
    }

    #[test]
    fn test_appstate_update_settings_marks_dirty() {
        let mut state = AppState::with_settings(Settings::default());
        assert!(!state.settings_dirty);

        state.update_settings(|s| {
            s.word_wrap = false;
        });

        assert!(!state.settings.word_wrap);
        assert!(state.settings_dirty);
    }
}
