//! Heading-delimited source sections
//!
//! The editor and preview scroll against different geometries, so sync works
//! through a shared structural unit: the section. A section is a half-open
//! run of source lines opened by an ATX heading (or the lead-in before the
//! first heading) and closed by the next heading or the end of the document.
//! Matching sections to rendered preview blocks gives each section a pixel
//! span on both sides of the split.

// Some section accessors are only exercised by tests
#![allow(dead_code)]

use crate::editor::count_lines;
use crate::markdown::{parse_atx_heading, HeadingLine};
use crate::preview::{BlockKind, BlockRef, PreviewLayout};

// ─────────────────────────────────────────────────────────────────────────────
// Section
// ─────────────────────────────────────────────────────────────────────────────

/// A contiguous half-open range of source lines `[start_line, end_line)`.
#[derive(Debug, Clone)]
pub struct Section {
    start_line: usize,
    end_line: usize,
    /// Heading that opens the section, `None` for the lead-in section
    heading: Option<HeadingLine>,
    /// Rendered preview block this section is matched to, if any
    preview_block: Option<BlockRef>,
}

impl Section {
    /// First line of the section (inclusive).
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// One past the last line of the section.
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Last line of the section (inclusive).
    pub fn last_line(&self) -> usize {
        self.end_line.saturating_sub(1)
    }

    /// Number of source lines in the section.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }

    /// Whether `line` falls within the section.
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line < self.end_line
    }

    /// The heading that opens this section, if it has one.
    pub fn heading(&self) -> Option<&HeadingLine> {
        self.heading.as_ref()
    }

    /// The preview block this section is matched to, if any.
    pub fn preview_block(&self) -> Option<BlockRef> {
        self.preview_block
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SectionManager
// ─────────────────────────────────────────────────────────────────────────────

/// Partition of the source into sections, plus their preview matches.
///
/// Rebuilt whenever the document content changes; re-matched against the
/// preview layout whenever the preview is re-rendered.
#[derive(Debug, Clone, Default)]
pub struct SectionManager {
    sections: Vec<Section>,
    line_count: usize,
}

impl SectionManager {
    /// Partition `source` into heading-delimited sections.
    ///
    /// Every line belongs to exactly one section. A heading line starts a new
    /// section; lines before the first heading form a lead-in section with no
    /// heading. An empty document yields a single one-line section.
    pub fn from_source(source: &str) -> Self {
        let line_count = count_lines(source);
        let mut sections = Vec::new();

        let mut current_start = 0;
        let mut current_heading: Option<HeadingLine> = None;

        for (index, line) in source.split('\n').enumerate() {
            if let Some(heading) = parse_atx_heading(line) {
                if index > current_start {
                    sections.push(Section {
                        start_line: current_start,
                        end_line: index,
                        heading: current_heading.take(),
                        preview_block: None,
                    });
                    current_start = index;
                }
                current_heading = Some(heading);
            }
        }

        sections.push(Section {
            start_line: current_start,
            end_line: line_count,
            heading: current_heading,
            preview_block: None,
        });

        Self {
            sections,
            line_count,
        }
    }

    /// All sections, in document order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the manager holds no sections at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of source lines the partition covers.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Index of the section containing `line`.
    ///
    /// Lines past the end of the document clamp into the last section.
    /// Returns `None` only when there are no sections.
    pub fn section_index_at_line(&self, line: usize) -> Option<usize> {
        if self.sections.is_empty() {
            return None;
        }
        let index = self.sections.partition_point(|s| s.end_line <= line);
        Some(index.min(self.sections.len() - 1))
    }

    /// The section containing `line`, clamping past-the-end lines.
    pub fn section_at_line(&self, line: usize) -> Option<&Section> {
        self.section_index_at_line(line)
            .map(|index| &self.sections[index])
    }

    /// Match sections to rendered preview blocks.
    ///
    /// Headed sections are matched in order against heading blocks with the
    /// same level and text, scanning forward through the layout with a cursor
    /// so duplicate headings pair up by position. A section whose heading has
    /// no rendered counterpart stays unmatched and does not move the cursor.
    /// The lead-in section maps to the first block without consuming it.
    pub fn match_preview(&mut self, layout: &PreviewLayout) {
        for section in &mut self.sections {
            section.preview_block = None;
        }

        let mut cursor = 0;
        for section in &mut self.sections {
            let Some(heading) = &section.heading else {
                section.preview_block = layout.first_block();
                continue;
            };

            let found = layout.blocks()[cursor.min(layout.len())..]
                .iter()
                .position(|block| {
                    matches!(
                        &block.kind,
                        BlockKind::Heading { level, text }
                            if *level == heading.level && *text == heading.title
                    )
                });

            if let Some(offset) = found {
                let index = cursor + offset;
                section.preview_block = layout.block_ref(index);
                cursor = index + 1;
            }
        }
    }

    /// Whether any section currently has a preview match.
    pub fn has_matches(&self) -> bool {
        self.sections
            .iter()
            .any(|section| section.preview_block.is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::RenderedBlock;

    const FIXTURE: &str = "intro\n\
# Alpha\n\
alpha one\n\
alpha two\n\
\n\
## Beta\n\
beta one\n\
beta two\n\
beta three\n\
beta four\n\
beta five\n\
beta six\n\
beta seven";

    fn heading_block(level: u8, text: &str, top: f32, height: f32) -> RenderedBlock {
        RenderedBlock {
            top,
            height,
            kind: BlockKind::Heading {
                level,
                text: text.to_string(),
            },
        }
    }

    fn paragraph_block(top: f32, height: f32) -> RenderedBlock {
        RenderedBlock {
            top,
            height,
            kind: BlockKind::Paragraph,
        }
    }

    fn fixture_layout() -> PreviewLayout {
        PreviewLayout::new(
            0,
            vec![
                paragraph_block(0.0, 20.0),
                heading_block(1, "Alpha", 28.0, 30.0),
                paragraph_block(66.0, 40.0),
                heading_block(2, "Beta", 114.0, 26.0),
                paragraph_block(148.0, 252.0),
            ],
            400.0,
        )
    }

    #[test]
    fn test_partition_fixture() {
        let manager = SectionManager::from_source(FIXTURE);
        assert_eq!(manager.line_count(), 13);
        assert_eq!(manager.len(), 3);

        let sections = manager.sections();
        assert_eq!(sections[0].start_line(), 0);
        assert_eq!(sections[0].end_line(), 1);
        assert!(sections[0].heading().is_none());

        assert_eq!(sections[1].start_line(), 1);
        assert_eq!(sections[1].end_line(), 5);
        assert_eq!(sections[1].last_line(), 4);
        let alpha = sections[1].heading().unwrap();
        assert_eq!(alpha.level, 1);
        assert_eq!(alpha.title, "Alpha");

        assert_eq!(sections[2].start_line(), 5);
        assert_eq!(sections[2].end_line(), 13);
        let beta = sections[2].heading().unwrap();
        assert_eq!(beta.level, 2);
        assert_eq!(beta.title, "Beta");
    }

    #[test]
    fn test_every_line_in_exactly_one_section() {
        let manager = SectionManager::from_source(FIXTURE);
        for line in 0..manager.line_count() {
            let containing = manager
                .sections()
                .iter()
                .filter(|section| section.contains_line(line))
                .count();
            assert_eq!(containing, 1, "line {} containment", line);
        }
    }

    #[test]
    fn test_heading_on_first_line() {
        let manager = SectionManager::from_source("# Top\nbody");
        assert_eq!(manager.len(), 1);
        let section = &manager.sections()[0];
        assert_eq!(section.start_line(), 0);
        assert_eq!(section.end_line(), 2);
        assert_eq!(section.heading().unwrap().title, "Top");
    }

    #[test]
    fn test_empty_document_single_section() {
        let manager = SectionManager::from_source("");
        assert_eq!(manager.len(), 1);
        let section = &manager.sections()[0];
        assert_eq!(section.start_line(), 0);
        assert_eq!(section.end_line(), 1);
        assert!(section.heading().is_none());
    }

    #[test]
    fn test_consecutive_headings() {
        let manager = SectionManager::from_source("# A\n# B\n# C");
        assert_eq!(manager.len(), 3);
        for (index, section) in manager.sections().iter().enumerate() {
            assert_eq!(section.start_line(), index);
            assert_eq!(section.end_line(), index + 1);
            assert_eq!(section.line_count(), 1);
        }
    }

    #[test]
    fn test_heading_on_last_line() {
        let manager = SectionManager::from_source("body\n## End");
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.sections()[1].start_line(), 1);
        assert_eq!(manager.sections()[1].end_line(), 2);
        assert_eq!(manager.sections()[1].heading().unwrap().title, "End");
    }

    #[test]
    fn test_section_at_line_clamps_past_end() {
        let manager = SectionManager::from_source(FIXTURE);
        let section = manager.section_at_line(500).unwrap();
        assert_eq!(section.start_line(), 5);

        let default = SectionManager::default();
        assert!(default.section_at_line(0).is_none());
    }

    #[test]
    fn test_section_index_at_line_boundaries() {
        let manager = SectionManager::from_source(FIXTURE);
        assert_eq!(manager.section_index_at_line(0), Some(0));
        assert_eq!(manager.section_index_at_line(1), Some(1));
        assert_eq!(manager.section_index_at_line(4), Some(1));
        assert_eq!(manager.section_index_at_line(5), Some(2));
        assert_eq!(manager.section_index_at_line(12), Some(2));
    }

    #[test]
    fn test_match_preview_fixture() {
        let mut manager = SectionManager::from_source(FIXTURE);
        let layout = fixture_layout();
        manager.match_preview(&layout);

        let sections = manager.sections();
        assert_eq!(sections[0].preview_block().unwrap().index, 0);
        assert_eq!(sections[1].preview_block().unwrap().index, 1);
        assert_eq!(sections[2].preview_block().unwrap().index, 3);
        assert!(manager.has_matches());
    }

    #[test]
    fn test_match_preview_duplicate_headings_pair_in_order() {
        let mut manager = SectionManager::from_source("## Tasks\none\n## Tasks\ntwo");
        let layout = PreviewLayout::new(
            0,
            vec![
                heading_block(2, "Tasks", 0.0, 20.0),
                paragraph_block(24.0, 16.0),
                heading_block(2, "Tasks", 48.0, 20.0),
                paragraph_block(72.0, 16.0),
            ],
            100.0,
        );
        manager.match_preview(&layout);

        assert_eq!(manager.sections()[0].preview_block().unwrap().index, 0);
        assert_eq!(manager.sections()[1].preview_block().unwrap().index, 2);
    }

    #[test]
    fn test_match_preview_miss_does_not_move_cursor() {
        // "Gone" has no rendered counterpart; "Beta" must still match.
        let mut manager = SectionManager::from_source("# Alpha\n# Gone\n# Beta");
        let layout = PreviewLayout::new(
            0,
            vec![
                heading_block(1, "Alpha", 0.0, 20.0),
                heading_block(1, "Beta", 24.0, 20.0),
            ],
            60.0,
        );
        manager.match_preview(&layout);

        let sections = manager.sections();
        assert_eq!(sections[0].preview_block().unwrap().index, 0);
        assert!(sections[1].preview_block().is_none());
        assert_eq!(sections[2].preview_block().unwrap().index, 1);
    }

    #[test]
    fn test_match_preview_level_must_agree() {
        let mut manager = SectionManager::from_source("# Notes");
        let layout = PreviewLayout::new(0, vec![heading_block(2, "Notes", 0.0, 20.0)], 30.0);
        manager.match_preview(&layout);
        assert!(manager.sections()[0].preview_block().is_none());
    }

    #[test]
    fn test_match_preview_empty_layout() {
        let mut manager = SectionManager::from_source(FIXTURE);
        manager.match_preview(&PreviewLayout::default());
        assert!(!manager.has_matches());
    }

    #[test]
    fn test_rematch_clears_previous_matches() {
        let mut manager = SectionManager::from_source(FIXTURE);
        manager.match_preview(&fixture_layout());
        assert!(manager.has_matches());

        manager.match_preview(&PreviewLayout::default());
        assert!(!manager.has_matches());
    }

    #[test]
    fn test_match_preview_strips_heading_markup() {
        // Section titles come from the scanner with markup removed, so a
        // bold heading still matches its rendered text content.
        let mut manager = SectionManager::from_source("# **Bold** Title\nbody");
        let layout = PreviewLayout::new(0, vec![heading_block(1, "Bold Title", 0.0, 20.0)], 30.0);
        manager.match_preview(&layout);
        assert_eq!(manager.sections()[0].preview_block().unwrap().index, 0);
    }
}
