//! Per-line vertical metrics for the editor pane
//!
//! The scroll synchronizer maps between source lines and pixel offsets.
//! `LineMetrics` holds the content-space top offset of every logical line,
//! built each frame from the laid-out text, and answers both directions of
//! that mapping.

// Some constructors and accessors are only exercised by tests
#![allow(dead_code)]

/// Count logical lines in a text (empty text counts as one line).
pub fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        1
    } else {
        text.chars().filter(|&c| c == '\n').count() + 1
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LineMetrics
// ─────────────────────────────────────────────────────────────────────────────

/// Pixel offsets of logical lines within the editor's scrollable content.
///
/// `tops[i]` is the content-space y offset where line `i` begins. Lines are
/// half-open spans: line `i` covers `tops[i] .. tops[i + 1]`, and the last
/// line extends to `total_height`. With word wrap enabled a logical line can
/// cover several visual rows, so heights are not uniform.
#[derive(Debug, Clone, Default)]
pub struct LineMetrics {
    /// Content-space top offset of each logical line, non-decreasing
    tops: Vec<f32>,
    /// Total height of the scrollable content
    total_height: f32,
}

impl LineMetrics {
    /// Build metrics from per-line heights, starting at offset zero.
    pub fn from_heights(heights: &[f32]) -> Self {
        let mut tops = Vec::with_capacity(heights.len());
        let mut cursor = 0.0;
        for &height in heights {
            tops.push(cursor);
            cursor += height.max(0.0);
        }
        Self {
            tops,
            total_height: cursor,
        }
    }

    /// Build metrics where every line has the same height.
    pub fn uniform(line_count: usize, line_height: f32) -> Self {
        let mut tops = Vec::with_capacity(line_count);
        for i in 0..line_count {
            tops.push(i as f32 * line_height);
        }
        Self {
            tops,
            total_height: line_count as f32 * line_height,
        }
    }

    /// Build metrics from precomputed line tops and a total content height.
    ///
    /// Used by the editor widget, which reads row positions straight from
    /// the laid-out galley.
    pub fn from_tops(tops: Vec<f32>, total_height: f32) -> Self {
        let last = tops.last().copied().unwrap_or(0.0);
        Self {
            tops,
            total_height: total_height.max(last),
        }
    }

    /// Number of logical lines.
    pub fn line_count(&self) -> usize {
        self.tops.len()
    }

    /// Total height of the scrollable content.
    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    /// Content-space top offset of a line.
    ///
    /// `line == line_count()` is accepted and returns the total height, so
    /// a half-open line span `start..end` can be measured as
    /// `offset_of_line(start) .. offset_of_line(end)`.
    pub fn offset_of_line(&self, line: usize) -> f32 {
        self.tops.get(line).copied().unwrap_or(self.total_height)
    }

    /// The logical line containing a content-space offset.
    ///
    /// Offsets before the first line map to line 0, offsets past the end map
    /// to the last line. Non-finite offsets map to line 0.
    pub fn line_at_offset(&self, offset: f32) -> usize {
        if self.tops.is_empty() {
            return 0;
        }
        if !offset.is_finite() || offset <= 0.0 {
            return 0;
        }
        let idx = self.tops.partition_point(|&top| top <= offset);
        idx.saturating_sub(1).min(self.tops.len() - 1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // count_lines Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_count_lines_empty() {
        assert_eq!(count_lines(""), 1);
    }

    #[test]
    fn test_count_lines_single() {
        assert_eq!(count_lines("hello"), 1);
    }

    #[test]
    fn test_count_lines_multiple() {
        assert_eq!(count_lines("a\nb\nc"), 3);
    }

    #[test]
    fn test_count_lines_trailing_newline() {
        // Trailing newline opens an empty final line, just like the editor shows
        assert_eq!(count_lines("a\nb\n"), 3);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // LineMetrics Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_uniform_metrics() {
        let metrics = LineMetrics::uniform(5, 20.0);
        assert_eq!(metrics.line_count(), 5);
        assert_eq!(metrics.total_height(), 100.0);
        assert_eq!(metrics.offset_of_line(0), 0.0);
        assert_eq!(metrics.offset_of_line(3), 60.0);
    }

    #[test]
    fn test_offset_of_line_past_end_is_total_height() {
        let metrics = LineMetrics::uniform(5, 20.0);
        assert_eq!(metrics.offset_of_line(5), 100.0);
        assert_eq!(metrics.offset_of_line(100), 100.0);
    }

    #[test]
    fn test_from_heights_ragged() {
        let metrics = LineMetrics::from_heights(&[10.0, 30.0, 20.0]);
        assert_eq!(metrics.line_count(), 3);
        assert_eq!(metrics.offset_of_line(0), 0.0);
        assert_eq!(metrics.offset_of_line(1), 10.0);
        assert_eq!(metrics.offset_of_line(2), 40.0);
        assert_eq!(metrics.total_height(), 60.0);
    }

    #[test]
    fn test_from_tops_keeps_offsets() {
        let metrics = LineMetrics::from_tops(vec![4.0, 24.0, 44.0], 70.0);
        assert_eq!(metrics.line_count(), 3);
        assert_eq!(metrics.offset_of_line(0), 4.0);
        assert_eq!(metrics.offset_of_line(3), 70.0);
    }

    #[test]
    fn test_line_at_offset_boundaries() {
        let metrics = LineMetrics::uniform(5, 20.0);
        // An offset exactly at a line top lands on that line
        assert_eq!(metrics.line_at_offset(0.0), 0);
        assert_eq!(metrics.line_at_offset(20.0), 1);
        assert_eq!(metrics.line_at_offset(80.0), 4);
        // Mid-line offsets
        assert_eq!(metrics.line_at_offset(19.9), 0);
        assert_eq!(metrics.line_at_offset(50.0), 2);
    }

    #[test]
    fn test_line_at_offset_clamps() {
        let metrics = LineMetrics::uniform(5, 20.0);
        assert_eq!(metrics.line_at_offset(-10.0), 0);
        assert_eq!(metrics.line_at_offset(1000.0), 4);
    }

    #[test]
    fn test_line_at_offset_non_finite() {
        let metrics = LineMetrics::uniform(5, 20.0);
        assert_eq!(metrics.line_at_offset(f32::NAN), 0);
        assert_eq!(metrics.line_at_offset(f32::INFINITY), 0);
        assert_eq!(metrics.line_at_offset(f32::NEG_INFINITY), 0);
    }

    #[test]
    fn test_line_at_offset_before_first_top() {
        // Metrics that start below a top margin still map small offsets to line 0
        let metrics = LineMetrics::from_tops(vec![4.0, 24.0], 50.0);
        assert_eq!(metrics.line_at_offset(2.0), 0);
    }

    #[test]
    fn test_line_at_offset_ragged() {
        let metrics = LineMetrics::from_heights(&[10.0, 30.0, 20.0]);
        assert_eq!(metrics.line_at_offset(5.0), 0);
        assert_eq!(metrics.line_at_offset(10.0), 1);
        assert_eq!(metrics.line_at_offset(39.0), 1);
        assert_eq!(metrics.line_at_offset(40.0), 2);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = LineMetrics::default();
        assert_eq!(metrics.line_count(), 0);
        assert_eq!(metrics.total_height(), 0.0);
        assert_eq!(metrics.line_at_offset(50.0), 0);
        assert_eq!(metrics.offset_of_line(0), 0.0);
    }
}
