//! ATX heading detection for raw markdown source lines
//!
//! The section partitioner scans source lines with `parse_atx_heading` to
//! find section boundaries, and the preview matcher compares the returned
//! titles against rendered heading text. Titles are normalized by stripping
//! inline markup so that `# **Bold** Title` matches the rendered "Bold Title".

// ─────────────────────────────────────────────────────────────────────────────
// HeadingLine
// ─────────────────────────────────────────────────────────────────────────────

/// A heading found in a raw source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingLine {
    /// Heading level (1-6 for H1-H6)
    pub level: u8,
    /// The heading text with inline markup stripped
    pub title: String,
}

/// Parse an ATX-style heading from a source line.
///
/// Follows the CommonMark rules the renderer uses: one to six `#` characters
/// after at most three leading spaces, followed by a space, tab, or end of
/// line. An optional closing run of `#` characters is dropped only when
/// separated from the title by whitespace, so `# C#` keeps its hash.
///
/// Returns `Some(HeadingLine)` if the line is a heading, `None` otherwise.
pub fn parse_atx_heading(line: &str) -> Option<HeadingLine> {
    // Up to three leading spaces; four or more means an indented code block
    let mut rest = line;
    let mut leading = 0;
    while let Some(stripped) = rest.strip_prefix(' ') {
        rest = stripped;
        leading += 1;
        if leading > 3 {
            return None;
        }
    }

    if !rest.starts_with('#') {
        return None;
    }

    // Count the number of # characters
    let hash_count = rest.chars().take_while(|&c| c == '#').count();
    if hash_count > 6 {
        return None;
    }

    let after_hashes = &rest[hash_count..];

    // Must have a space or tab after the hashes (or be empty)
    if !after_hashes.is_empty()
        && !after_hashes.starts_with(' ')
        && !after_hashes.starts_with('\t')
    {
        return None;
    }

    let title = after_hashes.trim();

    // Optional closing sequence: trailing #s count only when separated from
    // the title by whitespace (or when the title is nothing but hashes)
    let stripped = title.trim_end_matches('#');
    let title = if stripped.len() != title.len()
        && (stripped.is_empty() || stripped.ends_with(' ') || stripped.ends_with('\t'))
    {
        stripped.trim_end()
    } else {
        title
    };

    Some(HeadingLine {
        level: hash_count as u8,
        title: strip_inline_markup(title),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Markup Stripping
// ─────────────────────────────────────────────────────────────────────────────

/// Strip common inline markdown formatting from text.
///
/// Removes: **bold**, *italic*, `code`, ~~strikethrough~~, [links](url),
/// ![images](url). The result is comparable with the plain text collected
/// from a rendered heading block.
pub fn strip_inline_markup(text: &str) -> String {
    let mut result = text.to_string();

    // Remove bold (**text** or __text__)
    result = remove_wrapper(&result, "**");
    result = remove_wrapper(&result, "__");

    // Remove italic (*text* or _text_) - careful with word_like_this,
    // only single * or _ at word boundaries count as wrappers
    result = remove_single_wrapper(&result, '*');
    result = remove_single_wrapper(&result, '_');

    // Remove inline code (`text`)
    result = remove_wrapper(&result, "`");

    // Remove strikethrough (~~text~~)
    result = remove_wrapper(&result, "~~");

    // Remove link syntax [text](url) -> text
    result = remove_links(&result);

    // Remove image syntax ![alt](url) -> alt
    result = remove_images(&result);

    result
}

/// Remove a symmetric wrapper like ** or ~~
fn remove_wrapper(text: &str, wrapper: &str) -> String {
    let mut result = text.to_string();
    let len = wrapper.len();

    while let Some(start) = result.find(wrapper) {
        if let Some(end) = result[start + len..].find(wrapper) {
            let end_pos = start + len + end;
            let inner = &result[start + len..end_pos];
            result = format!("{}{}{}", &result[..start], inner, &result[end_pos + len..]);
        } else {
            break;
        }
    }
    result
}

/// Remove single character wrapper like * or _
fn remove_single_wrapper(text: &str, wrapper: char) -> String {
    let mut result = String::new();
    let mut chars = text.chars().peekable();
    let mut in_wrapper = false;

    while let Some(c) = chars.next() {
        if c == wrapper {
            let prev_is_space = result
                .chars()
                .last()
                .map(|c| c.is_whitespace())
                .unwrap_or(true);
            let next_is_space = chars.peek().map(|c| c.is_whitespace()).unwrap_or(true);

            // Only treat as a wrapper at a word boundary: an opener follows
            // whitespace and precedes text, a closer follows text
            if !in_wrapper && (prev_is_space || result.is_empty()) && !next_is_space {
                in_wrapper = true;
            } else if in_wrapper && !prev_is_space {
                in_wrapper = false;
            } else {
                result.push(c);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Remove markdown links [text](url) -> text
fn remove_links(text: &str) -> String {
    let mut result = text.to_string();

    while let Some(start) = result.find('[') {
        if let Some(mid) = result[start..].find("](") {
            let mid_pos = start + mid;
            if let Some(end) = result[mid_pos + 2..].find(')') {
                let end_pos = mid_pos + 2 + end;
                let link_text = &result[start + 1..mid_pos];
                result = format!(
                    "{}{}{}",
                    &result[..start],
                    link_text,
                    &result[end_pos + 1..]
                );
                continue;
            }
        }
        break;
    }
    result
}

/// Remove markdown images ![alt](url) -> alt
fn remove_images(text: &str) -> String {
    let mut result = text.to_string();

    while let Some(start) = result.find("![") {
        if let Some(mid) = result[start..].find("](") {
            let mid_pos = start + mid;
            if let Some(end) = result[mid_pos + 2..].find(')') {
                let end_pos = mid_pos + 2 + end;
                let alt_text = &result[start + 2..mid_pos];
                result = format!("{}{}{}", &result[..start], alt_text, &result[end_pos + 1..]);
                continue;
            }
        }
        break;
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Heading Detection Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_simple_headings() {
        for level in 1..=6u8 {
            let line = format!("{} Title", "#".repeat(level as usize));
            let heading = parse_atx_heading(&line).unwrap();
            assert_eq!(heading.level, level);
            assert_eq!(heading.title, "Title");
        }
    }

    #[test]
    fn test_not_a_heading_no_space() {
        assert!(parse_atx_heading("#NotAHeading").is_none());
        assert!(parse_atx_heading("##also-not").is_none());
    }

    #[test]
    fn test_not_a_heading_seven_hashes() {
        assert!(parse_atx_heading("####### Too deep").is_none());
    }

    #[test]
    fn test_not_a_heading_plain_text() {
        assert!(parse_atx_heading("Just a paragraph").is_none());
        assert!(parse_atx_heading("").is_none());
    }

    #[test]
    fn test_leading_spaces() {
        // Up to three leading spaces are allowed
        assert!(parse_atx_heading(" # Heading").is_some());
        assert!(parse_atx_heading("   # Heading").is_some());
        // Four spaces means an indented code block
        assert!(parse_atx_heading("    # Heading").is_none());
    }

    #[test]
    fn test_empty_title() {
        let heading = parse_atx_heading("#").unwrap();
        assert_eq!(heading.level, 1);
        assert_eq!(heading.title, "");

        let heading = parse_atx_heading("## ").unwrap();
        assert_eq!(heading.level, 2);
        assert_eq!(heading.title, "");
    }

    #[test]
    fn test_tab_after_hashes() {
        let heading = parse_atx_heading("#\tTitle").unwrap();
        assert_eq!(heading.title, "Title");
    }

    #[test]
    fn test_closing_hashes_stripped() {
        let heading = parse_atx_heading("## Heading ##").unwrap();
        assert_eq!(heading.title, "Heading");

        let heading = parse_atx_heading("# Title #######").unwrap();
        assert_eq!(heading.title, "Title");
    }

    #[test]
    fn test_trailing_hash_without_space_kept() {
        // A hash glued to the title is part of the title
        let heading = parse_atx_heading("# C#").unwrap();
        assert_eq!(heading.title, "C#");
    }

    #[test]
    fn test_only_hashes_title() {
        let heading = parse_atx_heading("# ###").unwrap();
        assert_eq!(heading.title, "");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Markup Stripping Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_strip_bold() {
        let heading = parse_atx_heading("# **Bold** Heading").unwrap();
        assert_eq!(heading.title, "Bold Heading");
    }

    #[test]
    fn test_strip_italic() {
        let heading = parse_atx_heading("# *Italic* Heading").unwrap();
        assert_eq!(heading.title, "Italic Heading");
    }

    #[test]
    fn test_strip_inline_code() {
        let heading = parse_atx_heading("# Heading with `code`").unwrap();
        assert_eq!(heading.title, "Heading with code");
    }

    #[test]
    fn test_strip_strikethrough() {
        assert_eq!(strip_inline_markup("~~gone~~ text"), "gone text");
    }

    #[test]
    fn test_strip_link() {
        let heading = parse_atx_heading("# See [the docs](https://example.com)").unwrap();
        assert_eq!(heading.title, "See the docs");
    }

    #[test]
    fn test_strip_image() {
        assert_eq!(strip_inline_markup("![alt text](img.png)"), "alt text");
    }

    #[test]
    fn test_underscores_inside_words_kept() {
        assert_eq!(strip_inline_markup("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_inline_markup("Nothing to strip"), "Nothing to strip");
    }
}
