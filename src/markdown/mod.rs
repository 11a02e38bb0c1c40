//! Markdown parsing module
//!
//! This module wraps the comrak library (CommonMark + GFM compatible) to
//! parse markdown into an owned AST with source line positions, and provides
//! the raw-source heading scanner used for section partitioning.

mod heading;
mod parser;

// Only export what's actually used by the app
pub use heading::{parse_atx_heading, strip_inline_markup, HeadingLine};
pub use parser::{
    parse_markdown, HeadingLevel, ListType, MarkdownDocument, MarkdownNode, MarkdownNodeType,
    TableAlignment,
};
