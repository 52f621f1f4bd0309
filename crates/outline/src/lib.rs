//! Table of contents and anchored markup for categorized RFP text.
//!
//! The categorizer marks every section heading with a line prefix (`### ` by
//! default). [`HeadingParser`] finds those lines, numbers them, and produces an
//! [`Outline`]: the TOC entries plus the text with each heading line replaced
//! by an anchored `<h3>`. Rendering goes through a [`Sanitizer`] so model
//! output never reaches a page as raw markup.

pub mod marker;
pub mod parser;
pub mod render;
pub mod sanitize;

pub use marker::{HeadingMatch, HeadingMatcher, MarkerGrammar};
pub use parser::{anchor_id, HeadingParser, Outline, Segment};
pub use render::{render_page, DEFAULT_PAGE_TITLE};
pub use sanitize::{HtmlEscaper, Sanitizer};

#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("heading marker must not be empty")]
    EmptyMarker,
    #[error("invalid heading pattern: {0}")]
    Pattern(#[from] regex::Error),
}
