use std::ops::Range;

use regex::Regex;

use rfpcat_core::config::DEFAULT_HEADING_MARKER;

use crate::OutlineError;

/// One heading line found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch<'a> {
    /// Byte range of the whole heading line, line terminator excluded.
    pub span: Range<usize>,
    pub line: &'a str,
    /// The line with the marker and its following whitespace char removed.
    pub label: &'a str,
}

/// Recognizes section headings in generated text.
pub trait HeadingMatcher: Send + Sync {
    /// All heading lines in document order. Spans never overlap.
    fn find_headings<'a>(&self, text: &'a str) -> Vec<HeadingMatch<'a>>;
}

/// Line-prefix heading grammar.
///
/// A heading is a line that starts with the marker, then exactly one
/// whitespace char that is not a line break, then at least one more char
/// before the end of the line.
#[derive(Debug, Clone)]
pub struct MarkerGrammar {
    marker: String,
    pattern: Regex,
}

impl MarkerGrammar {
    pub fn new(marker: &str) -> Result<Self, OutlineError> {
        if marker.is_empty() {
            return Err(OutlineError::EmptyMarker);
        }
        let pattern = Regex::new(&format!(
            r"(?m)^{}[^\S\r\n]([^\r\n]+)",
            regex::escape(marker)
        ))?;
        Ok(Self {
            marker: marker.to_string(),
            pattern,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for MarkerGrammar {
    fn default() -> Self {
        Self {
            marker: DEFAULT_HEADING_MARKER.to_string(),
            pattern: Regex::new(r"(?m)^###[^\S\r\n]([^\r\n]+)").expect("static heading pattern"),
        }
    }
}

impl HeadingMatcher for MarkerGrammar {
    fn find_headings<'a>(&self, text: &'a str) -> Vec<HeadingMatch<'a>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let line = caps.get(0)?;
                let label = caps.get(1)?;
                Some(HeadingMatch {
                    span: line.range(),
                    line: line.as_str(),
                    label: label.as_str(),
                })
            })
            .collect()
    }
}
