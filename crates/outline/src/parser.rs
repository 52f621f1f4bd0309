use std::sync::Arc;

use tracing::debug;

use rfpcat_core::config::OutlineConfig;
use rfpcat_core::TocItem;

use crate::marker::{HeadingMatcher, MarkerGrammar};
use crate::OutlineError;

/// Anchor id of the `index`-th heading of a document.
pub fn anchor_id(index: usize) -> String {
    format!("section-{index}")
}

/// Piece of a parsed document: plain text between headings, or a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Heading { anchor_id: String, label: String },
}

/// Result of parsing generated text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outline {
    toc: Vec<TocItem>,
    annotated: String,
    segments: Vec<Segment>,
}

impl Outline {
    /// TOC entries in document order.
    pub fn toc(&self) -> &[TocItem] {
        &self.toc
    }

    /// The input with every heading line replaced by `<h3 id="...">label</h3>`.
    ///
    /// Raw markup: labels and text are not escaped. Use
    /// [`Outline::render_body`] for anything that ends up in a page.
    pub fn annotated(&self) -> &str {
        &self.annotated
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Turns generated text into an [`Outline`]. Cheap to clone.
#[derive(Clone)]
pub struct HeadingParser {
    matcher: Arc<dyn HeadingMatcher>,
}

impl Default for HeadingParser {
    fn default() -> Self {
        Self::new(Arc::new(MarkerGrammar::default()))
    }
}

impl HeadingParser {
    pub fn new(matcher: Arc<dyn HeadingMatcher>) -> Self {
        Self { matcher }
    }

    pub fn with_marker(marker: &str) -> Result<Self, OutlineError> {
        Ok(Self::new(Arc::new(MarkerGrammar::new(marker)?)))
    }

    pub fn from_config(config: &OutlineConfig) -> Result<Self, OutlineError> {
        Self::with_marker(&config.heading_marker)
    }

    /// Parse `text`. Never fails; text without headings comes back unchanged
    /// with an empty TOC.
    pub fn parse(&self, text: &str) -> Outline {
        let headings = self.matcher.find_headings(text);

        let mut outline = Outline {
            toc: Vec::with_capacity(headings.len()),
            annotated: String::with_capacity(text.len() + headings.len() * 24),
            segments: Vec::with_capacity(headings.len() * 2 + 1),
        };

        // Each heading consumes the first occurrence of its line text at or
        // after the cursor, which may sit earlier than the match itself.
        let mut cursor = 0;
        for (index, heading) in headings.iter().enumerate() {
            let Some(offset) = text[cursor..].find(heading.line) else {
                continue;
            };
            let start = cursor + offset;
            push_text(&mut outline, &text[cursor..start]);

            let anchor = anchor_id(index);
            outline.annotated.push_str(&format!("<h3 id=\"{anchor}\">{}</h3>", heading.label));
            outline.toc.push(TocItem {
                label: heading.label.to_string(),
                anchor_id: anchor.clone(),
            });
            outline.segments.push(Segment::Heading {
                anchor_id: anchor,
                label: heading.label.to_string(),
            });
            cursor = start + heading.line.len();
        }
        push_text(&mut outline, &text[cursor..]);

        debug!(headings = outline.toc.len(), chars = text.len(), "parsed outline");
        outline
    }
}

fn push_text(outline: &mut Outline, text: &str) {
    if text.is_empty() {
        return;
    }
    outline.annotated.push_str(text);
    outline.segments.push(Segment::Text(text.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toc_pairs(outline: &Outline) -> Vec<(&str, &str)> {
        outline
            .toc()
            .iter()
            .map(|t| (t.label.as_str(), t.anchor_id.as_str()))
            .collect()
    }

    #[test]
    fn two_headings() {
        let outline = HeadingParser::default().parse("### Intro\nSome text\n### Scope\nMore text");
        assert_eq!(toc_pairs(&outline), [("Intro", "section-0"), ("Scope", "section-1")]);
        assert_eq!(
            outline.annotated(),
            "<h3 id=\"section-0\">Intro</h3>\nSome text\n<h3 id=\"section-1\">Scope</h3>\nMore text"
        );
    }

    #[test]
    fn no_headings_leaves_text_untouched() {
        let text = "Plain answer\nwith ## lesser markers\nand ###no space";
        let outline = HeadingParser::default().parse(text);
        assert!(outline.toc().is_empty());
        assert_eq!(outline.annotated(), text);
        assert_eq!(outline.segments(), [Segment::Text(text.to_string())]);
    }

    #[test]
    fn empty_input() {
        let outline = HeadingParser::default().parse("");
        assert!(outline.is_empty());
        assert_eq!(outline.annotated(), "");
    }

    #[test]
    fn identical_heading_lines_map_in_discovery_order() {
        let text = "### Notes\nfirst\n### Notes\nsecond";
        let outline = HeadingParser::default().parse(text);
        assert_eq!(toc_pairs(&outline), [("Notes", "section-0"), ("Notes", "section-1")]);
        assert_eq!(
            outline.annotated(),
            "<h3 id=\"section-0\">Notes</h3>\nfirst\n<h3 id=\"section-1\">Notes</h3>\nsecond"
        );
    }

    #[test]
    fn heading_text_earlier_in_body_takes_the_anchor() {
        let text = "See ### Budget below\n### Budget\n$10k";
        let outline = HeadingParser::default().parse(text);
        assert_eq!(toc_pairs(&outline), [("Budget", "section-0")]);
        assert_eq!(
            outline.annotated(),
            "See <h3 id=\"section-0\">Budget</h3> below\n### Budget\n$10k"
        );
    }

    #[test]
    fn earlier_occurrence_does_not_steal_a_later_heading() {
        let text = "x ### A\n### A\n### B\nend";
        let outline = HeadingParser::default().parse(text);
        assert_eq!(toc_pairs(&outline), [("A", "section-0"), ("B", "section-1")]);
        assert_eq!(
            outline.annotated(),
            "x <h3 id=\"section-0\">A</h3>\n### A\n<h3 id=\"section-1\">B</h3>\nend"
        );
    }

    #[test]
    fn every_anchor_appears_exactly_once() {
        let text: String = (0..12).map(|i| format!("### Part {i}\nbody {i}\n")).collect();
        let outline = HeadingParser::default().parse(&text);
        assert_eq!(outline.toc().len(), 12);
        for item in outline.toc() {
            let needle = format!("id=\"{}\"", item.anchor_id);
            assert_eq!(outline.annotated().matches(&needle).count(), 1, "{needle}");
        }
    }

    #[test]
    fn segments_alternate_text_and_headings() {
        let outline = HeadingParser::default().parse("Preamble\n### A\nx");
        assert_eq!(
            outline.segments(),
            [
                Segment::Text("Preamble\n".into()),
                Segment::Heading {
                    anchor_id: "section-0".into(),
                    label: "A".into()
                },
                Segment::Text("\nx".into()),
            ]
        );
    }

    #[test]
    fn configured_marker() {
        let config = OutlineConfig {
            heading_marker: "##".into(),
        };
        let outline = HeadingParser::from_config(&config).unwrap().parse("## Scope\n### Not this");
        assert_eq!(toc_pairs(&outline), [("Scope", "section-0")]);
    }
}
