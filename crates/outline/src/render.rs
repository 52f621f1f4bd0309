use std::fmt::Write as _;

use crate::parser::{Outline, Segment};
use crate::sanitize::Sanitizer;

pub const DEFAULT_PAGE_TITLE: &str = "RFP Categorization Tool";

impl Outline {
    /// The annotated document with every text segment and label passed through
    /// `sanitizer`. Only the generated `<h3>` tags remain as markup.
    pub fn render_body(&self, sanitizer: &dyn Sanitizer) -> String {
        let mut out = String::new();
        for segment in self.segments() {
            match segment {
                Segment::Text(text) => out.push_str(&sanitizer.sanitize(text)),
                Segment::Heading { anchor_id, label } => {
                    let _ = write!(
                        out,
                        "<h3 id=\"{}\">{}</h3>",
                        sanitizer.sanitize(anchor_id),
                        sanitizer.sanitize(label)
                    );
                }
            }
        }
        out
    }

    /// `<ul>` of same-document links, one per TOC entry. Empty string when the
    /// document has no headings.
    pub fn render_toc(&self, sanitizer: &dyn Sanitizer) -> String {
        if self.toc().is_empty() {
            return String::new();
        }
        let mut out = String::from("<ul>\n");
        for item in self.toc() {
            let _ = writeln!(
                out,
                "  <li><a href=\"{}\">{}</a></li>",
                sanitizer.sanitize(&item.href()),
                sanitizer.sanitize(&item.label)
            );
        }
        out.push_str("</ul>");
        out
    }
}

/// A standalone HTML page with the detailed sections and the table of contents.
pub fn render_page(title: &str, outline: &Outline, sanitizer: &dyn Sanitizer) -> String {
    let title = sanitizer.sanitize(title);
    let body = outline.render_body(sanitizer);
    let toc = outline.render_toc(sanitizer);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; margin: 2rem; display: flex; gap: 2rem; flex-wrap: wrap; }}
  h1 {{ width: 100%; }}
  .detailed-sections-container {{ flex: 3; min-width: 20rem; }}
  .detailed-sections {{ white-space: pre-wrap; line-height: 1.5; }}
  .toc-container {{ flex: 1; min-width: 12rem; }}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="detailed-sections-container">
<h2>Detailed Sections</h2>
<div class="detailed-sections">{body}</div>
</div>
<div class="toc-container">
<h2>Table of Contents</h2>
{toc}
</div>
</body>
</html>
"#
    )
}
