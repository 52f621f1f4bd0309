use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use super::ExtractionError;

/// Extract the text of a PDF, page by page.
///
/// Every text-showing operator on a page yields one run. A page's text is its
/// runs joined with a single space, and each page is followed by one space.
/// When the content streams yield no runs at all (unusual encodings, broken
/// streams) the text layer from `pdf-extract` is used instead.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    let pages = document.get_pages();

    let page_runs: Vec<Vec<String>> = pages
        .values()
        .map(|page_id| page_text_runs(&document, *page_id))
        .collect();

    if page_runs.iter().all(Vec::is_empty) && !page_runs.is_empty() {
        if let Some(fallback) = fallback_runs(bytes) {
            debug!(pages = fallback.len(), "no text operators found, using pdf-extract text layer");
            return Ok(join_pages(&fallback));
        }
    }

    Ok(join_pages(&page_runs))
}

/// Join per-page runs the way the extracted text is laid out: runs separated
/// by one space, every page terminated by one space.
fn join_pages<S: AsRef<str>>(pages: &[Vec<S>]) -> String {
    let mut out = String::new();
    for runs in pages {
        for (i, run) in runs.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(run.as_ref());
        }
        out.push(' ');
    }
    out
}

fn page_text_runs(document: &Document, page_id: ObjectId) -> Vec<String> {
    let Ok(raw) = document.get_page_content(page_id) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&raw) else {
        return Vec::new();
    };
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut runs = Vec::new();
    let mut encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font) = operation.operands.first().and_then(|o| o.as_name().ok()) {
                    encoding = encodings.get(font).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let mut run = String::new();
                collect_text(&mut run, encoding, &operation.operands);
                if !run.is_empty() {
                    runs.push(run);
                }
            }
            _ => {}
        }
    }
    runs
}

fn collect_text(run: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => run.push_str(&Document::decode_text(encoding, bytes)),
            Object::Array(items) => collect_text(run, encoding, items),
            // Large negative kerning inside TJ is a word gap.
            Object::Integer(adjust) if *adjust < -100 => run.push(' '),
            Object::Real(adjust) if *adjust < -100.0 => run.push(' '),
            _ => {}
        }
    }
}

/// Page texts from `pdf-extract`. `None` when that library finds nothing
/// either.
fn fallback_runs(bytes: &[u8]) -> Option<Vec<Vec<String>>> {
    let text = pdf_extract::extract_text_from_mem(bytes).ok()?;
    split_text_layer(&text)
}

/// Split a plain text layer on form feeds into pages. Each page's non-blank
/// lines become its runs and a blank trailing page is dropped.
fn split_text_layer(text: &str) -> Option<Vec<Vec<String>>> {
    if text.trim().is_empty() {
        return None;
    }

    let mut pages: Vec<&str> = text.split('\x0C').collect();
    if pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }

    Some(
        pages
            .into_iter()
            .map(|page| {
                page.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect(),
    )
}
