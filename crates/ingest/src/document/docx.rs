use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use super::ExtractionError;

/// Raw text of a Word document: every paragraph in body order, each followed
/// by a blank line. Table cells contribute their paragraphs row by row.
/// Formatting is discarded.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut out = String::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => push_paragraph(para, &mut out),
            DocumentChild::Table(table) => push_table(table, &mut out),
            _ => {}
        }
    }
    Ok(out)
}

fn push_paragraph(para: &Paragraph, out: &mut String) {
    for child in &para.children {
        push_paragraph_child(child, out);
    }
    out.push_str("\n\n");
}

fn push_paragraph_child(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(text) => out.push_str(&text.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                push_paragraph_child(inner, out);
            }
        }
        _ => {}
    }
}

fn push_table(table: &Table, out: &mut String) {
    for row in &table.rows {
        let TableChild::TableRow(tr) = row;
        for cell in &tr.cells {
            let TableRowChild::TableCell(tc) = cell;
            for content in &tc.children {
                match content {
                    TableCellContent::Paragraph(para) => push_paragraph(para, out),
                    TableCellContent::Table(nested) => push_table(nested, out),
                    _ => {}
                }
            }
        }
    }
}
