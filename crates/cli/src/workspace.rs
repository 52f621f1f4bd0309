//! The session controller: pasted text, the current file batch with its
//! selection, and the outline of the last successful submission.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use rfpcat_core::DecodedFile;
use rfpcat_ingest::{BatchTicket, FileRegistry, FormatDecoder, SelectionSink};
use rfpcat_llm::{CategorizeError, Categorizer};
use rfpcat_outline::{render_page, HeadingParser, Outline, Sanitizer};

/// Keeps the most recent selection pushed by the registry.
#[derive(Debug, Default)]
pub struct SelectionBuffer {
    contents: Vec<String>,
}

impl SelectionBuffer {
    pub fn contents(&self) -> &[String] {
        &self.contents
    }
}

impl SelectionSink for SelectionBuffer {
    fn selection_changed(&mut self, contents: &[String]) {
        self.contents = contents.to_vec();
    }
}

pub struct Workspace {
    registry: FileRegistry<SelectionBuffer>,
    decoder: FormatDecoder,
    parser: HeadingParser,
    pasted: Option<String>,
    outline: Option<Outline>,
}

impl Workspace {
    pub fn new(decoder: FormatDecoder, parser: HeadingParser) -> Self {
        let registry =
            FileRegistry::new(SelectionBuffer::default()).with_blob_store(decoder.blobs().clone());
        Self {
            registry,
            decoder,
            parser,
            pasted: None,
            outline: None,
        }
    }

    /// Decode `paths` as one batch and make it the current batch.
    pub async fn load_paths(&mut self, paths: &[PathBuf]) -> bool {
        let ticket = self.begin_load();
        let decoded = self.decoder.decode_paths(paths).await;
        self.finish_load(ticket, decoded)
    }

    /// Start a load that is decoded outside the workspace, e.g. with a clone
    /// of [`Workspace::decoder`]. Loads begun earlier become stale.
    pub fn begin_load(&mut self) -> BatchTicket {
        self.registry.begin_batch()
    }

    /// Install a decoded batch. Returns `false`, leaving the current batch
    /// untouched, if a newer load was begun after `ticket`.
    pub fn finish_load(&mut self, ticket: BatchTicket, decoded: Vec<DecodedFile>) -> bool {
        let committed = self.registry.commit_batch(ticket, decoded);
        if !committed {
            debug!("discarded a batch superseded by a newer load");
        }
        committed
    }

    pub fn decoder(&self) -> &FormatDecoder {
        &self.decoder
    }

    pub fn toggle(&mut self, name: &str) {
        self.registry.toggle(name);
    }

    /// Select `name` unless it is already selected.
    pub fn select(&mut self, name: &str) {
        if !self.registry.is_selected(name) {
            self.registry.toggle(name);
        }
    }

    /// Select every file of the batch in batch order.
    pub fn select_all(&mut self) {
        let names: Vec<String> = self.registry.files().iter().map(|f| f.name.clone()).collect();
        for name in names {
            self.select(&name);
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.registry.remove(name);
    }

    pub fn files(&self) -> &[DecodedFile] {
        self.registry.files()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.registry.is_selected(name)
    }

    /// The selection as last emitted by the registry.
    pub fn selection(&self) -> &[String] {
        self.registry.sink().contents()
    }

    pub fn set_pasted(&mut self, text: impl Into<String>) {
        self.pasted = Some(text.into());
    }

    pub fn clear_pasted(&mut self) {
        self.pasted = None;
    }

    pub fn pasted(&self) -> Option<&str> {
        self.pasted.as_deref()
    }

    /// Pasted text when present, otherwise the selected contents joined by
    /// blank lines.
    pub fn submission_text(&self) -> String {
        match self.pasted.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => self.selection().join("\n\n"),
        }
    }

    /// Categorize the submission text once and keep the resulting outline.
    ///
    /// On failure the previous outline is left in place.
    pub async fn submit(&mut self, categorizer: &dyn Categorizer) -> Result<&Outline, CategorizeError> {
        let text = self.submission_text();
        if text.trim().is_empty() {
            return Err(CategorizeError::EmptyInput);
        }

        debug!(chars = text.len(), "submitting RFP text");
        let categorized = match categorizer.categorize(&text).await {
            Ok(categorized) => categorized,
            Err(e) => {
                warn!(error = %e, "categorization failed");
                return Err(e);
            }
        };

        let outline = self.parser.parse(&categorized);
        info!(sections = outline.toc().len(), "RFP categorized");
        Ok(self.outline.insert(outline))
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    /// Render the last outline as a standalone page.
    pub fn render_page(&self, title: &str, sanitizer: &dyn Sanitizer) -> Option<String> {
        self.outline
            .as_ref()
            .map(|outline| render_page(title, outline, sanitizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rfpcat_core::FileKind;
    use rfpcat_llm::LlmError;
    use rfpcat_outline::HtmlEscaper;

    /// Prefixes a heading, or fails every call.
    #[derive(Default)]
    struct StubCategorizer {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Categorizer for StubCategorizer {
        async fn categorize(&self, rfp_text: &str) -> Result<String, CategorizeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CategorizeError::Llm(LlmError::ApiError {
                    status: 500,
                    body: "boom".into(),
                }));
            }
            Ok(format!("### Intro\n{rfp_text}\n### Scope\nMore text"))
        }
    }

    fn workspace() -> Workspace {
        Workspace::new(FormatDecoder::default(), HeadingParser::default())
    }

    fn text_file(name: &str, content: &str) -> DecodedFile {
        DecodedFile::new(FileKind::Text, content, name, content.len() as u64)
    }

    #[tokio::test]
    async fn loads_and_toggles_a_text_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello world").unwrap();

        let mut ws = workspace();
        assert!(ws.load_paths(&[path]).await);
        assert_eq!(ws.files(), &[text_file("a.txt", "hello world")]);
        assert!(ws.selection().is_empty());

        ws.toggle("a.txt");
        assert_eq!(ws.selection(), ["hello world"]);
        ws.toggle("a.txt");
        assert!(ws.selection().is_empty());
    }

    #[tokio::test]
    async fn superseded_load_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("old.txt");
        let newer = dir.path().join("new.txt");
        std::fs::write(&older, "old").unwrap();
        std::fs::write(&newer, "new").unwrap();

        let mut ws = workspace();
        let first = ws.begin_load();
        let second = ws.begin_load();
        let decoder = ws.decoder().clone();
        let newer_batch = decoder.decode_paths(&[newer]).await;
        let older_batch = decoder.decode_paths(&[older]).await;

        assert!(ws.finish_load(second, newer_batch));
        assert!(!ws.finish_load(first, older_batch));
        assert_eq!(ws.files(), &[text_file("new.txt", "new")]);
    }

    #[test]
    fn submission_prefers_pasted_text() {
        let mut ws = workspace();
        ws.registry.load_batch(vec![text_file("a.txt", "alpha"), text_file("b.txt", "beta")]);
        ws.toggle("b.txt");
        ws.toggle("a.txt");
        assert_eq!(ws.submission_text(), "beta\n\nalpha");

        ws.set_pasted("pasted RFP");
        assert_eq!(ws.submission_text(), "pasted RFP");

        ws.set_pasted("   ");
        assert_eq!(ws.submission_text(), "beta\n\nalpha");

        ws.clear_pasted();
        assert!(ws.pasted().is_none());
    }

    #[test]
    fn select_all_keeps_batch_order_and_existing_picks() {
        let mut ws = workspace();
        ws.registry.load_batch(vec![text_file("a.txt", "alpha"), text_file("b.txt", "beta")]);
        ws.select("b.txt");
        ws.select_all();
        assert_eq!(ws.selection(), ["beta", "alpha"]);
        assert!(ws.is_selected("a.txt"));
    }

    #[tokio::test]
    async fn submit_builds_the_outline() {
        let mut ws = workspace();
        ws.set_pasted("Some text");
        let categorizer = StubCategorizer::default();

        let outline = ws.submit(&categorizer).await.unwrap();
        let labels: Vec<&str> = outline.toc().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["Intro", "Scope"]);

        let page = ws.render_page("RFP", &HtmlEscaper).unwrap();
        assert!(page.contains("<h3 id=\"section-1\">Scope</h3>"));
    }

    #[tokio::test]
    async fn empty_submission_skips_the_categorizer() {
        let mut ws = workspace();
        let categorizer = StubCategorizer::default();
        let err = ws.submit(&categorizer).await.unwrap_err();
        assert!(matches!(err, CategorizeError::EmptyInput));
        assert_eq!(categorizer.calls.load(Ordering::SeqCst), 0);
        assert!(ws.render_page("RFP", &HtmlEscaper).is_none());
    }

    #[tokio::test]
    async fn failed_submission_keeps_previous_outline() {
        let mut ws = workspace();
        ws.set_pasted("first");
        ws.submit(&StubCategorizer::default()).await.unwrap();

        let failing = StubCategorizer {
            fail: true,
            ..Default::default()
        };
        ws.set_pasted("second");
        assert!(ws.submit(&failing).await.is_err());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert!(ws.outline().unwrap().annotated().contains("first"));
    }
}
