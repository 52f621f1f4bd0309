//! The current batch of decoded files and the user's ordered selection.
//!
//! Every change to the batch or the selection pushes the list of selected
//! contents to a [`SelectionSink`]. The selection is always a subset of the
//! batch's names.

use rfpcat_core::{DecodedFile, FileKind};
use tracing::debug;

use crate::blob::BlobStore;

/// Receives the selected contents, in selection order, after every change.
pub trait SelectionSink {
    fn selection_changed(&mut self, contents: &[String]);
}

impl<F> SelectionSink for F
where
    F: FnMut(&[String]),
{
    fn selection_changed(&mut self, contents: &[String]) {
        self(contents)
    }
}

/// Identifies one batch load. Only the most recently issued ticket can commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BatchTicket(u64);

pub struct FileRegistry<S> {
    files: Vec<DecodedFile>,
    selected: Vec<String>,
    sink: S,
    blobs: Option<BlobStore>,
    generation: u64,
}

impl<S: SelectionSink> FileRegistry<S> {
    pub fn new(sink: S) -> Self {
        Self {
            files: Vec::new(),
            selected: Vec::new(),
            sink,
            blobs: None,
            generation: 0,
        }
    }

    /// Release image blobs through `blobs` whenever their file leaves the batch.
    pub fn with_blob_store(mut self, blobs: BlobStore) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Replace the whole batch.
    ///
    /// Names that were selected and still exist stay selected, in their
    /// previous order. Always emits.
    pub fn load_batch(&mut self, files: Vec<DecodedFile>) {
        let ticket = self.begin_batch();
        self.commit_batch(ticket, files);
    }

    /// Start a batch load whose decoding happens elsewhere. Any ticket issued
    /// earlier becomes stale.
    pub fn begin_batch(&mut self) -> BatchTicket {
        self.generation += 1;
        BatchTicket(self.generation)
    }

    /// Install a decoded batch if `ticket` is still the latest one.
    ///
    /// A stale batch is dropped (its image blobs released) and nothing is
    /// emitted; returns `false` in that case.
    pub fn commit_batch(&mut self, ticket: BatchTicket, files: Vec<DecodedFile>) -> bool {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "dropping stale batch");
            self.release_images(&files);
            return false;
        }

        let replaced = std::mem::replace(&mut self.files, files);
        let leaving: Vec<DecodedFile> = replaced
            .into_iter()
            .filter(|old| {
                !self
                    .files
                    .iter()
                    .any(|new| new.kind == FileKind::Image && new.content == old.content)
            })
            .collect();
        self.release_images(&leaving);

        let files = &self.files;
        self.selected.retain(|name| files.iter().any(|f| &f.name == name));

        debug!(files = self.files.len(), selected = self.selected.len(), "batch loaded");
        self.emit();
        true
    }

    /// Flip `name` in or out of the selection. Names outside the batch are
    /// ignored without emitting.
    pub fn toggle(&mut self, name: &str) {
        if self.find(name).is_none() {
            return;
        }
        if let Some(pos) = self.selected.iter().position(|n| n == name) {
            self.selected.remove(pos);
        } else {
            self.selected.push(name.to_string());
        }
        self.emit();
    }

    /// Drop every file called `name` from the batch and the selection.
    ///
    /// Emits the remaining selection even when `name` was absent.
    pub fn remove(&mut self, name: &str) {
        let (removed, kept): (Vec<DecodedFile>, Vec<DecodedFile>) =
            std::mem::take(&mut self.files)
                .into_iter()
                .partition(|f| f.name == name);
        self.files = kept;
        self.release_images(&removed);
        self.selected.retain(|n| n != name);
        self.emit();
    }

    pub fn files(&self) -> &[DecodedFile] {
        &self.files
    }

    pub fn selected_names(&self) -> &[String] {
        &self.selected
    }

    /// Contents of the selected files in selection order. A name shared by
    /// several files resolves to the first of them.
    pub fn selected_contents(&self) -> Vec<String> {
        self.selected
            .iter()
            .filter_map(|name| self.find(name))
            .map(|f| f.content.clone())
            .collect()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|n| n == name)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn find(&self, name: &str) -> Option<&DecodedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    fn emit(&mut self) {
        let contents = self.selected_contents();
        self.sink.selection_changed(&contents);
    }

    fn release_images(&self, files: &[DecodedFile]) {
        let Some(blobs) = &self.blobs else {
            return;
        };
        for file in files.iter().filter(|f| f.kind == FileKind::Image) {
            blobs.release(&file.content);
        }
    }
}
