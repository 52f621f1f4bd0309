//! Multi-format text extraction.
//!
//! Routes each uploaded file to an extractor based on its declared content
//! type. Every file decodes independently: a failing extractor turns that
//! one file into an `unsupported` result and never aborts its siblings.
//!
//! | Content type | Kind | Content |
//! |--------------|------|---------|
//! | `image/*` | image | `blob:<uuid>` reference into the [`BlobStore`] |
//! | `text/*` | text | UTF-8 text, verbatim |
//! | `application/pdf` | pdf | page texts, runs space-joined |
//! | OOXML word-processing | document | raw paragraph text |
//! | anything else | unsupported | fixed notice |

mod docx;
mod pdf;
mod txt;

use std::path::{Path, PathBuf};
use std::time::Instant;

use bytes::Bytes;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use rfpcat_core::{DecodedFile, FileKind, UNSUPPORTED_NOTICE};

use crate::blob::BlobStore;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("Word document extraction failed: {0}")]
    Docx(String),
    #[error("extraction task failed: {0}")]
    Task(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file as received from the user: name, declared type and raw bytes.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing the content type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name(path), guess_content_type(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Content type for a path, by extension. Unknown extensions map to
/// `application/octet-stream`, which decodes as unsupported.
pub fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Map a declared content type to the kind of extraction it gets.
///
/// Parameters (`; charset=utf-8`) are ignored and the comparison is
/// case-insensitive. Priority: image, text, PDF, Word, unsupported.
pub fn classify(content_type: &str) -> FileKind {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();

    if mime.starts_with("image/") {
        FileKind::Image
    } else if mime.starts_with("text/") {
        FileKind::Text
    } else if mime == PDF_MIME {
        FileKind::Pdf
    } else if mime == DOCX_MIME {
        FileKind::Document
    } else {
        FileKind::Unsupported
    }
}

/// Decodes uploaded files into [`DecodedFile`]s.
///
/// Cheap to clone; clones share the same [`BlobStore`].
#[derive(Clone, Default)]
pub struct FormatDecoder {
    blobs: BlobStore,
}

impl FormatDecoder {
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Decode one file. Never fails: extraction errors come back as an
    /// `unsupported` file whose content explains what went wrong.
    pub async fn decode(&self, file: RawFile) -> DecodedFile {
        let kind = classify(&file.content_type);
        let name = file.name.clone();
        let size = file.size();

        match self.extract(kind, file).await {
            Ok(content) => {
                debug!(file = %name, %kind, size, chars = content.len(), "decoded file");
                DecodedFile::new(kind, content, name, size)
            }
            Err(e) => {
                warn!(file = %name, %kind, error = %e, "extraction failed, marking file unsupported");
                let notice = format!("Could not extract text from {name}: {e}");
                DecodedFile::new(FileKind::Unsupported, notice, name, size)
            }
        }
    }

    async fn extract(&self, kind: FileKind, file: RawFile) -> Result<String, ExtractionError> {
        match kind {
            FileKind::Image => Ok(self.blobs.register(&file.content_type, file.bytes)),
            FileKind::Text => Ok(txt::extract_txt(&file.bytes)),
            FileKind::Pdf => {
                let bytes = file.bytes;
                run_blocking(move || pdf::extract_pdf(&bytes)).await
            }
            FileKind::Document => {
                let bytes = file.bytes;
                run_blocking(move || docx::extract_docx(&bytes)).await
            }
            FileKind::Unsupported => Ok(UNSUPPORTED_NOTICE.to_string()),
        }
    }

    /// Decode a whole batch concurrently and wait for every file.
    ///
    /// Output order matches input order, whatever order the files finish in.
    pub async fn decode_batch(&self, files: Vec<RawFile>) -> Vec<DecodedFile> {
        let start = Instant::now();
        let count = files.len();

        let decoded = join_all(files.into_iter().map(|file| self.decode(file))).await;

        let unsupported = decoded
            .iter()
            .filter(|f| f.kind == FileKind::Unsupported)
            .count();
        info!(
            files = count,
            unsupported,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "decoded batch"
        );
        decoded
    }

    /// Read and decode files from disk as one batch. A file that cannot be
    /// read becomes an `unsupported` entry like any other extraction failure.
    pub async fn decode_paths(&self, paths: &[PathBuf]) -> Vec<DecodedFile> {
        let start = Instant::now();
        let decoded = join_all(paths.iter().map(|path| self.decode_path(path))).await;
        info!(
            files = paths.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "decoded batch from disk"
        );
        decoded
    }

    async fn decode_path(&self, path: &Path) -> DecodedFile {
        match RawFile::from_path(path).await {
            Ok(file) => self.decode(file).await,
            Err(e) => {
                let name = file_name(path);
                warn!(path = %path.display(), error = %e, "failed to read file");
                let notice = format!("Could not extract text from {name}: {e}");
                DecodedFile::new(FileKind::Unsupported, notice, name, 0)
            }
        }
    }
}

/// Run a CPU-bound extractor on the blocking pool. A panicking extractor
/// surfaces as [`ExtractionError::Task`].
async fn run_blocking<F>(extract: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError> + Send + 'static,
{
    tokio::task::spawn_blocking(extract)
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_declared_type() {
        assert_eq!(classify("image/png"), FileKind::Image);
        assert_eq!(classify("image/svg+xml"), FileKind::Image);
        assert_eq!(classify("text/plain"), FileKind::Text);
        assert_eq!(classify("text/markdown; charset=utf-8"), FileKind::Text);
        assert_eq!(classify("Application/PDF"), FileKind::Pdf);
        assert_eq!(classify(DOCX_MIME), FileKind::Document);
        assert_eq!(classify("application/msword"), FileKind::Unsupported);
        assert_eq!(classify("application/zip"), FileKind::Unsupported);
        assert_eq!(classify(""), FileKind::Unsupported);
    }

    #[test]
    fn guesses_content_type_from_extension() {
        assert_eq!(guess_content_type(Path::new("a.txt")), "text/plain");
        assert_eq!(guess_content_type(Path::new("scan.PDF")), PDF_MIME);
        assert_eq!(guess_content_type(Path::new("rfp.docx")), DOCX_MIME);
        assert_eq!(guess_content_type(Path::new("blob.unknownext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn text_file_decodes_verbatim() {
        let decoder = FormatDecoder::default();
        let file = decoder
            .decode(RawFile::new("a.txt", "text/plain", "hello world"))
            .await;
        assert_eq!(file, DecodedFile::new(FileKind::Text, "hello world", "a.txt", 11));
    }

    #[tokio::test]
    async fn unknown_type_gets_fixed_notice() {
        let decoder = FormatDecoder::default();
        let file = decoder
            .decode(RawFile::new("data.bin", "application/octet-stream", vec![0u8, 1, 2]))
            .await;
        assert_eq!(file.kind, FileKind::Unsupported);
        assert_eq!(file.content, UNSUPPORTED_NOTICE);
        assert_eq!(file.size, 3);
    }

    #[tokio::test]
    async fn image_becomes_blob_reference() {
        let decoder = FormatDecoder::default();
        let file = decoder
            .decode(RawFile::new("logo.png", "image/png", vec![0x89u8, b'P', b'N', b'G']))
            .await;
        assert_eq!(file.kind, FileKind::Image);
        assert!(file.content.starts_with("blob:"));
        let stored = decoder.blobs().get(&file.content).expect("blob registered");
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(&stored.bytes[..], &[0x89u8, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn pdf_upload_decodes_page_text() {
        let decoder = FormatDecoder::default();
        let bytes = pdf::tests::build_pdf(&[vec!["Hello", "World"], vec!["Page two"]]);
        let size = bytes.len() as u64;
        let file = decoder.decode(RawFile::new("rfp.pdf", PDF_MIME, bytes)).await;
        assert_eq!(file, DecodedFile::new(FileKind::Pdf, "Hello World Page two ", "rfp.pdf", size));
    }

    #[tokio::test]
    async fn docx_upload_decodes_alongside_text() {
        use docx::tests::{pack, para};

        let decoder = FormatDecoder::default();
        let bytes = pack(docx_rs::Docx::new().add_paragraph(para("Project Overview")));
        let batch = decoder
            .decode_batch(vec![
                RawFile::new("rfp.docx", DOCX_MIME, bytes),
                RawFile::new("notes.txt", "text/plain", "see attached"),
            ])
            .await;
        assert_eq!(batch[0].kind, FileKind::Document);
        assert_eq!(batch[0].content, "Project Overview\n\n");
        assert_eq!(batch[1].kind, FileKind::Text);
    }

    #[tokio::test]
    async fn malformed_pdf_is_isolated_from_siblings() {
        let decoder = FormatDecoder::default();
        let batch = decoder
            .decode_batch(vec![
                RawFile::new("broken.pdf", PDF_MIME, "%PDF-1.4 definitely not a pdf"),
                RawFile::new("notes.txt", "text/plain", "still here"),
                RawFile::new("broken.docx", DOCX_MIME, "not a zip archive"),
            ])
            .await;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].kind, FileKind::Unsupported);
        assert!(batch[0].content.contains("broken.pdf"));
        assert_eq!(batch[1], DecodedFile::new(FileKind::Text, "still here", "notes.txt", 10));
        assert_eq!(batch[2].kind, FileKind::Unsupported);
        assert!(batch[2].content.starts_with("Could not extract text from broken.docx"));
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let decoder = FormatDecoder::default();
        let files = (0..8)
            .map(|i| RawFile::new(format!("f{i}.txt"), "text/plain", format!("body {i}")))
            .collect();
        let batch = decoder.decode_batch(files).await;
        let names: Vec<_> = batch.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["f0.txt", "f1.txt", "f2.txt", "f3.txt", "f4.txt", "f5.txt", "f6.txt", "f7.txt"]);
    }

    #[tokio::test]
    async fn unreadable_path_becomes_unsupported() {
        let decoder = FormatDecoder::default();
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.txt");
        std::fs::write(&good, "hello world").unwrap();
        let missing = dir.path().join("missing.txt");

        let batch = decoder.decode_paths(&[good, missing]).await;
        assert_eq!(batch[0], DecodedFile::new(FileKind::Text, "hello world", "a.txt", 11));
        assert_eq!(batch[1].kind, FileKind::Unsupported);
        assert_eq!(batch[1].name, "missing.txt");
    }
}
