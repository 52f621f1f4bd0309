use serde::{Deserialize, Serialize};

/// Notice stored as the content of files whose type has no extractor.
pub const UNSUPPORTED_NOTICE: &str = "Unsupported file type";

/// How the `content` of a [`DecodedFile`] must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// `content` is an object reference (`blob:<uuid>`) to the original bytes.
    Image,
    Text,
    Pdf,
    /// Word-processing document (OOXML).
    Document,
    /// `content` is a human-readable notice, never file data.
    Unsupported,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Text => "text",
            FileKind::Pdf => "pdf",
            FileKind::Document => "document",
            FileKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-provided file after extraction.
///
/// `name` is the identity key inside a batch. Two files with the same name in
/// one batch are allowed, but name lookups always resolve to the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFile {
    pub kind: FileKind,
    pub content: String,
    pub name: String,
    /// Original byte count, for display only.
    pub size: u64,
}

impl DecodedFile {
    pub fn new(kind: FileKind, content: impl Into<String>, name: impl Into<String>, size: u64) -> Self {
        Self {
            kind,
            content: content.into(),
            name: name.into(),
            size,
        }
    }

    /// Size formatted the way the file list shows it, e.g. `"0.01 KB"`.
    pub fn display_size(&self) -> String {
        format!("{:.2} KB", self.size as f64 / 1024.0)
    }
}

/// One table-of-contents entry: a heading label and the anchor it links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocItem {
    pub label: String,
    pub anchor_id: String,
}

impl TocItem {
    /// Same-document link target, e.g. `#section-0`.
    pub fn href(&self) -> String {
        format!("#{}", self.anchor_id)
    }
}
