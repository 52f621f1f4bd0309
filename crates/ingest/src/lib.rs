pub mod blob;
pub mod document;
pub mod registry;

pub use blob::{parse_blob_uri, BlobStore, StoredBlob};
pub use document::{classify, ExtractionError, FormatDecoder, RawFile};
pub use registry::{BatchTicket, FileRegistry, SelectionSink};
