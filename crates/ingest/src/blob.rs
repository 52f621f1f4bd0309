use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

/// URI scheme prefix of image references handed out by [`BlobStore`].
pub const BLOB_SCHEME: &str = "blob:";

/// Original bytes of an uploaded image.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub content_type: String,
    pub bytes: Bytes,
}

/// In-memory store behind `blob:<uuid>` image references.
///
/// Entries live until released, or until a bounded store needs room: then
/// the oldest entry goes first. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    inner: Arc<RwLock<Blobs>>,
    capacity: Option<usize>,
}

#[derive(Debug, Default)]
struct Blobs {
    entries: HashMap<Uuid, StoredBlob>,
    /// Registration order, oldest first.
    order: VecDeque<Uuid>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `capacity` blobs (at least one).
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Store bytes and return the reference to embed in decoded content.
    pub fn register(&self, content_type: &str, bytes: Bytes) -> String {
        let id = Uuid::new_v4();
        let blob = StoredBlob {
            content_type: content_type.to_string(),
            bytes,
        };

        let mut blobs = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(capacity) = self.capacity {
            while blobs.entries.len() >= capacity {
                let Some(oldest) = blobs.order.pop_front() else {
                    break;
                };
                if blobs.entries.remove(&oldest).is_some() {
                    debug!(blob = %oldest, capacity, "evicted oldest blob");
                }
            }
        }
        blobs.entries.insert(id, blob);
        blobs.order.push_back(id);
        format!("{BLOB_SCHEME}{id}")
    }

    /// Look up a blob by its full reference (`blob:<uuid>`) or bare id.
    pub fn get(&self, reference: &str) -> Option<StoredBlob> {
        let id = parse_blob_uri(reference)?;
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(&id)
            .cloned()
    }

    /// Drop a blob. Returns whether it existed.
    pub fn release(&self, reference: &str) -> bool {
        let Some(id) = parse_blob_uri(reference) else {
            return false;
        };
        let mut blobs = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if blobs.entries.remove(&id).is_none() {
            return false;
        }
        blobs.order.retain(|kept| *kept != id);
        true
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse `blob:<uuid>` (or a bare uuid) into the blob id.
pub fn parse_blob_uri(reference: &str) -> Option<Uuid> {
    let raw = reference.strip_prefix(BLOB_SCHEME).unwrap_or(reference);
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_get_release() {
        let store = BlobStore::new();
        let uri = store.register("image/png", Bytes::from_static(b"png"));
        assert!(uri.starts_with("blob:"));
        assert_eq!(store.len(), 1);

        let blob = store.get(&uri).unwrap();
        assert_eq!(blob.content_type, "image/png");
        assert_eq!(&blob.bytes[..], b"png");

        assert!(store.release(&uri));
        assert!(!store.release(&uri));
        assert!(store.get(&uri).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_storage() {
        let store = BlobStore::new();
        let other = store.clone();
        let uri = store.register("image/jpeg", Bytes::from_static(b"jpg"));
        assert!(other.get(&uri).is_some());
    }

    #[test]
    fn bare_id_is_accepted() {
        let store = BlobStore::new();
        let uri = store.register("image/gif", Bytes::from_static(b"gif"));
        let bare = uri.trim_start_matches(BLOB_SCHEME);
        assert!(store.get(bare).is_some());
    }

    #[test]
    fn bounded_store_evicts_oldest_first() {
        let store = BlobStore::bounded(2);
        let first = store.register("image/png", Bytes::from_static(b"1"));
        let second = store.register("image/png", Bytes::from_static(b"2"));
        let third = store.register("image/png", Bytes::from_static(b"3"));

        assert_eq!(store.len(), 2);
        assert!(store.get(&first).is_none());
        assert!(store.get(&second).is_some());
        assert!(store.get(&third).is_some());
    }

    #[test]
    fn released_blob_frees_its_slot() {
        let store = BlobStore::bounded(2);
        let first = store.register("image/png", Bytes::from_static(b"1"));
        let second = store.register("image/png", Bytes::from_static(b"2"));
        assert!(store.release(&second));

        let third = store.register("image/png", Bytes::from_static(b"3"));
        assert!(store.get(&first).is_some());
        assert!(store.get(&third).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn garbage_reference_is_ignored() {
        let store = BlobStore::new();
        assert!(parse_blob_uri("blob:not-a-uuid").is_none());
        assert!(!store.release("hello world"));
    }
}
