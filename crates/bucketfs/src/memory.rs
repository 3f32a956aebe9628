//! In-memory object store.
//!
//! [`InMemoryStore`] is a flat key space with S3-style listing semantics:
//! keys come back sorted, filtered by prefix, `page_size` at a time, with
//! an opaque continuation token between pages. It backs tests and the CLI.

// RwLock.read()/write().unwrap() only panics on lock poisoning (prior panic
// while holding lock). This is intentional - corrupted state should not propagate.
#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use md5::{Digest, Md5};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::metadata::ObjectMetadata;
use crate::store::{ListEntry, ListPage, ListingSource, WriteSink};

/// Default number of keys per listing page, as S3.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const TOKEN_PREFIX: &str = "after:";

/// In-memory object store.
///
/// # Example
///
/// ```rust
/// use bucketfs::{InMemoryStore, ListingSource, ObjectMetadata};
///
/// # #[tokio::main]
/// # async fn main() -> bucketfs::Result<()> {
/// let store = InMemoryStore::with_page_size(1);
/// store.insert(ObjectMetadata::new("a/1.txt"));
/// store.insert(ObjectMetadata::new("a/2.txt"));
///
/// let first = store.list("a/", None).await?;
/// assert_eq!(first.entries.len(), 1);
/// let second = store.list("a/", first.next_token.as_deref()).await?;
/// assert_eq!(second.entries[0].key, "a/2.txt");
/// assert!(second.next_token.is_none());
/// # Ok(())
/// # }
/// ```
pub struct InMemoryStore {
    objects: RwLock<BTreeMap<String, ObjectMetadata>>,
    page_size: usize,
    list_calls: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store with the default page size.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty store returning at most `page_size` keys per page.
    ///
    /// A page size of zero is treated as one.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Create a store holding `objects`.
    pub fn from_objects(objects: impl IntoIterator<Item = ObjectMetadata>, page_size: usize) -> Self {
        let store = Self::with_page_size(page_size);
        for metadata in objects {
            store.insert(metadata);
        }
        store
    }

    /// Add or replace an object without a body.
    pub fn insert(&self, metadata: ObjectMetadata) {
        let mut objects = self.objects.write().unwrap();
        objects.insert(metadata.key.clone(), metadata);
    }

    /// Metadata for `key`, if present.
    pub fn get(&self, key: &str) -> Option<ObjectMetadata> {
        self.objects.read().unwrap().get(key).cloned()
    }

    /// Snapshot of every object, in key order.
    pub fn objects(&self) -> Vec<ObjectMetadata> {
        self.objects.read().unwrap().values().cloned().collect()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    /// True if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `list` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ListingSource for InMemoryStore {
    async fn list(&self, prefix: &str, token: Option<&str>) -> Result<ListPage> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);

        let start = match token {
            Some(token) => {
                let after = token
                    .strip_prefix(TOKEN_PREFIX)
                    .ok_or_else(|| Error::Listing(format!("invalid continuation token: {token}")))?;
                Bound::Excluded(after.to_string())
            }
            None => Bound::Unbounded,
        };

        let objects = self.objects.read().unwrap();
        let mut matching = objects
            .range((start, Bound::Unbounded))
            .filter(|(key, _)| key.starts_with(prefix))
            .take(self.page_size + 1);

        let entries: Vec<ListEntry> = matching
            .by_ref()
            .take(self.page_size)
            .map(|(key, metadata)| ListEntry::new(key.clone(), metadata.clone()))
            .collect();
        let next_token = match (matching.next(), entries.last()) {
            (Some(_), Some(last)) => Some(format!("{TOKEN_PREFIX}{}", last.key)),
            _ => None,
        };

        Ok(ListPage {
            entries,
            next_token,
        })
    }
}

#[async_trait]
impl WriteSink for InMemoryStore {
    async fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        let digest = Md5::digest(body);
        let etag: String = digest.iter().map(|b| format!("{:02x}", b)).collect();

        let metadata = ObjectMetadata::new(key)
            .etag(format!("\"{etag}\""))
            .size(body.len() as u64)
            .last_modified(chrono::Utc::now());
        self.insert(metadata);
        Ok(())
    }
}
