//! Object-store collaborator traits.
//!
//! Bucketfs never talks to a store directly. It consumes two narrow
//! capabilities:
//!
//! - [`ListingSource`]: paginated "list objects under prefix"
//! - [`WriteSink`]: "put object"
//!
//! Anything implementing both is an [`ObjectStore`] and can back a
//! [`BucketFs`](crate::BucketFs). Retries, backoff and timeouts belong to the
//! implementation; errors it returns are propagated unchanged.

use async_trait::async_trait;

use crate::error::Result;
use crate::metadata::ObjectMetadata;

/// One object returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Full store key.
    pub key: String,
    /// Store-reported metadata.
    pub metadata: ObjectMetadata,
}

impl ListEntry {
    /// Create an entry. The metadata key is set to `key`.
    pub fn new(key: impl Into<String>, metadata: ObjectMetadata) -> Self {
        let key = key.into();
        let metadata = ObjectMetadata {
            key: key.clone(),
            ..metadata
        };
        Self { key, metadata }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects in this page.
    pub entries: Vec<ListEntry>,
    /// Token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

/// Paginated key enumeration.
///
/// # Contract
///
/// - Calls with the same token return the same page (idempotent per token)
/// - A finite listing eventually returns `next_token: None`
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// List objects whose key starts with `prefix`, resuming at `token`.
    async fn list(&self, prefix: &str, token: Option<&str>) -> Result<ListPage>;
}

/// Pass-through object writes.
#[async_trait]
pub trait WriteSink: Send + Sync {
    /// Store `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, body: &[u8]) -> Result<()>;
}

/// A store that can both list and write.
pub trait ObjectStore: ListingSource + WriteSink {}

impl<T: ListingSource + WriteSink + ?Sized> ObjectStore for T {}
