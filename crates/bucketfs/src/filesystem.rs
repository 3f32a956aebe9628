//! The bucket filesystem facade.
//!
//! [`BucketFs`] owns one [`ContentsTree`] for one bucket/prefix. The tree is
//! built eagerly by [`BucketFs::new`] so listing failures surface at
//! construction, never at first lookup. Lookups afterwards are synchronous
//! and read-only.
//!
//! # Staleness
//!
//! Writes go straight to the store and do not touch the tree. After
//! [`BucketFs::put_file_contents`] the cached tree may be stale: a new key
//! is not visible to lookups and an overwritten key keeps its old metadata.
//! Build a new `BucketFs` to see the store's current state.

use std::sync::Arc;

use crate::config::FsConfig;
use crate::error::{Error, FOLDER_NOT_FOUND, Result};
use crate::path::PathValue;
use crate::store::ObjectStore;
use crate::tree::{BuildStats, ContentsTree, Folder, NodeRef, TreeBuilder, Walk};

/// Something [`BucketFs::to_file_info`] can turn into a node.
#[derive(Debug, Clone)]
pub enum Lookup<'a> {
    /// A path still to be resolved
    Path(PathValue),
    /// A node that has already been resolved
    Node(NodeRef<'a>),
}

impl From<&str> for Lookup<'_> {
    fn from(path: &str) -> Self {
        Lookup::Path(PathValue::new(path))
    }
}

impl From<String> for Lookup<'_> {
    fn from(path: String) -> Self {
        Lookup::Path(PathValue::new(path))
    }
}

impl From<PathValue> for Lookup<'_> {
    fn from(path: PathValue) -> Self {
        Lookup::Path(path)
    }
}

impl<'a> From<NodeRef<'a>> for Lookup<'a> {
    fn from(node: NodeRef<'a>) -> Self {
        Lookup::Node(node)
    }
}

/// A bucket (or a prefix of one) presented as a cached filesystem tree.
///
/// # Example
///
/// ```rust
/// use bucketfs::{BucketFs, FsConfig, InMemoryStore, ObjectMetadata};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> bucketfs::Result<()> {
/// let store = Arc::new(InMemoryStore::new());
/// store.insert(ObjectMetadata::new("docs/readme.md").size(12));
///
/// let fs = BucketFs::new(store, FsConfig::new("my-bucket")).await?;
///
/// let docs = fs.get_folder("/docs")?;
/// assert!(docs.has_file("readme.md"));
///
/// let info = fs.get_file_info("/docs/readme.md")?;
/// assert_eq!(info.size(), Some(12));
/// # Ok(())
/// # }
/// ```
pub struct BucketFs {
    store: Arc<dyn ObjectStore>,
    config: FsConfig,
    contents: ContentsTree,
    stats: BuildStats,
}

impl BucketFs {
    /// Validate `config`, list everything under its prefix and build the tree.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an invalid config
    /// - [`Error::StructuralConflict`] / [`Error::OutsidePrefix`] for an
    ///   inconsistent listing
    /// - whatever the store's listing returned, unchanged
    pub async fn new(store: Arc<dyn ObjectStore>, config: FsConfig) -> Result<Self> {
        config.validate()?;

        #[cfg(feature = "logging")]
        tracing::info!(bucket = %config.bucket, prefix = %config.prefix, "building bucket filesystem");

        let (contents, stats) = TreeBuilder::build_with_stats(&*store, &config.prefix).await?;

        Ok(Self {
            store,
            config,
            contents,
            stats,
        })
    }

    /// Build a filesystem from a JSON config (see [`FsConfig`]).
    pub async fn from_config(store: Arc<dyn ObjectStore>, json: &str) -> Result<Self> {
        let config = FsConfig::from_json(json)?;
        Self::new(store, config).await
    }

    /// The config this filesystem was built from.
    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Root prefix (empty for a whole bucket).
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// The cached tree.
    pub fn contents(&self) -> &ContentsTree {
        &self.contents
    }

    /// Counters from the initial build.
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// The folder at `path`.
    ///
    /// Fails with [`Error::NotFound`] if `path` is missing or is a file.
    pub fn get_folder(&self, path: impl Into<PathValue>) -> Result<&Folder> {
        let path = path.into();
        match self.contents.resolve(&path)? {
            NodeRef::Folder(folder) => Ok(folder),
            NodeRef::File(_) => Err(Error::not_found(path.segments().join("/"), FOLDER_NOT_FOUND)),
        }
    }

    /// The file or folder at `path`.
    pub fn get_file_info(&self, path: impl Into<PathValue>) -> Result<NodeRef<'_>> {
        self.contents.resolve(path)
    }

    /// True if anything exists at `path`.
    pub fn exists(&self, path: impl Into<PathValue>) -> bool {
        self.contents.resolve(path).is_ok()
    }

    /// Depth-first iterator over everything below the folder at `path`.
    pub fn walk(&self, path: impl Into<PathValue>) -> Result<Walk<'_>> {
        self.get_folder(path).map(Walk::new)
    }

    /// Turn a path or an already-resolved node into a node.
    ///
    /// Nodes are returned as they are; paths are resolved.
    pub fn to_file_info<'a>(&'a self, target: impl Into<Lookup<'a>>) -> Result<NodeRef<'a>> {
        match target.into() {
            Lookup::Node(node) => Ok(node),
            Lookup::Path(path) => self.contents.resolve(path),
        }
    }

    /// Write `body` to the object at `path`.
    ///
    /// The leading slash is stripped and the root prefix prepended to form the
    /// store key. The cached tree is NOT updated; see the module docs on
    /// staleness.
    pub async fn put_file_contents(&self, path: impl Into<PathValue>, body: &[u8]) -> Result<()> {
        let path = path.into();
        let key = self.config.key_for(path.full_path());

        #[cfg(feature = "logging")]
        tracing::debug!(bucket = %self.config.bucket, key = %key, bytes = body.len(), "put object");

        self.store.put(&key, body).await
    }
}

impl std::fmt::Debug for BucketFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketFs")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
