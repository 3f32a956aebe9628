//! Bucketfs - Browse a flat object-store bucket as a cached filesystem tree
//!
//! Object stores only know keys such as `a/b/c.txt`. Bucketfs lists every key
//! under a prefix once, infers the folders those keys imply, and keeps the
//! result as an in-memory tree that can be queried by path.
//!
//! # Example
//!
//! ```rust
//! use bucketfs::{BucketFs, FsConfig, InMemoryStore, ObjectMetadata};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> bucketfs::Result<()> {
//!     let store = Arc::new(InMemoryStore::with_page_size(2));
//!     store.insert(ObjectMetadata::new("x/y/z.txt").etag("m1"));
//!     store.insert(ObjectMetadata::new("x/y2.txt").etag("m2"));
//!     store.insert(ObjectMetadata::new("top.txt"));
//!
//!     let fs = BucketFs::new(store, FsConfig::new("bucket")).await?;
//!
//!     let x = fs.get_folder("/x")?;
//!     let names: Vec<_> = x.list_names().collect();
//!     assert_eq!(names, vec!["y", "y2.txt"]);
//!
//!     let err = fs.get_file_info("/x/nope/z.txt").unwrap_err();
//!     assert_eq!(err.missing_path(), Some("x/nope"));
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ListingSource ──pages──▶ TreeBuilder ──▶ ContentsTree ◀── PathResolver ◀── BucketFs
//!                                                                              │
//! WriteSink ◀────────────────────── put_file_contents (bypasses the tree) ─────┘
//! ```
//!
//! Bring your own store by implementing [`ListingSource`] and [`WriteSink`];
//! [`InMemoryStore`] is provided for tests and local tooling.

mod config;
mod error;
mod filesystem;
mod memory;
mod metadata;
mod path;
mod store;
mod tree;

pub use config::FsConfig;
pub use error::{Error, FILE_NOT_FOUND, FOLDER_NOT_FOUND, PATH_NOT_FOUND, Result};
pub use filesystem::{BucketFs, Lookup};
pub use memory::{DEFAULT_PAGE_SIZE, InMemoryStore};
pub use metadata::ObjectMetadata;
pub use path::PathValue;
pub use store::{ListEntry, ListPage, ListingSource, ObjectStore, WriteSink};
pub use tree::{BuildStats, ContentsTree, FileNode, Folder, Node, NodeRef, PathResolver, TreeBuilder, Walk};

/// Re-export of [`async_trait`](macro@async_trait::async_trait) for store implementations.
pub use async_trait::async_trait;
