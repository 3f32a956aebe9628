//! Building a [`ContentsTree`] from a paginated listing.
//!
//! The builder folds every listed key into the tree, synthesizing the folders
//! needed to reach it. Pages are fetched strictly one after another because
//! page N+1 needs the token from page N.
//!
//! # Key handling
//!
//! | Key (relative to prefix) | Effect |
//! |--------------------------|--------|
//! | `a/b.txt` | folder `a`, file `b.txt` inside it |
//! | `top.txt` | file `top.txt` in the root |
//! | `a/b/` | folder marker: folders `a` and `b`, no file |
//! | `/` or empty | root marker: no effect |
//!
//! A key that is both a file and a folder prefix aborts the build with
//! [`Error::StructuralConflict`]. A key outside the prefix aborts it with
//! [`Error::OutsidePrefix`]. Listing errors abort it unchanged.

use super::ContentsTree;
use crate::error::{Error, Result};
use crate::metadata::ObjectMetadata;
use crate::path::split_segments;
use crate::store::{ListEntry, ListingSource};

/// Counters describing a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Listing pages fetched
    pub pages: usize,
    /// Listing entries folded into the tree
    pub entries: usize,
    /// File nodes in the finished tree
    pub files: usize,
    /// Folder nodes in the finished tree, root excluded
    pub folders: usize,
}

/// Incremental tree construction.
///
/// Use [`TreeBuilder::build`] to drain a [`ListingSource`], or feed entries
/// by hand with [`TreeBuilder::add_entry`] and call [`TreeBuilder::finish`].
///
/// # Example
///
/// ```rust
/// use bucketfs::{ListEntry, ObjectMetadata, TreeBuilder};
///
/// let mut builder = TreeBuilder::new("/");
/// builder.add_entry(ListEntry::new("a/b.txt", ObjectMetadata::default().etag("x")))?;
/// let (tree, stats) = builder.finish();
///
/// assert!(tree.root().has_folder("a"));
/// assert_eq!(stats.files, 1);
/// # Ok::<(), bucketfs::Error>(())
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    tree: ContentsTree,
    pages: usize,
    entries: usize,
}

impl TreeBuilder {
    /// Start an empty tree rooted at `prefix`.
    ///
    /// Slashes at either end of the prefix are ignored; `/` and `""` both
    /// mean the whole bucket.
    pub fn new(prefix: &str) -> Self {
        Self {
            tree: ContentsTree::empty(&normalize_prefix(prefix)),
            pages: 0,
            entries: 0,
        }
    }

    /// Build a complete tree from every page of `source`.
    ///
    /// Nothing is returned until the last page has been folded in. If the
    /// listing fails, or the returned future is dropped, the partial tree is
    /// discarded.
    pub async fn build<L>(source: &L, prefix: &str) -> Result<ContentsTree>
    where
        L: ListingSource + ?Sized,
    {
        Self::build_with_stats(source, prefix)
            .await
            .map(|(tree, _)| tree)
    }

    /// Like [`TreeBuilder::build`], also returning [`BuildStats`].
    pub async fn build_with_stats<L>(source: &L, prefix: &str) -> Result<(ContentsTree, BuildStats)>
    where
        L: ListingSource + ?Sized,
    {
        let mut builder = Self::new(prefix);
        let list_prefix = builder.list_prefix();

        #[cfg(feature = "logging")]
        tracing::debug!(prefix = %list_prefix, "listing store contents");

        let mut token: Option<String> = None;
        loop {
            let page = source.list(&list_prefix, token.as_deref()).await?;
            builder.pages += 1;

            #[cfg(feature = "logging")]
            tracing::debug!(
                page = builder.pages,
                entries = page.entries.len(),
                more = page.next_token.is_some(),
                "folding listing page"
            );

            for entry in page.entries {
                builder.add_entry(entry)?;
            }

            token = page.next_token;
            if token.is_none() {
                break;
            }
        }

        let (tree, stats) = builder.finish();

        #[cfg(feature = "logging")]
        tracing::info!(
            pages = stats.pages,
            files = stats.files,
            folders = stats.folders,
            "contents tree built"
        );

        Ok((tree, stats))
    }

    /// The prefix to hand to the listing source: `""` for a whole bucket,
    /// otherwise the root prefix with a trailing slash.
    pub fn list_prefix(&self) -> String {
        let prefix = self.tree.prefix();
        if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        }
    }

    /// Fold one listing entry into the tree.
    pub fn add_entry(&mut self, entry: ListEntry) -> Result<()> {
        let relative = self.relative_key(&entry.key)?.to_string();
        self.entries += 1;

        if relative.is_empty() || relative.ends_with('/') {
            return self.add_folder_marker(&relative, entry.metadata);
        }

        // `.` and `..` are literal names here, never navigation.
        let segments = split_segments(&relative);
        let Some((name, parents)) = segments.split_last() else {
            #[cfg(feature = "logging")]
            tracing::debug!(key = %entry.key, "skipping key without a name");
            return Ok(());
        };

        let prefix = self.tree.prefix().to_string();
        let mut dest = self.tree.root_mut();
        let mut so_far = String::new();
        for part in parents {
            push_segment(&mut so_far, part);
            dest = dest
                .track_folder(part, ObjectMetadata::placeholder(store_key(&prefix, &so_far)))
                .inspect_err(|_err| {
                    #[cfg(feature = "logging")]
                    tracing::warn!(key = %entry.key, error = %_err, "listing is inconsistent");
                })?;
        }

        dest.track_file(name, entry.metadata).inspect_err(|_err| {
            #[cfg(feature = "logging")]
            tracing::warn!(key = %entry.key, error = %_err, "listing is inconsistent");
        })?;
        Ok(())
    }

    /// Stop building and hand back the tree.
    pub fn finish(self) -> (ContentsTree, BuildStats) {
        let (files, folders) = self.tree.walk().fold((0, 0), |(files, folders), node| {
            if node.is_file() {
                (files + 1, folders)
            } else {
                (files, folders + 1)
            }
        });
        let stats = BuildStats {
            pages: self.pages,
            entries: self.entries,
            files,
            folders,
        };
        (self.tree, stats)
    }

    /// Make folders for a marker key such as `a/b/`; the root marker is a no-op.
    fn add_folder_marker(&mut self, relative: &str, metadata: ObjectMetadata) -> Result<()> {
        let parts = split_segments(relative);
        if parts.is_empty() {
            #[cfg(feature = "logging")]
            tracing::debug!(key = %metadata.key, "ignoring root marker");
            return Ok(());
        }

        let prefix = self.tree.prefix().to_string();
        let mut dest = self.tree.root_mut();
        let mut so_far = String::new();
        for part in parts {
            push_segment(&mut so_far, part);
            dest = dest.track_folder(part, ObjectMetadata::placeholder(store_key(&prefix, &so_far)))?;
        }
        dest.set_metadata(metadata);
        Ok(())
    }

    /// Strip the root prefix from a listed key.
    fn relative_key<'k>(&self, key: &'k str) -> Result<&'k str> {
        let prefix = self.tree.prefix();
        if prefix.is_empty() {
            return Ok(key.strip_prefix('/').unwrap_or(key));
        }
        if key == prefix {
            return Ok("");
        }
        key.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| Error::OutsidePrefix {
                key: key.to_string(),
                prefix: prefix.to_string(),
            })
    }
}

/// Strip slashes from both ends of a root prefix.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}

fn push_segment(so_far: &mut String, part: &str) {
    if !so_far.is_empty() {
        so_far.push('/');
    }
    so_far.push_str(part);
}

/// The store key of a folder at `relative` under `prefix`.
fn store_key(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else {
        format!("{prefix}/{relative}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    fn entry(key: &str, etag: &str) -> ListEntry {
        ListEntry::new(key, ObjectMetadata::default().etag(etag))
    }

    #[test]
    fn test_add_entry_synthesizes_folders() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("x/y/z.txt", "1")).unwrap();
        let (tree, stats) = builder.finish();

        let x = tree.root().get_folder("x").unwrap();
        assert_eq!(x.path().full_path(), "/x");
        assert_eq!(x.metadata().key, "x");
        let y = x.get_folder("y").unwrap();
        assert_eq!(y.metadata().key, "x/y");
        assert!(y.has_file("z.txt"));
        assert_eq!(stats.files, 1);
        assert_eq!(stats.folders, 2);
    }

    #[test]
    fn test_top_level_key_lands_in_root() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("top.txt", "1")).unwrap();
        let (tree, _) = builder.finish();

        assert!(tree.root().has_file("top.txt"));
        assert!(!tree.root().has_folder("."));
    }

    #[test]
    fn test_dot_segments_are_literal_folders() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("b.txt", "top")).unwrap();
        builder.add_entry(entry("./b.txt", "dot")).unwrap();
        builder.add_entry(entry("a/../c.txt", "up")).unwrap();
        let (tree, stats) = builder.finish();

        assert_eq!(stats.files, 3);
        assert_eq!(tree.root().list_names().collect::<Vec<_>>(), vec!["b.txt", ".", "a"]);
        assert_eq!(tree.resolve("/b.txt").unwrap().etag(), "top");

        let dot = tree.resolve("/./b.txt").unwrap();
        assert_eq!(dot.etag(), "dot");
        assert_eq!(dot.path().full_path(), "/./b.txt");
        assert_eq!(tree.root().get_folder(".").unwrap().metadata().key, ".");

        let up = tree.resolve("/a/../c.txt").unwrap();
        assert_eq!(up.real_path(), "a/../c.txt");
        assert!(!tree.root().has_file("c.txt"));
    }

    #[test]
    fn test_shared_prefix_keeps_siblings() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("a/one.txt", "1")).unwrap();
        builder.add_entry(entry("a/two.txt", "2")).unwrap();
        let (tree, _) = builder.finish();

        let a = tree.root().get_folder("a").unwrap();
        assert_eq!(a.list_names().collect::<Vec<_>>(), vec!["one.txt", "two.txt"]);
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("a/b.txt", "old")).unwrap();
        builder.add_entry(entry("a/b.txt", "new")).unwrap();
        let (tree, stats) = builder.finish();

        let file = tree.root().get_folder("a").unwrap().get_file("b.txt").unwrap();
        assert_eq!(file.metadata().etag.as_deref(), Some("new"));
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.files, 1);
    }

    #[test]
    fn test_file_then_prefix_conflicts() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("a", "1")).unwrap();
        let err = builder.add_entry(entry("a/b.txt", "2")).unwrap_err();
        assert!(matches!(err, Error::StructuralConflict(_)));
    }

    #[test]
    fn test_prefix_then_file_conflicts() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("a/b.txt", "1")).unwrap();
        let err = builder.add_entry(entry("a", "2")).unwrap_err();
        assert!(matches!(err, Error::StructuralConflict(key) if key == "a"));
    }

    #[test]
    fn test_folder_marker_creates_folder_only() {
        let mut builder = TreeBuilder::new("/");
        builder
            .add_entry(ListEntry::new("a/b/", ObjectMetadata::default().etag("m")))
            .unwrap();
        builder.add_entry(entry("a/b/c.txt", "1")).unwrap();
        let (tree, stats) = builder.finish();

        let b = tree.root().get_folder("a").unwrap().get_folder("b").unwrap();
        assert_eq!(b.metadata().etag.as_deref(), Some("m"));
        assert!(b.has_file("c.txt"));
        assert_eq!(stats.files, 1);
    }

    #[test]
    fn test_root_marker_is_ignored() {
        let mut builder = TreeBuilder::new("/");
        builder.add_entry(entry("/", "1")).unwrap();
        let (tree, _) = builder.finish();

        assert!(tree.root().is_empty());
        assert!(tree.root().get("").is_none());
    }

    #[test]
    fn test_prefix_is_stripped() {
        let mut builder = TreeBuilder::new("/data/");
        assert_eq!(builder.list_prefix(), "data/");
        builder.add_entry(entry("data/a/b.txt", "1")).unwrap();
        builder.add_entry(entry("data/", "2")).unwrap();
        let (tree, _) = builder.finish();

        assert_eq!(tree.prefix(), "data");
        let a = tree.root().get_folder("a").unwrap();
        assert_eq!(a.metadata().key, "data/a");
        let file = a.get_file("b.txt").unwrap();
        assert_eq!(file.path().full_path(), "/a/b.txt");
        assert_eq!(file.metadata().key, "data/a/b.txt");
    }

    #[test]
    fn test_key_outside_prefix_fails() {
        let mut builder = TreeBuilder::new("data");
        let err = builder.add_entry(entry("database/x", "1")).unwrap_err();
        assert!(matches!(err, Error::OutsidePrefix { .. }));
    }

    #[tokio::test]
    async fn test_build_drains_every_page() {
        let store = InMemoryStore::with_page_size(2);
        for key in ["a/1", "a/2", "b/3", "c", "d/e/f"] {
            store.insert(ObjectMetadata::new(key));
        }

        let (tree, stats) = TreeBuilder::build_with_stats(&store, "/").await.unwrap();
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.files, 5);
        assert_eq!(store.list_calls(), 3);
        assert!(tree.resolve("/d/e/f").unwrap().is_file());
    }

    #[tokio::test]
    async fn test_build_empty_listing() {
        let store = InMemoryStore::new();
        let (tree, stats) = TreeBuilder::build_with_stats(&store, "/").await.unwrap();
        assert!(tree.root().is_empty());
        assert_eq!(stats.pages, 1);
    }
}
