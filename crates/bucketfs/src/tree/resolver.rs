//! Path lookup against a built [`ContentsTree`].

use super::{ContentsTree, NodeRef};
use crate::error::{Error, PATH_NOT_FOUND, Result};
use crate::path::PathValue;

/// Walks a tree from its root along path segments.
///
/// Resolution is read-only: it never mutates the tree, so repeated lookups
/// of the same path return the same node and any number of readers may
/// resolve concurrently.
pub struct PathResolver;

impl PathResolver {
    /// Find the node at `path`.
    ///
    /// `/` (or an empty path) returns the root folder. Otherwise each segment
    /// must name a child of the folder reached so far. The result may be a
    /// file or a folder.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] carrying the path up to and including the first
    /// missing segment, e.g. `a/c.txt` for `/a/c.txt/d` when `a` has no
    /// `c.txt`. Descending through a file also fails this way.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bucketfs::{ListEntry, ObjectMetadata, PathResolver, PathValue, TreeBuilder};
    ///
    /// let mut builder = TreeBuilder::new("/");
    /// builder.add_entry(ListEntry::new("a/b.txt", ObjectMetadata::default()))?;
    /// let (tree, _) = builder.finish();
    ///
    /// let node = PathResolver::resolve(&tree, &PathValue::new("/a/b.txt"))?;
    /// assert!(node.is_file());
    ///
    /// let err = PathResolver::resolve(&tree, &PathValue::new("/a/c.txt")).unwrap_err();
    /// assert_eq!(err.missing_path(), Some("a/c.txt"));
    /// # Ok::<(), bucketfs::Error>(())
    /// ```
    pub fn resolve<'t>(tree: &'t ContentsTree, path: &PathValue) -> Result<NodeRef<'t>> {
        let root = tree.root();
        if path.is_root() {
            return Ok(NodeRef::Folder(root));
        }

        let mut current = NodeRef::Folder(root);
        let mut seen = String::new();
        for part in path.segments() {
            if !seen.is_empty() {
                seen.push('/');
            }
            seen.push_str(part);

            current = match current {
                NodeRef::Folder(folder) => folder.get(part),
                NodeRef::File(_) => None,
            }
            .ok_or_else(|| Error::not_found(seen.as_str(), PATH_NOT_FOUND))?;
        }

        Ok(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metadata::ObjectMetadata;
    use crate::store::ListEntry;
    use crate::tree::TreeBuilder;

    fn tree(keys: &[&str]) -> ContentsTree {
        let mut builder = TreeBuilder::new("/");
        for key in keys {
            builder
                .add_entry(ListEntry::new(*key, ObjectMetadata::default()))
                .unwrap();
        }
        builder.finish().0
    }

    fn missing(tree: &ContentsTree, path: &str) -> String {
        PathResolver::resolve(tree, &PathValue::new(path))
            .unwrap_err()
            .missing_path()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_root_of_empty_tree() {
        let tree = tree(&[]);
        let node = PathResolver::resolve(&tree, &PathValue::root()).unwrap();
        assert!(node.is_folder());
        assert_eq!(node.path().full_path(), "/");
    }

    #[test]
    fn test_root_without_leading_slash() {
        let tree = tree(&["a/b.txt"]);
        assert!(PathResolver::resolve(&tree, &PathValue::new("")).unwrap().is_folder());
    }

    #[test]
    fn test_resolve_file_and_folder() {
        let tree = tree(&["a/b.txt"]);
        let file = PathResolver::resolve(&tree, &PathValue::new("/a/b.txt")).unwrap();
        assert!(file.is_file());
        assert_eq!(file.real_path(), "a/b.txt");

        let folder = PathResolver::resolve(&tree, &PathValue::new("a")).unwrap();
        assert!(folder.is_folder());
        assert_eq!(folder.path().full_path(), "/a");
    }

    #[test]
    fn test_missing_first_segment_reports_only_it() {
        let tree = tree(&["a/b.txt"]);
        assert_eq!(missing(&tree, "/nope/deeper/file"), "nope");
    }

    #[test]
    fn test_missing_deep_segment_reports_prefix() {
        let tree = tree(&["a/b/c.txt"]);
        assert_eq!(missing(&tree, "/a/b/d.txt"), "a/b/d.txt");
        assert_eq!(missing(&tree, "/a/x/c.txt"), "a/x");
    }

    #[test]
    fn test_cannot_descend_through_file() {
        let tree = tree(&["a/b.txt"]);
        assert_eq!(missing(&tree, "/a/b.txt/c"), "a/b.txt/c");
    }

    #[test]
    fn test_dot_segments_are_names() {
        let tree = tree(&["a/b.txt"]);
        assert_eq!(missing(&tree, "/a/../a/b.txt"), "a/..");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let tree = tree(&["x/y/z.txt", "x/y2.txt"]);
        let path = PathValue::new("/x/y");
        let first = PathResolver::resolve(&tree, &path).unwrap();
        let second = PathResolver::resolve(&tree, &path).unwrap();
        assert_eq!(first, second);
    }
}
