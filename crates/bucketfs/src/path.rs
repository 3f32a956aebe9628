//! Parsed filesystem paths.
//!
//! [`PathValue`] wraps a slash-separated path and derives its basename,
//! dirname and extension on first use. Derived parts are pure functions of
//! the full path and are cached for the life of the value.
//!
//! `.` and `..` are ordinary names here. Only empty segments are dropped.

use std::fmt;
use std::sync::OnceLock;

/// Immutable parsed representation of a filesystem path.
///
/// # Example
///
/// ```rust
/// use bucketfs::PathValue;
///
/// let path = PathValue::new("/docs/notes/todo.txt");
/// assert_eq!(path.basename(), "todo.txt");
/// assert_eq!(path.dirname(), "/docs/notes");
/// assert_eq!(path.extension(), "txt");
/// assert_eq!(path.segments(), vec!["docs", "notes", "todo.txt"]);
/// ```
#[derive(Clone)]
pub struct PathValue {
    full_path: String,
    basename: OnceLock<String>,
    dirname: OnceLock<String>,
    extension: OnceLock<String>,
}

impl PathValue {
    /// Wrap a path. Nothing is parsed until a derived part is asked for.
    pub fn new(full_path: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            basename: OnceLock::new(),
            dirname: OnceLock::new(),
            extension: OnceLock::new(),
        }
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self::new("/")
    }

    /// The path exactly as given.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Final component, ignoring trailing slashes. Empty for `/`.
    pub fn basename(&self) -> &str {
        self.basename.get_or_init(|| basename_of(&self.full_path).to_string())
    }

    /// Everything before the final component.
    ///
    /// Returns `.` if there is no parent folder and `/` for top-level
    /// absolute paths.
    pub fn dirname(&self) -> &str {
        self.dirname.get_or_init(|| dirname_of(&self.full_path).to_string())
    }

    /// Text after the last `.` of the basename, or empty if there is none.
    pub fn extension(&self) -> &str {
        self.extension.get_or_init(|| {
            let base = self.basename();
            match base.rfind('.') {
                Some(idx) => base[idx + 1..].to_string(),
                None => String::new(),
            }
        })
    }

    /// Ordered path segments.
    ///
    /// Empty segments are dropped: the one produced by a leading slash, a
    /// trailing one, and repeated slashes (`a//b` is `a`, `b`).
    pub fn segments(&self) -> Vec<&str> {
        split_segments(&self.full_path)
    }

    /// True if this path has no segments (`/` or empty).
    pub fn is_root(&self) -> bool {
        self.segments().is_empty()
    }

    /// The path of a direct child called `name`.
    pub fn with_child(&self, name: &str) -> PathValue {
        if self.full_path.ends_with('/') {
            PathValue::new(format!("{}{}", self.full_path, name))
        } else {
            PathValue::new(format!("{}/{}", self.full_path, name))
        }
    }
}

/// Split a path into its non-empty segments.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

fn basename_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

fn dirname_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." };
    }
    match trimmed.rfind('/') {
        Some(idx) => {
            let parent = trimmed[..idx].trim_end_matches('/');
            if parent.is_empty() { "/" } else { parent }
        }
        None => ".",
    }
}

impl fmt::Debug for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathValue").field(&self.full_path).finish()
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path)
    }
}

impl PartialEq for PathValue {
    fn eq(&self, other: &Self) -> bool {
        self.full_path == other.full_path
    }
}

impl Eq for PathValue {}

impl From<&str> for PathValue {
    fn from(path: &str) -> Self {
        PathValue::new(path)
    }
}

impl From<String> for PathValue {
    fn from(path: String) -> Self {
        PathValue::new(path)
    }
}

impl From<&String> for PathValue {
    fn from(path: &String) -> Self {
        PathValue::new(path.as_str())
    }
}

impl From<&PathValue> for PathValue {
    fn from(path: &PathValue) -> Self {
        path.clone()
    }
}

impl AsRef<str> for PathValue {
    fn as_ref(&self) -> &str {
        &self.full_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(PathValue::new("a/b.txt").basename(), "b.txt");
        assert_eq!(PathValue::new("b.txt").basename(), "b.txt");
        assert_eq!(PathValue::new("/a/b/").basename(), "b");
        assert_eq!(PathValue::new("/").basename(), "");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(PathValue::new("a/b.txt").dirname(), "a");
        assert_eq!(PathValue::new("x/y/z.txt").dirname(), "x/y");
        assert_eq!(PathValue::new("b.txt").dirname(), ".");
        assert_eq!(PathValue::new("/b.txt").dirname(), "/");
        assert_eq!(PathValue::new("/").dirname(), "/");
        assert_eq!(PathValue::new("a/b/").dirname(), "a");
    }

    #[test]
    fn test_extension() {
        assert_eq!(PathValue::new("a/b.txt").extension(), "txt");
        assert_eq!(PathValue::new("a/b.tar.gz").extension(), "gz");
        assert_eq!(PathValue::new("a/README").extension(), "");
        assert_eq!(PathValue::new(".env").extension(), "env");
        assert_eq!(PathValue::new("v1.2/README").extension(), "");
    }

    #[test]
    fn test_segments() {
        assert_eq!(PathValue::new("/a/b.txt").segments(), vec!["a", "b.txt"]);
        assert_eq!(PathValue::new("a/b.txt").segments(), vec!["a", "b.txt"]);
        assert_eq!(PathValue::new("a/").segments(), vec!["a"]);
        assert!(PathValue::new("/").segments().is_empty());
        assert!(PathValue::new("").segments().is_empty());
        assert_eq!(PathValue::new("a//b").segments(), vec!["a", "b"]);
    }

    #[test]
    fn test_dot_segments_are_literal() {
        assert_eq!(
            PathValue::new("/a/../b/./c").segments(),
            vec!["a", "..", "b", ".", "c"]
        );
    }

    #[test]
    fn test_derived_parts_are_stable() {
        let path = PathValue::new("/x/y/z.txt");
        let first = path.basename().to_string();
        assert_eq!(path.basename(), first);
        assert_eq!(path.clone().dirname(), "/x/y");
        assert_eq!(path.dirname(), "/x/y");
    }

    #[test]
    fn test_with_child() {
        assert_eq!(PathValue::root().with_child("a").full_path(), "/a");
        assert_eq!(PathValue::new("/a").with_child("b.txt").full_path(), "/a/b.txt");
    }

    #[test]
    fn test_is_root() {
        assert!(PathValue::root().is_root());
        assert!(PathValue::new("").is_root());
        assert!(!PathValue::new("/a").is_root());
    }
}
