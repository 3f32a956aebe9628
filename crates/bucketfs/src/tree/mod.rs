//! The cached contents tree.
//!
//! Object stores have no folders, only keys. This module holds the in-memory
//! hierarchy inferred from those keys:
//! - [`FileNode`]: a leaf carrying store metadata
//! - [`Folder`]: a named mapping of child nodes, usually synthesized
//! - [`Node`]: owned File/Folder union stored inside folders
//! - [`NodeRef`]: borrowed File/Folder union returned by lookups
//! - [`ContentsTree`]: the root folder plus the prefix it was built from
//!
//! A tree is built once by [`TreeBuilder`] and never mutated by lookups, so
//! any number of readers can share it without locking.

pub(crate) mod builder;
mod resolver;
mod walk;

pub use builder::{BuildStats, TreeBuilder};
pub use resolver::PathResolver;
pub use walk::Walk;

use std::collections::HashMap;

use crate::error::{Error, FILE_NOT_FOUND, FOLDER_NOT_FOUND, Result};
use crate::metadata::ObjectMetadata;
use crate::path::PathValue;

/// A file (leaf) in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    path: PathValue,
    metadata: ObjectMetadata,
}

impl FileNode {
    fn new(path: PathValue, metadata: ObjectMetadata) -> Self {
        Self { path, metadata }
    }

    /// Filesystem path of this file.
    pub fn path(&self) -> &PathValue {
        &self.path
    }

    /// Store metadata for this file.
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }
}

/// A folder in the tree.
///
/// Children are kept in insertion order. Names are unique within a folder and
/// denote exactly one of a file or a folder.
#[derive(Debug, Clone)]
pub struct Folder {
    path: PathValue,
    metadata: ObjectMetadata,
    children: HashMap<String, Node>,
    order: Vec<String>,
}

/// An owned tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Leaf carrying store metadata
    File(FileNode),
    /// Folder with children
    Folder(Folder),
}

/// A borrowed tree node, as returned by lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    /// Leaf carrying store metadata
    File(&'a FileNode),
    /// Folder with children
    Folder(&'a Folder),
}

impl Folder {
    /// Create an empty folder.
    pub fn new(path: PathValue, metadata: ObjectMetadata) -> Self {
        Self {
            path,
            metadata,
            children: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Filesystem path of this folder.
    pub fn path(&self) -> &PathValue {
        &self.path
    }

    /// Metadata for this folder (synthetic unless the store had a marker).
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// True iff a child named `name` exists and is a file.
    pub fn has_file(&self, name: &str) -> bool {
        matches!(self.children.get(name), Some(Node::File(_)))
    }

    /// True iff a child named `name` exists and is a folder.
    pub fn has_folder(&self, name: &str) -> bool {
        matches!(self.children.get(name), Some(Node::Folder(_)))
    }

    /// The file child called `name`.
    pub fn get_file(&self, name: &str) -> Result<&FileNode> {
        match self.children.get(name) {
            Some(Node::File(file)) => Ok(file),
            _ => Err(Error::not_found(name, FILE_NOT_FOUND)),
        }
    }

    /// The folder child called `name`.
    pub fn get_folder(&self, name: &str) -> Result<&Folder> {
        match self.children.get(name) {
            Some(Node::Folder(folder)) => Ok(folder),
            _ => Err(Error::not_found(name, FOLDER_NOT_FOUND)),
        }
    }

    /// Any child called `name`.
    pub fn get(&self, name: &str) -> Option<NodeRef<'_>> {
        self.children.get(name).map(Node::as_node_ref)
    }

    /// Register a file child, replacing a previous file of the same name.
    ///
    /// Intended for tree construction only. Fails with
    /// [`Error::StructuralConflict`] if `name` is already a folder.
    pub fn track_file(&mut self, name: &str, metadata: ObjectMetadata) -> Result<&FileNode> {
        if self.has_folder(name) {
            return Err(Error::StructuralConflict(metadata.key));
        }
        let file = FileNode::new(self.path.with_child(name), metadata);
        self.insert(name, Node::File(file));
        self.get_file(name)
    }

    /// Register a folder child if absent and return it.
    ///
    /// An existing folder is returned untouched so its collected children
    /// survive. Intended for tree construction only. Fails with
    /// [`Error::StructuralConflict`] if `name` is already a file.
    pub fn track_folder(&mut self, name: &str, metadata: ObjectMetadata) -> Result<&mut Folder> {
        if self.has_file(name) {
            return Err(Error::StructuralConflict(metadata.key));
        }
        if !self.children.contains_key(name) {
            let folder = Folder::new(self.path.with_child(name), metadata);
            self.insert(name, Node::Folder(folder));
        }
        match self.children.get_mut(name) {
            Some(Node::Folder(folder)) => Ok(folder),
            _ => Err(Error::not_found(name, FOLDER_NOT_FOUND)),
        }
    }

    /// Replace this folder's metadata (used for explicit folder markers).
    pub(crate) fn set_metadata(&mut self, metadata: ObjectMetadata) {
        self.metadata = metadata;
    }

    fn insert(&mut self, name: &str, node: Node) {
        if !self.children.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.children.insert(name.to_string(), node);
    }

    /// Names of the direct children, in insertion order.
    pub fn list_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Direct children as `(name, node)`, in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeRef<'_>)> {
        self.order
            .iter()
            .filter_map(|name| self.get(name).map(|node| (name.as_str(), node)))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the folder has no children.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PartialEq for Folder {
    /// Structural equality: same path, metadata and children. Child order is
    /// not semantically meaningful and is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.metadata == other.metadata
            && self.children == other.children
    }
}

impl Eq for Folder {}

impl Node {
    /// Borrow as a [`NodeRef`].
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Node::File(file) => NodeRef::File(file),
            Node::Folder(folder) => NodeRef::Folder(folder),
        }
    }
}

impl<'a> NodeRef<'a> {
    /// Filesystem path of the node.
    pub fn path(&self) -> &'a PathValue {
        match *self {
            NodeRef::File(file) => &file.path,
            NodeRef::Folder(folder) => &folder.path,
        }
    }

    /// Store (or synthetic) metadata of the node.
    pub fn metadata(&self) -> &'a ObjectMetadata {
        match *self {
            NodeRef::File(file) => &file.metadata,
            NodeRef::Folder(folder) => &folder.metadata,
        }
    }

    /// The store key backing this node.
    pub fn real_path(&self) -> &'a str {
        &self.metadata().key
    }

    /// Entity tag, or an empty string if the store gave none.
    pub fn etag(&self) -> &'a str {
        self.metadata().etag.as_deref().unwrap_or("")
    }

    /// Size in bytes, if the store reported one.
    pub fn size(&self) -> Option<u64> {
        self.metadata().size
    }

    /// True for files.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeRef::File(_))
    }

    /// True for folders.
    pub fn is_folder(&self) -> bool {
        matches!(self, NodeRef::Folder(_))
    }

    /// Object stores have no symlinks.
    pub fn is_link(&self) -> bool {
        false
    }

    /// Fixed: everything in the bucket is readable.
    pub fn is_readable(&self) -> bool {
        true
    }

    /// Fixed: everything in the bucket is writable.
    pub fn is_writable(&self) -> bool {
        true
    }

    /// Fixed: nothing in the bucket is executable.
    pub fn is_executable(&self) -> bool {
        false
    }

    /// The file, if this is one.
    pub fn as_file(&self) -> Option<&'a FileNode> {
        match *self {
            NodeRef::File(file) => Some(file),
            NodeRef::Folder(_) => None,
        }
    }

    /// The folder, if this is one.
    pub fn as_folder(&self) -> Option<&'a Folder> {
        match *self {
            NodeRef::File(_) => None,
            NodeRef::Folder(folder) => Some(folder),
        }
    }
}

/// A completed, immutable snapshot of a store's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsTree {
    root: Folder,
    prefix: String,
}

impl ContentsTree {
    /// An empty tree for `prefix` (normalised, without slashes at the ends).
    pub fn empty(prefix: &str) -> Self {
        Self {
            root: Folder::new(PathValue::root(), ObjectMetadata::placeholder(prefix)),
            prefix: prefix.to_string(),
        }
    }

    /// The root folder.
    pub fn root(&self) -> &Folder {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Folder {
        &mut self.root
    }

    /// The store prefix this tree represents (empty for a whole bucket).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve `path` against this tree. See [`PathResolver::resolve`].
    pub fn resolve(&self, path: impl Into<PathValue>) -> Result<NodeRef<'_>> {
        PathResolver::resolve(self, &path.into())
    }

    /// Depth-first iterator over everything in the tree.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.root)
    }
}
