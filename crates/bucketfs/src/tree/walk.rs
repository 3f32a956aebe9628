//! Recursive iteration over a folder's contents.

use super::{Folder, NodeRef};

/// Depth-first, pre-order iterator over everything below a folder.
///
/// Each folder is yielded before its children; siblings come in insertion
/// order. The starting folder itself is not yielded.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Walk<'a> {
    /// Walk everything below `folder`.
    pub fn new(folder: &'a Folder) -> Self {
        let mut walk = Self { stack: Vec::new() };
        walk.push_children(folder);
        walk
    }

    fn push_children(&mut self, folder: &'a Folder) {
        let children: Vec<NodeRef<'a>> = folder.children().map(|(_, node)| node).collect();
        self.stack.extend(children.into_iter().rev());
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let NodeRef::Folder(folder) = node {
            self.push_children(folder);
        }
        Some(node)
    }
}
