use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::digest::Digest;

/// One file record inside a directory node. `C` is the payload carried per
/// file: `()` for manifests (digest only), `Vec<u8>` for snapshots (full
/// content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry<C> {
    pub name: String,
    pub digest: Digest,
    pub content: C,
}

pub type ManifestEntry = FileEntry<()>;
pub type SnapshotEntry = FileEntry<Vec<u8>>;

/// One directory of a recursive tree. Built bottom-up by the builders and
/// immutable afterwards; entries and children mirror the directory's on-disk
/// shape at the moment of construction only.
///
/// `relative_path` is a single directory name for child nodes; for a tree's
/// root it is the path the build was rooted at. `absolute_path` is the
/// resolved disk path the node was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode<C> {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub entries: Vec<FileEntry<C>>,
    pub children: Vec<TreeNode<C>>,
}

/// A tree recording (name, digest) per file, without content.
pub type Manifest = TreeNode<()>;

/// A tree recording (name, digest, content) per file.
pub type Snapshot = TreeNode<Vec<u8>>;

impl<C> TreeNode<C> {
    pub fn new(relative_path: String, absolute_path: PathBuf) -> Self {
        Self {
            relative_path,
            absolute_path,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up a file entry by name.
    pub fn entry(&self, name: &str) -> Option<&FileEntry<C>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Look up a child directory by its relative name.
    pub fn child(&self, name: &str) -> Option<&TreeNode<C>> {
        self.children.iter().find(|c| c.relative_path == name)
    }

    /// Number of file entries in the whole subtree.
    pub fn file_count(&self) -> usize {
        self.entries.len() + self.children.iter().map(|c| c.file_count()).sum::<usize>()
    }

    /// True when no node anywhere in the subtree carries a file entry.
    /// An empty delta may still contain (empty) nodes for matched
    /// subdirectories, so this checks entries, not structure.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.children.iter().all(|c| c.is_empty())
    }
}

impl Snapshot {
    /// Total content bytes carried by the subtree.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.content.len() as u64).sum::<u64>()
            + self.children.iter().map(|c| c.total_bytes()).sum::<u64>()
    }
}

impl<C> fmt::Display for TreeNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn render<C>(node: &TreeNode<C>, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let pad = "  ".repeat(depth);
            writeln!(f, "{pad}{}/", node.relative_path)?;
            for entry in &node.entries {
                writeln!(f, "{pad}  {}  {}", entry.digest, entry.name)?;
            }
            for child in &node.children {
                render(child, depth + 1, f)?;
            }
            Ok(())
        }
        render(self, 0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{Blake3Hasher, ContentHasher};

    fn sample() -> Snapshot {
        let h = Blake3Hasher;
        let mut root = Snapshot::new("root".into(), PathBuf::from("/tmp/root"));
        root.entries.push(FileEntry {
            name: "a.txt".into(),
            digest: h.hash_bytes(b"hello"),
            content: b"hello".to_vec(),
        });
        let mut sub = Snapshot::new("sub".into(), PathBuf::from("/tmp/root/sub"));
        sub.entries.push(FileEntry {
            name: "b.txt".into(),
            digest: h.hash_bytes(b"world"),
            content: b"world".to_vec(),
        });
        root.children.push(sub);
        root
    }

    #[test]
    fn test_lookup_helpers() {
        let tree = sample();
        assert!(tree.entry("a.txt").is_some());
        assert!(tree.entry("missing").is_none());
        assert_eq!(tree.child("sub").unwrap().entries.len(), 1);
        assert!(tree.child("nope").is_none());
    }

    #[test]
    fn test_counts() {
        let tree = sample();
        assert_eq!(tree.file_count(), 2);
        assert_eq!(tree.total_bytes(), 10);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_is_empty_sees_through_structure() {
        let mut root = Manifest::new("root".into(), PathBuf::from("/tmp/root"));
        root.children
            .push(Manifest::new("sub".into(), PathBuf::from("/tmp/root/sub")));
        assert!(root.is_empty());
    }

    #[test]
    fn test_display_lists_every_entry() {
        let out = sample().to_string();
        assert!(out.contains("root/"));
        assert!(out.contains("a.txt"));
        assert!(out.contains("b.txt"));
        assert!(out.contains("  sub/"));
    }
}
