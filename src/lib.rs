//! Directory tree synchronization with minimal data movement.
//!
//! Build a content-addressed [`Manifest`] of a directory, diff it against the
//! live filesystem into a sparse delta [`Snapshot`] holding only added and
//! changed files, persist it as a compressed archive, and merge it onto a
//! target directory with hash-gated writes.

pub mod archive;
pub mod delta;
pub mod digest;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod snapshot;
pub mod tree;
pub mod util;

pub use digest::{Blake3Hasher, ContentHasher, Digest};
pub use error::ValidateError;
pub use tree::{FileEntry, Manifest, Snapshot, TreeNode};
