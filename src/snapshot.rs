use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::digest::ContentHasher;
use crate::tree::{FileEntry, Manifest, Snapshot};
use crate::util;

/// Build a self-contained snapshot of the tree rooted at `root`: same
/// traversal as the manifest builder, but file bytes are read in full and the
/// digest is computed over those bytes.
pub fn build_snapshot<H: ContentHasher>(root: &Path, hasher: &H) -> Result<Snapshot> {
    build_node(root.display().to_string(), root, hasher)
}

pub(crate) fn build_node<H: ContentHasher>(
    relative: String,
    dir: &Path,
    hasher: &H,
) -> Result<Snapshot> {
    let mut node = Snapshot::new(relative, dir.to_path_buf());
    let listing = util::list_dir(dir)?;

    for name in listing.files {
        let path = dir.join(&name);
        let content = std::fs::read(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let digest = hasher.hash_bytes(&content);
        node.entries.push(FileEntry {
            name,
            digest,
            content,
        });
    }

    for (name, path) in listing.dirs {
        node.children.push(build_node(name, &path, hasher)?);
    }

    debug!(
        "snapshot: {} ({} files, {} bytes)",
        dir.display(),
        node.entries.len(),
        node.entries.iter().map(|e| e.content.len()).sum::<usize>()
    );

    Ok(node)
}

/// Materialize a full snapshot from a manifest: read, from disk, exactly the
/// files the manifest references, pairing the manifest's recorded digest with
/// the freshly read bytes. The digest is trusted, not recomputed.
///
/// If any read fails the whole materialization aborts; no partial snapshot is
/// produced.
pub fn materialize(manifest: &Manifest) -> Result<Snapshot> {
    let mut node = Snapshot::new(
        manifest.relative_path.clone(),
        manifest.absolute_path.clone(),
    );

    for entry in &manifest.entries {
        let path = manifest.absolute_path.join(&entry.name);
        let content = std::fs::read(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        node.entries.push(FileEntry {
            name: entry.name.clone(),
            digest: entry.digest,
            content,
        });
    }

    for child in &manifest.children {
        node.children.push(materialize(child)?);
    }

    Ok(node)
}
