use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::digest::ContentHasher;
use crate::error::ValidateError;
use crate::tree::{FileEntry, Manifest};
use crate::util;

/// Build a manifest of the tree rooted at `root`: per directory, the name and
/// content digest of every regular file, without retaining file bytes.
///
/// Any unreadable file or directory aborts the whole build; no partial
/// manifest is returned.
pub fn build_manifest<H: ContentHasher>(root: &Path, hasher: &H) -> Result<Manifest> {
    build_node(root.display().to_string(), root, hasher)
}

fn build_node<H: ContentHasher>(relative: String, dir: &Path, hasher: &H) -> Result<Manifest> {
    let mut node = Manifest::new(relative, dir.to_path_buf());
    let listing = util::list_dir(dir)?;

    for name in listing.files {
        let digest = hasher.hash_file(&dir.join(&name))?;
        node.entries.push(FileEntry {
            name,
            digest,
            content: (),
        });
    }

    for (name, path) in listing.dirs {
        node.children.push(build_node(name, &path, hasher)?);
    }

    debug!(
        "manifest: {} ({} files, {} dirs)",
        dir.display(),
        node.entries.len(),
        node.children.len()
    );

    Ok(node)
}

/// Check that every file the manifest references still exists on disk as a
/// regular file. Depth-first, files within a node before its subdirectories;
/// fails fast on the first offender, naming its full path.
pub fn validate_manifest(manifest: &Manifest) -> Result<(), ValidateError> {
    for entry in &manifest.entries {
        let path = manifest.absolute_path.join(&entry.name);
        if !path.exists() {
            return Err(ValidateError::Missing(path));
        }
        if !path.is_file() {
            return Err(ValidateError::NotAFile(path));
        }
    }

    for child in &manifest.children {
        validate_manifest(child)?;
    }

    Ok(())
}
