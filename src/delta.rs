use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::digest::ContentHasher;
use crate::snapshot;
use crate::tree::{FileEntry, Manifest, Snapshot};
use crate::util;

/// Compare a manifest against the current state of the directory at
/// `live_root` and produce a sparse snapshot of only the added and changed
/// entries.
///
/// Per directory:
/// - a live subdirectory matched by name in the manifest is recursed into, and
///   the result is attached even when empty — a subtree with no changes at
///   this level may still hold new files deeper inside;
/// - an unmatched live subdirectory is entirely new and gets a full snapshot
///   subtree;
/// - a live file whose fresh content digest equals the manifest's recorded
///   digest is omitted; otherwise its bytes are read and included with a
///   digest of those bytes.
///
/// Manifest entries with no live counterpart produce nothing: deletions are
/// neither detected nor propagated. A read failure on any file aborts the
/// whole computation.
pub fn build_delta<H: ContentHasher>(
    manifest: &Manifest,
    live_root: &Path,
    hasher: &H,
) -> Result<Snapshot> {
    let mut node = Snapshot::new(
        manifest.relative_path.clone(),
        manifest.absolute_path.clone(),
    );
    let listing = util::list_dir(live_root)?;

    for (name, path) in listing.dirs {
        match manifest.child(&name) {
            Some(child_manifest) => {
                node.children
                    .push(build_delta(child_manifest, &path, hasher)?);
            }
            None => {
                debug!("delta: new directory {}", path.display());
                node.children
                    .push(snapshot::build_node(name, &path, hasher)?);
            }
        }
    }

    for name in listing.files {
        let path = live_root.join(&name);

        if let Some(entry) = manifest.entry(&name) {
            if hasher.hash_file(&path)? == entry.digest {
                debug!("delta: unchanged {}", path.display());
                continue;
            }
            debug!("delta: changed {}", path.display());
        } else {
            debug!("delta: new file {}", path.display());
        }

        let content = std::fs::read(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let digest = hasher.hash_bytes(&content);
        node.entries.push(FileEntry {
            name,
            digest,
            content,
        });
    }

    Ok(node)
}
