use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::digest::ContentHasher;
use crate::tree::Snapshot;

/// Counts of what an extraction actually did. A second extraction of the same
/// snapshot onto the same target reports zero writes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub dirs_created: usize,
    pub files_written: usize,
    pub files_skipped: usize,
}

/// Merge a snapshot onto the directory at `target`: create missing
/// subdirectories, then write each file entry only if the target file is
/// absent or its on-disk digest differs from the entry's recorded digest.
///
/// Files already present in the target but not listed in the snapshot are left
/// alone — a delta is merged onto an existing base, never a replacement.
pub fn extract_snapshot<H: ContentHasher>(
    snapshot: &Snapshot,
    target: &Path,
    hasher: &H,
) -> Result<ExtractSummary> {
    std::fs::create_dir_all(target)
        .with_context(|| format!("Failed to create directory: {}", target.display()))?;

    let mut summary = ExtractSummary::default();
    extract_node(snapshot, target, hasher, &mut summary)?;
    Ok(summary)
}

fn extract_node<H: ContentHasher>(
    node: &Snapshot,
    target: &Path,
    hasher: &H,
    summary: &mut ExtractSummary,
) -> Result<()> {
    for child in &node.children {
        let dir = target.join(&child.relative_path);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            summary.dirs_created += 1;
        }
        extract_node(child, &dir, hasher, summary)?;
    }

    for entry in &node.entries {
        let path = target.join(&entry.name);
        if path.exists() && hasher.hash_file(&path)? == entry.digest {
            debug!("extract: skip {}", path.display());
            summary.files_skipped += 1;
            continue;
        }

        std::fs::write(&path, &entry.content)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        debug!("extract: wrote {} ({} bytes)", path.display(), entry.content.len());
        summary.files_written += 1;
    }

    Ok(())
}
