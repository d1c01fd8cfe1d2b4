use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The files and subdirectories of a single directory, names sorted so that
/// trees built from the same disk state come out identical.
#[derive(Debug)]
pub struct DirListing {
    /// Regular file names.
    pub files: Vec<String>,
    /// (name, absolute path) per subdirectory.
    pub dirs: Vec<(String, PathBuf)>,
}

/// List one directory level. The `is_file` / `is_dir` checks follow symlinks;
/// anything that is neither (sockets, broken links) is skipped.
pub fn list_dir(dir: &Path) -> Result<DirListing> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    let read = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    for entry in read {
        let entry =
            entry.with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
        let path = entry.path();
        let name = entry
            .file_name()
            .into_string()
            .map_err(|name| anyhow::anyhow!("Non-UTF8 file name: {:?} in {}", name, dir.display()))?;

        if path.is_file() {
            files.push(name);
        } else if path.is_dir() {
            dirs.push((name, path));
        }
    }

    files.sort();
    dirs.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(DirListing { files, dirs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_is_sorted_and_split() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("zsub")).unwrap();
        std::fs::create_dir(dir.path().join("asub")).unwrap();

        let listing = list_dir(dir.path()).unwrap();
        assert_eq!(listing.files, vec!["a.txt", "b.txt"]);
        let names: Vec<&str> = listing.dirs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["asub", "zsub"]);
        assert_eq!(listing.dirs[0].1, dir.path().join("asub"));
    }

    #[test]
    fn test_missing_directory_names_path() {
        let err = list_dir(Path::new("/no/such/dir")).unwrap_err();
        assert!(format!("{err}").contains("/no/such/dir"));
    }
}
