use std::fmt;
use std::path::{Path, PathBuf};

/// Validation found a manifest-referenced path that is no longer a regular
/// file. Carries the full offending path so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// The referenced path does not exist.
    Missing(PathBuf),
    /// The referenced path exists but is not a regular file.
    NotAFile(PathBuf),
}

impl ValidateError {
    pub fn path(&self) -> &Path {
        match self {
            ValidateError::Missing(p) | ValidateError::NotAFile(p) => p,
        }
    }
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateError::Missing(p) => write!(f, "File {} does not exist", p.display()),
            ValidateError::NotAFile(p) => write!(f, "Entry {} is not a file", p.display()),
        }
    }
}

impl std::error::Error for ValidateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_path() {
        let err = ValidateError::Missing(PathBuf::from("/data/sub/b.txt"));
        assert_eq!(format!("{err}"), "File /data/sub/b.txt does not exist");
        assert_eq!(err.path(), Path::new("/data/sub/b.txt"));

        let err = ValidateError::NotAFile(PathBuf::from("/data/dir"));
        assert_eq!(format!("{err}"), "Entry /data/dir is not a file");
    }
}
