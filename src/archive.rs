use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::tree::{Manifest, Snapshot, TreeNode};

pub const MAGIC: &[u8; 8] = b"TSARCH01";
pub const FORMAT_VERSION: u32 = 1;

/// Zstd compression level for archive payloads.
const COMPRESSION_LEVEL: i32 = 3;

/// What a serialized archive carries. Tagged so that loading a manifest blob
/// as a snapshot fails cleanly instead of producing a garbled tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveKind {
    Manifest,
    Snapshot,
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveKind::Manifest => write!(f, "manifest"),
            ArchiveKind::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Write-side framing: header fields, then the tree, in one bincode stream.
/// The tree is borrowed; serde serializes through the reference.
#[derive(Serialize)]
struct ArchiveRef<'a, C> {
    version: u32,
    kind: ArchiveKind,
    root: &'a TreeNode<C>,
}

/// Read-side prefix of the encoded stream; field order must match
/// `ArchiveRef` up to `root`, which is decoded separately.
#[derive(Deserialize)]
struct ArchiveHeader {
    version: u32,
    kind: ArchiveKind,
}

fn encode<C: Serialize>(kind: ArchiveKind, root: &TreeNode<C>) -> Result<Vec<u8>> {
    let archive = ArchiveRef {
        version: FORMAT_VERSION,
        kind,
        root,
    };

    let encoded = bincode::serialize(&archive).context("Failed to serialize archive")?;
    let compressed = zstd::bulk::compress(&encoded, COMPRESSION_LEVEL)
        .context("Failed to compress archive data")?;

    let mut out = Vec::with_capacity(MAGIC.len() + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&compressed);
    Ok(out)
}

fn check_magic(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        bail!("Invalid archive: missing magic header");
    }
    Ok(&bytes[MAGIC.len()..])
}

fn decode<C: DeserializeOwned>(bytes: &[u8], expected: ArchiveKind) -> Result<TreeNode<C>> {
    let payload = check_magic(bytes)?;
    let mut decoder = zstd::Decoder::new(payload).context("Failed to create zstd decoder")?;

    // The header is checked before the tree is touched: a mis-typed blob must
    // fail on the kind tag, not on a garbled tree decode.
    let header: ArchiveHeader = bincode::deserialize_from(&mut decoder)
        .context("Failed to deserialize archive header")?;
    if header.version != FORMAT_VERSION {
        bail!(
            "Unsupported archive version: {} (expected {})",
            header.version,
            FORMAT_VERSION
        );
    }
    if header.kind != expected {
        bail!("Archive contains a {}, expected a {}", header.kind, expected);
    }

    let root: TreeNode<C> =
        bincode::deserialize_from(decoder).context("Failed to deserialize archive")?;
    Ok(root)
}

/// Read only the kind tag of an archive, without decoding the tree.
pub fn peek_kind(bytes: &[u8]) -> Result<ArchiveKind> {
    let payload = check_magic(bytes)?;
    let decoder = zstd::Decoder::new(payload).context("Failed to create zstd decoder")?;
    let header: ArchiveHeader =
        bincode::deserialize_from(decoder).context("Failed to deserialize archive header")?;

    if header.version != FORMAT_VERSION {
        bail!(
            "Unsupported archive version: {} (expected {})",
            header.version,
            FORMAT_VERSION
        );
    }
    Ok(header.kind)
}

pub fn serialize_manifest(manifest: &Manifest) -> Result<Vec<u8>> {
    encode(ArchiveKind::Manifest, manifest)
}

pub fn deserialize_manifest(bytes: &[u8]) -> Result<Manifest> {
    decode(bytes, ArchiveKind::Manifest)
}

pub fn serialize_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>> {
    encode(ArchiveKind::Snapshot, snapshot)
}

pub fn deserialize_snapshot(bytes: &[u8]) -> Result<Snapshot> {
    decode(bytes, ArchiveKind::Snapshot)
}

fn save_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

fn load_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read archive: {}", path.display()))
}

pub fn save_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    save_bytes(&serialize_manifest(manifest)?, path)
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    deserialize_manifest(&load_bytes(path)?)
}

pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    save_bytes(&serialize_snapshot(snapshot)?, path)
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    deserialize_snapshot(&load_bytes(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{Blake3Hasher, ContentHasher};
    use crate::tree::FileEntry;
    use std::path::PathBuf;

    fn sample_snapshot() -> Snapshot {
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
    fn test_snapshot_round_trip() {
        let snapshot = sample_snapshot();
        let bytes = serialize_snapshot(&snapshot).unwrap();
        assert_eq!(&bytes[..MAGIC.len()], MAGIC);
        let decoded = deserialize_snapshot(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_manifest_round_trip() {
        let h = Blake3Hasher;
        let mut manifest = Manifest::new("root".into(), PathBuf::from("/tmp/root"));
        manifest.entries.push(FileEntry {
            name: "a.txt".into(),
            digest: h.hash_bytes(b"hello"),
            content: (),
        });
        let bytes = serialize_manifest(&manifest).unwrap();
        assert_eq!(deserialize_manifest(&bytes).unwrap(), manifest);
        assert_eq!(peek_kind(&bytes).unwrap(), ArchiveKind::Manifest);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let err = deserialize_snapshot(b"NOTMAGIC rest").unwrap_err();
        assert!(format!("{err}").contains("magic"));

        let err = deserialize_snapshot(b"TS").unwrap_err();
        assert!(format!("{err}").contains("magic"));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let bytes = serialize_snapshot(&sample_snapshot()).unwrap();
        assert_eq!(peek_kind(&bytes).unwrap(), ArchiveKind::Snapshot);
        let err = deserialize_manifest(&bytes).unwrap_err();
        assert!(format!("{err}").contains("expected a manifest"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.tsar");
        let snapshot = sample_snapshot();
        save_snapshot(&snapshot, &path).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), snapshot);
    }
}
