use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::foundation::error::{MixError, MixResult};

/// Asset collaborator boundary: maps a file name to raw bytes.
///
/// The engine does not know the storage medium; implementations may read a
/// local directory, a mounted cloud-drive folder, or test fixtures.
pub trait AssetSource: Send + Sync {
    /// Return the raw bytes stored under `filename`, or
    /// [`MixError::AssetNotFound`] if nothing is stored there.
    fn read(&self, filename: &str) -> MixResult<Vec<u8>>;
}

/// Asset source over a filesystem directory.
#[derive(Clone, Debug)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    /// Serve assets from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory relative asset file names resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssetSource {
    fn read(&self, filename: &str) -> MixResult<Vec<u8>> {
        let rel = normalize_rel_path(filename)?;
        let path = self.root.join(Path::new(&rel));
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MixError::AssetNotFound(filename.to_string()))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read asset bytes from '{}'", path.display()))
                .into()),
        }
    }
}

/// In-memory asset source for fixtures and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under `filename`, replacing any previous content.
    pub fn insert(&mut self, filename: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(filename.into(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn read(&self, filename: &str) -> MixResult<Vec<u8>> {
        self.files
            .get(filename)
            .cloned()
            .ok_or_else(|| MixError::AssetNotFound(filename.to_string()))
    }
}

/// Normalize and validate asset-relative file names.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> MixResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MixError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(MixError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MixError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MixError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_plain_relative_paths() {
        assert_eq!(normalize_rel_path("img.png").unwrap(), "img.png");
        assert_eq!(normalize_rel_path("a/b/img.png").unwrap(), "a/b/img.png");
    }

    #[test]
    fn normalize_strips_dot_segments_and_backslashes() {
        assert_eq!(normalize_rel_path("./a/./img.png").unwrap(), "a/img.png");
        assert_eq!(normalize_rel_path("a\\img.png").unwrap(), "a/img.png");
    }

    #[test]
    fn normalize_rejects_absolute_and_traversal() {
        assert!(normalize_rel_path("/etc/passwd").is_err());
        assert!(normalize_rel_path("../img.png").is_err());
        assert!(normalize_rel_path("a/../img.png").is_err());
        assert!(normalize_rel_path("").is_err());
    }

    #[test]
    fn memory_source_round_trips() {
        let mut source = MemoryAssetSource::new();
        source.insert("a.png", vec![1, 2, 3]);
        assert_eq!(source.read("a.png").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            source.read("b.png"),
            Err(MixError::AssetNotFound(f)) if f == "b.png"
        ));
    }

    #[test]
    fn dir_source_missing_file_is_asset_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let source = DirAssetSource::new(tmp.path());
        assert!(matches!(
            source.read("missing.png"),
            Err(MixError::AssetNotFound(f)) if f == "missing.png"
        ));
    }

    #[test]
    fn dir_source_reads_file_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.bin"), [9u8, 8, 7]).unwrap();
        let source = DirAssetSource::new(tmp.path());
        assert_eq!(source.read("a.bin").unwrap(), vec![9, 8, 7]);
    }
}
