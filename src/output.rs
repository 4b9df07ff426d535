use std::{
    collections::BTreeMap,
    io::Cursor,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use image::RgbaImage;

use crate::foundation::error::{MixError, MixResult};

/// Output collaborator boundary: persists finished creatives.
///
/// The engine does not know the storage medium. A write failure is
/// [`MixError::Write`] and counts as the owning entry's failure; it never
/// halts the batch.
pub trait OutputSink: Send + Sync {
    /// Persist `image` as a PNG under `filename`.
    fn write_png(&self, filename: &str, image: &RgbaImage) -> MixResult<()>;
}

/// Encode `image` as PNG bytes. Deterministic for identical pixel input.
pub fn encode_png(image: &RgbaImage) -> MixResult<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| MixError::write(format!("encode png: {e}")))?;
    Ok(buf)
}

/// Output sink writing PNG files under a directory, creating the directory
/// hierarchy on demand.
#[derive(Clone, Debug)]
pub struct DirOutputSink {
    dir: PathBuf,
}

impl DirOutputSink {
    /// Persist creatives under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirOutputSink {
    fn write_png(&self, filename: &str, image: &RgbaImage) -> MixResult<()> {
        let path = self.dir.join(filename);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MixError::write(format!(
                    "create output directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        let png = encode_png(image)?;
        std::fs::write(&path, png)
            .map_err(|e| MixError::write(format!("write '{}': {e}", path.display())))
    }
}

/// In-memory output sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryOutputSink {
    images: Mutex<BTreeMap<String, RgbaImage>>,
}

impl MemoryOutputSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// File names written so far, sorted.
    pub fn filenames(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// The image written under `filename`, if any.
    pub fn get(&self, filename: &str) -> Option<RgbaImage> {
        self.lock().get(filename).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, RgbaImage>> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputSink for MemoryOutputSink {
    fn write_png(&self, filename: &str, image: &RgbaImage) -> MixResult<()> {
        self.lock().insert(filename.to_string(), image.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_png_is_deterministic() {
        let img = RgbaImage::from_pixel(5, 4, image::Rgba([1, 2, 3, 200]));
        assert_eq!(encode_png(&img).unwrap(), encode_png(&img).unwrap());
    }

    #[test]
    fn dir_sink_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirOutputSink::new(tmp.path().join("out"));
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));

        sink.write_png("batch/one.png", &img).unwrap();

        let written = std::fs::read(tmp.path().join("out/batch/one.png")).unwrap();
        assert_eq!(written, encode_png(&img).unwrap());
    }

    #[test]
    fn memory_sink_records_writes() {
        let sink = MemoryOutputSink::new();
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([7, 7, 7, 255]));
        sink.write_png("a.png", &img).unwrap();
        sink.write_png("b.png", &img).unwrap();

        assert_eq!(sink.filenames(), vec!["a.png", "b.png"]);
        assert_eq!(sink.get("a.png").unwrap().get_pixel(0, 0).0, [7, 7, 7, 255]);
        assert!(sink.get("c.png").is_none());
    }
}
