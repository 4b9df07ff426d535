use std::path::Path;

use ab_glyph::FontArc;

use crate::foundation::error::{MixError, MixResult};

/// Font collaborator boundary: one loaded font face, usable at arbitrary
/// sizes.
///
/// A `FontResource` is constructed once per run and injected into the
/// [`crate::Compositor`]; it is cheap to clone and safe to share across
/// concurrent entry renders.
#[derive(Clone)]
pub struct FontResource {
    font: FontArc,
}

impl FontResource {
    /// Parse a font from raw file bytes (TTF/OTF).
    pub fn from_bytes(bytes: Vec<u8>) -> MixResult<Self> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| MixError::font_load(format!("parse font data: {e}")))?;
        Ok(Self { font })
    }

    /// Read and parse a font file.
    pub fn from_path(path: impl AsRef<Path>) -> MixResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| MixError::font_load(format!("read font file '{}': {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn as_font(&self) -> &FontArc {
        &self.font
    }
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("units_per_em", &ab_glyph::Font::units_per_em(&self.font))
            .finish()
    }
}
