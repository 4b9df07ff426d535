use crate::foundation::{
    color::Rgb8,
    error::{MixError, MixResult},
};

/// Maximum number of layer references a single layout entry may carry,
/// matching the 30 layer columns of the layout table.
pub const MAX_LAYERS_PER_ENTRY: usize = 30;

/// Base surface definition for a creative. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Unique canvas key referenced by layout entries.
    pub canvas_id: String,
    /// Canvas width in pixels; must be > 0.
    pub width: u32,
    /// Canvas height in pixels; must be > 0.
    pub height: u32,
}

/// One image layer definition.
///
/// Positions use the lower-left origin convention: (position_x, position_y)
/// is the lower-left corner of the layer, measured from the lower-left
/// corner of the canvas with y increasing upward. Positions may be negative
/// or exceed canvas bounds; out-of-bounds pixels are clipped at render time.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageLayerSpec {
    /// Unique key among image layers.
    pub layer_id: String,
    /// Target width the source image is resized to; must be > 0.
    pub width: u32,
    /// Target height the source image is resized to; must be > 0.
    pub height: u32,
    /// Lower-left corner x.
    pub position_x: i32,
    /// Lower-left corner y.
    pub position_y: i32,
    /// Source file name, resolved by the asset collaborator.
    pub filename: String,
}

/// One text layer definition, under the same lower-left origin convention
/// as [`ImageLayerSpec`]: (position_x, position_y) anchors the lower-left
/// point of the rendered text.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextLayerSpec {
    /// Unique key among text layers.
    pub layer_id: String,
    /// Font size in pixels; must be > 0.
    pub font_size: u32,
    /// Text color, drawn at full opacity.
    pub color: Rgb8,
    /// Lower-left anchor x.
    pub position_x: i32,
    /// Lower-left anchor y.
    pub position_y: i32,
    /// Text to render; single line, no wrapping.
    pub text_content: String,
}

/// Row-level recipe binding one canvas to an ordered layer list and an
/// output file name.
///
/// Layers composite strictly in listed order: the first id is the backmost
/// (drawn first onto the canvas), later ids draw on top. An empty list is
/// legal and renders the bare background.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayoutEntry {
    /// File name the finished creative is persisted under.
    pub output_filename: String,
    /// Key into the canvas table.
    pub canvas_id: String,
    /// Ordered layer ids, at most [`MAX_LAYERS_PER_ENTRY`].
    pub layers: Vec<String>,
}

/// The full parsed template: all four tables, held immutably for a run.
///
/// A template is a pure data model that can be built from row tables
/// ([`crate::template_from_rows`]) or serialized/deserialized via Serde
/// (JSON). Rendering is performed by [`crate::Compositor`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    /// Canvas table.
    pub canvases: Vec<Canvas>,
    /// Image layer table.
    pub image_layers: Vec<ImageLayerSpec>,
    /// Text layer table.
    pub text_layers: Vec<TextLayerSpec>,
    /// Layout table; one entry per creative.
    pub layouts: Vec<LayoutEntry>,
}

impl Template {
    /// Validate record-level invariants.
    ///
    /// Checks positive dimensions and font sizes, non-empty ids, file names
    /// and text, per-table id uniqueness, unique output file names, and the
    /// per-entry layer cap. Canvas and layer references are deliberately
    /// NOT checked here: dangling references fail the owning entry at
    /// render time without aborting the rest of the batch.
    pub fn validate(&self) -> MixResult<()> {
        for canvas in &self.canvases {
            if canvas.canvas_id.trim().is_empty() {
                return Err(MixError::validation("canvas_id must be non-empty"));
            }
            if canvas.width == 0 || canvas.height == 0 {
                return Err(MixError::validation(format!(
                    "canvas '{}' width/height must be > 0",
                    canvas.canvas_id
                )));
            }
        }
        check_unique("canvas", self.canvases.iter().map(|c| c.canvas_id.as_str()))?;

        for layer in &self.image_layers {
            if layer.layer_id.trim().is_empty() {
                return Err(MixError::validation("image layer_id must be non-empty"));
            }
            if layer.width == 0 || layer.height == 0 {
                return Err(MixError::validation(format!(
                    "image layer '{}' width/height must be > 0",
                    layer.layer_id
                )));
            }
            if layer.filename.trim().is_empty() {
                return Err(MixError::validation(format!(
                    "image layer '{}' filename must be non-empty",
                    layer.layer_id
                )));
            }
        }
        check_unique(
            "image layer",
            self.image_layers.iter().map(|l| l.layer_id.as_str()),
        )?;

        for layer in &self.text_layers {
            if layer.layer_id.trim().is_empty() {
                return Err(MixError::validation("text layer_id must be non-empty"));
            }
            if layer.font_size == 0 {
                return Err(MixError::validation(format!(
                    "text layer '{}' font_size must be > 0",
                    layer.layer_id
                )));
            }
            if layer.text_content.is_empty() {
                return Err(MixError::validation(format!(
                    "text layer '{}' text_content must be non-empty",
                    layer.layer_id
                )));
            }
        }
        check_unique(
            "text layer",
            self.text_layers.iter().map(|l| l.layer_id.as_str()),
        )?;

        for entry in &self.layouts {
            if entry.output_filename.trim().is_empty() {
                return Err(MixError::validation("layout output_filename must be non-empty"));
            }
            if entry.canvas_id.trim().is_empty() {
                return Err(MixError::validation(format!(
                    "layout '{}' canvas_id must be non-empty",
                    entry.output_filename
                )));
            }
            if entry.layers.len() > MAX_LAYERS_PER_ENTRY {
                return Err(MixError::validation(format!(
                    "layout '{}' has {} layers, max is {MAX_LAYERS_PER_ENTRY}",
                    entry.output_filename,
                    entry.layers.len()
                )));
            }
        }
        check_unique(
            "layout output_filename",
            self.layouts.iter().map(|e| e.output_filename.as_str()),
        )?;

        Ok(())
    }
}

fn check_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> MixResult<()> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MixError::validation(format!("duplicate {kind} id '{id}'")));
        }
    }
    Ok(())
}
