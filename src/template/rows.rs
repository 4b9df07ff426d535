//! Building a [`Template`] from the four ordered row tables.
//!
//! The template source supplies data rows (header rows already stripped)
//! with fixed column orders:
//!
//! - `LAYOUT(output_filename, canvas_id, layer_1..layer_30)`
//! - `CANVAS(canvas_id, width, height)`
//! - `TEXT_LAYER(layer_id, font_size, color_r, color_g, color_b, position_x, position_y, text_content)`
//! - `IMAGE_LAYER(layer_id, width, height, position_x, position_y, filename)`
//!
//! Cell values are trimmed. Empty layer cells in a layout row are dropped,
//! not kept as positional gaps.

use crate::{
    foundation::color::Rgb8,
    foundation::error::{MixError, MixResult},
    template::model::{
        Canvas, ImageLayerSpec, LayoutEntry, MAX_LAYERS_PER_ENTRY, Template, TextLayerSpec,
    },
};

/// Build a validated [`Template`] from the four row tables.
pub fn template_from_rows(
    layout_rows: &[Vec<String>],
    canvas_rows: &[Vec<String>],
    text_layer_rows: &[Vec<String>],
    image_layer_rows: &[Vec<String>],
) -> MixResult<Template> {
    let template = Template {
        canvases: canvas_rows
            .iter()
            .enumerate()
            .map(|(i, row)| canvas_from_row(i, row))
            .collect::<MixResult<Vec<_>>>()?,
        image_layers: image_layer_rows
            .iter()
            .enumerate()
            .map(|(i, row)| image_layer_from_row(i, row))
            .collect::<MixResult<Vec<_>>>()?,
        text_layers: text_layer_rows
            .iter()
            .enumerate()
            .map(|(i, row)| text_layer_from_row(i, row))
            .collect::<MixResult<Vec<_>>>()?,
        layouts: layout_rows
            .iter()
            .enumerate()
            .map(|(i, row)| layout_from_row(i, row))
            .collect::<MixResult<Vec<_>>>()?,
    };
    template.validate()?;
    Ok(template)
}

fn canvas_from_row(index: usize, row: &[String]) -> MixResult<Canvas> {
    let mut row = RowReader::new("CANVAS", index, row);
    Ok(Canvas {
        canvas_id: row.string("canvas_id")?,
        width: row.u32("width")?,
        height: row.u32("height")?,
    })
}

fn image_layer_from_row(index: usize, row: &[String]) -> MixResult<ImageLayerSpec> {
    let mut row = RowReader::new("IMAGE_LAYER", index, row);
    Ok(ImageLayerSpec {
        layer_id: row.string("layer_id")?,
        width: row.u32("width")?,
        height: row.u32("height")?,
        position_x: row.i32("position_x")?,
        position_y: row.i32("position_y")?,
        filename: row.string("filename")?,
    })
}

fn text_layer_from_row(index: usize, row: &[String]) -> MixResult<TextLayerSpec> {
    let mut row = RowReader::new("TEXT_LAYER", index, row);
    Ok(TextLayerSpec {
        layer_id: row.string("layer_id")?,
        font_size: row.u32("font_size")?,
        color: Rgb8::new(row.u8("color_r")?, row.u8("color_g")?, row.u8("color_b")?),
        position_x: row.i32("position_x")?,
        position_y: row.i32("position_y")?,
        text_content: row.string("text_content")?,
    })
}

fn layout_from_row(index: usize, row: &[String]) -> MixResult<LayoutEntry> {
    let mut reader = RowReader::new("LAYOUT", index, row);
    let output_filename = reader.string("output_filename")?;
    let canvas_id = reader.string("canvas_id")?;

    // Both leading columns parsed above, so the rest are layer cells.
    let layer_cells = &row[2..];
    if layer_cells.len() > MAX_LAYERS_PER_ENTRY {
        return Err(MixError::validation(format!(
            "LAYOUT row {index}: {} layer columns, max is {MAX_LAYERS_PER_ENTRY}",
            layer_cells.len()
        )));
    }

    // Empty slots are dropped here, so renderers see a dense ordered list.
    let layers = layer_cells
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect();

    Ok(LayoutEntry {
        output_filename,
        canvas_id,
        layers,
    })
}

struct RowReader<'a> {
    table: &'static str,
    index: usize,
    row: &'a [String],
    cursor: usize,
}

impl<'a> RowReader<'a> {
    fn new(table: &'static str, index: usize, row: &'a [String]) -> Self {
        Self {
            table,
            index,
            row,
            cursor: 0,
        }
    }

    fn cell(&mut self, column: &str) -> MixResult<&'a str> {
        let cell = self.row.get(self.cursor).ok_or_else(|| {
            MixError::validation(format!(
                "{} row {}: missing column '{column}'",
                self.table, self.index
            ))
        })?;
        self.cursor += 1;
        Ok(cell.trim())
    }

    fn string(&mut self, column: &str) -> MixResult<String> {
        let cell = self.cell(column)?;
        if cell.is_empty() {
            return Err(MixError::validation(format!(
                "{} row {}: column '{column}' must be non-empty",
                self.table, self.index
            )));
        }
        Ok(cell.to_string())
    }

    fn u32(&mut self, column: &str) -> MixResult<u32> {
        self.parse(column)
    }

    fn i32(&mut self, column: &str) -> MixResult<i32> {
        self.parse(column)
    }

    fn u8(&mut self, column: &str) -> MixResult<u8> {
        self.parse(column)
    }

    fn parse<T: std::str::FromStr>(&mut self, column: &str) -> MixResult<T> {
        let table = self.table;
        let index = self.index;
        let cell = self.cell(column)?;
        cell.parse().map_err(|_| {
            MixError::validation(format!(
                "{table} row {index}: column '{column}' has invalid value '{cell}'"
            ))
        })
    }
}
