use ab_glyph::{Font, PxScale, ScaleFont};

use crate::{
    assets::font::FontResource, render::surface::Surface, template::model::TextLayerSpec,
};

/// Width and height in pixels of `text` laid out at `font_size`.
///
/// Width is the kerned advance sum; height is the scaled font box
/// (ascent minus descent). Matches the box [`draw_text`] anchors by.
pub fn text_extent(font: &FontResource, text: &str, font_size: u32) -> (u32, u32) {
    let scale = PxScale::from(font_size as f32);
    let f = font.as_font().as_scaled(scale);

    let mut width = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;
    for c in text.chars() {
        let id = f.glyph_id(c);
        if let Some(prev) = prev {
            width += f.kern(prev, id);
        }
        width += f.h_advance(id);
        prev = Some(id);
    }

    (width.ceil() as u32, f.height().ceil() as u32)
}

/// Draw a single line of text onto `surface`.
///
/// The anchor (position_x, position_y) is the lower-left point of the
/// scaled font box in canvas coordinates (origin bottom-left, y up): the
/// baseline sits |descent| above the anchor row. No wrapping, no
/// auto-resize; glyph pixels outside the surface are clipped.
pub(crate) fn draw_text(surface: &mut Surface, spec: &TextLayerSpec, font: &FontResource) {
    let scale = PxScale::from(spec.font_size as f32);
    let f = font.as_font().as_scaled(scale);

    // Flip the anchor to raster rows; descent is negative.
    let baseline_y = surface.height() as f32 - spec.position_y as f32 + f.descent();
    let mut cursor_x = spec.position_x as f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;
    let color = spec.color;

    for c in spec.text_content.chars() {
        let id = f.glyph_id(c);
        if let Some(prev) = prev {
            cursor_x += f.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
        if let Some(outlined) = font.as_font().outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = i64::from(px) + bounds.min.x as i64;
                let y = i64::from(py) + bounds.min.y as i64;
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                surface.blend_at(x, y, [color.r, color.g, color.b, alpha]);
            });
        }

        cursor_x += f.h_advance(id);
        prev = Some(id);
    }
}
