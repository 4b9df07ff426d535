use crate::{
    assets::cache::ImageCache,
    assets::font::FontResource,
    foundation::error::{MixError, MixResult},
    render::{pipeline::RenderOptions, surface::Surface, text},
    template::model::ImageLayerSpec,
    template::registry::LayerRef,
};

/// Render one resolved layer onto `surface`.
///
/// Image and text layers share the lower-left origin convention; this is
/// where canvas coordinates become raster rows.
pub(crate) fn render_layer(
    surface: &mut Surface,
    layer: LayerRef<'_>,
    images: &ImageCache,
    font: Option<&FontResource>,
    options: &RenderOptions,
) -> MixResult<()> {
    match layer {
        LayerRef::Image(spec) => render_image_layer(surface, spec, images, options),
        LayerRef::Text(spec) => {
            let font = font.ok_or_else(|| {
                MixError::font_load("no font resource configured for text layers")
            })?;
            text::draw_text(surface, spec, font);
            Ok(())
        }
    }
}

fn render_image_layer(
    surface: &mut Surface,
    spec: &ImageLayerSpec,
    images: &ImageCache,
    options: &RenderOptions,
) -> MixResult<()> {
    let decoded = images.get(&spec.filename)?;

    // Lower-left corner in canvas coordinates -> top-left raster corner.
    let dst_x = i64::from(spec.position_x);
    let dst_y =
        i64::from(surface.height()) - i64::from(spec.position_y) - i64::from(spec.height);

    if decoded.width == spec.width && decoded.height == spec.height {
        surface.draw_image(&decoded.rgba8, dst_x, dst_y);
    } else {
        let resized = image::imageops::resize(
            &decoded.rgba8,
            spec.width,
            spec.height,
            options.filter.to_image_filter(),
        );
        surface.draw_image(&resized, dst_x, dst_y);
    }
    Ok(())
}
