use crate::foundation::error::{MixError, MixResult};

/// Decoded raster image in straight-alpha RGBA8 form.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data, row-major straight-alpha RGBA8.
    pub rgba8: image::RgbaImage,
}

/// Decode encoded image bytes (any format the `image` crate recognizes)
/// and convert to straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> MixResult<DecodedImage> {
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| MixError::decode(e.to_string()))?;
    let rgba8 = dyn_img.to_rgba8();
    let (width, height) = rgba8.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_png_to_rgba8() {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&buf).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(decoded.rgba8.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = decode_image(&[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, MixError::Decode(_)));
    }
}
