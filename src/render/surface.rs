use image::RgbaImage;

use crate::{
    foundation::color::Rgba8,
    render::composite::{self, Rgba8Px},
};

/// Mutable render target: straight-alpha RGBA8 pixels, row-major, top-left
/// raster origin.
///
/// Layer positions use the lower-left origin convention; the translation to
/// raster rows happens in the layer renderer, not here. All draw operations
/// clip silently at the surface bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a surface filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgba8) -> Self {
        let px = background.to_array();
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Straight-alpha RGBA at raster (x, y), or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Raw straight-alpha RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Composite `src` over this surface with its top-left raster corner at
    /// (dst_x, dst_y). Off-surface pixels are clipped, never an error.
    pub(crate) fn draw_image(&mut self, src: &RgbaImage, dst_x: i64, dst_y: i64) {
        let x0 = dst_x.max(0);
        let y0 = dst_y.max(0);
        let x1 = (dst_x + i64::from(src.width())).min(i64::from(self.width));
        let y1 = (dst_y + i64::from(src.height())).min(i64::from(self.height));

        for y in y0..y1 {
            for x in x0..x1 {
                let sp = src.get_pixel((x - dst_x) as u32, (y - dst_y) as u32).0;
                self.blend_px(x as u32, y as u32, sp);
            }
        }
    }

    /// Composite one straight-alpha pixel over raster (x, y); out-of-bounds
    /// coordinates are ignored.
    pub(crate) fn blend_at(&mut self, x: i64, y: i64, src: Rgba8Px) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        self.blend_px(x as u32, y as u32, src);
    }

    fn blend_px(&mut self, x: u32, y: u32, src: Rgba8Px) {
        let idx = self.index(x, y);
        let dst = [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ];
        let out = composite::over(dst, src);
        self.data[idx..idx + 4].copy_from_slice(&out);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Export a straight-alpha `image::RgbaImage` copy of the pixels.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("surface buffer length matches dimensions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_filled_with_background() {
        let s = Surface::new(3, 2, Rgba8::new(255, 255, 255, 0));
        assert_eq!(s.pixel(0, 0), Some([255, 255, 255, 0]));
        assert_eq!(s.pixel(2, 1), Some([255, 255, 255, 0]));
        assert_eq!(s.pixel(3, 0), None);
        assert_eq!(s.as_bytes().len(), 3 * 2 * 4);
    }

    #[test]
    fn draw_image_clips_negative_offsets() {
        let mut s = Surface::new(4, 4, Rgba8::new(0, 0, 0, 0));
        let src = RgbaImage::from_pixel(3, 3, image::Rgba([255, 0, 0, 255]));
        s.draw_image(&src, -2, -2);

        // Only the 1x1 overlap at the origin is drawn.
        assert_eq!(s.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(s.pixel(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(0, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn draw_image_clips_past_right_and_bottom_edges() {
        let mut s = Surface::new(4, 4, Rgba8::new(0, 0, 0, 0));
        let src = RgbaImage::from_pixel(3, 3, image::Rgba([0, 255, 0, 255]));
        s.draw_image(&src, 3, 3);

        assert_eq!(s.pixel(3, 3), Some([0, 255, 0, 255]));
        assert_eq!(s.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn draw_image_fully_off_surface_is_a_noop() {
        let mut s = Surface::new(4, 4, Rgba8::new(9, 9, 9, 255));
        let src = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        s.draw_image(&src, 10, 10);
        s.draw_image(&src, -5, -5);
        assert!(s.as_bytes().chunks_exact(4).all(|px| px == [9, 9, 9, 255]));
    }

    #[test]
    fn later_draw_occludes_earlier() {
        let mut s = Surface::new(2, 2, Rgba8::new(0, 0, 0, 0));
        let a = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let b = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]));
        s.draw_image(&a, 0, 0);
        s.draw_image(&b, 0, 0);
        assert_eq!(s.pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn blend_at_ignores_out_of_bounds() {
        let mut s = Surface::new(2, 2, Rgba8::new(0, 0, 0, 0));
        s.blend_at(-1, 0, [255, 255, 255, 255]);
        s.blend_at(0, 2, [255, 255, 255, 255]);
        assert!(s.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn to_rgba_image_round_trips_pixels() {
        let mut s = Surface::new(2, 1, Rgba8::new(255, 255, 255, 0));
        s.blend_at(1, 0, [10, 20, 30, 255]);
        let img = s.to_rgba_image();
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [10, 20, 30, 255]);
    }
}
