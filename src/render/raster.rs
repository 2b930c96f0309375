//! CPU raster surface backed by a tiny-skia pixmap.
//!
//! Glyph rasterization is not available here: `fill_text` is a no-op, so
//! labels appear as their colored chips only. Chip widths still follow
//! [`TextMetrics`].

use std::path::Path;

use tiny_skia::{ColorU8, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::{Color, Surface, TextMetrics};
use crate::geometry::{Point, Rect};
use crate::image_loader::Bitmap;

/// Software-rendered surface of a fixed pixel size.
pub struct PixmapSurface {
    pixmap: Pixmap,
    stroke_color: Color,
    fill_color: Color,
    line_width: f32,
    metrics: TextMetrics,
}

impl PixmapSurface {
    /// Create a transparent surface. Returns `None` for a zero-sized area.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            stroke_color: Color::BLACK,
            fill_color: Color::BLACK,
            line_width: 1.0,
            metrics: TextMetrics::label(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Demultiplied RGBA copy of the current contents.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut out = image::RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Encode the current contents as PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.to_rgba_image().save(path)
    }

    fn paint(color: Color) -> Paint<'static> {
        let [r, g, b, a] = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint
    }
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x(), rect.y(), rect.width(), rect.height())
}

impl Surface for PixmapSurface {
    fn draw_bitmap(&mut self, bitmap: &Bitmap) {
        let width = self.pixmap.width().min(bitmap.width()) as usize;
        let height = self.pixmap.height().min(bitmap.height()) as usize;
        let stride = self.pixmap.width() as usize;
        let pixels = self.pixmap.pixels_mut();
        for (x, y, px) in bitmap.pixels().enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            if x >= width || y >= height {
                continue;
            }
            let [r, g, b, a] = px.0;
            pixels[y * stride + x] = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let Some(r) = to_skia_rect(rect) else {
            log::trace!("Skipping degenerate stroke rect {:?}", rect);
            return;
        };
        let path = PathBuilder::from_rect(r);
        let stroke = Stroke {
            width: self.line_width,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &Self::paint(self.stroke_color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn fill_rect(&mut self, rect: Rect) {
        let Some(r) = to_skia_rect(rect) else {
            log::trace!("Skipping degenerate fill rect {:?}", rect);
            return;
        };
        self.pixmap
            .fill_rect(r, &Self::paint(self.fill_color), Transform::identity(), None);
    }

    fn fill_text(&mut self, text: &str, position: Point) {
        log::trace!(
            "Label '{}' at ({:.1}, {:.1}) not rasterized",
            text,
            position.x,
            position.y
        );
    }

    fn measure_text(&self, text: &str) -> f32 {
        self.metrics.line_width(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_surface_rejected() {
        assert!(PixmapSurface::new(0, 10).is_none());
    }

    #[test]
    fn test_draw_bitmap_copies_pixels() {
        let mut img = image::RgbaImage::new(4, 4);
        img.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        let bitmap = Bitmap::from_rgba(img);

        let mut surface = PixmapSurface::new(4, 4).expect("surface");
        surface.draw_bitmap(&bitmap);
        let out = surface.to_rgba_image();
        assert_eq!(out.get_pixel(1, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_fill_rect_paints_inside_only() {
        let mut surface = PixmapSurface::new(20, 20).expect("surface");
        surface.set_fill_color(Color::rgb8(255, 0, 0));
        surface.fill_rect(Rect::new(5.0, 5.0, 10.0, 10.0));
        let out = surface.to_rgba_image();
        assert_eq!(out.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(1, 1).0[3], 0);
    }
}
