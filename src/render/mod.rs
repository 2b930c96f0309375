//! Box rendering onto an immediate-mode 2D surface.
//!
//! [`BoxRenderer`] is stateless: each call to [`BoxRenderer::render`] repaints
//! the whole frame from the data it is given and mutates nothing. Surfaces
//! only need the handful of primitives in [`Surface`].

mod raster;
mod recording;
mod text_metrics;

pub use raster::PixmapSurface;
pub use recording::{DrawCommand, RecordingSurface};
pub use text_metrics::TextMetrics;

use crate::color_utils::contrasting_text_color;
use crate::constants::{
    BOX_LINE_WIDTH, DEFAULT_CLASS_COLOR, DEFAULT_CLASS_NAME, HANDLE_SIZE, LABEL_HEIGHT,
    LABEL_PADDING, LABEL_TEXT_INSET, SELECTED_FILL_ALPHA, SELECTED_LINE_WIDTH,
};
use crate::geometry::{DragRect, Point, Rect, handle_rects};
use crate::image_loader::Bitmap;
use crate::model::{BoxAnnotation, ClassDef};

// ============================================================================
// Color
// ============================================================================

/// RGBA color with channels in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// The same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channels as 8-bit values, rounded and clamped.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

// ============================================================================
// Surface
// ============================================================================

/// Immediate-mode 2D drawing surface in image-pixel coordinates.
pub trait Surface {
    /// Paint the bitmap with its top-left corner at the origin.
    fn draw_bitmap(&mut self, bitmap: &Bitmap);
    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn stroke_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect);
    /// Draw text with its top-left corner at `position`, in the fill color.
    fn fill_text(&mut self, text: &str, position: Point);
    /// Width the given text occupies when drawn.
    fn measure_text(&self, text: &str) -> f32;
}

// ============================================================================
// Frame
// ============================================================================

/// Everything one repaint needs.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Decoded image; rendering is only possible once it exists.
    pub bitmap: &'a Bitmap,
    /// Stored boxes in z-order.
    pub boxes: &'a [BoxAnnotation],
    /// Shared class list.
    pub classes: &'a [ClassDef],
    /// Selected box index, if any.
    pub selected: Option<usize>,
    /// Live geometry of a box being moved or resized, drawn instead of its
    /// stored rectangle.
    pub live_edit: Option<(usize, DragRect)>,
    /// Rectangle being drawn and the class it will receive.
    pub preview: Option<(DragRect, usize)>,
}

// ============================================================================
// Renderer
// ============================================================================

/// Stateless painter for images, boxes, labels and handles.
#[derive(Debug, Clone, Copy)]
pub struct BoxRenderer {
    handle_size: f32,
}

impl Default for BoxRenderer {
    fn default() -> Self {
        Self::new(HANDLE_SIZE)
    }
}

impl BoxRenderer {
    pub fn new(handle_size: f32) -> Self {
        Self { handle_size }
    }

    /// Repaint the whole frame.
    pub fn render(&self, surface: &mut dyn Surface, frame: &Frame<'_>) {
        surface.draw_bitmap(frame.bitmap);

        for (index, ann) in frame.boxes.iter().enumerate() {
            let geometry = match frame.live_edit {
                Some((live_index, live)) if live_index == index => live,
                _ => ann.rect.to_drag(),
            };
            let rect = geometry.canonicalize();
            let (color, label) = resolve_class(frame.classes, ann.class_index);
            let is_selected = frame.selected == Some(index);

            self.draw_box(surface, rect, color, label, is_selected);
            if is_selected {
                self.draw_handles(surface, geometry);
            }
        }

        if let Some((rect, class_index)) = frame.preview {
            let (color, label) = match frame.classes.get(class_index) {
                Some(class) => (class.rgb(), class.name.as_str()),
                None => (default_preview_color(), DEFAULT_CLASS_NAME),
            };
            self.draw_box(surface, rect.canonicalize(), color, label, true);
        }
    }

    fn draw_box(
        &self,
        surface: &mut dyn Surface,
        rect: Rect,
        color: Color,
        label: &str,
        is_selected: bool,
    ) {
        surface.set_stroke_color(color);
        surface.set_line_width(if is_selected {
            SELECTED_LINE_WIDTH
        } else {
            BOX_LINE_WIDTH
        });
        surface.stroke_rect(rect);

        if is_selected {
            surface.set_fill_color(color.with_alpha(SELECTED_FILL_ALPHA));
            surface.fill_rect(rect);
        }

        // Label chip sits just above the canonical top-left corner
        let text_width = surface.measure_text(label);
        let chip = Rect::new(
            rect.x(),
            rect.y() - LABEL_HEIGHT,
            text_width + LABEL_PADDING,
            LABEL_HEIGHT,
        );
        surface.set_fill_color(color);
        surface.fill_rect(chip);

        surface.set_fill_color(contrasting_text_color(color));
        surface.fill_text(
            label,
            Point::new(
                rect.x() + LABEL_TEXT_INSET,
                rect.y() - LABEL_HEIGHT + LABEL_TEXT_INSET,
            ),
        );
    }

    fn draw_handles(&self, surface: &mut dyn Surface, geometry: DragRect) {
        surface.set_fill_color(Color::WHITE);
        surface.set_stroke_color(Color::BLACK);
        surface.set_line_width(1.0);
        for (_, square) in handle_rects(geometry, self.handle_size) {
            surface.fill_rect(square);
            surface.stroke_rect(square);
        }
    }
}

/// Color and name used to draw a box of the given class.
///
/// An index past the end of the class list is drawn as class 0; stored data
/// is left untouched.
pub fn resolve_class(classes: &[ClassDef], class_index: usize) -> (Color, &str) {
    match classes.get(class_index).or_else(|| classes.first()) {
        Some(class) => (class.rgb(), class.name.as_str()),
        None => (Color::WHITE, "?"),
    }
}

fn default_preview_color() -> Color {
    crate::color_utils::parse_hex_color(DEFAULT_CLASS_COLOR).unwrap_or(Color::WHITE)
}
