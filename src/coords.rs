//! Coordinate transformation between display space and image space.
//!
//! The canvas is laid out at some display size (its bounding client rect)
//! while its backing store has the image's pixel size. Every pointer event
//! passes through [`CanvasGeometry::to_image_space`] before any geometry
//! operation.

use crate::constants::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::geometry::Point;

/// The canvas bounding rectangle in display (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ClientRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Display placement plus backing-store size of the drawing canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Where the canvas sits on screen.
    pub bounds: ClientRect,
    /// Backing store width in image pixels.
    pub backing_width: u32,
    /// Backing store height in image pixels.
    pub backing_height: u32,
}

impl CanvasGeometry {
    /// A canvas displayed 1:1 at the origin.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            bounds: ClientRect::new(0.0, 0.0, width as f32, height as f32),
            backing_width: width,
            backing_height: height,
        }
    }

    /// Horizontal and vertical display-to-image scale factors.
    ///
    /// A degenerate (zero or non-finite) display extent maps to scale 1.
    pub fn scale(&self) -> (f32, f32) {
        (
            axis_scale(self.backing_width, self.bounds.width),
            axis_scale(self.backing_height, self.bounds.height),
        )
    }

    /// Convert a client-space pointer position to image-pixel coordinates.
    pub fn to_image_space(&self, client_x: f32, client_y: f32) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            (client_x - self.bounds.left) * sx,
            (client_y - self.bounds.top) * sy,
        )
    }

    /// Replace the backing size, keeping the display placement.
    pub fn with_backing(self, width: u32, height: u32) -> Self {
        Self {
            backing_width: width,
            backing_height: height,
            ..self
        }
    }
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self::identity(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

fn axis_scale(backing: u32, display: f32) -> f32 {
    if display > 0.0 && display.is_finite() {
        backing as f32 / display
    } else {
        1.0
    }
}

/// Free-function form of [`CanvasGeometry::to_image_space`].
pub fn to_image_space(
    client_x: f32,
    client_y: f32,
    bounds: ClientRect,
    backing_width: u32,
    backing_height: u32,
) -> Point {
    CanvasGeometry {
        bounds,
        backing_width,
        backing_height,
    }
    .to_image_space(client_x, client_y)
}
