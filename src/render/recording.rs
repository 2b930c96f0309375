//! A surface that records draw commands instead of rasterizing them.
//!
//! Useful for headless hosts that forward commands to their own drawing
//! backend, and for asserting on rendering output in tests.

use super::{Color, Surface, TextMetrics};
use crate::geometry::{Point, Rect};
use crate::image_loader::Bitmap;

/// A resolved draw command, with the pen state at the time it was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    DrawBitmap {
        width: u32,
        height: u32,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    FillText {
        text: String,
        position: Point,
        color: Color,
    },
}

/// Records every primitive as a [`DrawCommand`].
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    stroke_color: Color,
    fill_color: Color,
    line_width: f32,
    metrics: TextMetrics,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::with_metrics(TextMetrics::label())
    }

    pub fn with_metrics(metrics: TextMetrics) -> Self {
        Self {
            commands: Vec::new(),
            stroke_color: Color::BLACK,
            fill_color: Color::BLACK,
            line_width: 1.0,
            metrics,
        }
    }

    /// Commands recorded so far, in issue order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the surface empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RecordingSurface {
    fn draw_bitmap(&mut self, bitmap: &Bitmap) {
        self.commands.push(DrawCommand::DrawBitmap {
            width: bitmap.width(),
            height: bitmap.height(),
        });
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
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: self.stroke_color,
            width: self.line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: self.fill_color,
        });
    }

    fn fill_text(&mut self, text: &str, position: Point) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            position,
            color: self.fill_color,
        });
    }

    fn measure_text(&self, text: &str) -> f32 {
        self.metrics.line_width(text)
    }
}
