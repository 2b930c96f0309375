//! Image entries and their box lists.

use serde::{Deserialize, Serialize};

use super::BoxAnnotation;

/// An image in the project together with its boxes.
///
/// Box order is z-order: later entries draw on top and win hit-test ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// File name, also the persistence key
    pub name: String,
    /// Location handed to the image provider
    pub url: String,
    /// Pixel width (0 until known)
    #[serde(default)]
    pub width: u32,
    /// Pixel height (0 until known)
    #[serde(default)]
    pub height: u32,
    /// Boxes in z-order
    #[serde(default)]
    pub boxes: Vec<BoxAnnotation>,
}

impl ImageEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            width: 0,
            height: 0,
            boxes: Vec::new(),
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_boxes(mut self, boxes: Vec<BoxAnnotation>) -> Self {
        self.boxes = boxes;
        self
    }

    /// Whether the image carries at least one box.
    pub fn is_annotated(&self) -> bool {
        !self.boxes.is_empty()
    }
}
