//! Class definitions shared by every image in a project.

use serde::{Deserialize, Serialize};

use crate::color_utils::{generated_hex_color, parse_hex_color};
use crate::constants::{DEFAULT_CLASS_COLOR, DEFAULT_CLASS_NAME};
use crate::render::Color;

/// A box class with a display name and a `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Display name of the class
    pub name: String,
    /// Hex color string, e.g. `#00ff00`
    pub color: String,
}

impl ClassDef {
    /// Create a new class with the given name and hex color.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    /// Create a class whose color is derived from its position in the list.
    pub fn with_generated_color(name: impl Into<String>, index: usize) -> Self {
        Self::new(name, generated_hex_color(index))
    }

    /// Parsed class color. Unparseable strings render as white.
    pub fn rgb(&self) -> Color {
        parse_hex_color(&self.color).unwrap_or(Color::WHITE)
    }
}

/// Class list used when a project defines none.
pub fn default_classes() -> Vec<ClassDef> {
    vec![ClassDef::new(DEFAULT_CLASS_NAME, DEFAULT_CLASS_COLOR)]
}
