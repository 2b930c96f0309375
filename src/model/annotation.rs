//! Bounding box annotation data model.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A committed bounding box: canonical geometry plus a class index.
///
/// Serialized as `{"classIndex", "x", "y", "w", "h"}`. Geometry read from
/// disk is canonicalized on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoxEntry", into = "BoxEntry")]
pub struct BoxAnnotation {
    /// Index into the shared class list.
    pub class_index: usize,
    /// Canonical geometry in image pixels.
    pub rect: Rect,
}

impl BoxAnnotation {
    pub fn new(class_index: usize, rect: Rect) -> Self {
        Self { class_index, rect }
    }
}

/// On-disk representation of a box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxEntry {
    #[serde(default)]
    class_index: usize,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl From<BoxEntry> for BoxAnnotation {
    fn from(entry: BoxEntry) -> Self {
        Self::new(entry.class_index, Rect::new(entry.x, entry.y, entry.w, entry.h))
    }
}

impl From<BoxAnnotation> for BoxEntry {
    fn from(ann: BoxAnnotation) -> Self {
        Self {
            class_index: ann.class_index,
            x: ann.rect.x(),
            y: ann.rect.y(),
            w: ann.rect.width(),
            h: ann.rect.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_field_names() {
        let ann = BoxAnnotation::new(2, Rect::new(10.0, 20.0, 30.0, 40.0));
        let json = serde_json::to_value(ann).expect("serialize");
        assert_eq!(json["classIndex"], 2);
        assert_eq!(json["x"], 10.0);
        assert_eq!(json["w"], 30.0);
        assert_eq!(json["h"], 40.0);
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let ann: BoxAnnotation =
            serde_json::from_str(r#"{"classIndex":1,"x":50,"y":60,"w":-40,"h":-20}"#)
                .expect("deserialize");
        assert_eq!(ann.class_index, 1);
        assert_eq!(ann.rect, Rect::new(10.0, 40.0, 40.0, 20.0));
    }

    #[test]
    fn test_missing_class_index_defaults_to_zero() {
        let ann: BoxAnnotation =
            serde_json::from_str(r#"{"x":1,"y":2,"w":3,"h":4}"#).expect("deserialize");
        assert_eq!(ann.class_index, 0);
    }
}
