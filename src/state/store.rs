//! Box list operations for the active image.

use crate::geometry::Rect;
use crate::model::{BoxAnnotation, ImageEntry};
use crate::persistence::PersistenceSink;

/// A change to one box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxUpdate {
    Geometry(Rect),
    Class(usize),
}

/// Mutable view over one image's boxes.
///
/// Every successful mutation sends the image's full box list to the sink.
/// Invalid indices are logged and ignored.
pub struct AnnotationStore<'a> {
    image: &'a mut ImageEntry,
    sink: &'a dyn PersistenceSink,
}

impl<'a> AnnotationStore<'a> {
    pub fn new(image: &'a mut ImageEntry, sink: &'a dyn PersistenceSink) -> Self {
        Self { image, sink }
    }

    pub fn image_name(&self) -> &str {
        &self.image.name
    }

    pub fn boxes(&self) -> &[BoxAnnotation] {
        &self.image.boxes
    }

    pub fn len(&self) -> usize {
        self.image.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.boxes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BoxAnnotation> {
        self.image.boxes.get(index)
    }

    /// Append a box on top of the others. Returns its index.
    pub fn add_box(&mut self, ann: BoxAnnotation) -> usize {
        self.image.boxes.push(ann);
        let index = self.image.boxes.len() - 1;
        log::info!(
            "Added box {} to '{}': class {} at {:?}",
            index,
            self.image.name,
            ann.class_index,
            ann.rect
        );
        self.persist();
        index
    }

    /// Apply an update to box `index`. Returns false if the index is invalid.
    pub fn update_box(&mut self, index: usize, update: BoxUpdate) -> bool {
        let Some(ann) = self.image.boxes.get_mut(index) else {
            log::warn!(
                "Ignoring update of box {} on '{}' ({} boxes)",
                index,
                self.image.name,
                self.image.boxes.len()
            );
            return false;
        };
        match update {
            BoxUpdate::Geometry(rect) => ann.rect = rect,
            BoxUpdate::Class(class_index) => ann.class_index = class_index,
        }
        log::info!("Updated box {} on '{}': {:?}", index, self.image.name, update);
        self.persist();
        true
    }

    /// Remove box `index`, returning it.
    pub fn remove_box(&mut self, index: usize) -> Option<BoxAnnotation> {
        if index >= self.image.boxes.len() {
            log::warn!(
                "Ignoring removal of box {} on '{}' ({} boxes)",
                index,
                self.image.name,
                self.image.boxes.len()
            );
            return None;
        }
        let removed = self.image.boxes.remove(index);
        log::info!("Removed box {} from '{}'", index, self.image.name);
        self.persist();
        Some(removed)
    }

    /// Give box `index` a different class.
    pub fn reassign_class(&mut self, index: usize, class_index: usize) -> bool {
        self.update_box(index, BoxUpdate::Class(class_index))
    }

    fn persist(&self) {
        self.sink.save_boxes(&self.image.name, &self.image.boxes);
    }
}
