//! Images, the shared class list, and which of them are active.

use crate::model::{BoxAnnotation, ClassDef, ImageEntry, default_classes};
use crate::persistence::PersistenceSink;
use crate::project::ProjectData;

use super::AnnotationStore;

/// One row of an image list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub name: String,
    pub box_count: usize,
    pub annotated: bool,
    pub active: bool,
}

/// Outcome of deleting a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeletion {
    /// The removed class
    pub class: ClassDef,
    /// Number of boxes removed across all images
    pub removed_boxes: usize,
    /// Indices of images whose box list lost entries
    pub changed_images: Vec<usize>,
    /// Selection on the active image, remapped past removed boxes
    pub selected: Option<usize>,
}

/// All images of a project plus the shared class list.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    images: Vec<ImageEntry>,
    classes: Vec<ClassDef>,
    current_image: Option<usize>,
    current_class: usize,
}

impl Workspace {
    /// Create a workspace. An empty class list gets the default class.
    pub fn new(images: Vec<ImageEntry>, mut classes: Vec<ClassDef>) -> Self {
        if classes.is_empty() {
            classes = default_classes();
        }
        Self {
            images,
            classes,
            current_image: None,
            current_class: 0,
        }
    }

    pub fn from_project(project: ProjectData) -> Self {
        Self::new(project.images, project.classes)
    }

    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn classes(&self) -> &[ClassDef] {
        &self.classes
    }

    pub fn current_image_index(&self) -> Option<usize> {
        self.current_image
    }

    pub fn current_image(&self) -> Option<&ImageEntry> {
        self.current_image.and_then(|i| self.images.get(i))
    }

    pub fn current_image_mut(&mut self) -> Option<&mut ImageEntry> {
        self.current_image.and_then(|i| self.images.get_mut(i))
    }

    /// Boxes of the active image (empty if none).
    pub fn current_boxes(&self) -> &[BoxAnnotation] {
        self.current_image()
            .map(|img| img.boxes.as_slice())
            .unwrap_or_default()
    }

    /// Class new boxes receive.
    pub fn current_class(&self) -> usize {
        self.current_class
    }

    /// Make image `index` active. Returns false when out of range.
    pub fn set_current_image(&mut self, index: usize) -> bool {
        if index >= self.images.len() {
            log::warn!(
                "Ignoring selection of image {} ({} images)",
                index,
                self.images.len()
            );
            return false;
        }
        self.current_image = Some(index);
        true
    }

    /// Index of the image `delta` steps away from the active one, clamped to
    /// the list. `None` when there is nowhere to go.
    pub fn step_target(&self, delta: isize) -> Option<usize> {
        let current = self.current_image?;
        let target = current.checked_add_signed(delta)?;
        (target < self.images.len() && target != current).then_some(target)
    }

    /// Box store for the active image.
    pub fn store<'a>(&'a mut self, sink: &'a dyn PersistenceSink) -> Option<AnnotationStore<'a>> {
        let index = self.current_image?;
        let image = self.images.get_mut(index)?;
        Some(AnnotationStore::new(image, sink))
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Append a class and make it current. Blank names are ignored.
    pub fn add_class(&mut self, name: &str, sink: &dyn PersistenceSink) -> Option<usize> {
        let name = name.trim();
        if name.is_empty() {
            log::debug!("Ignoring blank class name");
            return None;
        }
        let index = self.classes.len();
        let class = ClassDef::with_generated_color(name, index);
        log::info!("Added class {} '{}' ({})", index, class.name, class.color);
        self.classes.push(class);
        self.current_class = index;
        sink.save_classes(&self.classes);
        Some(index)
    }

    /// Make class `index` current. Returns false when out of range.
    pub fn select_class(&mut self, index: usize) -> bool {
        if index >= self.classes.len() {
            log::warn!(
                "Ignoring selection of class {} ({} classes)",
                index,
                self.classes.len()
            );
            return false;
        }
        self.current_class = index;
        true
    }

    /// Delete class `k` and cascade over every image.
    ///
    /// Boxes of class `k` are removed and higher class indices shift down by
    /// one. Images that lost boxes are saved, then the class list is saved.
    pub fn delete_class(
        &mut self,
        k: usize,
        selected: Option<usize>,
        sink: &dyn PersistenceSink,
    ) -> Option<ClassDeletion> {
        if k >= self.classes.len() {
            log::warn!(
                "Ignoring deletion of class {} ({} classes)",
                k,
                self.classes.len()
            );
            return None;
        }
        let class = self.classes.remove(k);
        if self.current_class >= self.classes.len() {
            self.current_class = self.classes.len().saturating_sub(1);
        }

        let selected = self.remap_selection(k, selected);

        let mut removed_boxes = 0;
        let mut changed_images = Vec::new();
        for (index, image) in self.images.iter_mut().enumerate() {
            let before = image.boxes.len();
            image.boxes.retain(|b| b.class_index != k);
            for b in &mut image.boxes {
                if b.class_index > k {
                    b.class_index -= 1;
                }
            }
            if image.boxes.len() != before {
                removed_boxes += before - image.boxes.len();
                changed_images.push(index);
                sink.save_boxes(&image.name, &image.boxes);
            }
        }
        sink.save_classes(&self.classes);

        log::info!(
            "Deleted class {} '{}': removed {} boxes from {} images",
            k,
            class.name,
            removed_boxes,
            changed_images.len()
        );
        Some(ClassDeletion {
            class,
            removed_boxes,
            changed_images,
            selected,
        })
    }

    /// Where the selected box of the active image ends up once boxes of
    /// class `k` are gone.
    fn remap_selection(&self, k: usize, selected: Option<usize>) -> Option<usize> {
        let boxes = self.current_boxes();
        let index = selected?;
        let ann = boxes.get(index)?;
        if ann.class_index == k {
            return None;
        }
        let removed_before = boxes[..index]
            .iter()
            .filter(|b| b.class_index == k)
            .count();
        Some(index - removed_before)
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// One-line status for the active image.
    pub fn status_text(&self) -> String {
        if self.images.is_empty() {
            return "No images in job.".to_string();
        }
        match self.current_image() {
            Some(image) => format!("{} ({} objects)", image.name, image.boxes.len()),
            None => "No image selected".to_string(),
        }
    }

    pub fn image_summaries(&self) -> Vec<ImageSummary> {
        self.images
            .iter()
            .enumerate()
            .map(|(index, image)| ImageSummary {
                name: image.name.clone(),
                box_count: image.boxes.len(),
                annotated: image.is_annotated(),
                active: self.current_image == Some(index),
            })
            .collect()
    }
}
