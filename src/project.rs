//! Project directories on disk.
//!
//! A project directory holds the shared class list, the images and one
//! annotation file per image:
//!
//! ```text
//! <root>/
//!   classes.json              [{"name": "car", "color": "#ff0000"}, ...]
//!   images/
//!     cat.png
//!     dog.jpg
//!   annotations/
//!     cat.png.json            [{"classIndex": 0, "x": 10, "y": 10, "w": 90, "h": 70}, ...]
//! ```
//!
//! Loading is lenient: a missing or malformed class file falls back to the
//! configured classes, and a malformed annotation file yields no boxes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::IMAGE_EXTENSIONS;
use crate::error::{ProjectError, ProjectResult};
use crate::model::{BoxAnnotation, ClassDef, ImageEntry, default_classes};
use crate::persistence::{ANNOTATIONS_DIR, CLASSES_FILE};

/// Directory holding the images, relative to the project root.
pub const IMAGES_DIR: &str = "images";

/// Check if a filename has a supported image extension (case-insensitive).
pub fn is_image_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Everything an editor session starts from: the class list and all images
/// with their boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub classes: Vec<ClassDef>,
    pub images: Vec<ImageEntry>,
}

impl ProjectData {
    pub fn new(classes: Vec<ClassDef>, images: Vec<ImageEntry>) -> Self {
        Self { classes, images }
    }

    /// Load a project directory.
    ///
    /// `fallback_classes` is used when the directory carries no readable
    /// class file. An empty class list is replaced by the default class.
    pub fn load_dir(root: &Path, fallback_classes: &[ClassDef]) -> ProjectResult<Self> {
        if !root.is_dir() {
            return Err(ProjectError::not_a_directory(root));
        }

        let mut classes =
            load_classes(&root.join(CLASSES_FILE)).unwrap_or_else(|| fallback_classes.to_vec());
        if classes.is_empty() {
            classes = default_classes();
        }

        let mut names = list_images(&root.join(IMAGES_DIR))?;
        names.sort();

        let images: Vec<ImageEntry> = names
            .into_iter()
            .map(|name| load_image_entry(root, name))
            .collect();

        log::info!(
            "Loaded project {:?}: {} images, {} classes",
            root,
            images.len(),
            classes.len()
        );
        Ok(Self { classes, images })
    }

    /// Serialize the project to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a project from JSON.
    pub fn from_json(json: &str) -> ProjectResult<Self> {
        serde_json::from_str(json).map_err(|e| ProjectError::parse("<json>", e))
    }

    /// Find an image by file name.
    pub fn image_index(&self, name: &str) -> ProjectResult<usize> {
        self.images
            .iter()
            .position(|img| img.name == name)
            .ok_or_else(|| ProjectError::image_not_found(name))
    }

    /// Get the number of images in the project.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Get the number of images with at least one box.
    pub fn annotated_image_count(&self) -> usize {
        self.images.iter().filter(|img| img.is_annotated()).count()
    }

    /// Get the total number of boxes across all images.
    pub fn total_box_count(&self) -> usize {
        self.images.iter().map(|img| img.boxes.len()).sum()
    }
}

impl std::fmt::Display for ProjectData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} images ({} annotated), {} boxes, {} classes",
            self.image_count(),
            self.annotated_image_count(),
            self.total_box_count(),
            self.classes.len()
        )
    }
}

fn load_classes(path: &Path) -> Option<Vec<ClassDef>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("No class file at {:?}: {}", path, e);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(classes) => Some(classes),
        Err(e) => {
            log::warn!("{}", ProjectError::parse(path, e));
            None
        }
    }
}

fn list_images(dir: &Path) -> ProjectResult<Vec<String>> {
    if !dir.is_dir() {
        log::warn!("Project has no {:?} directory", dir);
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if is_image_filename(name) => names.push(name.to_string()),
            _ => {}
        }
    }
    Ok(names)
}

fn load_image_entry(root: &Path, name: String) -> ImageEntry {
    let image_path = root.join(IMAGES_DIR).join(&name);
    let (width, height) = image::image_dimensions(&image_path).unwrap_or_else(|e| {
        log::warn!("Could not read dimensions of {:?}: {}", image_path, e);
        (0, 0)
    });
    let boxes = load_boxes(&root.join(ANNOTATIONS_DIR).join(format!("{name}.json")));
    let url = format!("{IMAGES_DIR}/{name}");
    ImageEntry::new(name, url)
        .with_dimensions(width, height)
        .with_boxes(boxes)
}

fn load_boxes(path: &Path) -> Vec<BoxAnnotation> {
    let Ok(text) = fs::read_to_string(path) else {
        return Vec::new();
    };
    serde_json::from_str(&text).unwrap_or_else(|e| {
        log::warn!("{}", ProjectError::parse(path, e));
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::new(width, height)
            .save(path)
            .expect("write png");
    }

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = dir.path().join(IMAGES_DIR);
        fs::create_dir_all(&images).expect("mkdir");
        write_png(&images.join("b.png"), 8, 6);
        write_png(&images.join("a.PNG"), 4, 3);
        fs::write(images.join("notes.txt"), "ignore me").expect("write");
        dir
    }

    #[test]
    fn test_is_image_filename() {
        assert!(is_image_filename("x.jpg"));
        assert!(is_image_filename("x.WEBP"));
        assert!(!is_image_filename("x.tiff"));
        assert!(!is_image_filename("png"));
    }

    #[test]
    fn test_load_dir_lists_sorted_images() {
        let dir = setup();
        let project = ProjectData::load_dir(dir.path(), &default_classes()).expect("load");
        let names: Vec<_> = project.images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
        assert_eq!(project.images[1].url, "images/b.png");
        assert_eq!((project.images[1].width, project.images[1].height), (8, 6));
        assert_eq!(project.classes, default_classes());
    }

    #[test]
    fn test_load_dir_reads_classes_and_boxes() {
        let dir = setup();
        fs::write(
            dir.path().join(CLASSES_FILE),
            r##"[{"name": "car", "color": "#ff0000"}, {"name": "dog", "color": "#0000ff"}]"##,
        )
        .expect("write");
        let annotations = dir.path().join(ANNOTATIONS_DIR);
        fs::create_dir_all(&annotations).expect("mkdir");
        fs::write(
            annotations.join("b.png.json"),
            r#"[{"classIndex": 1, "x": 50, "y": 50, "w": -20, "h": 10}]"#,
        )
        .expect("write");
        fs::write(annotations.join("a.PNG.json"), "not json").expect("write");

        let project = ProjectData::load_dir(dir.path(), &[]).expect("load");
        assert_eq!(project.classes.len(), 2);
        assert!(project.images[0].boxes.is_empty());
        assert_eq!(
            project.images[1].boxes,
            vec![BoxAnnotation::new(1, Rect::new(30.0, 50.0, 20.0, 10.0))]
        );
        assert_eq!(project.image_index("b.png").expect("found"), 1);
        assert_eq!(project.to_string(), "2 images (1 annotated), 1 boxes, 2 classes");
    }

    #[test]
    fn test_empty_class_file_gets_default_class() {
        let dir = setup();
        fs::write(dir.path().join(CLASSES_FILE), "[]").expect("write");
        let project = ProjectData::load_dir(dir.path(), &[]).expect("load");
        assert_eq!(project.classes, default_classes());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ProjectData::load_dir(&dir.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, ProjectError::NotADirectory { .. }));
    }

    #[test]
    fn test_project_without_images_dir_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = ProjectData::load_dir(dir.path(), &[]).expect("load");
        assert_eq!(project.image_count(), 0);
        assert!(project.image_index("a.png").is_err());
    }
}
