//! Data models for BVAT.

mod annotation;
mod category;
mod image;

pub use annotation::BoxAnnotation;
pub use category::{ClassDef, default_classes};
pub use image::ImageEntry;
