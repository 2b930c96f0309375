//! BVAT - Bounding-box Visual Annotation Tool
//!
//! The interaction engine of a bounding-box annotator: pointer input is
//! mapped into image space, hit-tested against handles and box bodies, and
//! driven through a small state machine that creates, moves and resizes
//! boxes. Boxes are rendered onto any immediate-mode [`render::Surface`] and
//! every committed change is handed to a fire-and-forget
//! [`persistence::PersistenceSink`].
//!
//! Geometry uses two rectangle types: [`geometry::DragRect`] may carry
//! negative extents while a gesture is in progress, and [`geometry::Rect`] is
//! always canonical. Only canonical rectangles are stored or persisted.

pub mod app;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod coords;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hit_test;
pub mod image_loader;
pub mod interaction;
pub mod keybindings;
pub mod model;
pub mod persistence;
pub mod project;
pub mod render;
pub mod state;

pub use app::{Editor, SelectionInfo};
pub use error::{LoadError, PersistError, ProjectError};
pub use geometry::{DragRect, Handle, Point, Rect};
pub use interaction::{Commit, Cursor, InteractionStateMachine};
pub use model::{BoxAnnotation, ClassDef, ImageEntry};
pub use state::{AnnotationStore, EditorSession, Workspace};
