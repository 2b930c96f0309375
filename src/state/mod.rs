//! Editor state: the transient session, the per-image box store and the
//! project-wide workspace.

mod session;
mod store;
mod workspace;

pub use session::{EditorSession, Gesture, InteractionMode};
pub use store::{AnnotationStore, BoxUpdate};
pub use workspace::{ClassDeletion, ImageSummary, Workspace};
