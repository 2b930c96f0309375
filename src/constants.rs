//! Global constants for the BVAT annotation engine

/// Side length of a resize handle square, in image pixels.
/// Independent of box size; handles are centered on their anchor point.
pub const HANDLE_SIZE: f32 = 6.0;

/// A drawn box must exceed this size on both axes to be committed.
pub const MIN_BOX_SIZE: f32 = 5.0;

/// Height of the class label chip drawn above a box.
pub const LABEL_HEIGHT: f32 = 16.0;

/// Horizontal padding added to the measured label text width.
pub const LABEL_PADDING: f32 = 4.0;

/// Offset of the label text inside its chip.
pub const LABEL_TEXT_INSET: f32 = 2.0;

/// Font size of label text.
pub const LABEL_FONT_SIZE: f32 = 12.0;

/// Stroke width of an unselected box outline.
pub const BOX_LINE_WIDTH: f32 = 2.0;

/// Stroke width of the selected box (and the live preview).
pub const SELECTED_LINE_WIDTH: f32 = 3.0;

/// Alpha of the translucent fill behind a selected box (0x33 / 255).
pub const SELECTED_FILL_ALPHA: f32 = 51.0 / 255.0;

/// Perceived brightness at or above which a class color counts as light.
pub const LIGHT_COLOR_THRESHOLD: f32 = 155.0;

/// Canvas backing size used before any image has been decoded.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Canvas backing size used before any image has been decoded.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Name of the class created when a project has none.
pub const DEFAULT_CLASS_NAME: &str = "object";

/// Color of the class created when a project has none.
pub const DEFAULT_CLASS_COLOR: &str = "#00ff00";

/// Image file extensions recognized in a project's `images/` folder.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];
