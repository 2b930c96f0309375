//! Rectangle geometry for box editing.
//!
//! Two rectangle types are used on purpose:
//! - [`DragRect`] carries a signed width/height and only lives while a gesture
//!   is in progress (the far corner may be up/left of the origin corner).
//! - [`Rect`] is canonical (`width >= 0`, `height >= 0`) and is the only form
//!   stored in the model, persisted, or hit-tested against other boxes.
//!
//! [`DragRect::canonicalize`] is the single conversion between the two.

use crate::constants::HANDLE_SIZE;

// ============================================================================
// Points
// ============================================================================

/// A 2D point in image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`.
    pub fn delta_from(&self, origin: Point) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

// ============================================================================
// Canonical rectangle
// ============================================================================

/// An axis-aligned rectangle with non-negative width and height.
///
/// Construct through [`Rect::new`] or [`DragRect::canonicalize`]; both
/// guarantee the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Create a rectangle, canonicalizing negative extents.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        DragRect::new(x, y, width, height).canonicalize()
    }

    /// Create a rectangle from two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        DragRect::from_corners(a, b).canonicalize()
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// The same rectangle shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// View this rectangle as a gesture rectangle.
    pub fn to_drag(self) -> DragRect {
        DragRect::new(self.x, self.y, self.width, self.height)
    }

    /// A square of side `size` centered on `center`.
    pub fn centered_square(center: Point, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }
}

// ============================================================================
// Gesture rectangle
// ============================================================================

/// A rectangle whose width/height may be negative during an active drag.
///
/// Never stored in the model; call [`DragRect::canonicalize`] at every commit
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DragRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned from `origin` to `corner`, in whichever quadrant
    /// `corner` lies.
    pub fn from_corners(origin: Point, corner: Point) -> Self {
        Self::new(origin.x, origin.y, corner.x - origin.x, corner.y - origin.y)
    }

    /// Flip negative extents so that `width >= 0` and `height >= 0`.
    ///
    /// Idempotent: a canonical input maps to itself.
    pub fn canonicalize(self) -> Rect {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive containment test against the canonical form.
    pub fn contains(&self, point: Point) -> bool {
        self.canonicalize().contains(point)
    }
}

impl From<Rect> for DragRect {
    fn from(rect: Rect) -> Self {
        rect.to_drag()
    }
}

/// Point-in-rectangle test for a possibly non-canonical rectangle.
pub fn point_in_rect(point: Point, rect: DragRect) -> bool {
    rect.contains(point)
}

// ============================================================================
// Handles
// ============================================================================

/// One of the 8 resize handles, named by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Handle {
    /// All handles, in the order they are laid out and hit-tested.
    pub const ALL: [Handle; 8] = [
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
        Handle::NW,
    ];

    /// Lowercase compass code (`"n"`, `"se"`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Handle::N => "n",
            Handle::NE => "ne",
            Handle::E => "e",
            Handle::SE => "se",
            Handle::S => "s",
            Handle::SW => "sw",
            Handle::W => "w",
            Handle::NW => "nw",
        }
    }

    /// Parse a compass code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.code() == code)
    }

    /// Whether dragging this handle moves the top edge.
    pub fn moves_top(&self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    /// Whether dragging this handle moves the bottom edge.
    pub fn moves_bottom(&self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    /// Whether dragging this handle moves the left edge.
    pub fn moves_left(&self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    /// Whether dragging this handle moves the right edge.
    pub fn moves_right(&self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    /// Anchor point of this handle on a canonical rectangle.
    pub fn anchor(&self, rect: &Rect) -> Point {
        let cx = rect.x() + rect.width() / 2.0;
        let cy = rect.y() + rect.height() / 2.0;
        match self {
            Handle::N => Point::new(cx, rect.top()),
            Handle::NE => Point::new(rect.right(), rect.top()),
            Handle::E => Point::new(rect.right(), cy),
            Handle::SE => Point::new(rect.right(), rect.bottom()),
            Handle::S => Point::new(cx, rect.bottom()),
            Handle::SW => Point::new(rect.left(), rect.bottom()),
            Handle::W => Point::new(rect.left(), cy),
            Handle::NW => Point::new(rect.left(), rect.top()),
        }
    }
}

/// Anchor points of all 8 handles, canonicalizing the rectangle first.
pub fn handle_positions(rect: DragRect) -> [(Handle, Point); 8] {
    let canonical = rect.canonicalize();
    Handle::ALL.map(|handle| (handle, handle.anchor(&canonical)))
}

/// Hit squares of all 8 handles, each `handle_size` wide and centered on its
/// anchor point.
pub fn handle_rects(rect: DragRect, handle_size: f32) -> [(Handle, Rect); 8] {
    handle_positions(rect).map(|(handle, p)| (handle, Rect::centered_square(p, handle_size)))
}

/// Hit squares using the default [`HANDLE_SIZE`].
pub fn default_handle_rects(rect: DragRect) -> [(Handle, Rect); 8] {
    handle_rects(rect, HANDLE_SIZE)
}

// ============================================================================
// Tests
// ============================================================================
