//! Transient editing state for the displayed image.

use crate::geometry::{DragRect, Handle, Point, Rect};

/// Coarse interaction mode, mirroring the active [`Gesture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    None,
    Drawing,
    Moving,
    Resizing,
}

/// The gesture in progress, with everything captured at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No button held
    #[default]
    Idle,
    /// Drawing a new box from `origin` to the current pointer
    Drawing { origin: Point, current: Point },
    /// Dragging the body of box `index`
    Moving {
        index: usize,
        /// Geometry at pointer-down
        original: Rect,
        /// Pointer position at pointer-down
        drag_origin: Point,
        /// Geometry for the current pointer position
        live: DragRect,
    },
    /// Dragging one handle of box `index`
    Resizing {
        index: usize,
        handle: Handle,
        /// Geometry at pointer-down
        original: Rect,
        /// Pointer position at pointer-down
        drag_origin: Point,
        /// Geometry for the current pointer position, possibly inverted
        live: DragRect,
    },
}

impl Gesture {
    pub fn mode(&self) -> InteractionMode {
        match self {
            Gesture::Idle => InteractionMode::None,
            Gesture::Drawing { .. } => InteractionMode::Drawing,
            Gesture::Moving { .. } => InteractionMode::Moving,
            Gesture::Resizing { .. } => InteractionMode::Resizing,
        }
    }
}

/// Per-image editing session. Never persisted.
///
/// Reset whenever the displayed image changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditorSession {
    /// Selected box index
    pub selected: Option<usize>,
    /// Gesture in progress
    pub gesture: Gesture,
    /// Last known pointer position in image space
    pub pointer: Point,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the selection and any gesture in progress.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn mode(&self) -> InteractionMode {
        self.gesture.mode()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Handle being dragged, if resizing.
    pub fn active_handle(&self) -> Option<Handle> {
        match self.gesture {
            Gesture::Resizing { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// The selection, if it points into a list of `len` boxes.
    pub fn selected_within(&self, len: usize) -> Option<usize> {
        self.selected.filter(|&index| index < len)
    }

    /// Uncommitted rectangle while drawing.
    pub fn preview(&self) -> Option<DragRect> {
        match self.gesture {
            Gesture::Drawing { origin, current } => Some(DragRect::from_corners(origin, current)),
            _ => None,
        }
    }

    /// Box index and live geometry while moving or resizing.
    pub fn live_edit(&self) -> Option<(usize, DragRect)> {
        match self.gesture {
            Gesture::Moving { index, live, .. } | Gesture::Resizing { index, live, .. } => {
                Some((index, live))
            }
            _ => None,
        }
    }
}
