//! Pointer-driven box creation, moving and resizing.
//!
//! The machine is flat: `Idle -> Drawing | Moving | Resizing -> Idle`, with
//! every gesture ending on pointer-up. While a gesture runs, the stored box is
//! left untouched and the live geometry lives in the [`EditorSession`]; the
//! result is canonicalized and written to the [`AnnotationStore`] on
//! pointer-up, and only when it differs from what was stored.

use crate::constants::{HANDLE_SIZE, MIN_BOX_SIZE};
use crate::event::PointerButton;
use crate::geometry::{DragRect, Handle, Point, Rect};
use crate::hit_test::{Hit, hit_test};
use crate::model::BoxAnnotation;
use crate::state::{AnnotationStore, BoxUpdate, EditorSession, Gesture};

/// Pointer affordance for the element under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Empty canvas: pressing starts a new box
    Crosshair,
    /// Box body: pressing starts a move
    Move,
    /// `n` or `s` handle
    ResizeVertical,
    /// `e` or `w` handle
    ResizeHorizontal,
    /// `nw` or `se` handle
    ResizeDiagonalNwSe,
    /// `ne` or `sw` handle
    ResizeDiagonalNeSw,
}

impl Cursor {
    pub fn for_handle(handle: Handle) -> Self {
        match handle {
            Handle::N | Handle::S => Cursor::ResizeVertical,
            Handle::E | Handle::W => Cursor::ResizeHorizontal,
            Handle::NW | Handle::SE => Cursor::ResizeDiagonalNwSe,
            Handle::NE | Handle::SW => Cursor::ResizeDiagonalNeSw,
        }
    }

    /// CSS cursor name.
    pub fn css_name(&self) -> &'static str {
        match self {
            Cursor::Crosshair => "crosshair",
            Cursor::Move => "move",
            Cursor::ResizeVertical => "ns-resize",
            Cursor::ResizeHorizontal => "ew-resize",
            Cursor::ResizeDiagonalNwSe => "nwse-resize",
            Cursor::ResizeDiagonalNeSw => "nesw-resize",
        }
    }
}

/// A change written to the store at the end of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Created { index: usize },
    Moved { index: usize },
    Resized { index: usize },
}

/// Geometry of `original` shifted by `(dx, dy)`.
pub fn moved_rect(original: Rect, dx: f32, dy: f32) -> DragRect {
    DragRect::new(
        original.x() + dx,
        original.y() + dy,
        original.width(),
        original.height(),
    )
}

/// Geometry of `original` with the edges named by `handle` shifted by
/// `(dx, dy)`. The other edges stay pinned. The result is inverted when a
/// dragged edge crosses its opposite edge.
pub fn resized_rect(original: Rect, handle: Handle, dx: f32, dy: f32) -> DragRect {
    let mut left = original.left();
    let mut right = original.right();
    let mut top = original.top();
    let mut bottom = original.bottom();

    if handle.moves_left() {
        left += dx;
    }
    if handle.moves_right() {
        right += dx;
    }
    if handle.moves_top() {
        top += dy;
    }
    if handle.moves_bottom() {
        bottom += dy;
    }

    DragRect::new(left, top, right - left, bottom - top)
}

/// Turns pointer events into box edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionStateMachine {
    handle_size: f32,
    min_box_size: f32,
}

impl Default for InteractionStateMachine {
    fn default() -> Self {
        Self::new(HANDLE_SIZE, MIN_BOX_SIZE)
    }
}

impl InteractionStateMachine {
    pub fn new(handle_size: f32, min_box_size: f32) -> Self {
        Self {
            handle_size,
            min_box_size,
        }
    }

    pub fn handle_size(&self) -> f32 {
        self.handle_size
    }

    /// Start a gesture. Returns true when a repaint is needed.
    ///
    /// Only the primary button starts gestures.
    pub fn pointer_down(
        &self,
        session: &mut EditorSession,
        boxes: &[BoxAnnotation],
        point: Point,
        button: PointerButton,
    ) -> bool {
        if button != PointerButton::Primary {
            log::trace!("Ignoring {:?} button press", button);
            return false;
        }
        if !session.is_idle() {
            log::debug!("Abandoning unfinished {:?} gesture", session.mode());
        }
        session.pointer = point;

        let selected = session.selected_within(boxes.len());
        session.gesture = match hit_test(point, boxes, selected, self.handle_size) {
            Some(Hit::Handle { index, handle }) => {
                let original = boxes[index].rect;
                session.selected = Some(index);
                log::debug!("Resizing box {} from handle '{}'", index, handle.code());
                Gesture::Resizing {
                    index,
                    handle,
                    original,
                    drag_origin: point,
                    live: original.to_drag(),
                }
            }
            Some(Hit::Body { index }) => {
                let original = boxes[index].rect;
                session.selected = Some(index);
                log::debug!("Moving box {}", index);
                Gesture::Moving {
                    index,
                    original,
                    drag_origin: point,
                    live: original.to_drag(),
                }
            }
            None => {
                session.selected = None;
                log::debug!("Drawing from ({:.1}, {:.1})", point.x, point.y);
                Gesture::Drawing {
                    origin: point,
                    current: point,
                }
            }
        };
        true
    }

    /// Track the pointer. Returns true when a repaint is needed.
    pub fn pointer_move(&self, session: &mut EditorSession, point: Point) -> bool {
        session.pointer = point;
        match &mut session.gesture {
            Gesture::Idle => false,
            Gesture::Drawing { current, .. } => {
                *current = point;
                true
            }
            Gesture::Moving {
                original,
                drag_origin,
                live,
                ..
            } => {
                let (dx, dy) = point.delta_from(*drag_origin);
                *live = moved_rect(*original, dx, dy);
                log::trace!("Move delta ({:.1}, {:.1})", dx, dy);
                true
            }
            Gesture::Resizing {
                handle,
                original,
                drag_origin,
                live,
                ..
            } => {
                let (dx, dy) = point.delta_from(*drag_origin);
                *live = resized_rect(*original, *handle, dx, dy);
                log::trace!("Resize '{}' -> {:?}", handle.code(), live);
                true
            }
        }
    }

    /// Finish the gesture and commit its result.
    ///
    /// A drawn box is kept only when both sides exceed the minimum size; it
    /// receives `current_class` and becomes the selection. A moved or resized
    /// box is written back only when its canonical geometry changed.
    pub fn pointer_up(
        &self,
        session: &mut EditorSession,
        store: &mut AnnotationStore<'_>,
        point: Point,
        button: PointerButton,
        current_class: usize,
    ) -> Option<Commit> {
        if button != PointerButton::Primary {
            return None;
        }
        self.pointer_move(session, point);
        let gesture = std::mem::take(&mut session.gesture);

        match gesture {
            Gesture::Idle => None,
            Gesture::Drawing { origin, current } => {
                let rect = Rect::from_corners(origin, current);
                if rect.width() > self.min_box_size && rect.height() > self.min_box_size {
                    let index = store.add_box(BoxAnnotation::new(current_class, rect));
                    session.selected = Some(index);
                    Some(Commit::Created { index })
                } else {
                    log::debug!(
                        "Discarding {:.1}x{:.1} box below minimum size",
                        rect.width(),
                        rect.height()
                    );
                    None
                }
            }
            Gesture::Moving {
                index,
                original,
                live,
                ..
            } => Self::commit_edit(store, index, original, live).then_some(Commit::Moved { index }),
            Gesture::Resizing {
                index,
                original,
                live,
                ..
            } => Self::commit_edit(store, index, original, live)
                .then_some(Commit::Resized { index }),
        }
    }

    fn commit_edit(
        store: &mut AnnotationStore<'_>,
        index: usize,
        original: Rect,
        live: DragRect,
    ) -> bool {
        let rect = live.canonicalize();
        if rect == original {
            log::debug!("Box {} unchanged, nothing to commit", index);
            return false;
        }
        store.update_box(index, BoxUpdate::Geometry(rect))
    }

    /// Cursor for the element under the pointer. `None` while a gesture is
    /// in progress.
    pub fn hover(
        &self,
        session: &EditorSession,
        boxes: &[BoxAnnotation],
        point: Point,
    ) -> Option<Cursor> {
        if !session.is_idle() {
            return None;
        }
        let selected = session.selected_within(boxes.len());
        Some(match hit_test(point, boxes, selected, self.handle_size) {
            Some(Hit::Handle { handle, .. }) => Cursor::for_handle(handle),
            Some(Hit::Body { .. }) => Cursor::Move,
            None => Cursor::Crosshair,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageEntry;
    use crate::persistence::RecordingSink;
    use crate::state::InteractionMode;

    const PRIMARY: PointerButton = PointerButton::Primary;

    struct Harness {
        machine: InteractionStateMachine,
        session: EditorSession,
        image: ImageEntry,
        sink: RecordingSink,
    }

    impl Harness {
        fn new(boxes: Vec<BoxAnnotation>) -> Self {
            Self {
                machine: InteractionStateMachine::default(),
                session: EditorSession::new(),
                image: ImageEntry::new("img.png", "images/img.png").with_boxes(boxes),
                sink: RecordingSink::new(),
            }
        }

        fn drag(&mut self, from: (f32, f32), to: (f32, f32)) -> Option<Commit> {
            let from = Point::new(from.0, from.1);
            let to = Point::new(to.0, to.1);
            self.machine
                .pointer_down(&mut self.session, &self.image.boxes, from, PRIMARY);
            self.machine.pointer_move(&mut self.session, to);
            let mut store = AnnotationStore::new(&mut self.image, &self.sink);
            self.machine
                .pointer_up(&mut self.session, &mut store, to, PRIMARY, 0)
        }

        fn rect(&self, index: usize) -> Rect {
            self.image.boxes[index].rect
        }
    }

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> BoxAnnotation {
        BoxAnnotation::new(0, Rect::new(x, y, w, h))
    }

    #[test]
    fn test_draw_commits_canonical_box() {
        let mut h = Harness::new(Vec::new());
        // Drag up and to the left
        let commit = h.drag((100.0, 80.0), (10.0, 10.0));
        assert_eq!(commit, Some(Commit::Created { index: 0 }));
        assert_eq!(h.rect(0), Rect::new(10.0, 10.0, 90.0, 70.0));
        assert_eq!(h.session.selected, Some(0));
        assert_eq!(h.session.mode(), InteractionMode::None);
        assert_eq!(h.sink.len(), 1);
    }

    #[test]
    fn test_draw_below_threshold_is_discarded() {
        for (dx, dy) in [(5.0, 50.0), (50.0, 5.0), (-5.0, -50.0), (0.0, 0.0)] {
            let mut h = Harness::new(Vec::new());
            assert_eq!(h.drag((20.0, 20.0), (20.0 + dx, 20.0 + dy)), None);
            assert!(h.image.boxes.is_empty());
            assert!(h.sink.is_empty());
            assert_eq!(h.session.selected, None);
        }
    }

    #[test]
    fn test_draw_just_above_threshold_is_kept() {
        let mut h = Harness::new(Vec::new());
        assert!(h.drag((20.0, 20.0), (25.5, 14.5)).is_some());
        assert_eq!(h.rect(0), Rect::new(20.0, 14.5, 5.5, 5.5));
    }

    #[test]
    fn test_draw_preview_tracks_pointer() {
        let mut h = Harness::new(Vec::new());
        h.machine
            .pointer_down(&mut h.session, &[], Point::new(50.0, 50.0), PRIMARY);
        assert!(h.machine.pointer_move(&mut h.session, Point::new(30.0, 70.0)));
        assert_eq!(h.session.preview(), Some(DragRect::new(50.0, 50.0, -20.0, 20.0)));
    }

    #[test]
    fn test_move_by_delta() {
        let mut h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        let commit = h.drag((20.0, 20.0), (35.0, 12.0));
        assert_eq!(commit, Some(Commit::Moved { index: 0 }));
        assert_eq!(h.rect(0), Rect::new(25.0, 2.0, 40.0, 30.0));
        assert_eq!(h.session.selected, Some(0));
    }

    #[test]
    fn test_move_recomputes_from_snapshot() {
        let mut h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        h.machine
            .pointer_down(&mut h.session, &h.image.boxes, Point::new(20.0, 20.0), PRIMARY);
        for step in 1..=50 {
            let p = Point::new(20.0 + step as f32 * 0.1, 20.0);
            h.machine.pointer_move(&mut h.session, p);
        }
        let (_, live) = h.session.live_edit().expect("live edit");
        assert!((live.x - 15.0).abs() < 1e-4);
        // Store untouched until pointer-up
        assert_eq!(h.rect(0), Rect::new(10.0, 10.0, 40.0, 30.0));
    }

    #[test]
    fn test_click_without_motion_commits_nothing() {
        let mut h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        assert_eq!(h.drag((20.0, 20.0), (20.0, 20.0)), None);
        assert!(h.sink.is_empty());
        assert_eq!(h.session.selected, Some(0));
    }

    #[test]
    fn test_resize_se_changes_only_size() {
        let mut h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        h.session.selected = Some(0);
        let commit = h.drag((50.0, 40.0), (57.0, 45.0));
        assert_eq!(commit, Some(Commit::Resized { index: 0 }));
        assert_eq!(h.rect(0), Rect::new(10.0, 10.0, 47.0, 35.0));
    }

    #[test]
    fn test_resize_nw_moves_origin() {
        let mut h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        h.session.selected = Some(0);
        h.drag((10.0, 10.0), (14.0, 7.0));
        assert_eq!(h.rect(0), Rect::new(14.0, 7.0, 36.0, 33.0));
    }

    #[test]
    fn test_resize_past_opposite_edge_canonicalizes() {
        let mut h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        h.session.selected = Some(0);
        // Drag the east edge 60px left, past the west edge at x=10
        h.machine
            .pointer_down(&mut h.session, &h.image.boxes, Point::new(50.0, 25.0), PRIMARY);
        h.machine.pointer_move(&mut h.session, Point::new(-10.0, 25.0));
        assert_eq!(h.session.active_handle(), Some(Handle::E));
        let (_, live) = h.session.live_edit().expect("live edit");
        assert_eq!(live.width, -20.0);

        let mut store = AnnotationStore::new(&mut h.image, &h.sink);
        h.machine
            .pointer_up(&mut h.session, &mut store, Point::new(-10.0, 25.0), PRIMARY, 0);
        assert_eq!(h.rect(0), Rect::new(-10.0, 10.0, 20.0, 30.0));
    }

    #[test]
    fn test_handle_beats_overlapping_body() {
        let mut h = Harness::new(vec![boxed(0.0, 0.0, 40.0, 40.0), boxed(30.0, 30.0, 40.0, 40.0)]);
        h.session.selected = Some(0);
        h.machine
            .pointer_down(&mut h.session, &h.image.boxes, Point::new(40.0, 40.0), PRIMARY);
        assert_eq!(h.session.mode(), InteractionMode::Resizing);
        assert_eq!(h.session.selected, Some(0));
    }

    #[test]
    fn test_secondary_button_is_ignored() {
        let mut h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        let changed = h.machine.pointer_down(
            &mut h.session,
            &h.image.boxes,
            Point::new(20.0, 20.0),
            PointerButton::Secondary,
        );
        assert!(!changed);
        assert!(h.session.is_idle());
    }

    #[test]
    fn test_pointer_up_when_idle_is_a_no_op() {
        let mut h = Harness::new(Vec::new());
        let mut store = AnnotationStore::new(&mut h.image, &h.sink);
        let commit =
            h.machine
                .pointer_up(&mut h.session, &mut store, Point::new(1.0, 1.0), PRIMARY, 0);
        assert_eq!(commit, None);
        assert!(h.sink.is_empty());
    }

    #[test]
    fn test_hover_cursors() {
        let h = Harness::new(vec![boxed(10.0, 10.0, 40.0, 30.0)]);
        let boxes = &h.image.boxes;
        let mut session = EditorSession::new();
        let hover = |s: &EditorSession, x, y| h.machine.hover(s, boxes, Point::new(x, y));

        assert_eq!(hover(&session, 100.0, 100.0), Some(Cursor::Crosshair));
        assert_eq!(hover(&session, 20.0, 20.0), Some(Cursor::Move));

        session.selected = Some(0);
        assert_eq!(hover(&session, 30.0, 10.0), Some(Cursor::ResizeVertical));
        assert_eq!(hover(&session, 10.0, 25.0), Some(Cursor::ResizeHorizontal));
        assert_eq!(hover(&session, 50.0, 40.0), Some(Cursor::ResizeDiagonalNwSe));
        assert_eq!(hover(&session, 50.0, 10.0), Some(Cursor::ResizeDiagonalNeSw));

        session.gesture = Gesture::Drawing {
            origin: Point::default(),
            current: Point::default(),
        };
        assert_eq!(hover(&session, 20.0, 20.0), None);
    }

    #[test]
    fn test_draw_select_resize_delete_scenario() {
        let mut h = Harness::new(Vec::new());
        h.drag((10.0, 10.0), (100.0, 80.0));
        assert_eq!(h.image.boxes, vec![boxed(10.0, 10.0, 90.0, 70.0)]);

        // East handle sits at the middle of the right edge
        let commit = h.drag((100.0, 45.0), (120.0, 45.0));
        assert_eq!(commit, Some(Commit::Resized { index: 0 }));
        assert_eq!(h.rect(0), Rect::new(10.0, 10.0, 110.0, 70.0));

        let selected = h.session.selected.expect("selected");
        let mut store = AnnotationStore::new(&mut h.image, &h.sink);
        assert!(store.remove_box(selected).is_some());
        h.session.selected = None;
        assert!(h.image.boxes.is_empty());
        assert_eq!(h.sink.last_boxes("img.png"), Some(Vec::new()));
    }
}
