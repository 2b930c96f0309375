//! Resolve which interactive element lies under the pointer.
//!
//! Priority, first match wins:
//! 1. handles of the selected box,
//! 2. box bodies, topmost (highest index) first,
//! 3. nothing.

use crate::geometry::{Handle, Point, handle_rects};
use crate::model::BoxAnnotation;

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A resize handle of the selected box
    Handle { index: usize, handle: Handle },
    /// The body of a box
    Body { index: usize },
}

impl Hit {
    /// Index of the box that was hit.
    pub fn index(&self) -> usize {
        match *self {
            Hit::Handle { index, .. } | Hit::Body { index } => index,
        }
    }
}

/// Hit-test `point` against `boxes`.
///
/// Only the selected box exposes handles. A stale `selected` index (past the
/// end of the list) is ignored.
pub fn hit_test(
    point: Point,
    boxes: &[BoxAnnotation],
    selected: Option<usize>,
    handle_size: f32,
) -> Option<Hit> {
    if let Some(index) = selected {
        match boxes.get(index) {
            Some(ann) => {
                let hit = handle_rects(ann.rect.to_drag(), handle_size)
                    .into_iter()
                    .find(|(_, square)| square.contains(point));
                if let Some((handle, _)) = hit {
                    return Some(Hit::Handle { index, handle });
                }
            }
            None => log::warn!(
                "Ignoring stale selection {} ({} boxes)",
                index,
                boxes.len()
            ),
        }
    }

    boxes
        .iter()
        .enumerate()
        .rev()
        .find(|(_, ann)| ann.rect.contains(point))
        .map(|(index, _)| Hit::Body { index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HANDLE_SIZE;
    use crate::geometry::Rect;

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> BoxAnnotation {
        BoxAnnotation::new(0, Rect::new(x, y, w, h))
    }

    #[test]
    fn test_empty_canvas_misses() {
        assert_eq!(hit_test(Point::new(5.0, 5.0), &[], None, HANDLE_SIZE), None);
    }

    #[test]
    fn test_body_hit_is_inclusive() {
        let boxes = [boxed(10.0, 10.0, 20.0, 20.0)];
        let hit = hit_test(Point::new(30.0, 30.0), &boxes, None, HANDLE_SIZE);
        assert_eq!(hit, Some(Hit::Body { index: 0 }));
        assert_eq!(hit_test(Point::new(30.1, 30.0), &boxes, None, HANDLE_SIZE), None);
    }

    #[test]
    fn test_topmost_box_wins() {
        let boxes = [boxed(0.0, 0.0, 50.0, 50.0), boxed(20.0, 20.0, 50.0, 50.0)];
        let hit = hit_test(Point::new(30.0, 30.0), &boxes, None, HANDLE_SIZE);
        assert_eq!(hit, Some(Hit::Body { index: 1 }));
    }

    #[test]
    fn test_selected_handle_beats_other_body() {
        // Box 1 sits on top and covers box 0's south-east corner
        let boxes = [boxed(0.0, 0.0, 40.0, 40.0), boxed(30.0, 30.0, 40.0, 40.0)];
        let hit = hit_test(Point::new(40.0, 40.0), &boxes, Some(0), HANDLE_SIZE);
        assert_eq!(
            hit,
            Some(Hit::Handle {
                index: 0,
                handle: Handle::SE
            })
        );
    }

    #[test]
    fn test_handles_only_on_selected_box() {
        let boxes = [boxed(10.0, 10.0, 40.0, 40.0)];
        // Just outside the body but inside the NW handle square
        let p = Point::new(8.0, 8.0);
        assert_eq!(hit_test(p, &boxes, None, HANDLE_SIZE), None);
        assert_eq!(
            hit_test(p, &boxes, Some(0), HANDLE_SIZE),
            Some(Hit::Handle {
                index: 0,
                handle: Handle::NW
            })
        );
    }

    #[test]
    fn test_handle_order_breaks_ties_on_tiny_box() {
        // All handle squares overlap on a 2x2 box; N is tested first
        let boxes = [boxed(10.0, 10.0, 2.0, 2.0)];
        let hit = hit_test(Point::new(11.0, 11.0), &boxes, Some(0), HANDLE_SIZE);
        assert_eq!(
            hit,
            Some(Hit::Handle {
                index: 0,
                handle: Handle::N
            })
        );
    }

    #[test]
    fn test_stale_selection_falls_back_to_body_scan() {
        let boxes = [boxed(0.0, 0.0, 10.0, 10.0)];
        let hit = hit_test(Point::new(5.0, 5.0), &boxes, Some(3), HANDLE_SIZE);
        assert_eq!(hit, Some(Hit::Body { index: 0 }));
        assert_eq!(hit.map(|h| h.index()), Some(0));
    }
}
