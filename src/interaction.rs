//! Pointer gestures over placed fields.
//!
//! A drag or resize runs from a pointer-down on a field until the pointer
//! is released: `Idle → Dragging | Resizing → Idle`. Only one gesture can
//! be active; a second `begin_*` while one is running is refused.
//! Overlapping moves are rejected silently: the field keeps its last
//! accepted geometry and the gesture continues.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::placement::Placement;
use crate::store::FieldStore;

/// Current gesture state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A field is being moved.
    Dragging {
        /// Field id
        id: String,
        /// Pointer position relative to the field's top-left corner
        grab_offset: Point,
    },
    /// A field is being resized from its bottom-right handle.
    Resizing {
        /// Field id
        id: String,
        /// Pointer position when the gesture started
        origin: Point,
        /// Field size when the gesture started
        start_size: (f32, f32),
    },
}

/// Drives [`Gesture`] transitions against a [`FieldStore`].
#[derive(Debug, Default)]
pub struct GestureController {
    state: Gesture,
}

impl GestureController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &Gesture {
        &self.state
    }

    /// True while a drag or resize is running.
    pub fn is_active(&self) -> bool {
        self.state != Gesture::Idle
    }

    /// Start dragging field `id` grabbed at `pointer`.
    ///
    /// Returns `Ok(false)` if another gesture is already running.
    pub fn begin_drag(&mut self, store: &FieldStore, id: &str, pointer: Point) -> Result<bool> {
        if self.is_active() {
            return Ok(false);
        }
        let field = store
            .get(id)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))?;
        self.state = Gesture::Dragging {
            id: id.to_string(),
            grab_offset: Point::new(pointer.x - field.x, pointer.y - field.y),
        };
        Ok(true)
    }

    /// Start resizing field `id` from `pointer`.
    ///
    /// Returns `Ok(false)` if another gesture is already running.
    pub fn begin_resize(&mut self, store: &FieldStore, id: &str, pointer: Point) -> Result<bool> {
        if self.is_active() {
            return Ok(false);
        }
        let field = store
            .get(id)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))?;
        self.state = Gesture::Resizing {
            id: id.to_string(),
            origin: pointer,
            start_size: (field.width, field.height),
        };
        Ok(true)
    }

    /// Apply a pointer move to the active gesture.
    ///
    /// Returns `Ok(None)` when idle. A move the overlap policy refuses
    /// comes back as `Some(Placement::Rejected)`. If the field disappeared
    /// the gesture ends and the error is returned.
    pub fn pointer_move(
        &mut self,
        store: &mut FieldStore,
        pointer: Point,
    ) -> Result<Option<Placement>> {
        let result = match &self.state {
            Gesture::Idle => return Ok(None),
            Gesture::Dragging { id, grab_offset } => {
                let x = (pointer.x - grab_offset.x).max(0.0);
                let y = (pointer.y - grab_offset.y).max(0.0);
                store.move_field(id, x, y)
            },
            Gesture::Resizing {
                id,
                origin,
                start_size,
            } => {
                let width = start_size.0 + (pointer.x - origin.x);
                let height = start_size.1 + (pointer.y - origin.y);
                store.resize_field(id, width, height)
            },
        };

        match result {
            Ok(placement) => Ok(Some(placement)),
            Err(Error::Overlap { .. }) => Ok(Some(Placement::Rejected)),
            Err(e) => {
                self.state = Gesture::Idle;
                Err(e)
            },
        }
    }

    /// Release the pointer and return the gesture that just ended.
    pub fn end(&mut self) -> Gesture {
        std::mem::take(&mut self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuilderConfig, OverlapPolicy};
    use crate::field::FieldType;

    fn store_with_two(policy: OverlapPolicy) -> (FieldStore, String, String) {
        let mut store = FieldStore::new(BuilderConfig::default().with_overlap_policy(policy));
        let a = store.add_field_at(FieldType::Text, 0.0, 0.0, 1).unwrap().id.clone();
        let b = store.add_field_at(FieldType::Text, 0.0, 200.0, 1).unwrap().id.clone();
        (store, a, b)
    }

    #[test]
    fn test_drag_keeps_grab_offset() {
        let (mut store, _, b) = store_with_two(OverlapPolicy::Reject);
        let mut ctl = GestureController::new();
        assert!(ctl.begin_drag(&store, &b, Point::new(10.0, 205.0)).unwrap());
        ctl.pointer_move(&mut store, Point::new(310.0, 405.0)).unwrap();
        let f = store.get(&b).unwrap();
        assert_eq!((f.x, f.y), (300.0, 400.0));
        assert!(matches!(ctl.end(), Gesture::Dragging { .. }));
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_second_gesture_refused() {
        let (store, a, b) = store_with_two(OverlapPolicy::Reject);
        let mut ctl = GestureController::new();
        assert!(ctl.begin_drag(&store, &a, Point::new(0.0, 0.0)).unwrap());
        assert!(!ctl.begin_resize(&store, &b, Point::new(0.0, 0.0)).unwrap());
        assert!(matches!(ctl.state(), Gesture::Dragging { id, .. } if *id == a));
    }

    #[test]
    fn test_overlapping_drag_is_silently_rejected() {
        let (mut store, _, b) = store_with_two(OverlapPolicy::Reject);
        let mut ctl = GestureController::new();
        ctl.begin_drag(&store, &b, Point::new(0.0, 200.0)).unwrap();
        let outcome = ctl.pointer_move(&mut store, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(outcome, Some(Placement::Rejected));
        assert_eq!(store.get(&b).unwrap().y, 200.0);
        assert!(ctl.is_active());
    }

    #[test]
    fn test_resize_tracks_pointer_delta() {
        let (mut store, a, _) = store_with_two(OverlapPolicy::Reject);
        let mut ctl = GestureController::new();
        ctl.begin_resize(&store, &a, Point::new(150.0, 30.0)).unwrap();
        ctl.pointer_move(&mut store, Point::new(200.0, 60.0)).unwrap();
        let f = store.get(&a).unwrap();
        assert_eq!((f.width, f.height), (200.0, 60.0));
    }

    #[test]
    fn test_idle_move_is_noop() {
        let (mut store, _, _) = store_with_two(OverlapPolicy::Reject);
        let mut ctl = GestureController::new();
        assert_eq!(ctl.pointer_move(&mut store, Point::new(1.0, 1.0)).unwrap(), None);
        assert_eq!(ctl.end(), Gesture::Idle);
    }

    #[test]
    fn test_deleted_field_ends_gesture() {
        let (mut store, a, _) = store_with_two(OverlapPolicy::Reject);
        let mut ctl = GestureController::new();
        ctl.begin_drag(&store, &a, Point::new(0.0, 0.0)).unwrap();
        store.remove_field(&a).unwrap();
        assert!(ctl.pointer_move(&mut store, Point::new(5.0, 5.0)).is_err());
        assert!(!ctl.is_active());
    }
}
