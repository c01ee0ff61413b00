//! Per-annotation drag state machine.
//!
//! ```text
//!             down on handle A              move: clamp + commit endpoint
//!   Idle ─────────────────────────▶ DraggingEndpointA ◀─┐
//!    │ ▲      down on handle B                          │
//!    │ │ ──────────────────────────▶ DraggingEndpointB ◀┘
//!    │ │      down on body
//!    │ └──── up / cancel ────────── DraggingWhole  (move: all-or-nothing)
//!    └─────────────────────────────▶
//! ```
//!
//! Two clamping policies apply. Dragging a single endpoint is a resize, and
//! clamping one point onto the container edge is always a valid shape.
//! Dragging the body is a rigid translation: clamping points independently
//! would shear the shape, so the move is committed only when every
//! translated point is already inside the container, and rejected in full
//! otherwise.

use crate::listener::{ListenerHost, ListenerLease};
use kurbo::{Point, Vec2};
use mk_core::model::{AnchoredPoint, Anchors, Annotation, Handle};
use mk_core::viewport::{Viewport, ensure_finite};
use mk_core::{AnnotationId, GeometryError};
use std::rc::Rc;

/// Which part of the annotation a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Handle(Handle),
    Body,
}

/// Observable state of a [`DragController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Idle,
    DraggingEndpointA,
    DraggingEndpointB,
    DraggingWhole,
}

#[derive(Debug)]
enum Manipulation {
    /// Resize: `offset` is pointer minus handle position at grab time.
    Endpoint { handle: Handle, offset: Vec2 },
    /// Rigid move: pointer and every point at grab time.
    Whole { origin: Point, snapshot: Anchors },
}

#[derive(Debug)]
struct DragSession {
    manipulation: Manipulation,
    _listeners: ListenerLease,
}

/// Interprets pointer events for one annotation.
pub struct DragController {
    owner: AnnotationId,
    listeners: Rc<dyn ListenerHost>,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(owner: AnnotationId, listeners: Rc<dyn ListenerHost>) -> Self {
        Self {
            owner,
            listeners,
            session: None,
        }
    }

    pub fn mode(&self) -> DragMode {
        match &self.session {
            None => DragMode::Idle,
            Some(s) => match s.manipulation {
                Manipulation::Endpoint {
                    handle: Handle::EndpointA,
                    ..
                } => DragMode::DraggingEndpointA,
                Manipulation::Endpoint {
                    handle: Handle::EndpointB,
                    ..
                } => DragMode::DraggingEndpointB,
                Manipulation::Whole { .. } => DragMode::DraggingWhole,
            },
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Open a session. Returns `Ok(false)` if one is already open: a second
    /// pointer-down during a drag is not a defined input and is ignored.
    pub fn pointer_down(
        &mut self,
        annotation: &Annotation,
        target: DragTarget,
        pointer: Point,
    ) -> Result<bool, GeometryError> {
        if self.session.is_some() {
            log::debug!("{}: pointer-down ignored, session already open", self.owner);
            return Ok(false);
        }
        let pointer = ensure_finite(pointer)?;

        let manipulation = match target {
            DragTarget::Handle(handle) => {
                let anchor = annotation.geometry.handle_anchor(handle)?;
                Manipulation::Endpoint {
                    handle,
                    offset: pointer - anchor.abs,
                }
            }
            DragTarget::Body => Manipulation::Whole {
                origin: pointer,
                snapshot: annotation.geometry.anchor_points(),
            },
        };

        log::debug!("{}: drag session opened ({target:?})", self.owner);
        self.session = Some(DragSession {
            manipulation,
            _listeners: ListenerLease::acquire(&self.listeners, self.owner),
        });
        Ok(true)
    }

    /// Apply a pointer move to `annotation`.
    ///
    /// `Ok(true)` when new geometry was committed, `Ok(false)` when no
    /// session is open. On `Err` nothing was written and the session stays
    /// open for the next move.
    pub fn pointer_move(
        &mut self,
        annotation: &mut Annotation,
        pointer: Point,
        viewport: Viewport,
    ) -> Result<bool, GeometryError> {
        let Some(session) = &self.session else {
            return Ok(false);
        };
        let pointer = ensure_finite(pointer)?;
        viewport.ensure_measured()?;

        match &session.manipulation {
            Manipulation::Endpoint { handle, offset } => {
                let raw = pointer - *offset;
                let clamped = viewport.clamp_point(raw);
                let anchor = annotation.geometry.handle_anchor_mut(*handle)?;
                *anchor = AnchoredPoint::commit(clamped, viewport);
                log::trace!("{}: {handle:?} -> ({}, {})", self.owner, clamped.x, clamped.y);
            }
            Manipulation::Whole { origin, snapshot } => {
                let delta = pointer - *origin;
                let candidates: Anchors = snapshot.iter().map(|p| *p + delta).collect();
                if let Some(outside) = candidates.iter().find(|p| !viewport.contains(**p)) {
                    return Err(GeometryError::OutOfBounds {
                        x: outside.x,
                        y: outside.y,
                    });
                }
                let anchors = annotation.geometry.anchors_mut();
                for (anchor, candidate) in anchors.into_iter().zip(candidates) {
                    *anchor = AnchoredPoint::commit(candidate, viewport);
                }
                log::trace!("{}: moved by ({}, {})", self.owner, delta.x, delta.y);
            }
        }
        Ok(true)
    }

    /// Close the session after a release. Returns whether one was open.
    pub fn pointer_up(&mut self) -> bool {
        self.end_session("released")
    }

    /// Close the session after the platform aborted the gesture.
    pub fn pointer_cancel(&mut self) -> bool {
        self.end_session("cancelled")
    }

    fn end_session(&mut self, reason: &str) -> bool {
        // Dropping the session drops its lease, which detaches the listeners.
        match self.session.take() {
            Some(_) => {
                log::debug!("{}: drag session {reason}", self.owner);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for DragController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragController")
            .field("owner", &self.owner)
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::ListenerCounter;
    use mk_core::model::Geometry;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    fn setup(name: &str) -> (Annotation, DragController, Rc<ListenerCounter>) {
        let id = AnnotationId::intern(name);
        let annotation = Annotation::new(
            id,
            Geometry::arrow(Point::new(100.0, 100.0), Point::new(300.0, 100.0), VIEWPORT),
        );
        let counter = Rc::new(ListenerCounter::default());
        let controller = DragController::new(id, counter.clone());
        (annotation, controller, counter)
    }

    #[test]
    fn endpoint_drag_keeps_grab_offset() {
        let (mut a, mut drag, _) = setup("drag_offset");
        // Grab handle A 3px right and 2px below its center
        assert!(
            drag.pointer_down(&a, DragTarget::Handle(Handle::EndpointA), Point::new(103.0, 102.0))
                .unwrap()
        );
        assert_eq!(drag.mode(), DragMode::DraggingEndpointA);

        assert!(drag.pointer_move(&mut a, Point::new(203.0, 152.0), VIEWPORT).unwrap());
        let start = a.geometry.handle_anchor(Handle::EndpointA).unwrap();
        assert_eq!(start.abs, Point::new(200.0, 150.0));
        assert_eq!(start.rel, Point::new(0.25, 0.25));
        // The other endpoint is untouched
        assert_eq!(
            a.geometry.handle_anchor(Handle::EndpointB).unwrap().abs,
            Point::new(300.0, 100.0)
        );
    }

    #[test]
    fn endpoint_drag_clamps_to_container() {
        let (mut a, mut drag, _) = setup("drag_clamp");
        drag.pointer_down(&a, DragTarget::Handle(Handle::EndpointB), Point::new(300.0, 100.0))
            .unwrap();
        assert_eq!(drag.mode(), DragMode::DraggingEndpointB);

        drag.pointer_move(&mut a, Point::new(950.0, -40.0), VIEWPORT).unwrap();
        let end = a.geometry.handle_anchor(Handle::EndpointB).unwrap();
        assert_eq!(end.abs, Point::new(800.0, 0.0));
        assert_eq!(end.rel, Point::new(1.0, 0.0));
    }

    #[test]
    fn whole_move_commits_inside() {
        let (mut a, mut drag, _) = setup("drag_whole_ok");
        drag.pointer_down(&a, DragTarget::Body, Point::new(200.0, 100.0)).unwrap();
        assert_eq!(drag.mode(), DragMode::DraggingWhole);

        assert!(drag.pointer_move(&mut a, Point::new(250.0, 100.0), VIEWPORT).unwrap());
        assert_eq!(
            a.geometry.anchor_points().to_vec(),
            vec![Point::new(150.0, 100.0), Point::new(350.0, 100.0)]
        );
        assert!(a.is_consistent(VIEWPORT));
    }

    #[test]
    fn whole_move_rejects_partial_exit() {
        let (mut a, mut drag, _) = setup("drag_whole_reject");
        let before = a.clone();
        drag.pointer_down(&a, DragTarget::Body, Point::new(200.0, 100.0)).unwrap();

        let err = drag
            .pointer_move(&mut a, Point::new(50.0, 100.0), VIEWPORT)
            .unwrap_err();
        assert_eq!(err, GeometryError::OutOfBounds { x: -50.0, y: 100.0 });
        assert_eq!(a, before);
        // Session survives the rejection
        assert_eq!(drag.mode(), DragMode::DraggingWhole);
    }

    #[test]
    fn whole_move_is_relative_to_grab_not_last_commit() {
        let (mut a, mut drag, _) = setup("drag_whole_snapshot");
        drag.pointer_down(&a, DragTarget::Body, Point::new(200.0, 100.0)).unwrap();
        drag.pointer_move(&mut a, Point::new(220.0, 100.0), VIEWPORT).unwrap();
        // Rejected frame in between
        assert!(drag.pointer_move(&mut a, Point::new(0.0, 100.0), VIEWPORT).is_err());
        drag.pointer_move(&mut a, Point::new(230.0, 110.0), VIEWPORT).unwrap();
        assert_eq!(
            a.geometry.anchor_points().to_vec(),
            vec![Point::new(130.0, 110.0), Point::new(330.0, 110.0)]
        );
    }

    #[test]
    fn invalid_input_is_skipped() {
        let (mut a, mut drag, _) = setup("drag_invalid");
        let before = a.clone();
        assert!(matches!(
            drag.pointer_down(&a, DragTarget::Body, Point::new(f64::NAN, 0.0)),
            Err(GeometryError::NonFinite { .. })
        ));
        assert_eq!(drag.mode(), DragMode::Idle);

        drag.pointer_down(&a, DragTarget::Handle(Handle::EndpointA), Point::new(100.0, 100.0))
            .unwrap();
        assert!(matches!(
            drag.pointer_move(&mut a, Point::new(f64::INFINITY, 5.0), VIEWPORT),
            Err(GeometryError::NonFinite { .. })
        ));
        assert!(matches!(
            drag.pointer_move(&mut a, Point::new(150.0, 150.0), Viewport::default()),
            Err(GeometryError::UnmeasuredViewport { .. })
        ));
        assert_eq!(a, before);
        assert!(drag.is_dragging());
    }

    #[test]
    fn ink_has_no_handles() {
        let id = AnnotationId::intern("drag_ink");
        let a = Annotation::new(
            id,
            Geometry::ink([Point::new(10.0, 10.0), Point::new(20.0, 25.0)], VIEWPORT),
        );
        let counter = Rc::new(ListenerCounter::default());
        let mut drag = DragController::new(id, counter.clone());
        assert!(
            drag.pointer_down(&a, DragTarget::Handle(Handle::EndpointA), Point::new(10.0, 10.0))
                .is_err()
        );
        assert_eq!(counter.attached(), 0);
        assert!(drag.pointer_down(&a, DragTarget::Body, Point::new(15.0, 15.0)).unwrap());
    }

    #[test]
    fn second_pointer_down_is_ignored() {
        let (a, mut drag, counter) = setup("drag_second_down");
        drag.pointer_down(&a, DragTarget::Body, Point::new(200.0, 100.0)).unwrap();
        let again = drag
            .pointer_down(&a, DragTarget::Handle(Handle::EndpointB), Point::new(300.0, 100.0))
            .unwrap();
        assert!(!again);
        assert_eq!(drag.mode(), DragMode::DraggingWhole);
        assert_eq!(counter.attached(), 1);
    }

    #[test]
    fn every_exit_detaches_listeners() {
        let (mut a, mut drag, counter) = setup("drag_exits");

        drag.pointer_down(&a, DragTarget::Body, Point::new(200.0, 100.0)).unwrap();
        assert_eq!(counter.live(), 1);
        assert!(drag.pointer_up());
        assert_eq!(counter.live(), 0);

        drag.pointer_down(&a, DragTarget::Handle(Handle::EndpointA), Point::new(100.0, 100.0))
            .unwrap();
        assert!(drag.pointer_cancel());
        assert_eq!(counter.live(), 0);

        // Nothing left to close, and moves are inert
        assert!(!drag.pointer_up());
        assert!(!drag.pointer_move(&mut a, Point::new(10.0, 10.0), VIEWPORT).unwrap());

        drag.pointer_down(&a, DragTarget::Body, Point::new(200.0, 100.0)).unwrap();
        drop(drag);
        assert_eq!(counter.attached(), 3);
        assert_eq!(counter.detached(), 3);
    }
}
