//! Annotation overlay: per-annotation widgets and the router in front of them.
//!
//! An [`AnnotationWidget`] owns the working copy of one annotation together
//! with its drag controller and hover flag, and turns input events into
//! [`OverlayMessage`]s. The [`Overlay`] holds every widget in paint order,
//! resolves pointer positions to a widget and target, and enforces that at
//! most one drag session is open across all annotations.
//!
//! Neither owns the annotation collection. The host inserts what its store
//! holds, applies the returned messages to the store, and removes widgets
//! whose annotations the store deleted.

use crate::config::OverlayConfig;
use crate::dispatch::OverlayMessage;
use crate::drag::{DragController, DragMode};
use crate::hit::{self, PointerTarget};
use crate::hover::{HoverState, Visibility};
use crate::input::InputEvent;
use crate::listener::ListenerHost;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::ToolKind;
use kurbo::Point;
use mk_core::{Annotation, AnnotationId, Derived, Viewport};
use std::rc::Rc;

// ─── Widget ──────────────────────────────────────────────────────────────

/// One annotation's interactive layer.
#[derive(Debug)]
pub struct AnnotationWidget {
    annotation: Annotation,
    drag: DragController,
    hover: HoverState,
}

impl AnnotationWidget {
    pub fn new(annotation: Annotation, listeners: Rc<dyn ListenerHost>) -> Self {
        let drag = DragController::new(annotation.id, listeners);
        Self {
            annotation,
            drag,
            hover: HoverState::default(),
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.annotation.id
    }

    /// The working copy, including every committed drag frame.
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag.mode()
    }

    pub fn is_hovering(&self) -> bool {
        self.hover.is_hovering()
    }

    pub fn pointer_enter(&mut self) -> bool {
        self.hover.pointer_enter()
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.hover.pointer_leave()
    }

    pub fn visibility(&self, active_tool: ToolKind) -> Visibility {
        self.hover.visibility(active_tool, self.annotation.kind())
    }

    /// Arrowhead angle, length, and delete-button position for the
    /// current geometry.
    pub fn derived(&self) -> Option<Derived> {
        Derived::of(&self.annotation.geometry)
    }

    /// The delete message for this annotation. An open session ends here,
    /// so no update can follow the delete. The widget itself stays until the
    /// host removes it after the store deleted.
    pub fn request_delete(&mut self) -> OverlayMessage {
        log::debug!("{}: delete requested", self.annotation.id);
        self.drag.pointer_cancel();
        OverlayMessage::Delete {
            id: self.annotation.id,
        }
    }

    /// Take a new version of the annotation from the store.
    ///
    /// An open session is cancelled: its grab offset or snapshot refers to
    /// geometry that no longer exists.
    pub fn replace(&mut self, annotation: Annotation) {
        debug_assert_eq!(annotation.id, self.annotation.id);
        self.drag.pointer_cancel();
        self.annotation = annotation;
    }

    /// Regenerate absolute coordinates for `viewport`. Returns an update
    /// when any absolute coordinate moved. Sessions are the router's call.
    pub fn reproject(&mut self, viewport: Viewport) -> Option<OverlayMessage> {
        match self.annotation.reproject(viewport) {
            Ok(true) => Some(OverlayMessage::update(&self.annotation)),
            Ok(false) => None,
            Err(e) => {
                log::debug!("{}: reprojection skipped: {e}", self.annotation.id);
                None
            }
        }
    }

    /// Handle an input event. `target` is the part of this annotation under
    /// the pointer for pointer-down, and is ignored for every other event.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        target: Option<PointerTarget>,
        viewport: Viewport,
    ) -> Vec<OverlayMessage> {
        let id = self.annotation.id;
        match event {
            InputEvent::PointerDown { x, y } => match target {
                Some(PointerTarget::DeleteAffordance) => vec![self.request_delete()],
                Some(PointerTarget::Drag(target)) => {
                    if let Err(e) = self.drag.pointer_down(
                        &self.annotation,
                        target,
                        Point::new(*x, *y),
                    ) {
                        log::debug!("{id}: pointer-down ignored: {e}");
                    }
                    vec![]
                }
                None => vec![],
            },

            InputEvent::PointerMove { x, y } => {
                match self.drag.pointer_move(
                    &mut self.annotation,
                    Point::new(*x, *y),
                    viewport,
                ) {
                    Ok(true) => vec![OverlayMessage::update(&self.annotation)],
                    Ok(false) => vec![],
                    Err(e) => {
                        log::debug!("{id}: move not committed: {e}");
                        vec![]
                    }
                }
            }

            InputEvent::PointerUp { .. } => {
                self.drag.pointer_up();
                vec![]
            }

            InputEvent::PointerCancel => {
                self.drag.pointer_cancel();
                vec![]
            }

            // Leaving the container ends hover, not the drag: the session's
            // global listeners keep delivering moves.
            InputEvent::PointerLeave => {
                self.hover.pointer_leave();
                vec![]
            }

            InputEvent::Key { key } => match ShortcutMap::resolve(key) {
                Some(ShortcutAction::CancelDrag) => {
                    self.drag.pointer_cancel();
                    vec![]
                }
                Some(ShortcutAction::DeleteHovered) if self.hover.is_hovering() => {
                    vec![self.request_delete()]
                }
                _ => vec![],
            },
        }
    }
}

// ─── Router ──────────────────────────────────────────────────────────────

/// Every widget on the page, in paint order (last is topmost).
pub struct Overlay {
    widgets: Vec<AnnotationWidget>,
    /// Owner of the open drag session.
    active: Option<AnnotationId>,
    hovered: Option<AnnotationId>,
    viewport: Viewport,
    /// Last size the geometry was projected onto.
    measured: Option<Viewport>,
    active_tool: ToolKind,
    config: OverlayConfig,
    listeners: Rc<dyn ListenerHost>,
}

impl Overlay {
    pub fn new(viewport: Viewport, listeners: Rc<dyn ListenerHost>) -> Self {
        Self {
            widgets: Vec::new(),
            active: None,
            hovered: None,
            viewport,
            measured: viewport.is_measured().then_some(viewport),
            active_tool: ToolKind::default(),
            config: OverlayConfig::default(),
            listeners,
        }
    }

    pub fn with_config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_config(&mut self, config: OverlayConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
    }

    fn widget(&self, id: AnnotationId) -> Option<&AnnotationWidget> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    fn widget_mut(&mut self, id: AnnotationId) -> Option<&mut AnnotationWidget> {
        self.widgets.iter_mut().find(|w| w.id() == id)
    }

    // ─── Collection sync ─────────────────────────────────────────────────

    /// Add an annotation on top, or replace the one with the same id.
    ///
    /// Absolute coordinates are regenerated from the relative ones for the
    /// current viewport; the relatives are what the store persists.
    pub fn insert(&mut self, mut annotation: Annotation) {
        if let Err(e) = annotation.reproject(self.viewport) {
            log::debug!("{}: inserted as stored: {e}", annotation.id);
        }
        let id = annotation.id;
        if let Some(widget) = self.widget_mut(id) {
            widget.replace(annotation);
            if self.active == Some(id) {
                self.active = None;
            }
            return;
        }
        let widget = AnnotationWidget::new(annotation, Rc::clone(&self.listeners));
        self.widgets.push(widget);
    }

    /// Drop the widget for `id`. An open session on it ends here.
    pub fn remove(&mut self, id: AnnotationId) -> bool {
        let Some(index) = self.widgets.iter().position(|w| w.id() == id) else {
            return false;
        };
        self.widgets.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        true
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.widget(id).map(AnnotationWidget::annotation)
    }

    /// Working copies, in paint order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.widgets.iter().map(AnnotationWidget::annotation)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// The container was measured again.
    ///
    /// Every annotation is reprojected from its relative coordinates and an
    /// update is returned for each one whose absolute coordinates changed.
    /// An open session survives unless the measured size really changed:
    /// re-reporting the same size is a no-op, and an unmeasured viewport is
    /// kept (later moves are skipped) without touching geometry or session.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Vec<OverlayMessage> {
        if viewport == self.viewport {
            return vec![];
        }
        self.viewport = viewport;
        if !viewport.is_measured() {
            log::debug!(
                "viewport {}x{} unmeasured, keeping geometry",
                viewport.width,
                viewport.height
            );
            return vec![];
        }
        if self.measured != Some(viewport) {
            self.measured = Some(viewport);
            if let Some(id) = self.active.take() {
                log::debug!("{id}: resized to {}x{} mid-drag", viewport.width, viewport.height);
            }
            for widget in &mut self.widgets {
                widget.drag.pointer_cancel();
            }
        }
        self.widgets
            .iter_mut()
            .filter_map(|w| w.reproject(viewport))
            .collect()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route an input event. Returns the messages for the store.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<OverlayMessage> {
        let viewport = self.viewport;
        match event {
            InputEvent::PointerDown { .. } => {
                if let Some(active) = self.active {
                    log::debug!("pointer-down ignored, {active} is being dragged");
                    return vec![];
                }
                let Some(pointer) = event.position() else {
                    return vec![];
                };
                let tool = self.active_tool;
                let hit = hit::hit_test_topmost(
                    self.widgets
                        .iter()
                        .map(|w| (w.annotation(), w.visibility(tool))),
                    &self.config,
                    pointer,
                )
                .map(|(a, target)| (a.id, target));
                let Some((id, target)) = hit else {
                    return vec![];
                };
                let Some(widget) = self.widget_mut(id) else {
                    return vec![];
                };
                let messages = widget.handle(event, Some(target), viewport);
                if widget.drag_mode() != DragMode::Idle {
                    self.active = Some(id);
                }
                messages
            }

            InputEvent::PointerMove { .. } => match self.active {
                Some(id) => self
                    .widget_mut(id)
                    .map(|w| w.handle(event, None, viewport))
                    .unwrap_or_default(),
                None => {
                    if let Some(pointer) = event.position() {
                        self.update_hover(pointer);
                    }
                    vec![]
                }
            },

            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => {
                let Some(id) = self.active.take() else {
                    return vec![];
                };
                let messages = self
                    .widget_mut(id)
                    .map(|w| w.handle(event, None, viewport))
                    .unwrap_or_default();
                if let Some(pointer) = event.position() {
                    self.update_hover(pointer);
                }
                messages
            }

            InputEvent::PointerLeave => {
                self.set_hovered(None);
                vec![]
            }

            InputEvent::Key { .. } => {
                let mut messages = Vec::new();
                let owner = self.active;
                if let Some(id) = owner
                    && let Some(widget) = self.widget_mut(id)
                {
                    messages.extend(widget.handle(event, None, viewport));
                    if widget.drag_mode() == DragMode::Idle {
                        self.active = None;
                    }
                }
                // Each widget sees a key once
                if let Some(id) = self.hovered
                    && owner != Some(id)
                    && let Some(widget) = self.widget_mut(id)
                {
                    messages.extend(widget.handle(event, None, viewport));
                }
                messages
            }
        }
    }

    fn update_hover(&mut self, pointer: Point) {
        let over = self
            .widgets
            .iter()
            .rev()
            .find(|w| hit::hover_test(w.annotation(), &self.config, pointer))
            .map(AnnotationWidget::id);
        self.set_hovered(over);
    }

    fn set_hovered(&mut self, next: Option<AnnotationId>) {
        if self.hovered == next {
            return;
        }
        if let Some(prev) = self.hovered
            && let Some(widget) = self.widget_mut(prev)
        {
            widget.pointer_leave();
        }
        if let Some(id) = next
            && let Some(widget) = self.widget_mut(id)
        {
            widget.pointer_enter();
        }
        log::trace!("hover: {:?} -> {:?}", self.hovered, next);
        self.hovered = next;
    }

    // ─── Queries & commands ──────────────────────────────────────────────

    /// The delete-affordance action, for hosts that render it themselves.
    /// Ends the session if `id` is being dragged.
    pub fn request_delete(&mut self, id: AnnotationId) -> Option<OverlayMessage> {
        let message = self.widget_mut(id).map(AnnotationWidget::request_delete)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(message)
    }

    pub fn visibility(&self, id: AnnotationId) -> Option<Visibility> {
        self.widget(id).map(|w| w.visibility(self.active_tool))
    }

    pub fn derived(&self, id: AnnotationId) -> Option<Derived> {
        self.widget(id).and_then(AnnotationWidget::derived)
    }

    pub fn hovered(&self) -> Option<AnnotationId> {
        self.hovered
    }

    /// The annotation being dragged and how.
    pub fn active_session(&self) -> Option<(AnnotationId, DragMode)> {
        let id = self.active?;
        self.widget(id).map(|w| (id, w.drag_mode()))
    }
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("widgets", &self.widgets)
            .field("active", &self.active)
            .field("hovered", &self.hovered)
            .field("viewport", &self.viewport)
            .field("active_tool", &self.active_tool)
            .finish_non_exhaustive()
    }
}
