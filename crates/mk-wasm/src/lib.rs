//! WASM bridge for Markup: exposes the annotation overlay engine to the
//! browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host renders the page
//! and the annotations itself; it forwards container-relative pointer events
//! here and applies the returned messages to its annotation store.
//!
//! Every event method returns a JSON array of messages:
//! `[{"type":"update","entity":{…}}, {"type":"delete","id":"…"}]`.

use js_sys::Function;
use mk_core::{Annotation, AnnotationId, Viewport};
use mk_editor::overlay::Overlay;
use mk_editor::{InputEvent, ListenerHost, OverlayConfig, OverlayMessage, ToolKind};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Global pointer listening delegated to two JS callbacks, each called with
/// the annotation id that owns the drag session.
struct JsListenerHost {
    attach: Option<Function>,
    detach: Option<Function>,
}

impl JsListenerHost {
    fn notify(callback: Option<&Function>, owner: AnnotationId) {
        if let Some(callback) = callback
            && callback
                .call1(&JsValue::NULL, &JsValue::from_str(owner.as_str()))
                .is_err()
        {
            log::warn!("listener callback threw for {owner}");
        }
    }
}

impl ListenerHost for JsListenerHost {
    fn attach(&self, owner: AnnotationId) {
        Self::notify(self.attach.as_ref(), owner);
    }

    fn detach(&self, owner: AnnotationId) {
        Self::notify(self.detach.as_ref(), owner);
    }
}

/// The WASM-facing overlay controller.
///
/// One per rendered page. All interaction from the host goes through this
/// struct.
#[wasm_bindgen]
pub struct MarkupOverlay {
    overlay: Overlay,
}

#[wasm_bindgen]
impl MarkupOverlay {
    /// Create an overlay for a container of the given size. `attach` and
    /// `detach` install and remove the window-level `pointermove` /
    /// `pointerup` listeners for a drag session.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f64,
        height: f64,
        attach: Option<Function>,
        detach: Option<Function>,
    ) -> Self {
        console_error_panic_hook_setup();

        let listeners: Rc<dyn ListenerHost> = Rc::new(JsListenerHost { attach, detach });
        Self {
            overlay: Overlay::new(Viewport::new(width, height), listeners),
        }
    }

    /// Replace the hit-test tuning from a (partial) JSON object.
    /// Returns `false` and keeps the current tuning on a parse error.
    pub fn with_config_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<OverlayConfig>(json) {
            Ok(config) => {
                self.overlay.set_config(config);
                true
            }
            Err(e) => {
                log::warn!("invalid overlay config: {e}");
                false
            }
        }
    }

    /// The container was measured or resized.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> String {
        messages_to_json(&self.overlay.set_viewport(Viewport::new(width, height)))
    }

    /// Set the active toolbar tool by name (`"select"`, `"arrow"`, …).
    pub fn set_tool(&mut self, name: &str) {
        self.overlay.set_tool(ToolKind::from_name(name));
    }

    pub fn tool(&self) -> String {
        self.overlay.active_tool().name().to_string()
    }

    // ─── Store sync ──────────────────────────────────────────────────────

    /// Insert or replace an annotation from the store.
    /// Returns `false` if the JSON is not an annotation.
    pub fn upsert_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Annotation>(json) {
            Ok(annotation) => {
                self.overlay.insert(annotation);
                true
            }
            Err(e) => {
                log::warn!("rejected annotation: {e}");
                false
            }
        }
    }

    /// Drop an annotation the store deleted. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        AnnotationId::lookup(id).is_some_and(|id| self.overlay.remove(id))
    }

    /// All working copies as a JSON array, in paint order.
    pub fn annotations_json(&self) -> String {
        let annotations: Vec<&Annotation> = self.overlay.annotations().collect();
        serde_json::to_string(&annotations).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::pointer_down(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::pointer_move(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerUp { x, y })
    }

    pub fn pointer_cancel(&mut self) -> String {
        self.dispatch(InputEvent::PointerCancel)
    }

    /// The pointer left the container. Ends hover; an open drag continues.
    pub fn pointer_leave(&mut self) -> String {
        self.dispatch(InputEvent::PointerLeave)
    }

    /// `key` is the `KeyboardEvent.key` value.
    pub fn handle_key(&mut self, key: &str) -> String {
        self.dispatch(InputEvent::key(key))
    }

    /// The host's own delete button for `id` was pressed.
    pub fn request_delete(&mut self, id: &str) -> String {
        let messages: Vec<OverlayMessage> = AnnotationId::lookup(id)
            .and_then(|id| self.overlay.request_delete(id))
            .into_iter()
            .collect();
        messages_to_json(&messages)
    }

    // ─── Rendering queries ───────────────────────────────────────────────

    /// `{"handles":bool,"deleteAffordance":bool}`, or `null` for an unknown id.
    pub fn visibility_json(&self, id: &str) -> String {
        let visibility = AnnotationId::lookup(id).and_then(|id| self.overlay.visibility(id));
        serde_json::to_string(&visibility).unwrap_or_else(|_| "null".to_string())
    }

    /// `{"length":…,"angle":…,"midpoint":{"x":…,"y":…}}`, or `null`.
    pub fn derived_json(&self, id: &str) -> String {
        let derived = AnnotationId::lookup(id).and_then(|id| self.overlay.derived(id));
        serde_json::to_string(&derived).unwrap_or_else(|_| "null".to_string())
    }

    /// The hovered annotation id, or empty string.
    pub fn hovered(&self) -> String {
        self.overlay
            .hovered()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn is_dragging(&self) -> bool {
        self.overlay.active_session().is_some()
    }
}

impl MarkupOverlay {
    fn dispatch(&mut self, event: InputEvent) -> String {
        messages_to_json(&self.overlay.handle(&event))
    }
}

fn messages_to_json(messages: &[OverlayMessage]) -> String {
    serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string())
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Markup WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mk_core::{Geometry, Point};
    use pretty_assertions::assert_eq;

    fn overlay_with_arrow(name: &str) -> MarkupOverlay {
        let mut overlay = MarkupOverlay::new(800.0, 600.0, None, None);
        let arrow = Annotation::new(
            AnnotationId::intern(name),
            Geometry::arrow(
                Point::new(100.0, 100.0),
                Point::new(300.0, 100.0),
                Viewport::new(800.0, 600.0),
            ),
        );
        let json = serde_json::to_string(&arrow).unwrap();
        assert!(overlay.upsert_json(&json));
        overlay
    }

    #[test]
    fn drag_returns_update_messages() {
        let mut overlay = overlay_with_arrow("wasm_drag");
        assert_eq!(overlay.pointer_down(200.0, 100.0), "[]");
        assert!(overlay.is_dragging());

        let json: serde_json::Value =
            serde_json::from_str(&overlay.pointer_move(250.0, 100.0)).unwrap();
        assert_eq!(json[0]["type"], "update");
        assert_eq!(json[0]["entity"]["id"], "wasm_drag");
        assert_eq!(json[0]["entity"]["start"]["abs"]["x"], 150.0);

        assert_eq!(overlay.pointer_up(250.0, 100.0), "[]");
        assert!(!overlay.is_dragging());
        assert_eq!(overlay.hovered(), "wasm_drag");
    }

    #[test]
    fn delete_request_json() {
        let mut overlay = overlay_with_arrow("wasm_delete");
        assert_eq!(
            overlay.request_delete("wasm_delete"),
            r#"[{"type":"delete","id":"wasm_delete"}]"#
        );
        assert_eq!(overlay.request_delete("wasm_missing"), "[]");
        assert_eq!(AnnotationId::lookup("wasm_missing"), None);
        assert!(overlay.remove("wasm_delete"));
        assert_eq!(overlay.annotations_json(), "[]");
    }

    #[test]
    fn queries_for_unknown_ids_are_null() {
        let mut overlay = overlay_with_arrow("wasm_query");
        assert_eq!(overlay.visibility_json("wasm_nope"), "null");
        assert_eq!(overlay.derived_json("wasm_nope"), "null");
        assert!(!overlay.remove("wasm_nope"));
        // Host queries never grow the id table
        assert_eq!(AnnotationId::lookup("wasm_nope"), None);
        assert_eq!(
            overlay.visibility_json("wasm_query"),
            r#"{"handles":false,"deleteAffordance":false}"#
        );
        let derived: serde_json::Value =
            serde_json::from_str(&overlay.derived_json("wasm_query")).unwrap();
        assert_eq!(derived["length"], 200.0);
    }

    #[test]
    fn tool_and_config_from_host() {
        let mut overlay = overlay_with_arrow("wasm_tool");
        overlay.set_tool("arrow");
        assert_eq!(overlay.tool(), "arrow");
        assert_eq!(
            overlay.visibility_json("wasm_tool"),
            r#"{"handles":true,"deleteAffordance":false}"#
        );
        overlay.set_tool("lasso");
        assert_eq!(overlay.tool(), "select");

        assert!(overlay.with_config_json(r#"{"handleRadius": 20}"#));
        assert!(!overlay.with_config_json("{"));
        assert!(!overlay.upsert_json(r#"{"id":"wasm_bad"}"#));
    }

    #[test]
    fn delete_while_dragging_stops_updates() {
        let mut overlay = overlay_with_arrow("wasm_delete_drag");
        overlay.pointer_down(150.0, 100.0);
        assert!(overlay.is_dragging());
        assert_eq!(
            overlay.request_delete("wasm_delete_drag"),
            r#"[{"type":"delete","id":"wasm_delete_drag"}]"#
        );
        assert!(!overlay.is_dragging());
        assert_eq!(overlay.pointer_move(170.0, 100.0), "[]");
    }

    #[test]
    fn resize_reports_moved_annotations() {
        let mut overlay = overlay_with_arrow("wasm_resize");
        let json: serde_json::Value =
            serde_json::from_str(&overlay.set_viewport(400.0, 300.0)).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["entity"]["end"]["abs"]["x"], 150.0);
    }
}
