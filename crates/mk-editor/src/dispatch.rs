//! Outward messages to the annotation store.
//!
//! The engine never owns the annotation collection. It reports exactly two
//! things to whoever does: "this annotation now looks like this" and "the
//! user asked to delete this annotation". Messages are returned by the
//! event handlers; [`dispatch`] forwards a batch into any
//! [`AnnotationStore`].

use mk_core::{Annotation, AnnotationId};
use serde::Serialize;
use std::collections::HashMap;

/// A message from the overlay engine to the annotation store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayMessage {
    /// Full new state after a committed geometry change.
    Update { entity: Annotation },
    /// The user asked for this annotation to be removed.
    Delete { id: AnnotationId },
}

impl OverlayMessage {
    pub fn update(entity: &Annotation) -> Self {
        Self::Update {
            entity: entity.clone(),
        }
    }

    pub fn id(&self) -> AnnotationId {
        match self {
            Self::Update { entity } => entity.id,
            Self::Delete { id } => *id,
        }
    }
}

/// The owner of the annotation collection.
pub trait AnnotationStore {
    fn update(&mut self, entity: Annotation);
    fn delete(&mut self, id: AnnotationId);
}

/// Forward messages to `store`, in order.
pub fn dispatch(
    messages: impl IntoIterator<Item = OverlayMessage>,
    store: &mut impl AnnotationStore,
) {
    for message in messages {
        match message {
            OverlayMessage::Update { entity } => store.update(entity),
            OverlayMessage::Delete { id } => store.delete(id),
        }
    }
}

/// Recording store: keeps the raw message stream.
impl AnnotationStore for Vec<OverlayMessage> {
    fn update(&mut self, entity: Annotation) {
        self.push(OverlayMessage::Update { entity });
    }

    fn delete(&mut self, id: AnnotationId) {
        self.push(OverlayMessage::Delete { id });
    }
}

/// In-memory store keeping annotations in insertion (paint) order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entities: HashMap<AnnotationId, Annotation>,
    order: Vec<AnnotationId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }
}

impl AnnotationStore for MemoryStore {
    fn update(&mut self, entity: Annotation) {
        let id = entity.id;
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
        }
    }

    fn delete(&mut self, id: AnnotationId) {
        if self.entities.remove(&id).is_some() {
            self.order.retain(|other| *other != id);
        }
    }
}
