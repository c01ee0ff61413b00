//! Annotation identity.
//!
//! Ids are handed out by the annotation store; the engine only compares,
//! hashes, and echoes them back in messages. Interning makes them `Copy`
//! so every message and session can carry one without allocating.

use lasso::{Spur, ThreadedRodeo};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identity of a drawn annotation. Immutable for the entity's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationId(Spur);

impl AnnotationId {
    /// The id for `s`, interning it on first sight.
    pub fn intern(s: &str) -> Self {
        Self(INTERNER.get_or_intern(s))
    }

    /// The id for `s` if any annotation ever used it. Never interns, so
    /// host queries with unknown ids leave the interner untouched.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(Self)
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnnotationId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnnotationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = AnnotationId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an annotation id string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<AnnotationId, E> {
        if v.is_empty() {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        Ok(AnnotationId::intern(v))
    }
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(IdVisitor)
    }
}
