//! Session-scoped global pointer listeners.
//!
//! While a drag is in progress the host must deliver pointer moves and
//! releases even when the pointer leaves the annotation (in a browser that
//! means `pointermove`/`pointerup` listeners on `window`). Those listeners
//! are the only shared resource of the engine. They are held by a
//! [`ListenerLease`]: acquiring it attaches, dropping it detaches. The lease
//! lives inside the drag session, so every way a session can end (release,
//! cancel, delete, a container resize, removal) detaches exactly
//! once.

use mk_core::AnnotationId;
use std::cell::Cell;
use std::rc::Rc;

/// The host side of global pointer listening.
///
/// Methods take `&self`: hosts are single-threaded and typically forward to
/// platform calls that need no exclusive borrow.
pub trait ListenerHost {
    /// Start delivering global move/up/cancel events for `owner`'s session.
    fn attach(&self, owner: AnnotationId);

    /// Stop delivering them.
    fn detach(&self, owner: AnnotationId);
}

/// Attached global listeners for one drag session.
#[must_use = "dropping the lease detaches the listeners immediately"]
pub struct ListenerLease {
    host: Rc<dyn ListenerHost>,
    owner: AnnotationId,
}

impl ListenerLease {
    pub fn acquire(host: &Rc<dyn ListenerHost>, owner: AnnotationId) -> Self {
        host.attach(owner);
        log::trace!("listeners attached for {owner}");
        Self {
            host: Rc::clone(host),
            owner,
        }
    }

    pub fn owner(&self) -> AnnotationId {
        self.owner
    }
}

impl Drop for ListenerLease {
    fn drop(&mut self) {
        self.host.detach(self.owner);
        log::trace!("listeners detached for {}", self.owner);
    }
}

impl std::fmt::Debug for ListenerLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerLease")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// For hosts that already route every pointer event to the engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoListeners;

impl ListenerHost for NoListeners {
    fn attach(&self, _owner: AnnotationId) {}
    fn detach(&self, _owner: AnnotationId) {}
}

/// Counts attach/detach calls. Handy for hosts asserting leak-freedom.
#[derive(Debug, Default)]
pub struct ListenerCounter {
    attached: Cell<usize>,
    detached: Cell<usize>,
}

impl ListenerCounter {
    pub fn attached(&self) -> usize {
        self.attached.get()
    }

    pub fn detached(&self) -> usize {
        self.detached.get()
    }

    /// Number of leases currently alive.
    pub fn live(&self) -> usize {
        self.attached.get() - self.detached.get()
    }
}

impl ListenerHost for ListenerCounter {
    fn attach(&self, _owner: AnnotationId) {
        self.attached.set(self.attached.get() + 1);
    }

    fn detach(&self, _owner: AnnotationId) {
        self.detached.set(self.detached.get() + 1);
    }
}
