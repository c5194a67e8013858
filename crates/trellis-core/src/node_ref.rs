//! Ref slots for live elements.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dom::DomElement;

/// A mutable slot holding the current live element, or nothing.
///
/// The renderer writes the slot during commit when a virtual element carrying
/// this ref is attached, and clears it when that element is removed. Hooks and
/// callbacks only read it. Setting a ref also sets every ref registered with
/// [`NodeRef::forward_to`].
#[derive(Clone, Default)]
pub struct NodeRef {
    inner: Rc<RefInner>,
}

#[derive(Default)]
struct RefInner {
    current: RefCell<Option<DomElement>>,
    forwards: RefCell<Vec<NodeRef>>,
}

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// The element currently held by the slot.
    pub fn get(&self) -> Option<DomElement> {
        self.inner.current.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    /// Store `el` and propagate it to forwarded refs.
    pub fn set(&self, el: Option<DomElement>) {
        let unchanged = match (&*self.inner.current.borrow(), &el) {
            (Some(old), Some(new)) => old.ptr_eq(new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        *self.inner.current.borrow_mut() = el.clone();

        let forwards = self.inner.forwards.borrow().clone();
        for target in forwards {
            target.set(el.clone());
        }
    }

    /// Clear the slot, but only if it still holds `el`.
    pub fn clear_if(&self, el: &DomElement) {
        let holds = self
            .inner
            .current
            .borrow()
            .as_ref()
            .is_some_and(|current| current.ptr_eq(el));
        if holds {
            self.set(None);
        }
    }

    /// Mirror this slot into `target` from now on.
    ///
    /// Registering the same target twice is a no-op. If the slot already holds
    /// an element, `target` receives it immediately.
    pub fn forward_to(&self, target: &NodeRef) {
        if self.ptr_eq(target) {
            return;
        }
        {
            let mut forwards = self.inner.forwards.borrow_mut();
            if forwards.iter().any(|existing| existing.ptr_eq(target)) {
                return;
            }
            forwards.push(target.clone());
        }
        if let Some(el) = self.get() {
            target.set(Some(el));
        }
    }

    /// Stop mirroring into `target`. If `target` still holds this slot's
    /// element, it is cleared.
    pub fn unforward(&self, target: &NodeRef) {
        self.inner
            .forwards
            .borrow_mut()
            .retain(|existing| !existing.ptr_eq(target));
        if let Some(el) = self.get() {
            target.clear_if(&el);
        }
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.get()).finish()
    }
}
