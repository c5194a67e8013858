//! Explicit rerender requests.
//!
//! A [`RenderToken`] is handed to whoever needs to force a rerender (a plugin
//! that changed its content-type handlers, for instance). Roots subscribe to
//! it; invalidating the token marks every live subscriber dirty and the next
//! [`Root::flush`](crate::root::Root::flush) rerenders.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared invalidation token.
#[derive(Clone, Default)]
pub struct RenderToken {
    inner: Rc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    subscribers: RefCell<Vec<Weak<Cell<bool>>>>,
}

impl RenderToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every live subscriber dirty.
    pub fn invalidate(&self) {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        subscribers.retain(|weak| match weak.upgrade() {
            Some(dirty) => {
                dirty.set(true);
                true
            }
            None => false,
        });
        tracing::trace!(subscribers = subscribers.len(), "render token invalidated");
    }

    /// Register a dirty flag. The token only keeps a weak link to it.
    pub(crate) fn subscribe(&self, dirty: &Rc<Cell<bool>>) {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        if !subscribers
            .iter()
            .any(|weak| weak.as_ptr() == Rc::as_ptr(dirty))
        {
            subscribers.push(Rc::downgrade(dirty));
        }
    }

    /// Number of subscribers that are still alive.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for RenderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderToken")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
