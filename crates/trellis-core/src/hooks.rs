//! Per-instance hook state.
//!
//! Every component instance mounted by a [`Root`](crate::root::Root) owns a
//! [`HookScope`]. While the instance renders, its scope is the current scope
//! and hook functions read and write slots in it. Slots are identified by
//! their position in the call sequence, so hooks must be called in the same
//! order on every render.
//!
//! # Available Hooks
//!
//! | Hook | Purpose |
//! |------|---------|
//! | [`use_ref`] | Mutable state that persists across renders |
//! | [`use_commit_effect`] | Work to run after the current render is committed |
//! | [`use_unmount`] | Work to run when the instance is torn down |
//! | [`use_context`] | Read a value provided to the root |
//!
//! # Example
//!
//! ```ignore
//! use trellis_core::*;
//!
//! fn counter() -> Node {
//!     let renders = use_ref(|| 0u32);
//!     *renders.borrow_mut() += 1;
//!
//!     let el_ref = use_ref(NodeRef::new).get();
//!     let target = el_ref.clone();
//!     use_commit_effect(move || {
//!         if let Some(el) = target.get() {
//!             el.set_attr("data-ready", "1");
//!         }
//!     });
//!
//!     Node::element("div").node_ref(el_ref).child("counter").into()
//! }
//! ```
//!
//! # Error Messages
//!
//! Misuse panics with a descriptive message:
//!
//! ```text
//! trellis hooks error: `use_ref` called outside of render!
//! trellis hooks error: Hook count mismatch!
//! trellis hooks error: Hook order mismatch at index 1!
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// ============================================================================
// Hook Scope
// ============================================================================

/// Internal storage for a single hook.
struct HookEntry {
    value: Box<dyn Any>,
    hook_type: &'static str,
}

type Effect = Box<dyn FnOnce()>;
type UnmountSlot = Rc<RefCell<Option<Effect>>>;

/// Hook state of one component instance.
pub struct HookScope {
    /// Stored hook values, indexed by call order
    hooks: Vec<HookEntry>,
    /// Current hook index during rendering (reset to 0 each render)
    current_index: usize,
    /// Whether we're currently inside a render cycle
    is_rendering: bool,
    /// Expected hook count from previous render (for mismatch detection)
    expected_count: Option<usize>,
    /// Number of completed renders (for debugging)
    render_count: usize,
    /// Effects queued by the current render, run after commit
    pending_effects: Vec<Effect>,
    /// Teardown slots in registration order
    unmount_slots: Vec<UnmountSlot>,
}

impl HookScope {
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            current_index: 0,
            is_rendering: false,
            expected_count: None,
            render_count: 0,
            pending_effects: Vec::new(),
            unmount_slots: Vec::new(),
        }
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    fn begin_render(&mut self) {
        self.current_index = 0;
        self.is_rendering = true;
        self.pending_effects.clear();
    }

    fn end_render(&mut self) {
        if let Some(expected) = self.expected_count
            && self.current_index != expected
        {
            panic!(
                "\n\n\x1b[1;31mtrellis hooks error: Hook count mismatch!\x1b[0m\n\
                Previous render had {} hooks, current render has {} hooks.\n\
                Render number: {}\n\n\
                This usually happens when:\n\
                - A hook is called inside a conditional (if/match)\n\
                - A hook is called inside a loop with varying iterations\n\
                - A hook is called inside an early return\n\n\
                Hooks must be called in the exact same order every render.\n",
                expected, self.current_index, self.render_count
            );
        }

        self.expected_count = Some(self.current_index);
        self.is_rendering = false;
        self.render_count += 1;
    }

    /// Get or create the slot at the current index.
    fn use_hook<T: Clone + 'static>(
        &mut self,
        hook_type: &'static str,
        init: impl FnOnce() -> T,
    ) -> (T, bool) {
        if !self.is_rendering {
            panic_outside_render(hook_type);
        }

        let index = self.current_index;
        self.current_index += 1;

        if let Some(entry) = self.hooks.get(index) {
            if entry.hook_type != hook_type {
                panic!(
                    "\n\n\x1b[1;31mtrellis hooks error: Hook order mismatch at index {}!\x1b[0m\n\
                    Previous render: `{}`\n\
                    Current render: `{}`\n\n\
                    Hooks must be called in the exact same order every render.\n",
                    index, entry.hook_type, hook_type
                );
            }

            let value = entry
                .value
                .downcast_ref::<T>()
                .expect("Hook value type mismatch - this is a bug in trellis")
                .clone();
            (value, false)
        } else {
            let value = init();
            self.hooks.push(HookEntry {
                value: Box::new(value.clone()),
                hook_type,
            });
            (value, true)
        }
    }

    /// Drain the effects queued by the last render.
    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.pending_effects)
    }

    /// Take every pending teardown callback, in registration order.
    ///
    /// Callers run them after releasing the scope borrow.
    pub(crate) fn take_unmount(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.unmount_slots)
            .into_iter()
            .filter_map(|slot| {
                let cleanup = slot.borrow_mut().take();
                cleanup
            })
            .collect()
    }
}

impl Default for HookScope {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_outside_render(hook_type: &str) -> ! {
    panic!(
        "\n\n\x1b[1;31mtrellis hooks error: `{}` called outside of render!\x1b[0m\n\
        Hooks can only be called during component rendering.\n\
        Make sure you're not calling hooks in:\n\
        - Commit effects or unmount callbacks\n\
        - Content handlers\n\
        - Static initializers\n",
        hook_type
    );
}

// Stack of scopes currently rendering; the top is the current scope.
thread_local! {
    static SCOPE_STACK: RefCell<Vec<Rc<RefCell<HookScope>>>> = const { RefCell::new(Vec::new()) };
}

fn with_current_scope<R>(hook_type: &'static str, f: impl FnOnce(&mut HookScope) -> R) -> R {
    let scope = SCOPE_STACK.with(|stack| stack.borrow().last().cloned());
    match scope {
        Some(scope) => f(&mut scope.borrow_mut()),
        None => panic_outside_render(hook_type),
    }
}

struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Run `render` with `scope` as the current hook scope.
///
/// The scope must not be borrowed while `render` runs.
pub fn render_in_scope<R>(scope: &Rc<RefCell<HookScope>>, render: impl FnOnce() -> R) -> R {
    scope.borrow_mut().begin_render();
    SCOPE_STACK.with(|stack| stack.borrow_mut().push(Rc::clone(scope)));
    let output = {
        let _guard = ScopeGuard;
        render()
    };
    scope.borrow_mut().end_render();
    output
}

// ============================================================================
// Context Store
// ============================================================================

/// Values provided to one root, keyed by type.
pub type ContextMap = Rc<RefCell<HashMap<TypeId, Box<dyn Any>>>>;

// Context maps of the roots currently rendering.
thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextMap>> = const { RefCell::new(Vec::new()) };
}

struct ContextGuard;

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) fn with_context<R>(map: &ContextMap, f: impl FnOnce() -> R) -> R {
    CONTEXT_STACK.with(|stack| stack.borrow_mut().push(Rc::clone(map)));
    let _guard = ContextGuard;
    f()
}

/// Retrieve a value provided to the rendering root by type.
///
/// Returns `None` when no value of that type was provided or when called
/// outside a render.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct Locale(&'static str);
///
/// fn day_header() -> Node {
///     let locale = use_context::<Locale>().map_or("en", |l| l.0);
///     Node::element("th").attr("lang", locale).into()
/// }
/// ```
pub fn use_context<T: Clone + 'static>() -> Option<T> {
    let map = CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())?;
    let map = map.borrow();
    map.get(&TypeId::of::<T>())
        .and_then(|value| value.downcast_ref::<T>())
        .cloned()
}

// ============================================================================
// Public API - Hook functions
// ============================================================================

/// Create or retrieve a mutable reference that persists across renders.
///
/// Mutating the value does not cause a re-render.
///
/// # Example
///
/// ```ignore
/// fn cell() -> Node {
///     let renders = use_ref(|| 0);
///     *renders.borrow_mut() += 1;
///     Node::text(format!("rendered {} times", renders.get()))
/// }
/// ```
pub fn use_ref<T: 'static>(init: impl FnOnce() -> T) -> RefHandle<T> {
    let (inner, _) = with_current_scope("use_ref", |scope| {
        scope.use_hook("use_ref", || Rc::new(RefCell::new(init())))
    });
    RefHandle { inner }
}

/// Handle to a ref value created by `use_ref`.
pub struct RefHandle<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Clone for RefHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> RefHandle<T> {
    /// Get a reference to the current value.
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.inner.borrow()
    }

    /// Get a mutable reference to the current value.
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Set the value directly.
    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }
}

impl<T: Clone> RefHandle<T> {
    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

/// Queue `effect` to run once the current render has been committed.
///
/// By the time it runs every element of the render is attached and every
/// [`NodeRef`](crate::node_ref::NodeRef) in it is set. Within a commit, effects
/// of child components run before those of their parent, and effects of one
/// instance run in the order they were queued.
pub fn use_commit_effect(effect: impl FnOnce() + 'static) {
    with_current_scope("use_commit_effect", |scope| {
        scope.use_hook("use_commit_effect", || ());
        scope.pending_effects.push(Box::new(effect));
    });
}

/// Register a teardown callback for the current instance.
///
/// The callback from the most recent render runs exactly once, before the
/// instance's elements are detached.
pub fn use_unmount(cleanup: impl FnOnce() + 'static) {
    with_current_scope("use_unmount", |scope| {
        let (slot, created) =
            scope.use_hook::<UnmountSlot>("use_unmount", || Rc::new(RefCell::new(None)));
        if created {
            scope.unmount_slots.push(Rc::clone(&slot));
        }
        *slot.borrow_mut() = Some(Box::new(cleanup));
    });
}
