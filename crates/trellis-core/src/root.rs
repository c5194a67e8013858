//! The renderer: mounts a component tree into a container element and keeps
//! it up to date.
//!
//! Reconciliation is positional. A new node reuses the previous node's DOM
//! when both sit at the same position and have the same kind (same tag for
//! elements, same render-function type for components); otherwise the old
//! subtree is torn down and a fresh one is created. The renderer only ever
//! removes DOM nodes it created itself, so content that handlers inject into
//! an element survives later renders.
//!
//! A render runs in three steps:
//!
//! 1. components render and their output is reconciled into the DOM,
//! 2. refs are written as elements are attached,
//! 3. queued commit effects run, children before parents.
//!
//! Teardown runs every unmount callback of a subtree before any of its DOM is
//! detached.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dom::{DomElement, DomNode, DomText};
use crate::error::HookError;
use crate::hooks::{ContextMap, HookScope, render_in_scope, with_context};
use crate::node::Node;
use crate::node_ref::NodeRef;
use crate::token::RenderToken;

/// Options for a [`Root`].
#[derive(Debug, Clone)]
pub struct RootOptions {
    /// Label used in traces.
    pub name: String,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            name: String::from("root"),
        }
    }
}

type Effect = Box<dyn FnOnce()>;

/// Effects collected during one render pass.
#[derive(Default)]
struct Commit {
    effects: Vec<Effect>,
}

impl Commit {
    fn run(self) -> usize {
        let count = self.effects.len();
        for effect in self.effects {
            effect();
        }
        count
    }
}

/// What a node turned into after it was committed.
enum Mounted {
    Element {
        dom: DomElement,
        node_ref: Option<NodeRef>,
        children: Vec<Mounted>,
    },
    Text {
        dom: DomText,
    },
    Fragment(Vec<Mounted>),
    Component {
        type_id: TypeId,
        scope: Rc<RefCell<HookScope>>,
        child: Box<Mounted>,
    },
}

impl Mounted {
    /// The last top-level DOM node this subtree placed in its parent.
    fn last_dom(&self) -> Option<DomNode> {
        match self {
            Mounted::Element { dom, .. } => Some(DomNode::Element(dom.clone())),
            Mounted::Text { dom } => Some(DomNode::Text(dom.clone())),
            Mounted::Fragment(children) => children.iter().rev().find_map(Mounted::last_dom),
            Mounted::Component { child, .. } => child.last_dom(),
        }
    }

    /// Run unmount callbacks, parents before children.
    fn run_unmount(&self) {
        match self {
            Mounted::Component { scope, child, .. } => {
                let cleanups = scope.borrow_mut().take_unmount();
                for cleanup in cleanups {
                    cleanup();
                }
                child.run_unmount();
            }
            Mounted::Element { children, .. } | Mounted::Fragment(children) => {
                for child in children {
                    child.run_unmount();
                }
            }
            Mounted::Text { .. } => {}
        }
    }

    /// Remove this subtree's top-level DOM nodes from `parent`.
    fn detach(self, parent: &DomElement) {
        match self {
            Mounted::Element { dom, .. } => {
                parent.remove_child(&DomNode::Element(dom));
            }
            Mounted::Text { dom } => {
                parent.remove_child(&DomNode::Text(dom));
            }
            Mounted::Fragment(children) => {
                for child in children {
                    child.detach(parent);
                }
            }
            Mounted::Component { child, .. } => child.detach(parent),
        }
    }
}

/// Run unmount callbacks while the subtree is still attached, then detach it
/// and clear its refs.
fn teardown(old: Mounted, parent: &DomElement) {
    old.run_unmount();
    let refs = SubtreeRefs::collect(&old);
    old.detach(parent);
    refs.clear();
}

/// Refs of a subtree, captured before it is detached.
struct SubtreeRefs(Vec<(NodeRef, DomElement)>);

impl SubtreeRefs {
    fn collect(mounted: &Mounted) -> Self {
        let mut refs = Vec::new();
        Self::walk(mounted, &mut refs);
        Self(refs)
    }

    fn walk(mounted: &Mounted, refs: &mut Vec<(NodeRef, DomElement)>) {
        match mounted {
            Mounted::Element {
                dom,
                node_ref,
                children,
            } => {
                if let Some(node_ref) = node_ref {
                    refs.push((node_ref.clone(), dom.clone()));
                }
                for child in children {
                    Self::walk(child, refs);
                }
            }
            Mounted::Fragment(children) => {
                for child in children {
                    Self::walk(child, refs);
                }
            }
            Mounted::Component { child, .. } => Self::walk(child, refs),
            Mounted::Text { .. } => {}
        }
    }

    fn clear(self) {
        for (node_ref, dom) in self.0 {
            node_ref.clear_if(&dom);
        }
    }
}

fn create(node: Node, parent: &DomElement, after: Option<&DomNode>, commit: &mut Commit) -> Mounted {
    match node {
        Node::Element(el) => {
            let dom = DomElement::new(el.tag);
            dom.set_class_list(&el.classes);
            dom.set_attrs(&el.attrs);
            parent.insert_after(after, DomNode::Element(dom.clone()));
            let children = reconcile_children(&dom, Vec::new(), el.children, None, commit);
            if let Some(node_ref) = &el.node_ref {
                node_ref.set(Some(dom.clone()));
            }
            Mounted::Element {
                dom,
                node_ref: el.node_ref,
                children,
            }
        }
        Node::Text(text) => {
            let dom = DomText::new(text);
            parent.insert_after(after, DomNode::Text(dom.clone()));
            Mounted::Text { dom }
        }
        Node::Fragment(children) => Mounted::Fragment(reconcile_children(
            parent,
            Vec::new(),
            children,
            after.cloned(),
            commit,
        )),
        Node::Component(component) => {
            tracing::trace!(component = component.name, "mounting component");
            let scope = Rc::new(RefCell::new(HookScope::new()));
            render_component(
                component.type_id,
                scope,
                &component.render,
                None,
                parent,
                after,
                commit,
            )
        }
    }
}

fn patch(
    old: Mounted,
    node: Node,
    parent: &DomElement,
    after: Option<&DomNode>,
    commit: &mut Commit,
) -> Mounted {
    match (old, node) {
        (
            Mounted::Element {
                dom,
                node_ref,
                children,
            },
            Node::Element(el),
        ) if dom.tag() == el.tag => {
            dom.set_class_list(&el.classes);
            dom.set_attrs(&el.attrs);
            let children = reconcile_children(&dom, children, el.children, None, commit);
            if let Some(old_ref) = &node_ref
                && el.node_ref.as_ref().is_none_or(|new_ref| !new_ref.ptr_eq(old_ref))
            {
                old_ref.clear_if(&dom);
            }
            if let Some(new_ref) = &el.node_ref {
                new_ref.set(Some(dom.clone()));
            }
            Mounted::Element {
                dom,
                node_ref: el.node_ref,
                children,
            }
        }
        (Mounted::Text { dom }, Node::Text(text)) => {
            dom.set_content(&text);
            Mounted::Text { dom }
        }
        (Mounted::Fragment(children), Node::Fragment(nodes)) => Mounted::Fragment(
            reconcile_children(parent, children, nodes, after.cloned(), commit),
        ),
        (
            Mounted::Component {
                type_id,
                scope,
                child,
            },
            Node::Component(component),
        ) if type_id == component.type_id => render_component(
            type_id,
            scope,
            &component.render,
            Some(*child),
            parent,
            after,
            commit,
        ),
        (old, node) => {
            teardown(old, parent);
            create(node, parent, after, commit)
        }
    }
}

fn render_component(
    type_id: TypeId,
    scope: Rc<RefCell<HookScope>>,
    render: &Rc<dyn Fn() -> Node>,
    previous: Option<Mounted>,
    parent: &DomElement,
    after: Option<&DomNode>,
    commit: &mut Commit,
) -> Mounted {
    let node = render_in_scope(&scope, || render());
    let child = match previous {
        Some(previous) => patch(previous, node, parent, after, commit),
        None => create(node, parent, after, commit),
    };
    // Queued after the subtree so children's effects run first.
    let effects = scope.borrow_mut().take_effects();
    commit.effects.extend(effects);
    Mounted::Component {
        type_id,
        scope,
        child: Box::new(child),
    }
}

fn reconcile_children(
    parent: &DomElement,
    old: Vec<Mounted>,
    nodes: Vec<Node>,
    after: Option<DomNode>,
    commit: &mut Commit,
) -> Vec<Mounted> {
    let mut old = old.into_iter();
    let mut anchor = after;
    let mut mounted = Vec::with_capacity(nodes.len());

    for node in nodes {
        let next = match old.next() {
            Some(previous) => patch(previous, node, parent, anchor.as_ref(), commit),
            None => create(node, parent, anchor.as_ref(), commit),
        };
        if let Some(last) = next.last_dom() {
            anchor = Some(last);
        }
        mounted.push(next);
    }

    for stale in old {
        teardown(stale, parent);
    }
    mounted
}

/// A mounted component tree.
///
/// # Example
///
/// ```ignore
/// let container = DomElement::new("div");
/// let mut root = Root::mount(container.clone(), || {
///     Node::element("p").child("hello").into()
/// });
/// assert_eq!(container.inner_html(), "<p>hello</p>");
/// root.unmount()?;
/// ```
pub struct Root {
    container: DomElement,
    app: Rc<dyn Fn() -> Node>,
    mounted: Option<Mounted>,
    contexts: ContextMap,
    dirty: Rc<Cell<bool>>,
    options: RootOptions,
}

impl Root {
    /// Create an unmounted root. Nothing renders until [`Root::render`].
    pub fn new(container: DomElement, app: impl Fn() -> Node + 'static) -> Self {
        Self::with_options(container, RootOptions::default(), app)
    }

    pub fn with_options(
        container: DomElement,
        options: RootOptions,
        app: impl Fn() -> Node + 'static,
    ) -> Self {
        Self {
            container,
            app: Rc::new(app),
            mounted: None,
            contexts: ContextMap::default(),
            dirty: Rc::new(Cell::new(false)),
            options,
        }
    }

    /// Create a root and render it immediately.
    pub fn mount(container: DomElement, app: impl Fn() -> Node + 'static) -> Self {
        let mut root = Self::new(container, app);
        root.render();
        root
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Make `value` available to [`use_context`](crate::hooks::use_context)
    /// during this root's renders. Replaces a previous value of the same type
    /// and marks the root dirty.
    pub fn provide_context<T: Clone + 'static>(&self, value: T) {
        self.contexts
            .borrow_mut()
            .insert(TypeId::of::<T>(), Box::new(value) as Box<dyn Any>);
        self.dirty.set(true);
    }

    /// Rerender whenever `token` is invalidated and the root is flushed.
    pub fn subscribe(&self, token: &RenderToken) {
        token.subscribe(&self.dirty);
    }

    /// Mount the tree, or update it if it is already mounted.
    pub fn render(&mut self) {
        let mut commit = Commit::default();
        let previous = self.mounted.take();
        let mounting = previous.is_none();
        self.dirty.set(false);

        let app = Rc::clone(&self.app);
        let container = self.container.clone();
        let mounted = with_context(&self.contexts, || match previous {
            Some(Mounted::Component {
                type_id,
                scope,
                child,
            }) => render_component(
                type_id,
                scope,
                &app,
                Some(*child),
                &container,
                None,
                &mut commit,
            ),
            _ => render_component(
                TypeId::of::<Root>(),
                Rc::new(RefCell::new(HookScope::new())),
                &app,
                None,
                &container,
                None,
                &mut commit,
            ),
        });
        self.mounted = Some(mounted);

        let effects = commit.run();
        tracing::debug!(
            root = %self.options.name,
            mounting,
            effects,
            "committed render"
        );
    }

    /// Rerender a mounted tree.
    pub fn update(&mut self) -> Result<(), HookError> {
        if self.mounted.is_none() {
            return Err(HookError::NotMounted);
        }
        self.render();
        Ok(())
    }

    /// Rerender if the root was marked dirty. Returns whether it rendered.
    pub fn flush(&mut self) -> Result<bool, HookError> {
        if !self.dirty.get() {
            return Ok(false);
        }
        self.update()?;
        Ok(true)
    }

    /// Run every unmount callback, then detach the tree from the container.
    pub fn unmount(&mut self) -> Result<(), HookError> {
        let mounted = self.mounted.take().ok_or(HookError::NotMounted)?;
        teardown(mounted, &self.container);
        tracing::debug!(root = %self.options.name, "unmounted");
        Ok(())
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        if self.mounted.is_some() && !std::thread::panicking() {
            let _ = self.unmount();
        }
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("name", &self.options.name)
            .field("mounted", &self.is_mounted())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{use_commit_effect, use_context, use_ref, use_unmount};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn mount_and_update_reuse_elements() {
        init_tracing();
        let label = Rc::new(RefCell::new(String::from("one")));
        let container = DomElement::new("div");

        let text = label.clone();
        let mut root = Root::mount(container.clone(), move || {
            Node::element("p").class("title").child(text.borrow().clone()).into()
        });
        assert_eq!(container.inner_html(), "<p class=\"title\">one</p>");
        let first = container.children()[0].clone();

        *label.borrow_mut() = String::from("two");
        root.update().unwrap();
        assert_eq!(container.inner_html(), "<p class=\"title\">two</p>");
        assert_eq!(container.children()[0], first);
    }

    #[test]
    fn changed_tag_replaces_element_in_place() {
        let wide = Rc::new(Cell::new(false));
        let container = DomElement::new("div");

        let flag = wide.clone();
        let mut root = Root::mount(container.clone(), move || {
            let middle = if flag.get() { "section" } else { "span" };
            Node::fragment([
                Node::text("a"),
                Node::element(middle).into(),
                Node::text("c"),
            ])
        });
        assert_eq!(container.inner_html(), "a<span></span>c");

        wide.set(true);
        root.update().unwrap();
        assert_eq!(container.inner_html(), "a<section></section>c");
    }

    #[test]
    fn growing_fragment_inserts_before_next_sibling() {
        let count = Rc::new(Cell::new(1));
        let container = DomElement::new("ul");

        let n = count.clone();
        let mut root = Root::mount(container.clone(), move || {
            let items = (0..n.get()).map(|i| Node::element("li").child(i.to_string()).into());
            Node::fragment([Node::fragment(items), Node::element("hr").into()])
        });

        count.set(3);
        root.update().unwrap();
        assert_eq!(container.inner_html(), "<li>0</li><li>1</li><li>2</li><hr></hr>");

        count.set(0);
        root.update().unwrap();
        assert_eq!(container.inner_html(), "<hr></hr>");
    }

    #[test]
    fn refs_follow_element_lifetime() {
        let show = Rc::new(Cell::new(true));
        let slot = NodeRef::new();
        let container = DomElement::new("div");

        let (flag, target) = (show.clone(), slot.clone());
        let mut root = Root::mount(container.clone(), move || {
            if flag.get() {
                Node::element("span").node_ref(target.clone()).into()
            } else {
                Node::empty()
            }
        });
        let el = slot.get().expect("ref set after mount");
        assert_eq!(el.parent(), Some(container.clone()));

        show.set(false);
        root.update().unwrap();
        assert!(slot.get().is_none());
        assert!(el.parent().is_none());
    }

    #[test]
    fn child_effects_run_before_parent_effects() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let container = DomElement::new("div");

        let log = order.clone();
        let _root = Root::mount(container, move || {
            let parent_log = log.clone();
            use_commit_effect(move || parent_log.borrow_mut().push("parent"));

            let child_log = log.clone();
            Node::component(move || {
                let child_log = child_log.clone();
                use_commit_effect(move || child_log.borrow_mut().push("child"));
                Node::empty()
            })
        });

        assert_eq!(*order.borrow(), vec!["child", "parent"]);
    }

    #[test]
    fn unmount_callbacks_see_attached_elements() {
        let attached_at_unmount = Rc::new(Cell::new(false));
        let container = DomElement::new("div");

        let seen = attached_at_unmount.clone();
        let mut root = Root::mount(container.clone(), move || {
            let el_ref = use_ref(NodeRef::new).get();
            let target = el_ref.clone();
            let seen = seen.clone();
            use_unmount(move || {
                let attached = target.get().and_then(|el| el.parent()).is_some();
                seen.set(attached);
            });
            Node::element("div").node_ref(el_ref).into()
        });

        root.unmount().unwrap();
        assert!(attached_at_unmount.get());
        assert_eq!(container.child_count(), 0);
        assert_eq!(root.unmount(), Err(HookError::NotMounted));
    }

    #[test]
    fn removed_component_runs_its_unmount() {
        let show = Rc::new(Cell::new(true));
        let unmounted = Rc::new(Cell::new(0));
        let container = DomElement::new("div");

        let (flag, count) = (show.clone(), unmounted.clone());
        let mut root = Root::mount(container, move || {
            if !flag.get() {
                return Node::empty();
            }
            let count = count.clone();
            Node::component(move || {
                let count = count.clone();
                use_unmount(move || count.set(count.get() + 1));
                Node::text("child")
            })
        });

        root.update().unwrap();
        assert_eq!(unmounted.get(), 0);

        show.set(false);
        root.update().unwrap();
        assert_eq!(unmounted.get(), 1);
    }

    #[test]
    fn injected_children_survive_rerender() {
        let container = DomElement::new("div");
        let slot = NodeRef::new();

        let target = slot.clone();
        let mut root = Root::mount(container.clone(), move || {
            Node::element("td").node_ref(target.clone()).child(Node::empty()).into()
        });
        slot.get().unwrap().set_inner_html("<b>x</b>");

        root.update().unwrap();
        assert_eq!(container.inner_html(), "<td><b>x</b></td>");
    }

    #[test]
    fn token_invalidation_marks_root_dirty() {
        let renders = Rc::new(Cell::new(0));
        let token = RenderToken::new();

        let count = renders.clone();
        let mut root = Root::mount(DomElement::new("div"), move || {
            count.set(count.get() + 1);
            Node::empty()
        });
        root.subscribe(&token);

        assert!(!root.flush().unwrap());
        token.invalidate();
        assert!(root.is_dirty());
        assert!(root.flush().unwrap());
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn update_requires_mounted_root() {
        let mut root = Root::new(DomElement::new("div"), Node::empty);
        assert_eq!(root.update(), Err(HookError::NotMounted));
        root.render();
        assert!(root.is_mounted());
    }

    #[test]
    fn provided_context_is_visible_to_components() {
        let container = DomElement::new("div");
        let mut root = Root::new(container.clone(), || {
            Node::component(|| Node::text(use_context::<String>().unwrap_or_default()))
        });
        root.provide_context(String::from("en-GB"));
        assert!(root.is_dirty());

        root.render();
        assert_eq!(container.inner_html(), "en-GB");
    }
}
