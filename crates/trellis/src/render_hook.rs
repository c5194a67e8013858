//! The render hook: mount callbacks, custom content and class names in one.
//!
//! [`use_render_hook`] is what component authors reach for. It nests the
//! content hook inside the mount hook, points the content hook's backup ref at
//! the root element, and normalizes class names, then hands everything to a
//! render function:
//!
//! ```ignore
//! use trellis::prelude::*;
//!
//! fn day_cell(date: String) -> Node {
//!     let props = RenderHookProps::new(date)
//!         .class_names(ClassNameSpec::func(|date: &String| {
//!             Some(format!("fc-day fc-day-{date}").into())
//!         }))
//!         .content(ContentSpec::generator(|date: &String, _| Some(date.clone().into())))
//!         .did_mount(|arg| tracing::info!(date = %arg.props, "day cell mounted"));
//!
//!     render_hook(props, |root_ref, class_names, inner_ref, inner| {
//!         Node::element("td")
//!             .node_ref(root_ref)
//!             .classes(class_names.iter())
//!             .child(Node::element("div").node_ref(inner_ref).child(inner.into_node()))
//!             .into()
//!     })
//! }
//! ```

use std::rc::Rc;

use trellis_core::{Node, NodeRef};

use crate::class_names::{ClassNameSpec, normalize_class_names};
use crate::content::{ContentHookProps, ContentSpec, InnerContent, use_content_hook};
use crate::content_types::HandlerRegistry;
use crate::mount::{MountArg, MountCallback, MountHookProps, use_mount_hook};

/// Props for [`use_render_hook`].
pub struct RenderHookProps<P> {
    pub hook_props: P,
    pub class_names: Option<ClassNameSpec<P>>,
    pub content: Option<ContentSpec<P>>,
    pub default_content: Option<ContentSpec<P>>,
    pub did_mount: Option<MountCallback<P>>,
    pub will_unmount: Option<MountCallback<P>>,
    /// Receives the root element.
    pub el_ref: Option<NodeRef>,
    /// Handlers for custom content; see [`ContentHookProps::handlers`].
    pub handlers: Option<Rc<HandlerRegistry>>,
}

impl<P> RenderHookProps<P> {
    pub fn new(hook_props: P) -> Self {
        Self {
            hook_props,
            class_names: None,
            content: None,
            default_content: None,
            did_mount: None,
            will_unmount: None,
            el_ref: None,
            handlers: None,
        }
    }

    pub fn class_names(mut self, class_names: impl Into<ClassNameSpec<P>>) -> Self {
        self.class_names = Some(class_names.into());
        self
    }

    pub fn content(mut self, content: impl Into<ContentSpec<P>>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn default_content(mut self, content: impl Into<ContentSpec<P>>) -> Self {
        self.default_content = Some(content.into());
        self
    }

    pub fn did_mount(mut self, callback: impl Fn(&MountArg<P>) + 'static) -> Self {
        self.did_mount = Some(Rc::new(callback));
        self
    }

    pub fn will_unmount(mut self, callback: impl Fn(&MountArg<P>) + 'static) -> Self {
        self.will_unmount = Some(Rc::new(callback));
        self
    }

    pub fn el_ref(mut self, node_ref: NodeRef) -> Self {
        self.el_ref = Some(node_ref);
        self
    }

    pub fn handlers(mut self, handlers: Rc<HandlerRegistry>) -> Self {
        self.handlers = Some(handlers);
        self
    }
}

impl<P: Clone> Clone for RenderHookProps<P> {
    fn clone(&self) -> Self {
        Self {
            hook_props: self.hook_props.clone(),
            class_names: self.class_names.clone(),
            content: self.content.clone(),
            default_content: self.default_content.clone(),
            did_mount: self.did_mount.clone(),
            will_unmount: self.will_unmount.clone(),
            el_ref: self.el_ref.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

impl<P: Default> Default for RenderHookProps<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

/// Run the mount and content hooks for the current component and pass
/// `(root_ref, class_names, inner_ref, inner_content)` to `render`.
///
/// Class names are normalized on every call; use
/// [`use_class_names`](crate::class_names::use_class_names) for memoization.
pub fn use_render_hook<P, R>(
    props: &RenderHookProps<P>,
    render: impl FnOnce(NodeRef, Rc<[String]>, NodeRef, InnerContent) -> R,
) -> R
where
    P: Clone + 'static,
{
    let mount_props = MountHookProps {
        hook_props: props.hook_props.clone(),
        did_mount: props.did_mount.clone(),
        will_unmount: props.will_unmount.clone(),
        el_ref: props.el_ref.clone(),
    };

    use_mount_hook(&mount_props, |root_ref| {
        let class_names = normalize_class_names(props.class_names.as_ref(), &props.hook_props);
        let content_props = ContentHookProps {
            hook_props: props.hook_props.clone(),
            content: props.content.clone(),
            default_content: props.default_content.clone(),
            backup_el_ref: Some(root_ref.clone()),
            handlers: props.handlers.clone(),
        };
        use_content_hook(&content_props, |inner_ref, inner| {
            render(root_ref, class_names, inner_ref, inner)
        })
    })
}

/// Wrap [`use_render_hook`] in a component of its own.
pub fn render_hook<P, F>(props: RenderHookProps<P>, render: F) -> Node
where
    P: Clone + 'static,
    F: Fn(NodeRef, Rc<[String]>, NodeRef, InnerContent) -> Node + 'static,
{
    Node::component(move || use_render_hook(&props, &render))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use trellis_core::{DomElement, Root};

    use crate::content::CustomContent;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[derive(Debug, Clone)]
    struct CellProps {
        date: &'static str,
    }

    /// What the render function saw on each render.
    #[derive(Default)]
    struct Seen {
        class_names: Vec<Rc<[String]>>,
        inner: Vec<InnerContent>,
    }

    /// A `td` root with a `div` hosting the inner content.
    fn day_cell(
        props: RenderHookProps<CellProps>,
        seen: Rc<RefCell<Seen>>,
    ) -> impl Fn() -> Node + 'static {
        move || {
            let seen = seen.clone();
            render_hook(props.clone(), move |root_ref, class_names, inner_ref, inner| {
                let mut seen = seen.borrow_mut();
                seen.class_names.push(class_names.clone());
                seen.inner.push(inner.clone());
                Node::element("td")
                    .node_ref(root_ref)
                    .classes(class_names.iter())
                    .child(
                        Node::element("div")
                            .node_ref(inner_ref)
                            .child(inner.into_node()),
                    )
                    .into()
            })
        }
    }

    fn html_registry(applied: Rc<Cell<u32>>) -> Rc<HandlerRegistry> {
        let mut registry = HandlerRegistry::new();
        registry
            .register::<String, _, _>("html", move || {
                let applied = applied.clone();
                move |el: &DomElement, html: &String| {
                    applied.set(applied.get() + 1);
                    el.set_inner_html(html);
                }
            })
            .unwrap();
        Rc::new(registry)
    }

    #[cfg(feature = "builtin-handlers")]
    #[test]
    fn html_content_is_injected_and_reported_as_placeholder() {
        use crate::content_types::HTML;

        init_tracing();
        let seen = Rc::new(RefCell::new(Seen::default()));
        let props = RenderHookProps::new(CellProps { date: "2024-01-01" })
            .handlers(Rc::new(HandlerRegistry::with_builtins()))
            .content(ContentSpec::generator(|_: &CellProps, _| {
                Some(CustomContent::new().with(HTML, String::from("<b>x</b>")).into())
            }));
        let container = DomElement::new("tr");

        let _root = Root::mount(container.clone(), day_cell(props, seen.clone()));

        assert_eq!(container.inner_html(), "<td><div><b>x</b></div></td>");
        assert_eq!(seen.borrow().inner, vec![InnerContent::Placeholder]);
    }

    #[test]
    fn default_content_renders_without_handler() {
        let applied = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Seen::default()));
        let props = RenderHookProps::new(CellProps { date: "2024-01-01" })
            .handlers(html_registry(applied.clone()))
            .default_content(ContentSpec::generator(|_: &CellProps, _| {
                Some("fallback".into())
            }));
        let container = DomElement::new("tr");

        let _root = Root::mount(container.clone(), day_cell(props, seen.clone()));

        assert_eq!(
            seen.borrow().inner,
            vec![InnerContent::Node(Node::text("fallback"))]
        );
        assert_eq!(container.inner_html(), "<td><div>fallback</div></td>");
        assert_eq!(applied.get(), 0);
    }

    #[test]
    fn class_list_is_shared_across_renders() {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let props = RenderHookProps::new(CellProps { date: "2024-01-01" })
            .class_names(ClassNameSpec::list(["a", "b"]));
        let container = DomElement::new("tr");

        let mut root = Root::mount(container.clone(), day_cell(props, seen.clone()));
        root.update().unwrap();

        let seen = seen.borrow();
        assert!(Rc::ptr_eq(&seen.class_names[0], &seen.class_names[1]));
        assert_eq!(container.inner_html(), "<td class=\"a b\"><div></div></td>");
    }

    #[test]
    fn class_function_sees_hook_props() {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let props = RenderHookProps::new(CellProps { date: "2024-01-01" }).class_names(
            ClassNameSpec::func(|props: &CellProps| Some(format!("fc-day day-{}", props.date).into())),
        );
        let container = DomElement::new("tr");

        let _root = Root::mount(container.clone(), day_cell(props, seen.clone()));

        assert_eq!(&*seen.borrow().class_names[0], ["fc-day", "day-2024-01-01"]);
    }

    #[test]
    fn injected_content_survives_rerender() {
        let applied = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Seen::default()));
        let props = RenderHookProps::new(CellProps { date: "2024-01-01" })
            .handlers(html_registry(applied.clone()))
            .content(CustomContent::new().with("html", String::from("<em>busy</em>")));
        let container = DomElement::new("tr");

        let mut root = Root::mount(container.clone(), day_cell(props, seen.clone()));
        let cell = container.children()[0].as_element().cloned().unwrap();
        root.update().unwrap();

        assert!(container.children()[0].as_element().unwrap().ptr_eq(&cell));
        assert_eq!(container.inner_html(), "<td><div><em>busy</em></div></td>");
        assert_eq!(applied.get(), 2);
    }

    #[test]
    fn handler_targets_root_without_inner_element() {
        let registry = html_registry(Rc::default());
        let container = DomElement::new("tr");

        let _root = Root::mount(container.clone(), move || {
            let props = RenderHookProps::new(())
                .handlers(registry.clone())
                .content(CustomContent::new().with("html", String::from("<i>all day</i>")));
            use_render_hook(&props, |root_ref, _, _, inner| {
                Node::element("td").node_ref(root_ref).child(inner.into_node()).into()
            })
        });

        assert_eq!(container.inner_html(), "<td><i>all day</i></td>");
    }

    #[test]
    fn lifecycle_and_external_ref() {
        init_tracing();
        let mounts = Rc::new(Cell::new(0));
        let unmounts = Rc::new(RefCell::new(Vec::new()));
        let external = NodeRef::new();
        let seen = Rc::new(RefCell::new(Seen::default()));

        let (m, u) = (mounts.clone(), unmounts.clone());
        let props = RenderHookProps::new(CellProps { date: "2024-01-02" })
            .el_ref(external.clone())
            .did_mount(move |arg| {
                assert_eq!(arg.el.tag(), "td");
                m.set(m.get() + 1);
            })
            .will_unmount(move |arg| {
                u.borrow_mut()
                    .push((arg.props.date, arg.el.parent().is_some()));
            });
        let container = DomElement::new("tr");

        let mut root = Root::mount(container.clone(), day_cell(props, seen));
        root.update().unwrap();
        assert_eq!(mounts.get(), 1);
        assert_eq!(external.get().map(|el| el.tag()).as_deref(), Some("td"));

        root.unmount().unwrap();
        assert_eq!(*unmounts.borrow(), vec![("2024-01-02", true)]);
        assert!(external.get().is_none());
    }
}
