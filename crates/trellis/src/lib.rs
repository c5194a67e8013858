//! Trellis - render hooks for component libraries.
//!
//! Trellis gives component authors small adapters that wire cross-cutting
//! rendering concerns into any component: callbacks around the root
//! element's lifetime, custom content (raw HTML, externally built DOM nodes,
//! plugin-defined content types) and class names given as a string, a list
//! or a function of props.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::rc::Rc;
//! use trellis::prelude::*;
//!
//! #[derive(Clone, PropsEq)]
//! struct EventProps {
//!     title: String,
//!     is_selected: bool,
//! }
//!
//! fn event(props: EventProps) -> Node {
//!     let hook = RenderHookProps::new(props)
//!         .class_names(ClassNameSpec::func(|p: &EventProps| {
//!             p.is_selected.then(|| "fc-event fc-event-selected".into())
//!         }))
//!         .content(ContentSpec::generator(|p: &EventProps, _| {
//!             Some(CustomContent::new().with(HTML, format!("<b>{}</b>", p.title)).into())
//!         }))
//!         .did_mount(|arg| tracing::debug!(title = %arg.props.title, "event mounted"));
//!
//!     render_hook(hook, |root_ref, class_names, inner_ref, inner| {
//!         Node::element("a")
//!             .node_ref(root_ref)
//!             .classes(class_names.iter())
//!             .child(Node::element("span").node_ref(inner_ref).child(inner.into_node()))
//!             .into()
//!     })
//! }
//!
//! fn main() {
//!     let container = DomElement::new("div");
//!     let root = Root::new(container, || {
//!         event(EventProps { title: "Standup".into(), is_selected: true })
//!     });
//!     root.provide_context(Rc::new(HandlerRegistry::with_builtins()));
//! }
//! ```
//!
//! # Hooks
//!
//! | Hook | Purpose |
//! |------|---------|
//! | [`use_render_hook`] | Mount callbacks, content and class names together |
//! | [`use_mount_hook`] | `did_mount` / `will_unmount` around the root element |
//! | [`use_content_hook`] | Literal or handler-rendered inner content |
//! | [`use_class_names`] | Class names memoized per instance |
//!
//! The building blocks (`Root`, `Node`, `NodeRef`, `use_ref`, ...) live in
//! [`trellis_core`], re-exported as [`core`].

// The derive expands to `::trellis::...` paths.
extern crate self as trellis;

pub mod class_names;
pub mod content;
pub mod content_types;
pub mod mount;
pub mod render_hook;

pub mod prelude {
    //! Common imports for trellis components.
    pub use crate::class_names::{
        ClassNameMemo, ClassNameSpec, normalize_class_names, use_class_names,
    };
    pub use crate::content::{
        Content, ContentHookProps, ContentSpec, CustomContent, InnerContent, use_content_hook,
    };
    pub use crate::content_types::HandlerRegistry;
    #[cfg(feature = "builtin-handlers")]
    pub use crate::content_types::{DOM_NODES, HTML};
    pub use crate::mount::{MountArg, MountHookProps, use_mount_hook};
    pub use crate::render_hook::{RenderHookProps, render_hook, use_render_hook};
    pub use trellis_core::{
        DomElement, DomNode, DomText, HookError, Node, NodeFactory, NodeRef, PropsEq, RenderToken,
        Root, RootOptions, use_commit_effect, use_context, use_ref, use_unmount,
    };
    pub use trellis_macros::PropsEq;
}

// Re-export the adapters at crate root
pub use class_names::{ClassNameMemo, ClassNameSpec, normalize_class_names, use_class_names};
pub use content::{
    Content, ContentHookProps, ContentSpec, CustomContent, InnerContent, use_content_hook,
};
pub use content_types::{ApplyFn, HandlerFactory, HandlerRegistry};
pub use mount::{MountArg, MountCallback, MountHookProps, use_mount_hook};
pub use render_hook::{RenderHookProps, render_hook, use_render_hook};
pub use trellis_core::PropsEq;
pub use trellis_macros::PropsEq;

pub use trellis_core as core;
