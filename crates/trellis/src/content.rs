//! The content hook.
//!
//! A component hands [`use_content_hook`] the content it wants to show inside
//! one of its elements. Plain nodes and strings flow through to the virtual
//! tree. A [`CustomContent`] object whose key is known to the
//! [`HandlerRegistry`] is instead applied to the live element after every
//! commit, and the caller is told to render an empty placeholder in its place.
//!
//! The first registered key found in a content object binds the instance to
//! that key for the rest of its life. Later renders only refresh the value.
//!
//! # Example
//!
//! ```ignore
//! use trellis::prelude::*;
//!
//! fn event_body(title: String) -> Node {
//!     let props = ContentHookProps::new(title)
//!         .content(ContentSpec::generator(|title: &String, _| {
//!             Some(CustomContent::new().with(HTML, format!("<b>{title}</b>")).into())
//!         }));
//!
//!     use_content_hook(&props, |inner_ref, inner| {
//!         Node::element("div").node_ref(inner_ref).child(inner.into_node()).into()
//!     })
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use trellis_core::{
    DomElement, ElementNode, Node, NodeFactory, NodeRef, use_commit_effect, use_context, use_ref,
};

use crate::content_types::{ApplyFn, HandlerRegistry};

/// Content as resolved for one render.
#[derive(Clone, Debug)]
pub enum Content {
    /// A node that already belongs to the virtual tree.
    Node(Node),
    /// Text, rendered as a text node.
    Text(String),
    /// Values keyed by content type, applied by a registered handler.
    Custom(CustomContent),
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Content::Node(node)
    }
}

impl From<ElementNode> for Content {
    fn from(el: ElementNode) -> Self {
        Content::Node(el.into())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<CustomContent> for Content {
    fn from(custom: CustomContent) -> Self {
        Content::Custom(custom)
    }
}

/// An ordered map from content-type key to an arbitrary value.
#[derive(Clone, Default)]
pub struct CustomContent {
    fields: Vec<(String, Rc<dyn Any>)>,
}

impl CustomContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CustomContent::insert`].
    pub fn with<T: 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value`, replacing an earlier value in place.
    pub fn insert<T: 'static>(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        let value: Rc<dyn Any> = Rc::new(value);
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Rc<dyn Any>> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| Rc::clone(value))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(existing, _)| existing == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for CustomContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomContent")
            .field(&self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Content as a component author declares it.
pub enum ContentSpec<P> {
    /// The same content on every render.
    Literal(Content),
    /// Content computed from the hook props on every render. `None` means
    /// nothing was specified.
    Generator(Rc<dyn Fn(&P, &NodeFactory) -> Option<Content>>),
}

impl<P> ContentSpec<P> {
    pub fn literal(content: impl Into<Content>) -> Self {
        ContentSpec::Literal(content.into())
    }

    pub fn generator(f: impl Fn(&P, &NodeFactory) -> Option<Content> + 'static) -> Self {
        ContentSpec::Generator(Rc::new(f))
    }

    /// Resolve the spec for one render.
    pub fn resolve(&self, props: &P) -> Option<Content> {
        match self {
            ContentSpec::Literal(content) => Some(content.clone()),
            ContentSpec::Generator(generate) => generate(props, &NodeFactory),
        }
    }
}

impl<P> Clone for ContentSpec<P> {
    fn clone(&self) -> Self {
        match self {
            ContentSpec::Literal(content) => ContentSpec::Literal(content.clone()),
            ContentSpec::Generator(generate) => ContentSpec::Generator(Rc::clone(generate)),
        }
    }
}

impl<P> fmt::Debug for ContentSpec<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSpec::Literal(content) => f.debug_tuple("Literal").field(content).finish(),
            ContentSpec::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// What the content hook reports to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum InnerContent {
    /// Neither content nor default content was specified.
    Nothing,
    /// Content is specified but a handler renders it into the element.
    Placeholder,
    /// A node to place in the tree.
    Node(Node),
}

impl InnerContent {
    pub fn is_specified(&self) -> bool {
        !matches!(self, InnerContent::Nothing)
    }

    /// The node to place in the tree. `Nothing` and `Placeholder` both render
    /// as the empty fragment.
    pub fn into_node(self) -> Node {
        match self {
            InnerContent::Node(node) => node,
            InnerContent::Nothing | InnerContent::Placeholder => Node::empty(),
        }
    }
}

/// Props for [`use_content_hook`].
pub struct ContentHookProps<P> {
    pub hook_props: P,
    pub content: Option<ContentSpec<P>>,
    pub default_content: Option<ContentSpec<P>>,
    /// Element to apply custom content to when the inner ref is unset.
    pub backup_el_ref: Option<NodeRef>,
    /// Handlers to match custom content against. Falls back to an
    /// `Rc<HandlerRegistry>` provided to the root.
    pub handlers: Option<Rc<HandlerRegistry>>,
}

impl<P> ContentHookProps<P> {
    pub fn new(hook_props: P) -> Self {
        Self {
            hook_props,
            content: None,
            default_content: None,
            backup_el_ref: None,
            handlers: None,
        }
    }

    pub fn content(mut self, content: impl Into<ContentSpec<P>>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn default_content(mut self, content: impl Into<ContentSpec<P>>) -> Self {
        self.default_content = Some(content.into());
        self
    }

    pub fn backup_el_ref(mut self, node_ref: NodeRef) -> Self {
        self.backup_el_ref = Some(node_ref);
        self
    }

    pub fn handlers(mut self, handlers: Rc<HandlerRegistry>) -> Self {
        self.handlers = Some(handlers);
        self
    }
}

impl<P: Default> Default for ContentHookProps<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P> From<Content> for ContentSpec<P> {
    fn from(content: Content) -> Self {
        ContentSpec::Literal(content)
    }
}

impl<P> From<&str> for ContentSpec<P> {
    fn from(text: &str) -> Self {
        ContentSpec::literal(text)
    }
}

impl<P> From<String> for ContentSpec<P> {
    fn from(text: String) -> Self {
        ContentSpec::literal(text)
    }
}

impl<P> From<Node> for ContentSpec<P> {
    fn from(node: Node) -> Self {
        ContentSpec::literal(node)
    }
}

impl<P> From<CustomContent> for ContentSpec<P> {
    fn from(custom: CustomContent) -> Self {
        ContentSpec::literal(custom)
    }
}

/// A content-type key bound to one hook instance.
struct ContentBinding {
    key: String,
    /// The field under `key` in the latest render's content, if it had one.
    value: Option<Rc<dyn Any>>,
    apply: ApplyFn,
}

impl ContentBinding {
    fn bind(registry: &HandlerRegistry, content: &CustomContent) -> Option<Self> {
        let (key, factory) = registry.first_match(content)?;
        let value = content.get(key)?;
        Some(Self {
            key: key.to_string(),
            value: Some(value),
            apply: factory(),
        })
    }

    /// Take the value under the bound key from the latest render's content.
    fn refresh(&mut self, content: &Content) {
        self.value = match content {
            Content::Custom(custom) => custom.get(&self.key),
            Content::Node(_) | Content::Text(_) => None,
        };
    }

    fn apply_to(&self, el: &DomElement) {
        let Some(value) = &self.value else {
            tracing::debug!(key = %self.key, "bound key missing from content, skipping handler");
            return;
        };
        if let Err(err) = (self.apply)(el, &**value) {
            tracing::error!(key = %self.key, error = %err, "content handler failed");
        }
    }
}

#[derive(Default)]
struct ContentState {
    binding: Option<ContentBinding>,
    /// Whether the last render resolved any content.
    active: bool,
}

impl ContentState {
    fn resolve(&mut self, content: Content, registry: Option<&HandlerRegistry>) -> InnerContent {
        if let Some(binding) = self.binding.as_mut() {
            binding.refresh(&content);
            return InnerContent::Placeholder;
        }

        match content {
            Content::Node(node) => InnerContent::Node(node),
            Content::Text(text) => InnerContent::Node(Node::Text(text)),
            Content::Custom(custom) => {
                match registry.and_then(|registry| ContentBinding::bind(registry, &custom)) {
                    Some(binding) => {
                        tracing::trace!(key = %binding.key, "bound custom content");
                        self.binding = Some(binding);
                        InnerContent::Placeholder
                    }
                    None => {
                        tracing::debug!(
                            keys = ?custom.keys().collect::<Vec<_>>(),
                            "custom content has no registered handler, rendering nothing"
                        );
                        InnerContent::Node(Node::empty())
                    }
                }
            }
        }
    }

    fn commit(&self, inner_ref: &NodeRef, backup_ref: Option<&NodeRef>) {
        if !self.active {
            return;
        }
        let Some(binding) = &self.binding else {
            return;
        };
        match inner_ref.get().or_else(|| backup_ref.and_then(NodeRef::get)) {
            Some(el) => binding.apply_to(&el),
            None => tracing::debug!(key = %binding.key, "no element to apply custom content to"),
        }
    }
}

/// Resolve content for the current render and apply bound custom content
/// after commit.
///
/// `children` receives the inner-element ref, which should be attached to the
/// element that hosts the content, and the [`InnerContent`] to place inside
/// it.
pub fn use_content_hook<P, R>(
    props: &ContentHookProps<P>,
    children: impl FnOnce(NodeRef, InnerContent) -> R,
) -> R
where
    P: 'static,
{
    let inner_ref = use_ref(NodeRef::new).get();
    let state = use_ref(ContentState::default);
    let registry = props
        .handlers
        .clone()
        .or_else(use_context::<Rc<HandlerRegistry>>);

    let resolved = props
        .content
        .as_ref()
        .and_then(|spec| spec.resolve(&props.hook_props))
        .or_else(|| {
            props
                .default_content
                .as_ref()
                .and_then(|spec| spec.resolve(&props.hook_props))
        });

    let inner = {
        let mut state = state.borrow_mut();
        match resolved {
            Some(content) => {
                state.active = true;
                state.resolve(content, registry.as_deref())
            }
            None => {
                state.active = false;
                InnerContent::Nothing
            }
        }
    };

    let (target, backup) = (inner_ref.clone(), props.backup_el_ref.clone());
    let committed = state.clone();
    use_commit_effect(move || committed.borrow().commit(&target, backup.as_ref()));

    children(inner_ref, inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use trellis_core::{DomElement, Root};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    /// A registry whose `html` handler counts how often it applies.
    fn counting_registry(applied: Rc<Cell<u32>>) -> Rc<HandlerRegistry> {
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
        registry
            .register::<String, _, _>("title", || {
                |el: &DomElement, title: &String| el.set_attr("title", title.as_str())
            })
            .unwrap();
        Rc::new(registry)
    }

    /// Mount a `div` hosting the content hook and record what it reports.
    fn mount_content(
        props: impl Fn() -> ContentHookProps<u32> + 'static,
        seen: Rc<RefCell<Vec<InnerContent>>>,
    ) -> (Root, DomElement) {
        let container = DomElement::new("section");
        let root = Root::mount(container.clone(), move || {
            let seen = seen.clone();
            use_content_hook(&props(), move |inner_ref, inner| {
                seen.borrow_mut().push(inner.clone());
                Node::element("div").node_ref(inner_ref).child(inner.into_node()).into()
            })
        });
        (root, container)
    }

    #[test]
    fn custom_content_keeps_insertion_order() {
        let mut content = CustomContent::new().with("b", 1u8).with("a", 2u8);
        content.insert("b", 3u8);
        assert_eq!(content.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(content.get("b").unwrap().downcast_ref::<u8>(), Some(&3));
        assert!(content.get("c").is_none());
    }

    #[test]
    fn default_is_used_only_when_content_is_none() {
        init_tracing();
        let defaults = Rc::new(Cell::new(0));
        let counter = defaults.clone();
        let default_content = ContentSpec::generator(move |_: &u32, _| {
            counter.set(counter.get() + 1);
            Some("fallback".into())
        });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let spec = default_content.clone();
        let (_root, container) = mount_content(
            move || {
                ContentHookProps::new(0)
                    .content("")
                    .default_content(spec.clone())
            },
            seen.clone(),
        );
        assert_eq!(defaults.get(), 0);
        assert_eq!(seen.borrow()[0], InnerContent::Node(Node::text("")));
        assert_eq!(container.inner_html(), "<div></div>");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let (_root, container) = mount_content(
            move || {
                ContentHookProps::new(0)
                    .content(ContentSpec::generator(|_: &u32, _| None))
                    .default_content(default_content.clone())
            },
            seen.clone(),
        );
        assert_eq!(defaults.get(), 1);
        assert_eq!(seen.borrow()[0], InnerContent::Node(Node::text("fallback")));
        assert_eq!(container.inner_html(), "<div>fallback</div>");
    }

    #[test]
    fn nothing_specified_reports_nothing() {
        let applied = Rc::new(Cell::new(0));
        let registry = counting_registry(applied.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (_root, container) = mount_content(
            move || ContentHookProps::new(0).handlers(registry.clone()),
            seen.clone(),
        );
        assert_eq!(seen.borrow()[0], InnerContent::Nothing);
        assert!(!seen.borrow()[0].is_specified());
        assert_eq!(container.inner_html(), "<div></div>");
        assert_eq!(applied.get(), 0);
    }

    #[test]
    fn custom_content_is_applied_after_commit() {
        init_tracing();
        let applied = Rc::new(Cell::new(0));
        let registry = counting_registry(applied.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (mut root, container) = mount_content(
            move || {
                ContentHookProps::new(0)
                    .handlers(registry.clone())
                    .content(ContentSpec::generator(|_: &u32, _| {
                        Some(CustomContent::new().with("html", String::from("<b>x</b>")).into())
                    }))
            },
            seen.clone(),
        );
        assert_eq!(container.inner_html(), "<div><b>x</b></div>");
        assert_eq!(seen.borrow()[0], InnerContent::Placeholder);
        assert_eq!(applied.get(), 1);

        root.update().unwrap();
        assert_eq!(container.inner_html(), "<div><b>x</b></div>");
        assert_eq!(applied.get(), 2);
    }

    #[test]
    fn binding_sticks_to_first_matched_key() {
        let applied = Rc::new(Cell::new(0));
        let registry = counting_registry(applied.clone());
        let render = Rc::new(Cell::new(0u32));

        let (count, handlers) = (render.clone(), registry.clone());
        let (mut root, container) = mount_content(
            move || {
                let n = count.get();
                count.set(n + 1);
                let content = match n {
                    0 => CustomContent::new().with("html", String::from("<i>first</i>")),
                    1 => CustomContent::new().with("title", String::from("ignored")),
                    _ => CustomContent::new()
                        .with("title", String::from("still ignored"))
                        .with("html", String::from("<i>third</i>")),
                };
                ContentHookProps::new(n)
                    .handlers(handlers.clone())
                    .content(content)
            },
            Rc::default(),
        );
        assert_eq!(container.inner_html(), "<div><i>first</i></div>");
        assert_eq!(applied.get(), 1);

        // `title` has a handler too, but the binding stays on `html`, which
        // this render lacks.
        root.update().unwrap();
        assert_eq!(applied.get(), 1);
        assert!(container.children()[0].as_element().unwrap().attr("title").is_none());

        root.update().unwrap();
        assert_eq!(container.inner_html(), "<div><i>third</i></div>");
        assert_eq!(applied.get(), 2);
    }

    #[test]
    fn bound_content_resumes_after_unspecified_render() {
        init_tracing();
        let applied = Rc::new(Cell::new(0));
        let registry = counting_registry(applied.clone());
        let render = Rc::new(Cell::new(0u32));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (count, handlers) = (render.clone(), registry.clone());
        let (mut root, container) = mount_content(
            move || {
                let n = count.get();
                count.set(n + 1);
                ContentHookProps::new(n)
                    .handlers(handlers.clone())
                    .content(ContentSpec::generator(|n: &u32, _| {
                        (*n != 1).then(|| {
                            CustomContent::new()
                                .with("html", format!("<i>{n}</i>"))
                                .into()
                        })
                    }))
            },
            seen.clone(),
        );
        assert_eq!(applied.get(), 1);

        root.update().unwrap();
        assert_eq!(seen.borrow()[1], InnerContent::Nothing);
        assert_eq!(applied.get(), 1);

        root.update().unwrap();
        assert_eq!(seen.borrow()[2], InnerContent::Placeholder);
        assert_eq!(container.inner_html(), "<div><i>2</i></div>");
        assert_eq!(applied.get(), 2);
    }

    #[test]
    fn literal_content_after_binding_skips_handler() {
        let applied = Rc::new(Cell::new(0));
        let registry = counting_registry(applied.clone());
        let render = Rc::new(Cell::new(0u32));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (count, handlers) = (render.clone(), registry.clone());
        let (mut root, _container) = mount_content(
            move || {
                let n = count.get();
                count.set(n + 1);
                let props = ContentHookProps::new(n).handlers(handlers.clone());
                if n == 0 {
                    props.content(CustomContent::new().with("html", String::from("<b>x</b>")))
                } else {
                    props.content("plain")
                }
            },
            seen.clone(),
        );
        assert_eq!(applied.get(), 1);

        root.update().unwrap();
        assert_eq!(seen.borrow()[1], InnerContent::Placeholder);
        assert_eq!(applied.get(), 1);
    }

    #[test]
    fn backup_ref_is_used_when_inner_ref_is_unattached() {
        let registry = counting_registry(Rc::default());
        let backup = NodeRef::new();
        let container = DomElement::new("section");

        let target = backup.clone();
        let _root = Root::mount(container.clone(), move || {
            let props = ContentHookProps::new(())
                .handlers(registry.clone())
                .backup_el_ref(target.clone())
                .content(CustomContent::new().with("title", String::from("Standup")));
            use_content_hook(&props, |_, inner| {
                Node::element("td")
                    .node_ref(target.clone())
                    .child(inner.into_node())
                    .into()
            })
        });

        assert_eq!(container.inner_html(), "<td title=\"Standup\"></td>");
    }

    #[test]
    fn registry_is_read_from_context() {
        let applied = Rc::new(Cell::new(0));
        let container = DomElement::new("section");
        let mut root = Root::new(container.clone(), || {
            let props = ContentHookProps::new(())
                .content(CustomContent::new().with("html", String::from("ctx")));
            use_content_hook(&props, |inner_ref, inner| {
                Node::element("p").node_ref(inner_ref).child(inner.into_node()).into()
            })
        });
        root.provide_context(counting_registry(applied.clone()));
        root.render();

        assert_eq!(container.inner_html(), "<p>ctx</p>");
        assert_eq!(applied.get(), 1);
    }

    #[test]
    fn unregistered_custom_content_renders_empty() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let registry = counting_registry(Rc::default());
        let (_root, container) = mount_content(
            move || {
                ContentHookProps::new(0)
                    .handlers(registry.clone())
                    .content(CustomContent::new().with("markdown", String::from("*x*")))
            },
            seen.clone(),
        );
        assert_eq!(seen.borrow()[0], InnerContent::Node(Node::empty()));
        assert_eq!(container.inner_html(), "<div></div>");
    }

    #[test]
    fn wrong_payload_type_is_logged_not_raised() {
        init_tracing();
        let registry = counting_registry(Rc::default());
        let (_root, container) = mount_content(
            move || {
                ContentHookProps::new(0)
                    .handlers(registry.clone())
                    .content(CustomContent::new().with("html", 7u32))
            },
            Rc::default(),
        );
        assert_eq!(container.inner_html(), "<div></div>");
    }
}
