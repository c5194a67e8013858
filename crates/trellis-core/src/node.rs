//! Virtual node types.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use crate::node_ref::NodeRef;

/// A node in the virtual tree.
#[derive(Clone, PartialEq)]
pub enum Node {
    /// A DOM-like element.
    Element(ElementNode),
    /// A text node; escaped when serialized.
    Text(String),
    /// Zero or more siblings without a wrapper. The empty fragment renders
    /// nothing but still occupies a slot.
    Fragment(Vec<Node>),
    /// A function component with its own hook state.
    Component(ComponentNode),
}

impl Node {
    pub fn element(tag: impl Into<String>) -> ElementNode {
        ElementNode::new(tag)
    }

    pub fn text(text: impl Into<String>) -> Node {
        Node::Text(text.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Node {
        Node::Fragment(children.into_iter().collect())
    }

    /// The empty fragment.
    pub fn empty() -> Node {
        Node::Fragment(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Fragment(children) if children.is_empty())
    }

    /// Wrap a render function as a component.
    ///
    /// Instances are matched across renders by position and by the type of
    /// `render`, so every call site gets its own component type.
    pub fn component<F>(render: F) -> Node
    where
        F: Fn() -> Node + 'static,
    {
        Node::Component(ComponentNode {
            type_id: TypeId::of::<F>(),
            name: std::any::type_name::<F>(),
            render: Rc::new(render),
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(el) => el.fmt(f),
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            Node::Component(component) => component.fmt(f),
        }
    }
}

impl From<ElementNode> for Node {
    fn from(el: ElementNode) -> Self {
        Node::Element(el)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

/// A virtual element with classes, attributes, an optional ref and children.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub node_ref: Option<NodeRef>,
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Vec::new(),
            node_ref: None,
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes.extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Attach a ref that the renderer fills with the live element.
    pub fn node_ref(mut self, node_ref: NodeRef) -> Self {
        self.node_ref = Some(node_ref);
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn into_node(self) -> Node {
        Node::Element(self)
    }
}

/// A function component as it appears in the virtual tree.
#[derive(Clone)]
pub struct ComponentNode {
    pub(crate) type_id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) render: Rc<dyn Fn() -> Node>,
}

impl ComponentNode {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentNode {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for ComponentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

/// The node-construction primitive handed to content generators.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFactory;

impl NodeFactory {
    pub fn element(&self, tag: impl Into<String>) -> ElementNode {
        ElementNode::new(tag)
    }

    pub fn text(&self, text: impl Into<String>) -> Node {
        Node::text(text)
    }

    pub fn fragment(&self, children: impl IntoIterator<Item = Node>) -> Node {
        Node::fragment(children)
    }
}
