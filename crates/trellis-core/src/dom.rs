//! A small DOM-like element tree.
//!
//! The renderer in [`crate::root`] builds these nodes from virtual
//! [`Node`](crate::node::Node)s, and content handlers mutate them directly
//! after commit. Handles are reference counted; cloning a [`DomElement`]
//! yields another handle to the same element.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type ParentLink = Weak<RefCell<ElementData>>;

struct ElementData {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    children: Vec<DomNode>,
    parent: ParentLink,
}

struct TextData {
    content: String,
    /// Markup text is serialized verbatim instead of escaped.
    markup: bool,
    parent: ParentLink,
}

/// Escape HTML special characters in a string.
pub fn html_escape_string(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Handle to an element in the DOM-like tree.
#[derive(Clone)]
pub struct DomElement {
    inner: Rc<RefCell<ElementData>>,
}

/// Handle to a text node in the DOM-like tree.
#[derive(Clone)]
pub struct DomText {
    inner: Rc<RefCell<TextData>>,
}

/// Any node that can live in an element's child list.
#[derive(Clone, PartialEq, Eq)]
pub enum DomNode {
    Element(DomElement),
    Text(DomText),
}

impl DomElement {
    /// Create a detached element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ElementData {
                tag: tag.into(),
                classes: Vec::new(),
                attrs: Vec::new(),
                children: Vec::new(),
                parent: Weak::new(),
            })),
        }
    }

    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    pub fn set_class_list(&self, classes: &[String]) {
        let mut data = self.inner.borrow_mut();
        if data.classes != classes {
            data.classes = classes.to_vec();
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let mut data = self.inner.borrow_mut();
        match data.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => data.attrs.push((name, value)),
        }
    }

    /// Replace the whole attribute list.
    pub fn set_attrs(&self, attrs: &[(String, String)]) {
        let mut data = self.inner.borrow_mut();
        if data.attrs != attrs {
            data.attrs = attrs.to_vec();
        }
    }

    /// The element this one is attached to, if any.
    pub fn parent(&self) -> Option<DomElement> {
        self.inner
            .borrow()
            .parent
            .upgrade()
            .map(|inner| DomElement { inner })
    }

    pub fn children(&self) -> Vec<DomNode> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Append a node, detaching it from its previous parent first.
    pub fn append_child(&self, node: DomNode) {
        node.detach();
        node.set_parent(Rc::downgrade(&self.inner));
        self.inner.borrow_mut().children.push(node);
    }

    /// Insert `node` right after `anchor`, or at the front when there is no
    /// anchor. An anchor that is not a child of this element appends.
    pub fn insert_after(&self, anchor: Option<&DomNode>, node: DomNode) {
        node.detach();
        node.set_parent(Rc::downgrade(&self.inner));
        let mut data = self.inner.borrow_mut();
        let index = match anchor {
            None => 0,
            Some(anchor) => data
                .children
                .iter()
                .position(|child| child == anchor)
                .map_or(data.children.len(), |i| i + 1),
        };
        data.children.insert(index, node);
    }

    /// Remove a direct child. Returns `false` if `node` was not a child.
    pub fn remove_child(&self, node: &DomNode) -> bool {
        let removed = {
            let mut data = self.inner.borrow_mut();
            data.children
                .iter()
                .position(|child| child == node)
                .map(|index| data.children.remove(index))
        };
        match removed {
            Some(child) => {
                child.set_parent(Weak::new());
                true
            }
            None => false,
        }
    }

    /// Drop all children and append `nodes` in order.
    pub fn replace_children(&self, nodes: Vec<DomNode>) {
        let old = std::mem::take(&mut self.inner.borrow_mut().children);
        for child in old {
            child.set_parent(Weak::new());
        }
        for node in nodes {
            self.append_child(node);
        }
    }

    /// Replace the children with a single verbatim markup node.
    pub fn set_inner_html(&self, markup: &str) {
        if markup.is_empty() {
            self.replace_children(Vec::new());
        } else {
            self.replace_children(vec![DomNode::Text(DomText::markup(markup))]);
        }
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.inner.borrow().children.iter() {
            child.write_html(&mut out);
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in self.inner.borrow().children.iter() {
            match child {
                DomNode::Element(el) => out.push_str(&el.text_content()),
                DomNode::Text(text) => out.push_str(&text.inner.borrow().content),
            }
        }
        out
    }

    pub fn ptr_eq(&self, other: &DomElement) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn write_html(&self, out: &mut String) {
        let data = self.inner.borrow();
        out.push('<');
        out.push_str(&data.tag);
        if !data.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&html_escape_string(&data.classes.join(" ")));
            out.push('"');
        }
        for (key, value) in &data.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&html_escape_string(value));
            out.push('"');
        }
        out.push('>');
        for child in &data.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&data.tag);
        out.push('>');
    }
}

impl PartialEq for DomElement {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for DomElement {}

impl fmt::Debug for DomElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("DomElement")
            .field("tag", &data.tag)
            .field("classes", &data.classes)
            .field("children", &data.children.len())
            .finish()
    }
}

impl DomText {
    /// Create a detached text node; its content is escaped when serialized.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_kind(content.into(), false)
    }

    /// Create a detached node holding raw markup.
    fn markup(content: impl Into<String>) -> Self {
        Self::with_kind(content.into(), true)
    }

    fn with_kind(content: String, markup: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TextData {
                content,
                markup,
                parent: Weak::new(),
            })),
        }
    }

    pub fn content(&self) -> String {
        self.inner.borrow().content.clone()
    }

    pub fn set_content(&self, content: &str) {
        let mut data = self.inner.borrow_mut();
        if data.content != content {
            data.content = content.to_string();
        }
    }

    pub fn ptr_eq(&self, other: &DomText) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for DomText {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for DomText {}

impl fmt::Debug for DomText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DomText")
            .field(&self.inner.borrow().content)
            .finish()
    }
}

impl DomNode {
    pub fn parent(&self) -> Option<DomElement> {
        let link = match self {
            DomNode::Element(el) => el.inner.borrow().parent.clone(),
            DomNode::Text(text) => text.inner.borrow().parent.clone(),
        };
        link.upgrade().map(|inner| DomElement { inner })
    }

    /// Remove this node from its parent, if it has one.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    pub fn as_element(&self) -> Option<&DomElement> {
        match self {
            DomNode::Element(el) => Some(el),
            DomNode::Text(_) => None,
        }
    }

    fn set_parent(&self, parent: ParentLink) {
        match self {
            DomNode::Element(el) => el.inner.borrow_mut().parent = parent,
            DomNode::Text(text) => text.inner.borrow_mut().parent = parent,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            DomNode::Element(el) => el.write_html(out),
            DomNode::Text(text) => {
                let data = text.inner.borrow();
                if data.markup {
                    out.push_str(&data.content);
                } else {
                    out.push_str(&html_escape_string(&data.content));
                }
            }
        }
    }
}

impl fmt::Debug for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomNode::Element(el) => el.fmt(f),
            DomNode::Text(text) => text.fmt(f),
        }
    }
}

impl From<DomElement> for DomNode {
    fn from(el: DomElement) -> Self {
        DomNode::Element(el)
    }
}

impl From<DomText> for DomNode {
    fn from(text: DomText) -> Self {
        DomNode::Text(text)
    }
}
