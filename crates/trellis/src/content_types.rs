//! Registry of content-type handlers.
//!
//! A content-type handler renders one kind of custom content (raw HTML,
//! externally built DOM nodes, plugin-defined payloads) straight into a live
//! element. Handlers are registered under a key; a custom-content object that
//! carries that key is routed to the handler. Keys are checked in
//! registration order and the first match wins.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use trellis_core::{DomElement, HookError};

use crate::content::CustomContent;

/// The function that applies a content value to an element.
pub type ApplyFn = Box<dyn Fn(&DomElement, &dyn Any) -> Result<(), HookError>>;

/// Builds an [`ApplyFn`]. Called once per content binding.
pub type HandlerFactory = Rc<dyn Fn() -> ApplyFn>;

#[cfg(feature = "builtin-handlers")]
pub const HTML: &str = "html";

#[cfg(feature = "builtin-handlers")]
pub const DOM_NODES: &str = "domNodes";

/// Ordered, string-keyed handler registry.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    entries: Vec<(String, HandlerFactory)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the `html` and `domNodes` handlers, in that order.
    ///
    /// `html` expects a `String` and replaces the element's children with it as
    /// markup. `domNodes` expects a `Vec<DomNode>` and replaces the element's
    /// children with those nodes.
    #[cfg(feature = "builtin-handlers")]
    pub fn with_builtins() -> Self {
        use trellis_core::DomNode;

        let html = typed_factory::<String, _, _>(HTML, || {
            |el: &DomElement, html: &String| el.set_inner_html(html)
        });
        let dom_nodes = typed_factory::<Vec<DomNode>, _, _>(DOM_NODES, || {
            |el: &DomElement, nodes: &Vec<DomNode>| el.replace_children(nodes.clone())
        });
        Self {
            entries: vec![(HTML.to_string(), html), (DOM_NODES.to_string(), dom_nodes)],
        }
    }

    /// Register a typed handler under `key`.
    ///
    /// `build` runs once per binding and returns the function that applies a
    /// `T` to an element. Values of any other type are rejected with
    /// [`HookError::PayloadType`].
    pub fn register<T, F, A>(&mut self, key: impl Into<String>, build: F) -> Result<(), HookError>
    where
        T: 'static,
        F: Fn() -> A + 'static,
        A: Fn(&DomElement, &T) + 'static,
    {
        let key = key.into();
        if self.contains(&key) {
            return Err(HookError::DuplicateContentKey(key));
        }
        let factory = typed_factory::<T, F, A>(&key, build);
        self.entries.push((key, factory));
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first registered key that `content` carries, with its factory.
    pub fn first_match(&self, content: &CustomContent) -> Option<(&str, &HandlerFactory)> {
        self.entries
            .iter()
            .find(|(key, _)| content.contains_key(key))
            .map(|(key, factory)| (key.as_str(), factory))
    }
}

/// Wrap a typed handler builder into a factory of type-checked apply functions.
fn typed_factory<T, F, A>(key: &str, build: F) -> HandlerFactory
where
    T: 'static,
    F: Fn() -> A + 'static,
    A: Fn(&DomElement, &T) + 'static,
{
    let key = key.to_string();
    Rc::new(move || -> ApplyFn {
        let apply = build();
        let key = key.clone();
        Box::new(move |el: &DomElement, value: &dyn Any| {
            let value = value.downcast_ref::<T>().ok_or_else(|| HookError::PayloadType {
                key: key.clone(),
                expected: std::any::type_name::<T>(),
            })?;
            apply(el, value);
            Ok(())
        })
    })
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
