//! Core types for trellis: virtual nodes, the DOM-like tree, ref slots, hook
//! scopes and the renderer the render hooks are built on.

pub mod dom;
pub mod error;
pub mod hooks;
pub mod node;
pub mod node_ref;
pub mod props;
pub mod root;
pub mod token;

pub use dom::{DomElement, DomNode, DomText, html_escape_string};
pub use error::HookError;
pub use node::{ComponentNode, ElementNode, Node, NodeFactory};
pub use node_ref::NodeRef;
pub use props::PropsEq;
pub use root::{Root, RootOptions};
pub use token::RenderToken;

// Re-export hooks for component authors
pub use hooks::{
    HookScope, RefHandle, render_in_scope, use_commit_effect, use_context, use_ref, use_unmount,
};
