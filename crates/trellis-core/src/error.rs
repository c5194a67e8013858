//! Error type shared by the trellis crates.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A content handler received a value of another type than it was
    /// registered for.
    #[error("content handler `{key}` expected a `{expected}` payload")]
    PayloadType { key: String, expected: &'static str },

    #[error("content type `{0}` is already registered")]
    DuplicateContentKey(String),

    #[error("root is not mounted")]
    NotMounted,
}
