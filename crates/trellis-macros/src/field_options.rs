//! Options accepted by the `#[props(...)]` field attribute.
//!
//! Keeping them in one table lets unknown options get a suggestion and the
//! full list in the error message.

/// How a single field takes part in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Compare with `PropsEq` (the default).
    Props,
    /// Compare with `PartialEq`, for fields whose `PropsEq` impl is shallow.
    ByValue,
    /// Leave the field out of the comparison.
    Skip,
}

/// A field option and the mode it selects.
#[derive(Debug, Clone, Copy)]
pub struct FieldOption {
    pub name: &'static str,
    pub mode: FieldMode,
}

impl FieldOption {
    const fn new(name: &'static str, mode: FieldMode) -> Self {
        Self { name, mode }
    }
}

static FIELD_OPTIONS: &[FieldOption] = &[
    FieldOption::new("skip", FieldMode::Skip),
    FieldOption::new("by_value", FieldMode::ByValue),
];

/// Look up an option by name.
pub fn find_option(name: &str) -> Option<FieldOption> {
    FIELD_OPTIONS.iter().copied().find(|option| option.name == name)
}

/// Get all valid option names.
pub fn option_names() -> Vec<&'static str> {
    FIELD_OPTIONS.iter().map(|option| option.name).collect()
}
