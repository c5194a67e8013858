//! Class-name specs and their normalization.

use std::fmt;
use std::rc::Rc;

use trellis_core::{PropsEq, use_ref};

/// Class names as a component author declares them.
pub enum ClassNameSpec<P> {
    /// Space-separated class names.
    Str(String),
    /// Class names used as-is.
    List(Rc<[String]>),
    /// Computed from the hook props; `None` means no classes.
    Func(Rc<dyn Fn(&P) -> Option<ClassNameSpec<P>>>),
}

impl<P> ClassNameSpec<P> {
    pub fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClassNameSpec::List(names.into_iter().map(Into::into).collect())
    }

    pub fn func(f: impl Fn(&P) -> Option<ClassNameSpec<P>> + 'static) -> Self {
        ClassNameSpec::Func(Rc::new(f))
    }

    /// Whether `other` is the same spec: same allocation for lists and
    /// functions, same text for strings.
    pub fn same_spec(&self, other: &Self) -> bool {
        match (self, other) {
            (ClassNameSpec::Str(a), ClassNameSpec::Str(b)) => a == b,
            (ClassNameSpec::List(a), ClassNameSpec::List(b)) => Rc::ptr_eq(a, b),
            (ClassNameSpec::Func(a), ClassNameSpec::Func(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<P> Clone for ClassNameSpec<P> {
    fn clone(&self) -> Self {
        match self {
            ClassNameSpec::Str(s) => ClassNameSpec::Str(s.clone()),
            ClassNameSpec::List(list) => ClassNameSpec::List(Rc::clone(list)),
            ClassNameSpec::Func(f) => ClassNameSpec::Func(Rc::clone(f)),
        }
    }
}

impl<P> fmt::Debug for ClassNameSpec<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassNameSpec::Str(s) => f.debug_tuple("Str").field(s).finish(),
            ClassNameSpec::List(list) => f.debug_tuple("List").field(list).finish(),
            ClassNameSpec::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl<P> From<&str> for ClassNameSpec<P> {
    fn from(s: &str) -> Self {
        ClassNameSpec::Str(s.to_string())
    }
}

impl<P> From<String> for ClassNameSpec<P> {
    fn from(s: String) -> Self {
        ClassNameSpec::Str(s)
    }
}

impl<P> From<Vec<String>> for ClassNameSpec<P> {
    fn from(names: Vec<String>) -> Self {
        ClassNameSpec::List(names.into())
    }
}

impl<P> From<Rc<[String]>> for ClassNameSpec<P> {
    fn from(names: Rc<[String]>) -> Self {
        ClassNameSpec::List(names)
    }
}

/// Turn a spec into an ordered list of class names.
///
/// A missing spec yields an empty list. A string is split on single spaces,
/// so `""` yields one empty name. A list is returned as-is (the same allocation).
/// A function is called with `props` and its result normalized in turn.
pub fn normalize_class_names<P>(spec: Option<&ClassNameSpec<P>>, props: &P) -> Rc<[String]> {
    match spec {
        None => Rc::from(Vec::new()),
        Some(ClassNameSpec::Str(s)) => s
            .split(' ')
            .map(str::to_string)
            .collect(),
        Some(ClassNameSpec::List(list)) => Rc::clone(list),
        Some(ClassNameSpec::Func(f)) => normalize_class_names(f(props).as_ref(), props),
    }
}

/// A normalizer that remembers its last input and output.
///
/// [`ClassNameMemo::get`] recomputes only when the spec is not the
/// [same spec](ClassNameSpec::same_spec) as last time or the props are not
/// [`PropsEq`]-equal to the last props; otherwise it hands back the identical
/// list.
pub struct ClassNameMemo<P> {
    last: Option<MemoEntry<P>>,
}

struct MemoEntry<P> {
    spec: Option<ClassNameSpec<P>>,
    props: P,
    names: Rc<[String]>,
}

impl<P: PropsEq + Clone> ClassNameMemo<P> {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn get(&mut self, spec: Option<&ClassNameSpec<P>>, props: &P) -> Rc<[String]> {
        if let Some(last) = &self.last {
            let same_spec = match (&last.spec, spec) {
                (Some(a), Some(b)) => a.same_spec(b),
                (None, None) => true,
                _ => false,
            };
            if same_spec && last.props.props_eq(props) {
                return Rc::clone(&last.names);
            }
        }

        let names = normalize_class_names(spec, props);
        self.last = Some(MemoEntry {
            spec: spec.cloned(),
            props: props.clone(),
            names: Rc::clone(&names),
        });
        names
    }
}

impl<P: PropsEq + Clone> Default for ClassNameMemo<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoized class names for the current component instance.
pub fn use_class_names<P>(spec: Option<&ClassNameSpec<P>>, props: &P) -> Rc<[String]>
where
    P: PropsEq + Clone + 'static,
{
    let memo = use_ref(ClassNameMemo::<P>::new);
    memo.borrow_mut().get(spec, props)
}
