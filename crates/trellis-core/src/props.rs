//! Prop comparison used to decide whether derived values are stale.
//!
//! [`PropsEq`] is shallow at reference-counted boundaries: two `Rc`s are equal
//! only if they point at the same allocation, so callbacks and shared objects
//! compare by identity. Plain values compare by value. Derive it for prop
//! structs with `#[derive(PropsEq)]` from the `trellis` crate.

use std::rc::Rc;

use crate::dom::DomElement;
use crate::node_ref::NodeRef;

pub trait PropsEq {
    fn props_eq(&self, other: &Self) -> bool;
}

macro_rules! props_eq_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PropsEq for $ty {
                fn props_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

props_eq_by_value!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    str,
    String,
);

impl<T: ?Sized> PropsEq for Rc<T> {
    fn props_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: PropsEq + ?Sized> PropsEq for &T {
    fn props_eq(&self, other: &Self) -> bool {
        (**self).props_eq(*other)
    }
}

impl<T: PropsEq + ?Sized> PropsEq for Box<T> {
    fn props_eq(&self, other: &Self) -> bool {
        (**self).props_eq(other)
    }
}

impl<T: PropsEq> PropsEq for Option<T> {
    fn props_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.props_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: PropsEq> PropsEq for [T] {
    fn props_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.props_eq(b))
    }
}

impl<T: PropsEq> PropsEq for Vec<T> {
    fn props_eq(&self, other: &Self) -> bool {
        self.as_slice().props_eq(other.as_slice())
    }
}

impl<A: PropsEq, B: PropsEq> PropsEq for (A, B) {
    fn props_eq(&self, other: &Self) -> bool {
        self.0.props_eq(&other.0) && self.1.props_eq(&other.1)
    }
}

impl<A: PropsEq, B: PropsEq, C: PropsEq> PropsEq for (A, B, C) {
    fn props_eq(&self, other: &Self) -> bool {
        self.0.props_eq(&other.0) && self.1.props_eq(&other.1) && self.2.props_eq(&other.2)
    }
}

impl PropsEq for DomElement {
    fn props_eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl PropsEq for NodeRef {
    fn props_eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
