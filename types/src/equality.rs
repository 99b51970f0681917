//! Structural equality for call deduplication.
//!
//! Two calls are merged into one ledger entry when their argument lists are
//! structurally equal: same shape, same primitive values, compared
//! recursively. This is deliberately separate from `PartialEq` so the rules
//! are pinned down here rather than inherited from whatever a type derives:
//!
//! - floats are equal when `==` holds or when both are NaN, so `0.0` equals
//!   `-0.0` and `NaN` equals `NaN`;
//! - ordered sequences compare element-wise and must have equal length;
//! - maps and sets compare by membership, ignoring iteration order;
//! - JSON numbers compare by numeric value, so `1` equals `1.0`.
//!
//! Owned Rust values cannot form cycles, so recursion is bounded by the
//! nesting depth of the value itself.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

/// Deep value equality used to decide whether two calls share a ledger entry.
pub trait StructuralEq {
    fn structural_eq(&self, other: &Self) -> bool;
}

/// Free-function form of [`StructuralEq::structural_eq`].
#[must_use]
pub fn structurally_equal<T: StructuralEq + ?Sized>(left: &T, right: &T) -> bool {
    left.structural_eq(right)
}

macro_rules! exact_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StructuralEq for $ty {
                fn structural_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

exact_eq!(
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
    str,
    String,
);

macro_rules! float_eq {
    ($($ty:ty),*) => {
        $(
            impl StructuralEq for $ty {
                #[allow(clippy::float_cmp)]
                fn structural_eq(&self, other: &Self) -> bool {
                    self == other || (self.is_nan() && other.is_nan())
                }
            }
        )*
    };
}

float_eq!(f32, f64);

macro_rules! tuple_eq {
    ($(($($name:ident : $idx:tt),+))*) => {
        $(
            impl<$($name: StructuralEq),+> StructuralEq for ($($name,)+) {
                fn structural_eq(&self, other: &Self) -> bool {
                    $(self.$idx.structural_eq(&other.$idx))&&+
                }
            }
        )*
    };
}

tuple_eq! {
    (A: 0)
    (A: 0, B: 1)
    (A: 0, B: 1, C: 2)
    (A: 0, B: 1, C: 2, D: 3)
    (A: 0, B: 1, C: 2, D: 3, E: 4)
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5)
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6)
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7)
}

impl<T: StructuralEq> StructuralEq for [T] {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|(left, right)| left.structural_eq(right))
    }
}

impl<T: StructuralEq, const N: usize> StructuralEq for [T; N] {
    fn structural_eq(&self, other: &Self) -> bool {
        self.as_slice().structural_eq(other.as_slice())
    }
}

impl<T: StructuralEq> StructuralEq for Vec<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        self.as_slice().structural_eq(other.as_slice())
    }
}

impl<T: StructuralEq> StructuralEq for VecDeque<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|(left, right)| left.structural_eq(right))
    }
}

impl<T: StructuralEq> StructuralEq for Option<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(left), Some(right)) => left.structural_eq(right),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: StructuralEq, E: StructuralEq> StructuralEq for Result<T, E> {
    fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ok(left), Ok(right)) => left.structural_eq(right),
            (Err(left), Err(right)) => left.structural_eq(right),
            _ => false,
        }
    }
}

impl<T: StructuralEq + ?Sized> StructuralEq for &T {
    fn structural_eq(&self, other: &Self) -> bool {
        (**self).structural_eq(*other)
    }
}

impl<T: StructuralEq + ?Sized> StructuralEq for Box<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        (**self).structural_eq(other)
    }
}

// Pointer identity is a shortcut, never the definition: two distinct
// allocations holding equal values still compare equal.
impl<T: StructuralEq + ?Sized> StructuralEq for Arc<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).structural_eq(other)
    }
}

impl<T: StructuralEq + ?Sized> StructuralEq for Rc<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).structural_eq(other)
    }
}

impl<T> StructuralEq for Cow<'_, T>
where
    T: StructuralEq + ToOwned + ?Sized,
{
    fn structural_eq(&self, other: &Self) -> bool {
        self.as_ref().structural_eq(other.as_ref())
    }
}

impl<K: Ord, V: StructuralEq> StructuralEq for BTreeMap<K, V> {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| {
                other
                    .get(key)
                    .is_some_and(|candidate| value.structural_eq(candidate))
            })
    }
}

impl<K, V, S> StructuralEq for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: StructuralEq,
    S: BuildHasher,
{
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| {
                other
                    .get(key)
                    .is_some_and(|candidate| value.structural_eq(candidate))
            })
    }
}

impl<T: Ord> StructuralEq for BTreeSet<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl<T, S> StructuralEq for HashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl StructuralEq for serde_json::Number {
    fn structural_eq(&self, other: &Self) -> bool {
        if let (Some(left), Some(right)) = (self.as_i64(), other.as_i64()) {
            return left == right;
        }
        if let (Some(left), Some(right)) = (self.as_u64(), other.as_u64()) {
            return left == right;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(left), Some(right)) => left.structural_eq(&right),
            _ => false,
        }
    }
}

impl StructuralEq for serde_json::Value {
    fn structural_eq(&self, other: &Self) -> bool {
        use serde_json::Value;

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::Number(left), Value::Number(right)) => left.structural_eq(right),
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Array(left), Value::Array(right)) => left.structural_eq(right),
            (Value::Object(left), Value::Object(right)) => {
                left.len() == right.len()
                    && left.iter().all(|(key, value)| {
                        right
                            .get(key)
                            .is_some_and(|candidate| value.structural_eq(candidate))
                    })
            }
            _ => false,
        }
    }
}
