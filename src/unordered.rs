//! Bag semantics for any sequence.

use crate::descriptor::TypeDescriptor;
use crate::value::{SequenceAccess, Structural};
use core::ops::Deref;

/// Wraps a collection so it compares as a multiset: two wrappers are equal
/// when their items can be paired off one to one, whatever the iteration
/// order. Useful for `HashSet` and `HashMap`, whose iteration order
/// depends on insertion history.
///
/// Only wrappers of the same collection type are compared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Unordered<C> {
    inner: C,
}

impl<C> Unordered<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> Deref for Unordered<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C> From<C> for Unordered<C> {
    fn from(inner: C) -> Self {
        Self::new(inner)
    }
}

impl<C: Structural> Structural for Unordered<C> {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::unordered()
    }

    fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
        self.inner.as_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::strategy::StrategyKind;
    use std::collections::HashMap;

    #[test]
    fn maps_with_different_histories_compare_equal() {
        let e = Engine::new();
        let mut a = HashMap::new();
        let mut b = HashMap::new();
        for i in 0..32u32 {
            a.insert(i, i.to_string());
        }
        for i in (0..32u32).rev() {
            b.insert(i, i.to_string());
        }
        let (a, b) = (Unordered::new(a), Unordered::new(b));
        assert!(e.equals(&a, &b).unwrap());
        assert_eq!(e.hash(&a).unwrap(), e.hash(&b).unwrap());
        assert_eq!(e.strategy_kind(&a).unwrap(), Some(StrategyKind::Unordered));
    }

    #[test]
    fn wrapper_without_a_sequence_is_a_shape_error() {
        let e = Engine::new();
        assert!(e.equals(&Unordered::new(1u8), &Unordered::new(1u8)).is_err());
    }

    #[test]
    fn renders_with_the_wrapper_label() {
        let e = Engine::new();
        assert_eq!(
            e.represent(&Unordered::new(vec![2, 1])).unwrap(),
            "Unordered<Vec<i32>> { 2, 1 }"
        );
    }
}
