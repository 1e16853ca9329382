//! `Structural` for standard library types.
//!
//! Scalars compare natively. `Vec` and `[T; N]` are flat arrays (pointer
//! arrays when their element type is a raw pointer). Other collections are
//! ordered sequences, maps yielding key/value entries; `HashSet` and
//! `HashMap` included, so two of them with equal contents but different
//! iteration order compare unequal. Wrap them in `Unordered` for bag
//! semantics. Smart pointers, `Option` and cells are handles and resolve to
//! their target.

use crate::descriptor::{Dimension, Dimensions, SequenceOrder, TypeDescriptor};
use crate::error::{Result, StructuralError};
use crate::guard::Identity;
use crate::hashing::hash_native;
use crate::value::{ArrayAccess, Element, PlainValue, Pointee, SequenceAccess, Structural};
use core::any::Any;
use core::hash::BuildHasher;
use core::ops::Deref;
use smallvec::smallvec;
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::rc::{self, Rc};
use std::sync::{self, Arc};

crate::structural_scalar!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, (), String,
    &'static str,
);

macro_rules! float_scalar {
    ($($t:ty),+) => {$(
        impl Structural for $t {
            fn descriptor(&self) -> TypeDescriptor {
                TypeDescriptor::scalar()
            }

            fn as_plain(&self) -> Option<&dyn PlainValue> {
                Some(self)
            }
        }

        /// NaN equals NaN and `-0.0` equals `0.0`, so equality stays
        /// reflexive and hashing agrees with it.
        impl PlainValue for $t {
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn plain_eq(&self, other: &dyn PlainValue) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$t>()
                    .map_or(false, |o| self == o || (self.is_nan() && o.is_nan()))
            }

            fn plain_hash(&self) -> u64 {
                let canonical = if self.is_nan() {
                    <$t>::NAN
                } else if *self == 0.0 {
                    0.0
                } else {
                    *self
                };
                hash_native(&canonical.to_bits())
            }

            fn plain_repr(&self) -> String {
                self.to_string()
            }
        }
    )+};
}

float_scalar!(f32, f64);

macro_rules! raw_pointer {
    ($($ptr:tt),+) => {$(
        impl<T: ?Sized + 'static> Structural for *$ptr T {
            fn descriptor(&self) -> TypeDescriptor {
                TypeDescriptor::scalar()
            }

            fn as_plain(&self) -> Option<&dyn PlainValue> {
                Some(self)
            }

            fn raw_address(&self) -> Option<usize> {
                Some(self.cast::<()>() as usize)
            }

            fn is_raw_address_type() -> bool {
                true
            }
        }

        /// Compared by address only; never dereferenced.
        impl<T: ?Sized + 'static> PlainValue for *$ptr T {
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn plain_eq(&self, other: &dyn PlainValue) -> bool {
                other
                    .as_any()
                    .downcast_ref::<*$ptr T>()
                    .map_or(false, |o| self.cast::<()>() == o.cast::<()>())
            }

            fn plain_hash(&self) -> u64 {
                hash_native(&(self.cast::<()>() as usize))
            }

            fn plain_repr(&self) -> String {
                format!("{:#x}", self.cast::<()>() as usize)
            }
        }
    )+};
}

raw_pointer!(const, mut);

fn vector_descriptor<T: Structural>() -> TypeDescriptor {
    let d = TypeDescriptor::vector().with_sequence(SequenceOrder::Ordered);
    if T::is_raw_address_type() {
        d.with_pointer_elements()
    } else {
        d
    }
}

fn address_slots<T: Structural>(items: &[T]) -> Option<Vec<usize>> {
    items.iter().map(Structural::raw_address).collect()
}

macro_rules! flat_array {
    ($({$($generics:tt)*} $ty:ty),+ $(,)?) => {$(
        impl<$($generics)*> Structural for $ty {
            fn descriptor(&self) -> TypeDescriptor {
                vector_descriptor::<T>()
            }

            fn as_array(&self) -> Option<&dyn ArrayAccess> {
                Some(self)
            }

            fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
                Some(self)
            }

            fn pointer_slots(&self) -> Option<Vec<usize>> {
                address_slots(&self[..])
            }
        }

        impl<$($generics)*> ArrayAccess for $ty {
            fn dimensions(&self) -> Dimensions {
                smallvec![Dimension::zero_based(self.len())]
            }

            fn item(&self, offset: usize) -> &dyn Structural {
                &self[offset]
            }
        }

        impl<$($generics)*> SequenceAccess for $ty {
            fn fast_len(&self) -> Option<usize> {
                Some(self.len())
            }

            fn items(&self) -> Box<dyn Iterator<Item = Element<'_>> + '_> {
                Box::new(self.iter().map(|v| Element::Borrowed(v)))
            }
        }
    )+};
}

flat_array! {
    {T: Structural} Vec<T>,
    {T: Structural, const N: usize} [T; N],
}

macro_rules! ordered_sequence {
    ($({$($generics:tt)*} $ty:ty),+ $(,)?) => {$(
        impl<$($generics)*> Structural for $ty {
            fn descriptor(&self) -> TypeDescriptor {
                TypeDescriptor::sequence()
            }

            fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
                Some(self)
            }
        }

        impl<$($generics)*> SequenceAccess for $ty {
            fn fast_len(&self) -> Option<usize> {
                Some(self.len())
            }

            fn items(&self) -> Box<dyn Iterator<Item = Element<'_>> + '_> {
                Box::new(self.iter().map(|v| Element::Borrowed(v)))
            }
        }
    )+};
}

ordered_sequence! {
    {T: Structural} VecDeque<T>,
    {T: Structural} LinkedList<T>,
    {T: Structural} BTreeSet<T>,
    {T: Structural, S: BuildHasher + 'static} HashSet<T, S>,
}

macro_rules! map_sequence {
    ($({$($generics:tt)*} $ty:ty),+ $(,)?) => {$(
        impl<$($generics)*> Structural for $ty {
            fn descriptor(&self) -> TypeDescriptor {
                TypeDescriptor::sequence()
            }

            fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
                Some(self)
            }
        }

        impl<$($generics)*> SequenceAccess for $ty {
            fn fast_len(&self) -> Option<usize> {
                Some(self.len())
            }

            fn items(&self) -> Box<dyn Iterator<Item = Element<'_>> + '_> {
                Box::new(self.iter().map(|(k, v)| Element::Entry(k, v)))
            }
        }
    )+};
}

map_sequence! {
    {K: Structural, V: Structural} BTreeMap<K, V>,
    {K: Structural, V: Structural, S: BuildHasher + 'static} HashMap<K, V, S>,
}

macro_rules! tuple_impls {
    ($($arity:literal => ($($name:ident $idx:tt),+);)+) => {$(
        impl<$($name: Structural),+> Structural for ($($name,)+) {
            fn descriptor(&self) -> TypeDescriptor {
                TypeDescriptor::tuple($arity)
            }

            fn tuple_slots(&self) -> Option<Vec<&dyn Structural>> {
                Some(vec![$(&self.$idx as &dyn Structural),+])
            }
        }
    )+};
}

tuple_impls! {
    1 => (A 0);
    2 => (A 0, B 1);
    3 => (A 0, B 1, C 2);
    4 => (A 0, B 1, C 2, D 3);
    5 => (A 0, B 1, C 2, D 3, E 4);
    6 => (A 0, B 1, C 2, D 3, E 4, F 5);
}

impl<T: Structural> Structural for Option<T> {
    fn pointee(&self) -> Option<Result<Pointee<'_>>> {
        Some(Ok(match self {
            None => Pointee::Null,
            Some(v) => Pointee::Inline(v),
        }))
    }
}

impl<T: Structural> Structural for Box<T> {
    fn pointee(&self) -> Option<Result<Pointee<'_>>> {
        Some(Ok(Pointee::Inline(&**self)))
    }
}

impl Structural for Box<dyn Structural> {
    fn pointee(&self) -> Option<Result<Pointee<'_>>> {
        Some(Ok(Pointee::Inline(&**self)))
    }
}

/// Identity of a shared allocation seen through a trait object.
fn dynamic_identity(target: &dyn Structural) -> Identity {
    let addr = (target as *const dyn Structural).cast::<()>() as usize;
    Identity::from_parts(addr, target.type_key().id())
}

macro_rules! shared_handle {
    ($($handle:ident),+) => {$(
        impl<T: Structural> Structural for $handle<T> {
            fn pointee(&self) -> Option<Result<Pointee<'_>>> {
                Some(Ok(Pointee::Shared {
                    identity: Identity::of($handle::as_ptr(self)),
                    target: &**self,
                }))
            }
        }

        impl Structural for $handle<dyn Structural> {
            fn pointee(&self) -> Option<Result<Pointee<'_>>> {
                Some(Ok(Pointee::Shared {
                    identity: dynamic_identity(&**self),
                    target: &**self,
                }))
            }
        }
    )+};
}

shared_handle!(Rc, Arc);

/// Strong reference taken while a weak handle is being inspected.
struct Upgraded<P>(P);

impl<T: Structural> Deref for Upgraded<Rc<T>> {
    type Target = dyn Structural;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl<T: Structural> Deref for Upgraded<Arc<T>> {
    type Target = dyn Structural;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

macro_rules! weak_handle {
    ($($weak:ident :: $strong:ident),+) => {$(
        /// A dangling weak handle is null.
        impl<T: Structural> Structural for $weak::Weak<T> {
            fn pointee(&self) -> Option<Result<Pointee<'_>>> {
                let identity = Identity::of(self.as_ptr());
                Some(Ok(match self.upgrade() {
                    None => Pointee::Null,
                    Some(strong) => Pointee::Guarded {
                        identity: Some(identity),
                        target: Box::new(Upgraded::<$strong<T>>(strong)),
                    },
                }))
            }
        }
    )+};
}

weak_handle!(rc::Rc, sync::Arc);

impl<T: Structural> Structural for RefCell<T> {
    fn pointee(&self) -> Option<Result<Pointee<'_>>> {
        Some(match self.try_borrow() {
            Ok(borrowed) => Ok(Pointee::Guarded {
                identity: None,
                target: Box::new(Ref::map(borrowed, |v| v as &dyn Structural)),
            }),
            Err(_) => Err(StructuralError::Borrowed {
                type_name: core::any::type_name::<Self>(),
            }),
        })
    }
}

/// Read access is taken recursively, so a graph that reaches the same lock
/// twice while it is read-held does not deadlock. A write-held lock is an
/// error.
impl<T: Structural> Structural for parking_lot::RwLock<T> {
    fn pointee(&self) -> Option<Result<Pointee<'_>>> {
        Some(match self.try_read_recursive() {
            Some(guard) => Ok(Pointee::Guarded {
                identity: None,
                target: Box::new(parking_lot::RwLockReadGuard::map(guard, |v| {
                    v as &dyn Structural
                })),
            }),
            None => Err(StructuralError::Borrowed {
                type_name: core::any::type_name::<Self>(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Engine;
    use crate::strategy::StrategyKind;
    use crate::value::Structural;
    use std::cell::RefCell;
    use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
    use std::rc::{Rc, Weak};
    use std::sync::Arc;

    fn kind(v: &dyn Structural) -> Option<StrategyKind> {
        Engine::new().strategy_kind(v).unwrap()
    }

    #[test]
    fn std_types_land_on_their_strategies() {
        assert_eq!(kind(&1u8), Some(StrategyKind::Plain));
        assert_eq!(kind(&"x"), Some(StrategyKind::Plain));
        assert_eq!(kind(&vec![1]), Some(StrategyKind::FlatArray));
        assert_eq!(kind(&[1, 2, 3]), Some(StrategyKind::FlatArray));
        assert_eq!(kind(&VecDeque::<u8>::new()), Some(StrategyKind::Sequence));
        assert_eq!(kind(&BTreeSet::<u8>::new()), Some(StrategyKind::Sequence));
        assert_eq!(kind(&HashMap::<u8, u8>::new()), Some(StrategyKind::Sequence));
        assert_eq!(kind(&(1, 2, 3)), Some(StrategyKind::Tuple));
        assert_eq!(kind(&Box::new(vec![1u8])), Some(StrategyKind::FlatArray));
        assert_eq!(kind(&Arc::new(2.0f32)), Some(StrategyKind::Plain));
    }

    #[test]
    fn raw_pointer_vectors_are_pointer_arrays() {
        let (a, b) = (1i32, 2i32);
        let (pa, pb) = (&a as *const i32, &b as *const i32);
        let v = vec![pa, pb];
        assert_eq!(kind(&v), Some(StrategyKind::PointerArray));
        let w: [*mut i32; 0] = [];
        assert_eq!(kind(&w), Some(StrategyKind::PointerArray));

        let e = Engine::new();
        let same = vec![pa, pb];
        let swapped = vec![pb, pa];
        assert!(e.equals(&v, &same).unwrap());
        assert_eq!(e.hash(&v).unwrap(), e.hash(&same).unwrap());
        assert!(!e.equals(&v, &swapped).unwrap());
    }

    #[test]
    fn identical_shared_handles_short_circuit() {
        let e = Engine::new();
        let a = Rc::new(vec![1, 2]);
        assert!(e.equals(&a, &Rc::clone(&a)).unwrap());
        assert!(e.equals(&a, &Rc::new(vec![1, 2])).unwrap());
    }

    #[test]
    fn weak_handles_follow_or_become_null() {
        let e = Engine::new();
        let strong = Rc::new(3u16);
        let weak = Rc::downgrade(&strong);
        assert!(e.equals(&weak, &3u16).unwrap());
        assert_eq!(e.represent(&weak).unwrap(), "3");
        drop(strong);
        assert!(e.equals(&weak, &Weak::<u16>::new()).unwrap());
        assert_eq!(e.represent(&weak).unwrap(), "null");
    }

    #[test]
    fn trait_object_handles_compare_by_concrete_type() {
        let e = Engine::new();
        let a: Rc<dyn Structural> = Rc::new(5i32);
        let b: Box<dyn Structural> = Box::new(5i32);
        let c: Arc<dyn Structural> = Arc::new(5i64);
        assert!(e.equals(&a, &b).unwrap());
        assert!(!e.equals(&a, &c).unwrap());
        assert!(e.equals(&a, &Rc::clone(&a)).unwrap());
    }

    #[test]
    fn hash_sets_are_order_sensitive_sequences() {
        let e = Engine::new();
        let a: HashSet<u32> = (0..64).collect();
        let b = a.clone();
        // Clones iterate in the same order.
        assert!(e.equals(&a, &b).unwrap());
        assert_eq!(e.hash(&a).unwrap(), e.hash(&b).unwrap());
    }

    #[test]
    fn read_locks_are_recursive() {
        let e = Engine::new();
        let lock = Arc::new(parking_lot::RwLock::new(vec![1, 2]));
        let _outer = lock.read();
        assert!(e.equals(&lock, &vec![1, 2]).unwrap());
        drop(_outer);
        let _w = lock.write();
        assert!(e.hash(&lock).is_err());
    }

    #[test]
    fn shared_cells_render_through() {
        let e = Engine::new();
        let cell = Rc::new(RefCell::new(Some("v".to_string())));
        assert_eq!(e.represent(&cell).unwrap(), "\"v\"");
        *cell.borrow_mut() = None;
        assert_eq!(e.represent(&cell).unwrap(), "null");
    }
}
