//! Type keys and capability descriptors.
//!
//! A `TypeDescriptor` is the static answer to "what shape is this type?". The
//! registry reads it once per `TypeKey` and picks a strategy from it; the
//! descriptor must therefore be identical for every value of a type.

use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};
use smallvec::SmallVec;

/// Stable identifier of a concrete type, used as the registry key.
///
/// Equality and hashing look only at the `TypeId`; the name is carried along
/// for labels and diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name as reported by `core::any::type_name`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name with module paths stripped, e.g. `Vec<Vec<i32>>`.
    pub fn label(&self) -> String {
        short_type_name(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Marker type keying the key/value entries yielded by map-like sequences.
pub struct MapEntry;

/// Storage layout of an array type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayShape {
    /// Single dimension, zero-based.
    Vector,
    /// Fixed rank with per-dimension lower bounds.
    Rectangular { rank: usize },
}

/// Iteration contract of a sequence type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceOrder {
    Ordered,
    Unordered,
}

/// One array dimension: its lower bound and its length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub lower: isize,
    pub len: usize,
}

impl Dimension {
    pub const fn zero_based(len: usize) -> Self {
        Self { lower: 0, len }
    }
}

/// Dimension list of an array value. Ranks above four spill to the heap.
pub type Dimensions = SmallVec<[Dimension; 4]>;

/// Capabilities of a type, consulted in priority order by the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeDescriptor {
    scalar: bool,
    array: Option<ArrayShape>,
    pointer_elements: bool,
    tuple_arity: Option<usize>,
    pair: bool,
    sequence: Option<SequenceOrder>,
    members: &'static [&'static str],
}

impl TypeDescriptor {
    /// A value type with its own equality, hash and formatting.
    pub const fn scalar() -> Self {
        Self {
            scalar: true,
            array: None,
            pointer_elements: false,
            tuple_arity: None,
            pair: false,
            sequence: None,
            members: &[],
        }
    }

    /// Composite exposing the given members, in declaration order.
    pub const fn record(members: &'static [&'static str]) -> Self {
        Self {
            scalar: false,
            array: None,
            pointer_elements: false,
            tuple_arity: None,
            pair: false,
            sequence: None,
            members,
        }
    }

    pub const fn vector() -> Self {
        Self::record(&[]).with_array(ArrayShape::Vector)
    }

    pub const fn rectangular(rank: usize) -> Self {
        Self::record(&[]).with_array(ArrayShape::Rectangular { rank })
    }

    pub const fn tuple(arity: usize) -> Self {
        let mut d = Self::record(&[]);
        d.tuple_arity = Some(arity);
        d
    }

    pub const fn pair() -> Self {
        let mut d = Self::record(&[]);
        d.pair = true;
        d
    }

    pub const fn sequence() -> Self {
        Self::record(&[]).with_sequence(SequenceOrder::Ordered)
    }

    pub const fn unordered() -> Self {
        Self::record(&[]).with_sequence(SequenceOrder::Unordered)
    }

    pub const fn with_array(mut self, shape: ArrayShape) -> Self {
        self.array = Some(shape);
        self
    }

    /// Marks the array elements as raw addresses.
    pub const fn with_pointer_elements(mut self) -> Self {
        self.pointer_elements = true;
        self
    }

    pub const fn with_sequence(mut self, order: SequenceOrder) -> Self {
        self.sequence = Some(order);
        self
    }

    pub const fn is_scalar(&self) -> bool {
        self.scalar
    }

    pub const fn array(&self) -> Option<ArrayShape> {
        self.array
    }

    pub const fn has_pointer_elements(&self) -> bool {
        self.pointer_elements
    }

    pub const fn tuple_arity(&self) -> Option<usize> {
        self.tuple_arity
    }

    pub const fn is_pair(&self) -> bool {
        self.pair
    }

    pub const fn sequence_order(&self) -> Option<SequenceOrder> {
        self.sequence
    }

    pub const fn members(&self) -> &'static [&'static str] {
        self.members
    }
}

/// Strips module paths from a `type_name` string, generics included.
///
/// `alloc::vec::Vec<core::option::Option<my::Node>>` becomes
/// `Vec<Option<Node>>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = out.len();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_drop_paths_inside_generics() {
        assert_eq!(short_type_name("alloc::vec::Vec<i32>"), "Vec<i32>");
        assert_eq!(
            short_type_name("std::collections::hash::map::HashMap<alloc::string::String, core::option::Option<u8>>"),
            "HashMap<String, Option<u8>>"
        );
        assert_eq!(short_type_name("dyn my_crate::Structural"), "dyn Structural");
        assert_eq!(short_type_name("*const i32"), "*const i32");
        assert_eq!(short_type_name("(i32, &str)"), "(i32, &str)");
    }

    #[test]
    fn keys_compare_by_type_id() {
        assert_eq!(TypeKey::of::<Vec<u8>>(), TypeKey::of::<Vec<u8>>());
        assert_ne!(TypeKey::of::<Vec<u8>>(), TypeKey::of::<Vec<i8>>());
        assert_eq!(TypeKey::of::<Vec<u8>>().label(), "Vec<u8>");
    }

    #[test]
    fn builders_compose() {
        let d = TypeDescriptor::vector()
            .with_pointer_elements()
            .with_sequence(SequenceOrder::Ordered);
        assert_eq!(d.array(), Some(ArrayShape::Vector));
        assert!(d.has_pointer_elements());
        assert_eq!(d.sequence_order(), Some(SequenceOrder::Ordered));
        assert!(!d.is_scalar());
        assert!(d.members().is_empty());

        let r = TypeDescriptor::record(&["x", "y"]);
        assert_eq!(r.members(), &["x", "y"]);
        assert_eq!(r.array(), None);
    }
}
