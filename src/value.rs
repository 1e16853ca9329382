//! The `Structural` trait: how a type exposes its shape to the engine.
//!
//! Rust has no runtime reflection, so every inspected type describes itself:
//! `descriptor` says which capabilities it has, and the matching accessor
//! (`as_plain`, `as_array`, `tuple_slots`, `as_sequence`, `member`, ...)
//! hands the engine the parts to recurse into. Handle types (`Rc`, `Box`,
//! `RefCell`, `Option`, ...) answer `pointee` instead and are resolved away
//! before a strategy is chosen.

use crate::descriptor::{Dimensions, TypeDescriptor, TypeKey};
use crate::error::{Result, StructuralError};
use crate::guard::Identity;
use core::any::Any;
use core::ops::Deref;

/// A value the engine can compare, hash and render.
pub trait Structural: 'static {
    /// Capabilities of this type. Must not vary between values of one type.
    ///
    /// The default describes a record without members: equal to any other
    /// value of the same type.
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::record(&[])
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// `Some` for handle types: what the handle currently refers to.
    fn pointee(&self) -> Option<Result<Pointee<'_>>> {
        None
    }

    fn as_plain(&self) -> Option<&dyn PlainValue> {
        None
    }

    fn as_array(&self) -> Option<&dyn ArrayAccess> {
        None
    }

    /// Raw addresses held by a pointer array, in row-major order.
    fn pointer_slots(&self) -> Option<Vec<usize>> {
        None
    }

    /// Address held by a raw pointer value.
    fn raw_address(&self) -> Option<usize> {
        None
    }

    fn tuple_slots(&self) -> Option<Vec<&dyn Structural>> {
        None
    }

    fn pair_slots(&self) -> Option<(&dyn Structural, &dyn Structural)> {
        None
    }

    fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
        None
    }

    /// Value of the member at `index` of `descriptor().members()`.
    fn member(&self, index: usize) -> Result<Element<'_>> {
        Err(StructuralError::MissingMember {
            type_name: self.type_key().name(),
            index,
        })
    }

    /// Whether the type is a raw address. Lets containers describe their
    /// element type without having an element at hand.
    fn is_raw_address_type() -> bool
    where
        Self: Sized,
    {
        false
    }
}

/// A child value handed to the engine by an accessor.
pub enum Element<'a> {
    Borrowed(&'a dyn Structural),
    /// A value computed on access, e.g. a derived property.
    Owned(Box<dyn Structural>),
    /// Key/value entry of a map-like sequence.
    Entry(&'a dyn Structural, &'a dyn Structural),
}

impl<'a> Element<'a> {
    pub fn owned<T: Structural>(value: T) -> Self {
        Element::Owned(Box::new(value))
    }
}

impl<'a> From<&'a dyn Structural> for Element<'a> {
    fn from(value: &'a dyn Structural) -> Self {
        Element::Borrowed(value)
    }
}

/// What a handle refers to.
pub enum Pointee<'a> {
    Null,
    /// Owned indirection without identity (`Box`, `Some`).
    Inline(&'a dyn Structural),
    /// Shared allocation (`Rc`, `Arc`).
    Shared {
        identity: Identity,
        target: &'a dyn Structural,
    },
    /// Access that holds a borrow or lock for as long as the value is used.
    Guarded {
        identity: Option<Identity>,
        target: Box<dyn Deref<Target = dyn Structural> + 'a>,
    },
}

/// Scalar behaviour delegated to the type's own equality, hash and
/// formatting.
pub trait PlainValue {
    fn as_any(&self) -> &dyn Any;

    /// Equality against a value already known to have the same type.
    fn plain_eq(&self, other: &dyn PlainValue) -> bool;

    fn plain_hash(&self) -> u64;

    fn plain_repr(&self) -> String;
}

/// Row-major element access for arrays of any rank.
pub trait ArrayAccess {
    fn dimensions(&self) -> Dimensions;

    /// Element at row-major position `offset`.
    fn item(&self, offset: usize) -> &dyn Structural;
}

/// Forward iteration over a collection.
pub trait SequenceAccess {
    /// Item count when the collection knows it without iterating.
    fn fast_len(&self) -> Option<usize> {
        None
    }

    fn items(&self) -> Box<dyn Iterator<Item = Element<'_>> + '_>;
}
