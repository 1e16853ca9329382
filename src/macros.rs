//! Declarative helpers for implementing `Structural` on user types.

/// Implements `Structural` for one or more value types that already have
/// `PartialEq`, `Hash` and `Debug`. Values compare, hash and render through
/// those impls.
///
/// ```
/// use structural_eq::{structural_equals, structural_represent, structural_scalar};
///
/// #[derive(PartialEq, Hash, Debug)]
/// struct Celsius(i32);
/// structural_scalar!(Celsius);
///
/// assert!(structural_equals(&Celsius(20), &Celsius(20)).unwrap());
/// assert_eq!(structural_represent(&Celsius(20)).unwrap(), "Celsius(20)");
/// ```
#[macro_export]
macro_rules! structural_scalar {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Structural for $ty {
            fn descriptor(&self) -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::scalar()
            }

            fn as_plain(&self) -> ::core::option::Option<&dyn $crate::PlainValue> {
                ::core::option::Option::Some(self)
            }
        }

        impl $crate::PlainValue for $ty {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn plain_eq(&self, other: &dyn $crate::PlainValue) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .map_or(false, |other| self == other)
            }

            fn plain_hash(&self) -> u64 {
                $crate::hash_native(self)
            }

            fn plain_repr(&self) -> ::std::string::String {
                ::std::format!("{:?}", self)
            }
        }
    )+};
}

/// Implements `Structural` for a struct as a record over the listed fields,
/// compared in the order given.
///
/// ```
/// use structural_eq::{structural_equals, structural_represent, structural_record};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// structural_record!(Point { x, y });
///
/// assert!(structural_equals(&Point { x: 1, y: 2 }, &Point { x: 1, y: 2 }).unwrap());
/// assert_eq!(
///     structural_represent(&Point { x: 1, y: 2 }).unwrap(),
///     "Point { x = 1, y = 2 }"
/// );
/// ```
#[macro_export]
macro_rules! structural_record {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Structural for $ty {
            fn descriptor(&self) -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::record(&[$(::core::stringify!($field)),*])
            }

            fn member(&self, index: usize) -> $crate::Result<$crate::Element<'_>> {
                let fields: &[&dyn $crate::Structural] = &[$(&self.$field),*];
                match fields.get(index) {
                    ::core::option::Option::Some(value) => {
                        ::core::result::Result::Ok($crate::Element::Borrowed(*value))
                    }
                    ::core::option::Option::None => {
                        ::core::result::Result::Err($crate::StructuralError::MissingMember {
                            type_name: ::core::any::type_name::<Self>(),
                            index,
                        })
                    }
                }
            }
        }
    };
}
