//! Error types surfaced by the engine.
//!
//! Type mismatches and nulls are ordinary results, never errors. What ends up
//! here is either a failure raised by user code (a member accessor, a lock
//! that is already held) or a broken `Structural` implementation.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StructuralError>;

#[derive(Debug, Error)]
pub enum StructuralError {
    /// A member accessor failed. Propagated to the caller unchanged.
    #[error("member `{member}` of {type_name} failed: {message}")]
    Member {
        type_name: &'static str,
        member: &'static str,
        message: String,
    },

    /// `member(index)` was asked for an index outside the declared list.
    #[error("{type_name} has no member at index {index}")]
    MissingMember { type_name: &'static str, index: usize },

    /// A `RefCell` or lock inside the inspected graph is exclusively held.
    #[error("{type_name} is exclusively borrowed and cannot be inspected")]
    Borrowed { type_name: &'static str },

    /// The descriptor promised a capability the accessors do not provide.
    #[error("{type_name} is described as {expected} but does not expose it")]
    ShapeMismatch {
        type_name: &'static str,
        expected: &'static str,
    },

    /// Array data does not fit the requested dimensions.
    #[error("array shape holds {expected} elements but {actual} were supplied")]
    InvalidShape { expected: usize, actual: usize },

    /// The element count or the last index of some dimension is not
    /// representable.
    #[error("array dimensions overflow the index range")]
    ShapeOverflow,

    #[error("invalid engine configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl StructuralError {
    /// Convenience constructor for failing member accessors.
    pub fn member(
        type_name: &'static str,
        member: &'static str,
        message: impl Into<String>,
    ) -> Self {
        StructuralError::Member {
            type_name,
            member,
            message: message.into(),
        }
    }
}
