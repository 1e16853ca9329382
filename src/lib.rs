//! structural-eq: deep equality, hashing and rendering for arbitrary,
//! possibly cyclic, object graphs.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: answer "are these two graphs the same shape with the same
//!   values?", produce a hash that never contradicts that answer, and
//!   render the structure for diagnostics, without recursing forever on
//!   reference cycles.
//! - Layers:
//!   - `Structural`: the trait a type implements to describe itself
//!     (scalar, array, tuple, pair, sequence, record) and to hand out its
//!     parts. Handle types (`Rc`, `Box`, `RefCell`, `Option`, ...) resolve
//!     to their target instead.
//!   - `Strategy`: one routine per shape. Chosen once per concrete type by
//!     the `StrategyRegistry` and cached.
//!   - `AcyclicStrategy`: the guarded wrapper every strategy runs through;
//!     the single place that consults the `RecursionGuard`.
//!   - `Engine`: the facade. Resolves handles, fetches strategies, and is
//!     the only path by which a strategy reaches a child value.
//!
//! Constraints
//! - Values of different concrete types are never equal.
//! - `equals(a, b)` implies `hash(a) == hash(b)`, cycles included.
//! - The engine never mutates inspected values. Cells and locks are only
//!   read-borrowed; an exclusively held one is reported as an error.
//! - Nulls and type mismatches are ordinary answers, never errors.
//!
//! Cycle policy
//! - Only shared handles (`Rc`, `Arc`, `Weak`) carry an identity: every
//!   ownership cycle in Rust passes through one.
//! - Equality tracks active pairs of identities. Meeting an active pair
//!   again answers `true`, so two cyclic graphs are equal when no finite
//!   path tells them apart.
//! - Hashing ignores identities for termination. It hashes the unfolding of
//!   the graph down to the configured depth of nested composite values and
//!   contributes a constant below that, which keeps it consistent with the
//!   optimistic equality above whichever side holds a shared handle.
//!   Results for a shared handle are reused at the same depth.
//! - Rendering tracks active identities and prints a placeholder for an
//!   active ancestor.
//!
//! Threading
//! - `Engine` is `Send + Sync`; its registry is a concurrent map. Each
//!   top-level call creates its own `!Send` guard and passes it down
//!   explicitly.
//!
//! Notes and non-goals
//! - Rendering is diagnostic only and not meant to be parsed back.
//! - No ordering, only equality.
//! - `HashSet`/`HashMap` compare in iteration order; wrap them in
//!   `Unordered` for bag semantics.

mod array_strategy;
mod composite_strategy;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod guard;
mod guard_proptest;
pub mod hashing;
mod impls;
mod macros;
mod member_strategy;
mod plain_strategy;
pub mod rect_array;
pub mod registry;
mod sequence_strategy;
mod strategy;
pub mod unordered;
pub mod value;

// Public surface
pub use config::EngineConfig;
pub use descriptor::{
    ArrayShape, Dimension, Dimensions, MapEntry, SequenceOrder, TypeDescriptor, TypeKey,
};
pub use engine::{structural_equals, structural_hash, structural_represent, Engine};
pub use error::{Result, StructuralError};
pub use guard::{Identity, RecursionGuard};
pub use hashing::{hash_native, HashCombiner, CYCLE_HASH, NULL_HASH};
pub use rect_array::RectArray;
pub use registry::StrategyRegistry;
pub use strategy::StrategyKind;
pub use unordered::Unordered;
pub use value::{ArrayAccess, Element, PlainValue, Pointee, SequenceAccess, Structural};
