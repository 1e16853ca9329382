//! Strategy contract and the closed set of strategy variants.
//!
//! `AcyclicStrategy` is the single place where cycle safety lives: its
//! provided `*_guarded` methods check identities, types and the recursion
//! guard, then hand over to the variant's `*_core` routine. Core routines
//! never call each other; every child goes back through the `Engine`, which
//! resolves it and re-enters a guarded method.

use crate::array_strategy::{FlatArrayStrategy, PointerArrayStrategy, RectangularArrayStrategy};
use crate::composite_strategy::{PairStrategy, TupleStrategy};
use crate::descriptor::{ArrayShape, MapEntry, SequenceOrder, TypeDescriptor, TypeKey};
use crate::engine::Engine;
use crate::error::{Result, StructuralError};
use crate::guard::{Identity, PairGuard, PairKey, VisitGuard};
use crate::hashing::{type_seed, HashCombiner, CYCLE_HASH};
use crate::member_strategy::MemberStrategy;
use crate::plain_strategy::PlainStrategy;
use crate::sequence_strategy::{SequenceStrategy, UnorderedStrategy};
use crate::value::Structural;
use core::fmt;

/// A resolved, non-null value as seen by a strategy.
#[derive(Clone, Copy)]
pub(crate) enum Subject<'a> {
    Value(&'a dyn Structural),
    Entry(&'a dyn Structural, &'a dyn Structural),
}

impl<'a> Subject<'a> {
    pub(crate) fn type_key(&self) -> TypeKey {
        match self {
            Subject::Value(v) => v.type_key(),
            Subject::Entry(..) => TypeKey::of::<MapEntry>(),
        }
    }

    pub(crate) fn descriptor(&self) -> TypeDescriptor {
        match self {
            Subject::Value(v) => v.descriptor(),
            Subject::Entry(..) => TypeDescriptor::pair(),
        }
    }

    /// The underlying value, or a shape error naming what was expected.
    pub(crate) fn value(&self, expected: &'static str) -> Result<&'a dyn Structural> {
        match *self {
            Subject::Value(v) => Ok(v),
            Subject::Entry(..) => Err(StructuralError::ShapeMismatch {
                type_name: self.type_key().name(),
                expected,
            }),
        }
    }
}

/// A subject plus the identity of the shared handle it was reached through.
#[derive(Clone, Copy)]
pub(crate) struct Operand<'a> {
    pub(crate) subject: Subject<'a>,
    pub(crate) identity: Option<Identity>,
}

/// Metadata derived once per type and cached in the strategy.
#[derive(Debug, Clone)]
pub(crate) struct TypeInfo {
    pub(crate) key: TypeKey,
    pub(crate) label: String,
    pub(crate) seed: u64,
}

impl TypeInfo {
    pub(crate) fn new(key: TypeKey) -> Self {
        Self {
            key,
            label: key.label(),
            seed: type_seed(key.name()),
        }
    }

    pub(crate) fn shape_error(&self, expected: &'static str) -> StructuralError {
        StructuralError::ShapeMismatch {
            type_name: self.key.name(),
            expected,
        }
    }
}

pub(crate) trait AcyclicStrategy {
    fn info(&self) -> &TypeInfo;

    fn equals_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        y: Subject<'_>,
        guard: &PairGuard,
    ) -> Result<bool>;

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64>;

    fn represent_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard)
        -> Result<String>;

    /// Whether values of this strategy contain other values.
    fn is_composite(&self) -> bool {
        true
    }

    /// Whether renderings are prefixed with the type label.
    fn qualifies_representation(&self) -> bool {
        true
    }

    /// `x` must be of this strategy's type; `y` may be anything non-null.
    fn equals_guarded(
        &self,
        engine: &Engine,
        x: Operand<'_>,
        y: Operand<'_>,
        guard: &PairGuard,
    ) -> Result<bool> {
        if let (Some(a), Some(b)) = (x.identity, y.identity) {
            if a == b {
                return Ok(true);
            }
        }
        if x.subject.type_key() != y.subject.type_key() {
            return Ok(false);
        }
        let _frame = match (x.identity, y.identity) {
            (Some(a), Some(b)) => match guard.enter(PairKey::new(a, b)) {
                Some(frame) => Some(frame),
                None => {
                    tracing::trace!(type_name = self.info().key.name(), "pair already under comparison");
                    return Ok(true);
                }
            },
            _ => None,
        };
        self.equals_core(engine, x.subject, y.subject, guard)
    }

    /// Hashes the depth-limited unfolding of `x`: handles are transparent
    /// and every composite value opens one nesting level. A composite at
    /// `hash_depth` contributes `CYCLE_HASH`, so two values equality cannot
    /// tell apart hash alike whichever side reached them through a shared
    /// handle.
    fn hash_guarded(&self, engine: &Engine, x: Operand<'_>, guard: &VisitGuard) -> Result<u64> {
        if !self.is_composite() {
            let core = self.hash_core(engine, x.subject, guard)?;
            return Ok(HashCombiner::new(self.info().seed).combine(core).finish());
        }
        let nesting = guard.nesting();
        if nesting >= engine.config().hash_depth {
            tracing::trace!(type_name = self.info().key.name(), nesting, "hash depth reached");
            return Ok(CYCLE_HASH);
        }
        if let Some(hash) = x.identity.and_then(|id| guard.settled(id, nesting)) {
            return Ok(hash);
        }
        let hash = {
            let _frame = guard.nest();
            let core = self.hash_core(engine, x.subject, guard)?;
            HashCombiner::new(self.info().seed).combine(core).finish()
        };
        if let Some(id) = x.identity {
            guard.settle(id, nesting, hash);
        }
        Ok(hash)
    }

    fn represent_guarded(
        &self,
        engine: &Engine,
        x: Operand<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        let _frame = match x.identity {
            Some(id) => match guard.enter(id) {
                Some(frame) => Some(frame),
                None => return Ok(engine.config().cycle_placeholder.clone()),
            },
            None => None,
        };
        let body = self.represent_core(engine, x.subject, guard)?;
        if self.qualifies_representation() {
            Ok(format!("{} {}", self.info().label, body))
        } else {
            Ok(body)
        }
    }
}

/// Which strategy a type was assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Plain,
    RectangularArray,
    FlatArray,
    PointerArray,
    Tuple,
    Pair,
    Unordered,
    Sequence,
    Members,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Plain => "plain",
            StrategyKind::RectangularArray => "rectangular-array",
            StrategyKind::FlatArray => "flat-array",
            StrategyKind::PointerArray => "pointer-array",
            StrategyKind::Tuple => "tuple",
            StrategyKind::Pair => "pair",
            StrategyKind::Unordered => "unordered",
            StrategyKind::Sequence => "sequence",
            StrategyKind::Members => "members",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) enum Strategy {
    Plain(PlainStrategy),
    RectangularArray(RectangularArrayStrategy),
    FlatArray(FlatArrayStrategy),
    PointerArray(PointerArrayStrategy),
    Tuple(TupleStrategy),
    Pair(PairStrategy),
    Unordered(UnorderedStrategy),
    Sequence(SequenceStrategy),
    Members(MemberStrategy),
}

impl Strategy {
    /// Picks the strategy for a type; the first matching rule wins.
    pub(crate) fn select(key: TypeKey, descriptor: &TypeDescriptor) -> Self {
        let info = TypeInfo::new(key);
        if descriptor.is_scalar() {
            return Strategy::Plain(PlainStrategy::new(info));
        }
        if let Some(shape) = descriptor.array() {
            if descriptor.has_pointer_elements() {
                return Strategy::PointerArray(PointerArrayStrategy::new(info));
            }
            return match shape {
                ArrayShape::Rectangular { rank } => {
                    Strategy::RectangularArray(RectangularArrayStrategy::new(info, rank))
                }
                ArrayShape::Vector => Strategy::FlatArray(FlatArrayStrategy::new(info)),
            };
        }
        if let Some(arity) = descriptor.tuple_arity() {
            return Strategy::Tuple(TupleStrategy::new(info, arity));
        }
        if descriptor.is_pair() {
            return Strategy::Pair(PairStrategy::new(info));
        }
        match descriptor.sequence_order() {
            Some(SequenceOrder::Unordered) => Strategy::Unordered(UnorderedStrategy::new(info)),
            Some(SequenceOrder::Ordered) => Strategy::Sequence(SequenceStrategy::new(info)),
            None => Strategy::Members(MemberStrategy::new(info, descriptor.members())),
        }
    }

    pub(crate) fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Plain(_) => StrategyKind::Plain,
            Strategy::RectangularArray(_) => StrategyKind::RectangularArray,
            Strategy::FlatArray(_) => StrategyKind::FlatArray,
            Strategy::PointerArray(_) => StrategyKind::PointerArray,
            Strategy::Tuple(_) => StrategyKind::Tuple,
            Strategy::Pair(_) => StrategyKind::Pair,
            Strategy::Unordered(_) => StrategyKind::Unordered,
            Strategy::Sequence(_) => StrategyKind::Sequence,
            Strategy::Members(_) => StrategyKind::Members,
        }
    }

    pub(crate) fn as_dyn(&self) -> &dyn AcyclicStrategy {
        match self {
            Strategy::Plain(s) => s,
            Strategy::RectangularArray(s) => s,
            Strategy::FlatArray(s) => s,
            Strategy::PointerArray(s) => s,
            Strategy::Tuple(s) => s,
            Strategy::Pair(s) => s,
            Strategy::Unordered(s) => s,
            Strategy::Sequence(s) => s,
            Strategy::Members(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_for(d: TypeDescriptor) -> StrategyKind {
        Strategy::select(TypeKey::of::<()>(), &d).kind()
    }

    #[test]
    fn dispatch_follows_priority_order() {
        // Scalar beats everything else it might also claim.
        assert_eq!(
            kind_for(TypeDescriptor::scalar().with_sequence(SequenceOrder::Ordered)),
            StrategyKind::Plain
        );
        assert_eq!(
            kind_for(TypeDescriptor::vector().with_pointer_elements()),
            StrategyKind::PointerArray
        );
        assert_eq!(
            kind_for(TypeDescriptor::rectangular(1).with_pointer_elements()),
            StrategyKind::PointerArray
        );
        assert_eq!(kind_for(TypeDescriptor::rectangular(3)), StrategyKind::RectangularArray);
        assert_eq!(
            kind_for(TypeDescriptor::vector().with_sequence(SequenceOrder::Ordered)),
            StrategyKind::FlatArray
        );
        assert_eq!(
            kind_for(TypeDescriptor::tuple(2).with_sequence(SequenceOrder::Ordered)),
            StrategyKind::Tuple
        );
        assert_eq!(kind_for(TypeDescriptor::pair()), StrategyKind::Pair);
        assert_eq!(kind_for(TypeDescriptor::unordered()), StrategyKind::Unordered);
        assert_eq!(kind_for(TypeDescriptor::sequence()), StrategyKind::Sequence);
        assert_eq!(kind_for(TypeDescriptor::record(&["a"])), StrategyKind::Members);
        assert_eq!(kind_for(TypeDescriptor::default()), StrategyKind::Members);
    }

    #[test]
    fn type_info_caches_label_and_seed() {
        let info = TypeInfo::new(TypeKey::of::<Vec<String>>());
        assert_eq!(info.label, "Vec<String>");
        assert_eq!(info.seed, type_seed(core::any::type_name::<Vec<String>>()));
    }
}
