//! Fixed-arity composites: tuples and key/value pairs.

use crate::engine::Engine;
use crate::error::Result;
use crate::guard::{PairGuard, VisitGuard};
use crate::hashing::HashCombiner;
use crate::strategy::{AcyclicStrategy, Subject, TypeInfo};
use crate::value::{Element, Structural};

pub(crate) struct TupleStrategy {
    info: TypeInfo,
    arity: usize,
}

impl TupleStrategy {
    pub(crate) fn new(info: TypeInfo, arity: usize) -> Self {
        Self { info, arity }
    }

    fn slots<'a>(&self, x: Subject<'a>) -> Result<Vec<&'a dyn Structural>> {
        let slots = x
            .value("a tuple")?
            .tuple_slots()
            .ok_or_else(|| self.info.shape_error("a tuple"))?;
        if slots.len() != self.arity {
            return Err(self.info.shape_error("a tuple of the declared arity"));
        }
        Ok(slots)
    }
}

impl AcyclicStrategy for TupleStrategy {
    fn info(&self) -> &TypeInfo {
        &self.info
    }

    fn equals_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        y: Subject<'_>,
        guard: &PairGuard,
    ) -> Result<bool> {
        let (a, b) = (self.slots(x)?, self.slots(y)?);
        for (p, q) in a.into_iter().zip(b) {
            if !engine.equals_element(&Element::Borrowed(p), &Element::Borrowed(q), guard)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64> {
        let mut h = HashCombiner::new(self.arity as u64);
        for slot in self.slots(x)? {
            h.add(engine.hash_element(&Element::Borrowed(slot), guard)?);
        }
        Ok(h.finish())
    }

    fn represent_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        let parts = self
            .slots(x)?
            .into_iter()
            .map(|slot| engine.represent_element(&Element::Borrowed(slot), guard))
            .collect::<Result<Vec<_>>>()?;
        if parts.len() == 1 {
            Ok(format!("({},)", parts[0]))
        } else {
            Ok(format!("({})", parts.join(", ")))
        }
    }

    fn qualifies_representation(&self) -> bool {
        false
    }
}

/// Key/value pairs, including the entries yielded by map-like sequences.
pub(crate) struct PairStrategy {
    info: TypeInfo,
}

impl PairStrategy {
    pub(crate) fn new(info: TypeInfo) -> Self {
        Self { info }
    }

    fn halves<'a>(&self, x: Subject<'a>) -> Result<(&'a dyn Structural, &'a dyn Structural)> {
        match x {
            Subject::Entry(key, value) => Ok((key, value)),
            Subject::Value(v) => v.pair_slots().ok_or_else(|| self.info.shape_error("a pair")),
        }
    }
}

impl AcyclicStrategy for PairStrategy {
    fn info(&self) -> &TypeInfo {
        &self.info
    }

    fn equals_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        y: Subject<'_>,
        guard: &PairGuard,
    ) -> Result<bool> {
        let ((k1, v1), (k2, v2)) = (self.halves(x)?, self.halves(y)?);
        Ok(
            engine.equals_element(&Element::Borrowed(k1), &Element::Borrowed(k2), guard)?
                && engine.equals_element(&Element::Borrowed(v1), &Element::Borrowed(v2), guard)?,
        )
    }

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64> {
        let (k, v) = self.halves(x)?;
        Ok(HashCombiner::new(2)
            .combine(engine.hash_element(&Element::Borrowed(k), guard)?)
            .combine(engine.hash_element(&Element::Borrowed(v), guard)?)
            .finish())
    }

    fn represent_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        let (k, v) = self.halves(x)?;
        Ok(format!(
            "[{}, {}]",
            engine.represent_element(&Element::Borrowed(k), guard)?,
            engine.represent_element(&Element::Borrowed(v), guard)?
        ))
    }

    fn qualifies_representation(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Engine;
    use crate::strategy::StrategyKind;
    use std::collections::BTreeMap;

    #[test]
    fn tuples_compare_slot_by_slot() {
        let e = Engine::new();
        assert!(e.equals(&(1, "a", 2.5f64), &(1, "a", 2.5f64)).unwrap());
        assert!(!e.equals(&(1, "a"), &(1, "b")).unwrap());
        assert_ne!(e.hash(&(1, 2)).unwrap(), e.hash(&(2, 1)).unwrap());
        assert_eq!(e.strategy_kind(&(1, 2)).unwrap(), Some(StrategyKind::Tuple));
    }

    #[test]
    fn tuples_render_with_parentheses() {
        let e = Engine::new();
        assert_eq!(e.represent(&(7u8,)).unwrap(), "(7,)");
        assert_eq!(e.represent(&(1, vec![2, 3])).unwrap(), "(1, Vec<i32> { 2, 3 })");
    }

    #[test]
    fn map_entries_are_pairs() {
        let e = Engine::new();
        let mut a = BTreeMap::new();
        a.insert("k".to_string(), 1);
        a.insert("j".to_string(), 2);
        let mut b = a.clone();
        assert!(e.equals(&a, &b).unwrap());
        assert_eq!(e.hash(&a).unwrap(), e.hash(&b).unwrap());
        b.insert("k".to_string(), 3);
        assert!(!e.equals(&a, &b).unwrap());
        assert_eq!(
            e.represent(&a).unwrap(),
            "BTreeMap<String, i32> { [\"j\", 2], [\"k\", 1] }"
        );
    }
}
