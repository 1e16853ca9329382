//! Sequences: ordered lockstep comparison, and the unordered (bag) variant.

use crate::engine::Engine;
use crate::error::Result;
use crate::guard::{PairGuard, VisitGuard};
use crate::hashing::HashCombiner;
use crate::strategy::{AcyclicStrategy, Subject, TypeInfo};
use crate::value::{Element, SequenceAccess};

fn sequence<'a>(info: &TypeInfo, x: Subject<'a>) -> Result<&'a dyn SequenceAccess> {
    x.value("a sequence")?
        .as_sequence()
        .ok_or_else(|| info.shape_error("a sequence"))
}

fn render_items(engine: &Engine, s: &dyn SequenceAccess, guard: &VisitGuard) -> Result<String> {
    let parts = s
        .items()
        .map(|item| engine.represent_element(&item, guard))
        .collect::<Result<Vec<_>>>()?;
    if parts.is_empty() {
        Ok("{ }".to_string())
    } else {
        Ok(format!("{{ {} }}", parts.join(", ")))
    }
}

/// Known-different fast lengths, when the short circuit is enabled.
fn lengths_differ(engine: &Engine, a: &dyn SequenceAccess, b: &dyn SequenceAccess) -> bool {
    if !engine.config().sequence_length_short_circuit {
        return false;
    }
    matches!((a.fast_len(), b.fast_len()), (Some(m), Some(n)) if m != n)
}

pub(crate) struct SequenceStrategy {
    info: TypeInfo,
}

impl SequenceStrategy {
    pub(crate) fn new(info: TypeInfo) -> Self {
        Self { info }
    }
}

impl AcyclicStrategy for SequenceStrategy {
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
        let (a, b) = (sequence(&self.info, x)?, sequence(&self.info, y)?);
        if lengths_differ(engine, a, b) {
            return Ok(false);
        }
        let (mut left, mut right) = (a.items(), b.items());
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ok(true),
                (Some(p), Some(q)) => {
                    if !engine.equals_element(&p, &q, guard)? {
                        return Ok(false);
                    }
                }
                _ => return Ok(false),
            }
        }
    }

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64> {
        let s = sequence(&self.info, x)?;
        let mut h = HashCombiner::new(0);
        let mut count = 0u64;
        for item in s.items() {
            h.add(engine.hash_element(&item, guard)?);
            count += 1;
        }
        Ok(h.combine(count).finish())
    }

    fn represent_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        render_items(engine, sequence(&self.info, x)?, guard)
    }
}

/// Multiset semantics: equal when the items can be paired off one to one.
///
/// Matching is greedy and quadratic in the item count. Rendering keeps
/// iteration order, so equal bags may render differently.
pub(crate) struct UnorderedStrategy {
    info: TypeInfo,
}

impl UnorderedStrategy {
    pub(crate) fn new(info: TypeInfo) -> Self {
        Self { info }
    }
}

impl AcyclicStrategy for UnorderedStrategy {
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
        let (a, b) = (sequence(&self.info, x)?, sequence(&self.info, y)?);
        if lengths_differ(engine, a, b) {
            return Ok(false);
        }
        let left: Vec<Element<'_>> = a.items().collect();
        let right: Vec<Element<'_>> = b.items().collect();
        if left.len() != right.len() {
            return Ok(false);
        }
        let mut used = vec![false; right.len()];
        'outer: for p in &left {
            for (j, q) in right.iter().enumerate() {
                if !used[j] && engine.equals_element(p, q, guard)? {
                    used[j] = true;
                    continue 'outer;
                }
            }
            return Ok(false);
        }
        Ok(true)
    }

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64> {
        let s = sequence(&self.info, x)?;
        let mut sum = 0u64;
        let mut count = 0u64;
        for item in s.items() {
            sum = sum.wrapping_add(engine.hash_element(&item, guard)?);
            count += 1;
        }
        Ok(HashCombiner::new(sum).combine(count).finish())
    }

    fn represent_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        render_items(engine, sequence(&self.info, x)?, guard)
    }
}
