//! Arrays: rectangular (any rank, any lower bounds), flat, and pointer.
//!
//! Elements are addressed by row-major offset, which for `RectArray` and all
//! flat arrays is also the storage order. Visiting offsets `0..n` therefore
//! visits index tuples in row-major order.

use crate::descriptor::Dimensions;
use crate::engine::Engine;
use crate::error::Result;
use crate::guard::{PairGuard, VisitGuard};
use crate::hashing::HashCombiner;
use crate::strategy::{AcyclicStrategy, Subject, TypeInfo};
use crate::value::{ArrayAccess, Element};

fn array<'a>(info: &TypeInfo, x: Subject<'a>) -> Result<&'a dyn ArrayAccess> {
    x.value("an array")?
        .as_array()
        .ok_or_else(|| info.shape_error("an array"))
}

fn element_count(dims: &Dimensions) -> usize {
    dims.iter().map(|d| d.len).product()
}

fn hash_dimensions(dims: &Dimensions) -> HashCombiner {
    let mut h = HashCombiner::new(dims.len() as u64);
    for d in dims {
        h.add(d.lower as u64);
        h.add(d.len as u64);
    }
    h
}

/// Element-wise comparison over `count` row-major positions.
fn equal_items(
    engine: &Engine,
    a: &dyn ArrayAccess,
    b: &dyn ArrayAccess,
    count: usize,
    guard: &PairGuard,
) -> Result<bool> {
    for offset in 0..count {
        let x = Element::Borrowed(a.item(offset));
        let y = Element::Borrowed(b.item(offset));
        if !engine.equals_element(&x, &y, guard)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn hash_items(
    engine: &Engine,
    a: &dyn ArrayAccess,
    mut h: HashCombiner,
    count: usize,
    guard: &VisitGuard,
) -> Result<u64> {
    for offset in 0..count {
        h.add(engine.hash_element(&Element::Borrowed(a.item(offset)), guard)?);
    }
    Ok(h.finish())
}

fn braces(parts: Vec<String>) -> String {
    if parts.is_empty() {
        "{ }".to_string()
    } else {
        format!("{{ {} }}", parts.join(", "))
    }
}

/// Renders dimension `dim` onwards, starting at row-major `offset`. `leaf`
/// renders the slot at a row-major offset.
fn render_nested(
    dims: &Dimensions,
    dim: usize,
    offset: usize,
    leaf: &mut dyn FnMut(usize) -> Result<String>,
) -> Result<String> {
    let Some(current) = dims.get(dim) else {
        return Ok(braces(Vec::new()));
    };
    let stride: usize = dims[dim + 1..].iter().map(|d| d.len).product();
    let mut parts = Vec::with_capacity(current.len);
    for i in 0..current.len {
        let at = offset + i * stride;
        if dim + 1 == dims.len() {
            parts.push(leaf(at)?);
        } else {
            parts.push(render_nested(dims, dim + 1, at, leaf)?);
        }
    }
    Ok(braces(parts))
}

pub(crate) struct RectangularArrayStrategy {
    info: TypeInfo,
    rank: usize,
}

impl RectangularArrayStrategy {
    pub(crate) fn new(info: TypeInfo, rank: usize) -> Self {
        Self { info, rank }
    }
}

impl AcyclicStrategy for RectangularArrayStrategy {
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
        let (a, b) = (array(&self.info, x)?, array(&self.info, y)?);
        let (da, db) = (a.dimensions(), b.dimensions());
        // Rank, then every lower bound and length.
        if da.len() != db.len() || da != db {
            return Ok(false);
        }
        debug_assert_eq!(da.len(), self.rank);
        equal_items(engine, a, b, element_count(&da), guard)
    }

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64> {
        let a = array(&self.info, x)?;
        let dims = a.dimensions();
        hash_items(engine, a, hash_dimensions(&dims), element_count(&dims), guard)
    }

    fn represent_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        let a = array(&self.info, x)?;
        render_nested(&a.dimensions(), 0, 0, &mut |at| {
            engine.represent_element(&Element::Borrowed(a.item(at)), guard)
        })
    }
}

/// Single-dimension zero-based arrays. Same results as the rectangular
/// routine at rank 1 without the per-dimension bookkeeping.
pub(crate) struct FlatArrayStrategy {
    info: TypeInfo,
}

impl FlatArrayStrategy {
    pub(crate) fn new(info: TypeInfo) -> Self {
        Self { info }
    }
}

fn flat_len(a: &dyn ArrayAccess) -> usize {
    a.dimensions().first().map_or(0, |d| d.len)
}

impl AcyclicStrategy for FlatArrayStrategy {
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
        let (a, b) = (array(&self.info, x)?, array(&self.info, y)?);
        let len = flat_len(a);
        if len != flat_len(b) {
            return Ok(false);
        }
        equal_items(engine, a, b, len, guard)
    }

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64> {
        let a = array(&self.info, x)?;
        let len = flat_len(a);
        let seed = HashCombiner::new(1).combine(0).combine(len as u64);
        hash_items(engine, a, seed, len, guard)
    }

    fn represent_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        let a = array(&self.info, x)?;
        let parts = (0..flat_len(a))
            .map(|i| engine.represent_element(&Element::Borrowed(a.item(i)), guard))
            .collect::<Result<Vec<_>>>()?;
        Ok(braces(parts))
    }
}

/// Arrays of raw addresses. Slots are compared and hashed by the address
/// they hold; nothing is ever dereferenced.
pub(crate) struct PointerArrayStrategy {
    info: TypeInfo,
}

impl PointerArrayStrategy {
    pub(crate) fn new(info: TypeInfo) -> Self {
        Self { info }
    }

    fn slots(&self, x: Subject<'_>) -> Result<(Dimensions, Vec<usize>)> {
        let value = x.value("a pointer array")?;
        let dims = value
            .as_array()
            .ok_or_else(|| self.info.shape_error("a pointer array"))?
            .dimensions();
        let slots = value
            .pointer_slots()
            .ok_or_else(|| self.info.shape_error("a pointer array"))?;
        Ok((dims, slots))
    }
}

impl AcyclicStrategy for PointerArrayStrategy {
    fn info(&self) -> &TypeInfo {
        &self.info
    }

    fn equals_core(
        &self,
        _engine: &Engine,
        x: Subject<'_>,
        y: Subject<'_>,
        _guard: &PairGuard,
    ) -> Result<bool> {
        let (da, sa) = self.slots(x)?;
        let (db, sb) = self.slots(y)?;
        Ok(da == db && sa == sb)
    }

    fn hash_core(&self, _engine: &Engine, x: Subject<'_>, _guard: &VisitGuard) -> Result<u64> {
        let (dims, slots) = self.slots(x)?;
        let mut h = hash_dimensions(&dims);
        for addr in slots {
            h.add(addr as u64);
        }
        Ok(h.finish())
    }

    fn represent_core(
        &self,
        _engine: &Engine,
        x: Subject<'_>,
        _guard: &VisitGuard,
    ) -> Result<String> {
        let (dims, slots) = self.slots(x)?;
        render_nested(&dims, 0, 0, &mut |at| {
            slots
                .get(at)
                .map(|addr| format!("{:#x}", addr))
                .ok_or_else(|| self.info.shape_error("a pointer array"))
        })
    }
}
