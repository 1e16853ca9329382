//! Scalars: native equality, hash and formatting.

use crate::engine::Engine;
use crate::error::Result;
use crate::guard::{PairGuard, VisitGuard};
use crate::strategy::{AcyclicStrategy, Subject, TypeInfo};
use crate::value::PlainValue;

pub(crate) struct PlainStrategy {
    info: TypeInfo,
}

impl PlainStrategy {
    pub(crate) fn new(info: TypeInfo) -> Self {
        Self { info }
    }

    fn plain<'a>(&self, x: Subject<'a>) -> Result<&'a dyn PlainValue> {
        x.value("a scalar")?
            .as_plain()
            .ok_or_else(|| self.info.shape_error("a scalar"))
    }
}

impl AcyclicStrategy for PlainStrategy {
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
        Ok(self.plain(x)?.plain_eq(self.plain(y)?))
    }

    fn hash_core(&self, _engine: &Engine, x: Subject<'_>, _guard: &VisitGuard) -> Result<u64> {
        Ok(self.plain(x)?.plain_hash())
    }

    fn represent_core(
        &self,
        _engine: &Engine,
        x: Subject<'_>,
        _guard: &VisitGuard,
    ) -> Result<String> {
        Ok(self.plain(x)?.plain_repr())
    }

    fn is_composite(&self) -> bool {
        false
    }

    fn qualifies_representation(&self) -> bool {
        false
    }
}
