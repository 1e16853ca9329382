//! Records: comparison over the declared members, in declaration order.

use crate::engine::Engine;
use crate::error::Result;
use crate::guard::{PairGuard, VisitGuard};
use crate::hashing::HashCombiner;
use crate::strategy::{AcyclicStrategy, Subject, TypeInfo};
use crate::value::Structural;

pub(crate) struct MemberStrategy {
    info: TypeInfo,
    members: &'static [&'static str],
}

impl MemberStrategy {
    pub(crate) fn new(info: TypeInfo, members: &'static [&'static str]) -> Self {
        Self { info, members }
    }

    fn record<'a>(&self, x: Subject<'a>) -> Result<&'a dyn Structural> {
        x.value("a record")
    }
}

impl AcyclicStrategy for MemberStrategy {
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
        let (a, b) = (self.record(x)?, self.record(y)?);
        for index in 0..self.members.len() {
            if !engine.equals_element(&a.member(index)?, &b.member(index)?, guard)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn hash_core(&self, engine: &Engine, x: Subject<'_>, guard: &VisitGuard) -> Result<u64> {
        let a = self.record(x)?;
        let mut h = HashCombiner::new(self.members.len() as u64);
        for index in 0..self.members.len() {
            h.add(engine.hash_element(&a.member(index)?, guard)?);
        }
        Ok(h.finish())
    }

    fn represent_core(
        &self,
        engine: &Engine,
        x: Subject<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        let a = self.record(x)?;
        if self.members.is_empty() {
            return Ok("{ }".to_string());
        }
        let mut parts = Vec::with_capacity(self.members.len());
        for (index, name) in self.members.iter().enumerate() {
            let value = engine.represent_element(&a.member(index)?, guard)?;
            parts.push(format!("{} = {}", name, value));
        }
        Ok(format!("{{ {} }}", parts.join(", ")))
    }
}
