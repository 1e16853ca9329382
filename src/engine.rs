//! Facade: the `equals` / `hash` / `represent` entry points.
//!
//! Each top-level call creates its own recursion guard. Nested values come
//! back here from the strategies as `Element`s; the engine resolves handles
//! down to the concrete value, looks up its strategy and re-enters the
//! guarded wrapper.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::guard::{Identity, PairGuard, VisitGuard};
use crate::hashing::NULL_HASH;
use crate::registry::StrategyRegistry;
use crate::strategy::{Operand, StrategyKind, Subject};
use crate::value::{Element, Pointee, Structural};
use once_cell::sync::Lazy;

/// Owns the strategy registry and the configuration. `Send + Sync`; share
/// one engine between threads rather than building one per call.
#[derive(Default)]
pub struct Engine {
    registry: StrategyRegistry,
    config: EngineConfig,
}

static GLOBAL: Lazy<Engine> = Lazy::new(Engine::new);

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: StrategyRegistry::new(),
            config,
        }
    }

    /// Process-wide engine with the default configuration, built on first
    /// use. Backs the `structural_*` free functions.
    pub fn global() -> &'static Engine {
        &GLOBAL
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Deep equality of two values.
    pub fn equals(&self, a: &dyn Structural, b: &dyn Structural) -> Result<bool> {
        let guard = PairGuard::new();
        self.equals_element(&Element::Borrowed(a), &Element::Borrowed(b), &guard)
    }

    /// Hash consistent with `equals`.
    pub fn hash(&self, value: &dyn Structural) -> Result<u64> {
        let guard = VisitGuard::new();
        self.hash_element(&Element::Borrowed(value), &guard)
    }

    /// Diagnostic rendering of the value's structure.
    pub fn represent(&self, value: &dyn Structural) -> Result<String> {
        let guard = VisitGuard::new();
        self.represent_element(&Element::Borrowed(value), &guard)
    }

    /// Strategy the value is handled by, after resolving handles. `None`
    /// for a null handle.
    pub fn strategy_kind(&self, value: &dyn Structural) -> Result<Option<StrategyKind>> {
        resolve(&Element::Borrowed(value), |operand| {
            Ok(operand.map(|op| self.registry.strategy_for(op.subject).kind()))
        })
    }

    pub(crate) fn equals_element(
        &self,
        a: &Element<'_>,
        b: &Element<'_>,
        guard: &PairGuard,
    ) -> Result<bool> {
        resolve(a, |x| {
            resolve(b, |y| match (x, y) {
                (None, None) => Ok(true),
                (None, Some(_)) | (Some(_), None) => Ok(false),
                (Some(x), Some(y)) => {
                    let strategy = self.registry.strategy_for(x.subject);
                    strategy.as_dyn().equals_guarded(self, x, y, guard)
                }
            })
        })
    }

    pub(crate) fn hash_element(&self, value: &Element<'_>, guard: &VisitGuard) -> Result<u64> {
        resolve(value, |x| match x {
            None => Ok(NULL_HASH),
            Some(x) => {
                let strategy = self.registry.strategy_for(x.subject);
                strategy.as_dyn().hash_guarded(self, x, guard)
            }
        })
    }

    pub(crate) fn represent_element(
        &self,
        value: &Element<'_>,
        guard: &VisitGuard,
    ) -> Result<String> {
        resolve(value, |x| match x {
            None => Ok(self.config.null_placeholder.clone()),
            Some(x) => {
                let strategy = self.registry.strategy_for(x.subject);
                strategy.as_dyn().represent_guarded(self, x, guard)
            }
        })
    }
}

/// Structural equality using the process-wide engine.
pub fn structural_equals(a: &dyn Structural, b: &dyn Structural) -> Result<bool> {
    Engine::global().equals(a, b)
}

/// Structural hash using the process-wide engine.
pub fn structural_hash(value: &dyn Structural) -> Result<u64> {
    Engine::global().hash(value)
}

/// Structural rendering using the process-wide engine.
pub fn structural_represent(value: &dyn Structural) -> Result<String> {
    Engine::global().represent(value)
}

/// Resolves an element to its concrete operand (`None` for null) and runs
/// `f` on it while any borrows taken on the way are still held.
fn resolve<R, F>(element: &Element<'_>, f: F) -> Result<R>
where
    F: for<'r> FnOnce(Option<Operand<'r>>) -> Result<R>,
{
    match element {
        Element::Borrowed(v) => chase(*v, None, f),
        Element::Owned(v) => chase(v.as_ref(), None, f),
        Element::Entry(k, v) => f(Some(Operand {
            subject: Subject::Entry(*k, *v),
            identity: None,
        })),
    }
}

/// Follows handles until a concrete value or null. The identity recorded is
/// that of the outermost shared handle on the chain.
fn chase<R, F>(value: &dyn Structural, identity: Option<Identity>, f: F) -> Result<R>
where
    F: for<'r> FnOnce(Option<Operand<'r>>) -> Result<R>,
{
    let pointee = match value.pointee() {
        None => {
            return f(Some(Operand {
                subject: Subject::Value(value),
                identity,
            }))
        }
        Some(pointee) => pointee?,
    };
    match pointee {
        Pointee::Null => f(None),
        Pointee::Inline(target) => chase(target, identity, f),
        Pointee::Shared {
            identity: id,
            target,
        } => chase(target, identity.or(Some(id)), f),
        Pointee::Guarded {
            identity: id,
            target,
        } => chase(&**target, identity.or(id), f),
    }
}
