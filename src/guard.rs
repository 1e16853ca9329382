//! Recursion guard for cycle-safe traversal.
//!
//! Single-threaded set of the identities (or identity pairs) that are active
//! ancestors of the current traversal. Entering returns an RAII frame that
//! removes the key again when dropped, so a value can be revisited through a
//! different path once its subtree has finished. Entering a key that is
//! already active fails, which is how callers detect a cycle.
//!
//! The guard also tracks how many composite values enclose the current one
//! (`nest`) and remembers results already computed for a key at a given
//! nesting (`settle`). Hashing is bounded by the former and memoized by the
//! latter.

use core::any::TypeId;
use core::cell::{Cell, RefCell};
use core::hash::Hash;
use core::marker::PhantomData;
use hashbrown::{HashMap, HashSet};

/// Reference identity of a shared allocation.
///
/// The pointee `TypeId` keeps zero-sized allocations of different types
/// apart even when they share an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    addr: usize,
    ty: TypeId,
}

impl Identity {
    pub fn of<T: ?Sized + 'static>(ptr: *const T) -> Self {
        Self {
            addr: ptr.cast::<()>() as usize,
            ty: TypeId::of::<T>(),
        }
    }

    /// Identity of a value known only through a trait object; `ty` is the
    /// concrete type behind it.
    pub fn from_parts(addr: usize, ty: TypeId) -> Self {
        Self { addr, ty }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }
}

/// Unordered pair of identities; `(a, b)` and `(b, a)` are the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey(Identity, Identity);

impl PairKey {
    pub fn new(a: Identity, b: Identity) -> Self {
        if a <= b {
            PairKey(a, b)
        } else {
            PairKey(b, a)
        }
    }
}

/// Set of active ancestor keys for one top-level call.
#[derive(Debug)]
pub struct RecursionGuard<K> {
    active: RefCell<HashSet<K>>,
    nesting: Cell<usize>,
    settled: RefCell<HashMap<(K, usize), u64>>,
    // A guard belongs to exactly one call tree; keep it !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

/// Guard used by equality: active operand pairs.
pub type PairGuard = RecursionGuard<PairKey>;

/// Guard used by hashing and rendering: active identities.
pub type VisitGuard = RecursionGuard<Identity>;

impl<K> RecursionGuard<K>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            active: RefCell::new(HashSet::new()),
            nesting: Cell::new(0),
            settled: RefCell::new(HashMap::new()),
            _nosend: PhantomData,
        }
    }

    /// Mark `key` active. Returns `None` when it already is, i.e. the
    /// traversal has come back around to one of its own ancestors.
    #[inline]
    pub fn enter(&self, key: K) -> Option<ActiveFrame<'_, K>> {
        if self.active.borrow_mut().insert(key) {
            Some(ActiveFrame { owner: self, key })
        } else {
            None
        }
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.active.borrow().contains(key)
    }

    /// Number of keys currently active.
    pub fn depth(&self) -> usize {
        self.active.borrow().len()
    }

    /// Number of `nest` frames currently open.
    pub fn nesting(&self) -> usize {
        self.nesting.get()
    }

    /// Open one nesting level; it closes when the frame is dropped.
    #[inline]
    pub fn nest(&self) -> NestFrame<'_, K> {
        self.nesting.set(self.nesting.get() + 1);
        NestFrame { owner: self }
    }

    /// Result recorded for `key` at `nesting`, if any.
    pub fn settled(&self, key: K, nesting: usize) -> Option<u64> {
        self.settled.borrow().get(&(key, nesting)).copied()
    }

    pub fn settle(&self, key: K, nesting: usize, value: u64) {
        self.settled.borrow_mut().insert((key, nesting), value);
    }
}

impl<K> Default for RecursionGuard<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// RAII frame returned by `RecursionGuard::enter`.
pub struct ActiveFrame<'a, K>
where
    K: Copy + Eq + Hash,
{
    owner: &'a RecursionGuard<K>,
    key: K,
}

impl<'a, K> Drop for ActiveFrame<'a, K>
where
    K: Copy + Eq + Hash,
{
    fn drop(&mut self) {
        let removed = self.owner.active.borrow_mut().remove(&self.key);
        debug_assert!(removed, "active frame outlived its guard entry");
    }
}

/// RAII frame returned by `RecursionGuard::nest`.
pub struct NestFrame<'a, K> {
    owner: &'a RecursionGuard<K>,
}

impl<'a, K> Drop for NestFrame<'a, K> {
    fn drop(&mut self) {
        let n = self.owner.nesting.get();
        debug_assert!(n > 0, "nest frame closed twice");
        self.owner.nesting.set(n.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn enter_and_exit_is_ok() {
        let g: RecursionGuard<u32> = RecursionGuard::new();
        {
            let _f = g.enter(7).expect("first entry");
            assert!(g.is_active(&7));
            assert_eq!(g.depth(), 1);
        }
        assert!(!g.is_active(&7));
        assert_eq!(g.depth(), 0);
    }

    #[test]
    fn reentry_of_active_key_is_refused() {
        let g: RecursionGuard<u32> = RecursionGuard::new();
        let _outer = g.enter(1).expect("outer");
        assert!(g.enter(1).is_none());
        // Unrelated keys nest freely.
        let _inner = g.enter(2).expect("inner");
        assert_eq!(g.depth(), 2);
    }

    #[test]
    fn key_can_be_reentered_after_its_frame_ends() {
        let g: RecursionGuard<u32> = RecursionGuard::new();
        drop(g.enter(3).expect("first visit"));
        assert!(g.enter(3).is_some(), "finished subtrees are not remembered");
    }

    #[test]
    fn nesting_follows_open_frames() {
        let g: RecursionGuard<u32> = RecursionGuard::new();
        let outer = g.nest();
        {
            let _inner = g.nest();
            assert_eq!(g.nesting(), 2);
        }
        assert_eq!(g.nesting(), 1);
        drop(outer);
        assert_eq!(g.nesting(), 0);
        assert_eq!(g.depth(), 0, "nesting does not mark keys active");
    }

    #[test]
    fn settled_results_are_per_nesting() {
        let g: RecursionGuard<u32> = RecursionGuard::new();
        g.settle(4, 1, 99);
        assert_eq!(g.settled(4, 1), Some(99));
        assert_eq!(g.settled(4, 2), None);
        assert_eq!(g.settled(5, 1), None);
    }

    #[test]
    fn pair_keys_are_unordered() {
        let a = Rc::new(1u8);
        let b = Rc::new(2u8);
        let ia = Identity::of(Rc::as_ptr(&a));
        let ib = Identity::of(Rc::as_ptr(&b));
        assert_eq!(PairKey::new(ia, ib), PairKey::new(ib, ia));
        assert_ne!(PairKey::new(ia, ia), PairKey::new(ia, ib));
    }

    #[test]
    fn identity_separates_types_at_one_address() {
        let x = 5u64;
        let p = &x as *const u64;
        assert_ne!(Identity::of(p), Identity::of(p.cast::<u32>()));
        assert_eq!(Identity::of(p).addr(), p as usize);
    }
}
