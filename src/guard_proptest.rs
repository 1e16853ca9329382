#![cfg(test)]

// Property tests for RecursionGuard kept inside the crate so frames can be
// held and released in arbitrary order.

use crate::guard::{ActiveFrame, Identity, PairKey, RecursionGuard};
use proptest::prelude::*;
use std::collections::BTreeSet;

// Keys come from a small pool so re-entry of an active key is common.
#[derive(Clone, Debug)]
enum Op {
    Enter(u8),
    Release(usize),
    Check(u8),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (0u8..6).prop_map(Op::Enter),
        any::<usize>().prop_map(Op::Release),
        (0u8..6).prop_map(Op::Check),
    ];
    proptest::collection::vec(op, 1..80)
}

// Property: State-machine equivalence against a BTreeSet of active keys.
// Invariants exercised across random operation sequences:
// - `enter` succeeds exactly when the key is not active, and marks it active.
// - Dropping a frame deactivates only its own key, in any drop order.
// - `is_active`/`depth` parity with the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_guard_state_machine(ops in arb_ops()) {
        let guard: RecursionGuard<u8> = RecursionGuard::new();
        let mut frames: Vec<(u8, ActiveFrame<'_, u8>)> = Vec::new();
        let mut model: BTreeSet<u8> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Enter(k) => {
                    let was_active = model.contains(&k);
                    match guard.enter(k) {
                        Some(frame) => {
                            prop_assert!(!was_active, "entered a key that was already active");
                            model.insert(k);
                            frames.push((k, frame));
                        }
                        None => prop_assert!(was_active, "refused a key that was not active"),
                    }
                }
                Op::Release(i) => {
                    if !frames.is_empty() {
                        let (k, frame) = frames.remove(i % frames.len());
                        drop(frame);
                        model.remove(&k);
                    }
                }
                Op::Check(k) => {
                    prop_assert_eq!(guard.is_active(&k), model.contains(&k));
                }
            }
            prop_assert_eq!(guard.depth(), model.len());
        }

        drop(frames);
        prop_assert_eq!(guard.depth(), 0);
    }
}

// Property: pair keys ignore operand order and nothing else.
proptest! {
    #[test]
    fn prop_pair_key_is_symmetric(a in any::<usize>(), b in any::<usize>(), c in any::<usize>()) {
        let id = |addr| Identity::from_parts(addr, core::any::TypeId::of::<u8>());
        prop_assert_eq!(PairKey::new(id(a), id(b)), PairKey::new(id(b), id(a)));
        if c != a && c != b {
            prop_assert_ne!(PairKey::new(id(a), id(b)), PairKey::new(id(a), id(c)));
        }
    }
}
