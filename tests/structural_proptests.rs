// Structural engine property tests (consolidated).
//
// Property 1: agreement with native equality on acyclic std values.
//  - Model: `PartialEq` of the same values (no floats, so it is an
//    equivalence).
//  - Invariant: structural_equals(a, b) == (a == b), and equal values hash
//    equal.
//
// Property 2: reflexivity and symmetry on generated trees with shared
// `Rc` children.
//  - Invariant: equals(t, t) and equals(a, b) == equals(b, a).
//
// Property 3: deep clones.
//  - Invariant: a deep clone is structurally equal and hashes equal, while
//    no `Rc` in the clone is pointer-equal to one in the source.
//
// Property 4: bags.
//  - Invariant: any permutation of a vector wrapped in `Unordered` is equal
//    to the original and hashes equal.
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::rc::Rc;
use structural_eq::{structural_equals, structural_hash, structural_record, Unordered};

type Doc = Vec<(String, BTreeMap<u8, Vec<i64>>)>;

fn arb_doc() -> impl Strategy<Value = Doc> {
    let entry = (
        "[a-c]{0,2}",
        proptest::collection::btree_map(0u8..4, proptest::collection::vec(-3i64..3, 0..3), 0..3),
    );
    proptest::collection::vec(entry, 0..4)
}

// Property 1: agreement with native equality.
proptest! {
    #[test]
    fn prop_agrees_with_native_equality(a in arb_doc(), b in arb_doc()) {
        let eq = structural_equals(&a, &b).unwrap();
        prop_assert_eq!(eq, a == b);
        if eq {
            prop_assert_eq!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
        }
        prop_assert!(structural_equals(&a, &a.clone()).unwrap());
    }
}

#[derive(Debug)]
struct Tree {
    label: u8,
    children: Vec<Rc<Tree>>,
}
structural_record!(Tree { label, children });

fn arb_tree() -> impl Strategy<Value = Rc<Tree>> {
    let leaf = (0u8..3).prop_map(|label| {
        Rc::new(Tree {
            label,
            children: Vec::new(),
        })
    });
    leaf.prop_recursive(4, 32, 3, |inner| {
        (0u8..3, proptest::collection::vec(inner, 0..3)).prop_map(|(label, mut children)| {
            // Share one subtree to exercise repeated identities.
            if let Some(first) = children.first().cloned() {
                children.push(first);
            }
            Rc::new(Tree { label, children })
        })
    })
}

fn deep_clone(t: &Rc<Tree>) -> Rc<Tree> {
    Rc::new(Tree {
        label: t.label,
        children: t.children.iter().map(deep_clone).collect(),
    })
}

fn all_nodes(t: &Rc<Tree>, out: &mut Vec<*const Tree>) {
    out.push(Rc::as_ptr(t));
    for c in &t.children {
        all_nodes(c, out);
    }
}

// Property 2: reflexivity and symmetry.
proptest! {
    #[test]
    fn prop_reflexive_and_symmetric(a in arb_tree(), b in arb_tree()) {
        prop_assert!(structural_equals(&a, &a).unwrap());
        let ab = structural_equals(&a, &b).unwrap();
        let ba = structural_equals(&b, &a).unwrap();
        prop_assert_eq!(ab, ba);
        if ab {
            prop_assert_eq!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
        }
    }
}

// Property 3: deep clones are equal and share nothing.
proptest! {
    #[test]
    fn prop_deep_clone(t in arb_tree()) {
        let c = deep_clone(&t);
        prop_assert!(structural_equals(&t, &c).unwrap());
        prop_assert_eq!(structural_hash(&t).unwrap(), structural_hash(&c).unwrap());

        let (mut src, mut dst) = (Vec::new(), Vec::new());
        all_nodes(&t, &mut src);
        all_nodes(&c, &mut dst);
        prop_assert!(dst.iter().all(|p| !src.contains(p)));
    }
}

// Property 4: bags ignore order.
proptest! {
    #[test]
    fn prop_unordered_permutations((v, shuffled) in proptest::collection::vec(0u8..5, 0..12)
        .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())))
    {
        let (a, b) = (Unordered::new(v), Unordered::new(shuffled));
        prop_assert!(structural_equals(&a, &b).unwrap());
        prop_assert_eq!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
    }
}
