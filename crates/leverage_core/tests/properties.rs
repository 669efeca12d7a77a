//! Property tests over targets, pods and combos.

use std::collections::BTreeSet;

use leverage_core::prelude::*;
use leverage_test_utils::determinism::strategies::{arb_stress, arb_suspicion_delta};
use leverage_test_utils::fixtures::{fact, target, with_children};
use proptest::prelude::*;

fn mark(max_stress: i32) -> Target {
    Target::from_data(&target("mark", 3, max_stress, &["a"], vec![fact("a", 5)])).unwrap()
}

proptest! {
    #[test]
    fn prop_suspicion_clamped(deltas in proptest::collection::vec(arb_suspicion_delta(), 0..50)) {
        let mut t = mark(100);
        for delta in deltas {
            t.add_suspicion(delta);
            prop_assert!((0..=100).contains(&t.suspicion()));
        }
    }

    #[test]
    fn prop_stress_never_decreases_without_therapy(amounts in proptest::collection::vec(arb_stress(), 0..50)) {
        let mut t = mark(300);
        let mut last = t.stress();
        for amount in amounts {
            t.add_stress(amount);
            prop_assert!(t.stress() >= last);
            last = t.stress();
        }
    }

    #[test]
    fn prop_defeat_is_final(amounts in proptest::collection::vec(1i32..80, 1..20)) {
        let mut t = mark(100);
        for amount in amounts {
            let was_active = t.is_active();
            let before = t.stress();
            let still_active = t.add_stress(amount);
            if !was_active {
                prop_assert_eq!(t.stress(), before);
                prop_assert!(!still_active);
            }
            if t.stress() >= t.max_stress() {
                prop_assert_eq!(t.state(), TargetState::Defeated);
            }
        }
    }

    #[test]
    fn prop_reachable_is_subset_and_terminates(edges in proptest::collection::vec((0usize..8, 0usize..8), 0..30)) {
        let names: Vec<String> = (0..8).map(|i| format!("f{i}")).collect();
        let facts = names
            .iter()
            .map(|name| {
                let children: Vec<&str> = edges
                    .iter()
                    .filter(|(from, _)| names[*from] == *name)
                    .map(|(_, to)| names[*to].as_str())
                    .collect();
                Fact::from_data(&with_children(fact(name, 1), &children))
            })
            .collect::<Vec<_>>();
        let pod = Pod::new("p", facts, vec!["f0".to_string()]).unwrap();

        let reachable = pod.reachable();
        prop_assert!(reachable.contains("f0"));
        prop_assert!(reachable.len() + pod.unreachable().len() == pod.len());
    }

    #[test]
    fn prop_combo_resolution_idempotent(known_mask in 0u8..16, scanned in 0usize..4) {
        let names = ["a", "b", "c", "d"];
        let facts: Vec<Fact> = names.iter().map(|n| Fact::from_data(&fact(n, 1))).collect();
        let mut pod = Pod::new("p", facts, vec!["a".to_string()]).unwrap();
        let mut combos = vec![
            Combo::new(["a".to_string(), "b".to_string()], "a", "ab", 10),
            Combo::new(["a".to_string(), "b".to_string(), "c".to_string()], "a", "abc", 20),
            Combo::new(["c".to_string(), "d".to_string()], "d", "cd", 30),
        ];
        let known: BTreeSet<String> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| known_mask & (1 << i) != 0)
            .map(|(_, n)| (*n).to_string())
            .collect();

        leverage_core::combo::resolve_combos(&mut pod, &mut combos, &known, names[scanned]);
        let after_first = pod.clone();
        let second = leverage_core::combo::resolve_combos(&mut pod, &mut combos, &known, names[scanned]);

        prop_assert!(second.is_empty());
        prop_assert_eq!(pod, after_first);
    }
}
