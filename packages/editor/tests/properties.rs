//! Property tests for reorder, condition and rollback invariants

use pageforge_editor::{
    Catalog, ComponentDescriptor, Condition, ConditionCatalogs, ConditionSet, EditorError, MutationLifecycle,
    Operation, OrderedList,
};
use proptest::prelude::*;

fn arb_list() -> impl Strategy<Value = OrderedList> {
    prop::collection::btree_set("[a-z]{1,6}", 1..12).prop_flat_map(|paths| {
        let paths: Vec<String> = paths.into_iter().collect();
        let len = paths.len();
        (Just(paths), prop::collection::vec(any::<bool>(), len)).prop_map(|(paths, sortable)| {
            OrderedList::new(
                paths
                    .into_iter()
                    .zip(sortable)
                    .map(|(p, s)| ComponentDescriptor::new(p, s))
                    .collect(),
            )
            .unwrap()
        })
    })
}

fn arb_list_with_indices() -> impl Strategy<Value = (OrderedList, usize, usize)> {
    arb_list().prop_flat_map(|list| {
        let len = list.len();
        (Just(list), 0..len, 0..len)
    })
}

fn catalogs() -> ConditionCatalogs {
    ConditionCatalogs::new(
        Catalog::scopes(),
        Catalog::devices(),
        Catalog::new(vec![
            Condition::new("x", "X"),
            Condition::new("y", "Y"),
            Condition::new("z", "Z"),
        ]),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
enum Choice {
    Scope(&'static str),
    Device(&'static str),
}

fn arb_choice() -> impl Strategy<Value = Choice> {
    prop_oneof![
        prop::sample::select(vec!["url", "route", "template", "site"]).prop_map(Choice::Scope),
        prop::sample::select(vec!["any", "mobile", "desktop"]).prop_map(Choice::Device),
    ]
}

fn sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys
}

fn keys(list: &OrderedList) -> Vec<String> {
    list.tree_paths().map(str::to_string).collect()
}

proptest! {
    #[test]
    fn move_preserves_length_and_keys((list, from, to) in arb_list_with_indices()) {
        let moved = list.move_item(from, to).unwrap();
        prop_assert_eq!(moved.len(), list.len());
        prop_assert_eq!(sorted(keys(&moved)), sorted(keys(&list)));
        prop_assert_eq!(moved.get(to), list.get(from));
    }

    #[test]
    fn move_out_of_range_fails((list, from, _to) in arb_list_with_indices(), extra in 0usize..5) {
        let len = list.len();
        prop_assert_eq!(
            list.move_item(from, len + extra),
            Err(EditorError::OutOfRange { index: len + extra, len })
        );
    }

    #[test]
    fn last_single_choice_wins(choices in prop::collection::vec(arb_choice(), 0..20)) {
        let catalogs = catalogs();
        let mut set = ConditionSet::initial(&catalogs);
        let mut scope = "url";
        let mut device = "any";

        for choice in &choices {
            set = match choice {
                Choice::Scope(id) => { scope = *id; set.set_scope(&catalogs, id).unwrap() }
                Choice::Device(id) => { device = *id; set.set_device(&catalogs, id).unwrap() }
            };
        }

        prop_assert_eq!(set.scope(), scope);
        prop_assert_eq!(set.device(), device);
        prop_assert!(!set.scope().is_empty());
        prop_assert!(!set.device().is_empty());
    }

    #[test]
    fn add_custom_is_idempotent(ids in prop::collection::vec(prop::sample::select(vec!["x", "y", "z"]), 0..10)) {
        let catalogs = catalogs();
        let mut set = ConditionSet::initial(&catalogs);
        for id in &ids {
            set = set.add_custom(&catalogs, id).unwrap();
        }
        for id in &ids {
            let again = set.add_custom(&catalogs, id).unwrap();
            prop_assert_eq!(&again, &set);
        }
        prop_assert_eq!(set.remove_custom("absent"), set.clone());
    }

    #[test]
    fn rejected_mutation_restores_committed(
        (list, from, to) in arb_list_with_indices(),
        moves in prop::collection::vec((0usize..32, 0usize..32), 0..6),
    ) {
        let mut lifecycle = MutationLifecycle::new(list);
        for (a, b) in moves {
            let _ = lifecycle.edit(|l| l.move_item(a % l.len(), b % l.len()));
        }
        let committed_before = lifecycle.committed().clone();

        let pending = lifecycle
            .begin(Operation::Save, |l| l.move_item(from, to))
            .unwrap();
        prop_assert!(lifecycle.begin(Operation::Save, |l| Ok(l.clone())).is_err());

        lifecycle.fail(&pending, "rejected").unwrap();
        prop_assert_eq!(lifecycle.draft(), &committed_before);
        prop_assert_eq!(lifecycle.committed(), &committed_before);
    }
}
