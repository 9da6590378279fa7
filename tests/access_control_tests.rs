//! Evaluator properties: single-token membership, any-of lists, and the
//! empty set never granting anything.

use proptest::prelude::*;

use studio::access::{has_permission, PermissionSet, Requirement};

fn token() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "blog:write", "blog:publish", "blog:delete", "users:manage", "settings:manage", "control:view",
    ])
    .prop_map(|s| s.to_string())
}

fn held_set() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(token(), 0..5)
}

proptest! {
    #[test]
    fn single_requirement_is_membership(held in held_set(), p in token()) {
        let set: PermissionSet = held.iter().collect();
        prop_assert_eq!(has_permission(&set, &Requirement::one(p.clone())), held.contains(&p));
    }

    #[test]
    fn list_requirement_is_any_of(held in held_set(), list in prop::collection::vec(token(), 0..4)) {
        let set: PermissionSet = held.iter().collect();
        let expected = list.iter().any(|p| held.contains(p));
        prop_assert_eq!(has_permission(&set, &Requirement::AnyOf(list)), expected);
    }

    #[test]
    fn empty_set_grants_nothing(list in prop::collection::vec(token(), 0..4), p in token()) {
        let empty = PermissionSet::new();
        prop_assert!(!has_permission(&empty, &Requirement::AnyOf(list)));
        prop_assert!(!has_permission(&empty, &Requirement::One(p)));
    }

    #[test]
    fn evaluation_leaves_held_untouched(held in held_set(), list in prop::collection::vec(token(), 0..4)) {
        let set: PermissionSet = held.iter().collect();
        let before = set.clone();
        let _ = has_permission(&set, &Requirement::AnyOf(list));
        prop_assert_eq!(set, before);
    }
}

#[test]
fn empty_list_denies_even_a_full_set() {
    let all: PermissionSet = ["blog:write", "blog:publish", "blog:delete"].into_iter().collect();
    assert!(!has_permission(&all, &Requirement::AnyOf(Vec::new())));
}

#[test]
fn write_only_actor_scenarios() {
    let held: PermissionSet = ["blog:write"].into_iter().collect();
    assert!(has_permission(&held, &"blog:write".into()));
    assert!(!has_permission(&held, &["blog:delete", "blog:publish"].into()));
}
