// tests/dirty_registry.rs

use std::collections::BTreeMap;

use regex::Regex;
use warmrun::routing::{DirtyTarget, GroupToken, TestTypes};
use warmrun::session::DirtyRegistry;

fn types() -> TestTypes {
    let mut patterns = BTreeMap::new();
    patterns.insert(
        "CONTROLLERS".to_string(),
        Regex::new(r"^(?:test/.*controller_test\.rb$)").unwrap(),
    );
    patterns.insert(
        "MODELS".to_string(),
        Regex::new(r"^(?:test/(units|models)/.*_test\.rb$)").unwrap(),
    );
    TestTypes::new(patterns)
}

fn registry_with(tests: &[&str]) -> DirtyRegistry {
    let mut registry = DirtyRegistry::new(types());
    let targets: Vec<DirtyTarget> = tests.iter().map(|t| DirtyTarget::test(*t)).collect();
    registry.mark_dirty(&targets);
    for test in tests {
        registry.clear(test);
    }
    registry
}

const TESTS: &[&str] = &[
    "test/controllers/articles_controller_test.rb",
    "test/models/article_test.rb",
    "test/units/legacy_test.rb",
];

#[test]
fn concrete_targets_register_and_mark() {
    let mut registry = DirtyRegistry::new(types());
    assert!(!registry.has_dirty());

    registry.mark_dirty(&[DirtyTarget::test("test/models/article_test.rb")]);

    assert_eq!(registry.len(), 1);
    assert!(registry.is_dirty("test/models/article_test.rb"));
    assert!(!registry.is_dirty("test/models/unknown_test.rb"));
}

#[test]
fn all_token_marks_every_registered_test() {
    let mut registry = registry_with(TESTS);

    registry.mark_dirty(&[DirtyTarget::Group(GroupToken::All)]);

    assert_eq!(registry.dirty().len(), TESTS.len());
}

#[test]
fn type_token_marks_only_matching_tests() {
    let mut registry = registry_with(TESTS);

    registry.mark_group(&GroupToken::Type("MODELS".to_string()));

    assert_eq!(
        registry.dirty(),
        vec![
            "test/models/article_test.rb".to_string(),
            "test/units/legacy_test.rb".to_string(),
        ]
    );
}

#[test]
fn group_tokens_only_see_tests_registered_so_far() {
    let mut registry = DirtyRegistry::new(types());

    registry.mark_group(&GroupToken::All);
    assert!(registry.is_empty());

    registry.mark_dirty(&[DirtyTarget::test("test/models/article_test.rb")]);
    registry.clear("test/models/article_test.rb");
    registry.mark_group(&GroupToken::All);
    assert_eq!(registry.dirty(), vec!["test/models/article_test.rb".to_string()]);
}

#[test]
fn unknown_type_marks_nothing() {
    let mut registry = registry_with(TESTS);

    registry.mark_group(&GroupToken::Type("MAILERS".to_string()));

    assert!(!registry.has_dirty());
}

#[test]
fn clearing_keeps_the_entry() {
    let mut registry = registry_with(TESTS);
    registry.mark_group(&GroupToken::All);

    registry.clear("test/units/legacy_test.rb");

    assert_eq!(registry.len(), TESTS.len());
    assert!(!registry.is_dirty("test/units/legacy_test.rb"));
    assert_eq!(registry.dirty().len(), TESTS.len() - 1);
}

mod props {
    use super::*;
    use proptest::prelude::*;

    fn test_path() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("controllers"), Just("models"), Just("units"), Just("mailers")],
            "[a-z]{1,8}",
        )
            .prop_map(|(dir, name)| match dir {
                "controllers" => format!("test/{dir}/{name}_controller_test.rb"),
                _ => format!("test/{dir}/{name}_test.rb"),
            })
    }

    proptest! {
        #[test]
        fn all_marks_exactly_the_registered_set(paths in proptest::collection::vec(test_path(), 0..20)) {
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            let mut registry = registry_with(&refs);
            prop_assert!(!registry.has_dirty());

            registry.mark_group(&GroupToken::All);

            let registered: Vec<String> = registry.registered().map(str::to_string).collect();
            prop_assert_eq!(registry.dirty(), registered);
        }

        #[test]
        fn type_marking_is_a_subset_matching_the_pattern(paths in proptest::collection::vec(test_path(), 0..20)) {
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            let mut registry = registry_with(&refs);

            registry.mark_group(&GroupToken::Type("CONTROLLERS".to_string()));

            for path in registry.registered() {
                let expected = path.ends_with("controller_test.rb");
                prop_assert_eq!(registry.is_dirty(path), expected);
            }
        }
    }
}
