// tests/routing.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::init_tracing;
use crate::common::project::rails_config;

use std::collections::BTreeSet;

use warmrun::routing::{
    derive_plural, derive_singular, DirtyTarget, GroupToken, NameCapture, RouteOutcome, SkipReason,
};

fn derived(outcome: RouteOutcome) -> BTreeSet<DirtyTarget> {
    match outcome {
        RouteOutcome::Derived(targets) => targets.into_iter().collect(),
        other => panic!("expected Derived, got {other:?}"),
    }
}

fn tests(paths: &[&str]) -> BTreeSet<DirtyTarget> {
    paths.iter().map(|p| DirtyTarget::test(*p)).collect()
}

#[test]
fn inflection_follows_the_two_simple_rules() {
    assert_eq!(derive_plural("category"), "categories");
    assert_eq!(derive_plural("tab"), "tabs");
    assert_eq!(derive_plural("article"), "articles");
    assert_eq!(derive_singular("categories"), "category");
    assert_eq!(derive_singular("tabs"), "tab");
    assert_eq!(derive_singular("articles"), "article");
}

#[test]
fn name_capture_fills_both_placeholders() {
    let capture = NameCapture::Plural("categories");
    assert_eq!(
        capture.fill("test/models/SINGULAR_test.rb"),
        "test/models/category_test.rb"
    );
    assert_eq!(
        capture.fill("test/controllers/PLURAL_controller_test.rb"),
        "test/controllers/categories_controller_test.rb"
    );

    let capture = NameCapture::Singular("article");
    assert_eq!(
        capture.fill("test/PLURAL/SINGULAR_test.rb"),
        "test/articles/article_test.rb"
    );
}

#[test]
fn model_change_derives_its_model_test() {
    init_tracing();
    let cfg = rails_config();

    assert_eq!(
        derived(cfg.router.route("app/models/article.rb")),
        tests(&["test/models/article_test.rb"])
    );
}

#[test]
fn fixture_change_derives_controller_and_model_tests() {
    let cfg = rails_config();

    assert_eq!(
        derived(cfg.router.route("test/fixtures/categories.yml")),
        tests(&[
            "test/controllers/categories_controller_test.rb",
            "test/models/category_test.rb",
        ])
    );
}

#[test]
fn view_and_helper_changes_map_to_controller_test() {
    let cfg = rails_config();
    let expected = tests(&["test/controllers/articles_controller_test.rb"]);

    assert_eq!(
        derived(cfg.router.route("app/views/articles/index.html.erb")),
        expected
    );
    assert_eq!(
        derived(cfg.router.route("app/views/articles/partials/_row.html.erb")),
        expected
    );
    assert_eq!(
        derived(cfg.router.route("app/helpers/articles_helper.rb")),
        expected
    );
    assert_eq!(
        derived(cfg.router.route("app/controllers/articles_controller.rb")),
        expected
    );
}

#[test]
fn shared_plumbing_maps_to_type_and_all_tokens() {
    let cfg = rails_config();
    let controllers: BTreeSet<_> =
        [DirtyTarget::Group(GroupToken::Type("CONTROLLERS".to_string()))].into();
    let all: BTreeSet<_> = [DirtyTarget::Group(GroupToken::All)].into();

    assert_eq!(
        derived(cfg.router.route("app/controllers/application_controller.rb")),
        controllers
    );
    assert_eq!(derived(cfg.router.route("app/views/layouts/application.html.erb")), controllers);
    assert_eq!(derived(cfg.router.route("config/routes.rb")), all);
    assert_eq!(derived(cfg.router.route("config/environments/test.rb")), all);
    assert_eq!(derived(cfg.router.route("test/test_helper.rb")), all);
}

#[test]
fn test_files_route_to_themselves() {
    let cfg = rails_config();

    assert_eq!(
        derived(cfg.router.route("test/models/article_test.rb")),
        tests(&["test/models/article_test.rb"])
    );
}

#[test]
fn first_matching_rule_wins() {
    let cfg = ConfigFileBuilder::new()
        .with_rule(r"app/(?P<singular>.*)\.rb$", &["test/first/SINGULAR_test.rb"])
        .with_rule(r"app/(?P<singular>.*)\.rb$", &["test/second/SINGULAR_test.rb"])
        .build();

    assert_eq!(
        derived(cfg.router.route("app/widget.rb")),
        tests(&["test/first/widget_test.rb"])
    );
}

#[test]
fn patterns_are_anchored_at_the_start_of_the_path() {
    let cfg = ConfigFileBuilder::new()
        .with_rule(r"app/(?P<singular>.*)\.rb$", &["test/SINGULAR_test.rb"])
        .build();

    assert_eq!(cfg.router.route("vendor/app/widget.rb"), RouteOutcome::Unmapped);
}

#[test]
fn ineligible_paths_are_skipped_and_excluded_ones_silently() {
    let cfg = rails_config();

    assert_eq!(
        cfg.router.route("README.md"),
        RouteOutcome::Skipped(SkipReason::Ineligible)
    );
    let excluded = cfg.router.route(".git/HEAD");
    assert_eq!(excluded, RouteOutcome::Skipped(SkipReason::Excluded));
    assert!(!SkipReason::Excluded.is_reported());
    assert!(SkipReason::Ineligible.is_reported());
}

#[test]
fn eligible_path_without_rule_is_unmapped() {
    let cfg = rails_config();
    assert_eq!(cfg.router.route("lib/tasks/cleanup.rb"), RouteOutcome::Unmapped);
}

#[test]
fn db_and_ignore_tokens_skip_the_file() {
    let cfg = ConfigFileBuilder::new()
        .with_rule(r"db/.*\.rb$", &["DBCHANGE"])
        .with_rule(r"vendor/.*", &["IGNORE"])
        .build();

    assert_eq!(
        cfg.router.route("db/migrate/001_create_articles.rb"),
        RouteOutcome::Skipped(SkipReason::DbChange)
    );
    assert_eq!(
        cfg.router.route("vendor/plugin.rb"),
        RouteOutcome::Skipped(SkipReason::Ignored)
    );
}

#[test]
fn template_without_capture_is_a_routing_failure() {
    let cfg = ConfigFileBuilder::new()
        .with_rule(r"lib/.*\.rb$", &["test/lib/SINGULAR_test.rb"])
        .build();

    assert_eq!(
        cfg.router.route("lib/tools.rb"),
        RouteOutcome::Skipped(SkipReason::RoutingFailure {
            template: "test/lib/SINGULAR_test.rb".to_string()
        })
    );
}

#[test]
fn duplicate_targets_are_collapsed() {
    let cfg = ConfigFileBuilder::new()
        .with_rule(
            r"app/(?P<singular>.*)\.rb$",
            &["test/SINGULAR_test.rb", "test/SINGULAR_test.rb", "ALL", "ALL"],
        )
        .build();

    match cfg.router.route("app/widget.rb") {
        RouteOutcome::Derived(targets) => assert_eq!(
            targets,
            vec![
                DirtyTarget::test("test/widget_test.rb"),
                DirtyTarget::Group(GroupToken::All)
            ]
        ),
        other => panic!("expected Derived, got {other:?}"),
    }
}
