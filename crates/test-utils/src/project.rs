#![allow(dead_code)]

use std::sync::Arc;

use warmrun::config::{builtin_config, builtin_raw_config, ConfigFile};
use warmrun::fs::mock::MockFileSystem;
use warmrun::fs::FileSystem;
use warmrun::scan::PollingScanner;
use warmrun::session::Session;

/// Files of a small Rails application, as root-relative paths.
pub const RAILS_FILES: &[&str] = &[
    "app/controllers/application_controller.rb",
    "app/controllers/articles_controller.rb",
    "app/helpers/articles_helper.rb",
    "app/mailers/notifier_mailer.rb",
    "app/models/article.rb",
    "app/models/category.rb",
    "app/views/articles/index.html.erb",
    "config/routes.rb",
    "db/migrate/001_create_articles.rb",
    "test/controllers/articles_controller_test.rb",
    "test/controllers/categories_controller_test.rb",
    "test/fixtures/categories.yml",
    "test/mailers/notifier_mailer_test.rb",
    "test/models/article_test.rb",
    "test/models/category_test.rb",
    "test/test_helper.rb",
    "README.md",
    ".git/HEAD",
    "lib/tasks/cleanup.rb",
];

/// `"app/models/article.rb"` -> `"./app/models/article.rb"`, the spelling
/// the mock filesystem uses.
pub fn mock_path(rel: &str) -> String {
    format!("./{rel}")
}

/// Mock filesystem populated with `files` (root-relative).
pub fn mock_tree(files: &[&str]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    for file in files {
        fs.add_file(mock_path(file));
    }
    fs
}

pub fn rails_tree() -> MockFileSystem {
    mock_tree(RAILS_FILES)
}

/// Scanner and empty session over `fs` using `cfg`, rooted at `"."`.
pub fn scanner_for(fs: &MockFileSystem, cfg: &ConfigFile) -> (PollingScanner, Session) {
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let scanner = PollingScanner::new(
        shared,
        ".",
        cfg.router.clone(),
        cfg.db_change_advice.clone(),
    );
    (scanner, Session::new(cfg.types.clone()))
}

/// The built-in Rails configuration.
pub fn rails_config() -> ConfigFile {
    builtin_config().expect("built-in config must validate")
}

/// The built-in Rails rules with loop timings shrunk for real-time tests.
pub fn fast_rails_config(force_scan_window: &str) -> ConfigFile {
    let mut raw = builtin_raw_config().expect("built-in config must parse");
    raw.config.tick_interval = "10ms".to_string();
    raw.config.worker_warmup = "0ms".to_string();
    raw.config.force_scan_window = force_scan_window.to_string();
    raw.config.force_scan_interval = "10ms".to_string();
    ConfigFile::try_from(raw).expect("built-in config must validate")
}
