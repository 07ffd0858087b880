//! Test plan for the `swibi-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use swibi_config::load;

const ENV_VARS_TO_RESET: &[&str] = &[
    "SWIBI_CONFIG",
    "SWIBI__AUTH__SESSION_TTL_SECONDS",
    "SWIBI__DATABASE__MAX_CONNECTIONS",
    "SWIBI__DATABASE__URL",
    "SWIBI__FEED__INCLUDE_SOLD",
    "SWIBI__FEED__PAGE_SIZE",
    "SWIBI__HTTP__ADDRESS",
    "SWIBI__HTTP__PORT",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration load should succeed without files");

    assert_eq!(config.http.address, "127.0.0.1");
    assert_eq!(config.http.port, 5000);
    assert_eq!(config.database.url, "sqlite://swibi.db");
    assert_eq!(config.database.max_connections, 10);
    assert_eq!(config.auth.session_ttl_seconds, 86_400);
    assert_eq!(config.feed.page_size, 50);
    assert!(config.feed.include_sold);
}

#[test]
#[serial]
fn load_reads_configuration_file_from_working_directory() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_config_file(
        temp_dir.path(),
        "swibi.toml",
        r#"
[http]
address = "0.0.0.0"
port = 8080

[feed]
include_sold = false
page_size = 25
"#,
    );

    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration load should pick up swibi.toml");

    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 8080);
    assert!(!config.feed.include_sold);
    assert_eq!(config.feed.page_size, 25);
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_config_file(
        temp_dir.path(),
        "custom/location.toml",
        r#"
[database]
url = "sqlite://custom.db"
max_connections = 3
"#,
    );

    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_var(
        "SWIBI_CONFIG",
        temp_dir.path().join("custom/location.toml").display().to_string(),
    );

    let config = load().expect("configuration load should honour SWIBI_CONFIG");

    assert_eq!(config.database.url, "sqlite://custom.db");
    assert_eq!(config.database.max_connections, 3);
}

#[test]
#[serial]
fn environment_variables_override_file_values() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_config_file(
        temp_dir.path(),
        "swibi.toml",
        r#"
[http]
port = 8080
"#,
    );

    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    ctx.set_var("SWIBI__HTTP__PORT", "9090");
    ctx.set_var("SWIBI__AUTH__SESSION_TTL_SECONDS", "120");

    let config = load().expect("configuration load should apply env overrides");

    assert_eq!(config.http.port, 9090);
    assert_eq!(config.auth.session_ttl_seconds, 120);
}
