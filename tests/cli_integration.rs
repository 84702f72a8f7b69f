//! End-to-end tests driving the `snippets` binary.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Variables that would otherwise leak the developer's setup into a test run.
const ISOLATED_ENV: &[&str] = &[
    "SNIPPETS_CONFIG_PATH",
    "SNIPPETS_DATABASE_URL",
    "SNIPPETS_TABLE",
    "SNIPPETS_LOG_FILE",
    "SNIPPETS_LOG_FORMAT",
    "SNIPPETS_LOG",
    "RUST_LOG",
];

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = format!(
            "[database]\nurl = \"{}\"\n\n[logging]\nfile = \"{}\"\n",
            dir.path().join("snippets.db").display(),
            dir.path().join("snippets.log").display(),
        );
        std::fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Builds a command isolated from the caller's environment and config dir,
    /// running inside the sandbox.
    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_snippets"));
        for var in ISOLATED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .current_dir(self.path());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .arg("--config")
            .arg(self.path().join("config.toml"))
            .args(args)
            .output()
            .expect("run snippets binary")
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "snippets {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn log(&self) -> String {
        std::fs::read_to_string(self.path().join("snippets.log")).unwrap_or_default()
    }
}

#[test]
fn test_put_get_round_trip() {
    let sandbox = Sandbox::new();

    assert_eq!(
        sandbox.stdout(&["put", "greeting", "hello world"]),
        "Stored \"hello world\" as \"greeting\"\n"
    );
    assert_eq!(
        sandbox.stdout(&["get", "greeting"]),
        "Retrieved snippet: \"greeting\" => \"hello world\"\n"
    );
}

#[test]
fn test_get_missing_succeeds() {
    let sandbox = Sandbox::new();
    assert_eq!(
        sandbox.stdout(&["get", "never-stored"]),
        "Retrieved snippet: \"never-stored\" => (not found)\n"
    );
}

#[test]
fn test_hidden_excluded_from_catalog_and_search() {
    let sandbox = Sandbox::new();
    sandbox.stdout(&["put", "secret", "shh milk", "--hidden"]);
    sandbox.stdout(&["put", "note", "remember the milk"]);

    assert_eq!(
        sandbox.stdout(&["get", "secret"]),
        "Retrieved snippet: \"secret\" => \"shh milk\"\n"
    );
    assert_eq!(
        sandbox.stdout(&["catalog", "keyword"]),
        "Retrieved catalog ordered by \"keyword\"\n  \"note\": \"remember the milk\"\n"
    );
    assert_eq!(
        sandbox.stdout(&["search", "MILK"]),
        "Searched catalog using \"MILK\"\n  \"note\": \"remember the milk\"\n"
    );
}

#[test]
fn test_unknown_sort_column_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["catalog", "keyword; DROP TABLE snippets"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error: "), "stderr was {stderr:?}");
    assert!(stderr.contains("unknown sort column"));
}

#[test]
fn test_invalid_search_pattern_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["search", "[z-a]"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_database_flag_overrides_config() {
    let sandbox = Sandbox::new();
    let other = sandbox.path().join("other.db");
    let other = other.to_str().unwrap();

    sandbox.stdout(&["--database", other, "put", "greeting", "elsewhere"]);

    assert!(sandbox.path().join("other.db").exists());
    assert_eq!(
        sandbox.stdout(&["get", "greeting"]),
        "Retrieved snippet: \"greeting\" => (not found)\n"
    );
    assert_eq!(
        sandbox.stdout(&["-d", other, "get", "greeting"]),
        "Retrieved snippet: \"greeting\" => \"elsewhere\"\n"
    );
}

#[test]
fn test_operations_are_logged_to_file() {
    let sandbox = Sandbox::new();
    sandbox.stdout(&["put", "greeting", "hello world"]);
    sandbox.stdout(&["catalog", "message"]);

    let log = sandbox.log();
    assert!(log.contains("Storing snippet \"greeting\": \"hello world\""));
    assert!(log.contains("Snippet stored successfully."));
    assert!(log.contains("Retrieving Catalog ordered by (\"message\")"));
}

#[test]
fn test_empty_config_env_with_config_flag() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command()
        .env("SNIPPETS_CONFIG_PATH", "")
        .arg("--config")
        .arg(sandbox.path().join("config.toml"))
        .args(["put", "greeting", "hello world"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        sandbox.stdout(&["get", "greeting"]),
        "Retrieved snippet: \"greeting\" => \"hello world\"\n"
    );
}

#[test]
fn test_empty_config_env_falls_back_to_defaults() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command()
        .env("SNIPPETS_CONFIG_PATH", "")
        .args(["put", "greeting", "hello world"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "Stored \"hello world\" as \"greeting\"\n"
    );
    // Defaults resolve against the working directory.
    assert!(sandbox.path().join("snippets.db").exists());
}

#[test]
fn test_config_env_names_config_file() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command()
        .env("SNIPPETS_CONFIG_PATH", sandbox.path().join("config.toml"))
        .args(["put", "greeting", "from env"])
        .output()
        .unwrap();
    assert!(output.status.success());

    assert_eq!(
        sandbox.stdout(&["get", "greeting"]),
        "Retrieved snippet: \"greeting\" => \"from env\"\n"
    );
}

#[test]
fn test_usage_error_exits_nonzero() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["put", "only-name"]);
    assert!(!output.status.success());
}
