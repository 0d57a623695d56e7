//! Integration test suite for the `cpath` CLI
use assert_cmd::Command;

/// Helper function to build a `cpath` invocation with colors disabled.
fn cpath(args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("cpath").expect("Failed to find main binary");
    cmd.env("NO_COLOR", "1").args(args);
    cmd
}

/// Helper function to run `cpath` with the given arguments and return a
/// [`assert_cmd::assert::Assert`].
fn run_main(args: &[&str]) -> assert_cmd::assert::Assert {
    cpath(args).assert()
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("Invalid UTF-8 output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const LOGIN: &str = "tests/data/login.json";

    #[test]
    fn match_by_name() {
        let assert = run_main(&["//Button[@Name='Cancel']", LOGIN, "--compact"])
            .success()
            .code(0);
        let output_str = stdout_of(&assert);

        let mut lines = output_str.lines();
        let path_line = lines.next().expect("expected path header line");
        assert_eq!(path_line, "Window 'Login' > Pane 'Actions' > Button 'Cancel':");

        let properties = lines.next().expect("expected properties");
        let value: Value = serde_json::from_str(properties)
            .expect("Failed to parse output JSON");
        assert_eq!(value["Name"], "Cancel");
        assert_eq!(value["IsEnabled"], true);
        assert!(lines.next().is_none());
    }

    #[test]
    fn no_match_prints_nothing() {
        let assert = run_main(&["//Button[@Name='Missing']", LOGIN]).success();
        let output_str = stdout_of(&assert);
        assert!(
            output_str.trim().is_empty(),
            "Expected no output for a query without matches, got: {output_str:?}"
        );
    }

    #[test]
    fn count_matches() {
        let assert = run_main(&[
            "//Button[@IsEnabled=true]",
            LOGIN,
            "--count",
            "--no-display",
        ])
        .success();
        assert_eq!(stdout_of(&assert).trim(), "Found matches: 2");
    }

    #[test]
    fn pagination_and_no_path() {
        let assert =
            run_main(&["//Edit[2]", LOGIN, "--compact", "--no-path"]).success();
        let value: Value = serde_json::from_str(stdout_of(&assert).trim())
            .expect("Failed to parse output JSON");
        assert_eq!(value["AutomationId"], "password");
    }

    #[test]
    fn sub_query_predicate() {
        let assert =
            run_main(&["//Pane[./Edit]", LOGIN, "--count", "--no-display"])
                .success();
        assert_eq!(stdout_of(&assert).trim(), "Found matches: 1");
    }

    #[test]
    fn first_without_match_fails_with_query() {
        let assert = run_main(&["//*[@Name='Missing']", LOGIN, "--first"])
            .failure()
            .code(1);
        let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
        assert!(stderr.contains("//*[@Name='Missing']"), "stderr: {stderr}");
    }

    #[test]
    fn explain_prints_canonical_query() {
        let assert =
            run_main(&["Window/ Button[ @Name = \"OK\" ][1]", "--explain"])
                .success();
        assert_eq!(stdout_of(&assert).trim(), "/Window/Button[@Name='OK'][1]");
    }

    #[test]
    fn invalid_query() {
        let assert = run_main(&["//Button[@Name='OK'", LOGIN]);
        assert.failure().code(1);
    }

    #[test]
    fn unknown_property_in_query() {
        let assert = run_main(&["//Button[@Colour='red']", LOGIN]).failure();
        let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
        assert!(stderr.contains("Colour"), "stderr: {stderr}");
    }

    #[test]
    fn nonexistent_file() {
        let assert = run_main(&["//*", "tests/data/missing.json"]);
        assert.failure();
    }

    #[test]
    fn unknown_property_in_snapshot() {
        let assert = run_main(&["//*", "tests/data/unknown_property.json"]);
        assert.failure();
    }

    #[test]
    fn yaml_snapshot() {
        let assert = run_main(&[
            "//Button",
            "tests/data/login.yaml",
            "--count",
            "--no-display",
        ])
        .success();
        assert_eq!(stdout_of(&assert).trim(), "Found matches: 2");
    }

    #[test]
    fn snapshot_from_stdin() {
        let snapshot = std::fs::read_to_string(LOGIN).unwrap();
        let assert = cpath(&["//Text", "--count", "--no-display"])
            .write_stdin(snapshot)
            .assert()
            .success();
        assert_eq!(stdout_of(&assert).trim(), "Found matches: 2");
    }

    #[test]
    fn nesting_limit() {
        run_main(&["//Pane[./Edit]", LOGIN, "--max-nesting", "1"]).failure().code(1);
    }

    #[test]
    fn generate_man_pages() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        run_main(&["generate", "man", "--output-dir", out]).success();
        assert!(dir.path().join("cpath.1").exists());
        assert!(dir.path().join("cpath-generate.1").exists());
    }

    #[test]
    fn generate_completions() {
        let assert = run_main(&["generate", "shell", "bash"]).success();
        assert!(stdout_of(&assert).contains("cpath"));
    }
}
