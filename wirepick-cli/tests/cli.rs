//! End-to-end tests for the wirepick binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn wirepick() -> Command {
    Command::cargo_bin("wirepick").expect("wirepick binary")
}

fn bundle(name: &str, version: &str, exports: &[&str]) -> String {
    let mut caps = vec![format!(
        r#"{{ "namespace": "osgi.identity",
              "attributes": {{ "osgi.identity": "{name}", "version:Version": "{version}", "type": "osgi.bundle" }} }}"#
    )];
    for pkg in exports {
        caps.push(format!(
            r#"{{ "namespace": "osgi.wiring.package",
                  "attributes": {{ "osgi.wiring.package": "{pkg}", "version:Version": "{version}" }} }}"#
        ));
    }
    format!(
        r#"{{ "location": "bundles/{name}-{version}.jar", "capabilities": [{}] }}"#,
        caps.join(",")
    )
}

fn write_index(dir: &Path, file: &str, resources: &[String]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join(file),
        format!(r#"{{ "resources": [{}] }}"#, resources.join(",")),
    )
    .unwrap();
}

/// A workspace with a run file pointing at `repos/main.index.json`.
fn create_workspace(run: &str) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    let root = td.path();

    write_index(
        &root.join("repos"),
        "main.index.json",
        &[
            bundle("org.apache.felix.framework", "4.0.2", &[]),
            bundle("org.example.impl", "1.0.0", &["org.example.api"]),
            bundle("org.example.impl", "2.0.0", &["org.example.api"]),
            bundle("org.example.other", "1.0.0", &["org.example.api"]),
        ],
    );
    fs::write(
        root.join("run.toml"),
        format!("{run}\n\n[[repository]]\nindex = \"repos/main.index.json\"\n"),
    )
    .unwrap();

    td
}

const API_CLAUSE: &str = "osgi.wiring.package;filter:='(osgi.wiring.package=org.example.api)'";

#[test]
fn framework_is_selected_from_repositories() {
    let temp = create_workspace(r#"framework = "org.apache.felix.framework;version='[4,4.1)'""#);

    wirepick()
        .current_dir(temp.path())
        .args(["framework", "--run", "run.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.apache.felix.framework 4.0.2"));
}

#[test]
fn framework_without_run_file_is_none() {
    let temp = tempfile::tempdir().unwrap();

    wirepick()
        .current_dir(temp.path())
        .arg("framework")
        .assert()
        .success()
        .stdout("none\n");
}

#[test]
fn providers_are_ranked_highest_version_first() {
    let temp = create_workspace("");

    let output = wirepick()
        .current_dir(temp.path())
        .args(["providers", API_CLAUSE, "--run", "run.toml"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    let newer = stdout.find("org.example.impl 2.0.0").expect("2.0.0 listed");
    let older = stdout.find("org.example.impl 1.0.0").expect("1.0.0 listed");
    assert!(newer < older, "unexpected order:\n{stdout}");
    assert!(stdout.contains("org.example.other 1.0.0"));
}

#[test]
fn providers_json_respects_blacklist() {
    let temp = create_workspace(
        r#"blacklist = ["osgi.identity;filter:='(osgi.identity=org.example.other)'"]"#,
    );

    let output = wirepick()
        .current_dir(temp.path())
        .args(["providers", API_CLAUSE, "--run", "run.toml", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let providers: serde_json::Value = serde_json::from_slice(&output).unwrap();

    let versions: Vec<&str> = providers
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["version"].as_str().unwrap())
        .collect();
    assert_eq!(versions, vec!["2.0.0", "1.0.0"]);
    assert!(
        providers
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["identity"] == "org.example.impl")
    );
}

#[test]
fn repo_dir_indexes_are_loaded() {
    let temp = tempfile::tempdir().unwrap();
    write_index(
        &temp.path().join("more"),
        "extra.index.json",
        &[bundle("org.example.extra", "3.0.0", &["org.example.api"])],
    );

    wirepick()
        .current_dir(temp.path())
        .args(["providers", API_CLAUSE, "--repo-dir", "more"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example.extra 3.0.0"));
}

#[test]
fn effective_follows_the_run_instruction() {
    let temp = create_workspace("");

    wirepick()
        .current_dir(temp.path())
        .args(["effective", "osgi.wiring.package", "--run", "run.toml"])
        .assert()
        .success()
        .stdout("true\n");

    wirepick()
        .current_dir(temp.path())
        .args([
            "effective",
            "osgi.wiring.package;effective:=active",
            "--run",
            "run.toml",
        ])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn mandatory_lists_framework_and_initial() {
    let temp = create_workspace(
        r#"framework = "org.apache.felix.framework"
run_requires = ["osgi.identity;filter:='(osgi.identity=org.example.impl)'"]"#,
    );

    wirepick()
        .current_dir(temp.path())
        .args(["mandatory", "--run", "run.toml"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("org.apache.felix.framework 4.0.2")
                .and(predicate::str::contains("<<INITIAL>> 0.0.0")),
        );
}

#[test]
fn malformed_run_description_fails() {
    let temp = create_workspace(r#"run_requires = ["osgi.identity;filter:='(osgi.identity=broken'"]"#);

    wirepick()
        .current_dir(temp.path())
        .args(["mandatory", "--run", "run.toml"])
        .assert()
        .code(1);
}

#[test]
fn missing_run_file_fails() {
    let temp = tempfile::tempdir().unwrap();

    wirepick()
        .current_dir(temp.path())
        .args(["framework", "--run", "absent.toml"])
        .assert()
        .code(1);
}

#[test]
fn more_than_one_clause_is_rejected() {
    let temp = tempfile::tempdir().unwrap();

    wirepick()
        .current_dir(temp.path())
        .args(["effective", "a,b"])
        .assert()
        .code(1);
}
