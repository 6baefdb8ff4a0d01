//! Tests for the repository index loader.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use wirepick_domain::{Repository, ResolveContext};
use wirepick_index::{IndexLoadError, load_index, load_repositories, parse_index};
use wirepick_types::{Requirement, RunSpec, Version, ns};

fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn dir_path(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("repos")).unwrap()
}

fn write_index(dir: &Utf8PathBuf, file: &str, contents: &str) -> Utf8PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(file);
    fs::write(&path, contents).unwrap();
    path
}

fn exporter(name: &str, version: &str, package: &str) -> String {
    format!(
        r#"{{
            "location": "bundles/{name}-{version}.jar",
            "capabilities": [
                {{ "namespace": "osgi.identity",
                   "attributes": {{ "osgi.identity": "{name}", "version:Version": "{version}", "type": "osgi.bundle" }} }},
                {{ "namespace": "osgi.wiring.package",
                   "attributes": {{ "osgi.wiring.package": "{package}", "version:Version": "{version}" }} }}
            ]
        }}"#
    )
}

fn index(resources: &[String]) -> String {
    format!(r#"{{ "resources": [{}] }}"#, resources.join(","))
}

fn package_requirement(pkg: &str) -> Requirement {
    Requirement::builder(ns::PACKAGE)
        .filter(format!("(osgi.wiring.package={pkg})"))
        .build()
}

#[test]
fn missing_dir_yields_nothing() {
    let temp = create_temp_dir();
    let dir = dir_path(&temp);

    let loaded = load_repositories(&dir).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn indexes_are_sorted_by_path() {
    let temp = create_temp_dir();
    let dir = dir_path(&temp);
    write_index(&dir, "zebra.index.json", &index(&[]));
    write_index(&dir, "alpha.index.json", &index(&[]));
    write_index(&dir, "middle.index.json", &index(&[]));
    write_index(&dir, "notes.json", "ignored");

    let loaded = load_repositories(&dir).unwrap();
    let names: Vec<&str> = loaded.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "middle", "zebra"]);
    assert!(loaded.iter().all(|l| l.repository.is_ok()));
}

#[test]
fn broken_files_do_not_stop_the_scan() {
    let temp = create_temp_dir();
    let dir = dir_path(&temp);
    write_index(&dir, "bad.index.json", "{ nope");
    write_index(
        &dir,
        "good.index.json",
        &index(&[exporter("org.example.a", "1.0.0", "org.example.a")]),
    );

    let loaded = load_repositories(&dir).unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(matches!(
        loaded[0].repository,
        Err(IndexLoadError::Json { .. })
    ));
    let good = loaded[1].repository.as_ref().unwrap();
    assert_eq!(good.name(), "good");
    assert_eq!(good.resources().len(), 1);
}

#[test]
fn load_index_reads_resources_in_file_order() {
    let temp = create_temp_dir();
    let dir = dir_path(&temp);
    let path = write_index(
        &dir,
        "central.index.json",
        &index(&[
            exporter("org.example.a", "1.0.0", "org.example.api"),
            exporter("org.example.b", "2.1.0", "org.example.api"),
        ]),
    );

    let repo = load_index(&path).unwrap();
    assert_eq!(repo.name(), "central");
    let resources = repo.resources();
    assert_eq!(resources[0].identity(), Some("org.example.a"));
    assert_eq!(resources[1].version(), Version::new(2, 1, 0));
    assert_eq!(
        resources[0].location(),
        Some("bundles/org.example.a-1.0.0.jar")
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = create_temp_dir();
    let dir = dir_path(&temp);

    let err = load_index(&dir.join("absent.index.json")).unwrap_err();
    assert!(matches!(err, IndexLoadError::Io { .. }));
}

#[test]
fn loaded_repositories_feed_a_context() {
    let temp = create_temp_dir();
    let dir = dir_path(&temp);
    write_index(
        &dir,
        "a.index.json",
        &index(&[exporter("org.example.old", "1.0.0", "org.example.api")]),
    );
    write_index(
        &dir,
        "b.index.json",
        &index(&[exporter("org.example.new", "1.0.0", "org.example.api")]),
    );

    let mut builder = ResolveContext::builder(RunSpec {
        run_repos: vec!["b".to_string(), "a".to_string()],
        ..RunSpec::default()
    });
    for loaded in load_repositories(&dir).unwrap() {
        builder = builder.repository(std::sync::Arc::new(loaded.repository.unwrap()));
    }
    let ctx = builder.build().unwrap();

    let found = ctx
        .find_providers(&package_requirement("org.example.api"))
        .unwrap();
    let names: Vec<_> = found.iter().map(|c| c.resource().identity()).collect();
    assert_eq!(names, vec![Some("org.example.new"), Some("org.example.old")]);
}

#[test]
fn untyped_versions_compare_numerically() {
    let text = r#"{ "resources": [
        { "location": "fw-9.5.0.jar",
          "capabilities": [{ "namespace": "osgi.identity",
                             "attributes": { "osgi.identity": "fw", "version": "9.5.0" } }] },
        { "location": "fw-10.0.0.jar",
          "capabilities": [{ "namespace": "osgi.identity",
                             "attributes": { "osgi.identity": "fw", "version": "10.0.0" } }] },
        { "location": "fw-12.0.0.jar",
          "capabilities": [{ "namespace": "osgi.identity",
                             "attributes": { "osgi.identity": "fw", "version": "12.0.0" } }] }
    ] }"#;
    let repository = parse_index("frameworks", text).unwrap();

    let ctx = ResolveContext::builder(RunSpec {
        framework: Some("fw;version='[9,11)'".to_string()),
        ..RunSpec::default()
    })
    .repository(std::sync::Arc::new(repository))
    .build()
    .unwrap();
    let fw = ctx.framework_resource().unwrap().unwrap();
    assert_eq!(fw.version(), Version::new(10, 0, 0));
    assert_eq!(fw.location(), Some("fw-10.0.0.jar"));
}

#[test]
fn untyped_version_must_parse() {
    let text = r#"{ "resources": [
        { "capabilities": [{ "namespace": "osgi.wiring.package",
                             "attributes": { "osgi.wiring.package": "p", "version": "one" } }] }
    ] }"#;
    let err = parse_index("bad", text).unwrap_err();
    assert!(matches!(err, IndexLoadError::Index(_)));
}
