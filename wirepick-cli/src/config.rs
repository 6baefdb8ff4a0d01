//! Run file loading for wirepick.
//!
//! A run file is TOML: the run description keys at top level, plus
//! `[[repository]]` tables naming index files. Index paths are relative to the
//! directory holding the run file.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;
use wirepick_types::RunSpec;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunFile {
    #[serde(flatten)]
    pub run: RunSpec,

    #[serde(default)]
    pub repository: Vec<RepositoryEntry>,
}

/// One `[[repository]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryEntry {
    /// Repository name; defaults to the index file name without `.index.json`.
    pub name: Option<String>,

    pub index: Utf8PathBuf,
}

/// Parse a run file from a string.
pub fn parse_run(contents: &str) -> anyhow::Result<RunFile> {
    let run: RunFile = toml::from_str(contents).context("invalid TOML")?;
    Ok(run)
}

/// Load a run file, resolving index paths against its directory.
pub fn load_run(path: &Utf8Path) -> anyhow::Result<RunFile> {
    let contents = fs::read_to_string(path).with_context(|| format!("read run file {}", path))?;
    let mut run = parse_run(&contents).with_context(|| format!("parse run file {}", path))?;

    let base = path.parent().unwrap_or(Utf8Path::new("."));
    for entry in &mut run.repository {
        if entry.index.is_relative() {
            entry.index = base.join(&entry.index);
        }
    }
    debug!(path = %path, repositories = run.repository.len(), "loaded run file");
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_full_run_file() {
        let contents = r#"
framework = "org.apache.felix.framework;version='[4,4.1)'"
ee = "JavaSE-1.6"
blacklist = ["osgi.identity;filter:='(osgi.identity=bad)'"]
run_repos = ["b", "a"]

[[repository]]
name = "a"
index = "repos/a.index.json"

[[repository]]
index = "/abs/b.index.json"
"#;
        let run = parse_run(contents).unwrap();
        assert_eq!(run.run.ee.as_deref(), Some("JavaSE-1.6"));
        assert_eq!(run.run.blacklist.len(), 1);
        assert_eq!(run.run.run_repos, vec!["b", "a"]);
        assert_eq!(run.run.reserved_packages, vec!["java.*", "org.osgi.framework"]);
        assert_eq!(run.repository.len(), 2);
        assert_eq!(run.repository[0].name.as_deref(), Some("a"));
        assert_eq!(run.repository[1].name, None);
    }

    #[test]
    fn empty_run_file_is_default() {
        let run = parse_run("").unwrap();
        assert_eq!(run.run, RunSpec::default());
        assert!(run.repository.is_empty());
    }

    #[test]
    fn index_paths_are_relative_to_the_run_file() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let path = dir.join("app.toml");
        std::fs::write(&path, "[[repository]]\nindex = \"repos/a.index.json\"\n").unwrap();

        let run = load_run(&path).unwrap();
        assert_eq!(run.repository[0].index, dir.join("repos/a.index.json"));
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "framework = [").unwrap();

        let err = load_run(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }
}
