use crate::convert::{IndexError, to_resources};
use crate::model::IndexFile;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use thiserror::Error;
use tracing::debug;
use wirepick_domain::IndexedRepository;

pub const INDEX_SUFFIX: &str = ".index.json";

#[derive(Debug)]
pub struct LoadedIndex {
    pub path: Utf8PathBuf,
    /// File name without the `.index.json` suffix.
    pub name: String,
    pub repository: Result<IndexedRepository, IndexLoadError>,
}

#[derive(Debug, Error)]
pub enum IndexLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Repository name for an index path: the file name minus `.index.json`.
pub fn repository_name(path: &Utf8Path) -> String {
    let file = path.file_name().unwrap_or("unknown");
    file.strip_suffix(INDEX_SUFFIX)
        .or_else(|| file.strip_suffix(".json"))
        .unwrap_or(file)
        .to_string()
}

pub fn parse_index(name: &str, text: &str) -> Result<IndexedRepository, IndexLoadError> {
    let file: IndexFile = serde_json::from_str(text).map_err(|e| IndexLoadError::Json {
        message: e.to_string(),
    })?;
    let resources = to_resources(&file)?;
    debug!(repository = name, resources = resources.len(), "parsed index");
    Ok(IndexedRepository::new(name, resources))
}

pub fn load_index(path: &Utf8Path) -> Result<IndexedRepository, IndexLoadError> {
    let text = fs::read_to_string(path).map_err(|e| IndexLoadError::Io {
        message: e.to_string(),
    })?;
    parse_index(&repository_name(path), &text)
}

/// Loads every `*.index.json` directly under `dir`, sorted by path.
///
/// A file that fails to load is reported in its own entry; the scan goes on.
pub fn load_repositories(dir: &Utf8Path) -> anyhow::Result<Vec<LoadedIndex>> {
    let pattern = dir.join(format!("*{INDEX_SUFFIX}"));
    let pattern_str = pattern.as_str();

    debug!(pattern = %pattern_str, "scanning for repository indexes");

    let mut out = Vec::new();
    for entry in glob(pattern_str).context("glob *.index.json")? {
        let path = entry
            .map_err(|e| anyhow::anyhow!("glob error: {e}"))?
            .to_string_lossy()
            .to_string();
        let path = Utf8PathBuf::from(path);
        let name = repository_name(&path);
        let repository = load_index(&path);
        out.push(LoadedIndex {
            path,
            name,
            repository,
        });
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_strip_the_suffix() {
        assert_eq!(repository_name(Utf8Path::new("/r/central.index.json")), "central");
        assert_eq!(repository_name(Utf8Path::new("local.json")), "local");
        assert_eq!(repository_name(Utf8Path::new("plain")), "plain");
    }

    #[test]
    fn parse_errors_are_classified() {
        assert!(matches!(
            parse_index("x", "{ not json"),
            Err(IndexLoadError::Json { .. })
        ));
        assert!(matches!(
            parse_index("x", r#"{"resources":[{"capabilities":[{"namespace":""}]}]}"#),
            Err(IndexLoadError::Index(IndexError::EmptyNamespace { .. }))
        ));
        let repo = parse_index("x", r#"{"resources":[{}]}"#).unwrap();
        assert_eq!(repo.resources().len(), 1);
    }
}
