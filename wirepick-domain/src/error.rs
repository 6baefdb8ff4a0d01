//! Error types for the resolve context.
//!
//! Only malformed input is an error. An empty candidate list, a missing
//! framework or an unsatisfiable requirement are normal outcomes that the
//! solver reports on its own.

use thiserror::Error;
use wirepick_types::{FilterError, HeaderError, VersionError};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// A configuration header could not be parsed.
    #[error("invalid {key}: {source}")]
    Config {
        key: &'static str,
        #[source]
        source: HeaderError,
    },

    /// A configured requirement (blacklist, run requirement) has a bad filter.
    #[error("invalid filter in {key}: {source}")]
    ConfigFilter {
        key: &'static str,
        #[source]
        source: FilterError,
    },

    #[error("invalid framework version range: {0}")]
    FrameworkRange(#[source] VersionError),

    #[error("unknown execution environment '{0}'")]
    UnknownExecutionEnvironment(String),

    /// A system capability clause is malformed after macro expansion.
    #[error("malformed system capability '{clause}': {message}")]
    SystemCapability { clause: String, message: String },

    /// The requirement being resolved carries a malformed filter.
    #[error("requirement {requirement} has a malformed filter: {source}")]
    Filter {
        requirement: String,
        #[source]
        source: FilterError,
    },

    #[error("repository '{name}' failed: {source:#}")]
    Repository {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolveError {
    /// True for errors caused by the run description rather than by a lookup.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ResolveError::Config { .. }
                | ResolveError::ConfigFilter { .. }
                | ResolveError::FrameworkRange(_)
                | ResolveError::UnknownExecutionEnvironment(_)
                | ResolveError::SystemCapability { .. }
        )
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use wirepick_types::{Filter, parse_header};

    #[test]
    fn config_errors_name_the_key() {
        let source = parse_header("a;b:=\"x").unwrap_err();
        let err = ResolveError::Config {
            key: "effective",
            source,
        };
        assert!(err.is_configuration());
        assert!(err.to_string().starts_with("invalid effective"));
    }

    #[test]
    fn lookup_errors_are_not_configuration() {
        let err = ResolveError::Filter {
            requirement: "osgi.wiring.package".to_string(),
            source: Filter::parse("(x").unwrap_err(),
        };
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("malformed filter"));

        let err = ResolveError::Repository {
            name: "Repository1".to_string(),
            source: anyhow::anyhow!("index unavailable"),
        };
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("index unavailable"));
    }
}
