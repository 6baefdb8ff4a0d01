//! Typed attribute bags attached to capabilities and requirements.

use crate::version::{Version, VersionError};
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Insertion-ordered attribute map.
pub type Attrs = IndexMap<String, AttrValue>;

/// Insertion-ordered directive map (`key:=value`).
pub type Directives = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Version(Version),
    Long(i64),
    Double(f64),
    List(Vec<String>),
    VersionList(Vec<Version>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttrError {
    #[error("unknown attribute type '{0}'")]
    UnknownType(String),

    #[error("'{value}' is not a valid {kind}")]
    BadValue { kind: &'static str, value: String },

    #[error(transparent)]
    Version(#[from] VersionError),
}

impl AttrValue {
    /// Builds a value from the `Type` part of a `name:Type=value` attribute.
    /// `None` means an untyped (string) attribute.
    pub fn parse_typed(kind: Option<&str>, raw: &str) -> Result<AttrValue, AttrError> {
        let Some(kind) = kind else {
            return Ok(AttrValue::String(raw.to_string()));
        };
        match kind.trim() {
            "String" => Ok(AttrValue::String(raw.to_string())),
            "Version" => Ok(AttrValue::Version(raw.parse()?)),
            "Long" => raw
                .trim()
                .parse()
                .map(AttrValue::Long)
                .map_err(|_| AttrError::BadValue {
                    kind: "Long",
                    value: raw.to_string(),
                }),
            "Double" => raw
                .trim()
                .parse()
                .map(AttrValue::Double)
                .map_err(|_| AttrError::BadValue {
                    kind: "Double",
                    value: raw.to_string(),
                }),
            "List" | "List<String>" => Ok(AttrValue::List(split_list(raw))),
            "List<Version>" => split_list(raw)
                .iter()
                .map(|s| s.parse())
                .collect::<Result<Vec<Version>, _>>()
                .map(AttrValue::VersionList)
                .map_err(AttrError::from),
            other => Err(AttrError::UnknownType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_version(&self) -> Option<&Version> {
        match self {
            AttrValue::Version(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the value kind, as written in typed headers.
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::String(_) => "String",
            AttrValue::Version(_) => "Version",
            AttrValue::Long(_) => "Long",
            AttrValue::Double(_) => "Double",
            AttrValue::List(_) => "List<String>",
            AttrValue::VersionList(_) => "List<Version>",
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<Version> for AttrValue {
    fn from(v: Version) -> Self {
        AttrValue::Version(v)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Long(n)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::String(s) => f.write_str(s),
            AttrValue::Version(v) => write!(f, "{v}"),
            AttrValue::Long(n) => write!(f, "{n}"),
            AttrValue::Double(d) => write!(f, "{d}"),
            AttrValue::List(items) => f.write_str(&items.join(",")),
            AttrValue::VersionList(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                f.write_str(&rendered.join(","))
            }
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
