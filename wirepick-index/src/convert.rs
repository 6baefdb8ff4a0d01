use crate::model::{IndexEntry, IndexFile, IndexResource};
use serde_json::Value;
use thiserror::Error;
use wirepick_types::attrs::AttrError;
use wirepick_types::{AttrValue, Capability, Requirement, Resource, ns};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("resource #{resource}: attribute '{key}': {source}")]
    Attribute {
        resource: usize,
        key: String,
        #[source]
        source: AttrError,
    },

    #[error("resource #{resource}: attribute '{key}' has unsupported value {value}")]
    Value {
        resource: usize,
        key: String,
        value: String,
    },

    #[error("resource #{resource}: empty namespace")]
    EmptyNamespace { resource: usize },
}

/// Converts a parsed index file into resources, in file order.
pub fn to_resources(file: &IndexFile) -> Result<Vec<Resource>, IndexError> {
    file.resources
        .iter()
        .enumerate()
        .map(|(idx, r)| to_resource(idx, r))
        .collect()
}

fn to_resource(idx: usize, entry: &IndexResource) -> Result<Resource, IndexError> {
    let mut builder = Resource::builder();
    for cap in &entry.capabilities {
        let mut b = Capability::builder(namespace(idx, cap)?);
        for (key, value) in &cap.attributes {
            let (name, parsed) = attribute(idx, key, value)?;
            b = b.attr(name, parsed);
        }
        for (key, value) in &cap.directives {
            b = b.directive(key.as_str(), value.as_str());
        }
        builder = builder.capability(b);
    }
    for req in &entry.requirements {
        let mut b = Requirement::builder(namespace(idx, req)?);
        for (key, value) in &req.attributes {
            let (name, parsed) = attribute(idx, key, value)?;
            b = b.attr(name, parsed);
        }
        for (key, value) in &req.directives {
            b = b.directive(key.as_str(), value.as_str());
        }
        builder = builder.requirement(b);
    }
    if let Some(location) = &entry.location {
        builder = builder.location(location.as_str());
    }
    Ok(builder.build())
}

fn namespace(resource: usize, entry: &IndexEntry) -> Result<&str, IndexError> {
    let ns = entry.namespace.trim();
    if ns.is_empty() {
        return Err(IndexError::EmptyNamespace { resource });
    }
    Ok(ns)
}

fn attribute<'a>(
    resource: usize,
    key: &'a str,
    value: &Value,
) -> Result<(&'a str, AttrValue), IndexError> {
    let (name, kind) = match key.split_once(':') {
        Some((name, kind)) => (name.trim(), Some(kind.trim())),
        None => (key.trim(), None),
    };
    let unsupported = || IndexError::Value {
        resource,
        key: key.to_string(),
        value: value.to_string(),
    };

    let typed = |kind: &str, raw: &str| {
        AttrValue::parse_typed(Some(kind), raw).map_err(|source| IndexError::Attribute {
            resource,
            key: key.to_string(),
            source,
        })
    };

    let parsed = match (kind, value) {
        (None, Value::String(s)) if is_version_attribute(name) => typed("Version", s)?,
        (None, Value::String(s)) => AttrValue::String(s.clone()),
        (None, Value::Number(n)) => match n.as_i64() {
            Some(i) => AttrValue::Long(i),
            None => AttrValue::Double(n.as_f64().ok_or_else(unsupported)?),
        },
        (None, Value::Array(items)) => AttrValue::List(
            items
                .iter()
                .map(|v| scalar(v).ok_or_else(unsupported))
                .collect::<Result<_, _>>()?,
        ),
        (Some(kind), value) => {
            let raw = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|v| scalar(v).ok_or_else(unsupported))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(","),
                other => scalar(other).ok_or_else(unsupported)?,
            };
            typed(kind, &raw)?
        }
        _ => return Err(unsupported()),
    };
    Ok((name, parsed))
}

/// Untyped strings under these names still compare as versions in filters.
fn is_version_attribute(name: &str) -> bool {
    name == ns::VERSION_ATTRIBUTE || name == ns::BUNDLE_VERSION_ATTRIBUTE
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
