//! Manifest-style header clauses: `name;attr=value;typed:Version=1.0;dir:="x,y", other`.

use crate::attrs::{AttrError, AttrValue, Attrs, Directives};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("unterminated quote in '{0}'")]
    UnterminatedQuote(String),

    #[error("clause '{0}' has parameters but no name")]
    MissingName(String),

    #[error("empty parameter key in clause '{0}'")]
    EmptyKey(String),

    #[error("attribute '{key}': {source}")]
    Attr {
        key: String,
        #[source]
        source: AttrError,
    },
}

/// One clause of a header. Clauses declaring several names
/// (`a;b;version=1`) are expanded into one `Clause` per name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
    pub name: String,
    pub attrs: Attrs,
    pub directives: Directives,
}

impl Clause {
    pub fn directive(&self, key: &str) -> Option<&str> {
        self.directives.get(key).map(String::as_str)
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }
}

pub fn parse_header(input: &str) -> Result<Vec<Clause>, HeaderError> {
    let mut out = Vec::new();
    for raw in split_unquoted(input, ',')? {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let mut names = Vec::new();
        let mut attrs = Attrs::new();
        let mut directives = Directives::new();

        for piece in split_unquoted(raw, ';')? {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let Some((key, value)) = piece.split_once('=') else {
                names.push(piece.to_string());
                continue;
            };
            if names.is_empty() {
                return Err(HeaderError::MissingName(raw.to_string()));
            }

            let value = unquote(value.trim());
            if let Some(dir) = key.trim().strip_suffix(':') {
                let dir = dir.trim();
                if dir.is_empty() {
                    return Err(HeaderError::EmptyKey(raw.to_string()));
                }
                directives.insert(dir.to_string(), value.to_string());
                continue;
            }

            let (name, kind) = match key.split_once(':') {
                Some((name, kind)) => (name.trim(), Some(kind.trim())),
                None => (key.trim(), None),
            };
            if name.is_empty() {
                return Err(HeaderError::EmptyKey(raw.to_string()));
            }
            let parsed = AttrValue::parse_typed(kind, value).map_err(|source| HeaderError::Attr {
                key: name.to_string(),
                source,
            })?;
            attrs.insert(name.to_string(), parsed);
        }

        if names.is_empty() {
            return Err(HeaderError::MissingName(raw.to_string()));
        }
        for name in names {
            out.push(Clause {
                name,
                attrs: attrs.clone(),
                directives: directives.clone(),
            });
        }
    }
    Ok(out)
}

/// Splits on `sep` outside single or double quotes.
fn split_unquoted(input: &str, sep: char) -> Result<Vec<&str>, HeaderError> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == sep => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            None => {}
        }
    }
    if quote.is_some() {
        return Err(HeaderError::UnterminatedQuote(input.to_string()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value.strip_prefix(q).and_then(|v| v.strip_suffix(q))
        {
            return inner;
        }
    }
    value
}
