//! LDAP-style attribute filters, e.g. `(&(osgi.wiring.package=org.foo)(version>=1.5))`.
//!
//! Comparisons are typed by the *capability's* attribute kind: the filter
//! operand is parsed as a `Version`, `Long` or `Double` when the attribute
//! holds one, and compared as text otherwise. List attributes match when any
//! element matches.

use crate::attrs::{AttrValue, Attrs};
use crate::version::Version;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter '{input}' at {position}: {message}")]
pub struct FilterError {
    pub input: String,
    pub position: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    Approx,
    GreaterEq,
    LessEq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Present(String),
    Compare {
        attr: String,
        op: CompareOp,
        value: String,
    },
    /// `attr=a*b*c`; `parts` are the literal pieces between wildcards.
    Substring { attr: String, parts: Vec<String> },
}

impl Filter {
    pub fn parse(input: &str) -> Result<Filter, FilterError> {
        let mut parser = Parser {
            input,
            chars: input.chars().collect(),
            pos: 0,
        };
        parser.skip_ws();
        let filter = parser.filter()?;
        parser.skip_ws();
        if parser.pos != parser.chars.len() {
            return Err(parser.error("trailing characters after filter"));
        }
        Ok(filter)
    }

    pub fn matches(&self, attrs: &Attrs) -> bool {
        match self {
            Filter::And(items) => items.iter().all(|f| f.matches(attrs)),
            Filter::Or(items) => items.iter().any(|f| f.matches(attrs)),
            Filter::Not(inner) => !inner.matches(attrs),
            Filter::Present(attr) => attrs.contains_key(attr),
            Filter::Compare { attr, op, value } => attrs
                .get(attr)
                .is_some_and(|actual| compare_value(actual, *op, value)),
            Filter::Substring { attr, parts } => match attrs.get(attr) {
                Some(AttrValue::String(s)) => substring_match(parts, s),
                Some(AttrValue::List(items)) => items.iter().any(|s| substring_match(parts, s)),
                _ => false,
            },
        }
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::parse(s)
    }
}

fn compare_value(actual: &AttrValue, op: CompareOp, operand: &str) -> bool {
    match actual {
        AttrValue::String(s) => compare_str(s, op, operand),
        AttrValue::List(items) => items.iter().any(|s| compare_str(s, op, operand)),
        AttrValue::Version(v) => compare_version(v, op, operand),
        AttrValue::VersionList(items) => items.iter().any(|v| compare_version(v, op, operand)),
        AttrValue::Long(n) => operand
            .trim()
            .parse::<i64>()
            .is_ok_and(|rhs| ordering_satisfies(n.cmp(&rhs), op)),
        AttrValue::Double(d) => operand
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|rhs| d.partial_cmp(&rhs))
            .is_some_and(|ord| ordering_satisfies(ord, op)),
    }
}

fn compare_str(actual: &str, op: CompareOp, operand: &str) -> bool {
    match op {
        CompareOp::Approx => normalize_approx(actual) == normalize_approx(operand),
        _ => ordering_satisfies(actual.cmp(operand), op),
    }
}

fn compare_version(actual: &Version, op: CompareOp, operand: &str) -> bool {
    operand
        .parse::<Version>()
        .is_ok_and(|rhs| ordering_satisfies(actual.cmp(&rhs), op))
}

fn ordering_satisfies(ord: Ordering, op: CompareOp) -> bool {
    match op {
        CompareOp::Equal | CompareOp::Approx => ord == Ordering::Equal,
        CompareOp::GreaterEq => ord != Ordering::Less,
        CompareOp::LessEq => ord != Ordering::Greater,
    }
}

fn normalize_approx(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn substring_match(parts: &[String], text: &str) -> bool {
    let Some((first, rest)) = parts.split_first() else {
        return true;
    };
    let Some(mut remaining) = text.strip_prefix(first.as_str()) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };
    for piece in middle {
        match remaining.find(piece.as_str()) {
            Some(idx) => remaining = &remaining[idx + piece.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last.as_str())
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> FilterError {
        FilterError {
            input: self.input.to_string(),
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, c: char) -> Result<(), FilterError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn filter(&mut self) -> Result<Filter, FilterError> {
        self.expect('(')?;
        self.skip_ws();
        let filter = match self.peek() {
            Some('&') => {
                self.pos += 1;
                Filter::And(self.filter_list()?)
            }
            Some('|') => {
                self.pos += 1;
                Filter::Or(self.filter_list()?)
            }
            Some('!') => {
                self.pos += 1;
                self.skip_ws();
                Filter::Not(Box::new(self.filter()?))
            }
            Some(_) => self.item()?,
            None => return Err(self.error("unexpected end of filter")),
        };
        self.skip_ws();
        self.expect(')')?;
        Ok(filter)
    }

    fn filter_list(&mut self) -> Result<Vec<Filter>, FilterError> {
        let mut items = Vec::new();
        self.skip_ws();
        while self.peek() == Some('(') {
            items.push(self.filter()?);
            self.skip_ws();
        }
        if items.is_empty() {
            return Err(self.error("operator needs at least one operand"));
        }
        Ok(items)
    }

    fn item(&mut self) -> Result<Filter, FilterError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '=' | '~' | '>' | '<' | '(' | ')') {
                break;
            }
            self.pos += 1;
        }
        let attr: String = self.chars[start..self.pos].iter().collect();
        let attr = attr.trim().to_string();
        if attr.is_empty() {
            return Err(self.error("missing attribute name"));
        }

        let op = match self.peek() {
            Some('=') => {
                self.pos += 1;
                CompareOp::Equal
            }
            Some(c @ ('~' | '>' | '<')) => {
                self.pos += 1;
                self.expect('=')?;
                match c {
                    '~' => CompareOp::Approx,
                    '>' => CompareOp::GreaterEq,
                    _ => CompareOp::LessEq,
                }
            }
            _ => return Err(self.error("expected comparison operator")),
        };

        let (parts, has_wildcard) = self.value()?;
        if !has_wildcard {
            let value = parts.into_iter().next().unwrap_or_default();
            return Ok(Filter::Compare { attr, op, value });
        }
        if op != CompareOp::Equal {
            return Err(self.error("wildcards are only allowed with '='"));
        }
        if parts.iter().all(String::is_empty) && parts.len() == 2 {
            return Ok(Filter::Present(attr));
        }
        Ok(Filter::Substring { attr, parts })
    }

    /// Reads an operand up to the closing paren, splitting on unescaped `*`.
    fn value(&mut self) -> Result<(Vec<String>, bool), FilterError> {
        let mut parts = vec![String::new()];
        let mut has_wildcard = false;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated value")),
                Some(')') => break,
                Some('(') => return Err(self.error("unescaped '(' in value")),
                Some('\\') => {
                    self.pos += 1;
                    let Some(escaped) = self.peek() else {
                        return Err(self.error("dangling escape"));
                    };
                    if let Some(last) = parts.last_mut() {
                        last.push(escaped);
                    }
                    self.pos += 1;
                }
                Some('*') => {
                    has_wildcard = true;
                    parts.push(String::new());
                    self.pos += 1;
                }
                Some(c) => {
                    if let Some(last) = parts.last_mut() {
                        last.push(c);
                    }
                    self.pos += 1;
                }
            }
        }
        Ok((parts, has_wildcard))
    }
}
