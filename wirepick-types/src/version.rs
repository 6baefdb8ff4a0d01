//! Module versions and version ranges.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version")]
    Empty,

    #[error("invalid version '{input}': {message}")]
    Invalid { input: String, message: String },

    #[error("invalid version range '{input}': {message}")]
    InvalidRange { input: String, message: String },
}

/// A `major.minor.micro.qualifier` version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub micro: u64,
    pub qualifier: String,
}

impl Version {
    pub const fn new(major: u64, minor: u64, micro: u64) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// Parses the leading numeric parts of `input`, ignoring anything after
    /// the first non-numeric part. `"6.18.44-fc"` parses as `6.18.44`,
    /// `"5.4-rc1.7"` as `5.4.0`.
    pub fn parse_lenient(input: &str) -> Version {
        let mut parts = [0u64; 3];
        for (slot, piece) in parts.iter_mut().zip(input.trim().split('.')) {
            match piece.parse::<u64>() {
                Ok(n) => *slot = n,
                Err(_) => {
                    let digits: String = piece.chars().take_while(|c| c.is_ascii_digit()).collect();
                    if let Ok(n) = digits.parse::<u64>() {
                        *slot = n;
                    }
                    break;
                }
            }
        }
        Version::new(parts[0], parts[1], parts[2])
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(VersionError::Empty);
        }

        let invalid = |message: &str| VersionError::Invalid {
            input: input.to_string(),
            message: message.to_string(),
        };

        let mut pieces = input.splitn(4, '.');
        let mut numbers = [0u64; 3];
        for (idx, slot) in numbers.iter_mut().enumerate() {
            let Some(piece) = pieces.next() else { break };
            if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(&format!("part {} is not a number", idx + 1)));
            }
            *slot = piece
                .parse()
                .map_err(|_| invalid(&format!("part {} is out of range", idx + 1)))?;
        }

        let qualifier = pieces.next().unwrap_or_default();
        if !qualifier
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(invalid("qualifier contains illegal characters"));
        }
        if qualifier.is_empty() && input.matches('.').count() == 3 {
            return Err(invalid("empty qualifier"));
        }

        Ok(Version {
            major: numbers[0],
            minor: numbers[1],
            micro: numbers[2],
            qualifier: qualifier.to_string(),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.micro.cmp(&other.micro))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// An interval of versions. A bare version `v` means `[v, ∞)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub floor: Version,
    pub floor_inclusive: bool,
    pub ceiling: Option<Version>,
    pub ceiling_inclusive: bool,
}

impl VersionRange {
    pub fn at_least(floor: Version) -> Self {
        Self {
            floor,
            floor_inclusive: true,
            ceiling: None,
            ceiling_inclusive: false,
        }
    }

    pub fn includes(&self, v: &Version) -> bool {
        let above_floor = if self.floor_inclusive {
            *v >= self.floor
        } else {
            *v > self.floor
        };
        let below_ceiling = match &self.ceiling {
            None => true,
            Some(c) if self.ceiling_inclusive => v <= c,
            Some(c) => v < c,
        };
        above_floor && below_ceiling
    }

    /// Renders this range as a filter over `attr`.
    pub fn to_filter(&self, attr: &str) -> String {
        let floor = if self.floor_inclusive {
            format!("({attr}>={})", self.floor)
        } else {
            format!("(!({attr}<={}))", self.floor)
        };
        match &self.ceiling {
            None => floor,
            Some(c) if self.ceiling_inclusive => format!("(&{floor}({attr}<={c}))"),
            Some(c) => format!("(&{floor}(!({attr}>={c})))"),
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = |message: &str| VersionError::InvalidRange {
            input: input.to_string(),
            message: message.to_string(),
        };

        let Some(first) = input.chars().next() else {
            return Err(VersionError::Empty);
        };
        if first != '[' && first != '(' {
            return Ok(VersionRange::at_least(input.parse()?));
        }

        let last = input.chars().last().unwrap_or(first);
        if input.len() < 2 || (last != ']' && last != ')') {
            return Err(invalid("missing closing bracket"));
        }
        let body = &input[1..input.len() - 1];
        let Some((lo, hi)) = body.split_once(',') else {
            return Err(invalid("expected 'floor,ceiling'"));
        };

        let floor: Version = lo.parse()?;
        let ceiling: Version = hi.parse()?;
        if ceiling < floor {
            return Err(invalid("ceiling is below floor"));
        }

        Ok(VersionRange {
            floor,
            floor_inclusive: first == '[',
            ceiling: Some(ceiling),
            ceiling_inclusive: last == ']',
        })
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ceiling {
            None => write!(f, "{}", self.floor),
            Some(c) => write!(
                f,
                "{}{},{}{}",
                if self.floor_inclusive { '[' } else { '(' },
                self.floor,
                c,
                if self.ceiling_inclusive { ']' } else { ')' }
            ),
        }
    }
}
