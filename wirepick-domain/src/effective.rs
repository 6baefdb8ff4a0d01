//! Which requirements take part in resolution at all.
//!
//! `resolve` is always effective. Any other `effective:=` value must be listed
//! in the effective instruction, and the requirement's namespace must not be in
//! that clause's `skip:=` set.

use std::collections::BTreeSet;
use wirepick_types::{HeaderError, Requirement, ns, parse_header};

const SKIP_DIRECTIVE: &str = "skip";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveInstruction {
    clauses: Vec<EffectiveClause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EffectiveClause {
    value: String,
    skip: BTreeSet<String>,
}

impl EffectiveInstruction {
    pub fn parse(instruction: Option<&str>) -> Result<Self, HeaderError> {
        let Some(text) = instruction else {
            return Ok(Self::default());
        };
        let clauses = parse_header(text)?
            .into_iter()
            .map(|c| EffectiveClause {
                skip: c
                    .directive(SKIP_DIRECTIVE)
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|ns| !ns.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
                value: c.name,
            })
            .collect();
        Ok(Self { clauses })
    }

    pub fn is_effective(&self, requirement: &Requirement) -> bool {
        let value = requirement.effective();
        if value == ns::EFFECTIVE_RESOLVE {
            return true;
        }
        self.clauses
            .iter()
            .any(|c| c.value == value && !c.skip.contains(requirement.namespace()))
    }
}
