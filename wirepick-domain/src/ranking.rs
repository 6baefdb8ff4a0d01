//! Candidate ordering.
//!
//! Candidates are sorted on a composite key:
//!
//! 1. capabilities of the requiring resource itself,
//! 2. capabilities of the system resource,
//! 3. capabilities of preferred resources, in preference order,
//! 4. everything else,
//!
//! then by origin (system, repositories in order, wired resources), then by
//! more capabilities and fewer requirements. Within one origin, versions of
//! the same symbolic name are finally rearranged so the highest comes first.

use indexmap::IndexMap;
use std::cmp::Reverse;
use wirepick_types::{CapabilityRef, Requirement, ResourceId, Version};

/// A capability together with the position of the source it came from.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub capability: CapabilityRef,
    /// 0 for the system resource, 1..=n for repositories, n+1 for wired resources.
    pub origin: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Tier {
    Requirer,
    System,
    Preferred,
    Other,
}

#[derive(Debug, Clone)]
struct Ranked {
    capability: CapabilityRef,
    tier: Tier,
    preference: usize,
    origin: usize,
    capabilities: usize,
    requirements: usize,
    version: Version,
}

impl Ranked {
    fn bucket(&self) -> (Tier, usize, usize) {
        (self.tier, self.preference, self.origin)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CandidateRanker {
    preferences: Vec<String>,
}

impl CandidateRanker {
    /// `preferences` lists symbolic names, most preferred first.
    pub fn new(preferences: Vec<String>) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &[String] {
        &self.preferences
    }

    /// Orders `candidates` for `requirement`. Pure; equal keys keep input order.
    pub fn rank(
        &self,
        requirement: &Requirement,
        system: Option<ResourceId>,
        candidates: Vec<Candidate>,
    ) -> Vec<CapabilityRef> {
        let mut ranked: Vec<Ranked> = candidates
            .into_iter()
            .map(|c| self.classify(requirement, system, c))
            .collect();

        ranked.sort_by_key(|r| {
            (
                r.tier,
                r.preference,
                r.origin,
                Reverse(r.capabilities),
                r.requirements,
            )
        });
        highest_version_first(&mut ranked);

        ranked.into_iter().map(|r| r.capability).collect()
    }

    fn classify(
        &self,
        requirement: &Requirement,
        system: Option<ResourceId>,
        candidate: Candidate,
    ) -> Ranked {
        let resource = candidate.capability.resource();
        let preferred = resource
            .identity()
            .and_then(|name| self.preferences.iter().position(|p| p == name));
        let tier = if requirement.resource() == Some(resource.id()) {
            Tier::Requirer
        } else if system == Some(resource.id()) {
            Tier::System
        } else if preferred.is_some() {
            Tier::Preferred
        } else {
            Tier::Other
        };
        Ranked {
            tier,
            preference: if tier == Tier::Preferred {
                preferred.unwrap_or_default()
            } else {
                0
            },
            origin: candidate.origin,
            capabilities: resource.capabilities().len(),
            requirements: resource.requirements().len(),
            version: resource.version(),
            capability: candidate.capability,
        }
    }
}

/// Within each bucket, permutes the slots held by resources sharing a
/// symbolic name so versions descend. Other entries keep their slots.
fn highest_version_first(ranked: &mut [Ranked]) {
    let mut groups: IndexMap<(Tier, usize, usize, String), Vec<usize>> = IndexMap::new();
    for (slot, r) in ranked.iter().enumerate() {
        if let Some(name) = r.capability.resource().identity() {
            let (tier, preference, origin) = r.bucket();
            groups
                .entry((tier, preference, origin, name.to_string()))
                .or_default()
                .push(slot);
        }
    }

    for slots in groups.values().filter(|s| s.len() > 1) {
        let mut members: Vec<Ranked> = slots.iter().map(|&i| ranked[i].clone()).collect();
        members.sort_by(|a, b| b.version.cmp(&a.version));
        for (&slot, member) in slots.iter().zip(members) {
            ranked[slot] = member;
        }
    }
}
