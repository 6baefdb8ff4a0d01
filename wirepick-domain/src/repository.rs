use crate::ports::Repository;
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;
use wirepick_types::{CapabilityRef, Requirement, Resource};

/// In-memory repository with a per-namespace capability index.
///
/// Results follow resource order, then capability order within a resource.
#[derive(Debug, Clone)]
pub struct IndexedRepository {
    name: String,
    resources: Vec<Arc<Resource>>,
    by_namespace: HashMap<String, Vec<(usize, usize)>>,
}

impl IndexedRepository {
    pub fn new(name: impl Into<String>, resources: Vec<Resource>) -> Self {
        let resources: Vec<Arc<Resource>> = resources.into_iter().map(Arc::new).collect();
        let mut by_namespace: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
        for (r_idx, resource) in resources.iter().enumerate() {
            for (c_idx, cap) in resource.capabilities().iter().enumerate() {
                by_namespace
                    .entry(cap.namespace().to_string())
                    .or_default()
                    .push((r_idx, c_idx));
            }
        }
        Self {
            name: name.into(),
            resources,
            by_namespace,
        }
    }

    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.resources
    }

    fn providers_for(&self, requirement: &Requirement) -> anyhow::Result<Vec<CapabilityRef>> {
        let filter = requirement
            .filter()
            .with_context(|| format!("requirement {requirement}"))?;
        let Some(entries) = self.by_namespace.get(requirement.namespace()) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for &(r_idx, c_idx) in entries {
            let resource = &self.resources[r_idx];
            let cap = &resource.capabilities()[c_idx];
            if filter.as_ref().is_none_or(|f| f.matches(cap.attrs()))
                && let Some(found) = CapabilityRef::new(Arc::clone(resource), c_idx)
            {
                out.push(found);
            }
        }
        Ok(out)
    }
}

impl Repository for IndexedRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_providers(
        &self,
        requirements: &[Requirement],
    ) -> anyhow::Result<Vec<Vec<CapabilityRef>>> {
        requirements
            .iter()
            .map(|r| self.providers_for(r))
            .collect()
    }
}
