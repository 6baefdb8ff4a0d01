use wirepick_types::{CapabilityRef, Requirement};

/// A source of capabilities.
///
/// wirepick-domain only queries repositories; how they are indexed or loaded
/// is up to the implementation (see [`IndexedRepository`](crate::IndexedRepository)
/// for the in-memory one).
pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    /// Returns one provider list per requirement, in the order of
    /// `requirements`. Each list keeps the repository's own order.
    fn find_providers(&self, requirements: &[Requirement])
    -> anyhow::Result<Vec<Vec<CapabilityRef>>>;
}

/// A plugin that may veto candidates after ranking.
pub trait ResolverHook: Send + Sync {
    fn filter_matches(&self, requirement: &Requirement, candidates: &mut HookCandidates<'_>);
}

/// The part of a ranked candidate list a [`ResolverHook`] is allowed to touch.
///
/// Hooks can look at and remove entries, never add or reorder them.
/// Capabilities of the system resource are not in this view at all.
pub struct HookCandidates<'a> {
    entries: &'a mut Vec<CapabilityRef>,
}

impl<'a> HookCandidates<'a> {
    pub(crate) fn new(entries: &'a mut Vec<CapabilityRef>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityRef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn retain(&mut self, keep: impl FnMut(&CapabilityRef) -> bool) {
        self.entries.retain(keep);
    }

    pub fn remove(&mut self, index: usize) -> Option<CapabilityRef> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }
}
