//! Resources and the capabilities/requirements they own.
//!
//! A [`Resource`] owns its capabilities and requirements outright. Those refer
//! back to their owner by [`ResourceId`] only; code that needs the owner holds
//! a [`CapabilityRef`], which pairs a shared handle to the resource with the
//! capability's index.

use crate::attrs::{AttrValue, Attrs, Directives};
use crate::filter::{Filter, FilterError};
use crate::header::Clause;
use crate::ns;
use crate::version::Version;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ResourceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    namespace: String,
    attrs: Attrs,
    directives: Directives,
    resource: ResourceId,
}

impl Capability {
    pub fn builder(namespace: impl Into<String>) -> CapabilityBuilder {
        CapabilityBuilder::new(namespace)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    namespace: String,
    attrs: Attrs,
    directives: Directives,
    resource: Option<ResourceId>,
}

impl Requirement {
    pub fn builder(namespace: impl Into<String>) -> RequirementBuilder {
        RequirementBuilder::new(namespace)
    }

    /// A synthetic requirement from a header clause: the clause name is the
    /// namespace, its directives and attributes carry over.
    pub fn from_clause(clause: &Clause) -> Requirement {
        Requirement {
            namespace: clause.name.clone(),
            attrs: clause.attrs.clone(),
            directives: clause.directives.clone(),
            resource: None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    pub fn directive(&self, key: &str) -> Option<&str> {
        self.directives.get(key).map(String::as_str)
    }

    /// Owning resource; `None` for synthetic requirements.
    pub fn resource(&self) -> Option<ResourceId> {
        self.resource
    }

    pub fn filter_text(&self) -> Option<&str> {
        self.directive(ns::FILTER_DIRECTIVE)
    }

    pub fn filter(&self) -> Result<Option<Filter>, FilterError> {
        self.filter_text().map(Filter::parse).transpose()
    }

    /// The `effective` directive, defaulting to `resolve`.
    pub fn effective(&self) -> &str {
        self.directive(ns::EFFECTIVE_DIRECTIVE)
            .unwrap_or(ns::EFFECTIVE_RESOLVE)
    }

    pub fn is_optional(&self) -> bool {
        self.directive(ns::RESOLUTION_DIRECTIVE) == Some(ns::RESOLUTION_OPTIONAL)
    }

    /// Same namespace and the filter (if any) accepts the capability's attributes.
    pub fn matches(&self, cap: &Capability) -> Result<bool, FilterError> {
        if cap.namespace != self.namespace {
            return Ok(false);
        }
        Ok(self.filter()?.is_none_or(|f| f.matches(&cap.attrs)))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)?;
        for (k, v) in &self.directives {
            write!(f, ";{k}:=\"{v}\"")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Resource {
    id: ResourceId,
    capabilities: Vec<Capability>,
    requirements: Vec<Requirement>,
    location: Option<String>,
}

impl Resource {
    pub fn builder() -> ResourceBuilder {
        ResourceBuilder::default()
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn capabilities_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a Capability> {
        self.capabilities
            .iter()
            .filter(move |c| c.namespace == namespace)
    }

    pub fn requirements_in<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a Requirement> {
        self.requirements
            .iter()
            .filter(move |r| r.namespace == namespace)
    }

    /// Content location (e.g. an artifact URI), if known.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn identity_capability(&self) -> Option<&Capability> {
        self.capabilities_in(ns::IDENTITY).next()
    }

    /// Symbolic name from the identity capability.
    pub fn identity(&self) -> Option<&str> {
        self.identity_capability()
            .and_then(|c| c.attr(ns::IDENTITY))
            .and_then(AttrValue::as_str)
    }

    /// Version from the identity capability, `0.0.0` when absent.
    pub fn version(&self) -> Version {
        let Some(value) = self.identity_capability().and_then(|c| c.attr(ns::VERSION_ATTRIBUTE))
        else {
            return Version::default();
        };
        match value {
            AttrValue::Version(v) => v.clone(),
            other => other.to_string().parse().unwrap_or_default(),
        }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Resource {}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity() {
            Some(name) => write!(f, "{name} {}", self.version()),
            None => write!(f, "<anonymous {}>", self.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapabilityBuilder {
    namespace: String,
    attrs: Attrs,
    directives: Directives,
}

impl CapabilityBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            attrs: Attrs::new(),
            directives: Directives::new(),
        }
    }

    pub fn from_clause(clause: &Clause) -> Self {
        Self {
            namespace: clause.name.clone(),
            attrs: clause.attrs.clone(),
            directives: clause.directives.clone(),
        }
    }

    fn from_capability(cap: &Capability) -> Self {
        Self {
            namespace: cap.namespace.clone(),
            attrs: cap.attrs.clone(),
            directives: cap.directives.clone(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn directive(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.insert(key.into(), value.into());
        self
    }

    fn build(self, resource: ResourceId) -> Capability {
        Capability {
            namespace: self.namespace,
            attrs: self.attrs,
            directives: self.directives,
            resource,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequirementBuilder {
    namespace: String,
    attrs: Attrs,
    directives: Directives,
}

impl RequirementBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            attrs: Attrs::new(),
            directives: Directives::new(),
        }
    }

    pub fn from_clause(clause: &Clause) -> Self {
        Self {
            namespace: clause.name.clone(),
            attrs: clause.attrs.clone(),
            directives: clause.directives.clone(),
        }
    }

    fn from_requirement(req: &Requirement) -> Self {
        Self {
            namespace: req.namespace.clone(),
            attrs: req.attrs.clone(),
            directives: req.directives.clone(),
        }
    }

    pub fn filter(self, filter: impl Into<String>) -> Self {
        self.directive(ns::FILTER_DIRECTIVE, filter)
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn directive(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.insert(key.into(), value.into());
        self
    }

    /// A requirement with no owning resource.
    pub fn build(self) -> Requirement {
        self.build_for(None)
    }

    fn build_for(self, resource: Option<ResourceId>) -> Requirement {
        Requirement {
            namespace: self.namespace,
            attrs: self.attrs,
            directives: self.directives,
            resource,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceBuilder {
    capabilities: Vec<CapabilityBuilder>,
    requirements: Vec<RequirementBuilder>,
    location: Option<String>,
}

impl ResourceBuilder {
    /// Starts from the content of `resource`; the built resource gets a fresh id.
    pub fn copy_of(resource: &Resource) -> Self {
        Self {
            capabilities: resource
                .capabilities
                .iter()
                .map(CapabilityBuilder::from_capability)
                .collect(),
            requirements: resource
                .requirements
                .iter()
                .map(RequirementBuilder::from_requirement)
                .collect(),
            location: resource.location.clone(),
        }
    }

    /// Adds an `osgi.identity` capability of type `osgi.bundle`.
    pub fn identity(self, name: impl Into<String>, version: Version) -> Self {
        self.capability(
            CapabilityBuilder::new(ns::IDENTITY)
                .attr(ns::IDENTITY, name.into())
                .attr(ns::VERSION_ATTRIBUTE, version)
                .attr(ns::TYPE_ATTRIBUTE, ns::TYPE_BUNDLE),
        )
    }

    pub fn capability(mut self, cap: CapabilityBuilder) -> Self {
        self.capabilities.push(cap);
        self
    }

    pub fn requirement(mut self, req: RequirementBuilder) -> Self {
        self.requirements.push(req);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn has_capability_in(&self, namespace: &str) -> bool {
        self.capabilities.iter().any(|c| c.namespace == namespace)
    }

    pub fn build(self) -> Resource {
        let id = ResourceId::next();
        Resource {
            id,
            capabilities: self.capabilities.into_iter().map(|c| c.build(id)).collect(),
            requirements: self
                .requirements
                .into_iter()
                .map(|r| r.build_for(Some(id)))
                .collect(),
            location: self.location,
        }
    }
}

/// A capability addressed through its owning resource.
#[derive(Clone)]
pub struct CapabilityRef {
    resource: Arc<Resource>,
    index: usize,
}

impl CapabilityRef {
    /// Returns `None` if `index` is out of bounds.
    pub fn new(resource: Arc<Resource>, index: usize) -> Option<Self> {
        (index < resource.capabilities.len()).then_some(Self { resource, index })
    }

    /// All capabilities of `resource`, in declaration order.
    pub fn all(resource: &Arc<Resource>) -> impl Iterator<Item = CapabilityRef> + '_ {
        (0..resource.capabilities.len()).map(move |index| CapabilityRef {
            resource: Arc::clone(resource),
            index,
        })
    }

    pub fn capability(&self) -> &Capability {
        &self.resource.capabilities[self.index]
    }

    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for CapabilityRef {
    fn eq(&self, other: &Self) -> bool {
        self.resource.id == other.resource.id && self.index == other.index
    }
}

impl Eq for CapabilityRef {}

impl fmt::Debug for CapabilityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CapabilityRef({} / {}[{}])",
            self.resource,
            self.capability().namespace,
            self.index
        )
    }
}
