use crate::blacklist::Blacklist;
use crate::effective::EffectiveInstruction;
use crate::error::{ResolveError, ResolveResult};
use crate::macros::{MacroExpander, PropertyExpander};
use crate::ports::{HookCandidates, Repository, ResolverHook};
use crate::ranking::{Candidate, CandidateRanker};
use crate::reserved::ReservedSet;
use crate::system::SystemSpec;
use crate::wiring::Wiring;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use wirepick_types::{
    AttrValue, CapabilityRef, Filter, Requirement, RequirementBuilder, Resource, ResourceId,
    RunSpec, Version, VersionRange, ns, parse_header,
};

/// Collects the run description and collaborators of a [`ResolveContext`].
pub struct ResolveContextBuilder {
    run: RunSpec,
    repositories: Vec<Arc<dyn Repository>>,
    hooks: Vec<Box<dyn ResolverHook>>,
    expander: Option<Box<dyn MacroExpander>>,
    wirings: Vec<Wiring>,
}

impl ResolveContextBuilder {
    pub fn new(run: RunSpec) -> Self {
        Self {
            run,
            repositories: Vec::new(),
            hooks: Vec::new(),
            expander: None,
            wirings: Vec::new(),
        }
    }

    /// Registers a repository. Registration order is the default repository order.
    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repositories.push(repository);
        self
    }

    /// Hooks run in registration order.
    pub fn hook(mut self, hook: Box<dyn ResolverHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Defaults to a [`PropertyExpander`] for the current host.
    pub fn expander(mut self, expander: Box<dyn MacroExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn wiring(mut self, wiring: Wiring) -> Self {
        self.wirings.push(wiring);
        self
    }

    /// Parses and validates the whole run description.
    pub fn build(self) -> ResolveResult<ResolveContext> {
        let run = self.run;
        let expander = self
            .expander
            .unwrap_or_else(|| Box::new(PropertyExpander::default()));

        let effective = EffectiveInstruction::parse(run.effective.as_deref())
            .map_err(|source| ResolveError::Config {
                key: "effective",
                source,
            })?;
        let blacklist = Blacklist::parse(&run.blacklist)?;
        let framework = framework_requirement(run.framework.as_deref())?;
        let preferences = preference_names(run.resolve_preferences.as_deref())?;
        let initial = initial_resource(&run.run_requires)?;
        let system = SystemSpec::parse(&run, expander.as_ref())?;
        let reserved = ReservedSet::new(&run.reserved_packages, &run.reserved_namespaces);
        let repositories = order_repositories(self.repositories, &run.run_repos);

        debug!(
            repositories = repositories.len(),
            hooks = self.hooks.len(),
            blacklist = blacklist.len(),
            "built resolve context"
        );

        Ok(ResolveContext {
            effective,
            blacklist,
            framework_requirement: framework,
            ranker: CandidateRanker::new(preferences),
            initial: initial.map(Arc::new),
            system,
            reserved,
            repositories,
            hooks: self.hooks,
            wirings: self
                .wirings
                .into_iter()
                .map(|w| (w.resource().id(), w))
                .collect(),
            framework: OnceLock::new(),
            system_resource: OnceLock::new(),
        })
    }
}

/// Candidate-selection policy for one resolution session.
///
/// Everything is computed from immutable inputs; the framework and system
/// resources are derived on first use and then fixed for the context's
/// lifetime.
pub struct ResolveContext {
    effective: EffectiveInstruction,
    blacklist: Blacklist,
    framework_requirement: Option<Requirement>,
    ranker: CandidateRanker,
    initial: Option<Arc<Resource>>,
    system: SystemSpec,
    reserved: ReservedSet,
    repositories: Vec<Arc<dyn Repository>>,
    hooks: Vec<Box<dyn ResolverHook>>,
    wirings: IndexMap<ResourceId, Wiring>,
    framework: OnceLock<Option<Arc<Resource>>>,
    system_resource: OnceLock<Arc<Resource>>,
}

impl ResolveContext {
    pub fn builder(run: RunSpec) -> ResolveContextBuilder {
        ResolveContextBuilder::new(run)
    }

    pub fn is_effective(&self, requirement: &Requirement) -> bool {
        self.effective.is_effective(requirement)
    }

    pub fn is_blacklisted(&self, resource: &Resource) -> bool {
        self.blacklist.is_blacklisted(resource)
    }

    /// Repository names in query order.
    pub fn repository_names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name()).collect()
    }

    pub fn wirings(&self) -> &IndexMap<ResourceId, Wiring> {
        &self.wirings
    }

    /// The `<<INITIAL>>` resource carrying the run requirements, if any.
    pub fn initial_resource(&self) -> Option<&Arc<Resource>> {
        self.initial.as_ref()
    }

    /// The framework requirement as queried against the repositories.
    pub fn framework_requirement(&self) -> Option<&Requirement> {
        self.framework_requirement.as_ref()
    }

    /// Highest-version, non-blacklisted repository match for the framework
    /// requirement. `None` when no framework is declared or nothing matches.
    pub fn framework_resource(&self) -> ResolveResult<Option<Arc<Resource>>> {
        if let Some(selected) = self.framework.get() {
            return Ok(selected.clone());
        }
        let selected = self.select_framework()?;
        Ok(self.framework.get_or_init(|| selected).clone())
    }

    pub fn system_resource(&self) -> ResolveResult<Arc<Resource>> {
        if let Some(system) = self.system_resource.get() {
            return Ok(Arc::clone(system));
        }
        let framework = self.framework_resource()?;
        let built = Arc::new(self.system.build(framework.as_deref()));
        Ok(Arc::clone(self.system_resource.get_or_init(|| built)))
    }

    /// The system resource when a framework was selected, then the
    /// `<<INITIAL>>` resource when run requirements are declared.
    pub fn mandatory_resources(&self) -> ResolveResult<Vec<Arc<Resource>>> {
        let mut out = Vec::new();
        if self.framework_resource()?.is_some() {
            out.push(self.system_resource()?);
        }
        if let Some(initial) = &self.initial {
            out.push(Arc::clone(initial));
        }
        Ok(out)
    }

    /// Ranked, filtered providers for `requirement`.
    pub fn find_providers(&self, requirement: &Requirement) -> ResolveResult<Vec<CapabilityRef>> {
        let filter = requirement
            .filter()
            .map_err(|source| ResolveError::Filter {
                requirement: requirement.to_string(),
                source,
            })?;
        let accepts = |cap: &CapabilityRef| {
            cap.capability().namespace() == requirement.namespace()
                && filter
                    .as_ref()
                    .is_none_or(|f: &Filter| f.matches(cap.capability().attrs()))
        };

        let system = self.system_resource()?;
        let framework_id = self.framework_resource()?.map(|fw| fw.id());
        let mut seen: HashSet<(ResourceId, usize)> = HashSet::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        // Blacklisting of the platform happens once, on the framework's own
        // repository capabilities, in `select_framework`.
        for cap in CapabilityRef::all(&system).filter(|c| accepts(c)) {
            seen.insert((system.id(), cap.index()));
            candidates.push(Candidate {
                capability: cap,
                origin: 0,
            });
        }

        let mut blacklisted: HashSet<ResourceId> = HashSet::new();
        let mut admit = |cap: &CapabilityRef, seen: &mut HashSet<(ResourceId, usize)>| {
            let resource = cap.resource();
            if Some(resource.id()) == framework_id
                || resource.id() == system.id()
                || self.reserved.excludes(cap.capability())
            {
                return false;
            }
            if blacklisted.contains(&resource.id()) {
                return false;
            }
            if self.blacklist.is_blacklisted(resource) {
                debug!(resource = %resource, "skipping blacklisted resource");
                blacklisted.insert(resource.id());
                return false;
            }
            seen.insert((resource.id(), cap.index()))
        };

        for (position, repository) in self.repositories.iter().enumerate() {
            for cap in self.query(repository.as_ref(), requirement)? {
                if admit(&cap, &mut seen) {
                    candidates.push(Candidate {
                        capability: cap,
                        origin: position + 1,
                    });
                }
            }
        }

        let wired_origin = self.repositories.len() + 1;
        for wiring in self.wirings.values() {
            for cap in CapabilityRef::all(wiring.resource()).filter(|c| accepts(c)) {
                if admit(&cap, &mut seen) {
                    candidates.push(Candidate {
                        capability: cap,
                        origin: wired_origin,
                    });
                }
            }
        }

        let ranked = self.ranker.rank(requirement, Some(system.id()), candidates);
        Ok(self.apply_hooks(requirement, system.id(), ranked))
    }

    fn apply_hooks(
        &self,
        requirement: &Requirement,
        system: ResourceId,
        ranked: Vec<CapabilityRef>,
    ) -> Vec<CapabilityRef> {
        if self.hooks.is_empty() {
            return ranked;
        }
        let is_system = |c: &CapabilityRef| c.resource().id() == system;

        let mut exposed: Vec<CapabilityRef> =
            ranked.iter().filter(|c| !is_system(*c)).cloned().collect();
        let before = exposed.len();
        for hook in &self.hooks {
            hook.filter_matches(requirement, &mut HookCandidates::new(&mut exposed));
        }
        if exposed.len() != before {
            debug!(
                requirement = %requirement,
                removed = before - exposed.len(),
                "resolver hooks removed candidates"
            );
        }

        let mut kept = exposed.into_iter().peekable();
        ranked
            .into_iter()
            .filter(|c| is_system(c) || kept.next_if_eq(c).is_some())
            .collect()
    }

    fn query(
        &self,
        repository: &dyn Repository,
        requirement: &Requirement,
    ) -> ResolveResult<Vec<CapabilityRef>> {
        let found = repository
            .find_providers(std::slice::from_ref(requirement))
            .map_err(|source| ResolveError::Repository {
                name: repository.name().to_string(),
                source,
            })?;
        Ok(found.into_iter().next().unwrap_or_default())
    }

    fn select_framework(&self) -> ResolveResult<Option<Arc<Resource>>> {
        let Some(requirement) = &self.framework_requirement else {
            return Ok(None);
        };

        let mut best: Option<Arc<Resource>> = None;
        for repository in &self.repositories {
            for cap in self.query(repository.as_ref(), requirement)? {
                let resource = cap.resource();
                if self.blacklist.is_blacklisted(resource) {
                    debug!(resource = %resource, "framework candidate is blacklisted");
                    continue;
                }
                if best
                    .as_ref()
                    .is_none_or(|current| resource.version() > current.version())
                {
                    best = Some(Arc::clone(resource));
                }
            }
        }

        match &best {
            Some(fw) => debug!(framework = %fw, "selected framework"),
            None => debug!(requirement = %requirement, "no framework candidate"),
        }
        Ok(best)
    }
}

/// `name;version='[4,4.1)'` becomes an identity requirement filtering on the
/// name and range. Only the first clause counts.
fn framework_requirement(header: Option<&str>) -> ResolveResult<Option<Requirement>> {
    let Some(text) = header else {
        return Ok(None);
    };
    let clauses = parse_header(text).map_err(|source| ResolveError::Config {
        key: "framework",
        source,
    })?;
    let Some(clause) = clauses.first() else {
        return Ok(None);
    };

    let identity = format!("({}={})", ns::IDENTITY, clause.name);
    let range = match clause.attr(ns::VERSION_ATTRIBUTE) {
        None => None,
        Some(AttrValue::Version(v)) => Some(VersionRange::at_least(v.clone())),
        Some(other) => Some(
            other
                .to_string()
                .parse::<VersionRange>()
                .map_err(ResolveError::FrameworkRange)?,
        ),
    };
    let filter = match range {
        Some(range) => format!("(&{identity}{})", range.to_filter(ns::VERSION_ATTRIBUTE)),
        None => identity,
    };
    Filter::parse(&filter).map_err(|source| ResolveError::ConfigFilter {
        key: "framework",
        source,
    })?;
    Ok(Some(Requirement::builder(ns::IDENTITY).filter(filter).build()))
}

fn preference_names(header: Option<&str>) -> ResolveResult<Vec<String>> {
    let Some(text) = header else {
        return Ok(Vec::new());
    };
    let clauses = parse_header(text).map_err(|source| ResolveError::Config {
        key: "resolve_preferences",
        source,
    })?;
    Ok(clauses.into_iter().map(|c| c.name).collect())
}

fn initial_resource(run_requires: &[String]) -> ResolveResult<Option<Resource>> {
    let mut requirements = Vec::new();
    for text in run_requires {
        let clauses = parse_header(text).map_err(|source| ResolveError::Config {
            key: "run_requires",
            source,
        })?;
        for clause in &clauses {
            let probe = Requirement::from_clause(clause);
            probe.filter().map_err(|source| ResolveError::ConfigFilter {
                key: "run_requires",
                source,
            })?;
            requirements.push(RequirementBuilder::from_clause(clause));
        }
    }
    if requirements.is_empty() {
        return Ok(None);
    }

    let builder = requirements.into_iter().fold(
        Resource::builder().identity(ns::INITIAL_RESOURCE, Version::default()),
        |b, req| b.requirement(req),
    );
    Ok(Some(builder.build()))
}

/// Named repositories first, in the order named; the rest keep registration order.
fn order_repositories(
    registered: Vec<Arc<dyn Repository>>,
    names: &[String],
) -> Vec<Arc<dyn Repository>> {
    let mut remaining: Vec<Option<Arc<dyn Repository>>> = registered.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());
    for name in names {
        let slot = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|r| r.name() == name));
        match slot.and_then(Option::take) {
            Some(repository) => ordered.push(repository),
            None => debug!(repository = %name, "run_repos names an unknown repository"),
        }
    }
    ordered.extend(remaining.into_iter().flatten());
    ordered
}
