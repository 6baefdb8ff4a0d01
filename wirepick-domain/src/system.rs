//! Synthesis of the system resource.
//!
//! The system resource stands in for the running platform: the selected
//! framework (if any) plus everything the execution environment and the run
//! description say the platform provides.

use crate::ee::ExecutionEnvironment;
use crate::error::{ResolveError, ResolveResult};
use crate::macros::MacroExpander;
use wirepick_types::attrs::AttrError;
use wirepick_types::{
    AttrValue, Capability, CapabilityBuilder, Clause, HeaderError, Resource, ResourceBuilder,
    RunSpec, Version, ns, parse_header,
};

/// Parsed, validated inputs of the system resource.
#[derive(Debug, Clone, Default)]
pub struct SystemSpec {
    ee: Option<&'static ExecutionEnvironment>,
    packages: Vec<Clause>,
    capabilities: Vec<Clause>,
}

impl SystemSpec {
    /// Fails on an unknown EE, a malformed package header, or a capability
    /// clause that is malformed after expansion.
    pub fn parse(run: &RunSpec, expander: &dyn MacroExpander) -> ResolveResult<Self> {
        let ee = match run.ee.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(
                ExecutionEnvironment::lookup(name)
                    .ok_or_else(|| ResolveError::UnknownExecutionEnvironment(name.to_string()))?,
            ),
        };

        let mut packages = match run.system_packages.as_deref() {
            Some(text) => parse_header(text).map_err(|source| ResolveError::Config {
                key: "system_packages",
                source,
            })?,
            None => Vec::new(),
        };
        for clause in &mut packages {
            normalize_package_version(clause)?;
        }

        let mut capabilities = Vec::new();
        if let Some(text) = run.system_capabilities.as_deref() {
            let expanded = expander.expand(text);
            if expanded.contains("${") {
                return Err(ResolveError::SystemCapability {
                    clause: expanded,
                    message: "unexpanded macro".to_string(),
                });
            }
            capabilities = parse_header(&expanded).map_err(|e| ResolveError::SystemCapability {
                clause: expanded.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(Self {
            ee,
            packages,
            capabilities,
        })
    }

    pub fn execution_environment(&self) -> Option<&'static ExecutionEnvironment> {
        self.ee
    }

    /// Builds the system resource on top of `framework`, or as a bare
    /// `system.bundle` when no framework was selected.
    pub fn build(&self, framework: Option<&Resource>) -> Resource {
        let mut builder = match framework {
            Some(fw) => ResourceBuilder::copy_of(fw),
            None => Resource::builder().identity(ns::SYSTEM_BUNDLE, Version::default()),
        };

        if let Some(ee) = self.ee {
            for package in ee.packages() {
                builder = builder
                    .capability(Capability::builder(ns::PACKAGE).attr(ns::PACKAGE, package));
            }
        }

        for clause in &self.packages {
            let mut cap = Capability::builder(ns::PACKAGE).attr(ns::PACKAGE, clause.name.as_str());
            for (key, value) in &clause.attrs {
                cap = cap.attr(key.as_str(), value.clone());
            }
            for (key, value) in &clause.directives {
                cap = cap.directive(key.as_str(), value.as_str());
            }
            builder = builder.capability(cap);
        }

        if let Some(ee) = self.ee {
            for compatible in ee.compatible() {
                builder = builder.capability(
                    Capability::builder(ns::EXECUTION_ENVIRONMENT)
                        .attr(ns::EXECUTION_ENVIRONMENT, compatible.name),
                );
            }
            for (family, versions) in ee.family_versions() {
                builder = builder.capability(
                    Capability::builder(ns::EXECUTION_ENVIRONMENT)
                        .attr(ns::EXECUTION_ENVIRONMENT, family)
                        .attr(ns::VERSION_ATTRIBUTE, AttrValue::VersionList(versions)),
                );
            }
        }

        for clause in &self.capabilities {
            builder = builder.capability(CapabilityBuilder::from_clause(clause));
        }

        let version = framework.map(Resource::version).unwrap_or_default();
        builder = with_aliases(builder, framework, ns::SYSTEM_BUNDLE, &version);
        if let Some(name) = framework.and_then(Resource::identity) {
            builder = with_aliases(builder, framework, name, &version);
        }
        builder.build()
    }
}

/// Adds host and bundle capabilities for `name` unless the framework already
/// declares them.
fn with_aliases(
    mut builder: ResourceBuilder,
    framework: Option<&Resource>,
    name: &str,
    version: &Version,
) -> ResourceBuilder {
    for namespace in [ns::HOST, ns::BUNDLE] {
        let declared = framework.is_some_and(|fw| {
            fw.capabilities_in(namespace)
                .any(|c| c.attr(namespace).and_then(AttrValue::as_str) == Some(name))
        });
        if !declared {
            builder = builder.capability(
                Capability::builder(namespace)
                    .attr(namespace, name)
                    .attr(ns::BUNDLE_VERSION_ATTRIBUTE, version.clone()),
            );
        }
    }
    builder
}

/// System packages may spell their version as a plain attribute.
fn normalize_package_version(clause: &mut Clause) -> ResolveResult<()> {
    if let Some(AttrValue::String(raw)) = clause.attrs.get(ns::VERSION_ATTRIBUTE) {
        let version: Version = raw.parse().map_err(|e| ResolveError::Config {
            key: "system_packages",
            source: HeaderError::Attr {
                key: ns::VERSION_ATTRIBUTE.to_string(),
                source: AttrError::Version(e),
            },
        })?;
        clause
            .attrs
            .insert(ns::VERSION_ATTRIBUTE.to_string(), AttrValue::Version(version));
    }
    Ok(())
}
