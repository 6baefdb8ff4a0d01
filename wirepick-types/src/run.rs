//! Run description: the declarative input the resolve context is built from.

use serde::{Deserialize, Serialize};

/// Package patterns only the running platform may export.
pub const DEFAULT_RESERVED_PACKAGES: &[&str] = &["java.*", "org.osgi.framework"];

/// Namespaces only the system resource may provide.
pub const DEFAULT_RESERVED_NAMESPACES: &[&str] = &["osgi.ee", "osgi.native"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSpec {
    /// Framework requirement, e.g. `org.apache.felix.framework;version='[4,4.1)'`.
    pub framework: Option<String>,

    /// Execution environment name, e.g. `JavaSE-1.6`.
    pub ee: Option<String>,

    /// Extra packages exported by the system resource (header syntax).
    pub system_packages: Option<String>,

    /// Extra capabilities of the system resource (header syntax, macros allowed).
    pub system_capabilities: Option<String>,

    /// Requirement clauses; any resource with a matching capability is excluded.
    pub blacklist: Vec<String>,

    /// Effective instruction, e.g. `active;skip:="ns.a,ns.b", arbitrary`.
    pub effective: Option<String>,

    /// Resource identities to prefer, in order.
    pub resolve_preferences: Option<String>,

    /// Explicit repository order by name.
    pub run_repos: Vec<String>,

    /// Top-level requirement clauses.
    pub run_requires: Vec<String>,

    /// Glob patterns of packages repositories may never provide.
    pub reserved_packages: Vec<String>,

    /// Namespaces repositories may never provide.
    pub reserved_namespaces: Vec<String>,
}

impl Default for RunSpec {
    fn default() -> Self {
        Self {
            framework: None,
            ee: None,
            system_packages: None,
            system_capabilities: None,
            blacklist: Vec::new(),
            effective: None,
            resolve_preferences: None,
            run_repos: Vec::new(),
            run_requires: Vec::new(),
            reserved_packages: DEFAULT_RESERVED_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reserved_namespaces: DEFAULT_RESERVED_NAMESPACES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
