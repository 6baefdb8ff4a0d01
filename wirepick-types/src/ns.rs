//! Well-known namespaces, attributes and directives.

pub const IDENTITY: &str = "osgi.identity";
pub const PACKAGE: &str = "osgi.wiring.package";
pub const HOST: &str = "osgi.wiring.host";
pub const BUNDLE: &str = "osgi.wiring.bundle";
pub const EXECUTION_ENVIRONMENT: &str = "osgi.ee";
pub const NATIVE: &str = "osgi.native";

pub const VERSION_ATTRIBUTE: &str = "version";
pub const BUNDLE_VERSION_ATTRIBUTE: &str = "bundle-version";
pub const TYPE_ATTRIBUTE: &str = "type";
pub const TYPE_BUNDLE: &str = "osgi.bundle";

pub const FILTER_DIRECTIVE: &str = "filter";
pub const EFFECTIVE_DIRECTIVE: &str = "effective";
pub const RESOLUTION_DIRECTIVE: &str = "resolution";
pub const RESOLUTION_OPTIONAL: &str = "optional";

pub const EFFECTIVE_RESOLVE: &str = "resolve";
pub const EFFECTIVE_ACTIVE: &str = "active";

/// Host alias every framework answers to.
pub const SYSTEM_BUNDLE: &str = "system.bundle";

/// Identity of the synthetic resource carrying the top-level requirements.
pub const INITIAL_RESOURCE: &str = "<<INITIAL>>";
