//! Shared model types for the wirepick workspace.
//!
//! Everything here is plain data plus pure parsing/matching. The resolve
//! policy lives in `wirepick-domain`; file loading in `wirepick-index`.

pub mod attrs;
pub mod filter;
pub mod header;
pub mod ns;
pub mod resource;
pub mod run;
pub mod version;

pub use attrs::{AttrError, AttrValue, Attrs, Directives};
pub use filter::{Filter, FilterError};
pub use header::{Clause, HeaderError, parse_header};
pub use resource::{
    Capability, CapabilityBuilder, CapabilityRef, Requirement, RequirementBuilder, Resource,
    ResourceBuilder, ResourceId,
};
pub use run::RunSpec;
pub use version::{Version, VersionError, VersionRange};
