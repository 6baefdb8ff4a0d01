//! On-disk shape of a repository index.
//!
//! ```json
//! {
//!   "resources": [{
//!     "location": "repo/org.example.a-1.0.0.jar",
//!     "capabilities": [{
//!       "namespace": "osgi.wiring.package",
//!       "attributes": { "osgi.wiring.package": "org.example.a", "version:Version": "1.0.0" },
//!       "directives": { "uses": "org.example.b" }
//!     }],
//!     "requirements": [{
//!       "namespace": "osgi.wiring.package",
//!       "directives": { "filter": "(osgi.wiring.package=org.example.b)" }
//!     }]
//!   }]
//! }
//! ```
//!
//! Attribute keys may carry a type suffix (`name:Type`). Untyped JSON numbers
//! become `Long`/`Double` and arrays become `List<String>`. Untyped `version`
//! and `bundle-version` strings are read as versions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexFile {
    pub resources: Vec<IndexResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub capabilities: Vec<IndexEntry>,
    pub requirements: Vec<IndexEntry>,
}

/// A capability or requirement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub namespace: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub directives: IndexMap<String, String>,
}
