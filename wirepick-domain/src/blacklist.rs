use crate::error::{ResolveError, ResolveResult};
use wirepick_types::{Filter, Requirement, Resource, parse_header};

/// Requirements that exclude every resource owning a matching capability.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: Vec<(Requirement, Option<Filter>)>,
}

impl Blacklist {
    /// Parses requirement clauses such as `osgi.identity;filter:="(osgi.identity=foo)"`.
    pub fn parse(clauses: &[String]) -> ResolveResult<Self> {
        let mut requirements = Vec::new();
        for text in clauses {
            let parsed = parse_header(text).map_err(|source| ResolveError::Config {
                key: "blacklist",
                source,
            })?;
            requirements.extend(parsed.iter().map(Requirement::from_clause));
        }
        Self::from_requirements(requirements)
    }

    pub fn from_requirements(requirements: Vec<Requirement>) -> ResolveResult<Self> {
        let entries = requirements
            .into_iter()
            .map(|r| {
                let filter = r.filter().map_err(|source| ResolveError::ConfigFilter {
                    key: "blacklist",
                    source,
                })?;
                Ok((r, filter))
            })
            .collect::<ResolveResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if any of the resource's own capabilities satisfies an entry.
    pub fn is_blacklisted(&self, resource: &Resource) -> bool {
        self.entries.iter().any(|(req, filter)| {
            resource.capabilities_in(req.namespace()).any(|cap| {
                filter
                    .as_ref()
                    .is_none_or(|f| f.matches(cap.attrs()))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirepick_types::{Capability, Version, ns};

    fn framework(version: Version) -> Resource {
        Resource::builder()
            .identity("org.apache.felix.framework", version)
            .capability(
                Capability::builder(ns::PACKAGE).attr(ns::PACKAGE, "org.osgi.framework"),
            )
            .build()
    }

    #[test]
    fn identity_and_version_filter() {
        let bl = Blacklist::parse(&[r#"osgi.identity;filter:="(&(osgi.identity=org.apache.felix.framework)(version>=4.0.1))""#.to_string()]).unwrap();
        assert_eq!(bl.len(), 1);
        assert!(bl.is_blacklisted(&framework(Version::new(4, 0, 2))));
        assert!(!bl.is_blacklisted(&framework(Version::new(4, 0, 0))));
    }

    #[test]
    fn any_capability_condemns_the_whole_resource() {
        let bl = Blacklist::parse(&[
            r#"osgi.wiring.package;filter:="(osgi.wiring.package=org.osgi.framework)""#
                .to_string(),
        ])
        .unwrap();
        assert!(bl.is_blacklisted(&framework(Version::new(4, 0, 0))));
    }

    #[test]
    fn namespace_without_filter_matches_everything_in_it() {
        let bl = Blacklist::parse(&["osgi.wiring.package".to_string()]).unwrap();
        assert!(bl.is_blacklisted(&framework(Version::new(1, 0, 0))));
        let bl = Blacklist::parse(&["osgi.extender".to_string()]).unwrap();
        assert!(!bl.is_blacklisted(&framework(Version::new(1, 0, 0))));
    }

    #[test]
    fn malformed_entries_fail() {
        assert!(matches!(
            Blacklist::parse(&[r#"osgi.identity;filter:="(broken""#.to_string()]),
            Err(ResolveError::ConfigFilter { .. })
        ));
        assert!(matches!(
            Blacklist::parse(&[r#"osgi.identity;filter:="(x=y)"#.to_string()]),
            Err(ResolveError::Config { .. })
        ));
    }

    #[test]
    fn empty_blacklist_excludes_nothing() {
        let bl = Blacklist::default();
        assert!(bl.is_empty());
        assert!(!bl.is_blacklisted(&framework(Version::new(4, 0, 0))));
    }
}
