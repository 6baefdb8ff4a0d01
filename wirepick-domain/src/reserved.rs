use wirepick_types::{AttrValue, Capability, ns};

/// Packages and namespaces that only the system resource may provide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedSet {
    packages: Vec<String>,
    namespaces: Vec<String>,
}

impl ReservedSet {
    pub fn new(packages: &[String], namespaces: &[String]) -> Self {
        Self {
            packages: packages.iter().map(|p| p.trim().to_string()).collect(),
            namespaces: namespaces.iter().map(|n| n.trim().to_string()).collect(),
        }
    }

    pub fn is_reserved_namespace(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|n| n == namespace)
    }

    pub fn is_reserved_package(&self, package: &str) -> bool {
        self.packages.iter().any(|pat| glob_match(pat, package))
    }

    /// True if a repository capability must not be offered as a candidate.
    pub fn excludes(&self, cap: &Capability) -> bool {
        if self.is_reserved_namespace(cap.namespace()) {
            return true;
        }
        cap.namespace() == ns::PACKAGE
            && cap
                .attr(ns::PACKAGE)
                .and_then(AttrValue::as_str)
                .is_some_and(|pkg| self.is_reserved_package(pkg))
    }
}

/// Matches a package name against a reserved-package pattern. `*` spans any
/// run of characters, dots included, and `?` matches exactly one.
fn glob_match(pattern: &str, package: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = package.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        match pat.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                Some((star_p, star_n)) => {
                    p = star_p + 1;
                    n = star_n + 1;
                    star = Some((star_p, star_n + 1));
                }
                None => return false,
            },
        }
    }
    pat[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirepick_types::Resource;
    use wirepick_types::run::{DEFAULT_RESERVED_NAMESPACES, DEFAULT_RESERVED_PACKAGES};

    fn defaults() -> ReservedSet {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ReservedSet::new(
            &owned(DEFAULT_RESERVED_PACKAGES),
            &owned(DEFAULT_RESERVED_NAMESPACES),
        )
    }

    #[test]
    fn package_patterns() {
        let set = defaults();
        assert!(set.is_reserved_package("java.security"));
        assert!(set.is_reserved_package("org.osgi.framework"));
        assert!(!set.is_reserved_package("org.osgi.framework.hooks"));
        assert!(!set.is_reserved_package("javax.annotation"));
        assert!(!set.is_reserved_package("java"));
    }

    #[test]
    fn package_globs_span_dots() {
        assert!(glob_match("org.osgi.*", "org.osgi.util.tracker"));
        assert!(glob_match("java.*", "java.lang"));
        assert!(!glob_match("java.*", "javax.net"));
        assert!(glob_match("javax.?et", "javax.net"));
        assert!(!glob_match("javax.?et", "javax.et"));
        assert!(glob_match("*.internal.*", "org.example.internal.impl"));
        assert!(glob_match("sun.*", "sun."));
        assert!(!glob_match("sun.*", "sun"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn excludes_reserved_capabilities_only() {
        let r = Resource::builder()
            .capability(Capability::builder(ns::PACKAGE).attr(ns::PACKAGE, "java.lang"))
            .capability(Capability::builder(ns::PACKAGE).attr(ns::PACKAGE, "org.example"))
            .capability(Capability::builder(ns::EXECUTION_ENVIRONMENT).attr("osgi.ee", "JavaSE"))
            .build();
        let set = defaults();
        let excluded: Vec<bool> = r.capabilities().iter().map(|c| set.excludes(c)).collect();
        assert_eq!(excluded, vec![true, false, true]);
        assert!(!ReservedSet::default().excludes(&r.capabilities()[0]));
    }
}
