//! Property-based tests for candidate ordering and filtering.
//!
//! These tests verify that:
//! - Lookups are deterministic and a no-op hook chain changes nothing
//! - Blacklisted resources never appear, for any requirement
//! - Registration order decides between otherwise equal repositories

use proptest::prelude::*;
use std::sync::Arc;
use wirepick_domain::{
    HookCandidates, IndexedRepository, Repository, ResolveContext, ResolverHook,
};
use wirepick_types::{Capability, CapabilityRef, Requirement, Resource, RunSpec, Version, ns};

const PACKAGES: [&str; 3] = ["pkg.a", "pkg.b", "pkg.c"];

#[derive(Debug, Clone)]
struct BundleShape {
    name: String,
    major: u64,
    exports: Vec<usize>,
    extra_caps: usize,
    reqs: usize,
}

fn arb_resource() -> impl Strategy<Value = BundleShape> {
    (
        prop::sample::select(vec!["alpha", "beta", "gamma", "delta"]),
        0u64..4,
        prop::collection::btree_set(0usize..PACKAGES.len(), 1..=PACKAGES.len()),
        0usize..3,
        0usize..3,
    )
        .prop_map(|(name, major, exports, extra_caps, reqs)| BundleShape {
            name: name.to_string(),
            major,
            exports: exports.into_iter().collect(),
            extra_caps,
            reqs,
        })
}

fn arb_repositories() -> impl Strategy<Value = Vec<Vec<BundleShape>>> {
    prop::collection::vec(prop::collection::vec(arb_resource(), 0..5), 1..4)
}

fn build(shape: &BundleShape) -> Resource {
    let mut b = Resource::builder().identity(shape.name.as_str(), Version::new(shape.major, 0, 0));
    for &idx in &shape.exports {
        b = b.capability(Capability::builder(ns::PACKAGE).attr(ns::PACKAGE, PACKAGES[idx]));
    }
    for i in 0..shape.extra_caps {
        b = b.capability(Capability::builder("extra").attr("extra", i as i64));
    }
    for _ in 0..shape.reqs {
        b = b.requirement(Requirement::builder("extra"));
    }
    b.build()
}

fn repositories(shapes: &[Vec<BundleShape>]) -> Vec<Arc<dyn Repository>> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, resources)| {
            Arc::new(IndexedRepository::new(
                format!("repo{i}"),
                resources.iter().map(build).collect(),
            )) as Arc<dyn Repository>
        })
        .collect()
}

fn context(run: RunSpec, repos: &[Arc<dyn Repository>]) -> ResolveContext {
    repos
        .iter()
        .fold(ResolveContext::builder(run), |b, r| b.repository(Arc::clone(r)))
        .build()
        .unwrap()
}

fn requirement(pkg: &str) -> Requirement {
    Requirement::builder(ns::PACKAGE)
        .filter(format!("(osgi.wiring.package={pkg})"))
        .build()
}

struct KeepAll;

impl ResolverHook for KeepAll {
    fn filter_matches(&self, _: &Requirement, candidates: &mut HookCandidates<'_>) {
        candidates.retain(|_| true);
    }
}

proptest! {
    /// Same context, same requirement, same answer; a hook removing nothing is invisible.
    #[test]
    fn lookups_are_deterministic(shapes in arb_repositories(), pkg in prop::sample::select(PACKAGES.to_vec())) {
        let repos = repositories(&shapes);
        let plain = context(RunSpec::default(), &repos);
        let hooked = repos
            .iter()
            .fold(ResolveContext::builder(RunSpec::default()), |b, r| b.repository(Arc::clone(r)))
            .hook(Box::new(KeepAll))
            .build()
            .unwrap();

        let req = requirement(pkg);
        let first = plain.find_providers(&req).unwrap();
        let second = plain.find_providers(&req).unwrap();
        let third = hooked.find_providers(&req).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &third);

        let expected: usize = shapes
            .iter()
            .flatten()
            .filter(|s| s.exports.iter().any(|&i| PACKAGES[i] == pkg))
            .count();
        prop_assert_eq!(first.len(), expected);
    }

    /// A blacklisted name never shows up in any candidate list.
    #[test]
    fn blacklist_is_resource_wide(shapes in arb_repositories(), banned in prop::sample::select(vec!["alpha", "beta"])) {
        let repos = repositories(&shapes);
        let run = RunSpec {
            blacklist: vec![format!("osgi.identity;filter:='(osgi.identity={banned})'")],
            ..RunSpec::default()
        };
        let ctx = context(run, &repos);
        for pkg in PACKAGES {
            let found = ctx.find_providers(&requirement(pkg)).unwrap();
            prop_assert!(found.iter().all(|c| c.resource().identity() != Some(banned)));
        }
    }

    /// Candidates are grouped by repository, in registration order.
    #[test]
    fn repository_order_is_respected(shapes in arb_repositories(), pkg in prop::sample::select(PACKAGES.to_vec())) {
        let repos = repositories(&shapes);
        let ctx = context(RunSpec::default(), &repos);
        let found = ctx.find_providers(&requirement(pkg)).unwrap();

        let origin = |c: &CapabilityRef| {
            repos
                .iter()
                .position(|r| {
                    r.find_providers(&[requirement(pkg)])
                        .unwrap()
                        .into_iter()
                        .flatten()
                        .any(|other| other == *c)
                })
                .unwrap()
        };
        let origins: Vec<usize> = found.iter().map(origin).collect();
        prop_assert!(origins.windows(2).all(|w| w[0] <= w[1]));
    }

    /// The system resource is computed once per context.
    #[test]
    fn system_resource_is_stable(shapes in arb_repositories()) {
        let repos = repositories(&shapes);
        let ctx = context(RunSpec::default(), &repos);
        let a = ctx.system_resource().unwrap();
        let b = ctx.system_resource().unwrap();
        prop_assert!(Arc::ptr_eq(&a, &b));
    }
}
