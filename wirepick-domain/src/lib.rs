//! Candidate-selection policy: decide, per requirement, which capabilities
//! may satisfy it and in what order, and which resources every solution must
//! contain.
//!
//! This crate owns *which* candidates a solver sees. It never searches for a
//! consistent wiring itself; that is the solver's job.

mod blacklist;
mod context;
mod ee;
mod effective;
mod error;
mod macros;
mod ports;
mod ranking;
mod repository;
mod reserved;
mod system;
mod wiring;

pub use blacklist::Blacklist;
pub use context::{ResolveContext, ResolveContextBuilder};
pub use ee::ExecutionEnvironment;
pub use effective::EffectiveInstruction;
pub use error::{ResolveError, ResolveResult};
pub use macros::{HostPlatform, MacroExpander, NATIVE_CAPABILITY_MACRO, PropertyExpander};
pub use ports::{HookCandidates, Repository, ResolverHook};
pub use ranking::{Candidate, CandidateRanker};
pub use repository::IndexedRepository;
pub use reserved::ReservedSet;
pub use system::SystemSpec;
pub use wiring::{Wire, Wiring};
