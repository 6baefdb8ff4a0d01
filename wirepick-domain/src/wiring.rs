use std::sync::Arc;
use wirepick_types::{CapabilityRef, Requirement, Resource};

/// A requirement bound to the capability that satisfied it.
#[derive(Debug, Clone)]
pub struct Wire {
    requirement: Requirement,
    provider: CapabilityRef,
}

impl Wire {
    pub fn new(requirement: Requirement, provider: CapabilityRef) -> Self {
        Self {
            requirement,
            provider,
        }
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn provider(&self) -> &CapabilityRef {
        &self.provider
    }
}

/// An already resolved resource and its required wires.
#[derive(Debug, Clone)]
pub struct Wiring {
    resource: Arc<Resource>,
    wires: Vec<Wire>,
}

impl Wiring {
    pub fn new(resource: Arc<Resource>) -> Self {
        Self {
            resource,
            wires: Vec::new(),
        }
    }

    pub fn wire(mut self, wire: Wire) -> Self {
        self.wires.push(wire);
        self
    }

    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Resources this wiring depends on, in wire order, each listed once.
    pub fn providers(&self) -> Vec<&Arc<Resource>> {
        let mut out: Vec<&Arc<Resource>> = Vec::new();
        for wire in &self.wires {
            let provider = wire.provider.resource();
            if !out.iter().any(|seen| seen.id() == provider.id()) {
                out.push(provider);
            }
        }
        out
    }
}
