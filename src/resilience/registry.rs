//! Process-wide table of named policies.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::PolicyConfig;
use crate::resilience::policy::{Policy, PolicySnapshot};

#[derive(Debug, Default)]
pub struct ResilienceRegistry {
    policies: DashMap<String, Arc<Policy>>,
}

impl ResilienceRegistry {
    pub fn from_config(configs: &HashMap<String, PolicyConfig>) -> Self {
        let policies = DashMap::new();
        for (name, config) in configs {
            policies.insert(name.clone(), Arc::new(Policy::from_config(name, config)));
        }
        tracing::debug!(count = policies.len(), "Resilience policies registered");
        Self { policies }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Policy>> {
        self.policies.get(name).map(|entry| entry.value().clone())
    }

    /// Look up `name`, falling back to a pass-through policy registered
    /// under that name.
    pub fn get_or_passthrough(&self, name: &str) -> Arc<Policy> {
        self.policies
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::warn!(policy = %name, "No policy configured, calls pass through unprotected");
                Arc::new(Policy::passthrough(name))
            })
            .value()
            .clone()
    }

    /// Snapshots sorted by policy name.
    pub fn snapshots(&self) -> Vec<PolicySnapshot> {
        let mut snapshots: Vec<_> = self
            .policies
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Force the named policy's breaker closed.
    ///
    /// Returns `false` if the policy is unknown or has no breaker.
    pub fn reset(&self, name: &str) -> bool {
        match self.get(name) {
            Some(policy) => match policy.circuit_breaker() {
                Some(breaker) => {
                    breaker.reset();
                    tracing::info!(policy = %name, "Circuit breaker reset");
                    true
                }
                None => false,
            },
            None => false,
        }
    }
}
