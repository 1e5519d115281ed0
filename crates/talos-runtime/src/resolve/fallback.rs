// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fallback provider election.
//!
//! A fallback system is only instantiated when at least one capability it
//! provides is still unbound after the primary pass. With several fallback
//! candidates for the same capability, a configured override picks the
//! implementation; otherwise the first candidate in dependency order wins
//! and the ambiguity is reported once.

use std::collections::HashMap;
use std::sync::Arc;

use talos_core::{CapabilityId, SystemSpec};

use crate::config::RuntimeSettings;
use crate::registry::SystemRegistry;
use crate::report::{FallbackAmbiguity, ResolutionReport};

/// Capability-to-candidates index over the sorted fallback set.
pub(crate) struct FallbackIndex {
    providers: HashMap<CapabilityId, Vec<CapabilityId>>,
}

impl FallbackIndex {
    /// Indexes each provided capability to its candidates, preserving the
    /// sorted candidate order.
    pub fn build(sorted: &[Arc<SystemSpec>]) -> Self {
        let mut providers: HashMap<CapabilityId, Vec<CapabilityId>> = HashMap::new();
        for spec in sorted {
            for provided in spec.provides() {
                providers.entry(provided.id()).or_default().push(spec.key());
            }
        }
        Self { providers }
    }

    fn providers_of(&self, capability: CapabilityId) -> &[CapabilityId] {
        self.providers
            .get(&capability)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Decides whether the fallback `spec` should be instantiated.
///
/// Checked against the live registry: capabilities bound by primaries or by
/// fallbacks elected earlier in the same pass no longer need a provider. A
/// single unbound capability won by this candidate is enough.
pub(crate) fn should_register(
    spec: &SystemSpec,
    registry: &SystemRegistry,
    index: &FallbackIndex,
    settings: &RuntimeSettings,
    report: &mut ResolutionReport,
) -> bool {
    for provided in spec.provides() {
        let capability = provided.id();
        if registry.has_binding(capability) {
            continue;
        }

        if let Some(selected) = settings.override_for(capability) {
            if spec.key().name() == selected {
                return true;
            }
            continue;
        }

        let candidates = index.providers_of(capability);
        if candidates.first() != Some(&spec.key()) {
            continue;
        }
        if candidates.len() > 1 {
            let names: Vec<String> = candidates
                .iter()
                .map(|key| key.short_name().to_string())
                .collect();
            log::warn!(
                "Multiple fallback providers for '{}' ({}); using '{}'",
                capability.short_name(),
                names.join(", "),
                spec.name()
            );
            report.ambiguities.push(FallbackAmbiguity {
                capability: capability.short_name().to_string(),
                winner: spec.name().to_string(),
                candidates: names,
            });
        }
        return true;
    }
    false
}
