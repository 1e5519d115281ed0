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

//! Instance, capability, and alias maps over registered systems.

use crate::config::RuntimeSettings;
use crate::report::{BindingConflict, ResolutionReport};
use std::collections::HashMap;
use talos_core::capability::{BoundCapability, CapabilityId};
use talos_core::error::SystemError;
use talos_core::handle::SystemHandle;
use talos_core::spec::SystemSpec;

/// Holds every registered instance and the lookup maps over them.
///
/// Three views exist: by concrete type, by provided capability, and by
/// alias. A capability has at most one binding; the first registered
/// provider keeps it.
#[derive(Debug, Default)]
pub(crate) struct SystemRegistry {
    instances: HashMap<CapabilityId, SystemHandle>,
    bindings: HashMap<CapabilityId, BoundCapability>,
    aliases: HashMap<String, CapabilityId>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a concrete instance of `key` exists.
    pub fn has_instance(&self, key: CapabilityId) -> bool {
        self.instances.contains_key(&key)
    }

    /// Whether `capability` currently has a provider bound.
    pub fn has_binding(&self, capability: CapabilityId) -> bool {
        self.bindings.contains_key(&capability)
    }

    /// The handle registered under the concrete key `key`, bindings aside.
    pub fn instance(&self, key: CapabilityId) -> Option<SystemHandle> {
        self.instances.get(&key).cloned()
    }

    /// The handle for `key`, checking capability bindings first and concrete
    /// instances second.
    pub fn lookup(&self, key: CapabilityId) -> Option<SystemHandle> {
        if let Some(binding) = self.bindings.get(&key) {
            return Some(binding.handle().clone());
        }
        self.instances.get(&key).cloned()
    }

    /// The full binding for `key`, synthesizing one for plain concrete
    /// instances so injection can treat every target uniformly.
    pub fn lookup_binding(&self, key: CapabilityId) -> Option<BoundCapability> {
        if let Some(binding) = self.bindings.get(&key) {
            return Some(binding.clone());
        }
        self.instances
            .get(&key)
            .map(|handle| BoundCapability::new(handle.clone(), key, None))
    }

    /// The handle registered under `alias`, if any.
    pub fn by_alias(&self, alias: &str) -> Option<SystemHandle> {
        let key = self.aliases.get(alias)?;
        self.instances.get(key).cloned()
    }

    /// Registers `handle` as the instance of `spec`'s concrete type and
    /// claims the spec's capabilities.
    ///
    /// Capability conflicts keep the existing binding and are recorded on
    /// the report; a configured override makes every other provider skip the
    /// capability silently. The caller is responsible for checking
    /// [`Self::has_instance`] first.
    pub fn insert(
        &mut self,
        spec: &SystemSpec,
        handle: &SystemHandle,
        settings: &RuntimeSettings,
        report: &mut ResolutionReport,
    ) {
        let key = spec.key();
        self.instances.insert(key, handle.clone());

        if let Some(alias) = spec.metadata().alias.as_deref() {
            if let Some(previous) = self.aliases.insert(alias.to_string(), key) {
                if previous != key {
                    log::warn!(
                        "Alias '{alias}' moved from '{}' to '{}'",
                        previous.short_name(),
                        key.short_name()
                    );
                }
            }
        }

        for provided in spec.provides() {
            let capability = provided.id();

            if let Some(selected) = settings.override_for(capability) {
                if selected != key.name() {
                    log::info!(
                        "Capability '{}' is pinned to '{selected}', not binding '{}'",
                        capability.short_name(),
                        spec.name()
                    );
                    continue;
                }
            }

            if let Some(existing) = self.bindings.get(&capability) {
                let conflict = SystemError::DuplicateBinding {
                    capability: capability.short_name().to_string(),
                    existing: existing.provider().short_name().to_string(),
                    rejected: spec.name().to_string(),
                };
                log::warn!("{conflict}");
                report.conflicts.push(BindingConflict {
                    capability: capability.short_name().to_string(),
                    existing: existing.provider().short_name().to_string(),
                    rejected: spec.name().to_string(),
                });
                continue;
            }

            self.bindings
                .insert(capability, provided.bind(handle, key));
            log::info!(
                "Capability '{}' bound to '{}'",
                capability.short_name(),
                spec.name()
            );
        }
    }

    /// Removes the instance registered under `key`, stripping every
    /// capability binding and alias pointing at it.
    pub fn remove(&mut self, key: CapabilityId) -> Option<SystemHandle> {
        let handle = self.instances.remove(&key)?;
        self.bindings
            .retain(|_, binding| !binding.handle().ptr_eq(&handle));
        self.aliases.retain(|_, target| *target != key);
        Some(handle)
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }
}
