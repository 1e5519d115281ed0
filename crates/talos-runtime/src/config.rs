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

//! Runtime configuration: the serializable form handed in by the host, and
//! the compiled lookup form the runtime consults.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use talos_core::capability::CapabilityId;
use talos_core::error::{SystemError, SystemResult};

/// Pins a capability to one implementation by fully-qualified type name.
///
/// Affects both regular binding (other providers of the capability are
/// skipped) and fallback election (the named fallback wins without an
/// ambiguity warning). Names are the values [`CapabilityId::name`] reports,
/// which is also how the runtime prints them in its logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationOverride {
    /// Fully-qualified name of the capability.
    pub capability: String,
    /// Fully-qualified name of the implementation that should provide it.
    pub implementation: String,
}

/// Host-supplied runtime configuration.
///
/// Passed by value into [`crate::SystemRuntime::new`]; there is no global
/// configuration state. The JSON helpers exist for hosts that keep this in
/// a settings asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Whether per-system update timing starts enabled.
    pub profiling: bool,
    /// Conditional symbols defined at startup.
    pub symbols: Vec<String>,
    /// Fully-qualified type names excluded from bulk registration.
    pub disabled_systems: Vec<String>,
    /// Capability-to-implementation pins.
    pub overrides: Vec<ImplementationOverride>,
}

impl RuntimeConfig {
    /// Parses a configuration from its JSON form.
    pub fn from_json_str(json: &str) -> SystemResult<Self> {
        serde_json::from_str(json).map_err(|e| SystemError::Config {
            reason: e.to_string(),
        })
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> SystemResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SystemError::Config {
            reason: e.to_string(),
        })
    }

    /// Enables profiling from the start.
    pub fn with_profiling(mut self) -> Self {
        self.profiling = true;
        self
    }

    /// Defines a conditional symbol.
    pub fn define_symbol(mut self, symbol: &str) -> Self {
        self.symbols.push(symbol.to_string());
        self
    }

    /// Excludes system `S` from bulk registration.
    pub fn disable_system<S: 'static>(mut self) -> Self {
        self.disabled_systems
            .push(CapabilityId::of::<S>().name().to_string());
        self
    }

    /// Pins capability `C` to implementation `I`, using their type names.
    pub fn select_implementation<C: ?Sized + 'static, I: 'static>(mut self) -> Self {
        self.overrides.push(ImplementationOverride {
            capability: CapabilityId::of::<C>().name().to_string(),
            implementation: CapabilityId::of::<I>().name().to_string(),
        });
        self
    }
}

/// The compiled, lookup-friendly form of [`RuntimeConfig`].
///
/// Symbols stay mutable after construction; everything else is fixed for the
/// runtime's lifetime.
#[derive(Debug)]
pub(crate) struct RuntimeSettings {
    symbols: HashSet<String>,
    disabled: HashSet<String>,
    overrides: HashMap<String, String>,
}

impl RuntimeSettings {
    pub fn new(config: &RuntimeConfig) -> Self {
        let overrides: HashMap<String, String> = config
            .overrides
            .iter()
            .map(|o| (o.capability.clone(), o.implementation.clone()))
            .collect();
        log::debug!(
            "Runtime settings compiled: {} symbol(s), {} disabled system(s), {} override(s)",
            config.symbols.len(),
            config.disabled_systems.len(),
            overrides.len()
        );
        Self {
            symbols: config.symbols.iter().cloned().collect(),
            disabled: config.disabled_systems.iter().cloned().collect(),
            overrides,
        }
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn add_symbol(&mut self, symbol: &str) {
        if self.symbols.insert(symbol.to_string()) {
            log::info!("Conditional symbol '{symbol}' defined");
        }
    }

    pub fn remove_symbol(&mut self, symbol: &str) {
        if self.symbols.remove(symbol) {
            log::info!("Conditional symbol '{symbol}' removed");
        }
    }

    /// Whether the configuration excludes this concrete type, matched by
    /// fully-qualified name.
    pub fn is_disabled(&self, key: CapabilityId) -> bool {
        self.disabled.contains(key.name())
    }

    /// The pinned implementation for `capability`, if one is configured.
    pub fn override_for(&self, capability: CapabilityId) -> Option<&str> {
        self.overrides.get(capability.name()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Renderer;
    trait Backend {}

    #[test]
    fn json_round_trip_preserves_everything() {
        let config = RuntimeConfig::default()
            .with_profiling()
            .define_symbol("HEADLESS")
            .disable_system::<Renderer>()
            .select_implementation::<dyn Backend, Renderer>();

        let json = config.to_json_string().expect("serializes");
        let back = RuntimeConfig::from_json_str(&json).expect("parses");
        assert_eq!(back, config);
    }

    #[test]
    fn missing_fields_default() {
        let config = RuntimeConfig::from_json_str("{}").expect("empty object is valid");
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = RuntimeConfig::from_json_str("{not json").expect_err("must fail");
        assert!(matches!(err, SystemError::Config { .. }));
    }

    #[test]
    fn compiled_settings_answer_lookups() {
        let config = RuntimeConfig::default()
            .define_symbol("EDITOR")
            .disable_system::<Renderer>()
            .select_implementation::<dyn Backend, Renderer>();
        let mut settings = RuntimeSettings::new(&config);

        assert!(settings.has_symbol("EDITOR"));
        assert!(!settings.has_symbol("RELEASE"));
        assert!(settings.is_disabled(CapabilityId::of::<Renderer>()));
        assert_eq!(
            settings.override_for(CapabilityId::of::<dyn Backend>()),
            Some(CapabilityId::of::<Renderer>().name())
        );

        settings.add_symbol("RELEASE");
        assert!(settings.has_symbol("RELEASE"));
        settings.remove_symbol("RELEASE");
        assert!(!settings.has_symbol("RELEASE"));
    }
}
