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

//! The system runtime facade.
//!
//! [`SystemRuntime`] owns every moving part: the compiled settings, the
//! instance registry, the phase scheduler, and the profiler. Hosts describe
//! their systems in a [`SystemCatalog`], register it in one pass, then drive
//! the frame phases from their outer loop.
//!
//! Systems never hold a reference to the runtime; anything a hook needs is
//! injected up front as a [`SystemHandle`] or capability view, so a hook can
//! never re-enter the runtime mid-dispatch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use talos_core::{
    CapabilityId, CapabilityRef, EventBus, InjectionMode, Phase, System, SystemHandle, SystemSpec,
};
use talos_telemetry::FrameProfiler;

use crate::catalog::SystemCatalog;
use crate::config::{RuntimeConfig, RuntimeSettings};
use crate::events::RuntimeEvent;
use crate::graph::{self, DependencyInfo, InjectionInfo};
use crate::inject;
use crate::registry::SystemRegistry;
use crate::report::{DisableReason, ResolutionReport};
use crate::resolve;
use crate::scheduler::{log_phase_fault, PhaseScheduler};
use crate::status::SystemStatus;

/// Container and lifecycle driver for a population of systems.
pub struct SystemRuntime {
    settings: RuntimeSettings,
    registry: SystemRegistry,
    scheduler: PhaseScheduler,
    profiler: FrameProfiler,
    specs: HashMap<CapabilityId, Arc<SystemSpec>>,
    /// Concrete keys in registration order; bulk passes follow dependency
    /// order, dynamic additions append.
    order: Vec<CapabilityId>,
    initialized: HashSet<CapabilityId>,
    events: EventBus<RuntimeEvent>,
}

impl SystemRuntime {
    /// Builds an empty runtime from a configuration.
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            settings: RuntimeSettings::new(config),
            registry: SystemRegistry::new(),
            scheduler: PhaseScheduler::new(),
            profiler: FrameProfiler::new(config.profiling),
            specs: HashMap::new(),
            order: Vec::new(),
            initialized: HashSet::new(),
            events: EventBus::new(),
        }
    }

    /// A receiver for runtime lifecycle events.
    ///
    /// Events are queued, not broadcast: attach one consumer and drain it
    /// where convenient.
    pub fn events(&self) -> flume::Receiver<RuntimeEvent> {
        self.events.subscribe()
    }

    /// Defines a conditional symbol for future catalog registrations.
    pub fn define_symbol(&mut self, symbol: &str) {
        self.settings.add_symbol(symbol);
    }

    /// Removes a conditional symbol.
    pub fn remove_symbol(&mut self, symbol: &str) {
        self.settings.remove_symbol(symbol);
    }

    /// Whether a conditional symbol is currently defined.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.settings.has_symbol(symbol)
    }

    /// Registers a catalog of systems in one resolved pass.
    ///
    /// The pipeline: configuration-disabled entries drop out, conditional
    /// symbols filter the rest, primaries and fallbacks are dependency-sorted
    /// separately, primaries are constructed in order, fallbacks are elected
    /// against the live registry, every registered system gets a fresh
    /// injection pass, register hooks run, and async init hooks are awaited
    /// one by one in priority order.
    ///
    /// Re-registering a type that already exists is a no-op for that entry.
    /// Failures never abort the pass; they disable the entry and are listed
    /// in the returned report.
    pub async fn register_catalog(&mut self, catalog: &SystemCatalog) -> ResolutionReport {
        let mut report = ResolutionReport::default();

        // Configuration filter. Already-registered types stay in the set so
        // dependencies on them keep resolving, but they are not rebuilt.
        let mut candidates: Vec<Arc<SystemSpec>> = Vec::with_capacity(catalog.len());
        for spec in catalog.entries() {
            if self.settings.is_disabled(spec.key()) {
                log::info!("System '{}' is disabled by configuration", spec.name());
                report.push_disabled(spec.name(), DisableReason::ConfigDisabled);
                continue;
            }
            candidates.push(Arc::clone(spec));
        }

        let candidates =
            resolve::conditional::filter_symbols(candidates, &self.settings, &mut report);

        let (fallbacks, primaries): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|spec| spec.metadata().fallback);
        let primaries =
            resolve::dependency::sort_candidates(&primaries, &self.settings, &mut report);
        let fallbacks =
            resolve::dependency::sort_candidates(&fallbacks, &self.settings, &mut report);

        let mut fresh: Vec<CapabilityId> = Vec::new();
        for spec in &primaries {
            if self.register_instance(spec, &mut report) {
                fresh.push(spec.key());
            }
        }

        // Election sees bindings made by earlier fallbacks in the same pass.
        let index = resolve::fallback::FallbackIndex::build(&fallbacks);
        for spec in &fallbacks {
            if resolve::fallback::should_register(
                spec,
                &self.registry,
                &index,
                &self.settings,
                &mut report,
            ) {
                if self.register_instance(spec, &mut report) {
                    fresh.push(spec.key());
                }
            } else {
                log::debug!("Fallback '{}' is not needed, every capability it provides is covered", spec.name());
            }
        }

        // Injection is re-run over the whole population so members that
        // captured a handle before this pass see the refreshed bindings.
        for key in &self.order {
            if let (Some(spec), Some(handle)) = (self.specs.get(key), self.registry.instance(*key))
            {
                inject::inject_system(spec, &handle, &self.registry);
            }
        }

        self.scheduler.sort_all();

        let fresh_set: HashSet<CapabilityId> = fresh.iter().copied().collect();
        for (key, handle) in self.scheduler.register_order(&fresh_set) {
            let Some(mut guard) = handle.try_lock() else {
                log::error!(
                    "Register hook for '{}' skipped: the system is locked",
                    key.short_name()
                );
                continue;
            };
            let Some(hook) = guard.register_hook() else {
                continue;
            };
            if let Err(e) = hook.on_register() {
                log_phase_fault(key, Phase::Register, e);
            }
        }

        for (key, handle) in self.scheduler.init_order(&fresh_set) {
            let mut guard = handle.lock().await;
            let Some(hook) = guard.init_hook() else {
                continue;
            };
            match hook.on_initialize().await {
                Ok(()) => {
                    self.initialized.insert(key);
                    log::info!("System '{}' initialized", key.short_name());
                }
                Err(e) => log_phase_fault(key, Phase::Initialize, e),
            }
        }

        // Whatever happened above, systems from this pass are past their
        // init window now.
        for key in &fresh {
            self.initialized.insert(*key);
        }

        log::info!(
            "Catalog pass complete: {} registered, {} disabled",
            report.registered.len(),
            report.disabled.len()
        );
        report
    }

    /// Registers a single system immediately.
    ///
    /// The dynamic path skips conditional filtering, dependency analysis and
    /// fallback election; the descriptor is constructed, injected from the
    /// current bindings, and taken through its register and init hooks
    /// inline. Returns `true` when the system is present afterwards,
    /// including the case where it already was.
    pub async fn register_system(&mut self, spec: SystemSpec) -> bool {
        let spec = Arc::new(spec);
        let key = spec.key();
        if self.registry.has_instance(key) {
            log::info!("System '{}' is already registered", spec.name());
            return true;
        }

        let mut report = ResolutionReport::default();
        if !self.register_instance(&spec, &mut report) {
            return false;
        }

        if let Some(handle) = self.registry.instance(key) {
            inject::inject_system(&spec, &handle, &self.registry);
            self.scheduler.sort_all();

            let mut guard = handle.lock().await;
            if let Some(hook) = guard.register_hook() {
                if let Err(e) = hook.on_register() {
                    log_phase_fault(key, Phase::Register, e);
                }
            }
            if let Some(hook) = guard.init_hook() {
                if let Err(e) = hook.on_initialize().await {
                    log_phase_fault(key, Phase::Initialize, e);
                }
            }
        }

        self.initialized.insert(key);
        true
    }

    /// Removes system `S`, running its unregister hook first.
    pub fn unregister_system<S: System + 'static>(&mut self) -> bool {
        self.unregister_key(CapabilityId::of::<S>())
    }

    fn unregister_key(&mut self, key: CapabilityId) -> bool {
        let Some(handle) = self.registry.instance(key) else {
            log::warn!(
                "Cannot unregister '{}', it is not registered",
                key.short_name()
            );
            return false;
        };

        if let Some(mut guard) = handle.try_lock() {
            if let Some(hook) = guard.register_hook() {
                if let Err(e) = hook.on_unregister() {
                    log_phase_fault(key, Phase::Register, e);
                }
            }
        } else {
            log::error!(
                "Unregister hook for '{}' skipped: the system is locked",
                key.short_name()
            );
        }

        self.registry.remove(key);
        self.scheduler.remove(key);
        self.profiler.forget(&key);
        self.specs.remove(&key);
        self.order.retain(|k| *k != key);
        self.initialized.remove(&key);
        self.events.publish(RuntimeEvent::SystemUnregistered {
            system: key.short_name().to_string(),
        });
        log::info!("Unregistered system '{}'", key.short_name());
        true
    }

    /// Constructs, stores and enrolls one system. Shared by both
    /// registration paths; hooks are the caller's business.
    fn register_instance(&mut self, spec: &Arc<SystemSpec>, report: &mut ResolutionReport) -> bool {
        let key = spec.key();
        if self.registry.has_instance(key) {
            log::info!("System '{}' is already registered", spec.name());
            return false;
        }

        let instance = match spec.construct() {
            Ok(instance) => instance,
            Err(e) => {
                log::error!("{e}");
                report.push_disabled(
                    spec.name(),
                    DisableReason::ConstructionFailed {
                        reason: e.to_string(),
                    },
                );
                return false;
            }
        };

        let handle = SystemHandle::new(instance);
        self.registry.insert(spec, &handle, &self.settings, report);
        self.specs.insert(key, Arc::clone(spec));
        self.order.push(key);
        self.scheduler.enroll(spec, &handle);
        self.profiler.track(key);
        report.registered.push(spec.name().to_string());
        self.events.publish(RuntimeEvent::SystemRegistered {
            system: spec.name().to_string(),
        });
        log::info!("Registered system '{}'", spec.name());
        true
    }

    /// Looks up a system by concrete type or provided capability.
    pub fn get<T: ?Sized + 'static>(&self) -> Option<SystemHandle> {
        self.registry.lookup(CapabilityId::of::<T>())
    }

    /// A typed view onto capability `A`'s current provider.
    ///
    /// Only capabilities published with a caster (see
    /// [`SystemSpecBuilder::provides_as`](talos_core::SystemSpecBuilder::provides_as))
    /// support typed access.
    pub fn capability<A: ?Sized + 'static>(&self) -> Option<CapabilityRef<A>> {
        self.registry
            .lookup_binding(CapabilityId::of::<A>())
            .and_then(|binding| binding.typed::<A>())
    }

    /// Looks up a system by its configured alias.
    pub fn get_by_alias(&self, alias: &str) -> Option<SystemHandle> {
        self.registry.by_alias(alias)
    }

    /// Whether a system or capability is present.
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        let id = CapabilityId::of::<T>();
        self.registry.has_binding(id) || self.registry.has_instance(id)
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no systems are registered.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Flips the enable switch of system `S`.
    ///
    /// Publishes [`RuntimeEvent::SystemEnabledChanged`] only on an actual
    /// change. Returns `false` when the system is missing, locked, or has no
    /// switch.
    pub fn set_enabled<S: System + 'static>(&mut self, enabled: bool) -> bool {
        let key = CapabilityId::of::<S>();
        let Some(handle) = self.registry.instance(key) else {
            log::warn!("Cannot toggle '{}', it is not registered", key.short_name());
            return false;
        };
        let Some(mut guard) = handle.try_lock() else {
            log::error!("Cannot toggle '{}': the system is locked", key.short_name());
            return false;
        };
        let Some(toggle) = guard.toggle() else {
            log::warn!("System '{}' has no enable switch", key.short_name());
            return false;
        };

        if toggle.is_enabled() == enabled {
            return true;
        }
        toggle.set_enabled(enabled);
        drop(guard);

        self.events.publish(RuntimeEvent::SystemEnabledChanged {
            system: key.short_name().to_string(),
            enabled,
        });
        log::info!(
            "System '{}' {}",
            key.short_name(),
            if enabled { "enabled" } else { "disabled" }
        );
        true
    }

    /// The enable switch state of system `S`; `None` when the system is
    /// missing, locked, or not toggleable.
    pub fn is_enabled<S: System + 'static>(&self) -> Option<bool> {
        let handle = self.registry.instance(CapabilityId::of::<S>())?;
        let mut guard = handle.try_lock()?;
        guard.toggle().map(|toggle| toggle.is_enabled())
    }

    /// Runs the update phase for one frame.
    pub fn update(&mut self, dt: f32) {
        self.scheduler.dispatch_update(dt, &mut self.profiler);
    }

    /// Runs the fixed-update phase for one simulation step.
    pub fn fixed_update(&mut self, dt: f32) {
        self.scheduler.dispatch_fixed_update(dt);
    }

    /// Runs the late-update phase for one frame.
    pub fn late_update(&mut self, dt: f32) {
        self.scheduler.dispatch_late_update(dt);
    }

    /// Pauses or resumes the frame phases. Application notifications still
    /// go through while paused.
    pub fn set_paused(&mut self, paused: bool) {
        self.scheduler.set_paused(paused);
    }

    /// Whether the frame phases are paused.
    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// Forwards an application pause transition to every interested system.
    pub fn application_pause(&mut self, paused: bool) {
        self.scheduler.dispatch_pause(paused);
    }

    /// Forwards an application focus transition to every interested system.
    pub fn application_focus(&mut self, focused: bool) {
        self.scheduler.dispatch_focus(focused);
    }

    /// Notifies every interested system that the application is quitting.
    pub fn application_quit(&mut self) {
        self.scheduler.dispatch_quit();
    }

    /// Frames dispatched so far.
    pub fn frame(&self) -> u64 {
        self.scheduler.frame()
    }

    /// Turns per-update timing on or off.
    pub fn set_profiling(&mut self, enabled: bool) {
        self.profiler.set_enabled(enabled);
    }

    /// Whether per-update timing is active.
    pub fn is_profiling(&self) -> bool {
        self.profiler.is_enabled()
    }

    /// The display name the runtime uses for system `S`.
    pub fn system_name<S: System + 'static>(&self) -> &'static str {
        CapabilityId::of::<S>().short_name()
    }

    /// The declared priority of system `S`, if registered.
    pub fn priority_of<S: System + 'static>(&self) -> Option<i32> {
        self.specs
            .get(&CapabilityId::of::<S>())
            .map(|spec| spec.metadata().priority)
    }

    /// A status snapshot of system `S`, if registered.
    pub fn status_of<S: System + 'static>(&self) -> Option<SystemStatus> {
        self.status_for_key(CapabilityId::of::<S>())
    }

    /// Status snapshots for every registered system, in registration order.
    pub fn all_statuses(&self) -> Vec<SystemStatus> {
        self.order
            .iter()
            .filter_map(|key| self.status_for_key(*key))
            .collect()
    }

    fn status_for_key(&self, key: CapabilityId) -> Option<SystemStatus> {
        let spec = self.specs.get(&key)?;
        let handle = self.registry.instance(key)?;
        let (enabled, can_toggle) = match handle.try_lock() {
            Some(mut guard) => match guard.toggle() {
                Some(toggle) => (toggle.is_enabled(), true),
                None => (true, false),
            },
            None => (true, false),
        };
        Some(SystemStatus {
            name: spec.name().to_string(),
            alias: spec.metadata().alias.clone(),
            priority: spec.metadata().priority,
            enabled,
            initialized: self.initialized.contains(&key),
            can_toggle,
            update_interval: spec.metadata().update_interval,
            last_update_ms: self.profiler.last_ms(&key),
            average_update_ms: self.profiler.average_ms(&key),
        })
    }

    /// The declared dependency edges of every registered system.
    pub fn dependency_graph(&self) -> Vec<DependencyInfo> {
        self.order
            .iter()
            .filter_map(|key| self.specs.get(key))
            .map(|spec| DependencyInfo {
                system: spec.name().to_string(),
                depends_on: spec
                    .depends_on()
                    .iter()
                    .map(|dep| dep.short_name().to_string())
                    .collect(),
                injections: spec
                    .injections()
                    .iter()
                    .map(|point| InjectionInfo {
                        capability: point.capability().short_name().to_string(),
                        weak: matches!(point.mode(), InjectionMode::Weak),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Renders the dependency graph as indented text.
    pub fn export_dependency_graph(&self) -> String {
        graph::render_graph(&self.dependency_graph())
    }
}

impl Default for SystemRuntime {
    fn default() -> Self {
        Self::new(&RuntimeConfig::default())
    }
}
