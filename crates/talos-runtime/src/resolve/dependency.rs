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

//! Dependency ordering.
//!
//! Depth-first topological sort over a candidate set. A dependency can name a
//! concrete system or a capability; capabilities resolve to the configured
//! override when one is set, otherwise to the first candidate that offers
//! them. Candidates whose dependencies are missing or disabled are disabled
//! themselves, and a dependency cycle disables exactly the systems on the
//! cycle while the rest of the set continues to resolve.

use std::collections::HashMap;
use std::sync::Arc;

use talos_core::{CapabilityId, SystemError, SystemSpec};

use crate::config::RuntimeSettings;
use crate::report::{DisableReason, ResolutionReport};

/// Orders `candidates` so that every system appears after its dependencies.
///
/// Ties keep the incoming candidate order. Disabled candidates are appended
/// to the report and excluded from the result.
pub(crate) fn sort_candidates(
    candidates: &[Arc<SystemSpec>],
    settings: &RuntimeSettings,
    report: &mut ResolutionReport,
) -> Vec<Arc<SystemSpec>> {
    Sorter::new(candidates, settings).run(report)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

struct Sorter<'a> {
    candidates: &'a [Arc<SystemSpec>],
    by_key: HashMap<CapabilityId, usize>,
    settings: &'a RuntimeSettings,
    states: HashMap<CapabilityId, VisitState>,
    disabled: HashMap<CapabilityId, DisableReason>,
    disabled_order: Vec<CapabilityId>,
    stack: Vec<CapabilityId>,
    order: Vec<Arc<SystemSpec>>,
}

impl<'a> Sorter<'a> {
    fn new(candidates: &'a [Arc<SystemSpec>], settings: &'a RuntimeSettings) -> Self {
        let by_key = candidates
            .iter()
            .enumerate()
            .map(|(index, spec)| (spec.key(), index))
            .collect();
        Self {
            candidates,
            by_key,
            settings,
            states: HashMap::new(),
            disabled: HashMap::new(),
            disabled_order: Vec::new(),
            stack: Vec::new(),
            order: Vec::with_capacity(candidates.len()),
        }
    }

    fn run(mut self, report: &mut ResolutionReport) -> Vec<Arc<SystemSpec>> {
        for index in 0..self.candidates.len() {
            let key = self.candidates[index].key();
            if !self.states.contains_key(&key) {
                self.visit(index);
            }
        }
        for key in &self.disabled_order {
            if let Some(reason) = self.disabled.get(key) {
                report.push_disabled(key.short_name(), reason.clone());
            }
        }
        self.order
    }

    /// Maps a dependency to the candidate that satisfies it.
    ///
    /// A concrete system key matches directly. Capabilities prefer the
    /// configured override when that implementation is in the set, then fall
    /// back to the first candidate offering the capability.
    fn resolve_target(&self, dependency: CapabilityId) -> Option<usize> {
        if let Some(&index) = self.by_key.get(&dependency) {
            return Some(index);
        }
        if let Some(selected) = self.settings.override_for(dependency) {
            if let Some(index) = self
                .candidates
                .iter()
                .position(|spec| spec.key().name() == selected)
            {
                return Some(index);
            }
        }
        self.candidates
            .iter()
            .position(|spec| spec.offers(dependency))
    }

    fn disable(&mut self, key: CapabilityId, reason: DisableReason) {
        if !self.disabled.contains_key(&key) {
            self.disabled.insert(key, reason);
            self.disabled_order.push(key);
        }
    }

    /// Disables every system on the active chain from `entry` downwards.
    fn mark_cycle(&mut self, entry: CapabilityId) {
        let start = self.stack.iter().position(|key| *key == entry).unwrap_or(0);
        let mut chain: Vec<String> = self.stack[start..]
            .iter()
            .map(|key| key.short_name().to_string())
            .collect();
        chain.push(entry.short_name().to_string());
        let err = SystemError::CycleDetected {
            chain: chain.clone(),
        };
        log::error!("{err}");
        for key in self.stack[start..].to_vec() {
            self.disable(key, DisableReason::Cycle { chain: chain.clone() });
        }
    }

    fn visit(&mut self, index: usize) -> bool {
        let spec = Arc::clone(&self.candidates[index]);
        let key = spec.key();

        self.states.insert(key, VisitState::InProgress);
        self.stack.push(key);

        let mut viable = true;
        for dependency in spec.depends_on() {
            let Some(target_index) = self.resolve_target(*dependency) else {
                let err = SystemError::MissingDependency {
                    system: spec.name().to_string(),
                    dependency: dependency.short_name().to_string(),
                };
                log::warn!("{err}");
                self.disable(
                    key,
                    DisableReason::MissingDependency {
                        dependency: dependency.short_name().to_string(),
                    },
                );
                viable = false;
                break;
            };

            let target_key = self.candidates[target_index].key();
            if self.disabled.contains_key(&target_key) {
                self.cascade(&spec, key, target_key);
                viable = false;
                break;
            }

            match self.states.get(&target_key) {
                Some(VisitState::Done) => {}
                Some(VisitState::InProgress) => {
                    self.mark_cycle(target_key);
                    viable = false;
                    break;
                }
                None => {
                    let resolved = self.visit(target_index);
                    if self.disabled.contains_key(&key) {
                        // Swept into a cycle during the recursion.
                        viable = false;
                        break;
                    }
                    if !resolved {
                        self.cascade(&spec, key, target_key);
                        viable = false;
                        break;
                    }
                }
            }
        }

        self.stack.pop();
        self.states.insert(key, VisitState::Done);
        if viable {
            self.order.push(spec);
        }
        viable
    }

    fn cascade(&mut self, spec: &SystemSpec, key: CapabilityId, dependency: CapabilityId) {
        log::warn!(
            "System '{}' disabled, its dependency '{}' is unavailable",
            spec.name(),
            dependency.short_name()
        );
        self.disable(
            key,
            DisableReason::DependencyDisabled {
                dependency: dependency.short_name().to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use talos_core::System;

    use crate::config::RuntimeConfig;

    macro_rules! stub_system {
        ($name:ident) => {
            #[derive(Default)]
            struct $name;

            impl System for $name {
                fn as_any(&self) -> &dyn Any {
                    self
                }
                fn as_any_mut(&mut self) -> &mut dyn Any {
                    self
                }
            }
        };
    }

    stub_system!(Audio);
    stub_system!(Input);
    stub_system!(Scene);
    stub_system!(Save);
    stub_system!(Net);

    trait TimeSource: System {}

    stub_system!(Clock);
    impl TimeSource for Clock {}

    fn settings() -> RuntimeSettings {
        RuntimeSettings::new(&RuntimeConfig::default())
    }

    fn names(specs: &[Arc<SystemSpec>]) -> Vec<&str> {
        specs
            .iter()
            .map(|spec| spec.key().short_name())
            .collect()
    }

    #[test]
    fn dependencies_come_before_their_consumers() {
        // Scene -> Input -> Audio, declared in reverse.
        let candidates = vec![
            Arc::new(
                SystemSpec::of::<Scene>()
                    .depends_on::<Input>()
                    .build(),
            ),
            Arc::new(
                SystemSpec::of::<Input>()
                    .depends_on::<Audio>()
                    .build(),
            ),
            Arc::new(SystemSpec::of::<Audio>().build()),
        ];
        let mut report = ResolutionReport::default();

        let sorted = sort_candidates(&candidates, &settings(), &mut report);

        assert_eq!(names(&sorted), ["Audio", "Input", "Scene"]);
        assert!(report.disabled.is_empty());
    }

    #[test]
    fn independent_candidates_keep_their_declared_order() {
        let candidates = vec![
            Arc::new(SystemSpec::of::<Audio>().build()),
            Arc::new(SystemSpec::of::<Input>().build()),
            Arc::new(SystemSpec::of::<Scene>().build()),
        ];
        let mut report = ResolutionReport::default();

        let sorted = sort_candidates(&candidates, &settings(), &mut report);

        assert_eq!(names(&sorted), ["Audio", "Input", "Scene"]);
    }

    #[test]
    fn missing_dependency_disables_the_consumer_and_its_dependents() {
        // Save -> Net, Net -> (absent) Clock: both must drop, Audio survives.
        let candidates = vec![
            Arc::new(SystemSpec::of::<Save>().depends_on::<Net>().build()),
            Arc::new(SystemSpec::of::<Net>().depends_on::<Clock>().build()),
            Arc::new(SystemSpec::of::<Audio>().build()),
        ];
        let mut report = ResolutionReport::default();

        let sorted = sort_candidates(&candidates, &settings(), &mut report);

        assert_eq!(names(&sorted), ["Audio"]);
        assert!(matches!(
            report.disabled_reason("Net"),
            Some(DisableReason::MissingDependency { dependency }) if dependency == "Clock"
        ));
        assert!(matches!(
            report.disabled_reason("Save"),
            Some(DisableReason::DependencyDisabled { dependency }) if dependency == "Net"
        ));
    }

    #[test]
    fn capability_dependency_resolves_to_the_first_provider() {
        let candidates = vec![
            Arc::new(
                SystemSpec::of::<Scene>()
                    .depends_on::<dyn TimeSource>()
                    .build(),
            ),
            Arc::new(
                SystemSpec::of::<Clock>()
                    .provides::<dyn TimeSource>()
                    .build(),
            ),
        ];
        let mut report = ResolutionReport::default();

        let sorted = sort_candidates(&candidates, &settings(), &mut report);

        assert_eq!(names(&sorted), ["Clock", "Scene"]);
    }

    #[test]
    fn a_cycle_disables_only_its_members() {
        // Input <-> Scene form a cycle; Audio depends on neither and stays.
        let candidates = vec![
            Arc::new(SystemSpec::of::<Input>().depends_on::<Scene>().build()),
            Arc::new(SystemSpec::of::<Scene>().depends_on::<Input>().build()),
            Arc::new(SystemSpec::of::<Audio>().build()),
        ];
        let mut report = ResolutionReport::default();

        let sorted = sort_candidates(&candidates, &settings(), &mut report);

        assert_eq!(names(&sorted), ["Audio"]);
        assert!(matches!(
            report.disabled_reason("Input"),
            Some(DisableReason::Cycle { .. })
        ));
        assert!(matches!(
            report.disabled_reason("Scene"),
            Some(DisableReason::Cycle { .. })
        ));
    }

    #[test]
    fn a_self_dependency_counts_as_a_cycle() {
        let candidates = vec![Arc::new(
            SystemSpec::of::<Net>().depends_on::<Net>().build(),
        )];
        let mut report = ResolutionReport::default();

        let sorted = sort_candidates(&candidates, &settings(), &mut report);

        assert!(sorted.is_empty());
        assert!(matches!(
            report.disabled_reason("Net"),
            Some(DisableReason::Cycle { chain }) if chain == &["Net", "Net"]
        ));
    }

    #[test]
    fn a_dependent_outside_the_cycle_cascades_instead() {
        // Save -> Input, Input <-> Scene: Save is not on the cycle.
        let candidates = vec![
            Arc::new(SystemSpec::of::<Save>().depends_on::<Input>().build()),
            Arc::new(SystemSpec::of::<Input>().depends_on::<Scene>().build()),
            Arc::new(SystemSpec::of::<Scene>().depends_on::<Input>().build()),
        ];
        let mut report = ResolutionReport::default();

        let sorted = sort_candidates(&candidates, &settings(), &mut report);

        assert!(sorted.is_empty());
        assert!(matches!(
            report.disabled_reason("Save"),
            Some(DisableReason::DependencyDisabled { dependency }) if dependency == "Input"
        ));
        assert!(matches!(
            report.disabled_reason("Input"),
            Some(DisableReason::Cycle { .. })
        ));
    }
}
