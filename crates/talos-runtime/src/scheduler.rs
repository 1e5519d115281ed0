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

//! Phase scheduling and dispatch.
//!
//! Systems are enrolled once into per-phase lists, probed for the hooks
//! their type actually implements, and dispatched in priority order (lower
//! values run earlier, ties keep registration order). Update dispatch owns
//! the frame counter and the per-system interval gate; application phases
//! (pause, focus, quit) bypass both the pause flag and the enabled flag so
//! systems can always wind down.

use std::collections::{HashMap, HashSet};

use talos_core::{CapabilityId, Phase, Stopwatch, SystemError, SystemHandle, SystemSpec};
use talos_telemetry::FrameProfiler;

/// One system's slot in a phase list.
struct PhaseEntry {
    key: CapabilityId,
    priority: i32,
    handle: SystemHandle,
}

/// Frame-interval gate for systems that skip frames.
struct IntervalState {
    interval: u64,
    last_frame: u64,
}

/// Priority-ordered phase lists plus the frame clock.
pub(crate) struct PhaseScheduler {
    register: Vec<PhaseEntry>,
    init: Vec<PhaseEntry>,
    update: Vec<PhaseEntry>,
    fixed_update: Vec<PhaseEntry>,
    late_update: Vec<PhaseEntry>,
    pause: Vec<PhaseEntry>,
    focus: Vec<PhaseEntry>,
    quit: Vec<PhaseEntry>,
    intervals: HashMap<CapabilityId, IntervalState>,
    frame: u64,
    paused: bool,
}

impl PhaseScheduler {
    pub fn new() -> Self {
        Self {
            register: Vec::new(),
            init: Vec::new(),
            update: Vec::new(),
            fixed_update: Vec::new(),
            late_update: Vec::new(),
            pause: Vec::new(),
            focus: Vec::new(),
            quit: Vec::new(),
            intervals: HashMap::new(),
            frame: 0,
            paused: false,
        }
    }

    /// Probes `handle` for its hooks and slots it into the matching phase
    /// lists. Call [`Self::sort_all`] once the batch is enrolled.
    pub fn enroll(&mut self, spec: &SystemSpec, handle: &SystemHandle) {
        let Some(mut guard) = handle.try_lock() else {
            log::error!("Cannot enroll '{}': the system is locked", spec.name());
            return;
        };

        let key = spec.key();
        let priority = spec.metadata().priority;
        let entry = |handle: &SystemHandle| PhaseEntry {
            key,
            priority,
            handle: handle.clone(),
        };

        if guard.register_hook().is_some() {
            self.register.push(entry(handle));
        }
        if guard.init_hook().is_some() {
            self.init.push(entry(handle));
        }
        if guard.update_hook().is_some() {
            self.update.push(entry(handle));
        }
        if guard.fixed_update_hook().is_some() {
            self.fixed_update.push(entry(handle));
        }
        if guard.late_update_hook().is_some() {
            self.late_update.push(entry(handle));
        }
        if guard.pause_hook().is_some() {
            self.pause.push(entry(handle));
        }
        if guard.focus_hook().is_some() {
            self.focus.push(entry(handle));
        }
        if guard.quit_hook().is_some() {
            self.quit.push(entry(handle));
        }

        let interval = spec.metadata().update_interval;
        if interval > 1 {
            self.intervals.insert(
                key,
                IntervalState {
                    interval: u64::from(interval),
                    last_frame: 0,
                },
            );
        }
    }

    /// Drops `key` from every phase list.
    pub fn remove(&mut self, key: CapabilityId) {
        for list in [
            &mut self.register,
            &mut self.init,
            &mut self.update,
            &mut self.fixed_update,
            &mut self.late_update,
            &mut self.pause,
            &mut self.focus,
            &mut self.quit,
        ] {
            list.retain(|entry| entry.key != key);
        }
        self.intervals.remove(&key);
    }

    /// Re-sorts every phase list by priority. The sort is stable, so equal
    /// priorities keep their registration order.
    pub fn sort_all(&mut self) {
        for list in [
            &mut self.register,
            &mut self.init,
            &mut self.update,
            &mut self.fixed_update,
            &mut self.late_update,
            &mut self.pause,
            &mut self.focus,
            &mut self.quit,
        ] {
            list.sort_by_key(|entry| entry.priority);
        }
    }

    /// The register-phase members of `keys`, in priority order.
    pub fn register_order(&self, keys: &HashSet<CapabilityId>) -> Vec<(CapabilityId, SystemHandle)> {
        self.register
            .iter()
            .filter(|entry| keys.contains(&entry.key))
            .map(|entry| (entry.key, entry.handle.clone()))
            .collect()
    }

    /// The init-phase members of `keys`, in priority order.
    pub fn init_order(&self, keys: &HashSet<CapabilityId>) -> Vec<(CapabilityId, SystemHandle)> {
        self.init
            .iter()
            .filter(|entry| keys.contains(&entry.key))
            .map(|entry| (entry.key, entry.handle.clone()))
            .collect()
    }

    /// Advances the frame counter and runs the update phase.
    ///
    /// Skipped entirely while paused. Disabled systems are skipped before
    /// their interval gate is consulted, so a system that is re-enabled
    /// after sitting out some frames counts as overdue and runs on the next
    /// dispatch. Only this phase is timed by the profiler.
    pub fn dispatch_update(&mut self, dt: f32, profiler: &mut FrameProfiler) {
        if self.paused {
            return;
        }
        self.frame += 1;

        for entry in &self.update {
            let Some(mut guard) = entry.handle.try_lock() else {
                log::error!(
                    "Skipping update of '{}': the system is locked",
                    entry.key.short_name()
                );
                continue;
            };
            if let Some(toggle) = guard.toggle() {
                if !toggle.is_enabled() {
                    continue;
                }
            }
            if let Some(state) = self.intervals.get_mut(&entry.key) {
                if self.frame - state.last_frame < state.interval {
                    continue;
                }
                state.last_frame = self.frame;
            }
            let Some(hook) = guard.update_hook() else {
                continue;
            };

            let result = if profiler.is_enabled() {
                let watch = Stopwatch::new();
                let result = hook.on_update(dt);
                profiler.record(entry.key, watch.elapsed_ms());
                result
            } else {
                hook.on_update(dt)
            };

            if let Err(e) = result {
                log_phase_fault(entry.key, Phase::Update, e);
            }
        }
    }

    /// Runs the fixed-update phase. Paused and disabled systems are skipped;
    /// the interval gate does not apply here.
    pub fn dispatch_fixed_update(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        for entry in &self.fixed_update {
            let Some(mut guard) = entry.handle.try_lock() else {
                log::error!(
                    "Skipping fixed update of '{}': the system is locked",
                    entry.key.short_name()
                );
                continue;
            };
            if let Some(toggle) = guard.toggle() {
                if !toggle.is_enabled() {
                    continue;
                }
            }
            let Some(hook) = guard.fixed_update_hook() else {
                continue;
            };
            if let Err(e) = hook.on_fixed_update(dt) {
                log_phase_fault(entry.key, Phase::FixedUpdate, e);
            }
        }
    }

    /// Runs the late-update phase. Same gating as fixed update.
    pub fn dispatch_late_update(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        for entry in &self.late_update {
            let Some(mut guard) = entry.handle.try_lock() else {
                log::error!(
                    "Skipping late update of '{}': the system is locked",
                    entry.key.short_name()
                );
                continue;
            };
            if let Some(toggle) = guard.toggle() {
                if !toggle.is_enabled() {
                    continue;
                }
            }
            let Some(hook) = guard.late_update_hook() else {
                continue;
            };
            if let Err(e) = hook.on_late_update(dt) {
                log_phase_fault(entry.key, Phase::LateUpdate, e);
            }
        }
    }

    /// Notifies every pause-phase system, enabled or not, paused or not.
    pub fn dispatch_pause(&mut self, paused: bool) {
        for entry in &self.pause {
            let Some(mut guard) = entry.handle.try_lock() else {
                log::error!(
                    "Skipping pause notification for '{}': the system is locked",
                    entry.key.short_name()
                );
                continue;
            };
            let Some(hook) = guard.pause_hook() else {
                continue;
            };
            if let Err(e) = hook.on_app_pause(paused) {
                log_phase_fault(entry.key, Phase::Pause, e);
            }
        }
    }

    /// Notifies every focus-phase system, enabled or not, paused or not.
    pub fn dispatch_focus(&mut self, focused: bool) {
        for entry in &self.focus {
            let Some(mut guard) = entry.handle.try_lock() else {
                log::error!(
                    "Skipping focus notification for '{}': the system is locked",
                    entry.key.short_name()
                );
                continue;
            };
            let Some(hook) = guard.focus_hook() else {
                continue;
            };
            if let Err(e) = hook.on_app_focus(focused) {
                log_phase_fault(entry.key, Phase::Focus, e);
            }
        }
    }

    /// Notifies every quit-phase system, enabled or not, paused or not.
    pub fn dispatch_quit(&mut self) {
        for entry in &self.quit {
            let Some(mut guard) = entry.handle.try_lock() else {
                log::error!(
                    "Skipping quit notification for '{}': the system is locked",
                    entry.key.short_name()
                );
                continue;
            };
            let Some(hook) = guard.quit_hook() else {
                continue;
            };
            if let Err(e) = hook.on_app_quit() {
                log_phase_fault(entry.key, Phase::Quit, e);
            }
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            log::info!(
                "Runtime {}",
                if paused { "paused" } else { "resumed" }
            );
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames dispatched so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

pub(crate) fn log_phase_fault(key: CapabilityId, phase: Phase, error: SystemError) {
    let err = SystemError::PhaseFault {
        system: key.short_name().to_string(),
        phase,
        reason: error.to_string(),
    };
    log::error!("{err}");
}
