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

use std::any::Any;
use std::time::Duration;

use talos_core::{
    FixedUpdateHook, FocusHook, LateUpdateHook, PauseHook, QuitHook, System, SystemResult,
    SystemSpec, Toggle, UpdateHook,
};
use talos_runtime::{RuntimeConfig, RuntimeEvent, SystemCatalog, SystemRuntime};

// --- DUMMY SYSTEM COUNTING EVERY HOOK IT RECEIVES ---

struct Pulse {
    enabled: bool,
    updates: u32,
    fixed: u32,
    late: u32,
    pauses: Vec<bool>,
    focuses: Vec<bool>,
    quits: u32,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            enabled: true,
            updates: 0,
            fixed: 0,
            late: 0,
            pauses: Vec::new(),
            focuses: Vec::new(),
            quits: 0,
        }
    }
}

impl System for Pulse {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn update_hook(&mut self) -> Option<&mut dyn UpdateHook> {
        Some(self)
    }
    fn fixed_update_hook(&mut self) -> Option<&mut dyn FixedUpdateHook> {
        Some(self)
    }
    fn late_update_hook(&mut self) -> Option<&mut dyn LateUpdateHook> {
        Some(self)
    }
    fn pause_hook(&mut self) -> Option<&mut dyn PauseHook> {
        Some(self)
    }
    fn focus_hook(&mut self) -> Option<&mut dyn FocusHook> {
        Some(self)
    }
    fn quit_hook(&mut self) -> Option<&mut dyn QuitHook> {
        Some(self)
    }
    fn toggle(&mut self) -> Option<&mut dyn Toggle> {
        Some(self)
    }
}

impl UpdateHook for Pulse {
    fn on_update(&mut self, _dt: f32) -> SystemResult<()> {
        self.updates += 1;
        Ok(())
    }
}

impl FixedUpdateHook for Pulse {
    fn on_fixed_update(&mut self, _dt: f32) -> SystemResult<()> {
        self.fixed += 1;
        Ok(())
    }
}

impl LateUpdateHook for Pulse {
    fn on_late_update(&mut self, _dt: f32) -> SystemResult<()> {
        self.late += 1;
        Ok(())
    }
}

impl PauseHook for Pulse {
    fn on_app_pause(&mut self, paused: bool) -> SystemResult<()> {
        self.pauses.push(paused);
        Ok(())
    }
}

impl FocusHook for Pulse {
    fn on_app_focus(&mut self, focused: bool) -> SystemResult<()> {
        self.focuses.push(focused);
        Ok(())
    }
}

impl QuitHook for Pulse {
    fn on_app_quit(&mut self) -> SystemResult<()> {
        self.quits += 1;
        Ok(())
    }
}

impl Toggle for Pulse {
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[derive(Default)]
struct SlowTick;

impl System for SlowTick {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn update_hook(&mut self) -> Option<&mut dyn UpdateHook> {
        Some(self)
    }
}

impl UpdateHook for SlowTick {
    fn on_update(&mut self, _dt: f32) -> SystemResult<()> {
        std::thread::sleep(Duration::from_millis(2));
        Ok(())
    }
}

async fn runtime_with_pulse(interval: u32) -> SystemRuntime {
    let mut catalog = SystemCatalog::new();
    catalog.add(
        SystemSpec::of::<Pulse>()
            .update_interval(interval)
            .build(),
    );
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());
    runtime.register_catalog(&catalog).await;
    runtime
}

fn pulse_counts(runtime: &SystemRuntime) -> (u32, u32, u32) {
    runtime
        .get::<Pulse>()
        .and_then(|handle| handle.try_with(|p: &mut Pulse| (p.updates, p.fixed, p.late)))
        .expect("pulse must be registered and unlocked")
}

#[tokio::test]
async fn test_frame_phases_reach_their_hooks() {
    let mut runtime = runtime_with_pulse(0).await;

    runtime.update(0.016);
    runtime.update(0.016);
    runtime.fixed_update(0.02);
    runtime.fixed_update(0.02);
    runtime.fixed_update(0.02);
    runtime.late_update(0.016);

    assert_eq!(pulse_counts(&runtime), (2, 3, 1));
    assert_eq!(runtime.frame(), 2, "Only update advances the frame clock");
}

#[tokio::test]
async fn test_update_interval_throttles_dispatch() {
    let mut runtime = runtime_with_pulse(3).await;

    for _ in 0..9 {
        runtime.update(0.016);
    }

    let (updates, _, _) = pulse_counts(&runtime);
    assert_eq!(updates, 3, "An interval of 3 runs on frames 3, 6 and 9");
    assert_eq!(runtime.frame(), 9);
}

#[tokio::test]
async fn test_global_pause_blocks_frame_phases_but_not_app_events() {
    let mut runtime = runtime_with_pulse(0).await;

    runtime.set_paused(true);
    runtime.update(0.016);
    runtime.fixed_update(0.02);
    runtime.late_update(0.016);
    assert_eq!(pulse_counts(&runtime), (0, 0, 0));
    assert_eq!(runtime.frame(), 0, "A paused frame does not count");

    // Application transitions are delivered even while paused.
    runtime.application_pause(true);
    runtime.application_focus(false);
    runtime.application_quit();
    let (pauses, focuses, quits) = runtime
        .get::<Pulse>()
        .and_then(|handle| {
            handle.try_with(|p: &mut Pulse| (p.pauses.clone(), p.focuses.clone(), p.quits))
        })
        .expect("pulse must be registered and unlocked");
    assert_eq!(pauses, vec![true]);
    assert_eq!(focuses, vec![false]);
    assert_eq!(quits, 1);

    runtime.set_paused(false);
    runtime.update(0.016);
    assert_eq!(pulse_counts(&runtime).0, 1);
}

#[tokio::test]
async fn test_disabled_system_skips_frames_but_hears_app_events() {
    let mut runtime = runtime_with_pulse(0).await;
    let events = runtime.events();

    assert!(runtime.set_enabled::<Pulse>(false));
    assert_eq!(runtime.is_enabled::<Pulse>(), Some(false));

    runtime.update(0.016);
    runtime.fixed_update(0.02);
    assert_eq!(pulse_counts(&runtime), (0, 0, 0));

    runtime.application_quit();
    let quits = runtime
        .get::<Pulse>()
        .and_then(|handle| handle.try_with(|p: &mut Pulse| p.quits))
        .expect("pulse must be registered and unlocked");
    assert_eq!(quits, 1, "Quit ignores the enable switch");

    assert!(runtime.set_enabled::<Pulse>(true));
    runtime.update(0.016);
    assert_eq!(pulse_counts(&runtime).0, 1);

    let toggles: Vec<RuntimeEvent> = events
        .try_iter()
        .filter(|event| matches!(event, RuntimeEvent::SystemEnabledChanged { .. }))
        .collect();
    assert_eq!(
        toggles,
        vec![
            RuntimeEvent::SystemEnabledChanged {
                system: "Pulse".to_string(),
                enabled: false,
            },
            RuntimeEvent::SystemEnabledChanged {
                system: "Pulse".to_string(),
                enabled: true,
            },
        ]
    );
}

#[tokio::test]
async fn test_profiling_reports_update_timings() {
    let mut catalog = SystemCatalog::new();
    catalog.add(SystemSpec::of::<SlowTick>().build());

    let mut runtime = SystemRuntime::new(&RuntimeConfig::default().with_profiling());
    runtime.register_catalog(&catalog).await;
    assert!(runtime.is_profiling());

    for _ in 0..3 {
        runtime.update(0.016);
    }

    let status = runtime.status_of::<SlowTick>().expect("status must exist");
    assert!(
        status.last_update_ms >= 2.0,
        "A 2 ms sleep cannot be timed below 2 ms, got {}",
        status.last_update_ms
    );
    assert!(status.average_update_ms >= 2.0);

    // Without profiling nothing is recorded.
    let mut cold = SystemRuntime::new(&RuntimeConfig::default());
    let mut catalog = SystemCatalog::new();
    catalog.add(SystemSpec::of::<SlowTick>().build());
    cold.register_catalog(&catalog).await;
    cold.update(0.016);
    let status = cold.status_of::<SlowTick>().expect("status must exist");
    assert_eq!(status.last_update_ms, 0.0);
}
