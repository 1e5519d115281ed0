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

// Talos Sandbox
// Demo host: a small population of systems driven through a frame loop.

use std::any::Any;

use anyhow::Result;
use async_trait::async_trait;
use talos_core::{
    CapabilityRef, FixedUpdateHook, FocusHook, InitHook, LateUpdateHook, PauseHook, QuitHook,
    System, SystemHandle, SystemResult, SystemSpec, Toggle, UpdateHook,
};
use talos_runtime::{RuntimeConfig, SystemCatalog, SystemRuntime};

trait FrameClock: System {
    fn elapsed(&self) -> f32;
}

trait AudioOutput: System {
    fn play(&mut self, cue: &str);
}

/// Accumulates simulated time; the one primary capability provider here.
#[derive(Default)]
struct WorldClock {
    elapsed: f32,
}

impl System for WorldClock {
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

impl UpdateHook for WorldClock {
    fn on_update(&mut self, dt: f32) -> SystemResult<()> {
        self.elapsed += dt;
        Ok(())
    }
}

impl FrameClock for WorldClock {
    fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Fallback audio sink that swallows every cue.
#[derive(Default)]
struct SilentAudio;

impl System for SilentAudio {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl AudioOutput for SilentAudio {
    fn play(&mut self, cue: &str) {
        log::debug!("silent audio, discarding cue '{cue}'");
    }
}

/// Second fallback candidate; loses the election to [`SilentAudio`].
#[derive(Default)]
struct ConsoleAudio;

impl System for ConsoleAudio {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl AudioOutput for ConsoleAudio {
    fn play(&mut self, cue: &str) {
        log::info!("[audio] {cue}");
    }
}

/// Plays a cue through whichever audio provider won the election.
struct Soundtrack {
    audio: Option<CapabilityRef<dyn AudioOutput>>,
    beats: u32,
    enabled: bool,
}

impl Default for Soundtrack {
    fn default() -> Self {
        Self {
            audio: None,
            beats: 0,
            enabled: true,
        }
    }
}

impl System for Soundtrack {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn update_hook(&mut self) -> Option<&mut dyn UpdateHook> {
        Some(self)
    }
    fn toggle(&mut self) -> Option<&mut dyn Toggle> {
        Some(self)
    }
}

impl UpdateHook for Soundtrack {
    fn on_update(&mut self, _dt: f32) -> SystemResult<()> {
        self.beats += 1;
        let cue = format!("beat-{}", self.beats);
        if let Some(audio) = &self.audio {
            if audio.try_with(|out| out.play(&cue)).is_none() {
                log::debug!("audio provider busy, dropping '{cue}'");
            }
        }
        Ok(())
    }
}

impl Toggle for Soundtrack {
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Persists the world at a relaxed cadence.
#[derive(Default)]
struct AutoSave {
    dirty: bool,
}

impl System for AutoSave {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn init_hook(&mut self) -> Option<&mut dyn InitHook> {
        Some(self)
    }
    fn update_hook(&mut self) -> Option<&mut dyn UpdateHook> {
        Some(self)
    }
    fn fixed_update_hook(&mut self) -> Option<&mut dyn FixedUpdateHook> {
        Some(self)
    }
    fn quit_hook(&mut self) -> Option<&mut dyn QuitHook> {
        Some(self)
    }
}

#[async_trait]
impl InitHook for AutoSave {
    async fn on_initialize(&mut self) -> SystemResult<()> {
        log::info!("autosave: save slots loaded");
        Ok(())
    }
}

impl UpdateHook for AutoSave {
    fn on_update(&mut self, _dt: f32) -> SystemResult<()> {
        if self.dirty {
            log::info!("autosave: world persisted");
            self.dirty = false;
        }
        Ok(())
    }
}

impl FixedUpdateHook for AutoSave {
    fn on_fixed_update(&mut self, _dt: f32) -> SystemResult<()> {
        self.dirty = true;
        Ok(())
    }
}

impl QuitHook for AutoSave {
    fn on_app_quit(&mut self) -> SystemResult<()> {
        log::info!("autosave: final save flushed");
        Ok(())
    }
}

/// Polls input first each frame and reacts to focus changes.
struct InputPoller {
    polls: u32,
    focused: bool,
}

impl Default for InputPoller {
    fn default() -> Self {
        Self {
            polls: 0,
            focused: true,
        }
    }
}

impl System for InputPoller {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn update_hook(&mut self) -> Option<&mut dyn UpdateHook> {
        Some(self)
    }
    fn focus_hook(&mut self) -> Option<&mut dyn FocusHook> {
        Some(self)
    }
    fn pause_hook(&mut self) -> Option<&mut dyn PauseHook> {
        Some(self)
    }
}

impl UpdateHook for InputPoller {
    fn on_update(&mut self, _dt: f32) -> SystemResult<()> {
        self.polls += 1;
        Ok(())
    }
}

impl FocusHook for InputPoller {
    fn on_app_focus(&mut self, focused: bool) -> SystemResult<()> {
        self.focused = focused;
        if self.focused {
            log::info!("input: focus regained after {} polls", self.polls);
        } else {
            log::info!("input: focus lost, releasing held keys");
        }
        Ok(())
    }
}

impl PauseHook for InputPoller {
    fn on_app_pause(&mut self, paused: bool) -> SystemResult<()> {
        log::info!(
            "input: {}",
            if paused { "suspended" } else { "resumed" }
        );
        Ok(())
    }
}

/// Reads the clock through an injected handle and reports once a second.
#[derive(Default)]
struct Hud {
    clock: Option<SystemHandle>,
    frames: u32,
}

impl System for Hud {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn late_update_hook(&mut self) -> Option<&mut dyn LateUpdateHook> {
        Some(self)
    }
}

impl LateUpdateHook for Hud {
    fn on_late_update(&mut self, _dt: f32) -> SystemResult<()> {
        self.frames += 1;
        if self.frames % 60 == 0 {
            let elapsed = self
                .clock
                .as_ref()
                .and_then(|clock| clock.try_with(|c: &mut WorldClock| c.elapsed));
            if let Some(elapsed) = elapsed {
                log::info!("hud: {elapsed:.1}s of simulated time");
            }
        }
        Ok(())
    }
}

fn build_catalog() -> SystemCatalog {
    let mut catalog = SystemCatalog::new();
    // Deliberately scrambled: resolution reorders construction.
    catalog.add(
        SystemSpec::of::<Hud>()
            .priority(100)
            .depends_on::<WorldClock>()
            .inject::<WorldClock>("clock", |hud, handle| hud.clock = Some(handle))
            .build(),
    );
    catalog.add(
        SystemSpec::of::<Soundtrack>()
            .priority(20)
            .update_interval(30)
            .inject_ref::<dyn AudioOutput>("audio", |s, audio| s.audio = Some(audio))
            .build(),
    );
    catalog.add(
        SystemSpec::of::<AutoSave>()
            .priority(50)
            .alias("saves")
            .update_interval(100)
            .build(),
    );
    catalog.add(
        SystemSpec::of::<WorldClock>()
            .priority(0)
            .provides_as::<dyn FrameClock>(|c| c)
            .build(),
    );
    catalog.add(
        SystemSpec::of::<InputPoller>()
            .priority(-10)
            .build(),
    );
    catalog.add(
        SystemSpec::of::<SilentAudio>()
            .fallback()
            .provides_as::<dyn AudioOutput>(|a| a)
            .build(),
    );
    catalog.add(
        SystemSpec::of::<ConsoleAudio>()
            .fallback()
            .provides_as::<dyn AudioOutput>(|a| a)
            .build(),
    );
    catalog
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = RuntimeConfig::default().with_profiling();
    let mut runtime = SystemRuntime::new(&config);
    let events = runtime.events();

    let report = runtime.register_catalog(&build_catalog()).await;
    log::info!("registered: {}", report.registered.join(", "));
    for dropped in &report.disabled {
        log::warn!("disabled {}: {:?}", dropped.system, dropped.reason);
    }
    for tie in &report.ambiguities {
        log::info!(
            "capability '{}' had {} fallback candidates, '{}' won",
            tie.capability,
            tie.candidates.len(),
            tie.winner
        );
    }

    let dt = 1.0 / 60.0;
    for frame in 1..=300u32 {
        match frame {
            60 => {
                runtime.set_enabled::<Soundtrack>(false);
            }
            90 => {
                runtime.set_enabled::<Soundtrack>(true);
            }
            120 => runtime.set_paused(true),
            150 => runtime.set_paused(false),
            200 => {
                runtime.application_focus(false);
                runtime.application_focus(true);
            }
            _ => {}
        }
        runtime.update(dt);
        runtime.fixed_update(dt);
        runtime.late_update(dt);
    }

    println!("{}", runtime.export_dependency_graph());
    for status in runtime.all_statuses() {
        println!(
            "{:<12} priority {:>4}  enabled {:<5}  avg {:.3} ms",
            status.name, status.priority, status.enabled, status.average_update_ms
        );
    }

    for event in events.try_iter() {
        log::debug!("runtime event: {event:?}");
    }

    runtime.application_pause(true);
    runtime.application_quit();
    Ok(())
}
