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

//! Traits for long-lived runtime services (Systems) and their lifecycle hooks.
//!
//! A system opts into a lifecycle phase by implementing the corresponding
//! hook trait and overriding the matching accessor on [`System`] to return
//! `Some(self)`. The scheduler probes the accessors exactly once, when the
//! system is registered, and never again afterwards.

use crate::error::SystemResult;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;

/// A lifecycle phase driven by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// One-shot synchronous registration callback (with an unregistration
    /// counterpart).
    Register,
    /// One-shot asynchronous initialization, awaited sequentially in
    /// priority order.
    Initialize,
    /// The per-frame variable-step update.
    Update,
    /// The fixed-step update.
    FixedUpdate,
    /// The per-frame late update, after all regular updates.
    LateUpdate,
    /// Host application pause/resume notification.
    Pause,
    /// Host application focus gained/lost notification.
    Focus,
    /// Host application shutdown notification.
    Quit,
}

impl Phase {
    /// Returns the phase's display name.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Register => "Register",
            Phase::Initialize => "Initialize",
            Phase::Update => "Update",
            Phase::FixedUpdate => "FixedUpdate",
            Phase::LateUpdate => "LateUpdate",
            Phase::Pause => "Pause",
            Phase::Focus => "Focus",
            Phase::Quit => "Quit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The foundational interface for a runtime system.
///
/// A system is a long-lived service owned by the runtime, with exactly one
/// instance per concrete type. Implementors override the hook accessors for
/// the phases they participate in; the defaults opt out of everything.
///
/// The `as_any` pair enables downcasting to concrete system types, which is
/// how typed access through [`crate::handle::SystemHandle`] works.
pub trait System: Send {
    /// Allows downcasting to the concrete system type.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to the concrete system type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The registration hook, if this system participates in [`Phase::Register`].
    fn register_hook(&mut self) -> Option<&mut dyn RegisterHook> {
        None
    }

    /// The async initialization hook, if this system participates in
    /// [`Phase::Initialize`].
    fn init_hook(&mut self) -> Option<&mut dyn InitHook> {
        None
    }

    /// The per-frame update hook, if this system participates in [`Phase::Update`].
    fn update_hook(&mut self) -> Option<&mut dyn UpdateHook> {
        None
    }

    /// The fixed-step update hook, if this system participates in
    /// [`Phase::FixedUpdate`].
    fn fixed_update_hook(&mut self) -> Option<&mut dyn FixedUpdateHook> {
        None
    }

    /// The late update hook, if this system participates in [`Phase::LateUpdate`].
    fn late_update_hook(&mut self) -> Option<&mut dyn LateUpdateHook> {
        None
    }

    /// The application pause hook, if this system participates in [`Phase::Pause`].
    fn pause_hook(&mut self) -> Option<&mut dyn PauseHook> {
        None
    }

    /// The application focus hook, if this system participates in [`Phase::Focus`].
    fn focus_hook(&mut self) -> Option<&mut dyn FocusHook> {
        None
    }

    /// The application quit hook, if this system participates in [`Phase::Quit`].
    fn quit_hook(&mut self) -> Option<&mut dyn QuitHook> {
        None
    }

    /// The enable/disable switch, if this system can be toggled.
    ///
    /// Systems without a switch are treated as always enabled.
    fn toggle(&mut self) -> Option<&mut dyn Toggle> {
        None
    }
}

/// One-shot registration callbacks.
pub trait RegisterHook: Send {
    /// Called once, synchronously, right after the system is registered.
    fn on_register(&mut self) -> SystemResult<()>;

    /// Called once when the system is unregistered.
    fn on_unregister(&mut self) -> SystemResult<()> {
        Ok(())
    }
}

/// One-shot asynchronous initialization.
///
/// Initialization runs strictly sequentially in priority order: the runtime
/// awaits each system's future to completion before starting the next one.
#[async_trait]
pub trait InitHook: Send {
    /// Performs the system's asynchronous startup work.
    async fn on_initialize(&mut self) -> SystemResult<()>;
}

/// Per-frame variable-step update.
pub trait UpdateHook: Send {
    /// Called every frame the system is enabled and its update interval has
    /// elapsed. `dt` is the time since the previous frame, in seconds.
    fn on_update(&mut self, dt: f32) -> SystemResult<()>;
}

/// Fixed-step update.
pub trait FixedUpdateHook: Send {
    /// Called on every fixed step while the system is enabled. `dt` is the
    /// fixed step length, in seconds.
    fn on_fixed_update(&mut self, dt: f32) -> SystemResult<()>;
}

/// Per-frame late update, dispatched after every regular update.
pub trait LateUpdateHook: Send {
    /// Called every frame the system is enabled, after all regular updates.
    fn on_late_update(&mut self, dt: f32) -> SystemResult<()>;
}

/// Host application pause notification.
///
/// Delivered to every registered participant regardless of the per-system
/// enabled flag and of the runtime's global pause state.
pub trait PauseHook: Send {
    /// Called when the host application pauses (`true`) or resumes (`false`).
    fn on_app_pause(&mut self, paused: bool) -> SystemResult<()>;
}

/// Host application focus notification.
///
/// Delivered to every registered participant regardless of the per-system
/// enabled flag and of the runtime's global pause state.
pub trait FocusHook: Send {
    /// Called when the host application gains (`true`) or loses (`false`) focus.
    fn on_app_focus(&mut self, focused: bool) -> SystemResult<()>;
}

/// Host application shutdown notification.
///
/// Delivered to every registered participant regardless of the per-system
/// enabled flag and of the runtime's global pause state.
pub trait QuitHook: Send {
    /// Called once when the host application is shutting down.
    fn on_app_quit(&mut self) -> SystemResult<()>;
}

/// Runtime enable/disable switch for a system.
pub trait Toggle: Send {
    /// Whether the system currently wants its update phases dispatched.
    fn is_enabled(&self) -> bool;

    /// Enables or disables the system's update phases.
    fn set_enabled(&mut self, enabled: bool);
}
