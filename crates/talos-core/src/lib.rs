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

//! # Talos Core
//!
//! Foundational crate containing the system trait, capability contracts,
//! per-type descriptors, and the shared primitives the runtime is built on.

#![warn(missing_docs)]

pub mod capability;
pub mod error;
pub mod event;
pub mod handle;
pub mod spec;
pub mod system;
pub mod utils;

pub use capability::{BoundCapability, CapabilityId, CapabilityRef};
pub use error::{SystemError, SystemResult};
pub use event::EventBus;
pub use handle::SystemHandle;
pub use spec::{InjectionMode, InjectionPoint, SystemMetadata, SystemSpec, SystemSpecBuilder};
pub use system::{
    FixedUpdateHook, FocusHook, InitHook, LateUpdateHook, PauseHook, Phase, QuitHook,
    RegisterHook, System, Toggle, UpdateHook,
};
pub use utils::timer::Stopwatch;
