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

//! Notifications published by the runtime as its registry changes.

/// A structural change in the runtime, published on its event bus.
///
/// Carries the system's short type name; consumers needing the instance look
/// it up through the runtime at their own pace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A system instance was constructed and entered the registry.
    SystemRegistered {
        /// Short type name of the registered system.
        system: String,
    },
    /// A system instance left the registry.
    SystemUnregistered {
        /// Short type name of the unregistered system.
        system: String,
    },
    /// A system's enable switch was flipped through the runtime.
    SystemEnabledChanged {
        /// Short type name of the affected system.
        system: String,
        /// The new enabled state.
        enabled: bool,
    },
}
