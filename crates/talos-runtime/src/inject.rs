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

//! Dependency injection pass.
//!
//! Walks the injection points declared on a [`SystemSpec`] and satisfies each
//! one from the registry's current bindings. Required points that cannot be
//! satisfied are logged as errors; weak points degrade to a debug note and
//! leave the member untouched.

use talos_core::{InjectionMode, SystemError, SystemHandle, SystemSpec};

use crate::registry::SystemRegistry;

/// Satisfies every injection point on `spec` against the registry.
///
/// The target system is locked with `try_lock`; the runtime only calls this
/// outside of phase dispatch, so the lock is expected to be free. A held lock
/// means a handle escaped into a callback and is reported as an error rather
/// than awaited.
pub(crate) fn inject_system(spec: &SystemSpec, handle: &SystemHandle, registry: &SystemRegistry) {
    if spec.injections().is_empty() {
        return;
    }

    let Some(mut guard) = handle.try_lock() else {
        log::error!(
            "Cannot inject into '{}': the system is locked during the injection pass",
            spec.name()
        );
        return;
    };

    for point in spec.injections() {
        match registry.lookup_binding(point.capability()) {
            Some(binding) => {
                if point.apply(&mut **guard, &binding) {
                    log::info!(
                        "Injected '{}' into {}.{}",
                        binding.provider().short_name(),
                        spec.name(),
                        point.member()
                    );
                } else {
                    log::error!(
                        "Injection of '{}' into {}.{} was rejected by the setter",
                        point.capability().short_name(),
                        spec.name(),
                        point.member()
                    );
                }
            }
            None => match point.mode() {
                InjectionMode::Required => {
                    let err = SystemError::InjectionUnresolved {
                        system: spec.name().to_string(),
                        member: point.member().to_string(),
                        capability: point.capability().short_name().to_string(),
                    };
                    log::error!("{err}");
                }
                InjectionMode::Weak => {
                    log::debug!(
                        "Weak injection {}.{} left empty, no provider for '{}'",
                        spec.name(),
                        point.member(),
                        point.capability().short_name()
                    );
                }
            },
        }
    }
}
