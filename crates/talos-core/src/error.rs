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

//! Defines the error taxonomy for the system runtime.
//!
//! Runtime failures are contained at the site of the faulting system: the
//! runtime logs them and carries on with every unaffected system, so these
//! errors mostly travel through logs and resolution reports rather than
//! across the public API boundary.

use crate::system::Phase;
use std::fmt;

/// Convenience alias for results produced by runtime and system operations.
pub type SystemResult<T> = std::result::Result<T, SystemError>;

/// An error raised while registering, resolving, wiring, or driving systems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    /// A system's constructor returned an error or was otherwise unable to
    /// produce an instance.
    Construction {
        /// Name of the system type that failed to construct.
        system: String,
        /// Description of the underlying failure.
        reason: String,
    },
    /// Two registered systems claimed the same capability. The first binding
    /// is kept and the later one is rejected.
    DuplicateBinding {
        /// Name of the contested capability.
        capability: String,
        /// Name of the system already bound to the capability.
        existing: String,
        /// Name of the system whose binding was rejected.
        rejected: String,
    },
    /// A declared dependency does not name any known candidate.
    MissingDependency {
        /// Name of the system declaring the dependency.
        system: String,
        /// Name of the dependency that could not be found.
        dependency: String,
    },
    /// Dependency resolution re-entered a node that was still being visited.
    CycleDetected {
        /// The chain of system names along the cycle, ending at the repeat.
        chain: Vec<String>,
    },
    /// A required injection point could not be satisfied from the registry.
    InjectionUnresolved {
        /// Name of the system owning the injection point.
        system: String,
        /// Name of the member the injection targets.
        member: String,
        /// Name of the capability that was looked up.
        capability: String,
    },
    /// A lifecycle callback returned an error.
    PhaseFault {
        /// Name of the faulting system.
        system: String,
        /// The phase during which the fault occurred.
        phase: Phase,
        /// Description of the fault.
        reason: String,
    },
    /// The runtime configuration could not be parsed or validated.
    Config {
        /// Description of the configuration problem.
        reason: String,
    },
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::Construction { system, reason } => {
                write!(f, "Failed to construct system '{system}': {reason}")
            }
            SystemError::DuplicateBinding {
                capability,
                existing,
                rejected,
            } => {
                write!(
                    f,
                    "Capability '{capability}' is already provided by '{existing}'; rejected binding from '{rejected}'"
                )
            }
            SystemError::MissingDependency { system, dependency } => {
                write!(
                    f,
                    "System '{system}' depends on '{dependency}', which is not a known candidate"
                )
            }
            SystemError::CycleDetected { chain } => {
                write!(f, "Dependency cycle detected: {}", chain.join(" -> "))
            }
            SystemError::InjectionUnresolved {
                system,
                member,
                capability,
            } => {
                write!(
                    f,
                    "Required dependency '{capability}' for '{system}.{member}' could not be resolved"
                )
            }
            SystemError::PhaseFault {
                system,
                phase,
                reason,
            } => {
                write!(f, "System '{system}' faulted during {phase}: {reason}")
            }
            SystemError::Config { reason } => {
                write!(f, "Invalid runtime configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for SystemError {}

impl SystemError {
    /// Shorthand for a [`SystemError::Construction`] naming type `S`.
    pub fn construction<S: 'static>(reason: impl Into<String>) -> Self {
        SystemError::Construction {
            system: crate::capability::CapabilityId::of::<S>()
                .short_name()
                .to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_error_display() {
        let err = SystemError::Construction {
            system: "AudioSystem".to_string(),
            reason: "device unavailable".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Failed to construct system 'AudioSystem': device unavailable"
        );
    }

    #[test]
    fn cycle_error_display_joins_chain() {
        let err = SystemError::CycleDetected {
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(format!("{err}"), "Dependency cycle detected: A -> B -> A");
    }

    #[test]
    fn phase_fault_display_names_phase() {
        let err = SystemError::PhaseFault {
            system: "SaveSystem".to_string(),
            phase: Phase::Update,
            reason: "disk full".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "System 'SaveSystem' faulted during Update: disk full"
        );
    }
}
