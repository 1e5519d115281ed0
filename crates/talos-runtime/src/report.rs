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

//! The outcome summary a bulk registration hands back to its caller.
//!
//! All failures during registration are contained and logged; the report is
//! how callers observe them programmatically without trawling the log.

/// Why a candidate did not make it into the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisableReason {
    /// The candidate is listed in the configuration's disable list.
    ConfigDisabled,
    /// The candidate's required conditional symbol is not defined.
    SymbolMissing {
        /// The symbol the candidate requires.
        symbol: String,
    },
    /// A declared dependency names no known candidate.
    MissingDependency {
        /// Short name of the dependency that could not be found.
        dependency: String,
    },
    /// A declared dependency exists but was itself disabled.
    DependencyDisabled {
        /// Short name of the disabled dependency.
        dependency: String,
    },
    /// The candidate sits on a dependency cycle.
    Cycle {
        /// The chain of system names along the cycle, ending at the repeat.
        chain: Vec<String>,
    },
    /// The candidate's constructor failed.
    ConstructionFailed {
        /// Description of the constructor failure.
        reason: String,
    },
}

/// One candidate that was dropped during a bulk registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledCandidate {
    /// Short type name of the dropped candidate.
    pub system: String,
    /// Why it was dropped.
    pub reason: DisableReason,
}

/// A contested fallback capability and how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackAmbiguity {
    /// Short name of the contested capability.
    pub capability: String,
    /// Short name of the fallback that won the binding.
    pub winner: String,
    /// Short names of every fallback that offered the capability.
    pub candidates: Vec<String>,
}

/// A capability two registered systems both claimed; the first kept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConflict {
    /// Short name of the contested capability.
    pub capability: String,
    /// Short name of the system holding the binding.
    pub existing: String,
    /// Short name of the system whose claim was rejected.
    pub rejected: String,
}

/// Summary of one bulk (or dynamic) registration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Short names of the systems registered by this pass, in registration
    /// order (dependencies before dependents, fallbacks after primaries).
    pub registered: Vec<String>,
    /// Candidates dropped by this pass, with reasons.
    pub disabled: Vec<DisabledCandidate>,
    /// Contested fallback capabilities resolved without a configured choice.
    pub ambiguities: Vec<FallbackAmbiguity>,
    /// Capability claims rejected because the capability was already bound.
    pub conflicts: Vec<BindingConflict>,
}

impl ResolutionReport {
    /// Whether `system` (short name) was registered by this pass.
    pub fn registered_contains(&self, system: &str) -> bool {
        self.registered.iter().any(|s| s == system)
    }

    /// The reason `system` (short name) was dropped, if it was.
    pub fn disabled_reason(&self, system: &str) -> Option<&DisableReason> {
        self.disabled
            .iter()
            .find(|d| d.system == system)
            .map(|d| &d.reason)
    }

    /// Records a dropped candidate.
    pub(crate) fn push_disabled(&mut self, system: impl Into<String>, reason: DisableReason) {
        self.disabled.push(DisabledCandidate {
            system: system.into(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_helpers_find_entries() {
        let mut report = ResolutionReport::default();
        report.registered.push("Clock".to_string());
        report.push_disabled(
            "Audio",
            DisableReason::MissingDependency {
                dependency: "Mixer".to_string(),
            },
        );

        assert!(report.registered_contains("Clock"));
        assert!(!report.registered_contains("Audio"));
        assert_eq!(
            report.disabled_reason("Audio"),
            Some(&DisableReason::MissingDependency {
                dependency: "Mixer".to_string()
            })
        );
        assert_eq!(report.disabled_reason("Clock"), None);
    }
}
