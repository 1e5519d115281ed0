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

//! Conditional symbol filtering.

use std::sync::Arc;

use talos_core::SystemSpec;

use crate::config::RuntimeSettings;
use crate::report::{DisableReason, ResolutionReport};

/// Drops candidates whose required symbol is not defined in the settings.
///
/// Candidates without a symbol requirement always pass. Dropped candidates
/// are recorded in the report so callers can see why a catalog entry never
/// materialised.
pub(crate) fn filter_symbols(
    candidates: Vec<Arc<SystemSpec>>,
    settings: &RuntimeSettings,
    report: &mut ResolutionReport,
) -> Vec<Arc<SystemSpec>> {
    let mut kept = Vec::with_capacity(candidates.len());
    for spec in candidates {
        match spec.metadata().required_symbol.as_deref() {
            Some(symbol) if !settings.has_symbol(symbol) => {
                log::warn!(
                    "Skipping system '{}', conditional symbol '{symbol}' is not defined",
                    spec.name()
                );
                report.push_disabled(
                    spec.name(),
                    DisableReason::SymbolMissing {
                        symbol: symbol.to_string(),
                    },
                );
            }
            _ => kept.push(spec),
        }
    }
    kept
}
