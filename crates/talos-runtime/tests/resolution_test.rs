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

use talos_core::{System, SystemSpec};
use talos_runtime::{DisableReason, RuntimeConfig, SystemCatalog, SystemRuntime};

// --- DUMMY SYSTEMS FOR THIS TEST ---

macro_rules! plain_system {
    ($name:ident) => {
        #[derive(Default)]
        struct $name;

        impl System for $name {
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

plain_system!(Standalone);
plain_system!(Consumer);
plain_system!(Chained);
plain_system!(Ghost);
plain_system!(Red);
plain_system!(Blue);
plain_system!(Green);
plain_system!(DebugHud);
plain_system!(Noisy);
plain_system!(NoisyFan);

#[tokio::test]
async fn test_missing_dependency_cascades_through_dependents() {
    let mut catalog = SystemCatalog::new();
    catalog.add(SystemSpec::of::<Consumer>().depends_on::<Ghost>().build());
    catalog.add(SystemSpec::of::<Chained>().depends_on::<Consumer>().build());
    catalog.add(SystemSpec::of::<Standalone>().build());
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());

    let report = runtime.register_catalog(&catalog).await;

    assert_eq!(report.registered, vec!["Standalone".to_string()]);
    assert!(matches!(
        report.disabled_reason("Consumer"),
        Some(DisableReason::MissingDependency { dependency }) if dependency == "Ghost"
    ));
    assert!(matches!(
        report.disabled_reason("Chained"),
        Some(DisableReason::DependencyDisabled { dependency }) if dependency == "Consumer"
    ));
    assert!(!runtime.has::<Consumer>());
    assert!(!runtime.has::<Chained>());
}

#[tokio::test]
async fn test_a_dependency_cycle_disables_only_its_members() {
    let mut catalog = SystemCatalog::new();
    catalog.add(SystemSpec::of::<Red>().depends_on::<Blue>().build());
    catalog.add(SystemSpec::of::<Blue>().depends_on::<Red>().build());
    catalog.add(SystemSpec::of::<Green>().build());
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());

    let report = runtime.register_catalog(&catalog).await;

    assert_eq!(report.registered, vec!["Green".to_string()]);
    let red = report.disabled_reason("Red");
    let blue = report.disabled_reason("Blue");
    assert!(
        matches!(red, Some(DisableReason::Cycle { chain }) if chain.contains(&"Red".to_string())
            && chain.contains(&"Blue".to_string())),
        "Red must be disabled with the full cycle chain, got {red:?}"
    );
    assert!(matches!(blue, Some(DisableReason::Cycle { .. })));
    assert!(runtime.has::<Green>());
}

#[tokio::test]
async fn test_conditional_systems_need_their_symbol() {
    let mut catalog = SystemCatalog::new();
    catalog.add(
        SystemSpec::of::<DebugHud>()
            .requires_symbol("DEBUG_HUD")
            .build(),
    );
    catalog.add(SystemSpec::of::<Standalone>().build());

    // Without the symbol the entry is filtered out.
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());
    let report = runtime.register_catalog(&catalog).await;
    assert!(matches!(
        report.disabled_reason("DebugHud"),
        Some(DisableReason::SymbolMissing { symbol }) if symbol == "DEBUG_HUD"
    ));
    assert!(!runtime.has::<DebugHud>());

    // Defining it first lets the entry through.
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());
    runtime.define_symbol("DEBUG_HUD");
    let report = runtime.register_catalog(&catalog).await;
    assert!(report.registered_contains("DebugHud"));
    assert!(runtime.has::<DebugHud>());
}

#[tokio::test]
async fn test_config_disabled_systems_never_materialize() {
    let mut catalog = SystemCatalog::new();
    catalog.add(SystemSpec::of::<Noisy>().build());
    catalog.add(SystemSpec::of::<NoisyFan>().depends_on::<Noisy>().build());
    catalog.add(SystemSpec::of::<Standalone>().build());
    let config = RuntimeConfig::default().disable_system::<Noisy>();
    let mut runtime = SystemRuntime::new(&config);

    let report = runtime.register_catalog(&catalog).await;

    assert!(matches!(
        report.disabled_reason("Noisy"),
        Some(DisableReason::ConfigDisabled)
    ));
    // The disabled entry is gone from the candidate set, so its dependents
    // resolve against nothing.
    assert!(matches!(
        report.disabled_reason("NoisyFan"),
        Some(DisableReason::MissingDependency { dependency }) if dependency == "Noisy"
    ));
    assert_eq!(report.registered, vec!["Standalone".to_string()]);
}
