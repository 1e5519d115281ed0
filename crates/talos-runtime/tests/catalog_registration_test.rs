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
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use talos_core::{InitHook, RegisterHook, System, SystemResult, SystemSpec};
use talos_runtime::{DisableReason, RuntimeConfig, SystemCatalog, SystemRuntime};

type Trace = Arc<Mutex<Vec<&'static str>>>;

// --- DUMMY SYSTEMS FOR THIS TEST ---

struct Boot {
    trace: Trace,
}

impl System for Boot {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn register_hook(&mut self) -> Option<&mut dyn RegisterHook> {
        Some(self)
    }
    fn init_hook(&mut self) -> Option<&mut dyn InitHook> {
        Some(self)
    }
}

impl RegisterHook for Boot {
    fn on_register(&mut self) -> SystemResult<()> {
        self.trace.lock().unwrap().push("Boot:register");
        Ok(())
    }
}

#[async_trait]
impl InitHook for Boot {
    async fn on_initialize(&mut self) -> SystemResult<()> {
        self.trace.lock().unwrap().push("Boot:init");
        Ok(())
    }
}

struct Stage {
    trace: Trace,
}

impl System for Stage {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn register_hook(&mut self) -> Option<&mut dyn RegisterHook> {
        Some(self)
    }
    fn init_hook(&mut self) -> Option<&mut dyn InitHook> {
        Some(self)
    }
}

impl RegisterHook for Stage {
    fn on_register(&mut self) -> SystemResult<()> {
        self.trace.lock().unwrap().push("Stage:register");
        Ok(())
    }
}

#[async_trait]
impl InitHook for Stage {
    async fn on_initialize(&mut self) -> SystemResult<()> {
        self.trace.lock().unwrap().push("Stage:init");
        Ok(())
    }
}

#[derive(Default)]
struct Broken;

impl System for Broken {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn catalog_with_trace(trace: &Trace) -> SystemCatalog {
    let mut catalog = SystemCatalog::new();
    // Stage comes first in the catalog but depends on Boot, so resolution
    // must flip their construction order.
    let stage_trace = Arc::clone(trace);
    catalog.add(
        SystemSpec::with::<Stage, _>(move || {
            Ok(Stage {
                trace: Arc::clone(&stage_trace),
            })
        })
        .priority(20)
        .depends_on::<Boot>()
        .build(),
    );
    let boot_trace = Arc::clone(trace);
    catalog.add(
        SystemSpec::with::<Boot, _>(move || {
            Ok(Boot {
                trace: Arc::clone(&boot_trace),
            })
        })
        .priority(10)
        .build(),
    );
    catalog
}

#[tokio::test]
async fn test_bulk_registration_respects_dependency_and_priority_order() {
    // --- 1. ARRANGE ---
    let trace: Trace = Arc::default();
    let catalog = catalog_with_trace(&trace);
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());

    // --- 2. ACT ---
    let report = runtime.register_catalog(&catalog).await;

    // --- 3. ASSERT ---
    assert_eq!(
        report.registered,
        vec!["Boot".to_string(), "Stage".to_string()],
        "Construction must follow dependency order"
    );
    assert!(report.disabled.is_empty());
    assert_eq!(
        *trace.lock().unwrap(),
        vec!["Boot:register", "Stage:register", "Boot:init", "Stage:init"],
        "Register hooks run for the whole batch before init hooks, by priority"
    );
    assert!(runtime.has::<Boot>());
    assert!(runtime.has::<Stage>());
    assert_eq!(runtime.len(), 2);
}

#[tokio::test]
async fn test_registering_the_same_catalog_twice_changes_nothing() {
    let trace: Trace = Arc::default();
    let catalog = catalog_with_trace(&trace);
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());

    runtime.register_catalog(&catalog).await;
    let hook_count = trace.lock().unwrap().len();
    let second = runtime.register_catalog(&catalog).await;

    assert!(second.registered.is_empty(), "Nothing new to register");
    assert_eq!(runtime.len(), 2);
    assert_eq!(
        trace.lock().unwrap().len(),
        hook_count,
        "Hooks must not fire again for already registered systems"
    );
}

#[tokio::test]
async fn test_construction_failure_disables_only_that_entry() {
    let trace: Trace = Arc::default();
    let mut catalog = catalog_with_trace(&trace);
    catalog.add(
        SystemSpec::with::<Broken, _>(|| {
            Err(talos_core::SystemError::construction::<Broken>(
                "missing device",
            ))
        })
        .build(),
    );
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());

    let report = runtime.register_catalog(&catalog).await;

    assert!(report.registered_contains("Boot"));
    assert!(report.registered_contains("Stage"));
    assert!(
        matches!(
            report.disabled_reason("Broken"),
            Some(DisableReason::ConstructionFailed { .. })
        ),
        "The failing constructor must be reported, not propagated"
    );
    assert_eq!(runtime.len(), 2);
    assert!(!runtime.has::<Broken>());
}

#[tokio::test]
async fn test_statuses_mark_catalog_systems_initialized() {
    let trace: Trace = Arc::default();
    let catalog = catalog_with_trace(&trace);
    let mut runtime = SystemRuntime::new(&RuntimeConfig::default());

    runtime.register_catalog(&catalog).await;

    let statuses = runtime.all_statuses();
    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|status| status.initialized));
    assert_eq!(statuses[0].name, "Boot");
    assert_eq!(statuses[0].priority, 10);
}
