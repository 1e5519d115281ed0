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

//! Catalog-driven system runtime.
//!
//! This crate assembles the pieces from `talos-core` into a working
//! container: hosts describe their systems in a [`SystemCatalog`], hand it
//! to a [`SystemRuntime`], and drive the lifecycle phases from their frame
//! loop. Resolution (conditional symbols, dependency ordering, fallback
//! election), injection, scheduling and per-system profiling all happen
//! behind the facade.
//!
//! ```no_run
//! use talos_runtime::{RuntimeConfig, SystemCatalog, SystemRuntime};
//!
//! # #[derive(Default)]
//! # struct Audio;
//! # impl talos_core::System for Audio {
//! #     fn as_any(&self) -> &dyn std::any::Any { self }
//! #     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! # }
//! # async fn demo() {
//! let mut catalog = SystemCatalog::new();
//! catalog.add(talos_core::SystemSpec::of::<Audio>().priority(10).build());
//!
//! let mut runtime = SystemRuntime::new(&RuntimeConfig::default());
//! let report = runtime.register_catalog(&catalog).await;
//! assert!(report.registered_contains("Audio"));
//!
//! runtime.update(0.016);
//! runtime.late_update(0.016);
//! # }
//! ```

mod catalog;
mod config;
mod events;
mod graph;
mod inject;
mod registry;
mod report;
mod resolve;
mod runtime;
mod scheduler;
mod status;

pub use catalog::SystemCatalog;
pub use config::{ImplementationOverride, RuntimeConfig};
pub use events::RuntimeEvent;
pub use graph::{DependencyInfo, InjectionInfo};
pub use report::{
    BindingConflict, DisableReason, DisabledCandidate, FallbackAmbiguity, ResolutionReport,
};
pub use runtime::SystemRuntime;
pub use status::SystemStatus;
