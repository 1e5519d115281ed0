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

//! Per-system status snapshots.

use serde::Serialize;

/// A point-in-time view of one registered system.
///
/// Produced by [`SystemRuntime::status_of`](crate::SystemRuntime::status_of)
/// and [`SystemRuntime::all_statuses`](crate::SystemRuntime::all_statuses);
/// serializable so hosts can feed dashboards or debug overlays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    /// Short type name of the system.
    pub name: String,
    /// Configured alias, if any.
    pub alias: Option<String>,
    /// Scheduling priority; lower runs earlier.
    pub priority: i32,
    /// Whether the system currently accepts frame updates.
    pub enabled: bool,
    /// Whether async initialization has completed.
    pub initialized: bool,
    /// Whether the system exposes an enable switch at all.
    pub can_toggle: bool,
    /// Frame interval for the update phase; `0` and `1` both mean every
    /// frame.
    pub update_interval: u32,
    /// Duration of the most recent update; `0.0` until profiling records
    /// one.
    pub last_update_ms: f64,
    /// Rolling average update duration over the sample window; `0.0` with
    /// no samples.
    pub average_update_ms: f64,
}
