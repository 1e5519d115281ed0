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

//! Dependency graph inspection.

use serde::Serialize;

/// One injection edge of a system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionInfo {
    /// Short name of the injected capability.
    pub capability: String,
    /// Whether a missing provider is tolerated.
    pub weak: bool,
}

/// One system's outgoing edges in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyInfo {
    /// Short type name of the system.
    pub system: String,
    /// Ordering dependencies, as short capability names.
    pub depends_on: Vec<String>,
    /// Injection edges.
    pub injections: Vec<InjectionInfo>,
}

/// Renders the graph as indented text, one block per system in
/// registration order.
pub(crate) fn render_graph(entries: &[DependencyInfo]) -> String {
    let mut out = format!("Dependency graph ({} systems)\n", entries.len());
    for info in entries {
        out.push_str(&info.system);
        out.push('\n');
        for dependency in &info.depends_on {
            out.push_str(&format!("  requires {dependency}\n"));
        }
        for injection in &info.injections {
            if injection.weak {
                out.push_str(&format!("  injects {} (weak)\n", injection.capability));
            } else {
                out.push_str(&format!("  injects {}\n", injection.capability));
            }
        }
    }
    out
}
