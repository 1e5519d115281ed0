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

//! The explicit manifest of system candidates a host hands to the runtime.

use std::sync::Arc;
use talos_core::spec::SystemSpec;

/// An ordered collection of system descriptors.
///
/// The catalog is the runtime's only discovery mechanism: hosts list their
/// systems explicitly and the order of `add` calls is the stable candidate
/// order that resolution falls back to for independent systems.
#[derive(Debug, Default)]
pub struct SystemCatalog {
    entries: Vec<Arc<SystemSpec>>,
}

impl SystemCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor.
    ///
    /// A second descriptor for the same concrete type is ignored with a
    /// warning; the first entry stays authoritative.
    pub fn add(&mut self, spec: SystemSpec) -> &mut Self {
        if self.entries.iter().any(|e| e.key() == spec.key()) {
            log::warn!(
                "Catalog already contains '{}', ignoring duplicate entry",
                spec.name()
            );
            return self;
        }
        self.entries.push(Arc::new(spec));
        self
    }

    /// The descriptors, in insertion order.
    pub fn entries(&self) -> &[Arc<SystemSpec>] {
        &self.entries
    }

    /// Number of descriptors in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
