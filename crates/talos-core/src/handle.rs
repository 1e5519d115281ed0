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

//! Shared, cloneable handles to registered system instances.

use crate::system::System;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A shared handle to a single system instance.
///
/// Handles are what the registry stores and what injection delivers: clones
/// are cheap and all refer to the same instance. The instance lives behind an
/// async mutex because initialization is awaited; frame dispatch uses
/// non-blocking acquisition, which cannot contend as long as the runtime is
/// driven from one thread at a time.
#[derive(Clone)]
pub struct SystemHandle {
    cell: Arc<Mutex<Box<dyn System>>>,
}

impl SystemHandle {
    /// Wraps a freshly constructed system in a shareable handle.
    pub fn new(system: Box<dyn System>) -> Self {
        Self {
            cell: Arc::new(Mutex::new(system)),
        }
    }

    /// Acquires the instance without blocking.
    ///
    /// Returns `None` if the instance is currently locked, which under the
    /// single-threaded driving contract only happens when a system reaches
    /// back into its own handle from inside one of its callbacks.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, Box<dyn System>>> {
        self.cell.try_lock().ok()
    }

    /// Acquires the instance, waiting if it is currently locked.
    pub async fn lock(&self) -> MutexGuard<'_, Box<dyn System>> {
        self.cell.lock().await
    }

    /// Runs `f` against the instance downcast to its concrete type.
    ///
    /// Returns `None` when the instance is locked or is not an `S`.
    pub fn try_with<S: System + 'static, R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let mut guard = self.try_lock()?;
        let system = guard.as_any_mut().downcast_mut::<S>()?;
        Some(f(system))
    }

    /// Whether two handles refer to the same instance.
    pub fn ptr_eq(&self, other: &SystemHandle) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for SystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemHandle").finish_non_exhaustive()
    }
}
