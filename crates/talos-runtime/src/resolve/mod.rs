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

//! Catalog resolution pipeline.
//!
//! Bulk registration runs the candidate set through three stages before any
//! system is constructed: the conditional filter drops candidates whose
//! required symbol is undefined, the dependency sorter orders survivors so
//! that providers precede their consumers (disabling anything whose
//! dependencies cannot be met), and fallback election decides which standby
//! providers are worth instantiating at all.

pub(crate) mod conditional;
pub(crate) mod dependency;
pub(crate) mod fallback;
