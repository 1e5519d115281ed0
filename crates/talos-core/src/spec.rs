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

//! Per-type system descriptors: metadata, capabilities, dependencies, and
//! the injection plan.
//!
//! A [`SystemSpec`] is the declarative unit a catalog hands to the runtime.
//! It is built once by the manifest author and cached by the runtime per
//! concrete type on first registration; everything the runtime needs to
//! construct, wire, and schedule a system is read from here.

use crate::capability::{BoundCapability, CapabilityCast, CapabilityId, CapabilityRef};
use crate::error::SystemResult;
use crate::handle::SystemHandle;
use crate::system::System;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Declarative scheduling and resolution metadata for one system type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemMetadata {
    /// Optional short lookup name, resolvable through the registry.
    pub alias: Option<String>,
    /// Scheduling priority; lower values run earlier. Defaults to `0`.
    pub priority: i32,
    /// Frames between update invocations; `0` and `1` both mean every frame.
    pub update_interval: u32,
    /// Conditional compilation-style symbol that must be defined for the
    /// system to be considered during bulk registration.
    pub required_symbol: Option<String>,
    /// Whether this system is a fallback provider, registered only when one
    /// of its capabilities would otherwise stay unbound.
    pub fallback: bool,
}

/// Whether an unresolved injection point is an error or an accepted absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionMode {
    /// The dependency is expected to exist; resolution failure is an error
    /// (logged, the member stays unset, the system still registers).
    Required,
    /// The dependency is optional; resolution failure is silent.
    Weak,
}

type ApplyFn = Arc<dyn Fn(&mut dyn System, &BoundCapability) -> bool + Send + Sync>;
type ConstructFn = Arc<dyn Fn() -> SystemResult<Box<dyn System>> + Send + Sync>;

/// One entry of a system's injection plan.
///
/// Pairs the capability to look up with a type-erased assignment into the
/// owning system. The plan is built once per type and replayed against the
/// registry every time the system is injected.
#[derive(Clone)]
pub struct InjectionPoint {
    member: &'static str,
    capability: CapabilityId,
    mode: InjectionMode,
    apply: ApplyFn,
}

impl InjectionPoint {
    /// The name of the member this entry assigns, used in diagnostics.
    pub fn member(&self) -> &'static str {
        self.member
    }

    /// The capability this entry resolves.
    pub fn capability(&self) -> CapabilityId {
        self.capability
    }

    /// Whether the dependency is required or weak.
    pub fn mode(&self) -> InjectionMode {
        self.mode
    }

    /// Applies the resolved binding to `target`.
    ///
    /// Returns `false` when the assignment could not be made: the target is
    /// not the concrete type this plan was built for, or the binding carries
    /// no cast for the requested capability trait.
    pub fn apply(&self, target: &mut dyn System, binding: &BoundCapability) -> bool {
        (self.apply)(target, binding)
    }
}

impl fmt::Debug for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("member", &self.member)
            .field("capability", &self.capability)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// A capability a system offers beyond its own concrete type.
#[derive(Clone)]
pub struct ProvidedCapability {
    id: CapabilityId,
    caster: Option<Arc<dyn Any + Send + Sync>>,
}

impl ProvidedCapability {
    /// The capability's identity.
    pub fn id(&self) -> CapabilityId {
        self.id
    }

    /// Produces the registry binding for this capability on `provider`'s
    /// instance, carrying the capability cast when one was declared.
    pub fn bind(&self, handle: &SystemHandle, provider: CapabilityId) -> BoundCapability {
        BoundCapability::new(handle.clone(), provider, self.caster.clone())
    }
}

impl fmt::Debug for ProvidedCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidedCapability")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The complete descriptor for one concrete system type.
#[derive(Clone)]
pub struct SystemSpec {
    key: CapabilityId,
    metadata: SystemMetadata,
    provides: Vec<ProvidedCapability>,
    depends_on: Vec<CapabilityId>,
    injections: Vec<InjectionPoint>,
    construct: ConstructFn,
}

impl SystemSpec {
    /// Starts a descriptor for a default-constructible system type.
    pub fn of<S>() -> SystemSpecBuilder<S>
    where
        S: System + Default + 'static,
    {
        SystemSpecBuilder::new(Arc::new(|| Ok(Box::new(S::default()) as Box<dyn System>)))
    }

    /// Starts a descriptor with an explicit, fallible constructor.
    pub fn with<S, F>(construct: F) -> SystemSpecBuilder<S>
    where
        S: System + 'static,
        F: Fn() -> SystemResult<S> + Send + Sync + 'static,
    {
        SystemSpecBuilder::new(Arc::new(move || {
            construct().map(|s| Box::new(s) as Box<dyn System>)
        }))
    }

    /// The concrete type identity this descriptor belongs to.
    pub fn key(&self) -> CapabilityId {
        self.key
    }

    /// The short display name of the system type.
    pub fn name(&self) -> &'static str {
        self.key.short_name()
    }

    /// The declared scheduling and resolution metadata.
    pub fn metadata(&self) -> &SystemMetadata {
        &self.metadata
    }

    /// Capabilities provided beyond the concrete type itself.
    pub fn provides(&self) -> &[ProvidedCapability] {
        &self.provides
    }

    /// Declared ordering dependencies.
    pub fn depends_on(&self) -> &[CapabilityId] {
        &self.depends_on
    }

    /// The injection plan.
    pub fn injections(&self) -> &[InjectionPoint] {
        &self.injections
    }

    /// Constructs a fresh instance of the system.
    pub fn construct(&self) -> SystemResult<Box<dyn System>> {
        (self.construct)()
    }

    /// Whether this descriptor declares the given capability, either as its
    /// concrete type or through its provides list.
    pub fn offers(&self, capability: CapabilityId) -> bool {
        self.key == capability || self.provides.iter().any(|p| p.id() == capability)
    }
}

impl fmt::Debug for SystemSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemSpec")
            .field("key", &self.key)
            .field("metadata", &self.metadata)
            .field("provides", &self.provides.len())
            .field("depends_on", &self.depends_on.len())
            .field("injections", &self.injections.len())
            .finish()
    }
}

/// Fluent builder for [`SystemSpec`], typed by the concrete system.
pub struct SystemSpecBuilder<S: System + 'static> {
    key: CapabilityId,
    metadata: SystemMetadata,
    provides: Vec<ProvidedCapability>,
    depends_on: Vec<CapabilityId>,
    injections: Vec<InjectionPoint>,
    construct: ConstructFn,
    _marker: PhantomData<fn() -> S>,
}

impl<S: System + 'static> SystemSpecBuilder<S> {
    fn new(construct: ConstructFn) -> Self {
        Self {
            key: CapabilityId::of::<S>(),
            metadata: SystemMetadata::default(),
            provides: Vec::new(),
            depends_on: Vec::new(),
            injections: Vec::new(),
            construct,
            _marker: PhantomData,
        }
    }

    /// Sets the short lookup alias.
    pub fn alias(mut self, alias: &str) -> Self {
        self.metadata.alias = Some(alias.to_string());
        self
    }

    /// Sets the scheduling priority (lower runs earlier).
    pub fn priority(mut self, priority: i32) -> Self {
        self.metadata.priority = priority;
        self
    }

    /// Sets the update interval in frames. `0` and `1` both mean every frame.
    pub fn update_interval(mut self, frames: u32) -> Self {
        self.metadata.update_interval = frames;
        self
    }

    /// Gates the system behind a conditional symbol.
    pub fn requires_symbol(mut self, symbol: &str) -> Self {
        self.metadata.required_symbol = Some(symbol.to_string());
        self
    }

    /// Marks the system as a fallback provider for its capabilities.
    pub fn fallback(mut self) -> Self {
        self.metadata.fallback = true;
        self
    }

    /// Declares that the system provides capability `A` as a pure marker,
    /// with no typed access through `A`.
    pub fn provides<A: ?Sized + 'static>(mut self) -> Self {
        self.provides.push(ProvidedCapability {
            id: CapabilityId::of::<A>(),
            caster: None,
        });
        self
    }

    /// Declares that the system provides capability trait `A`, with typed
    /// access for consumers through [`CapabilityRef<A>`].
    ///
    /// The cast is the identity coercion at the call site, e.g.
    /// `.provides_as::<dyn TimeSource>(|s| s)`.
    pub fn provides_as<A: ?Sized + 'static>(mut self, cast: fn(&mut S) -> &mut A) -> Self {
        let erased: CapabilityCast<A> = Arc::new(move |sys: &mut dyn System| {
            sys.as_any_mut().downcast_mut::<S>().map(|s| cast(s))
        });
        self.provides.push(ProvidedCapability {
            id: CapabilityId::of::<A>(),
            caster: Some(Arc::new(erased) as Arc<dyn Any + Send + Sync>),
        });
        self
    }

    /// Declares an ordering dependency on capability `D`.
    pub fn depends_on<D: ?Sized + 'static>(mut self) -> Self {
        self.depends_on.push(CapabilityId::of::<D>());
        self
    }

    /// Adds a required injection point assigning the provider's handle.
    pub fn inject<D: ?Sized + 'static>(
        self,
        member: &'static str,
        assign: fn(&mut S, SystemHandle),
    ) -> Self {
        self.push_handle_injection::<D>(member, InjectionMode::Required, assign)
    }

    /// Adds a weak injection point assigning the provider's handle.
    pub fn inject_weak<D: ?Sized + 'static>(
        self,
        member: &'static str,
        assign: fn(&mut S, SystemHandle),
    ) -> Self {
        self.push_handle_injection::<D>(member, InjectionMode::Weak, assign)
    }

    /// Adds a required injection point assigning a typed capability view.
    pub fn inject_ref<A: ?Sized + 'static>(
        self,
        member: &'static str,
        assign: fn(&mut S, CapabilityRef<A>),
    ) -> Self {
        self.push_ref_injection::<A>(member, InjectionMode::Required, assign)
    }

    /// Adds a weak injection point assigning a typed capability view.
    pub fn inject_ref_weak<A: ?Sized + 'static>(
        self,
        member: &'static str,
        assign: fn(&mut S, CapabilityRef<A>),
    ) -> Self {
        self.push_ref_injection::<A>(member, InjectionMode::Weak, assign)
    }

    /// Finishes the descriptor.
    pub fn build(self) -> SystemSpec {
        SystemSpec {
            key: self.key,
            metadata: self.metadata,
            provides: self.provides,
            depends_on: self.depends_on,
            injections: self.injections,
            construct: self.construct,
        }
    }

    fn push_handle_injection<D: ?Sized + 'static>(
        mut self,
        member: &'static str,
        mode: InjectionMode,
        assign: fn(&mut S, SystemHandle),
    ) -> Self {
        let apply: ApplyFn = Arc::new(move |target: &mut dyn System, binding: &BoundCapability| {
            match target.as_any_mut().downcast_mut::<S>() {
                Some(s) => {
                    assign(s, binding.handle().clone());
                    true
                }
                None => false,
            }
        });
        self.injections.push(InjectionPoint {
            member,
            capability: CapabilityId::of::<D>(),
            mode,
            apply,
        });
        self
    }

    fn push_ref_injection<A: ?Sized + 'static>(
        mut self,
        member: &'static str,
        mode: InjectionMode,
        assign: fn(&mut S, CapabilityRef<A>),
    ) -> Self {
        let apply: ApplyFn = Arc::new(move |target: &mut dyn System, binding: &BoundCapability| {
            let Some(s) = target.as_any_mut().downcast_mut::<S>() else {
                return false;
            };
            match binding.typed::<A>() {
                Some(view) => {
                    assign(s, view);
                    true
                }
                None => false,
            }
        });
        self.injections.push(InjectionPoint {
            member,
            capability: CapabilityId::of::<A>(),
            mode,
            apply,
        });
        self
    }
}

impl<S: System + 'static> fmt::Debug for SystemSpecBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemSpecBuilder")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
