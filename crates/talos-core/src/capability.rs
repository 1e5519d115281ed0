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

//! Capability identities and typed access to capability providers.
//!
//! A capability is anything a system can be looked up by: its own concrete
//! type, or a `dyn Trait` service contract it provides. The registry holds at
//! most one provider per capability at any time.

use crate::handle::SystemHandle;
use crate::system::System;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifies a capability: a concrete system type or a `dyn Trait` contract.
///
/// Built with [`CapabilityId::of`], which accepts unsized types, so both
/// `CapabilityId::of::<ClockSystem>()` and `CapabilityId::of::<dyn TimeSource>()`
/// are valid. Identity is the Rust `TypeId`; the captured type name is kept
/// for diagnostics and for matching configured implementation overrides.
#[derive(Clone, Copy, Debug)]
pub struct CapabilityId {
    id: TypeId,
    name: &'static str,
}

impl CapabilityId {
    /// The capability identity of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The fully-qualified type name, as configuration files reference it.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The last path segment of the type name, used in log lines.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Type-erased projection from a system instance to one of its capability
/// trait objects.
///
/// Built by `SystemSpec` when a provider declares a `dyn Trait` capability;
/// stored erased inside the registry binding and recovered typed through
/// [`BoundCapability::typed`].
pub type CapabilityCast<A> =
    Arc<dyn for<'a> Fn(&'a mut dyn System) -> Option<&'a mut A> + Send + Sync>;

/// A capability binding held by the registry: the provider's handle plus the
/// projection needed to view the instance through the capability trait.
#[derive(Clone)]
pub struct BoundCapability {
    handle: SystemHandle,
    provider: CapabilityId,
    caster: Option<Arc<dyn Any + Send + Sync>>,
}

impl BoundCapability {
    /// Creates a binding for `provider`'s instance, optionally carrying the
    /// erased capability cast produced by the provider's spec.
    pub fn new(
        handle: SystemHandle,
        provider: CapabilityId,
        caster: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Self {
        Self {
            handle,
            provider,
            caster,
        }
    }

    /// The handle to the providing instance.
    pub fn handle(&self) -> &SystemHandle {
        &self.handle
    }

    /// The concrete type that provides this capability.
    pub fn provider(&self) -> CapabilityId {
        self.provider
    }

    /// Recovers typed access through the capability trait `A`.
    ///
    /// Returns `None` if the provider did not declare a cast for `A`, which
    /// is always the case for plain concrete-type bindings.
    pub fn typed<A: ?Sized + 'static>(&self) -> Option<CapabilityRef<A>> {
        let caster = self.caster.as_ref()?;
        let cast = caster.downcast_ref::<CapabilityCast<A>>()?.clone();
        Some(CapabilityRef {
            handle: self.handle.clone(),
            cast,
        })
    }
}

impl fmt::Debug for BoundCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCapability")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// A handle viewed through a capability trait rather than a concrete type.
///
/// This is what consumers of a `dyn Trait` capability hold: they can call the
/// trait without knowing which implementation won the binding.
pub struct CapabilityRef<A: ?Sized + 'static> {
    handle: SystemHandle,
    cast: CapabilityCast<A>,
}

impl<A: ?Sized + 'static> CapabilityRef<A> {
    /// Runs `f` against the provider viewed as `&mut A`.
    ///
    /// Returns `None` when the instance is currently locked.
    pub fn try_with<R>(&self, f: impl FnOnce(&mut A) -> R) -> Option<R> {
        let mut guard = self.handle.try_lock()?;
        let target = (self.cast)(&mut **guard)?;
        Some(f(target))
    }

    /// The untyped handle to the providing instance.
    pub fn handle(&self) -> &SystemHandle {
        &self.handle
    }
}

impl<A: ?Sized + 'static> Clone for CapabilityRef<A> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            cast: self.cast.clone(),
        }
    }
}

impl<A: ?Sized + 'static> fmt::Debug for CapabilityRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRef")
            .field("capability", &std::any::type_name::<A>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl System for English {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn ids_compare_by_type_identity() {
        assert_eq!(CapabilityId::of::<English>(), CapabilityId::of::<English>());
        assert_ne!(
            CapabilityId::of::<English>(),
            CapabilityId::of::<dyn Greeter>()
        );
    }

    #[test]
    fn short_name_strips_the_module_path() {
        let id = CapabilityId::of::<English>();
        assert_eq!(id.short_name(), "English");
        assert!(id.name().contains("::"));
    }

    #[test]
    fn typed_access_goes_through_the_registered_cast() {
        let handle = SystemHandle::new(Box::new(English));
        let cast: CapabilityCast<dyn Greeter> = Arc::new(|sys: &mut dyn System| {
            sys.as_any_mut()
                .downcast_mut::<English>()
                .map(|s| s as &mut dyn Greeter)
        });
        let binding = BoundCapability::new(
            handle,
            CapabilityId::of::<English>(),
            Some(Arc::new(cast) as Arc<dyn Any + Send + Sync>),
        );

        let greeter = binding
            .typed::<dyn Greeter>()
            .expect("cast for dyn Greeter was registered");
        assert_eq!(greeter.try_with(|g| g.greet()), Some("hello"));
    }

    #[test]
    fn typed_access_without_a_cast_returns_none() {
        let binding = BoundCapability::new(
            SystemHandle::new(Box::new(English)),
            CapabilityId::of::<English>(),
            None,
        );
        assert!(binding.typed::<dyn Greeter>().is_none());
    }
}
