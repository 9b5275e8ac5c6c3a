// Copyright 2025 John Brosnihan
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
//! Interceptor registry
//!
//! Interceptors are registered explicitly at startup. The registry checks
//! name uniqueness and API version compatibility, then records which
//! pipeline points each interceptor runs at. Interceptors at the same point
//! run in registration order.

use crate::ecs::EntityId;
use crate::error::{CombatError, CombatResult};
use crate::interceptors::api::{
    Capability, Interceptor, InterceptorContext, InterceptorPayload, INTERCEPTOR_API_VERSION,
};
use crate::interceptors::{DamageTakenInterceptor, ShieldAbsorbInterceptor};
use log::debug;
use semver::Version;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Registry of every interceptor and the capability lists built from it
pub struct InterceptorRegistry {
    interceptors: Vec<Box<dyn Interceptor>>,
    by_capability: [Vec<usize>; 5],
    by_type: HashMap<TypeId, usize>,
}

impl InterceptorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        InterceptorRegistry {
            interceptors: Vec::new(),
            by_capability: Default::default(),
            by_type: HashMap::new(),
        }
    }

    /// Registry with the built-in interceptors
    pub fn with_defaults() -> CombatResult<Self> {
        let mut registry = InterceptorRegistry::new();
        crate::register_interceptor!(
            registry,
            ShieldAbsorbInterceptor::new(),
            DamageTakenInterceptor::new()
        )?;
        Ok(registry)
    }

    /// Register an interceptor
    ///
    /// # Errors
    ///
    /// - [`CombatError::DuplicateInterceptor`] if the name or concrete type
    ///   is already registered
    /// - [`CombatError::IncompatibleVersion`] if the API version is not
    ///   compatible with [`INTERCEPTOR_API_VERSION`]
    /// - [`CombatError::NoCapabilities`] if no pipeline point is declared
    pub fn register(&mut self, interceptor: Box<dyn Interceptor>) -> CombatResult<()> {
        let name = interceptor.name().to_string();
        let type_id = interceptor.as_any().type_id();

        if self.by_type.contains_key(&type_id) || self.interceptors.iter().any(|i| i.name() == name)
        {
            return Err(CombatError::DuplicateInterceptor(name));
        }

        let api_version = interceptor.api_version();
        if !is_version_compatible(api_version, INTERCEPTOR_API_VERSION) {
            return Err(CombatError::IncompatibleVersion {
                name,
                required: api_version.to_string(),
                provided: INTERCEPTOR_API_VERSION.to_string(),
            });
        }

        if interceptor.capabilities().is_empty() {
            return Err(CombatError::NoCapabilities(name));
        }

        let index = self.interceptors.len();
        for cap in Capability::ALL {
            if interceptor.capabilities().contains(&cap) {
                self.by_capability[cap.index()].push(index);
            }
        }
        debug!(
            "Registered interceptor '{}' at {:?}",
            name,
            interceptor.capabilities()
        );
        self.by_type.insert(type_id, index);
        self.interceptors.push(interceptor);
        Ok(())
    }

    /// Run every interceptor declaring `capability`, in registration order
    pub fn run(&mut self, capability: Capability, context: &mut InterceptorContext<'_>) {
        for &index in &self.by_capability[capability.index()] {
            self.interceptors[index].update(capability, context);
        }
    }

    /// Names of the interceptors running at a pipeline point, in order
    pub fn names_for(&self, capability: Capability) -> Vec<&str> {
        self.by_capability[capability.index()]
            .iter()
            .map(|&i| self.interceptors[i].name())
            .collect()
    }

    /// Interceptor of a concrete type
    pub fn get<T: Interceptor + Any>(&self) -> Option<&T> {
        let index = *self.by_type.get(&TypeId::of::<T>())?;
        self.interceptors[index].as_any().downcast_ref::<T>()
    }

    /// Mutable interceptor of a concrete type
    pub fn get_mut<T: Interceptor + Any>(&mut self) -> Option<&mut T> {
        let index = *self.by_type.get(&TypeId::of::<T>())?;
        self.interceptors[index].as_any_mut().downcast_mut::<T>()
    }

    /// Interceptor by name
    pub fn get_by_name(&self, name: &str) -> Option<&dyn Interceptor> {
        self.interceptors
            .iter()
            .find(|i| i.name() == name)
            .map(|i| i.as_ref())
    }

    fn index_of<T: Interceptor + Any>(&self) -> CombatResult<usize> {
        self.by_type
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(CombatError::UnknownInterceptor(std::any::type_name::<T>()))
    }

    /// Attach a payload to an entity in the interceptor of type `T`
    pub fn add_to<T: Interceptor + Any>(
        &mut self,
        id: EntityId,
        payload: InterceptorPayload,
    ) -> CombatResult<()> {
        let index = self.index_of::<T>()?;
        self.interceptors[index].add(id, payload)
    }

    /// Drop the payloads of an entity from the interceptor of type `T`
    pub fn remove_from<T: Interceptor + Any>(&mut self, id: EntityId) -> CombatResult<usize> {
        let index = self.index_of::<T>()?;
        Ok(self.interceptors[index].remove(id))
    }

    /// Payloads of an entity in the interceptor of type `T`
    pub fn payloads<T: Interceptor + Any>(&self, id: EntityId) -> CombatResult<&[InterceptorPayload]> {
        let index = self.index_of::<T>()?;
        Ok(self.interceptors[index].payloads(id))
    }

    /// Drop the payloads of an entity from every interceptor
    pub fn remove_entity(&mut self, id: EntityId) -> usize {
        self.interceptors.iter_mut().map(|i| i.remove(id)).sum()
    }

    /// Number of registered interceptors
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether no interceptor is registered
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Default for InterceptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InterceptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorRegistry")
            .field(
                "interceptors",
                &self.interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Check if an interceptor API version is compatible with the kernel
///
/// - Major version must match
/// - For 0.x.y, minor versions must match
/// - Otherwise the interceptor minor must not exceed the kernel minor
fn is_version_compatible(interceptor_version: &str, kernel_version: &str) -> bool {
    let (Ok(wanted), Ok(offered)) = (
        Version::parse(interceptor_version),
        Version::parse(kernel_version),
    ) else {
        return false;
    };

    if wanted.major != offered.major {
        return false;
    }
    if wanted.major != 0 {
        wanted.minor <= offered.minor
    } else {
        wanted.minor == offered.minor
    }
}

/// Register one or more interceptors, stopping at the first error
///
/// Evaluates to `CombatResult<()>`.
///
/// # Example
///
/// ```
/// use combat_kernel::interceptors::{InterceptorRegistry, ShieldAbsorbInterceptor};
/// use combat_kernel::register_interceptor;
///
/// let mut registry = InterceptorRegistry::new();
/// register_interceptor!(registry, ShieldAbsorbInterceptor::new()).unwrap();
/// assert_eq!(registry.len(), 1);
/// ```
#[macro_export]
macro_rules! register_interceptor {
    ($registry:expr, $($interceptor:expr),+ $(,)?) => {{
        let mut result: $crate::error::CombatResult<()> = Ok(());
        $(
            if result.is_ok() {
                result = $registry.register(Box::new($interceptor));
            }
        )+
        result
    }};
}
