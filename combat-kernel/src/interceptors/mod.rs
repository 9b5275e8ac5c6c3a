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
//! Pluggable pipeline hooks
//!
//! Gameplay features such as shields hook into the frame pipeline without
//! the kernel knowing their concrete types. Five fixed points are exposed:
//!
//! | Capability | Runs |
//! |------------|------|
//! | `StatBeforeApplication` | before queued stat changes are applied |
//! | `StatAfterApplication` | after stat changes are applied |
//! | `ResourceBeforeResist` | after fractional changes are flattened |
//! | `ResourceBeforeApplication` | after resistances, before pools change |
//! | `ResourceAfterApplication` | after pools change, before deaths |
//!
//! Interceptors are registered explicitly with an [`InterceptorRegistry`];
//! each declares the capabilities it implements and all interceptors at a
//! point run in registration order.

pub mod api;
pub mod registry;

mod damage_taken;
mod shield;

pub use api::{
    Capability, Interceptor, InterceptorContext, InterceptorPayload, PayloadStore,
    INTERCEPTOR_API_VERSION,
};
pub use damage_taken::DamageTakenInterceptor;
pub use registry::InterceptorRegistry;
pub use shield::ShieldAbsorbInterceptor;
