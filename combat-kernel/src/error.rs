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
//! Error types for setup and boundary operations
//!
//! Per-request problems inside a frame never surface here: a stale or
//! malformed request degrades to a no-op. These errors come from
//! registration, configuration and the few boundary calls that can reject
//! their input outright.

use crate::ecs::EntityId;
use thiserror::Error;

/// Errors returned by the combat kernel
#[derive(Debug, Error)]
pub enum CombatError {
    /// An interceptor with the same name is already registered
    #[error("interceptor '{0}' is already registered")]
    DuplicateInterceptor(String),

    /// The interceptor targets an API version this kernel cannot host
    #[error("interceptor '{name}' requires API version {required}, kernel provides {provided}")]
    IncompatibleVersion {
        /// Interceptor name
        name: String,
        /// Version the interceptor was built against
        required: String,
        /// Version offered by the kernel
        provided: String,
    },

    /// The interceptor declared no pipeline point to run at
    #[error("interceptor '{0}' declares no capabilities")]
    NoCapabilities(String),

    /// No interceptor of the requested type is registered
    #[error("no interceptor of type '{0}' is registered")]
    UnknownInterceptor(&'static str),

    /// The handle does not refer to a live entity
    #[error("{0} is not alive")]
    InvalidEntity(EntityId),

    /// An entity definition could not be compiled
    #[error("invalid entity template '{name}': {reason}")]
    InvalidTemplate {
        /// Definition name
        name: String,
        /// What was wrong with it
        reason: String,
    },

    /// A temporary stat change whose inverse does not exist
    #[error("temporary stat change cannot be reverted: {0}")]
    NonInvertible(String),

    /// A resource change over time with a non-positive or non-finite frequency
    #[error("invalid over-time frequency {0}; expected a positive finite rate")]
    InvalidFrequency(f32),

    /// A payload the interceptor does not accept
    #[error("interceptor '{interceptor}' rejected payload: {reason}")]
    RejectedPayload {
        /// Interceptor name
        interceptor: String,
        /// Why the payload was rejected
        reason: String,
    },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A manifest could not be parsed
    #[error("failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),

    /// A manifest could not be read
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type CombatResult<T> = Result<T, CombatError>;
