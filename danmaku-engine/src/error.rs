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
//! Error types for the danmaku engine
//!
//! Errors fall into two groups. Configuration errors (invalid specs, double
//! warm-up, re-initialization) are programmer mistakes and should fail fast in
//! tests. Usage errors (double return, stale handles) turn the offending call
//! into a no-op. In both cases the engine state is left unchanged.

use thiserror::Error;

use crate::ecs::{Entity, PrototypeId};
use crate::time::TimeDomainId;

/// The main error type for engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DanmakuError {
    /// A movement builder rejected its parameters
    #[error("Invalid movement spec: {0}")]
    InvalidMovementSpec(String),

    /// An entity was started with no movement phases
    #[error("Movement track must contain at least one phase")]
    EmptyTrack,

    /// `warm` was called twice for the same prototype
    #[error("Pool for {0} has already been warmed")]
    PoolAlreadyWarmed(PrototypeId),

    /// The prototype was never registered with the pool
    #[error("Unknown prototype: {0}")]
    UnknownPrototype(PrototypeId),

    /// The handle does not point at a slot the pool ever handed out
    #[error("Handle {0} does not belong to this pool")]
    UnknownHandle(Entity),

    /// The instance was returned while already inactive
    #[error("{0} is already inactive")]
    AlreadyInactive(Entity),

    /// The handle refers to an earlier occupant of a recycled slot
    #[error("{0} is stale; the slot has been reused")]
    StaleHandle(Entity),

    /// An entity was initialized twice without being returned in between
    #[error("{0} has already been initialized")]
    AlreadyInitialized(Entity),

    /// An operation needed a movement track that was never started
    #[error("{0} has no movement track")]
    NotInitialized(Entity),

    /// A forced phase change named a phase the track does not have
    #[error("Phase index {index} out of range for a track of {len} phases")]
    PhaseOutOfRange {
        /// Requested phase index
        index: usize,
        /// Number of phases in the track
        len: usize,
    },

    /// The time domain id was not created by this registry
    #[error("Unknown time domain: {0}")]
    UnknownTimeDomain(TimeDomainId),

    /// Time scales must be finite and non-negative
    #[error("Invalid time scale: {0}. Must be non-negative and finite.")]
    InvalidTimeScale(f64),

    /// The unscaled domain cannot be paused or rescaled
    #[error("The unscaled time domain cannot be modified")]
    ImmutableTimeDomain,

    /// Raw delta-times must be finite and non-negative
    #[error("Invalid delta time: {0}. Must be non-negative and finite.")]
    InvalidDelta(f64),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, DanmakuError>;

/// Validate a raw delta-time supplied by the host scheduler
pub(crate) fn validate_delta(dt: f64) -> Result<()> {
    if dt < 0.0 || !dt.is_finite() {
        return Err(DanmakuError::InvalidDelta(dt));
    }
    Ok(())
}
