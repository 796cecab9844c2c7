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
//! # Danmaku Engine
//!
//! Movement kinematics for bullet-hell projectiles: phased trajectories in
//! three coordinate modes, per-domain time scaling and pooled entity storage.
//!
//! ## Features
//!
//! - **Three motion modes**: Cartesian, Cartesian-Polar (speed/angle) and
//!   Polar (radius/angle about a moving origin)
//! - **Phase tracks**: ordered movement phases gated by start/end time, with
//!   optional loop and velocity carry-over across mode switches
//! - **Time domains**: per-side time scale and pause with an unscaled clock
//!   for UI timers
//! - **Pooling**: prototype-keyed object pool with generational handles
//! - **Parallelization**: optional Rayon integration for the integration pass
//!
//! ## Example
//!
//! ```rust
//! use danmaku_engine::ecs::{ProjectileKind, PrototypeId, SpawnParams, World};
//! use danmaku_engine::math::Vec2;
//! use danmaku_engine::movement::{CartesianBuilder, CartesianPolarBuilder};
//!
//! let round = PrototypeId::new(1);
//! let mut world = World::new();
//! world.register_prototype(round, ProjectileKind::bullet(4.0));
//! world.warm(round, 64).unwrap();
//!
//! // Fly out at 120 px/s, then fall after one second
//! let phases = vec![
//!     CartesianPolarBuilder::new().speed(120.0).angle(270.0).build().unwrap(),
//!     CartesianBuilder::new()
//!         .acceleration(Vec2::new(0.0, -98.0))
//!         .start_time(1.0)
//!         .carry_prior_speed(true)
//!         .build()
//!         .unwrap(),
//! ];
//! let bullet = world.begin_entity(round, SpawnParams::new(Vec2::ZERO, phases)).unwrap();
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0).unwrap();
//! }
//! assert_eq!(world.track(bullet).unwrap().current_index(), 1);
//! ```

#![warn(missing_docs)]

/// Entity storage, projectile records and the simulation context
pub mod ecs;

/// Error types
pub mod error;

/// Kinematic integration, one step function per movement mode
pub mod integration;

/// Coordinate math
pub mod math;

/// Movement specifications and their builders
pub mod movement;

/// Object pooling for reducing allocation churn
pub mod pool;

/// Per-entity phase sequencing
pub mod sequencer;

/// Time domains
pub mod time;

pub use ecs::{Entity, World};
pub use error::{DanmakuError, Result};
