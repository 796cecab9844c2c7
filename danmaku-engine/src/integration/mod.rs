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
//! Kinematic integration for movement phases
//!
//! This module advances one entity by one tick under a [`MovementSpec`]. Each
//! coordinate mode has its own explicit Euler step:
//!
//! - **Cartesian**: `x += v*dt`, then `v += a*dt`, then clamp
//! - **Cartesian-Polar**: `x += s*(cos θ, sin θ)*dt`, then `s += a_t*dt`,
//!   `θ += a_n*dt`, then clamp speed
//! - **Polar**: `r += ṙ*dt`, `θ += θ̇*dt`, displacement is the difference of the
//!   Cartesian projections, then `ṙ` and `θ̇` accelerate and clamp
//!
//! Displacement always uses the velocity from the start of the tick. The spec
//! is never modified; everything that evolves lives in [`KinematicState`] and
//! in the entity's cached [`Polar`] coordinate.
//!
//! # Determinism
//!
//! The steps are pure functions of their inputs. The same spec, initial state
//! and sequence of deltas always produce bit-identical displacements.

use crate::math::{
    cartesian_to_polar, direction, heading_of, normalize_angle, Polar, Vec2, MAGNITUDE_EPSILON,
};
use crate::movement::{HeadingControl, Motion, MovementMode, MovementSpec};

mod cartesian;
mod cartesian_polar;
mod polar;

pub use cartesian::step as cartesian_step;
pub use cartesian_polar::step as cartesian_polar_step;
pub use polar::step as polar_step;

/// Mode-specific evolving values of one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    /// Current Cartesian velocity
    Cartesian {
        /// Velocity vector
        velocity: Vec2,
    },
    /// Current speed and travel angle
    CartesianPolar {
        /// Speed along the travel angle
        speed: f64,
        /// Travel angle in degrees
        angle: f64,
    },
    /// Current radial and angular speeds; radius and angle live in the
    /// entity's cached polar coordinate
    Polar {
        /// Rate of change of the radius
        radial_speed: f64,
        /// Rate of change of the angle, degrees per second
        angular_speed: f64,
    },
}

impl MotionState {
    /// Coordinate mode this state belongs to
    pub fn mode(&self) -> MovementMode {
        match self {
            MotionState::Cartesian { .. } => MovementMode::Cartesian,
            MotionState::CartesianPolar { .. } => MovementMode::CartesianPolar,
            MotionState::Polar { .. } => MovementMode::Polar,
        }
    }
}

/// Per-entity kinematic state, seeded from a spec when a phase begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    /// Translational state
    pub motion: MotionState,
    /// Independent rotation rate, degrees per second
    pub rotation_rate: f64,
}

impl KinematicState {
    /// Initial state of a phase from the spec's own values
    pub fn seed(spec: &MovementSpec) -> Self {
        let motion = match spec.motion() {
            Motion::Cartesian(m) => MotionState::Cartesian { velocity: m.velocity },
            Motion::CartesianPolar(m) => MotionState::CartesianPolar {
                speed: m.speed,
                angle: m.angle,
            },
            Motion::Polar(m) => MotionState::Polar {
                radial_speed: m.radial_speed,
                angular_speed: m.angular_speed,
            },
        };
        KinematicState {
            motion,
            rotation_rate: initial_rotation_rate(spec),
        }
    }

    /// Initial state of a phase that continues a previous velocity
    ///
    /// `velocity` is the Cartesian velocity the previous phase had when it
    /// ended. It is converted into the new phase's representation so that
    /// speed and direction are continuous across the switch. For Polar phases
    /// the conversion is relative to the cached polar coordinate; at the
    /// origin the radial direction is taken from the velocity itself and
    /// `polar.angle` is updated to match.
    pub fn carried(spec: &MovementSpec, velocity: Vec2, polar: &mut Polar) -> Self {
        let motion = match spec.motion() {
            Motion::Cartesian(_) => MotionState::Cartesian { velocity },
            Motion::CartesianPolar(m) => {
                let (speed, angle) = cartesian_to_polar(velocity.x, velocity.y);
                let angle = if speed < MAGNITUDE_EPSILON { m.angle } else { angle };
                MotionState::CartesianPolar { speed, angle }
            }
            Motion::Polar(m) => {
                if polar.radius.abs() < MAGNITUDE_EPSILON {
                    if let Some(angle) = heading_of(velocity) {
                        polar.angle = angle;
                    }
                    MotionState::Polar {
                        radial_speed: velocity.magnitude(),
                        angular_speed: m.angular_speed,
                    }
                } else {
                    let radial = direction(polar.angle);
                    let tangent = direction(polar.angle + 90.0);
                    MotionState::Polar {
                        radial_speed: velocity.dot(radial),
                        angular_speed: (velocity.dot(tangent) / polar.radius).to_degrees(),
                    }
                }
            }
        };
        KinematicState {
            motion,
            rotation_rate: initial_rotation_rate(spec),
        }
    }

    /// Instantaneous Cartesian velocity
    ///
    /// `polar` is the entity's cached polar coordinate; only Polar states
    /// read it.
    pub fn velocity(&self, polar: &Polar) -> Vec2 {
        match self.motion {
            MotionState::Cartesian { velocity } => velocity,
            MotionState::CartesianPolar { speed, angle } => direction(angle) * speed,
            MotionState::Polar {
                radial_speed,
                angular_speed,
            } => {
                direction(polar.angle) * radial_speed
                    + direction(polar.angle + 90.0)
                        * (polar.radius * angular_speed.to_radians())
            }
        }
    }
}

fn initial_rotation_rate(spec: &MovementSpec) -> f64 {
    match spec.heading() {
        HeadingControl::AlongVelocity => 0.0,
        HeadingControl::Rotating { rate, .. } => *rate,
    }
}

/// Advance one entity by `dt` seconds of its own time
///
/// Returns the displacement to apply to the entity's position. `heading` is
/// updated in place. A `state` whose mode does not match the spec is reseeded
/// from the spec before stepping.
pub fn integrate(
    spec: &MovementSpec,
    state: &mut KinematicState,
    polar: &mut Polar,
    heading: &mut f64,
    dt: f64,
) -> Vec2 {
    if state.motion.mode() != spec.mode() {
        log::warn!(
            "Kinematic state {:?} does not match {:?} phase; reseeding",
            state.motion.mode(),
            spec.mode()
        );
        *state = KinematicState::seed(spec);
    }

    let displacement = match (spec.motion(), &mut state.motion) {
        (Motion::Cartesian(m), MotionState::Cartesian { velocity }) => {
            cartesian::step(m, velocity, dt)
        }
        (Motion::CartesianPolar(m), MotionState::CartesianPolar { speed, angle }) => {
            cartesian_polar::step(m, speed, angle, dt)
        }
        (
            Motion::Polar(m),
            MotionState::Polar {
                radial_speed,
                angular_speed,
            },
        ) => polar::step(m, radial_speed, angular_speed, polar, dt),
        _ => Vec2::ZERO,
    };

    update_heading(spec.heading(), &mut state.rotation_rate, heading, displacement, dt);
    displacement
}

fn update_heading(
    control: &HeadingControl,
    rotation_rate: &mut f64,
    heading: &mut f64,
    displacement: Vec2,
    dt: f64,
) {
    match control {
        HeadingControl::AlongVelocity => {
            if let Some(angle) = heading_of(displacement) {
                *heading = angle;
            }
        }
        HeadingControl::Rotating {
            acceleration,
            clamp,
            ..
        } => {
            *heading = normalize_angle(*heading + *rotation_rate * dt);
            *rotation_rate += acceleration * dt;
            if let Some(bounds) = clamp {
                *rotation_rate = bounds.clamp(*rotation_rate);
            }
        }
    }
}
