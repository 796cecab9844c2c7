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
//! Movement phase descriptions
//!
//! A [`MovementSpec`] describes one phase of motion: which coordinate mode
//! drives it, the initial kinematic values and accelerations, optional clamps,
//! how the heading behaves, and when the phase starts and stops. Specs are
//! immutable once built and are shared between every entity that follows the
//! same pattern. Evolving per-entity values live in
//! [`KinematicState`](crate::integration::KinematicState) instead.
//!
//! # Coordinate modes
//!
//! - **Cartesian**: velocity and acceleration vectors
//! - **Cartesian-Polar**: speed along a heading angle, with tangential
//!   acceleration (changes speed) and normal acceleration (turns the angle)
//! - **Polar**: radius and angle about a per-entity origin, each with its own
//!   speed and acceleration

mod builder;

pub use builder::{CartesianBuilder, CartesianPolarBuilder, PolarBuilder};

use crate::math::Vec2;

/// Coordinate mode driving a movement phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementMode {
    /// Velocity/acceleration vectors
    Cartesian,
    /// Speed plus heading angle
    CartesianPolar,
    /// Radius plus angle about an origin
    Polar,
}

/// Inclusive `[min, max]` bounds for a scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl Bounds {
    /// Bounds that never clamp
    pub const UNBOUNDED: Bounds = Bounds {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    /// Create bounds; validity is checked by the builders
    pub const fn new(min: f64, max: f64) -> Self {
        Bounds { min, max }
    }

    /// Clamp `value` into the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Whether `value` lies inside the bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub(crate) fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub(crate) fn is_valid(&self) -> bool {
        !self.min.is_nan() && !self.max.is_nan()
    }
}

/// Clamp applied to Cartesian velocity
///
/// The magnitude is clamped first, then each axis independently. An axis bound
/// tighter than the magnitude bound can therefore leave the final velocity
/// below the magnitude minimum; that result is kept as is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianClamp {
    /// Bounds on the velocity magnitude
    pub magnitude: Bounds,
    /// Bounds on the x component
    pub x: Bounds,
    /// Bounds on the y component
    pub y: Bounds,
}

/// Parameters of a Cartesian phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianMotion {
    /// Velocity on entering the phase
    pub velocity: Vec2,
    /// Constant acceleration
    pub acceleration: Vec2,
    /// Velocity clamp, if clamping is enabled
    pub clamp: Option<CartesianClamp>,
}

/// Parameters of a Cartesian-Polar (speed + angle) phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianPolarMotion {
    /// Speed on entering the phase
    pub speed: f64,
    /// Travel angle in degrees on entering the phase
    pub angle: f64,
    /// Rate of change of speed
    pub tangential_acceleration: f64,
    /// Rate of change of the travel angle, degrees per second
    pub normal_acceleration: f64,
    /// Speed clamp, if clamping is enabled
    pub clamp: Option<Bounds>,
}

/// Parameters of a Polar (radius + angle) phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarMotion {
    /// Rate of change of the radius on entering the phase
    pub radial_speed: f64,
    /// Rate of change of the radial speed
    pub radial_acceleration: f64,
    /// Rate of change of the angle on entering the phase, degrees per second
    pub angular_speed: f64,
    /// Rate of change of the angular speed
    pub angular_acceleration: f64,
    /// Radial speed clamp, if clamping is enabled
    pub radial_clamp: Option<Bounds>,
    /// Angular speed clamp, if clamping is enabled
    pub angular_clamp: Option<Bounds>,
}

/// Mode-specific kinematic parameters; exactly one mode is active
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// See [`CartesianMotion`]
    Cartesian(CartesianMotion),
    /// See [`CartesianPolarMotion`]
    CartesianPolar(CartesianPolarMotion),
    /// See [`PolarMotion`]
    Polar(PolarMotion),
}

impl Motion {
    /// The coordinate mode of these parameters
    pub fn mode(&self) -> MovementMode {
        match self {
            Motion::Cartesian(_) => MovementMode::Cartesian,
            Motion::CartesianPolar(_) => MovementMode::CartesianPolar,
            Motion::Polar(_) => MovementMode::Polar,
        }
    }
}

/// How an entity's heading evolves during a phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingControl {
    /// Face along the direction of travel
    AlongVelocity,
    /// Spin independently of the direction of travel
    Rotating {
        /// Rotation rate on entering the phase, degrees per second
        rate: f64,
        /// Rate of change of the rotation rate
        acceleration: f64,
        /// Rotation rate clamp
        clamp: Option<Bounds>,
    },
}

/// Immutable description of one phase of motion
///
/// Built with [`CartesianBuilder`], [`CartesianPolarBuilder`] or
/// [`PolarBuilder`].
///
/// # Examples
///
/// ```
/// use danmaku_engine::movement::{CartesianPolarBuilder, MovementMode};
///
/// let spec = CartesianPolarBuilder::new()
///     .speed(120.0)
///     .angle(270.0)
///     .build()
///     .unwrap();
/// assert_eq!(spec.mode(), MovementMode::CartesianPolar);
/// assert_eq!(spec.start_time(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MovementSpec {
    motion: Motion,
    heading: HeadingControl,
    start_time: f64,
    end_time: Option<f64>,
    carry_prior_speed: bool,
}

impl MovementSpec {
    pub(crate) fn new(
        motion: Motion,
        heading: HeadingControl,
        start_time: f64,
        end_time: Option<f64>,
        carry_prior_speed: bool,
    ) -> Self {
        MovementSpec {
            motion,
            heading,
            start_time,
            end_time,
            carry_prior_speed,
        }
    }

    /// Coordinate mode of this phase
    pub fn mode(&self) -> MovementMode {
        self.motion.mode()
    }

    /// Mode-specific parameters
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Heading behaviour
    pub fn heading(&self) -> &HeadingControl {
        &self.heading
    }

    /// Track time at which this phase becomes eligible
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Track time after which this phase stops integrating
    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Whether this phase has an end time
    pub fn has_end_time(&self) -> bool {
        self.end_time.is_some()
    }

    /// Whether entering this phase inherits the previous phase's velocity
    pub fn carry_prior_speed(&self) -> bool {
        self.carry_prior_speed
    }

    /// Length of the overlap between `[from, to)` and this phase's active window
    pub(crate) fn active_overlap(&self, from: f64, to: f64) -> f64 {
        let lo = from.max(self.start_time);
        let hi = match self.end_time {
            Some(end) => to.min(end),
            None => to,
        };
        (hi - lo).max(0.0)
    }
}
