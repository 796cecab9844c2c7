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
//! Per-mode movement builders
//!
//! Builders accumulate parameters through chained `&mut self` setters and
//! validate them in `build()`. Building does not consume the builder, so a
//! pattern can tweak one field and rebuild to produce a fan of near-identical
//! specs:
//!
//! ```
//! use danmaku_engine::movement::CartesianPolarBuilder;
//!
//! let mut builder = CartesianPolarBuilder::new();
//! builder.speed(90.0).tangential_acceleration(-10.0);
//!
//! let fan: Vec<_> = (0..8)
//!     .map(|i| builder.angle(i as f64 * 45.0).build())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(fan.len(), 8);
//! ```

use crate::error::{DanmakuError, Result};
use crate::math::Vec2;
use crate::movement::{
    Bounds, CartesianClamp, CartesianMotion, CartesianPolarMotion, HeadingControl, Motion,
    MovementSpec, PolarMotion,
};

/// Settings shared by every mode: timing and heading
#[derive(Debug, Clone)]
struct PhaseSettings {
    start_time: f64,
    end_time: Option<f64>,
    carry_prior_speed: bool,
    face_velocity: bool,
    rotation_rate: Option<f64>,
    rotation_acceleration: Option<f64>,
    rotation_bounds: Option<Bounds>,
}

impl Default for PhaseSettings {
    fn default() -> Self {
        PhaseSettings {
            start_time: 0.0,
            end_time: None,
            carry_prior_speed: false,
            face_velocity: true,
            rotation_rate: None,
            rotation_acceleration: None,
            rotation_bounds: None,
        }
    }
}

impl PhaseSettings {
    fn heading(&self) -> Result<HeadingControl> {
        let rotation_set = self.rotation_rate.is_some()
            || self.rotation_acceleration.is_some()
            || self.rotation_bounds.is_some();

        if self.face_velocity {
            if rotation_set {
                return Err(invalid(
                    "rotation parameters are not applicable while facing along velocity",
                ));
            }
            return Ok(HeadingControl::AlongVelocity);
        }

        let rate = self.rotation_rate.unwrap_or(0.0);
        let acceleration = self.rotation_acceleration.unwrap_or(0.0);
        check_finite("rotation rate", rate)?;
        check_finite("rotation acceleration", acceleration)?;
        if let Some(bounds) = self.rotation_bounds {
            check_bounds("rotation rate", bounds)?;
        }

        Ok(HeadingControl::Rotating {
            rate,
            acceleration,
            clamp: self.rotation_bounds,
        })
    }

    fn finish(&self, motion: Motion) -> Result<MovementSpec> {
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(invalid(format!(
                "start time must be non-negative and finite, got {}",
                self.start_time
            )));
        }
        if let Some(end) = self.end_time {
            if end.is_nan() || end <= self.start_time {
                return Err(invalid(format!(
                    "end time {} must be greater than start time {}",
                    end, self.start_time
                )));
            }
        }
        let heading = self.heading()?;
        Ok(MovementSpec::new(
            motion,
            heading,
            self.start_time,
            self.end_time,
            self.carry_prior_speed,
        ))
    }
}

fn invalid(message: impl Into<String>) -> DanmakuError {
    DanmakuError::InvalidMovementSpec(message.into())
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{} must be finite, got {}", field, value)))
    }
}

fn check_vec(field: &str, value: Vec2) -> Result<()> {
    if value.is_valid() {
        Ok(())
    } else {
        Err(invalid(format!("{} must be finite, got {:?}", field, value)))
    }
}

fn check_bounds(field: &str, bounds: Bounds) -> Result<()> {
    if !bounds.is_valid() {
        return Err(invalid(format!("{} bounds must not be NaN", field)));
    }
    if bounds.is_inverted() {
        return Err(invalid(format!(
            "{} bounds are inverted: min {} > max {}",
            field, bounds.min, bounds.max
        )));
    }
    Ok(())
}

// Timing and heading setters are identical for every builder.
macro_rules! phase_setters {
    () => {
        /// Track time at which the phase becomes eligible
        pub fn start_time(&mut self, seconds: f64) -> &mut Self {
            self.settings.start_time = seconds;
            self
        }

        /// Track time after which the phase stops integrating
        pub fn end_time(&mut self, seconds: f64) -> &mut Self {
            self.settings.end_time = Some(seconds);
            self
        }

        /// Remove a previously set end time
        pub fn clear_end_time(&mut self) -> &mut Self {
            self.settings.end_time = None;
            self
        }

        /// Inherit the previous phase's velocity when this phase is entered
        pub fn carry_prior_speed(&mut self, carry: bool) -> &mut Self {
            self.settings.carry_prior_speed = carry;
            self
        }

        /// Face along the direction of travel (the default)
        pub fn face_velocity(&mut self, face: bool) -> &mut Self {
            self.settings.face_velocity = face;
            self
        }

        /// Independent rotation rate in degrees per second
        pub fn rotation_rate(&mut self, degrees_per_second: f64) -> &mut Self {
            self.settings.rotation_rate = Some(degrees_per_second);
            self
        }

        /// Rate of change of the rotation rate
        pub fn rotation_acceleration(&mut self, degrees_per_second_sq: f64) -> &mut Self {
            self.settings.rotation_acceleration = Some(degrees_per_second_sq);
            self
        }

        /// Clamp the rotation rate
        pub fn rotation_bounds(&mut self, min: f64, max: f64) -> &mut Self {
            self.settings.rotation_bounds = Some(Bounds::new(min, max));
            self
        }
    };
}

/// Builder for Cartesian (velocity + acceleration) phases
#[derive(Debug, Clone)]
pub struct CartesianBuilder {
    settings: PhaseSettings,
    velocity: Vec2,
    acceleration: Vec2,
    clamp: bool,
    magnitude_bounds: Bounds,
    min_velocity: Vec2,
    max_velocity: Vec2,
}

impl CartesianBuilder {
    /// Create a builder for a phase at rest with no acceleration
    pub fn new() -> Self {
        CartesianBuilder {
            settings: PhaseSettings::default(),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            clamp: false,
            magnitude_bounds: Bounds::new(0.0, f64::INFINITY),
            min_velocity: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            max_velocity: Vec2::new(f64::INFINITY, f64::INFINITY),
        }
    }

    phase_setters!();

    /// Velocity on entering the phase
    pub fn velocity(&mut self, velocity: Vec2) -> &mut Self {
        self.velocity = velocity;
        self
    }

    /// Constant acceleration
    pub fn acceleration(&mut self, acceleration: Vec2) -> &mut Self {
        self.acceleration = acceleration;
        self
    }

    /// Enable or disable clamping
    pub fn clamp(&mut self, enabled: bool) -> &mut Self {
        self.clamp = enabled;
        self
    }

    /// Bounds on the velocity magnitude
    pub fn magnitude_bounds(&mut self, min: f64, max: f64) -> &mut Self {
        self.magnitude_bounds = Bounds::new(min, max);
        self
    }

    /// Per-axis velocity bounds
    pub fn velocity_bounds(&mut self, min: Vec2, max: Vec2) -> &mut Self {
        self.min_velocity = min;
        self.max_velocity = max;
        self
    }

    /// Validate and produce an immutable spec
    pub fn build(&self) -> Result<MovementSpec> {
        check_vec("velocity", self.velocity)?;
        check_vec("acceleration", self.acceleration)?;

        let clamp = if self.clamp {
            let clamp = CartesianClamp {
                magnitude: self.magnitude_bounds,
                x: Bounds::new(self.min_velocity.x, self.max_velocity.x),
                y: Bounds::new(self.min_velocity.y, self.max_velocity.y),
            };
            check_bounds("magnitude", clamp.magnitude)?;
            check_bounds("x velocity", clamp.x)?;
            check_bounds("y velocity", clamp.y)?;
            Some(clamp)
        } else {
            None
        };

        self.settings.finish(Motion::Cartesian(CartesianMotion {
            velocity: self.velocity,
            acceleration: self.acceleration,
            clamp,
        }))
    }
}

impl Default for CartesianBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for Cartesian-Polar (speed + angle) phases
#[derive(Debug, Clone)]
pub struct CartesianPolarBuilder {
    settings: PhaseSettings,
    speed: f64,
    angle: f64,
    tangential_acceleration: f64,
    normal_acceleration: f64,
    clamp: bool,
    speed_bounds: Bounds,
}

impl CartesianPolarBuilder {
    /// Create a builder for a phase at rest heading along +x
    pub fn new() -> Self {
        CartesianPolarBuilder {
            settings: PhaseSettings::default(),
            speed: 0.0,
            angle: 0.0,
            tangential_acceleration: 0.0,
            normal_acceleration: 0.0,
            clamp: false,
            speed_bounds: Bounds::UNBOUNDED,
        }
    }

    phase_setters!();

    /// Speed on entering the phase
    pub fn speed(&mut self, speed: f64) -> &mut Self {
        self.speed = speed;
        self
    }

    /// Travel angle in degrees on entering the phase
    pub fn angle(&mut self, degrees: f64) -> &mut Self {
        self.angle = degrees;
        self
    }

    /// Rate of change of speed
    pub fn tangential_acceleration(&mut self, acceleration: f64) -> &mut Self {
        self.tangential_acceleration = acceleration;
        self
    }

    /// Rate of change of the travel angle, degrees per second
    pub fn normal_acceleration(&mut self, degrees_per_second: f64) -> &mut Self {
        self.normal_acceleration = degrees_per_second;
        self
    }

    /// Enable or disable clamping
    pub fn clamp(&mut self, enabled: bool) -> &mut Self {
        self.clamp = enabled;
        self
    }

    /// Bounds on speed
    pub fn speed_bounds(&mut self, min: f64, max: f64) -> &mut Self {
        self.speed_bounds = Bounds::new(min, max);
        self
    }

    /// Validate and produce an immutable spec
    pub fn build(&self) -> Result<MovementSpec> {
        check_finite("speed", self.speed)?;
        check_finite("angle", self.angle)?;
        check_finite("tangential acceleration", self.tangential_acceleration)?;
        check_finite("normal acceleration", self.normal_acceleration)?;

        let clamp = if self.clamp {
            check_bounds("speed", self.speed_bounds)?;
            Some(self.speed_bounds)
        } else {
            None
        };

        self.settings.finish(Motion::CartesianPolar(CartesianPolarMotion {
            speed: self.speed,
            angle: crate::math::normalize_angle(self.angle),
            tangential_acceleration: self.tangential_acceleration,
            normal_acceleration: self.normal_acceleration,
            clamp,
        }))
    }
}

impl Default for CartesianPolarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for Polar (radius + angle about an origin) phases
#[derive(Debug, Clone)]
pub struct PolarBuilder {
    settings: PhaseSettings,
    radial_speed: f64,
    radial_acceleration: f64,
    angular_speed: f64,
    angular_acceleration: f64,
    clamp: bool,
    radial_bounds: Option<Bounds>,
    angular_bounds: Option<Bounds>,
}

impl PolarBuilder {
    /// Create a builder for a phase that holds its radius and angle
    pub fn new() -> Self {
        PolarBuilder {
            settings: PhaseSettings::default(),
            radial_speed: 0.0,
            radial_acceleration: 0.0,
            angular_speed: 0.0,
            angular_acceleration: 0.0,
            clamp: false,
            radial_bounds: None,
            angular_bounds: None,
        }
    }

    phase_setters!();

    /// Rate of change of the radius on entering the phase
    pub fn radial_speed(&mut self, speed: f64) -> &mut Self {
        self.radial_speed = speed;
        self
    }

    /// Rate of change of the radial speed
    pub fn radial_acceleration(&mut self, acceleration: f64) -> &mut Self {
        self.radial_acceleration = acceleration;
        self
    }

    /// Rate of change of the angle, degrees per second
    pub fn angular_speed(&mut self, degrees_per_second: f64) -> &mut Self {
        self.angular_speed = degrees_per_second;
        self
    }

    /// Rate of change of the angular speed
    pub fn angular_acceleration(&mut self, degrees_per_second_sq: f64) -> &mut Self {
        self.angular_acceleration = degrees_per_second_sq;
        self
    }

    /// Enable or disable clamping
    pub fn clamp(&mut self, enabled: bool) -> &mut Self {
        self.clamp = enabled;
        self
    }

    /// Bounds on the radial speed
    pub fn radial_speed_bounds(&mut self, min: f64, max: f64) -> &mut Self {
        self.radial_bounds = Some(Bounds::new(min, max));
        self
    }

    /// Bounds on the angular speed
    pub fn angular_speed_bounds(&mut self, min: f64, max: f64) -> &mut Self {
        self.angular_bounds = Some(Bounds::new(min, max));
        self
    }

    /// Validate and produce an immutable spec
    pub fn build(&self) -> Result<MovementSpec> {
        check_finite("radial speed", self.radial_speed)?;
        check_finite("radial acceleration", self.radial_acceleration)?;
        check_finite("angular speed", self.angular_speed)?;
        check_finite("angular acceleration", self.angular_acceleration)?;

        let (radial_clamp, angular_clamp) = if self.clamp {
            if let Some(bounds) = self.radial_bounds {
                check_bounds("radial speed", bounds)?;
            }
            if let Some(bounds) = self.angular_bounds {
                check_bounds("angular speed", bounds)?;
            }
            (self.radial_bounds, self.angular_bounds)
        } else {
            (None, None)
        };

        self.settings.finish(Motion::Polar(PolarMotion {
            radial_speed: self.radial_speed,
            radial_acceleration: self.radial_acceleration,
            angular_speed: self.angular_speed,
            angular_acceleration: self.angular_acceleration,
            radial_clamp,
            angular_clamp,
        }))
    }
}

impl Default for PolarBuilder {
    fn default() -> Self {
        Self::new()
    }
}
