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
//! Polar step (radius and angle about an origin)
//!
//! Radius and angle are primary state here, read from and written back to the
//! entity's cached [`Polar`] coordinate:
//!
//! ```text
//! r(t + dt) = r(t) + ṙ(t)*dt
//! θ(t + dt) = normalize(θ(t) + θ̇(t)*dt)
//! d = P(r(t + dt), θ(t + dt)) - P(r(t), θ(t))
//! ṙ(t + dt) = clamp(ṙ(t) + r̈*dt)
//! θ̇(t + dt) = clamp(θ̇(t) + θ̈*dt)
//! ```
//!
//! where `P` projects a polar coordinate onto the plane. The radius may go
//! negative, which mirrors the projection through the origin.

use crate::math::{Polar, Vec2};
use crate::movement::PolarMotion;

/// Advance radius/angle by `dt`, accelerate their speeds, and return the displacement
pub fn step(
    motion: &PolarMotion,
    radial_speed: &mut f64,
    angular_speed: &mut f64,
    polar: &mut Polar,
    dt: f64,
) -> Vec2 {
    let before = polar.to_cartesian();
    *polar = Polar::new(
        polar.radius + *radial_speed * dt,
        polar.angle + *angular_speed * dt,
    );
    let displacement = polar.to_cartesian() - before;

    *radial_speed += motion.radial_acceleration * dt;
    if let Some(bounds) = &motion.radial_clamp {
        *radial_speed = bounds.clamp(*radial_speed);
    }
    *angular_speed += motion.angular_acceleration * dt;
    if let Some(bounds) = &motion.angular_clamp {
        *angular_speed = bounds.clamp(*angular_speed);
    }

    displacement
}
