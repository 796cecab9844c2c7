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
//! Cartesian-Polar step (speed along a travel angle)
//!
//! ```text
//! d = s(t)*(cos θ(t), sin θ(t))*dt
//! s(t + dt) = clamp(s(t) + a_t*dt)
//! θ(t + dt) = normalize(θ(t) + a_n*dt)
//! ```
//!
//! The angle is never clamped.

use crate::math::{direction, normalize_angle, Vec2};
use crate::movement::CartesianPolarMotion;

/// Advance speed and angle by `dt` and return the displacement
pub fn step(motion: &CartesianPolarMotion, speed: &mut f64, angle: &mut f64, dt: f64) -> Vec2 {
    let displacement = direction(*angle) * (*speed * dt);

    *speed += motion.tangential_acceleration * dt;
    *angle = normalize_angle(*angle + motion.normal_acceleration * dt);
    if let Some(bounds) = &motion.clamp {
        *speed = bounds.clamp(*speed);
    }

    displacement
}
