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
//! Cartesian step
//!
//! ```text
//! d = v(t)*dt
//! v(t + dt) = clamp(v(t) + a*dt)
//! ```

use crate::math::Vec2;
use crate::movement::{CartesianClamp, CartesianMotion};

/// Advance a Cartesian velocity by `dt` and return the displacement
///
/// # Example
///
/// ```
/// use danmaku_engine::integration::cartesian_step;
/// use danmaku_engine::math::Vec2;
/// use danmaku_engine::movement::{CartesianBuilder, Motion};
///
/// let spec = CartesianBuilder::new()
///     .velocity(Vec2::new(2.0, 0.0))
///     .acceleration(Vec2::new(0.0, -10.0))
///     .build()
///     .unwrap();
/// let Motion::Cartesian(motion) = spec.motion() else { unreachable!() };
///
/// let mut velocity = motion.velocity;
/// let d = cartesian_step(motion, &mut velocity, 0.5);
/// assert_eq!(d, Vec2::new(1.0, 0.0));
/// assert_eq!(velocity, Vec2::new(2.0, -5.0));
/// ```
pub fn step(motion: &CartesianMotion, velocity: &mut Vec2, dt: f64) -> Vec2 {
    let displacement = *velocity * dt;

    *velocity += motion.acceleration * dt;
    if let Some(clamp) = &motion.clamp {
        *velocity = apply_clamp(clamp, *velocity);
    }

    displacement
}

// Magnitude first, then each axis. The axis pass may undo the magnitude pass.
fn apply_clamp(clamp: &CartesianClamp, velocity: Vec2) -> Vec2 {
    let magnitude = velocity.magnitude();
    let bounded = clamp.magnitude.clamp(magnitude);
    let velocity = if bounded != magnitude {
        velocity.with_magnitude(bounded)
    } else {
        velocity
    };

    Vec2::new(clamp.x.clamp(velocity.x), clamp.y.clamp(velocity.y))
}
