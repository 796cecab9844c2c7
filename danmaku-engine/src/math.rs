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
//! Coordinate math
//!
//! Pure conversions between Cartesian and polar representations. Angles are
//! in degrees, 0° points along +x and counter-clockwise is positive. Every
//! angle produced here is normalized to `[0, 360)`.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Magnitudes below this are treated as zero when deriving a direction
pub const MAGNITUDE_EPSILON: f64 = 1e-9;

/// 2D vector with double-precision components
///
/// # Examples
///
/// ```
/// use danmaku_engine::math::Vec2;
///
/// let v = Vec2::new(3.0, 4.0);
/// assert_eq!(v.magnitude(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Vec2 {
    /// The zero vector
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Create a new vector
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Euclidean length
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product
    pub fn dot(&self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Check if both components are finite (not NaN or infinite)
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Rescale to the given magnitude, keeping direction
    ///
    /// A near-zero vector has no direction and is returned unchanged.
    pub fn with_magnitude(self, magnitude: f64) -> Vec2 {
        let current = self.magnitude();
        if current < MAGNITUDE_EPSILON {
            return self;
        }
        self * (magnitude / current)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Polar coordinate relative to some origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polar {
    /// Distance from the origin
    pub radius: f64,
    /// Angle in degrees, `[0, 360)`
    pub angle: f64,
}

impl Polar {
    /// Create a polar coordinate, normalizing the angle
    pub fn new(radius: f64, angle: f64) -> Self {
        Polar { radius, angle: normalize_angle(angle) }
    }

    /// Cartesian offset from the origin
    pub fn to_cartesian(&self) -> Vec2 {
        polar_to_cartesian(self.radius, self.angle)
    }

    /// Polar view of a Cartesian offset
    pub fn from_cartesian(offset: Vec2) -> Self {
        let (radius, angle) = cartesian_to_polar(offset.x, offset.y);
        Polar { radius, angle }
    }
}

/// Reduce an angle in degrees to `[0, 360)`
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit vector pointing along `angle_degrees`
pub fn direction(angle_degrees: f64) -> Vec2 {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Vec2::new(cos, sin)
}

/// Project a polar coordinate onto the Cartesian plane
pub fn polar_to_cartesian(radius: f64, angle_degrees: f64) -> Vec2 {
    direction(angle_degrees) * radius
}

/// Convert a Cartesian vector to `(magnitude, angle_degrees)`
///
/// Returns an angle of 0 when the magnitude is below [`MAGNITUDE_EPSILON`].
pub fn cartesian_to_polar(x: f64, y: f64) -> (f64, f64) {
    let magnitude = x.hypot(y);
    if magnitude < MAGNITUDE_EPSILON {
        return (magnitude, 0.0);
    }
    (magnitude, normalize_angle(y.atan2(x).to_degrees()))
}

/// Direction of a vector in degrees, or `None` if it is effectively zero
pub fn heading_of(v: Vec2) -> Option<f64> {
    if v.magnitude() < MAGNITUDE_EPSILON {
        None
    } else {
        Some(normalize_angle(v.y.atan2(v.x).to_degrees()))
    }
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]`
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_angle(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}
