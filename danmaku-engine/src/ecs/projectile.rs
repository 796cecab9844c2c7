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
//! Pooled projectile records
//!
//! A [`Projectile`] is the per-entity record stored in the pool arena: its
//! kind, its transform, and the [`PhaseTrack`] driving it. The kinematic core
//! never looks at the kind; only trail recording and homing do.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::ecs::Entity;
use crate::error::{DanmakuError, Result};
use crate::math::{normalize_angle, Vec2};
use crate::movement::MovementSpec;
use crate::pool::Recyclable;
use crate::sequencer::{PhaseChange, PhaseTrack};
use crate::time::{TimeDomainId, TimeDomains};

/// Behavior variant of a projectile
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileKind {
    /// Plain round bullet
    Bullet {
        /// Collision radius
        radius: f64,
    },
    /// Bullet that turns toward a target entity
    HomingBullet {
        /// Collision radius
        radius: f64,
        /// Maximum turn in degrees per second of scaled time
        turn_rate: f64,
        /// Entity to steer toward
        target: Option<Entity>,
    },
    /// Rigid laser segment anchored at the projectile position
    StraightLaser {
        /// Segment length along the heading
        length: f64,
        /// Beam width
        width: f64,
    },
    /// Laser whose body follows the path its head has travelled
    CurveLaser {
        /// Beam width
        width: f64,
        /// Recorded head positions, oldest first
        trail: VecDeque<Vec2>,
        /// Number of points kept in the trail
        max_points: usize,
    },
}

impl ProjectileKind {
    /// Plain bullet
    pub fn bullet(radius: f64) -> Self {
        ProjectileKind::Bullet { radius }
    }

    /// Homing bullet with no target yet
    pub fn homing(radius: f64, turn_rate: f64) -> Self {
        ProjectileKind::HomingBullet {
            radius,
            turn_rate,
            target: None,
        }
    }

    /// Straight laser
    pub fn straight_laser(length: f64, width: f64) -> Self {
        ProjectileKind::StraightLaser { length, width }
    }

    /// Curve laser keeping up to `max_points` trail points
    pub fn curve_laser(width: f64, max_points: usize) -> Self {
        ProjectileKind::CurveLaser {
            width,
            trail: VecDeque::with_capacity(max_points),
            max_points,
        }
    }

    fn record(&mut self, position: Vec2) {
        if let ProjectileKind::CurveLaser { trail, max_points, .. } = self {
            if *max_points == 0 {
                return;
            }
            while trail.len() >= *max_points {
                trail.pop_front();
            }
            trail.push_back(position);
        }
    }
}

/// Parameters for starting a projectile's movement
///
/// Only the position and the phase list are required; everything else has a
/// default (origin at the spawn point, heading 0, player time domain, no
/// owner, no loop).
#[derive(Debug, Clone)]
pub struct SpawnParams {
    /// Initial position
    pub position: Vec2,
    /// Origin for Polar phases
    pub origin: Vec2,
    /// Initial heading in degrees
    pub heading: f64,
    /// Ordered phase list
    pub phases: Arc<[MovementSpec]>,
    /// Entity whose position becomes the origin every tick
    pub owner: Option<Entity>,
    /// Whether the origin tracks `owner`
    pub origin_follows_owner: bool,
    /// Whether the track wraps after its last phase ends
    pub looping: bool,
    /// Time domain that scales this projectile's deltas
    pub domain: TimeDomainId,
    /// Initial homing target (ignored for other kinds)
    pub target: Option<Entity>,
}

impl SpawnParams {
    /// Spawn at `position` running `phases`
    pub fn new(position: Vec2, phases: impl Into<Arc<[MovementSpec]>>) -> Self {
        SpawnParams {
            position,
            origin: position,
            heading: 0.0,
            phases: phases.into(),
            owner: None,
            origin_follows_owner: false,
            looping: false,
            domain: TimeDomainId::PLAYER,
            target: None,
        }
    }

    /// Set the Polar origin
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Set the initial heading
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    /// Attach to an owner; the origin follows it when `follow` is true
    pub fn with_owner(mut self, owner: Entity, follow: bool) -> Self {
        self.owner = Some(owner);
        self.origin_follows_owner = follow;
        self
    }

    /// Enable or disable looping
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Run in a specific time domain
    pub fn with_domain(mut self, domain: TimeDomainId) -> Self {
        self.domain = domain;
        self
    }

    /// Set the homing target
    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }
}

/// Per-entity record stored in the projectile pool
#[derive(Debug, Clone)]
pub struct Projectile {
    kind: ProjectileKind,
    position: Vec2,
    heading: f64,
    track: Option<PhaseTrack>,
    domain: TimeDomainId,
    owner: Option<Entity>,
    origin_follows_owner: bool,
    last_delta: f64,
}

impl Projectile {
    /// Create an idle projectile of the given kind
    pub fn new(kind: ProjectileKind) -> Self {
        Projectile {
            kind,
            position: Vec2::ZERO,
            heading: 0.0,
            track: None,
            domain: TimeDomainId::PLAYER,
            owner: None,
            origin_follows_owner: false,
            last_delta: 0.0,
        }
    }

    /// Behavior variant
    pub fn kind(&self) -> &ProjectileKind {
        &self.kind
    }

    /// Current position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current heading in degrees
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Phase track, if movement has begun
    pub fn track(&self) -> Option<&PhaseTrack> {
        self.track.as_ref()
    }

    /// Time domain scaling this projectile
    pub fn domain(&self) -> TimeDomainId {
        self.domain
    }

    /// Owning entity, if any
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    /// Whether the origin tracks the owner
    pub fn origin_follows_owner(&self) -> bool {
        self.origin_follows_owner
    }

    /// Scaled delta integrated on the last tick
    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    /// Whether movement has begun
    pub fn is_initialized(&self) -> bool {
        self.track.is_some()
    }

    /// Start moving along `params.phases`
    ///
    /// `handle` is only used for error reporting.
    pub(crate) fn begin(&mut self, handle: Entity, params: SpawnParams) -> Result<()> {
        if self.track.is_some() {
            log::warn!("{} has already begun moving", handle);
            return Err(DanmakuError::AlreadyInitialized(handle));
        }
        if !params.position.is_valid() || !params.origin.is_valid() || !params.heading.is_finite() {
            return Err(DanmakuError::InvalidMovementSpec(format!(
                "non-finite spawn transform for {}",
                handle
            )));
        }

        let track = PhaseTrack::new(params.phases, params.origin, params.position, params.looping)?;
        self.track = Some(track);
        self.position = params.position;
        self.heading = normalize_angle(params.heading);
        self.domain = params.domain;
        self.owner = params.owner;
        self.origin_follows_owner = params.owner.is_some() && params.origin_follows_owner;
        self.last_delta = 0.0;
        if let ProjectileKind::HomingBullet { target, .. } = &mut self.kind {
            *target = params.target;
        }
        self.kind.record(self.position);
        Ok(())
    }

    /// Integration pass: scale `raw_delta` by the time domain and move
    ///
    /// Returns the displacement. Uninitialized projectiles do not move.
    pub(crate) fn integrate(&mut self, domains: &TimeDomains, raw_delta: f64) -> Result<Vec2> {
        let Some(track) = self.track.as_mut() else {
            return Ok(Vec2::ZERO);
        };
        let dt = domains.scaled_delta(self.domain, raw_delta)?;
        self.last_delta = dt;
        let displacement = track.advance(dt, &mut self.position, &mut self.heading);
        self.kind.record(self.position);
        Ok(displacement)
    }

    /// Transition pass
    pub(crate) fn evaluate_transition(&mut self) -> Option<PhaseChange> {
        self.track.as_mut().and_then(PhaseTrack::evaluate_transition)
    }

    pub(crate) fn force_phase(&mut self, handle: Entity, index: usize) -> Result<PhaseChange> {
        let track = self.track.as_mut().ok_or(DanmakuError::NotInitialized(handle))?;
        track.force_phase(index)
    }

    /// Move the origin; Polar phases are carried along with it
    pub(crate) fn set_origin(&mut self, origin: Vec2) {
        if let Some(track) = self.track.as_mut() {
            let shift = track.set_origin(origin, self.position);
            self.position += shift;
        }
    }

    pub(crate) fn set_domain(&mut self, domain: TimeDomainId) {
        self.domain = domain;
    }

    /// Live homing target and turn budget for the last tick, if any
    pub(crate) fn homing(&self) -> Option<(Entity, f64)> {
        match &self.kind {
            ProjectileKind::HomingBullet {
                turn_rate,
                target: Some(target),
                ..
            } => Some((*target, turn_rate * self.last_delta)),
            _ => None,
        }
    }

    pub(crate) fn steer_towards(&mut self, target_angle: f64, max_turn: f64) -> bool {
        self.track
            .as_mut()
            .map_or(false, |track| track.steer_towards(target_angle, max_turn))
    }

    /// Change the homing target (no effect on other kinds)
    pub(crate) fn set_target(&mut self, new_target: Option<Entity>) -> bool {
        match &mut self.kind {
            ProjectileKind::HomingBullet { target, .. } => {
                *target = new_target;
                true
            }
            _ => false,
        }
    }
}

impl Recyclable for Projectile {
    fn recycle(&mut self) {
        self.track = None;
        self.owner = None;
        self.origin_follows_owner = false;
        self.last_delta = 0.0;
        match &mut self.kind {
            ProjectileKind::HomingBullet { target, .. } => *target = None,
            ProjectileKind::CurveLaser { trail, .. } => trail.clear(),
            _ => {}
        }
    }
}
