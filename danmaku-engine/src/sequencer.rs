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
//! Phase sequencing
//!
//! A [`PhaseTrack`] is the per-entity state machine that walks an ordered list
//! of [`MovementSpec`]s. It owns the track clock, the active phase index, the
//! evolving [`KinematicState`] and a cached polar view of the entity relative
//! to its origin.
//!
//! # Track clock
//!
//! `elapsed` counts scaled seconds since the track began (or last looped).
//! Both `start_time` and `end_time` of every phase are measured on it. A phase
//! only integrates over the part of a tick that falls inside
//! `[start_time, end_time)`.
//!
//! # Transitions
//!
//! After integration, [`PhaseTrack::evaluate_transition`] jumps to the *latest*
//! phase whose start time has been reached, so one long tick can skip
//! intermediate phases. When the last phase of a looping track passes its end
//! time the track wraps to phase 0 and the clock restarts.

use std::sync::Arc;

use crate::error::{DanmakuError, Result};
use crate::integration::{self, KinematicState, MotionState};
use crate::math::{angle_delta, heading_of, normalize_angle, Polar, Vec2};
use crate::movement::{MovementMode, MovementSpec};

/// Record of a phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    /// Phase left
    pub from: usize,
    /// Phase entered
    pub to: usize,
    /// Whether the change was a loop back to phase 0
    pub wrapped: bool,
}

/// Per-entity trajectory plan and its progress
#[derive(Debug, Clone)]
pub struct PhaseTrack {
    phases: Arc<[MovementSpec]>,
    current: usize,
    elapsed: f64,
    phase_elapsed: f64,
    looping: bool,
    origin: Vec2,
    polar: Polar,
    state: KinematicState,
}

impl PhaseTrack {
    /// Start a track at `position`, orbiting `origin` where Polar phases apply
    ///
    /// Returns [`DanmakuError::EmptyTrack`] if `phases` is empty.
    pub fn new(
        phases: impl Into<Arc<[MovementSpec]>>,
        origin: Vec2,
        position: Vec2,
        looping: bool,
    ) -> Result<Self> {
        let phases: Arc<[MovementSpec]> = phases.into();
        let first = phases.first().ok_or(DanmakuError::EmptyTrack)?;
        let state = KinematicState::seed(first);

        Ok(PhaseTrack {
            phases,
            current: 0,
            elapsed: 0.0,
            phase_elapsed: 0.0,
            looping,
            origin,
            polar: Polar::from_cartesian(position - origin),
            state,
        })
    }

    /// All phases of the track
    pub fn phases(&self) -> &[MovementSpec] {
        &self.phases
    }

    /// Shared handle to the phase list, for spawning followers with the same plan
    pub fn shared_phases(&self) -> Arc<[MovementSpec]> {
        Arc::clone(&self.phases)
    }

    /// Index of the active phase
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The active phase
    pub fn current_spec(&self) -> &MovementSpec {
        &self.phases[self.current]
    }

    /// Track clock in scaled seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Scaled seconds since the active phase was entered
    pub fn phase_elapsed(&self) -> f64 {
        self.phase_elapsed
    }

    /// Whether the track wraps to phase 0 after its last phase ends
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Origin used by Polar phases and the cached polar view
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Cached polar coordinate relative to the origin
    pub fn polar(&self) -> Polar {
        self.polar
    }

    /// Evolving kinematic values of the active phase
    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Current Cartesian velocity
    pub fn instantaneous_velocity(&self) -> Vec2 {
        self.state.velocity(&self.polar)
    }

    /// Whether the active phase is integrating at the current clock value
    pub fn is_moving(&self) -> bool {
        let spec = self.current_spec();
        self.elapsed >= spec.start_time() && spec.end_time().map_or(true, |end| self.elapsed < end)
    }

    /// Integration pass: advance the clock by `dt` and move the entity
    ///
    /// Only the part of `dt` inside the active phase's window is integrated.
    /// The displacement is added to `position`, the cached polar view is
    /// refreshed for non-Polar phases, and the displacement is returned.
    pub fn advance(&mut self, dt: f64, position: &mut Vec2, heading: &mut f64) -> Vec2 {
        let from = self.elapsed;
        self.elapsed += dt;
        self.phase_elapsed += dt;

        let spec = &self.phases[self.current];
        let active = spec.active_overlap(from, self.elapsed);
        if active <= 0.0 {
            return Vec2::ZERO;
        }

        let displacement =
            integration::integrate(spec, &mut self.state, &mut self.polar, heading, active);
        *position += displacement;
        if spec.mode() != MovementMode::Polar {
            self.polar = Polar::from_cartesian(*position - self.origin);
        }
        displacement
    }

    /// Transition pass: move to the latest phase whose start time has passed
    ///
    /// Falls back to a loop wrap when the last phase of a looping track has
    /// ended. Returns the change, if any.
    pub fn evaluate_transition(&mut self) -> Option<PhaseChange> {
        let from = self.current;
        let elapsed = self.elapsed;
        let next = (from + 1..self.phases.len())
            .rev()
            .find(|&j| self.phases[j].start_time() <= elapsed);

        if let Some(to) = next {
            self.enter(to);
            log::debug!("Phase transition {} -> {} at t={:.4}", from, to, elapsed);
            return Some(PhaseChange { from, to, wrapped: false });
        }

        let is_last = from + 1 == self.phases.len();
        let ended = self.phases[from].end_time().map_or(false, |end| elapsed >= end);
        if self.looping && is_last && ended {
            self.elapsed = 0.0;
            self.enter(0);
            log::debug!("Track wrapped from phase {} to 0 at t={:.4}", from, elapsed);
            return Some(PhaseChange { from, to: 0, wrapped: true });
        }

        None
    }

    /// Jump to `index` regardless of its start time
    ///
    /// The clock is moved forward to the phase's start time if it has not
    /// reached it yet, so the phase integrates from the next tick on. If a
    /// later phase has already started, the clock is rewound to the forced
    /// phase's start time instead, so the next transition pass keeps it.
    /// Velocity is carried over exactly as for a natural transition.
    pub fn force_phase(&mut self, index: usize) -> Result<PhaseChange> {
        let len = self.phases.len();
        if index >= len {
            return Err(DanmakuError::PhaseOutOfRange { index, len });
        }

        let from = self.current;
        let start = self.phases[index].start_time();
        let overtaken = self.phases[index + 1..]
            .iter()
            .any(|phase| phase.start_time() <= self.elapsed);
        self.elapsed = if overtaken { start } else { self.elapsed.max(start) };
        self.enter(index);
        log::debug!("Forced phase change {} -> {} at t={:.4}", from, index, self.elapsed);
        Ok(PhaseChange { from, to: index, wrapped: false })
    }

    /// Move the origin, returning the translation to apply to the entity
    ///
    /// Polar phases ride along with their origin, so the returned shift equals
    /// the origin's movement. Other modes stay put and only refresh the cached
    /// polar view.
    pub fn set_origin(&mut self, origin: Vec2, position: Vec2) -> Vec2 {
        let shift = origin - self.origin;
        self.origin = origin;
        if self.current_spec().mode() == MovementMode::Polar {
            shift
        } else {
            self.polar = Polar::from_cartesian(position - origin);
            Vec2::ZERO
        }
    }

    /// Turn the direction of travel toward `target_angle` by at most `max_turn` degrees
    ///
    /// Applies to Cartesian and Cartesian-Polar phases; Polar phases are left
    /// alone. Returns true if the direction changed.
    pub fn steer_towards(&mut self, target_angle: f64, max_turn: f64) -> bool {
        match &mut self.state.motion {
            MotionState::CartesianPolar { angle, .. } => {
                let turn = angle_delta(*angle, target_angle).clamp(-max_turn, max_turn);
                *angle = normalize_angle(*angle + turn);
                turn != 0.0
            }
            MotionState::Cartesian { velocity } => {
                let Some(current) = heading_of(*velocity) else {
                    return false;
                };
                let turn = angle_delta(current, target_angle).clamp(-max_turn, max_turn);
                let speed = velocity.magnitude();
                *velocity = crate::math::polar_to_cartesian(speed, current + turn);
                turn != 0.0
            }
            MotionState::Polar { .. } => false,
        }
    }

    fn enter(&mut self, index: usize) {
        let prior = self.state.velocity(&self.polar);
        let spec = &self.phases[index];
        self.state = if spec.carry_prior_speed() {
            KinematicState::carried(spec, prior, &mut self.polar)
        } else {
            KinematicState::seed(spec)
        };
        self.current = index;
        self.phase_elapsed = 0.0;
    }
}
