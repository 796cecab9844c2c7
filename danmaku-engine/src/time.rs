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
//! Independently scalable time domains
//!
//! Every component reads elapsed time through a [`TimeDomain`]. Domains can be
//! paused or slowed down on their own (for example enemy bullets in a
//! slow-motion bomb) while a global pause suspends all of them at once. The
//! [`TimeDomainId::UNSCALED`] domain always runs at real time and is meant for
//! UI and meta timers.

use std::fmt;

use crate::error::{DanmakuError, Result};

/// Identifier of a time domain inside a [`TimeDomains`] registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeDomainId(u32);

impl TimeDomainId {
    /// Always runs at scale 1 and ignores every pause
    pub const UNSCALED: TimeDomainId = TimeDomainId(0);
    /// Player-side objects
    pub const PLAYER: TimeDomainId = TimeDomainId(1);
    /// Enemy-side objects, including enemy bullets
    pub const ENEMY: TimeDomainId = TimeDomainId(2);

    /// Get the raw index
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimeDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeDomain({})", self.0)
    }
}

/// A named clock with its own scale factor and pause flag
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDomain {
    name: String,
    scale: f64,
    paused: bool,
}

impl TimeDomain {
    fn new(name: &str, scale: f64) -> Self {
        TimeDomain {
            name: name.to_string(),
            scale,
            paused: false,
        }
    }

    /// Name given at registration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured scale factor, unaffected by pausing
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether this domain is individually paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Registry of all time domains plus the global pause flag
///
/// # Examples
///
/// ```
/// use danmaku_engine::time::{TimeDomains, TimeDomainId};
///
/// let mut domains = TimeDomains::new();
/// domains.set_scale(TimeDomainId::ENEMY, 0.5).unwrap();
/// assert_eq!(domains.scaled_delta(TimeDomainId::ENEMY, 0.1).unwrap(), 0.05);
///
/// domains.pause_all();
/// assert_eq!(domains.scaled_delta(TimeDomainId::ENEMY, 0.1).unwrap(), 0.0);
/// assert_eq!(domains.scaled_delta(TimeDomainId::UNSCALED, 0.1).unwrap(), 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct TimeDomains {
    domains: Vec<TimeDomain>,
    global_pause: bool,
}

impl TimeDomains {
    /// Create a registry holding the unscaled, player and enemy domains
    pub fn new() -> Self {
        TimeDomains {
            domains: vec![
                TimeDomain::new("unscaled", 1.0),
                TimeDomain::new("player", 1.0),
                TimeDomain::new("enemy", 1.0),
            ],
            global_pause: false,
        }
    }

    /// Register an additional domain and return its id
    pub fn register(&mut self, name: &str, scale: f64) -> Result<TimeDomainId> {
        validate_scale(scale)?;
        let id = TimeDomainId(self.domains.len() as u32);
        self.domains.push(TimeDomain::new(name, scale));
        log::debug!("Registered time domain '{}' as {} (scale {})", name, id, scale);
        Ok(id)
    }

    /// Look up a domain
    pub fn get(&self, id: TimeDomainId) -> Result<&TimeDomain> {
        self.domains
            .get(id.0 as usize)
            .ok_or(DanmakuError::UnknownTimeDomain(id))
    }

    /// Find a domain id by name
    pub fn find(&self, name: &str) -> Option<TimeDomainId> {
        self.domains
            .iter()
            .position(|d| d.name == name)
            .map(|i| TimeDomainId(i as u32))
    }

    /// Set the scale factor of a domain
    pub fn set_scale(&mut self, id: TimeDomainId, scale: f64) -> Result<()> {
        validate_scale(scale)?;
        self.get_mut(id)?.scale = scale;
        Ok(())
    }

    /// Pause or resume a single domain
    pub fn set_paused(&mut self, id: TimeDomainId, paused: bool) -> Result<()> {
        self.get_mut(id)?.paused = paused;
        Ok(())
    }

    /// Suspend every scaled domain
    pub fn pause_all(&mut self) {
        self.global_pause = true;
    }

    /// Lift the global pause; each domain resumes at its own scale
    pub fn resume_all(&mut self) {
        self.global_pause = false;
    }

    /// Whether the global pause is active
    pub fn is_globally_paused(&self) -> bool {
        self.global_pause
    }

    /// Scale currently applied to deltas, accounting for pauses
    pub fn effective_scale(&self, id: TimeDomainId) -> Result<f64> {
        if id == TimeDomainId::UNSCALED {
            return Ok(1.0);
        }
        let domain = self.get(id)?;
        if self.global_pause || domain.paused {
            Ok(0.0)
        } else {
            Ok(domain.scale)
        }
    }

    /// Convert a raw frame delta into this domain's time
    pub fn scaled_delta(&self, id: TimeDomainId, raw_delta: f64) -> Result<f64> {
        Ok(raw_delta * self.effective_scale(id)?)
    }

    /// Number of registered domains
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Always false; the built-in domains cannot be removed
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    fn get_mut(&mut self, id: TimeDomainId) -> Result<&mut TimeDomain> {
        if id == TimeDomainId::UNSCALED {
            return Err(DanmakuError::ImmutableTimeDomain);
        }
        self.domains
            .get_mut(id.0 as usize)
            .ok_or(DanmakuError::UnknownTimeDomain(id))
    }
}

impl Default for TimeDomains {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_scale(scale: f64) -> Result<()> {
    if scale < 0.0 || !scale.is_finite() {
        return Err(DanmakuError::InvalidTimeScale(scale));
    }
    Ok(())
}
