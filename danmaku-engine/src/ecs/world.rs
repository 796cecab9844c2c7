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
//! World context
//!
//! The [`World`] owns everything a tick needs: the projectile pool, the time
//! domains and the configuration. Nothing is global; callers pass the world
//! explicitly.
//!
//! # Staged execution
//!
//! [`World::step`] runs three passes over every live projectile, each pass
//! finishing for all entities before the next begins:
//!
//! 1. Integration (parallel above [`WorldConfig::parallel_threshold`] when the
//!    `parallel` feature is enabled)
//! 2. Phase transitions
//! 3. Origin/time-domain refresh and homing
//!
//! Pass 3 reads owners and targets from a snapshot taken after pass 2, so a
//! follower never sees another follower's refreshed origin in the same tick.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::ecs::{Entity, Projectile, ProjectileKind, PrototypeId, SpawnParams};
use crate::error::{validate_delta, DanmakuError, Result};
use crate::math::{heading_of, Vec2};
use crate::pool::{ObjectPool, PoolConfig, PoolStats};
use crate::sequencer::{PhaseChange, PhaseTrack};
use crate::time::{TimeDomainId, TimeDomains};

/// Configuration for a [`World`]
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Projectile pool configuration
    pub pool: PoolConfig,
    /// Minimum live count before the integration pass runs in parallel
    pub parallel_threshold: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            pool: PoolConfig::default(),
            parallel_threshold: 1024,
        }
    }
}

impl WorldConfig {
    /// Use a custom pool configuration
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Set the live count at which integration goes parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

/// Receiver for projectile transforms, typically the rendering layer
pub trait TransformSink {
    /// Apply the transform of one live projectile
    fn apply(&mut self, entity: Entity, position: Vec2, heading: f64);
}

impl<F: FnMut(Entity, Vec2, f64)> TransformSink for F {
    fn apply(&mut self, entity: Entity, position: Vec2, heading: f64) {
        self(entity, position, heading)
    }
}

/// Pass-3 work for one projectile, computed from a read-only snapshot
#[derive(Debug, Clone, Copy)]
struct Refresh {
    handle: Entity,
    origin: Option<(Vec2, TimeDomainId)>,
    steer: Option<(f64, f64)>,
}

/// Simulation context for pooled projectiles
pub struct World {
    pool: ObjectPool<Projectile>,
    time_domains: TimeDomains,
    config: WorldConfig,
}

impl World {
    /// Create a world with default configuration
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with custom configuration
    pub fn with_config(config: WorldConfig) -> Self {
        World {
            pool: ObjectPool::with_config(config.pool.clone()),
            time_domains: TimeDomains::new(),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Declare a projectile prototype
    pub fn register_prototype(&mut self, prototype: PrototypeId, kind: ProjectileKind) {
        self.pool.register(prototype, Projectile::new(kind));
    }

    /// Pre-construct `count` idle projectiles of a prototype
    pub fn warm(&mut self, prototype: PrototypeId, count: usize) -> Result<()> {
        self.pool.warm(prototype, count)
    }

    /// Take an idle projectile from the pool without starting it
    ///
    /// The projectile does not move until [`World::begin`] is called.
    pub fn acquire(&mut self, prototype: PrototypeId) -> Result<Entity> {
        self.pool.get(prototype)
    }

    /// Start an acquired projectile along its phase list
    ///
    /// Fails with [`DanmakuError::AlreadyInitialized`] if it is already moving.
    pub fn begin(&mut self, entity: Entity, params: SpawnParams) -> Result<()> {
        self.time_domains.get(params.domain)?;
        self.pool.check_live(entity)?;
        match self.pool.get_mut(entity) {
            Some(projectile) => projectile.begin(entity, params),
            None => Err(DanmakuError::UnknownHandle(entity)),
        }
    }

    /// Acquire a projectile and start it in one call
    ///
    /// On failure the projectile goes back to the pool and nothing changes
    /// for the caller.
    pub fn begin_entity(&mut self, prototype: PrototypeId, params: SpawnParams) -> Result<Entity> {
        let entity = self.acquire(prototype)?;
        if let Err(err) = self.begin(entity, params) {
            self.pool.return_to_pool(entity)?;
            return Err(err);
        }
        Ok(entity)
    }

    /// Run all three passes for a single projectile
    ///
    /// Returns the displacement and the new heading. Other projectiles are
    /// not touched.
    pub fn tick_entity(&mut self, entity: Entity, raw_delta: f64) -> Result<(Vec2, f64)> {
        validate_delta(raw_delta)?;
        self.pool.check_live(entity)?;

        let domains = &self.time_domains;
        let projectile = self
            .pool
            .get_mut(entity)
            .ok_or(DanmakuError::UnknownHandle(entity))?;
        if !projectile.is_initialized() {
            return Err(DanmakuError::NotInitialized(entity));
        }
        let displacement = projectile.integrate(domains, raw_delta)?;
        projectile.evaluate_transition();

        if let Some(refresh) = self.plan_refresh(entity) {
            self.apply_refresh(refresh);
        }

        let heading = self.heading(entity).unwrap_or_default();
        Ok((displacement, heading))
    }

    /// Advance every live projectile by one frame
    ///
    /// Returns the phase changes that happened in pass 2.
    pub fn step(&mut self, raw_delta: f64) -> Result<Vec<(Entity, PhaseChange)>> {
        validate_delta(raw_delta)?;

        // Pass 1: integration
        let live = self.pool.active_count();
        self.integrate_all(raw_delta, live)?;
        log::trace!("Integrated {} projectiles", live);

        // Pass 2: transitions
        let changes: Vec<(Entity, PhaseChange)> = self
            .pool
            .iter_active_mut()
            .filter_map(|(handle, p)| p.evaluate_transition().map(|c| (handle, c)))
            .collect();
        log::trace!("{} phase transitions", changes.len());

        // Pass 3: refresh from a snapshot of pass-2 state
        let plans: Vec<Refresh> = self
            .pool
            .active_handles()
            .into_iter()
            .filter_map(|handle| self.plan_refresh(handle))
            .collect();
        let refreshed = plans.len();
        for plan in plans {
            self.apply_refresh(plan);
        }
        log::trace!("Refreshed {} followers", refreshed);

        Ok(changes)
    }

    #[cfg(feature = "parallel")]
    fn integrate_all(&mut self, raw_delta: f64, live: usize) -> Result<()> {
        self.check_domains()?;
        let domains = &self.time_domains;
        if live >= self.config.parallel_threshold {
            return self
                .pool
                .par_iter_active_mut()
                .try_for_each(|(_, p)| p.integrate(domains, raw_delta).map(|_| ()));
        }
        for (_, p) in self.pool.iter_active_mut() {
            p.integrate(domains, raw_delta)?;
        }
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn integrate_all(&mut self, raw_delta: f64, _live: usize) -> Result<()> {
        self.check_domains()?;
        let domains = &self.time_domains;
        for (_, p) in self.pool.iter_active_mut() {
            p.integrate(domains, raw_delta)?;
        }
        Ok(())
    }

    /// Every moving projectile must resolve its domain before any of them moves
    fn check_domains(&self) -> Result<()> {
        self.pool
            .iter_active()
            .filter(|(_, p)| p.is_initialized())
            .try_for_each(|(_, p)| self.time_domains.effective_scale(p.domain()).map(|_| ()))
    }

    fn plan_refresh(&self, handle: Entity) -> Option<Refresh> {
        let projectile = self.pool.get_ref(handle)?;

        let origin = if projectile.origin_follows_owner() {
            projectile
                .owner()
                .and_then(|owner| self.pool.get_ref(owner))
                .map(|owner| (owner.position(), owner.domain()))
        } else {
            None
        };

        let steer = projectile.homing().and_then(|(target, max_turn)| {
            let target = self.pool.get_ref(target)?;
            let angle = heading_of(target.position() - projectile.position())?;
            Some((angle, max_turn))
        });

        if origin.is_none() && steer.is_none() {
            return None;
        }
        Some(Refresh { handle, origin, steer })
    }

    fn apply_refresh(&mut self, refresh: Refresh) {
        let Some(projectile) = self.pool.get_mut(refresh.handle) else {
            return;
        };
        if let Some((origin, domain)) = refresh.origin {
            projectile.set_origin(origin);
            projectile.set_domain(domain);
        }
        if let Some((angle, max_turn)) = refresh.steer {
            projectile.steer_towards(angle, max_turn);
        }
    }

    /// Jump a projectile to `index`, bypassing start-time gating
    pub fn force_advance_phase(&mut self, entity: Entity, index: usize) -> Result<PhaseChange> {
        self.pool.check_live(entity)?;
        let projectile = self
            .pool
            .get_mut(entity)
            .ok_or(DanmakuError::UnknownHandle(entity))?;
        projectile.force_phase(entity, index)
    }

    /// Move the origin of a projectile whose owner lives outside the world
    pub fn set_origin(&mut self, entity: Entity, origin: Vec2) -> Result<()> {
        self.pool.check_live(entity)?;
        match self.pool.get_mut(entity) {
            Some(projectile) if projectile.is_initialized() => {
                projectile.set_origin(origin);
                Ok(())
            }
            Some(_) => Err(DanmakuError::NotInitialized(entity)),
            None => Err(DanmakuError::UnknownHandle(entity)),
        }
    }

    /// Retarget a homing bullet; returns false for other kinds
    pub fn set_homing_target(&mut self, entity: Entity, target: Option<Entity>) -> Result<bool> {
        self.pool.check_live(entity)?;
        Ok(self
            .pool
            .get_mut(entity)
            .map_or(false, |p| p.set_target(target)))
    }

    /// Collision notification: the projectile leaves play
    pub fn notify_collision(&mut self, entity: Entity) -> Result<()> {
        self.return_to_pool(entity)
    }

    /// Return a projectile to the pool
    pub fn return_to_pool(&mut self, entity: Entity) -> Result<()> {
        self.pool.return_to_pool(entity)
    }

    /// Return every live projectile to the pool, returning how many went back
    pub fn return_all(&mut self) -> usize {
        let handles = self.pool.active_handles();
        let mut returned = 0;
        for handle in handles {
            if self.pool.return_to_pool(handle).is_ok() {
                returned += 1;
            }
        }
        log::debug!("Returned {} projectiles to the pool", returned);
        returned
    }

    /// Push every live projectile's transform into `sink`
    pub fn sync_transforms<S: TransformSink + ?Sized>(&self, sink: &mut S) {
        for (handle, projectile) in self.pool.iter_active() {
            sink.apply(handle, projectile.position(), projectile.heading());
        }
    }

    /// Number of live projectiles
    pub fn live_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Whether `entity` is live
    pub fn is_live(&self, entity: Entity) -> bool {
        self.pool.is_active(entity)
    }

    /// Handles of all live projectiles
    pub fn live_entities(&self) -> Vec<Entity> {
        self.pool.active_handles()
    }

    /// Live projectile record
    pub fn projectile(&self, entity: Entity) -> Option<&Projectile> {
        self.pool.get_ref(entity)
    }

    /// Position of a live projectile
    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.projectile(entity).map(Projectile::position)
    }

    /// Heading of a live projectile
    pub fn heading(&self, entity: Entity) -> Option<f64> {
        self.projectile(entity).map(Projectile::heading)
    }

    /// Phase track of a live, started projectile
    pub fn track(&self, entity: Entity) -> Option<&PhaseTrack> {
        self.projectile(entity).and_then(Projectile::track)
    }

    /// Time domain configuration
    pub fn time_domains(&self) -> &TimeDomains {
        &self.time_domains
    }

    /// Mutable time domain configuration (scale, pause)
    pub fn time_domains_mut(&mut self) -> &mut TimeDomains {
        &mut self.time_domains
    }

    /// Pool statistics
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{CartesianBuilder, MovementSpec, PolarBuilder};

    const BULLET: PrototypeId = PrototypeId::new(1);
    const HOMING: PrototypeId = PrototypeId::new(2);
    const EPS: f64 = 1e-9;

    fn world() -> World {
        let mut world = World::with_config(
            WorldConfig::default().with_pool(PoolConfig::default().with_miss_warnings(false)),
        );
        world.register_prototype(BULLET, ProjectileKind::bullet(2.0));
        world.register_prototype(HOMING, ProjectileKind::homing(2.0, 90.0));
        world
    }

    fn moving(v: Vec2) -> Vec<MovementSpec> {
        vec![CartesianBuilder::new().velocity(v).build().unwrap()]
    }

    #[test]
    fn test_begin_entity_and_tick() {
        let mut world = world();
        let e = world
            .begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, moving(Vec2::new(0.0, 2.0))))
            .unwrap();
        let (d, heading) = world.tick_entity(e, 0.5).unwrap();
        assert_eq!(d, Vec2::new(0.0, 1.0));
        assert!((heading - 90.0).abs() < EPS);
        assert_eq!(world.position(e), Some(Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_failed_begin_returns_instance() {
        let mut world = world();
        let err = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, Vec::<MovementSpec>::new()));
        assert_eq!(err, Err(DanmakuError::EmptyTrack));
        assert_eq!(world.live_count(), 0);
        assert_eq!(world.pool_stats().free, 1);
    }

    #[test]
    fn test_begin_twice_rejected() {
        let mut world = world();
        let e = world.acquire(BULLET).unwrap();
        assert_eq!(world.tick_entity(e, 0.1), Err(DanmakuError::NotInitialized(e)));

        world.begin(e, SpawnParams::new(Vec2::ZERO, moving(Vec2::ZERO))).unwrap();
        let again = world.begin(e, SpawnParams::new(Vec2::ZERO, moving(Vec2::ZERO)));
        assert_eq!(again, Err(DanmakuError::AlreadyInitialized(e)));
    }

    #[test]
    fn test_invalid_delta_rejected() {
        let mut world = world();
        let e = world
            .begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, moving(Vec2::new(1.0, 0.0))))
            .unwrap();
        assert_eq!(world.step(-1.0), Err(DanmakuError::InvalidDelta(-1.0)));
        assert!(world.tick_entity(e, f64::NAN).is_err());
        assert_eq!(world.position(e), Some(Vec2::ZERO));
    }

    #[test]
    fn test_unknown_domain_rejected() {
        let mut world = world();
        let foreign = TimeDomains::new().register("boss", 1.0).unwrap();
        let params = SpawnParams::new(Vec2::ZERO, moving(Vec2::ZERO)).with_domain(foreign);
        assert!(world.begin_entity(BULLET, params).is_err());
        assert_eq!(world.live_count(), 0);
    }

    #[test]
    fn test_notify_collision_returns_to_pool() {
        let mut world = world();
        let e = world
            .begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, moving(Vec2::ZERO)))
            .unwrap();
        world.notify_collision(e).unwrap();
        assert!(!world.is_live(e));
        assert_eq!(world.notify_collision(e), Err(DanmakuError::AlreadyInactive(e)));
        assert_eq!(world.tick_entity(e, 0.1), Err(DanmakuError::AlreadyInactive(e)));
    }

    #[test]
    fn test_follower_orbits_moving_owner() {
        let mut world = world();
        let owner = world
            .begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, moving(Vec2::new(10.0, 0.0))))
            .unwrap();
        let orbit = vec![PolarBuilder::new().angular_speed(0.0).build().unwrap()];
        let follower = world
            .begin_entity(
                BULLET,
                SpawnParams::new(Vec2::new(0.0, 5.0), orbit)
                    .with_origin(Vec2::ZERO)
                    .with_owner(owner, true),
            )
            .unwrap();

        world.step(1.0).unwrap();
        let p = world.position(follower).unwrap();
        assert!((p.x - 10.0).abs() < EPS);
        assert!((p.y - 5.0).abs() < EPS);
        assert_eq!(world.track(follower).unwrap().origin(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_follower_adopts_owner_domain() {
        let mut world = world();
        let owner = world
            .begin_entity(
                BULLET,
                SpawnParams::new(Vec2::ZERO, moving(Vec2::ZERO)).with_domain(TimeDomainId::ENEMY),
            )
            .unwrap();
        let follower = world
            .begin_entity(
                BULLET,
                SpawnParams::new(Vec2::ZERO, moving(Vec2::ZERO)).with_owner(owner, true),
            )
            .unwrap();
        world.step(0.1).unwrap();
        assert_eq!(world.projectile(follower).unwrap().domain(), TimeDomainId::ENEMY);
    }

    #[test]
    fn test_homing_turns_toward_target() {
        let mut world = world();
        let target = world
            .begin_entity(BULLET, SpawnParams::new(Vec2::new(0.0, 100.0), moving(Vec2::ZERO)))
            .unwrap();
        let homing = world
            .begin_entity(
                HOMING,
                SpawnParams::new(Vec2::ZERO, moving(Vec2::new(1.0, 0.0))).with_target(target),
            )
            .unwrap();

        // 90 deg/s for 0.5 s allows a 45 degree turn
        world.step(0.5).unwrap();
        let v = world.track(homing).unwrap().instantaneous_velocity();
        assert!((heading_of(v).unwrap() - 45.0).abs() < 1e-6);
        assert!((v.magnitude() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_paused_domain_freezes_projectiles() {
        let mut world = world();
        let e = world
            .begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, moving(Vec2::new(1.0, 0.0))))
            .unwrap();
        world.time_domains_mut().pause_all();
        world.step(1.0).unwrap();
        assert_eq!(world.position(e), Some(Vec2::ZERO));

        world.time_domains_mut().resume_all();
        world.step(1.0).unwrap();
        assert_eq!(world.position(e), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_return_all_and_sync() {
        let mut world = world();
        for i in 0..4 {
            world
                .begin_entity(BULLET, SpawnParams::new(Vec2::new(i as f64, 0.0), moving(Vec2::ZERO)))
                .unwrap();
        }
        let mut seen = Vec::new();
        world.sync_transforms(&mut |e: Entity, p: Vec2, _h: f64| seen.push((e, p)));
        assert_eq!(seen.len(), 4);

        assert_eq!(world.return_all(), 4);
        assert_eq!(world.live_count(), 0);
    }

    #[test]
    fn test_force_advance_phase() {
        let mut world = world();
        let phases = vec![
            CartesianBuilder::new().velocity(Vec2::new(1.0, 0.0)).build().unwrap(),
            CartesianBuilder::new()
                .velocity(Vec2::new(0.0, -1.0))
                .start_time(60.0)
                .build()
                .unwrap(),
        ];
        let e = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, phases)).unwrap();
        let change = world.force_advance_phase(e, 1).unwrap();
        assert_eq!(change.to, 1);
        assert_eq!(
            world.force_advance_phase(e, 5),
            Err(DanmakuError::PhaseOutOfRange { index: 5, len: 2 })
        );

        world.step(1.0).unwrap();
        assert_eq!(world.position(e), Some(Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn test_unknown_domain_leaves_world_untouched() {
        let mut world = world();
        let a = world
            .begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, moving(Vec2::new(1.0, 0.0))))
            .unwrap();
        let boss = world.time_domains_mut().register("boss", 1.0).unwrap();
        let b = world
            .begin_entity(
                BULLET,
                SpawnParams::new(Vec2::ZERO, moving(Vec2::new(0.0, 1.0))).with_domain(boss),
            )
            .unwrap();

        // A replaced registry no longer knows the custom domain
        *world.time_domains_mut() = TimeDomains::new();
        assert_eq!(world.step(1.0), Err(DanmakuError::UnknownTimeDomain(boss)));

        for e in [a, b] {
            assert_eq!(world.position(e), Some(Vec2::ZERO));
            assert_eq!(world.track(e).unwrap().elapsed(), 0.0);
        }
    }
}
