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
//! Pooling tests
//!
//! Covers warm-up, reuse, double return and statistics through both the
//! generic pool and the world.

use danmaku_engine::ecs::{Entity, ProjectileKind, PrototypeId, SpawnParams, World, WorldConfig};
use danmaku_engine::math::Vec2;
use danmaku_engine::movement::CartesianPolarBuilder;
use danmaku_engine::pool::{ObjectPool, PoolConfig, Recyclable};
use danmaku_engine::DanmakuError;

const ROUND: PrototypeId = PrototypeId::new(1);
const LASER: PrototypeId = PrototypeId::new(2);

#[derive(Debug, Clone, Default)]
struct Marker {
    uses: u32,
}

impl Recyclable for Marker {}

#[test]
fn test_get_return_get_same_instance() {
    let mut pool: ObjectPool<Marker> = ObjectPool::new();
    pool.register(ROUND, Marker::default());
    pool.warm(ROUND, 1).unwrap();

    let a = pool.get(ROUND).unwrap();
    pool.get_mut(a).unwrap().uses += 1;
    assert!(pool.is_active(a));

    pool.return_to_pool(a).unwrap();
    assert!(!pool.is_active(a));

    let b = pool.get(ROUND).unwrap();
    assert_eq!(b.id(), a.id());
    assert!(pool.is_active(b));
    // No recycle hook: state survives reuse
    assert_eq!(pool.get_ref(b).unwrap().uses, 1);

    pool.return_to_pool(b).unwrap();
    assert_eq!(pool.return_to_pool(b), Err(DanmakuError::AlreadyInactive(b)));
}

#[test]
fn test_warm_twice_is_error_not_merge() {
    let mut world = World::new();
    world.register_prototype(ROUND, ProjectileKind::bullet(2.0));
    world.warm(ROUND, 10).unwrap();
    assert_eq!(world.warm(ROUND, 10), Err(DanmakuError::PoolAlreadyWarmed(ROUND)));
    assert_eq!(world.pool_stats().free, 10);
}

#[test]
fn test_warmed_pool_has_no_misses() {
    let mut world = World::new();
    world.register_prototype(ROUND, ProjectileKind::bullet(2.0));
    world.warm(ROUND, 32).unwrap();

    let spec = CartesianPolarBuilder::new().speed(1.0).build().unwrap();
    for _ in 0..4 {
        for _ in 0..32 {
            world
                .begin_entity(ROUND, SpawnParams::new(Vec2::ZERO, vec![spec.clone()]))
                .unwrap();
        }
        world.step(1.0 / 60.0).unwrap();
        assert_eq!(world.return_all(), 32);
    }

    let stats = world.pool_stats();
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.hits, 128);
    assert_eq!(stats.peak_active, 32);
    assert_eq!(stats.hit_rate(), 100.0);
}

#[test]
fn test_cold_pool_constructs_ad_hoc() {
    let mut world = World::with_config(
        WorldConfig::default()
            .with_pool(PoolConfig::new(4).with_miss_warnings(false)),
    );
    world.register_prototype(LASER, ProjectileKind::curve_laser(6.0, 16));
    let spec = CartesianPolarBuilder::new().speed(1.0).build().unwrap();
    let e = world
        .begin_entity(LASER, SpawnParams::new(Vec2::ZERO, vec![spec]))
        .unwrap();
    assert!(world.is_live(e));
    assert_eq!(world.pool_stats().misses, 1);
}

#[test]
fn test_recycled_projectile_starts_clean() {
    let mut world = World::new();
    world.register_prototype(LASER, ProjectileKind::curve_laser(6.0, 16));
    world.warm(LASER, 1).unwrap();
    let spec = CartesianPolarBuilder::new().speed(5.0).build().unwrap();

    let first = world
        .begin_entity(LASER, SpawnParams::new(Vec2::ZERO, vec![spec.clone()]))
        .unwrap();
    for _ in 0..10 {
        world.step(0.1).unwrap();
    }
    world.notify_collision(first).unwrap();

    let second = world
        .begin_entity(LASER, SpawnParams::new(Vec2::new(50.0, 50.0), vec![spec]))
        .unwrap();
    assert_eq!(second.id(), first.id());
    match world.projectile(second).unwrap().kind() {
        ProjectileKind::CurveLaser { trail, .. } => {
            assert_eq!(trail.len(), 1);
            assert_eq!(trail[0], Vec2::new(50.0, 50.0));
        }
        other => panic!("unexpected kind {:?}", other),
    }
    assert_eq!(world.track(second).unwrap().elapsed(), 0.0);
}

#[test]
fn test_returned_projectiles_do_not_move() {
    let mut world = World::new();
    world.register_prototype(ROUND, ProjectileKind::bullet(2.0));
    let spec = CartesianPolarBuilder::new().speed(1.0).build().unwrap();
    let kept = world
        .begin_entity(ROUND, SpawnParams::new(Vec2::ZERO, vec![spec.clone()]))
        .unwrap();
    let gone = world
        .begin_entity(ROUND, SpawnParams::new(Vec2::ZERO, vec![spec]))
        .unwrap();
    world.return_to_pool(gone).unwrap();

    let mut seen = Vec::new();
    world.step(1.0).unwrap();
    world.sync_transforms(&mut |e: Entity, _p: Vec2, _h: f64| seen.push(e));
    assert_eq!(seen, vec![kept]);
}
