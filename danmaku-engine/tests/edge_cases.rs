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
//! Edge case tests
//!
//! Tests invalid inputs, boundary timings, clamp limits and unusual scenarios

use danmaku_engine::ecs::{ProjectileKind, PrototypeId, SpawnParams, World};
use danmaku_engine::math::{cartesian_to_polar, polar_to_cartesian, Vec2};
use danmaku_engine::movement::{CartesianBuilder, CartesianPolarBuilder, MovementSpec, PolarBuilder};
use danmaku_engine::time::TimeDomainId;
use danmaku_engine::DanmakuError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BULLET: PrototypeId = PrototypeId::new(1);

fn world() -> World {
    let mut world = World::new();
    world.register_prototype(BULLET, ProjectileKind::bullet(1.0));
    world
}

fn drifting(world: &mut World) -> danmaku_engine::Entity {
    let phases = vec![CartesianBuilder::new().velocity(Vec2::new(1.0, 1.0)).build().unwrap()];
    world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, phases)).unwrap()
}

#[test]
fn test_negative_delta_rejected() {
    let mut world = world();
    let e = drifting(&mut world);
    assert_eq!(world.step(-0.01), Err(DanmakuError::InvalidDelta(-0.01)));
    assert_eq!(world.tick_entity(e, -1.0), Err(DanmakuError::InvalidDelta(-1.0)));
    assert_eq!(world.position(e), Some(Vec2::ZERO));
}

#[test]
fn test_non_finite_delta_rejected() {
    let mut world = world();
    let e = drifting(&mut world);
    assert!(world.step(f64::NAN).is_err());
    assert!(world.step(f64::INFINITY).is_err());
    assert_eq!(world.position(e), Some(Vec2::ZERO));
    assert_eq!(world.track(e).unwrap().elapsed(), 0.0);
}

#[test]
fn test_zero_delta_is_no_op() {
    let mut world = world();
    let e = drifting(&mut world);
    let changes = world.step(0.0).unwrap();
    assert!(changes.is_empty());
    assert_eq!(world.position(e), Some(Vec2::ZERO));
}

#[test]
fn test_builder_rejects_inverted_clamp() {
    let result = CartesianPolarBuilder::new()
        .speed(5.0)
        .clamp(true)
        .speed_bounds(10.0, 1.0)
        .build();
    assert!(matches!(result, Err(DanmakuError::InvalidMovementSpec(_))));
}

#[test]
fn test_builder_rejects_end_before_start() {
    let result = PolarBuilder::new().start_time(3.0).end_time(2.0).build();
    assert!(matches!(result, Err(DanmakuError::InvalidMovementSpec(_))));
}

#[test]
fn test_builder_rejects_rotation_while_facing_velocity() {
    let result = CartesianBuilder::new().rotation_rate(45.0).build();
    assert!(matches!(result, Err(DanmakuError::InvalidMovementSpec(_))));
}

#[test]
fn test_builder_reuse_for_fan() {
    let mut builder = CartesianPolarBuilder::new();
    builder.speed(100.0);
    let fan: Vec<_> = (0..5)
        .map(|i| builder.angle(i as f64 * 90.0).build().unwrap())
        .collect();

    let mut world = world();
    let entities: Vec<_> = fan
        .into_iter()
        .map(|spec| {
            world
                .begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, vec![spec]))
                .unwrap()
        })
        .collect();
    world.step(0.01).unwrap();

    let first = world.position(entities[0]).unwrap();
    let last = world.position(entities[4]).unwrap();
    assert!((first.x - 1.0).abs() < 1e-9);
    assert!((last.x - 1.0).abs() < 1e-9);
    let up = world.position(entities[1]).unwrap();
    assert!((up.y - 1.0).abs() < 1e-9);
}

#[test]
fn test_empty_track_rejected() {
    let mut world = world();
    let result = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, Vec::<MovementSpec>::new()));
    assert_eq!(result, Err(DanmakuError::EmptyTrack));
    assert_eq!(world.live_count(), 0);
}

#[test]
fn test_non_finite_spawn_rejected() {
    let mut world = world();
    let phases = vec![CartesianBuilder::new().build().unwrap()];
    let result = world.begin_entity(BULLET, SpawnParams::new(Vec2::new(f64::NAN, 0.0), phases));
    assert!(matches!(result, Err(DanmakuError::InvalidMovementSpec(_))));
}

#[test]
fn test_unknown_prototype() {
    let mut world = world();
    let ghost = PrototypeId::new(404);
    let phases = vec![CartesianBuilder::new().build().unwrap()];
    assert_eq!(
        world.begin_entity(ghost, SpawnParams::new(Vec2::ZERO, phases)),
        Err(DanmakuError::UnknownPrototype(ghost))
    );
}

#[test]
fn test_stale_handle_after_reuse() {
    let mut world = world();
    let old = drifting(&mut world);
    world.notify_collision(old).unwrap();
    let new = drifting(&mut world);
    assert_eq!(new.id(), old.id());

    assert_eq!(world.tick_entity(old, 0.1), Err(DanmakuError::StaleHandle(old)));
    assert_eq!(world.return_to_pool(old), Err(DanmakuError::StaleHandle(old)));
    assert!(world.is_live(new));
    assert_eq!(world.position(old), None);
}

#[test]
fn test_clamped_speed_stays_in_bounds() {
    let phases = vec![CartesianPolarBuilder::new()
        .speed(10.0)
        .tangential_acceleration(500.0)
        .normal_acceleration(720.0)
        .clamp(true)
        .speed_bounds(5.0, 50.0)
        .build()
        .unwrap()];
    let mut world = world();
    let e = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, phases)).unwrap();
    for _ in 0..50 {
        world.step(1.0 / 30.0).unwrap();
        let v = world.track(e).unwrap().instantaneous_velocity();
        let speed = v.magnitude();
        assert!((5.0 - 1e-9..=50.0 + 1e-9).contains(&speed), "speed {}", speed);
    }
}

#[test]
fn test_clamp_bounds_hold_across_seeded_runs() {
    let mut rng = StdRng::seed_from_u64(7);
    for trial in 0..200 {
        let polar = CartesianPolarBuilder::new()
            .speed(rng.gen_range(5.0..50.0))
            .angle(rng.gen_range(0.0..360.0))
            .tangential_acceleration(rng.gen_range(-500.0..500.0))
            .normal_acceleration(rng.gen_range(-720.0..720.0))
            .clamp(true)
            .speed_bounds(5.0, 50.0)
            .build()
            .unwrap();
        let cartesian = CartesianBuilder::new()
            .velocity(Vec2::new(rng.gen_range(-30.0..30.0), rng.gen_range(-30.0..30.0)))
            .acceleration(Vec2::new(rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0)))
            .clamp(true)
            .magnitude_bounds(2.0, 40.0)
            .build()
            .unwrap();

        let mut world = world();
        let a = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, vec![polar])).unwrap();
        let b = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, vec![cartesian])).unwrap();
        for _ in 0..30 {
            world.step(rng.gen_range(0.001..0.2)).unwrap();
            let speed = world.track(a).unwrap().instantaneous_velocity().magnitude();
            assert!((5.0 - 1e-9..=50.0 + 1e-9).contains(&speed), "trial {}: speed {}", trial, speed);
            let magnitude = world.track(b).unwrap().instantaneous_velocity().magnitude();
            assert!(
                (2.0 - 1e-9..=40.0 + 1e-9).contains(&magnitude),
                "trial {}: magnitude {}",
                trial,
                magnitude
            );
        }
    }
}

#[test]
fn test_cartesian_magnitude_clamp_from_below() {
    let phases = vec![CartesianBuilder::new()
        .velocity(Vec2::new(0.0, 20.0))
        .acceleration(Vec2::new(0.0, -19.0))
        .clamp(true)
        .magnitude_bounds(2.0, 40.0)
        .build()
        .unwrap()];
    let mut world = world();
    let e = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, phases)).unwrap();
    world.step(1.0).unwrap();
    let v = world.track(e).unwrap().instantaneous_velocity();
    assert!((v.magnitude() - 2.0).abs() < 1e-9);
    assert!(v.y > 0.0);
}

#[test]
fn test_end_time_without_loop_freezes() {
    let phases = vec![CartesianBuilder::new()
        .velocity(Vec2::new(2.0, 0.0))
        .end_time(0.5)
        .build()
        .unwrap()];
    let mut world = world();
    let e = world.begin_entity(BULLET, SpawnParams::new(Vec2::ZERO, phases)).unwrap();
    for _ in 0..10 {
        world.step(0.25).unwrap();
    }
    assert_eq!(world.position(e), Some(Vec2::new(1.0, 0.0)));
    assert!(!world.track(e).unwrap().is_moving());
}

#[test]
fn test_unscaled_domain_ignores_pause() {
    let phases = vec![CartesianBuilder::new().velocity(Vec2::new(1.0, 0.0)).build().unwrap()];
    let mut world = world();
    let ui = world
        .begin_entity(
            BULLET,
            SpawnParams::new(Vec2::ZERO, phases).with_domain(TimeDomainId::UNSCALED),
        )
        .unwrap();
    let enemy = drifting(&mut world);

    world.time_domains_mut().pause_all();
    world.step(1.0).unwrap();
    assert_eq!(world.position(ui), Some(Vec2::new(1.0, 0.0)));
    assert_eq!(world.position(enemy), Some(Vec2::ZERO));
    assert_eq!(
        world.time_domains_mut().set_scale(TimeDomainId::UNSCALED, 2.0),
        Err(DanmakuError::ImmutableTimeDomain)
    );
}

#[test]
fn test_coordinate_round_trip_near_axes() {
    for &(x, y) in &[(1e-6, 0.0), (0.0, -3.0), (-7.5, 1e-12), (1e6, -1e6)] {
        let (r, a) = cartesian_to_polar(x, y);
        assert!((0.0..360.0).contains(&a));
        let back = polar_to_cartesian(r, a);
        assert!((back.x - x).abs() < 1e-9 * (1.0 + r));
        assert!((back.y - y).abs() < 1e-9 * (1.0 + r));
    }
}
