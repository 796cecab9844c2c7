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
//! Object pooling for reducing allocation churn
//!
//! This module provides a prototype-keyed pool that recycles entity storage
//! instead of constructing and dropping objects every time a bullet is fired
//! or destroyed. Instances live in a single arena of slots addressed by
//! [`Entity`] handles; each prototype keeps a free list of inactive slots
//! cloned from its template.
//!
//! # Ownership
//!
//! At most one holder may use an active instance at a time. The pool enforces
//! this only through the active flag and the handle generation: returning an
//! inactive instance or a stale handle is rejected, but nothing stops a caller
//! from copying a handle and using it after handing it back.

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::ecs::{Entity, PrototypeId};
use crate::error::{DanmakuError, Result};

/// Types that can be stored in an [`ObjectPool`]
///
/// `recycle` runs when an instance is returned; it should drop per-use state
/// while keeping allocations that can be reused.
pub trait Recyclable: Clone {
    /// Prepare the instance for reuse
    fn recycle(&mut self) {}
}

/// Configuration for pool behavior
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Initial capacity of the slot arena
    pub initial_capacity: usize,
    /// Whether to log a warning when `get` has to construct a new instance
    pub warn_on_miss: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            initial_capacity: 256,
            warn_on_miss: true,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with a custom arena capacity
    pub fn new(initial_capacity: usize) -> Self {
        PoolConfig {
            initial_capacity,
            ..PoolConfig::default()
        }
    }

    /// Enable or disable pool-miss warnings
    pub fn with_miss_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_miss = enabled;
        self
    }
}

/// Statistics for monitoring pool performance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolStats {
    /// Number of times `get` reused an inactive instance
    pub hits: usize,
    /// Number of times `get` had to construct a new instance
    pub misses: usize,
    /// Instances currently handed out
    pub active: usize,
    /// Instances waiting for reuse, across all prototypes
    pub free: usize,
    /// Highest number of simultaneously active instances
    pub peak_active: usize,
}

impl PoolStats {
    /// Calculate the hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    prototype: PrototypeId,
    generation: u32,
    active: bool,
}

#[derive(Debug, Clone)]
struct Prototype<T> {
    template: T,
    free: Vec<usize>,
    warmed: bool,
}

/// Prototype-keyed pool of reusable instances
///
/// # Examples
///
/// ```
/// use danmaku_engine::ecs::PrototypeId;
/// use danmaku_engine::pool::{ObjectPool, Recyclable};
///
/// #[derive(Clone, Default)]
/// struct Spark { ttl: f64 }
/// impl Recyclable for Spark {}
///
/// let spark = PrototypeId::new(1);
/// let mut pool = ObjectPool::new();
/// pool.register(spark, Spark::default());
/// pool.warm(spark, 16).unwrap();
///
/// let handle = pool.get(spark).unwrap();
/// pool.get_mut(handle).unwrap().ttl = 0.5;
/// pool.return_to_pool(handle).unwrap();
/// assert!(pool.return_to_pool(handle).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    prototypes: HashMap<PrototypeId, Prototype<T>>,
    config: PoolConfig,
    stats: PoolStats,
}

impl<T: Recyclable> ObjectPool<T> {
    /// Create a new pool with default configuration
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a new pool with custom configuration
    pub fn with_config(config: PoolConfig) -> Self {
        ObjectPool {
            slots: Vec::with_capacity(config.initial_capacity),
            prototypes: HashMap::new(),
            config,
            stats: PoolStats::default(),
        }
    }

    /// Declare a prototype and the template its instances are cloned from
    ///
    /// Registering an existing id replaces the template for instances built
    /// from now on; instances already in the pool keep their state.
    pub fn register(&mut self, prototype: PrototypeId, template: T) {
        match self.prototypes.get_mut(&prototype) {
            Some(existing) => {
                log::debug!("Replacing template for {}", prototype);
                existing.template = template;
            }
            None => {
                self.prototypes.insert(
                    prototype,
                    Prototype {
                        template,
                        free: Vec::new(),
                        warmed: false,
                    },
                );
            }
        }
    }

    /// Check whether a prototype has been registered
    pub fn is_registered(&self, prototype: PrototypeId) -> bool {
        self.prototypes.contains_key(&prototype)
    }

    /// Pre-construct `count` inactive instances of a prototype
    ///
    /// Fails with [`DanmakuError::PoolAlreadyWarmed`] if called twice for the
    /// same prototype; warming is not additive.
    pub fn warm(&mut self, prototype: PrototypeId, count: usize) -> Result<()> {
        let Some(entry) = self.prototypes.get_mut(&prototype) else {
            log::error!("Cannot warm {}: prototype was never registered", prototype);
            return Err(DanmakuError::UnknownPrototype(prototype));
        };
        if entry.warmed {
            log::error!("Pool for {} has already been warmed", prototype);
            return Err(DanmakuError::PoolAlreadyWarmed(prototype));
        }

        entry.warmed = true;
        self.slots.reserve(count);
        entry.free.reserve(count);
        for _ in 0..count {
            entry.free.push(self.slots.len());
            self.slots.push(Slot {
                value: entry.template.clone(),
                prototype,
                generation: 0,
                active: false,
            });
        }
        self.stats.free += count;

        log::debug!("Warmed {} with {} instances", prototype, count);
        Ok(())
    }

    /// Hand out an active instance of a prototype
    ///
    /// Reuses an inactive instance when one is available; otherwise clones a
    /// new one from the template and logs a warning (if enabled).
    pub fn get(&mut self, prototype: PrototypeId) -> Result<Entity> {
        let Some(entry) = self.prototypes.get_mut(&prototype) else {
            log::warn!("Cannot get instance of unregistered {}", prototype);
            return Err(DanmakuError::UnknownPrototype(prototype));
        };

        let index = match entry.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                slot.active = true;
                self.stats.hits += 1;
                self.stats.free -= 1;
                index
            }
            None => {
                self.stats.misses += 1;
                if self.config.warn_on_miss {
                    log::warn!(
                        "Pool miss for {}: constructing a new instance (hit rate: {:.1}%)",
                        prototype,
                        self.stats.hit_rate()
                    );
                }
                self.slots.push(Slot {
                    value: entry.template.clone(),
                    prototype,
                    generation: 0,
                    active: true,
                });
                self.slots.len() - 1
            }
        };

        self.stats.active += 1;
        if self.stats.active > self.stats.peak_active {
            self.stats.peak_active = self.stats.active;
        }

        Ok(Entity::new(index as u64, self.slots[index].generation))
    }

    /// Deactivate an instance and make it available for reuse
    ///
    /// Rejects handles that do not belong to this pool, stale handles, and
    /// instances that are already inactive. A rejected call changes nothing.
    pub fn return_to_pool(&mut self, handle: Entity) -> Result<()> {
        self.check_live(handle)?;

        let index = handle.id().index();
        let slot = &mut self.slots[index];
        let Some(entry) = self.prototypes.get_mut(&slot.prototype) else {
            log::warn!("Cannot return {}: {} is not registered", handle, slot.prototype);
            return Err(DanmakuError::UnknownPrototype(slot.prototype));
        };

        slot.value.recycle();
        slot.active = false;
        entry.free.push(index);
        self.stats.active -= 1;
        self.stats.free += 1;
        Ok(())
    }

    /// Check that `handle` refers to an active instance of this pool
    ///
    /// Distinguishes handles the pool never issued, handles whose slot has
    /// since been reused, and instances that are currently inactive.
    pub fn check_live(&self, handle: Entity) -> Result<()> {
        let Some(slot) = self.slots.get(handle.id().index()) else {
            log::warn!("{} was not allocated by this pool", handle);
            return Err(DanmakuError::UnknownHandle(handle));
        };
        if slot.generation != handle.generation() {
            log::warn!("{} is stale", handle);
            return Err(DanmakuError::StaleHandle(handle));
        }
        if !slot.active {
            log::warn!("{} is already inactive", handle);
            return Err(DanmakuError::AlreadyInactive(handle));
        }
        Ok(())
    }

    fn live_slot(&self, handle: Entity) -> Option<&Slot<T>> {
        self.slots
            .get(handle.id().index())
            .filter(|s| s.active && s.generation == handle.generation())
    }

    /// Check whether `handle` refers to a currently active instance
    pub fn is_active(&self, handle: Entity) -> bool {
        self.live_slot(handle).is_some()
    }

    /// Prototype an active instance was cloned from
    pub fn prototype_of(&self, handle: Entity) -> Option<PrototypeId> {
        self.live_slot(handle).map(|s| s.prototype)
    }

    /// Get a reference to an active instance
    pub fn get_ref(&self, handle: Entity) -> Option<&T> {
        self.live_slot(handle).map(|s| &s.value)
    }

    /// Get a mutable reference to an active instance
    pub fn get_mut(&mut self, handle: Entity) -> Option<&mut T> {
        self.slots
            .get_mut(handle.id().index())
            .filter(|s| s.active && s.generation == handle.generation())
            .map(|s| &mut s.value)
    }

    /// Iterate over active instances in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (Entity::new(i as u64, s.generation), &s.value))
    }

    /// Iterate mutably over active instances in slot order
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (Entity::new(i as u64, s.generation), &mut s.value))
    }

    /// Handles of all active instances in slot order
    pub fn active_handles(&self) -> Vec<Entity> {
        self.iter_active().map(|(handle, _)| handle).collect()
    }

    /// Number of active instances
    pub fn active_count(&self) -> usize {
        self.stats.active
    }

    /// Number of inactive instances waiting for reuse for one prototype
    pub fn free_count(&self, prototype: PrototypeId) -> usize {
        self.prototypes.get(&prototype).map_or(0, |p| p.free.len())
    }

    /// Total number of slots ever constructed
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        self.stats.clone()
    }
}

#[cfg(feature = "parallel")]
impl<T: Recyclable + Send> ObjectPool<T> {
    /// Parallel mutable iteration over active instances
    pub fn par_iter_active_mut(&mut self) -> impl ParallelIterator<Item = (Entity, &mut T)> {
        self.slots
            .par_iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (Entity::new(i as u64, s.generation), &mut s.value))
    }
}

impl<T: Recyclable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
