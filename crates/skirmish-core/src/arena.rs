//! Arena module for the skirmish simulation.
//!
//! The Arena is the container for all world state. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Entity lifecycle management (spawn/despawn)
//! - Spatial queries (raycast, sphere overlap) over entity colliders
//! - The contact list produced by the last physics pass
//! - The event journal of the last completed tick
//!
//! # Architecture
//!
//! The Arena uses a `BTreeMap` for entity storage to ensure deterministic
//! iteration order. Entity IDs are monotonically increasing and never reused,
//! and the `BTreeMap`'s natural ordering guarantees consistent iteration
//! across platforms. Spatial queries are full scans in ID order, so ties are
//! always broken towards the lower ID.
//!
//! # Frames
//!
//! The simulation clones the current arena into the next one and calls
//! [`Arena::begin_frame`] on the copy before resolvers run. That clears the
//! per-tick data (contacts, events, input edges) while keeping everything
//! persistent.
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::entity::{EntityInner, ObstacleComponents, PlayerComponents};
//! use skirmish_core::entity::CollisionLayers;
//! use skirmish_core::geometry::Ray;
//! use glam::Vec3;
//!
//! let mut arena = Arena::new();
//! let wall = arena.spawn(EntityInner::Obstacle(ObstacleComponents::wall(
//!     Vec3::new(0.0, 1.0, 10.0),
//!     Vec3::new(5.0, 1.0, 0.5),
//! )));
//!
//! let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z).unwrap();
//! let hit = arena.raycast(&ray, 100.0, CollisionLayers::SIGHT, None).unwrap();
//! assert_eq!(hit.entity, wall);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{CollisionLayers, Entity, EntityId, EntityInner};
use crate::geometry::{Ray, WorldShape};
use crate::output::Event;

/// Default fixed timestep (60 Hz).
pub const FIXED_DT: f32 = 1.0 / 60.0;

// =============================================================================
// Contacts & Hits
// =============================================================================

/// A collision that began during the last physics pass.
///
/// The pair is stored with the lower ID first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Contact {
    /// Lower entity ID of the pair
    pub a: EntityId,
    /// Higher entity ID of the pair
    pub b: EntityId,
}

impl Contact {
    /// Creates a contact, ordering the pair.
    #[must_use]
    pub fn new(first: EntityId, second: EntityId) -> Self {
        Self {
            a: first.min(second),
            b: first.max(second),
        }
    }

    /// Returns true if `id` is part of this contact.
    #[must_use]
    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }

    /// Returns the partner of `id`, if `id` is part of this contact.
    #[must_use]
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Result of a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entity whose collider was hit
    pub entity: EntityId,
    /// Distance along the ray
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

// =============================================================================
// Arena
// =============================================================================

/// Container for all entities and per-tick world data.
///
/// # Example
///
/// ```
/// use skirmish_core::arena::Arena;
/// use skirmish_core::entity::{EntityInner, PlayerComponents};
/// use glam::Vec3;
///
/// let mut arena = Arena::new();
/// let first = arena.spawn(EntityInner::Player(PlayerComponents::at_position(Vec3::ZERO)));
/// let second = arena.spawn(EntityInner::Player(PlayerComponents::at_position(Vec3::X)));
///
/// let ids: Vec<_> = arena.entity_ids_sorted().collect();
/// assert_eq!(ids, vec![first, second]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Current simulation tick.
    tick: u64,
    /// Fixed timestep in seconds.
    dt: f32,
    /// Contacts that began during the last physics pass.
    contacts: Vec<Contact>,
    /// Pairs overlapping after the last physics pass.
    touching: BTreeSet<Contact>,
    /// Events of the last completed tick, in resolution order.
    events: Vec<Event>,
}

impl Arena {
    /// Creates a new empty arena at tick 0 with the default timestep.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dt(FIXED_DT)
    }

    /// Creates a new empty arena with a custom timestep.
    #[must_use]
    pub fn with_dt(dt: f32) -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            tick: 0,
            dt,
            contacts: Vec::new(),
            touching: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    /// Spawns a new entity and returns its freshly assigned ID.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::new(id, inner));
        id
    }

    /// Despawns an entity, returning it if it existed.
    ///
    /// Any overlap pairs involving the entity are forgotten.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.touching.retain(|pair| !pair.involves(id));
        self.entities.remove(&id)
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns true if the entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over mutable entities in deterministic order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Fixed timestep in seconds.
    #[must_use]
    pub const fn dt(&self) -> f32 {
        self.dt
    }

    /// Simulation time in seconds at the current tick.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self) -> f32 {
        self.tick as f32 * self.dt
    }

    // -------------------------------------------------------------------------
    // Per-tick data
    // -------------------------------------------------------------------------

    /// Clears contacts, events, and input edges for a new tick.
    pub fn begin_frame(&mut self) {
        self.contacts.clear();
        self.events.clear();
        for entity in self.entities.values_mut() {
            if let Some(player) = entity.as_player_mut() {
                player.controller.clear_edges();
            }
        }
    }

    /// Contacts that began during the last physics pass.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Partners of `id` among the last pass's new contacts, sorted by ID.
    #[must_use]
    pub fn contacts_for(&self, id: EntityId) -> Vec<EntityId> {
        let mut partners: Vec<_> = self.contacts.iter().filter_map(|c| c.other(id)).collect();
        partners.sort_unstable();
        partners
    }

    /// Replaces the overlap set, recording pairs that were not overlapping
    /// before as new contacts.
    pub fn update_touching(&mut self, overlapping: BTreeSet<Contact>) {
        self.contacts = overlapping.difference(&self.touching).copied().collect();
        self.touching = overlapping;
    }

    /// Appends an event to the journal.
    pub fn record_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events of the last completed tick.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // -------------------------------------------------------------------------
    // Spatial queries
    // -------------------------------------------------------------------------

    /// Placed shape of an entity's collider.
    #[must_use]
    pub fn world_shape(&self, id: EntityId) -> Option<(CollisionLayers, WorldShape)> {
        let entity = self.entities.get(&id)?;
        Self::shape_of(entity)
    }

    fn shape_of(entity: &Entity) -> Option<(CollisionLayers, WorldShape)> {
        let collider = entity.collider()?;
        Some((
            collider.layer,
            WorldShape::of(collider, entity.transform().position),
        ))
    }

    /// Casts a ray against all colliders on `mask`, returning the nearest hit
    /// within `max_distance`. Colliders the ray starts inside are ignored.
    #[must_use]
    pub fn raycast(
        &self,
        ray: &Ray,
        max_distance: f32,
        mask: CollisionLayers,
        exclude: Option<EntityId>,
    ) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for entity in self.entities.values() {
            if Some(entity.id()) == exclude {
                continue;
            }
            let Some((layer, shape)) = Self::shape_of(entity) else {
                continue;
            };
            if !mask.intersects(layer) {
                continue;
            }
            let Some(distance) = shape.raycast(ray) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if best.map_or(true, |hit| distance < hit.distance) {
                best = Some(RayHit {
                    entity: entity.id(),
                    distance,
                    point: ray.at(distance),
                });
            }
        }
        best
    }

    /// Entities on `mask` whose colliders strictly overlap the sphere, sorted by ID.
    #[must_use]
    pub fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: CollisionLayers,
        exclude: Option<EntityId>,
    ) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| Some(entity.id()) != exclude)
            .filter_map(|entity| {
                let (layer, shape) = Self::shape_of(entity)?;
                (mask.intersects(layer) && shape.overlaps_sphere(center, radius))
                    .then_some(entity.id())
            })
            .collect()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
