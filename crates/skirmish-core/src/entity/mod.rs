//! Entity module for the Entity-Plugin-Resolver architecture.
//!
//! This module provides the core entity types for the skirmish simulation:
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Type classification for plugin bundle selection
//! - [`EntityInner`]: Type-safe storage for entity-specific components
//! - [`Entity`]: The complete entity container
//!
//! # Architecture
//!
//! - `EntityTag` determines which plugins run on an entity
//! - `EntityInner` provides type-safe component storage
//! - Concrete component structs avoid runtime type checking overhead
//!
//! The stateful behaviour objects (enemy brain, weapon fire control) live in
//! [`enemy`] and [`weapon`]; the plain component structs live in
//! [`components`].
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{Entity, EntityId, EntityInner, EntityTag};
//! use skirmish_core::entity::components::PlayerComponents;
//! use glam::Vec3;
//!
//! let player = Entity::new(
//!     EntityId::new(42),
//!     EntityInner::Player(PlayerComponents::at_position(Vec3::ZERO)),
//! );
//!
//! assert_eq!(player.id().as_u64(), 42);
//! assert_eq!(player.tag(), EntityTag::Player);
//! ```

pub mod components;
pub mod enemy;
pub mod weapon;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    BodyState, ColliderState, CollisionLayers, EffectComponents, EnemyComponents, LocomotionConfig,
    LookConfig, MaterialId, MaterialSlots, NavAgent, ObstacleComponents, PickupComponents,
    PlayerComponents, ProjectileComponents, Shape, TransformState,
};
pub use enemy::{
    Blink, EnemyBrain, EnemyConfig, EnemyState, HitOutcome, NavOrder, PatrolRoute, Perception,
    Vitals,
};
pub use weapon::{ProjectileSpec, ShotOutcome, WeaponPose, WeaponSpec, WeaponState};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Entity IDs are immutable once
/// assigned and unique within an arena.
///
/// # Ordering
///
/// Entity IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all entities.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity type tag for plugin bundle selection.
///
/// `EntityTag` determines which plugins are eligible to run on an entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The first-person player (locomotion, look, held weapon)
    Player,
    /// Patrolling enemy driven by the behaviour state machine
    Enemy,
    /// In-flight bullet
    Projectile,
    /// Weapon lying in the world, waiting to be picked up
    Pickup,
    /// Short-lived visual effect (muzzle flash)
    Effect,
    /// Static level geometry (ground, walls)
    Obstacle,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
            Self::Pickup => write!(f, "Pickup"),
            Self::Effect => write!(f, "Effect"),
            Self::Obstacle => write!(f, "Obstacle"),
        }
    }
}

/// Type-safe storage for entity-specific components.
///
/// Each variant contains the component struct for that entity type. The
/// entity's [`EntityTag`] is always derived from the variant, so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Player components
    Player(PlayerComponents),
    /// Enemy components
    Enemy(EnemyComponents),
    /// Projectile components
    Projectile(ProjectileComponents),
    /// Pickup components
    Pickup(PickupComponents),
    /// Effect components
    Effect(EffectComponents),
    /// Obstacle components
    Obstacle(ObstacleComponents),
}

macro_rules! inner_accessors {
    ($variant:ident, $ty:ty, $as_ref:ident, $as_mut:ident) => {
        /// Returns a reference to the components, if the variant matches.
        #[must_use]
        pub const fn $as_ref(&self) -> Option<&$ty> {
            match self {
                Self::$variant(components) => Some(components),
                _ => None,
            }
        }

        /// Returns a mutable reference to the components, if the variant matches.
        #[must_use]
        pub fn $as_mut(&mut self) -> Option<&mut $ty> {
            match self {
                Self::$variant(components) => Some(components),
                _ => None,
            }
        }
    };
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Player(_) => EntityTag::Player,
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Projectile(_) => EntityTag::Projectile,
            Self::Pickup(_) => EntityTag::Pickup,
            Self::Effect(_) => EntityTag::Effect,
            Self::Obstacle(_) => EntityTag::Obstacle,
        }
    }

    inner_accessors!(Player, PlayerComponents, as_player, as_player_mut);
    inner_accessors!(Enemy, EnemyComponents, as_enemy, as_enemy_mut);
    inner_accessors!(Projectile, ProjectileComponents, as_projectile, as_projectile_mut);
    inner_accessors!(Pickup, PickupComponents, as_pickup, as_pickup_mut);
    inner_accessors!(Effect, EffectComponents, as_effect, as_effect_mut);
    inner_accessors!(Obstacle, ObstacleComponents, as_obstacle, as_obstacle_mut);

    /// Every entity type has a transform.
    #[must_use]
    pub const fn transform(&self) -> &TransformState {
        match self {
            Self::Player(c) => &c.transform,
            Self::Enemy(c) => &c.transform,
            Self::Projectile(c) => &c.transform,
            Self::Pickup(c) => &c.transform,
            Self::Effect(c) => &c.transform,
            Self::Obstacle(c) => &c.transform,
        }
    }

    /// Mutable access to the transform.
    #[must_use]
    pub fn transform_mut(&mut self) -> &mut TransformState {
        match self {
            Self::Player(c) => &mut c.transform,
            Self::Enemy(c) => &mut c.transform,
            Self::Projectile(c) => &mut c.transform,
            Self::Pickup(c) => &mut c.transform,
            Self::Effect(c) => &mut c.transform,
            Self::Obstacle(c) => &mut c.transform,
        }
    }

    /// Returns the body of entity types that move under physics.
    #[must_use]
    pub const fn body(&self) -> Option<&BodyState> {
        match self {
            Self::Player(c) => Some(&c.body),
            Self::Enemy(c) => Some(&c.body),
            Self::Projectile(c) => Some(&c.body),
            Self::Pickup(_) | Self::Effect(_) | Self::Obstacle(_) => None,
        }
    }

    /// Mutable access to the body.
    #[must_use]
    pub fn body_mut(&mut self) -> Option<&mut BodyState> {
        match self {
            Self::Player(c) => Some(&mut c.body),
            Self::Enemy(c) => Some(&mut c.body),
            Self::Projectile(c) => Some(&mut c.body),
            Self::Pickup(_) | Self::Effect(_) | Self::Obstacle(_) => None,
        }
    }

    /// Returns the collider, if this entity type has one. Effects are visual only.
    #[must_use]
    pub const fn collider(&self) -> Option<&ColliderState> {
        match self {
            Self::Player(c) => Some(&c.collider),
            Self::Enemy(c) => Some(&c.collider),
            Self::Projectile(c) => Some(&c.collider),
            Self::Pickup(c) => Some(&c.collider),
            Self::Obstacle(c) => Some(&c.collider),
            Self::Effect(_) => None,
        }
    }
}

/// A complete entity in the simulation.
///
/// # Invariants
///
/// - The `EntityId` must be unique within an arena
/// - The tag always matches the `EntityInner` variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    tag: EntityTag,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity with the given ID and inner storage.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self {
            id,
            tag: inner.tag(),
            inner,
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.tag
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns the player components if this is the player.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerComponents> {
        self.inner.as_player()
    }

    /// Returns mutable player components if this is the player.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerComponents> {
        self.inner.as_player_mut()
    }

    /// Returns the enemy components if this is an enemy.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyComponents> {
        self.inner.as_enemy()
    }

    /// Returns mutable enemy components if this is an enemy.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyComponents> {
        self.inner.as_enemy_mut()
    }

    /// Returns the projectile components if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        self.inner.as_projectile()
    }

    /// Returns the pickup components if this is a pickup.
    #[must_use]
    pub const fn as_pickup(&self) -> Option<&PickupComponents> {
        self.inner.as_pickup()
    }

    /// Returns mutable pickup components if this is a pickup.
    #[must_use]
    pub fn as_pickup_mut(&mut self) -> Option<&mut PickupComponents> {
        self.inner.as_pickup_mut()
    }

    /// Returns the effect components if this is an effect.
    #[must_use]
    pub const fn as_effect(&self) -> Option<&EffectComponents> {
        self.inner.as_effect()
    }

    /// Returns the transform of this entity.
    #[must_use]
    pub const fn transform(&self) -> &TransformState {
        self.inner.transform()
    }

    /// Returns the collider of this entity, if any.
    #[must_use]
    pub const fn collider(&self) -> Option<&ColliderState> {
        self.inner.collider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ordering() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }

        #[test]
        fn debug_and_display_format() {
            let id = EntityId::new(42);
            assert_eq!(format!("{id:?}"), "EntityId(42)");
            assert_eq!(format!("{id}"), "42");
        }

        #[test]
        fn u64_conversions() {
            let id: EntityId = 42u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 42);
        }
    }

    mod entity_inner_tests {
        use super::*;

        #[test]
        fn tag_matches_variant() {
            let player = EntityInner::Player(PlayerComponents::at_position(Vec3::ZERO));
            assert_eq!(player.tag(), EntityTag::Player);

            let wall = EntityInner::Obstacle(ObstacleComponents::wall(Vec3::ZERO, Vec3::ONE));
            assert_eq!(wall.tag(), EntityTag::Obstacle);

            let flash = EntityInner::Effect(EffectComponents::new(Vec3::ZERO, 0.0, 0.05));
            assert_eq!(flash.tag(), EntityTag::Effect);
        }

        #[test]
        fn accessors_reject_other_variants() {
            let mut player = EntityInner::Player(PlayerComponents::at_position(Vec3::ZERO));
            assert!(player.as_player().is_some());
            assert!(player.as_player_mut().is_some());
            assert!(player.as_enemy().is_none());
            assert!(player.as_pickup().is_none());
        }

        #[test]
        fn effects_have_no_collider_or_body() {
            let flash = EntityInner::Effect(EffectComponents::new(Vec3::ZERO, 0.0, 0.05));
            assert!(flash.collider().is_none());
            assert!(flash.body().is_none());
        }

        #[test]
        fn obstacles_have_collider_but_no_body() {
            let ground = EntityInner::Obstacle(ObstacleComponents::ground(
                Vec3::ZERO,
                Vec3::new(10.0, 0.5, 10.0),
            ));
            assert!(ground.collider().is_some());
            assert!(ground.body().is_none());
        }
    }

    #[test]
    fn entity_tag_derives_from_inner() {
        let entity = Entity::new(
            EntityId::new(7),
            EntityInner::Player(PlayerComponents::at_position(Vec3::ZERO)),
        );
        assert_eq!(entity.tag(), EntityTag::Player);
        assert!(entity.as_player().is_some());
        assert!(entity.as_enemy().is_none());
    }

    #[test]
    fn entity_serialization_roundtrip() {
        let entity = Entity::new(
            EntityId::new(3),
            EntityInner::Player(PlayerComponents::at_position(Vec3::new(1.0, 2.0, 3.0))),
        );
        let json = serde_json::to_string(&entity).unwrap();
        let back: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(entity, back);
    }

    #[test]
    fn tag_display() {
        assert_eq!(EntityTag::Enemy.to_string(), "Enemy");
        assert_eq!(EntityTag::Pickup.to_string(), "Pickup");
    }
}
