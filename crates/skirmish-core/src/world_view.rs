//! A plugin's read-only window onto the frozen arena.
//!
//! Component getters are gated by the `reads` list of the plugin's
//! [`PluginDeclaration`](crate::plugin::PluginDeclaration). Reading an
//! undeclared component panics in debug builds and yields `None` in release
//! builds.
//!
//! Spatial queries (raycasts, overlaps, contacts) only return entity IDs and
//! geometry, so they are always allowed.
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::entity::{EntityTag, EntityInner, PlayerComponents};
//! use skirmish_core::plugin::{PluginDeclaration, PluginId, ComponentKind};
//! use skirmish_core::output::OutputKind;
//! use skirmish_core::world_view::WorldView;
//! use glam::Vec3;
//!
//! let mut arena = Arena::new();
//! let player = arena.spawn(EntityInner::Player(PlayerComponents::at_position(
//!     Vec3::new(1.0, 2.0, 3.0),
//! )));
//!
//! let decl = PluginDeclaration {
//!     id: PluginId::new("probe"),
//!     required_tags: vec![EntityTag::Player],
//!     reads: vec![ComponentKind::Transform],
//!     emits: vec![OutputKind::Command],
//! };
//!
//! let view = WorldView::for_plugin(&arena, &decl, arena.current_tick());
//! assert_eq!(view.get_transform(player).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
//! ```

use glam::Vec3;

use crate::arena::{Arena, RayHit};
use crate::entity::{
    BodyState, CollisionLayers, EffectComponents, EnemyComponents, Entity, EntityId, EntityTag,
    PickupComponents, PlayerComponents, ProjectileComponents, TransformState,
};
use crate::geometry::Ray;
use crate::plugin::{ComponentKind, PluginDeclaration};

// =============================================================================
// WorldView
// =============================================================================

/// Read-only arena access scoped to a set of component kinds.
#[derive(Debug)]
pub struct WorldView<'a> {
    arena: &'a Arena,
    tick: u64,
    allowed_components: &'a [ComponentKind],
}

impl<'a> WorldView<'a> {
    /// View limited to what `decl` reads.
    #[must_use]
    pub fn for_plugin(arena: &'a Arena, decl: &'a PluginDeclaration, tick: u64) -> Self {
        Self {
            arena,
            tick,
            allowed_components: &decl.reads,
        }
    }

    /// Unrestricted view, for tests and tools.
    #[must_use]
    pub fn full_access(arena: &'a Arena, tick: u64) -> Self {
        static ALL_COMPONENTS: &[ComponentKind] = &[
            ComponentKind::Transform,
            ComponentKind::Body,
            ComponentKind::Player,
            ComponentKind::Enemy,
            ComponentKind::Projectile,
            ComponentKind::Pickup,
            ComponentKind::Effect,
        ];

        Self {
            arena,
            tick,
            allowed_components: ALL_COMPONENTS,
        }
    }

    /// Tick the view was taken at.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time of the viewed arena (s).
    #[must_use]
    pub fn time(&self) -> f32 {
        self.arena.time()
    }

    /// Fixed timestep of the viewed arena (s).
    #[must_use]
    pub const fn dt(&self) -> f32 {
        self.arena.dt()
    }

    /// Whole entity, needed to read its tag or collider.
    ///
    /// Entity access is always allowed, for metadata such as ID and tag.
    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&'a Entity> {
        self.arena.get(id)
    }

    /// Returns an entity's transform. Requires `ComponentKind::Transform`.
    #[must_use]
    pub fn get_transform(&self, id: EntityId) -> Option<&'a TransformState> {
        self.check_access(ComponentKind::Transform)?;
        Some(self.arena.get(id)?.transform())
    }

    /// Returns an entity's body. Requires `ComponentKind::Body`.
    #[must_use]
    pub fn get_body(&self, id: EntityId) -> Option<&'a BodyState> {
        self.check_access(ComponentKind::Body)?;
        self.arena.get(id)?.inner().body()
    }

    /// Returns the player components. Requires `ComponentKind::Player`.
    #[must_use]
    pub fn get_player(&self, id: EntityId) -> Option<&'a PlayerComponents> {
        self.check_access(ComponentKind::Player)?;
        self.arena.get(id)?.as_player()
    }

    /// Returns the enemy components. Requires `ComponentKind::Enemy`.
    #[must_use]
    pub fn get_enemy(&self, id: EntityId) -> Option<&'a EnemyComponents> {
        self.check_access(ComponentKind::Enemy)?;
        self.arena.get(id)?.as_enemy()
    }

    /// Returns the projectile components. Requires `ComponentKind::Projectile`.
    #[must_use]
    pub fn get_projectile(&self, id: EntityId) -> Option<&'a ProjectileComponents> {
        self.check_access(ComponentKind::Projectile)?;
        self.arena.get(id)?.as_projectile()
    }

    /// Returns the pickup components. Requires `ComponentKind::Pickup`.
    #[must_use]
    pub fn get_pickup(&self, id: EntityId) -> Option<&'a PickupComponents> {
        self.check_access(ComponentKind::Pickup)?;
        self.arena.get(id)?.as_pickup()
    }

    /// Returns the effect components. Requires `ComponentKind::Effect`.
    #[must_use]
    pub fn get_effect(&self, id: EntityId) -> Option<&'a EffectComponents> {
        self.check_access(ComponentKind::Effect)?;
        self.arena.get(id)?.as_effect()
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Nearest collider on `mask` hit by `ray` within `max_distance`.
    #[must_use]
    pub fn raycast(
        &self,
        ray: &Ray,
        max_distance: f32,
        mask: CollisionLayers,
        exclude: Option<EntityId>,
    ) -> Option<RayHit> {
        self.arena.raycast(ray, max_distance, mask, exclude)
    }

    /// Entities on `mask` overlapping the sphere, sorted by ID.
    #[must_use]
    pub fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: CollisionLayers,
        exclude: Option<EntityId>,
    ) -> Vec<EntityId> {
        self.arena.overlap_sphere(center, radius, mask, exclude)
    }

    /// Entities that began touching `id` during the last physics pass.
    #[must_use]
    pub fn contacts_for(&self, id: EntityId) -> Vec<EntityId> {
        self.arena.contacts_for(id)
    }

    /// Queries for entities with a specific tag, in ID order.
    pub fn query_by_tag(&self, tag: EntityTag) -> impl Iterator<Item = EntityId> + 'a {
        self.arena
            .entities_sorted()
            .filter(move |e| e.tag() == tag)
            .map(Entity::id)
    }

    /// `Some(())` when `kind` was declared. Undeclared reads panic in debug
    /// builds.
    #[allow(clippy::unnecessary_wraps)]
    fn check_access(&self, kind: ComponentKind) -> Option<()> {
        if self.allowed_components.contains(&kind) {
            Some(())
        } else {
            #[cfg(debug_assertions)]
            panic!(
                "WorldView access denied: plugin tried to access {:?} but only declared: {:?}",
                kind, self.allowed_components
            );

            #[cfg(not(debug_assertions))]
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Contact;
    use crate::entity::{EntityInner, ObstacleComponents, WeaponSpec};
    use crate::output::{OutputKind, PluginId};

    fn declaration(reads: Vec<ComponentKind>) -> PluginDeclaration {
        PluginDeclaration {
            id: PluginId::new("test"),
            required_tags: vec![EntityTag::Player],
            reads,
            emits: vec![OutputKind::Command],
        }
    }

    fn arena_with_player_and_pickup() -> (Arena, EntityId, EntityId) {
        let mut arena = Arena::new();
        let player = arena.spawn(EntityInner::Player(PlayerComponents::at_position(Vec3::ZERO)));
        let pickup = arena.spawn(EntityInner::Pickup(PickupComponents::new(
            Vec3::new(0.0, 0.0, 2.0),
            WeaponSpec::default(),
            player,
        )));
        (arena, player, pickup)
    }

    mod access_tests {
        use super::*;

        #[test]
        fn declared_components_are_readable() {
            let (arena, player, pickup) = arena_with_player_and_pickup();
            let decl = declaration(vec![ComponentKind::Player, ComponentKind::Pickup]);
            let view = WorldView::for_plugin(&arena, &decl, 0);

            assert!(view.get_player(player).is_some());
            assert!(view.get_pickup(pickup).is_some());
            // Wrong entity type yields None, not a panic.
            assert!(view.get_player(pickup).is_none());
        }

        #[test]
        fn missing_entity_yields_none() {
            let (arena, _, _) = arena_with_player_and_pickup();
            let view = WorldView::full_access(&arena, 0);
            assert!(view.get_transform(EntityId::new(99)).is_none());
            assert!(view.get_entity(EntityId::new(99)).is_none());
        }

        #[test]
        fn pickups_have_no_body() {
            let (arena, player, pickup) = arena_with_player_and_pickup();
            let view = WorldView::full_access(&arena, 0);
            assert!(view.get_body(player).is_some());
            assert!(view.get_body(pickup).is_none());
        }

        #[test]
        #[cfg(debug_assertions)]
        #[should_panic(expected = "WorldView access denied")]
        fn undeclared_access_panics_in_debug() {
            let (arena, player, _) = arena_with_player_and_pickup();
            let decl = declaration(vec![ComponentKind::Transform]);
            let view = WorldView::for_plugin(&arena, &decl, 0);
            let _ = view.get_enemy(player);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn query_by_tag_filters() {
            let (mut arena, player, _) = arena_with_player_and_pickup();
            arena.spawn(EntityInner::Obstacle(ObstacleComponents::wall(
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::ONE,
            )));
            let view = WorldView::full_access(&arena, 0);
            let players: Vec<_> = view.query_by_tag(EntityTag::Player).collect();
            assert_eq!(players, vec![player]);
            assert_eq!(view.query_by_tag(EntityTag::Obstacle).count(), 1);
        }

        #[test]
        fn raycast_through_view() {
            let (arena, player, pickup) = arena_with_player_and_pickup();
            let decl = declaration(vec![]);
            let view = WorldView::for_plugin(&arena, &decl, 0);
            let ray = Ray::new(Vec3::ZERO, Vec3::Z).unwrap();
            let hit = view
                .raycast(&ray, 3.0, CollisionLayers::SIGHT, Some(player))
                .unwrap();
            assert_eq!(hit.entity, pickup);
        }

        #[test]
        fn contacts_through_view() {
            let (mut arena, player, pickup) = arena_with_player_and_pickup();
            arena.update_touching([Contact::new(player, pickup)].into());
            let view = WorldView::full_access(&arena, 0);
            assert_eq!(view.contacts_for(pickup), vec![player]);
            assert!(view
                .overlap_sphere(Vec3::ZERO, 0.1, CollisionLayers::PLAYER, Some(player))
                .is_empty());
        }
    }
}
