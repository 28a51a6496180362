//! Lifecycle resolver for entity creation and removal.
//!
//! The `LifecycleResolver` handles:
//! - `SpawnProjectile`: launch a bullet from the muzzle
//! - `SpawnEffect`: create a muzzle flash
//! - `EquipWeapon`: consume a pickup, dropping the held weapon first
//! - `DropWeapon`: turn the held weapon into a pickup in front of the player
//! - `Despawn`: remove an entity
//!
//! New entities take their spawn time from the arena clock of the tick that
//! created them.

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::arena::Arena;
use crate::entity::{
    EffectComponents, EntityId, EntityInner, PickupComponents, ProjectileComponents,
    ProjectileSpec, WeaponSpec, WeaponState,
};
use crate::output::{Command, Event, OutputEnvelope, OutputKind};

use super::Resolver;

/// Distance in front of the player at which a dropped weapon lands (m).
pub const DROP_DISTANCE: f32 = 1.0;

/// Resolver for spawning, despawning and weapon swaps.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{LifecycleResolver, Resolver};
/// use skirmish_core::output::OutputKind;
///
/// let resolver = LifecycleResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Command));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LifecycleResolver;

impl LifecycleResolver {
    /// Creates a new lifecycle resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn spawn_projectile(
        next: &mut Arena,
        source: EntityId,
        origin: Vec3,
        direction: Vec3,
        spec: &ProjectileSpec,
    ) {
        let now = next.time();
        let id = next.spawn(EntityInner::Projectile(ProjectileComponents::launched(
            source, origin, direction, spec, now,
        )));
        debug!(projectile = %id, shooter = %source, "projectile spawned");
    }

    fn spawn_effect(next: &mut Arena, origin: Vec3, lifetime: f32) {
        let now = next.time();
        next.spawn(EntityInner::Effect(EffectComponents::new(
            origin, now, lifetime,
        )));
    }

    /// Removes the player's weapon and leaves it as a pickup in front of them.
    ///
    /// Returns the new pickup, or `None` if the player was unarmed.
    fn drop_held(next: &mut Arena, player: EntityId) -> Option<EntityId> {
        let holder = next.get_mut(player)?.as_player_mut()?;
        let weapon = holder.weapon.take()?;
        let position = holder.transform.position + holder.transform.flat_forward() * DROP_DISTANCE;

        let spec = weapon.spec().clone();
        let name = spec.name.clone();
        let pickup = next.spawn(EntityInner::Pickup(PickupComponents::new(
            position, spec, player,
        )));
        info!(%player, %pickup, weapon = %name, "weapon dropped");
        next.record_event(Event::WeaponDropped {
            player,
            weapon: name,
            pickup,
        });
        Some(pickup)
    }

    fn drop_weapon(next: &mut Arena, target: EntityId) {
        if next.get(target).and_then(|e| e.as_player()).is_none() {
            warn!(%target, "DropWeapon for missing player");
            return;
        }
        if Self::drop_held(next, target).is_none() {
            debug!(player = %target, "drop ignored, no weapon held");
        }
    }

    fn equip_weapon(next: &mut Arena, target: EntityId, pickup: EntityId, spec: &WeaponSpec) {
        if next.get(target).and_then(|e| e.as_player()).is_none() {
            warn!(%target, "EquipWeapon for missing player");
            return;
        }
        if next.despawn(pickup).is_none() {
            warn!(%pickup, "EquipWeapon for missing pickup");
            return;
        }

        Self::drop_held(next, target);
        if let Some(player) = next.get_mut(target).and_then(|e| e.as_player_mut()) {
            player.weapon = Some(WeaponState::new(spec.clone()));
        }
        info!(player = %target, weapon = %spec.name, "weapon equipped");
        next.record_event(Event::WeaponEquipped {
            player: target,
            weapon: spec.name.clone(),
        });
    }

    fn despawn(next: &mut Arena, target: EntityId) {
        if next.despawn(target).is_none() {
            warn!(%target, "Despawn for missing entity");
        }
    }
}

impl Resolver for LifecycleResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], _current: &Arena, next: &mut Arena) {
        for envelope in outputs {
            let Some(command) = envelope.output().as_command() else {
                continue;
            };
            match command {
                Command::SpawnProjectile {
                    source,
                    origin,
                    direction,
                    spec,
                } => Self::spawn_projectile(next, *source, *origin, *direction, spec),
                Command::SpawnEffect {
                    origin, lifetime, ..
                } => Self::spawn_effect(next, *origin, *lifetime),
                Command::EquipWeapon {
                    target,
                    pickup,
                    spec,
                } => Self::equip_weapon(next, *target, *pickup, spec),
                Command::DropWeapon { target } => Self::drop_weapon(next, *target),
                Command::Despawn { target } => Self::despawn(next, *target),
                Command::SetVelocity { .. }
                | Command::ApplyImpulse { .. }
                | Command::SetOrientation { .. }
                | Command::Navigate { .. }
                | Command::SetGrounded { .. }
                | Command::SetBrain { .. }
                | Command::SetBlink { .. }
                | Command::SetWeapon { .. }
                | Command::SetHighlight { .. } => {}
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityTag, PlayerComponents};
    use crate::output::{Output, PluginId, PluginInstanceId, TraceId};

    fn run(arena: &mut Arena, commands: Vec<Command>) {
        let envelopes: Vec<_> = commands
            .into_iter()
            .enumerate()
            .map(|(seq, c)| {
                OutputEnvelope::new(
                    Output::Command(c),
                    PluginInstanceId::new(EntityId::new(0), PluginId::new("test")),
                    TraceId::new(0),
                    0,
                    u32::try_from(seq).unwrap(),
                )
            })
            .collect();
        let refs: Vec<_> = envelopes.iter().collect();
        let current = arena.clone();
        LifecycleResolver::new().resolve(&refs, &current, arena);
    }

    fn armed_player(arena: &mut Arena) -> EntityId {
        arena.spawn(EntityInner::Player(
            PlayerComponents::at_position(Vec3::ZERO).with_weapon(WeaponSpec::default()),
        ))
    }

    fn count(arena: &Arena, tag: EntityTag) -> usize {
        arena.entities_sorted().filter(|e| e.tag() == tag).count()
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn projectile_and_effect_spawn_at_muzzle() {
            let mut arena = Arena::new();
            let player = armed_player(&mut arena);
            let muzzle = Vec3::new(0.0, 0.6, 0.8);

            run(
                &mut arena,
                vec![
                    Command::SpawnProjectile {
                        source: player,
                        origin: muzzle,
                        direction: Vec3::Z,
                        spec: ProjectileSpec::default(),
                    },
                    Command::SpawnEffect {
                        source: player,
                        origin: muzzle,
                        lifetime: 0.05,
                    },
                ],
            );

            assert_eq!(count(&arena, EntityTag::Projectile), 1);
            assert_eq!(count(&arena, EntityTag::Effect), 1);
            let projectile = arena
                .entities_sorted()
                .find_map(|e| e.as_projectile())
                .unwrap();
            assert_eq!(projectile.owner, player);
            assert_eq!(projectile.transform.position, muzzle);
            assert!((projectile.body.velocity - Vec3::Z * 15.0).length() < 1e-5);
        }

        #[test]
        fn despawn_removes_and_tolerates_missing() {
            let mut arena = Arena::new();
            let player = armed_player(&mut arena);
            run(
                &mut arena,
                vec![
                    Command::Despawn { target: player },
                    Command::Despawn { target: player },
                ],
            );
            assert!(arena.is_empty());
        }
    }

    mod weapon_swap_tests {
        use super::*;

        #[test]
        fn drop_leaves_pickup_in_front() {
            let mut arena = Arena::new();
            let player = armed_player(&mut arena);

            run(&mut arena, vec![Command::DropWeapon { target: player }]);

            assert!(arena.get(player).unwrap().as_player().unwrap().weapon.is_none());
            let pickup = arena.entities_sorted().find_map(|e| e.as_pickup()).unwrap();
            assert_eq!(pickup.transform.position, Vec3::new(0.0, 0.0, DROP_DISTANCE));
            assert_eq!(pickup.weapon.name, "rifle");
            assert!(matches!(
                arena.events(),
                [Event::WeaponDropped { weapon, .. }] if weapon == "rifle"
            ));
        }

        #[test]
        fn drop_while_unarmed_is_ignored() {
            let mut arena = Arena::new();
            let player = arena.spawn(EntityInner::Player(PlayerComponents::at_position(Vec3::ZERO)));
            run(&mut arena, vec![Command::DropWeapon { target: player }]);
            assert_eq!(arena.entity_count(), 1);
            assert!(arena.events().is_empty());
        }

        #[test]
        fn equip_swaps_and_consumes_pickup() {
            let mut arena = Arena::new();
            let player = armed_player(&mut arena);
            let shotgun = WeaponSpec {
                name: "shotgun".into(),
                capacity: 6,
                ..WeaponSpec::default()
            };
            let pickup = arena.spawn(EntityInner::Pickup(PickupComponents::new(
                Vec3::new(0.0, 0.6, 2.0),
                shotgun.clone(),
                player,
            )));

            run(
                &mut arena,
                vec![Command::EquipWeapon {
                    target: player,
                    pickup,
                    spec: Box::new(shotgun),
                }],
            );

            assert!(!arena.contains(pickup));
            let held = arena.get(player).unwrap().as_player().unwrap();
            let weapon = held.weapon.as_ref().unwrap();
            assert_eq!(weapon.spec().name, "shotgun");
            assert_eq!(weapon.ammo(), 6);

            // The rifle is now lying on the floor as the only pickup.
            assert_eq!(count(&arena, EntityTag::Pickup), 1);
            let dropped = arena.entities_sorted().find_map(|e| e.as_pickup()).unwrap();
            assert_eq!(dropped.weapon.name, "rifle");

            assert!(matches!(
                arena.events(),
                [Event::WeaponDropped { .. }, Event::WeaponEquipped { weapon, .. }]
                    if weapon == "shotgun"
            ));
        }

        #[test]
        fn equip_from_consumed_pickup_is_ignored() {
            let mut arena = Arena::new();
            let player = armed_player(&mut arena);

            run(
                &mut arena,
                vec![Command::EquipWeapon {
                    target: player,
                    pickup: EntityId::new(77),
                    spec: Box::new(WeaponSpec::default()),
                }],
            );

            assert_eq!(arena.entity_count(), 1);
            assert!(arena.events().is_empty());
        }
    }
}
