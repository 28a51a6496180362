//! Test helper functions for setting up simulations and entities.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::Vec3;

use crate::arena::Arena;
use crate::entity::{
    EnemyComponents, EnemyConfig, EnemyState, EntityId, EntityInner, EntityTag, ObstacleComponents,
    PickupComponents, PlayerComponents, WeaponSpec,
};
use crate::input::InputAction;
use crate::output::Event;
use crate::simulation::Simulation;

/// Player body centre when standing on the test ground.
pub const STANDING: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// Height of the player's eye (and so the bullet line) above the ground.
pub const EYE_LEVEL: f32 = 1.1;

// =============================================================================
// Spawning
// =============================================================================

/// Spawns a 60 m square ground slab whose top face is at y = 0.
pub fn spawn_ground(arena: &mut Arena) -> EntityId {
    arena.spawn(EntityInner::Obstacle(ObstacleComponents::ground(
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(30.0, 0.5, 30.0),
    )))
}

/// Spawns a wall box.
pub fn spawn_wall(arena: &mut Arena, center: Vec3, half_extents: Vec3) -> EntityId {
    arena.spawn(EntityInner::Obstacle(ObstacleComponents::wall(
        center,
        half_extents,
    )))
}

/// Spawns a player holding the default rifle, facing +Z.
pub fn spawn_player(arena: &mut Arena, position: Vec3) -> EntityId {
    spawn_player_with(arena, position, WeaponSpec::default())
}

/// Spawns a player holding `weapon`, facing +Z.
pub fn spawn_player_with(arena: &mut Arena, position: Vec3, weapon: WeaponSpec) -> EntityId {
    arena.spawn(EntityInner::Player(
        PlayerComponents::at_position(position).with_weapon(weapon),
    ))
}

/// Spawns an enemy with default tunables.
pub fn spawn_enemy(
    arena: &mut Arena,
    position: Vec3,
    route: Vec<Vec3>,
    player: Option<EntityId>,
) -> EntityId {
    arena.spawn(EntityInner::Enemy(EnemyComponents::new(
        position,
        route,
        EnemyConfig::default(),
        player,
    )))
}

/// Spawns an enemy with no player to track, floating so that its centre is
/// on the bullet line `distance` metres in front of the origin.
pub fn spawn_target(arena: &mut Arena, distance: f32) -> EntityId {
    spawn_enemy(arena, Vec3::new(0.0, EYE_LEVEL, distance), vec![], None)
}

/// Spawns a pickup granting `weapon`, watched by `player`.
pub fn spawn_pickup(
    arena: &mut Arena,
    position: Vec3,
    weapon: WeaponSpec,
    player: EntityId,
) -> EntityId {
    arena.spawn(EntityInner::Pickup(PickupComponents::new(
        position, weapon, player,
    )))
}

/// A pistol spec that differs from the default rifle.
pub fn pistol() -> WeaponSpec {
    WeaponSpec {
        name: "pistol".to_string(),
        capacity: 8,
        ..WeaponSpec::default()
    }
}

/// Sets up ground and an armed player standing at the origin.
///
/// # Returns
///
/// A tuple of (simulation, player).
pub fn setup_range(seed: u64) -> (Simulation, EntityId) {
    let mut sim = Simulation::new(seed);
    spawn_ground(sim.arena_mut());
    let player = spawn_player(sim.arena_mut(), STANDING);
    (sim, player)
}

// =============================================================================
// Driving
// =============================================================================

/// Steps `ticks` times, returning every event produced along the way.
pub fn run_collecting(sim: &mut Simulation, ticks: u64) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        sim.step();
        events.extend_from_slice(sim.events());
    }
    events
}

/// Queues `inputs` for `player`, steps once, and returns the tick's events.
pub fn step_with(sim: &mut Simulation, player: EntityId, inputs: &[InputAction]) -> Vec<Event> {
    for input in inputs {
        sim.queue_input(player, *input);
    }
    sim.step();
    sim.events().to_vec()
}

/// Fires a single round: press for one tick, release, then let it fly.
pub fn fire_once(sim: &mut Simulation, player: EntityId, flight_ticks: u64) -> Vec<Event> {
    let mut events = step_with(sim, player, &[InputAction::ShootPressed]);
    events.extend(step_with(sim, player, &[InputAction::ShootReleased]));
    events.extend(run_collecting(sim, flight_ticks));
    events
}

// =============================================================================
// Inspection
// =============================================================================

/// Returns an enemy's health, or 0 if it does not exist.
pub fn get_health(arena: &Arena, id: EntityId) -> i32 {
    arena
        .get(id)
        .and_then(|e| e.as_enemy())
        .map_or(0, |enemy| enemy.vitals.health)
}

/// Returns whether an enemy exists and is alive.
pub fn is_alive(arena: &Arena, id: EntityId) -> bool {
    arena
        .get(id)
        .and_then(|e| e.as_enemy())
        .is_some_and(|enemy| enemy.vitals.alive)
}

/// Returns an enemy's behaviour state.
pub fn get_state(arena: &Arena, id: EntityId) -> Option<EnemyState> {
    arena
        .get(id)
        .and_then(|e| e.as_enemy())
        .map(|enemy| enemy.brain.state)
}

/// Returns the ammo of the player's held weapon.
pub fn get_ammo(arena: &Arena, player: EntityId) -> Option<u32> {
    arena
        .get(player)
        .and_then(|e| e.as_player())
        .and_then(|p| p.weapon.as_ref())
        .map(crate::entity::WeaponState::ammo)
}

/// Returns the name of the player's held weapon.
pub fn held_weapon(arena: &Arena, player: EntityId) -> Option<String> {
    arena
        .get(player)
        .and_then(|e| e.as_player())
        .and_then(|p| p.weapon.as_ref())
        .map(|w| w.spec().name.clone())
}

/// Returns an entity's position.
pub fn get_position(arena: &Arena, id: EntityId) -> Option<Vec3> {
    arena.get(id).map(|e| e.transform().position)
}

/// Counts live entities with `tag`.
pub fn count_tagged(arena: &Arena, tag: EntityTag) -> usize {
    arena.entities_sorted().filter(|e| e.tag() == tag).count()
}

/// Counts events matching `predicate`.
pub fn count_events(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| predicate(e)).count()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_range_has_ground_and_armed_player() {
        let (sim, player) = setup_range(1);
        assert_eq!(sim.arena().entity_count(), 2);
        assert_eq!(get_ammo(sim.arena(), player), Some(20));
        assert_eq!(held_weapon(sim.arena(), player).as_deref(), Some("rifle"));
    }

    #[test]
    fn player_rests_on_ground() {
        let (mut sim, player) = setup_range(1);
        sim.run(120);
        let position = get_position(sim.arena(), player).unwrap();
        assert!((position.y - STANDING.y).abs() < 0.05, "y = {}", position.y);
    }

    #[test]
    fn target_starts_alive_and_idle() {
        let (mut sim, _) = setup_range(1);
        let target = spawn_target(sim.arena_mut(), 6.0);
        assert!(is_alive(sim.arena(), target));
        assert_eq!(get_health(sim.arena(), target), 100);
        assert_eq!(get_state(sim.arena(), target), Some(EnemyState::Idle));
    }
}
