//! State resolver for plugin-owned component state.
//!
//! Several plugins advance state that lives on their own entity: the enemy
//! brain and hit flash, the player's weapon and ground flag, the pickup
//! highlight. The plugin computes the new value from the snapshot and the
//! `StateResolver` stores it in the next arena.
//!
//! Handled commands: `SetGrounded`, `SetBrain`, `SetBlink`, `SetWeapon`,
//! `SetHighlight`. Last write wins.

use tracing::warn;

use crate::arena::Arena;
use crate::entity::{Blink, EnemyBrain, EntityId, WeaponState};
use crate::output::{Command, OutputEnvelope, OutputKind};

use super::Resolver;

/// Resolver that stores plugin-computed component state.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{Resolver, StateResolver};
/// use skirmish_core::output::OutputKind;
///
/// let resolver = StateResolver::new();
/// assert_eq!(resolver.handles(), &[OutputKind::Command]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateResolver;

impl StateResolver {
    /// Creates a new state resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn set_grounded(next: &mut Arena, target: EntityId, grounded: bool) {
        match next.get_mut(target).and_then(|e| e.as_player_mut()) {
            Some(player) => player.grounded = grounded,
            None => warn!(%target, "SetGrounded for missing player"),
        }
    }

    fn set_brain(next: &mut Arena, target: EntityId, brain: &EnemyBrain) {
        match next.get_mut(target).and_then(|e| e.as_enemy_mut()) {
            Some(enemy) => enemy.brain = brain.clone(),
            None => warn!(%target, "SetBrain for missing enemy"),
        }
    }

    fn set_blink(next: &mut Arena, target: EntityId, blink: Option<Blink>) {
        let Some(enemy) = next.get_mut(target).and_then(|e| e.as_enemy_mut()) else {
            warn!(%target, "SetBlink for missing enemy");
            return;
        };
        enemy.blink = blink;
        if blink.is_none() {
            enemy.materials.restore();
        }
    }

    fn set_weapon(next: &mut Arena, target: EntityId, weapon: &WeaponState) {
        match next.get_mut(target).and_then(|e| e.as_player_mut()) {
            Some(player) => player.weapon = Some(weapon.clone()),
            None => warn!(%target, "SetWeapon for missing player"),
        }
    }

    fn set_highlight(next: &mut Arena, target: EntityId, highlighted: bool) {
        match next.get_mut(target).and_then(|e| e.as_pickup_mut()) {
            Some(pickup) => pickup.set_highlighted(highlighted),
            None => warn!(%target, "SetHighlight for missing pickup"),
        }
    }
}

impl Resolver for StateResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], _current: &Arena, next: &mut Arena) {
        for envelope in outputs {
            let Some(command) = envelope.output().as_command() else {
                continue;
            };
            match command {
                Command::SetGrounded { target, grounded } => {
                    Self::set_grounded(next, *target, *grounded);
                }
                Command::SetBrain { target, brain } => Self::set_brain(next, *target, brain),
                Command::SetBlink { target, blink } => Self::set_blink(next, *target, *blink),
                Command::SetWeapon { target, weapon } => Self::set_weapon(next, *target, weapon),
                Command::SetHighlight {
                    target,
                    highlighted,
                } => Self::set_highlight(next, *target, *highlighted),
                // Motion belongs to physics, spawning to lifecycle
                Command::SetVelocity { .. }
                | Command::ApplyImpulse { .. }
                | Command::SetOrientation { .. }
                | Command::Navigate { .. }
                | Command::SpawnProjectile { .. }
                | Command::SpawnEffect { .. }
                | Command::EquipWeapon { .. }
                | Command::DropWeapon { .. }
                | Command::Despawn { .. } => {}
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
