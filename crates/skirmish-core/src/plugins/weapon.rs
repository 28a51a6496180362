//! Weapon plugin for the player's held weapon.
//!
//! The `WeaponPlugin` drives [`WeaponState`] from the player's controller:
//! a drop press drops the weapon, a reload press starts a reload, and a held
//! trigger pulls it every tick. The animations are then advanced by one tick
//! and the updated weapon is written back.
//!
//! # Outputs
//!
//! - `Command::DropWeapon`: on a drop press (nothing else runs that tick)
//! - `Command::SpawnProjectile` and `Command::SpawnEffect`: for each round fired
//! - `Command::SetWeapon`: when the weapon state changed
//! - `Event::WeaponFired`, `Event::ReloadStarted`, `Event::ReloadCompleted`
//!
//! [`WeaponState`]: crate::entity::WeaponState

use tracing::debug;

use crate::entity::{EntityTag, ShotOutcome};
use crate::input::InputEdges;
use crate::output::{Command, Event, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Plugin that handles weapon firing and reloading.
///
/// # Example
///
/// ```
/// use skirmish_core::plugins::WeaponPlugin;
/// use skirmish_core::plugin::Plugin;
///
/// let plugin = WeaponPlugin::new();
/// assert_eq!(plugin.declaration().id.as_str(), "weapon");
/// ```
pub struct WeaponPlugin {
    declaration: PluginDeclaration,
}

impl WeaponPlugin {
    /// Creates a new `WeaponPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("weapon"),
                required_tags: vec![EntityTag::Player],
                reads: vec![ComponentKind::Player],
                emits: vec![OutputKind::Command, OutputKind::Event],
            },
        }
    }
}

impl Default for WeaponPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for WeaponPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let mut outputs: Vec<Output> = vec![];
        let shooter = ctx.entity_id;

        let Some(player) = view.get_player(shooter) else {
            return outputs;
        };
        let Some(held) = player.weapon.as_ref() else {
            return outputs;
        };
        let controller = &player.controller;

        if controller.pressed(InputEdges::DROP) {
            outputs.push(Command::DropWeapon { target: shooter }.into());
            return outputs;
        }

        let mut weapon = held.clone();

        if controller.pressed(InputEdges::RELOAD) && weapon.try_reload() {
            debug!(%shooter, ammo = weapon.ammo(), "reload started");
            outputs.push(Event::ReloadStarted { shooter }.into());
        }

        if controller.trigger_held {
            match weapon.shoot(ctx.time) {
                ShotOutcome::Fired => {
                    let spec = weapon.spec();
                    let direction = player.transform.forward();
                    let muzzle = player.eye_position() + direction * spec.muzzle_offset;
                    debug!(%shooter, ammo = weapon.ammo(), "shot fired");
                    outputs.push(
                        Command::SpawnProjectile {
                            source: shooter,
                            origin: muzzle,
                            direction,
                            spec: spec.projectile,
                        }
                        .into(),
                    );
                    outputs.push(
                        Command::SpawnEffect {
                            source: shooter,
                            origin: muzzle,
                            lifetime: spec.flash_lifetime,
                        }
                        .into(),
                    );
                    outputs.push(
                        Event::WeaponFired {
                            shooter,
                            ammo_left: weapon.ammo(),
                        }
                        .into(),
                    );
                }
                ShotOutcome::ReloadStarted => {
                    debug!(%shooter, "magazine empty, reload started");
                    outputs.push(Event::ReloadStarted { shooter }.into());
                }
                ShotOutcome::Reloading | ShotOutcome::CoolingDown => {}
            }
        }

        if weapon.advance(ctx.dt) {
            debug!(%shooter, "reload completed");
            outputs.push(Event::ReloadCompleted { shooter }.into());
        }

        if weapon != *held {
            outputs.push(
                Command::SetWeapon {
                    target: shooter,
                    weapon: Box::new(weapon),
                }
                .into(),
            );
        }

        outputs
    }
}

// =============================================================================
// Tests
// =============================================================================
