//! Locomotion plugin for the player body.
//!
//! Each tick the held move axes become a horizontal velocity relative to the
//! player's facing, a small sphere at the feet probes for ground, and a jump
//! press while grounded adds an upward impulse.
//!
//! # Outputs
//!
//! - `Command::SetVelocity`: horizontal walk velocity, vertical velocity kept
//! - `Command::SetGrounded`: when the probe result changes
//! - `Command::ApplyImpulse`: on a grounded jump

use glam::Vec3;
use tracing::debug;

use crate::entity::{CollisionLayers, EntityTag};
use crate::input::InputEdges;
use crate::output::{Command, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Plugin that walks and jumps the player.
///
/// # Example
///
/// ```
/// use skirmish_core::plugins::LocomotionPlugin;
/// use skirmish_core::plugin::Plugin;
///
/// let plugin = LocomotionPlugin::new();
/// assert_eq!(plugin.declaration().id.as_str(), "locomotion");
/// ```
pub struct LocomotionPlugin {
    declaration: PluginDeclaration,
}

impl LocomotionPlugin {
    /// Creates a new `LocomotionPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("locomotion"),
                required_tags: vec![EntityTag::Player],
                reads: vec![ComponentKind::Player],
                emits: vec![OutputKind::Command],
            },
        }
    }
}

impl Default for LocomotionPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LocomotionPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let Some(player) = view.get_player(ctx.entity_id) else {
            return vec![];
        };
        let mut outputs: Vec<Output> = Vec::with_capacity(3);
        let config = &player.locomotion;

        let axes = player.controller.move_input;
        let direction = (player.transform.right() * axes.x
            + player.transform.flat_forward() * axes.y)
            .normalize_or_zero();
        let walk = direction * config.move_speed;
        outputs.push(
            Command::SetVelocity {
                target: ctx.entity_id,
                velocity: Vec3::new(walk.x, player.body.velocity.y, walk.z),
            }
            .into(),
        );

        let grounded = !view
            .overlap_sphere(
                player.feet_position(),
                config.ground_distance,
                CollisionLayers::GROUND,
                Some(ctx.entity_id),
            )
            .is_empty();
        if grounded != player.grounded {
            outputs.push(
                Command::SetGrounded {
                    target: ctx.entity_id,
                    grounded,
                }
                .into(),
            );
        }

        if grounded && player.controller.pressed(InputEdges::JUMP) {
            debug!(player = %ctx.entity_id, "jump");
            outputs.push(
                Command::ApplyImpulse {
                    target: ctx.entity_id,
                    impulse: Vec3::Y * config.jump_force,
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
