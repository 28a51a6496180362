//! Pickup plugin: look-ray highlight and interaction.
//!
//! Each pickup casts the player's look ray (eye position, camera forward,
//! limited to the pickup's look range) and is "looked at" when the nearest
//! sight-blocking collider it hits is the pickup itself. The highlight follows
//! that result, and an interact press while looked at equips the weapon.

use tracing::debug;

use crate::entity::{CollisionLayers, EntityTag};
use crate::geometry::Ray;
use crate::input::InputEdges;
use crate::output::{Command, Event, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Plugin that highlights pickups under the crosshair and hands them over.
///
/// # Example
///
/// ```
/// use skirmish_core::plugins::PickupPlugin;
/// use skirmish_core::plugin::{ComponentKind, Plugin};
///
/// let plugin = PickupPlugin::new();
/// assert!(plugin.declaration().reads_component(ComponentKind::Player));
/// ```
pub struct PickupPlugin {
    declaration: PluginDeclaration,
}

impl PickupPlugin {
    /// Creates a new `PickupPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("pickup"),
                required_tags: vec![EntityTag::Pickup],
                reads: vec![ComponentKind::Pickup, ComponentKind::Player],
                emits: vec![OutputKind::Command, OutputKind::Event],
            },
        }
    }
}

impl Default for PickupPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PickupPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let pickup = ctx.entity_id;
        let Some(components) = view.get_pickup(pickup) else {
            return vec![];
        };
        let Some(player) = view.get_player(components.player) else {
            return vec![];
        };

        let looked_at = Ray::new(player.eye_position(), player.transform.forward())
            .and_then(|ray| {
                view.raycast(
                    &ray,
                    components.look_range,
                    CollisionLayers::SIGHT,
                    Some(components.player),
                )
            })
            .is_some_and(|hit| hit.entity == pickup);

        let mut outputs: Vec<Output> = vec![];
        if looked_at != components.highlighted {
            outputs.push(
                Command::SetHighlight {
                    target: pickup,
                    highlighted: looked_at,
                }
                .into(),
            );
            outputs.push(
                Event::PickupHighlighted {
                    pickup,
                    highlighted: looked_at,
                }
                .into(),
            );
        }

        // The highlight being committed this tick is `looked_at`; the stored
        // flag is a tick behind the player's view.
        if looked_at && player.controller.pressed(InputEdges::INTERACT) {
            debug!(%pickup, weapon = %components.weapon.name, "interact");
            outputs.push(
                Command::EquipWeapon {
                    target: components.player,
                    pickup,
                    spec: Box::new(components.weapon.clone()),
                }
                .into(),
            );
        }

        outputs
    }
}
