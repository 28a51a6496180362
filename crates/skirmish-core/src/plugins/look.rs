//! Look plugin: turns the player body and pitches the camera.
//!
//! The held look axes are scaled by `sensitivity * dt`. Yaw follows `x`
//! without limit, pitch follows `-y` and is clamped to ±90°.

use crate::entity::EntityTag;
use crate::output::{Command, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Camera pitch limit in degrees.
pub const PITCH_LIMIT: f32 = 90.0;

/// Plugin that applies look input.
///
/// # Example
///
/// ```
/// use skirmish_core::plugins::LookPlugin;
/// use skirmish_core::plugin::Plugin;
///
/// let plugin = LookPlugin::new();
/// assert_eq!(plugin.declaration().id.as_str(), "look");
/// ```
pub struct LookPlugin {
    declaration: PluginDeclaration,
}

impl LookPlugin {
    /// Creates a new `LookPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("look"),
                required_tags: vec![EntityTag::Player],
                reads: vec![ComponentKind::Player],
                emits: vec![OutputKind::Command],
            },
        }
    }
}

impl Default for LookPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LookPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let Some(player) = view.get_player(ctx.entity_id) else {
            return vec![];
        };

        let delta = player.controller.look_input * player.look.sensitivity * ctx.dt;
        if delta.x == 0.0 && delta.y == 0.0 {
            return vec![];
        }

        let transform = &player.transform;
        vec![Command::SetOrientation {
            target: ctx.entity_id,
            yaw: transform.yaw + delta.x,
            pitch: (transform.pitch - delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
        .into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::entity::{EntityId, EntityInner, PlayerComponents};
    use crate::plugins::test_context;
    use glam::{Vec2, Vec3};

    fn orientation_after(look: Vec2, pitch: f32) -> Option<(f32, f32)> {
        let mut arena = Arena::with_dt(0.1);
        let mut components = PlayerComponents::at_position(Vec3::ZERO);
        components.controller.look_input = look;
        components.transform.pitch = pitch;
        let player = arena.spawn(EntityInner::Player(components));

        let plugin = LookPlugin::new();
        let view = WorldView::for_plugin(&arena, plugin.declaration(), 0);
        plugin
            .run(&test_context(&arena, player), &view)
            .into_iter()
            .find_map(|o| match o.as_command() {
                Some(Command::SetOrientation { yaw, pitch, .. }) => Some((*yaw, *pitch)),
                _ => None,
            })
    }

    #[test]
    fn horizontal_look_turns_body() {
        // sensitivity 50 * dt 0.1 = 5 degrees per unit
        let (yaw, pitch) = orientation_after(Vec2::new(2.0, 0.0), 0.0).unwrap();
        assert!((yaw - 10.0).abs() < 1e-4);
        assert_eq!(pitch, 0.0);
    }

    #[test]
    fn looking_up_decreases_pitch() {
        let (_, pitch) = orientation_after(Vec2::new(0.0, 1.0), 0.0).unwrap();
        assert!((pitch + 5.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let (_, pitch) = orientation_after(Vec2::new(0.0, -100.0), 80.0).unwrap();
        assert_eq!(pitch, PITCH_LIMIT);
        let (_, pitch) = orientation_after(Vec2::new(0.0, 100.0), -80.0).unwrap();
        assert_eq!(pitch, -PITCH_LIMIT);
    }

    #[test]
    fn no_input_no_output() {
        assert!(orientation_after(Vec2::ZERO, 0.0).is_none());
    }

    #[test]
    fn run_with_nonexistent_entity() {
        let arena = Arena::new();
        let plugin = LookPlugin::new();
        let view = WorldView::for_plugin(&arena, plugin.declaration(), 0);
        assert!(plugin
            .run(&test_context(&arena, EntityId::new(3)), &view)
            .is_empty());
    }
}
