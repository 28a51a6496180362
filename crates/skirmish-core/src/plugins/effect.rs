//! Effect plugin: removes muzzle flashes once their lifetime is over.

use crate::entity::EntityTag;
use crate::output::{Command, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Plugin that despawns expired effects.
pub struct EffectPlugin {
    declaration: PluginDeclaration,
}

impl EffectPlugin {
    /// Creates a new `EffectPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("effect"),
                required_tags: vec![EntityTag::Effect],
                reads: vec![ComponentKind::Effect],
                emits: vec![OutputKind::Command],
            },
        }
    }
}

impl Default for EffectPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for EffectPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        match view.get_effect(ctx.entity_id) {
            Some(effect) if effect.expired(ctx.time) => vec![Command::Despawn {
                target: ctx.entity_id,
            }
            .into()],
            _ => vec![],
        }
    }
}
