//! Projectile plugin: retires bullets.
//!
//! A bullet is removed on the tick after it first touches any collider its
//! mask accepts, or once its lifetime has run out. Damage is not applied
//! here; the enemy plugin sees the same contact and emits the hit.

use crate::entity::EntityTag;
use crate::output::{Command, Event, Output, OutputKind, PluginId, RetireCause};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Plugin that despawns bullets on impact or expiry.
pub struct ProjectilePlugin {
    declaration: PluginDeclaration,
}

impl ProjectilePlugin {
    /// Creates a new `ProjectilePlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("projectile"),
                required_tags: vec![EntityTag::Projectile],
                reads: vec![ComponentKind::Projectile],
                emits: vec![OutputKind::Command, OutputKind::Event],
            },
        }
    }
}

impl Default for ProjectilePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ProjectilePlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let projectile = ctx.entity_id;
        let Some(components) = view.get_projectile(projectile) else {
            return vec![];
        };

        let cause = if !view.contacts_for(projectile).is_empty() {
            RetireCause::Impact
        } else if components.expired(ctx.time) {
            RetireCause::Expired
        } else {
            return vec![];
        };

        vec![
            Command::Despawn { target: projectile }.into(),
            Event::ProjectileRetired { projectile, cause }.into(),
        ]
    }
}
