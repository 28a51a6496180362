//! Behaviour plugins for the Entity-Plugin-Resolver architecture.
//!
//! This module provides the plugins of the skirmish sandbox:
//!
//! - [`LocomotionPlugin`]: walks the player and probes for ground
//! - [`LookPlugin`]: turns the player and pitches the camera
//! - [`WeaponPlugin`]: fire control, reload and drop for the held weapon
//! - [`ProjectilePlugin`]: retires bullets on impact or expiry
//! - [`PickupPlugin`]: highlight under the look ray and interaction
//! - [`EnemyPlugin`]: damage contacts, perception and the behaviour state machine
//! - [`EffectPlugin`]: removes expired muzzle flashes
//!
//! # Architecture
//!
//! Plugins follow the Entity-Plugin-Resolver pattern:
//! - Plugins read from an immutable [`WorldView`](crate::world_view::WorldView)
//! - Plugins emit [`Output`](crate::output::Output)s as proposals for state changes
//! - Resolvers collect and process outputs to mutate state
//!
//! Multi-tick state (weapon animations, enemy brain, hit flash) is advanced
//! on a copy inside the plugin and written back with a `Set*` command.
//!
//! # Registration
//!
//! Use [`PluginRegistry::default_bundles()`](crate::plugin::PluginRegistry::default_bundles)
//! to create a registry with every plugin registered for its entity tag.

mod effect;
mod enemy;
mod locomotion;
mod look;
mod pickup;
mod projectile;
mod weapon;

pub use effect::EffectPlugin;
pub use enemy::EnemyPlugin;
pub use locomotion::LocomotionPlugin;
pub use look::LookPlugin;
pub use pickup::PickupPlugin;
pub use projectile::ProjectilePlugin;
pub use weapon::WeaponPlugin;

#[cfg(test)]
use crate::{arena::Arena, entity::EntityId, output::TraceId, plugin::PluginContext};

/// Context for running a plugin against `arena` outside the simulation.
#[cfg(test)]
pub(crate) fn test_context(arena: &Arena, entity_id: EntityId) -> PluginContext {
    PluginContext {
        entity_id,
        tick: arena.current_tick(),
        dt: arena.dt(),
        time: arena.time(),
        trace_id: TraceId::new(0),
    }
}
