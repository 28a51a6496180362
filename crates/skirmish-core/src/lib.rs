//! # Skirmish Core
//!
//! Deterministic first-person combat sandbox.
//!
//! This crate simulates a small shooter prototype (player locomotion and
//! look, weapon fire and reload, an enemy patrol/chase/attack state machine,
//! projectiles, and weapon pickups) on an owned fixed-step tick loop,
//! implementing the Entity-Plugin-Resolver architecture.
//!
//! ## Architecture
//!
//! - **Entities**: player, enemies, projectiles, pickups, effects, obstacles
//! - **Plugins**: locomotion, look, weapon, projectile, pickup, enemy, effect
//! - **Resolvers**: state, lifecycle, physics, combat, event
//!
//! Plugins read a frozen [`WorldView`] of the current [`Arena`] in parallel and
//! emit [`Output`]s. Resolvers apply those outputs to the next arena in a fixed
//! order. Collision contacts found by the physics pass are read by the next
//! tick's plugins.
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::{Scenario, Event};
//!
//! let scenario = Scenario::from_json(r#"{
//!     "seed": 1,
//!     "player": { "position": [0, 0.5, 0], "weapon": {} },
//!     "obstacles": [{ "center": [0, -0.5, 0], "half_extents": [10, 0.5, 10], "ground": true }],
//!     "script": [{ "tick": 0, "input": { "action": "shoot_pressed" } }]
//! }"#)?;
//!
//! let (mut sim, handles) = scenario.build()?;
//! scenario.step_scripted(&mut sim, &handles);
//! assert!(sim.events().iter().any(|e| matches!(e, Event::WeaponFired { .. })));
//! # Ok::<(), skirmish_core::ScenarioError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod input;
pub mod output;
pub mod plugin;
pub mod plugins;
pub mod resolver;
pub mod scenario;
pub mod simulation;
pub mod world_view;

#[cfg(test)]
mod tests;

pub use arena::{Arena, Contact, RayHit, FIXED_DT};
pub use entity::{Entity, EntityId, EntityInner, EntityTag};
pub use error::ScenarioError;
pub use input::InputAction;
pub use output::{Command, Event, Modifier, Output, OutputEnvelope, OutputKind};
pub use plugin::{Plugin, PluginContext, PluginDeclaration, PluginRegistry};
pub use resolver::Resolver;
pub use scenario::{Scenario, ScenarioHandles};
pub use simulation::Simulation;
pub use world_view::WorldView;
