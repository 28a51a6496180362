//! Scenario files: a complete, replayable skirmish setup.
//!
//! A scenario describes the seed, timestep, level geometry, the player,
//! enemies, weapon pickups, and a scripted input timeline. Building a scenario
//! spawns everything into a fresh [`Simulation`] in a fixed order (obstacles,
//! player, enemies, pickups), so entity IDs and therefore whole runs are
//! reproducible.
//!
//! # Format
//!
//! ```json
//! {
//!   "seed": 7,
//!   "player": { "position": [0, 1, 0], "weapon": { "name": "rifle" } },
//!   "enemies": [{ "position": [0, 0.5, 12], "patrol": [[0, 0.5, 12], [6, 0.5, 12]] }],
//!   "pickups": [{ "position": [2, 0.5, 2], "weapon": { "name": "pistol", "capacity": 8 } }],
//!   "obstacles": [{ "center": [0, -0.5, 0], "half_extents": [30, 0.5, 30], "ground": true }],
//!   "script": [{ "tick": 0, "input": { "action": "shoot_pressed" } }]
//! }
//! ```
//!
//! Omitted tunables take their defaults.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::arena::FIXED_DT;
use crate::entity::{
    EnemyComponents, EnemyConfig, EntityId, EntityInner, ObstacleComponents, PickupComponents,
    PlayerComponents, WeaponSpec,
};
use crate::error::{Result, ScenarioError};
use crate::input::InputAction;
use crate::simulation::Simulation;

// =============================================================================
// Schema
// =============================================================================

/// The player's starting setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Body centre
    pub position: Vec3,
    /// Initial facing in degrees
    #[serde(default)]
    pub yaw: f32,
    /// Weapon held at start
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
}

/// One enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySetup {
    /// Starting position
    pub position: Vec3,
    /// Patrol points, visited cyclically
    #[serde(default)]
    pub patrol: Vec<Vec3>,
    /// Tunables
    #[serde(default)]
    pub config: EnemyConfig,
}

/// One weapon lying in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSetup {
    /// Position
    pub position: Vec3,
    /// Weapon granted
    #[serde(default)]
    pub weapon: WeaponSpec,
}

/// One static box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSetup {
    /// Box centre
    pub center: Vec3,
    /// Half size along each axis
    pub half_extents: Vec3,
    /// Whether the box is walkable ground
    #[serde(default)]
    pub ground: bool,
}

/// A scripted input, delivered before the given tick runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Tick the input is applied at
    pub tick: u64,
    /// The input
    pub input: InputAction,
}

fn default_dt() -> f32 {
    FIXED_DT
}

/// A complete skirmish setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Master seed
    #[serde(default)]
    pub seed: u64,
    /// Fixed timestep (s)
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// The player, if any
    #[serde(default)]
    pub player: Option<PlayerSetup>,
    /// Enemies tracking the player
    #[serde(default)]
    pub enemies: Vec<EnemySetup>,
    /// Weapon pickups
    #[serde(default)]
    pub pickups: Vec<PickupSetup>,
    /// Level geometry
    #[serde(default)]
    pub obstacles: Vec<ObstacleSetup>,
    /// Input timeline
    #[serde(default)]
    pub script: Vec<ScriptEntry>,
}

/// IDs of the entities a scenario spawned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioHandles {
    /// The player
    pub player: Option<EntityId>,
    /// Enemies, in file order
    pub enemies: Vec<EntityId>,
    /// Pickups, in file order
    pub pickups: Vec<EntityId>,
}

// =============================================================================
// Loading
// =============================================================================

impl Scenario {
    /// Reads, parses, and validates a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] if the file cannot be read,
    /// [`ScenarioError::Parse`] if it is not a valid scenario document, and
    /// [`ScenarioError::Invalid`] if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses and validates a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] or [`ScenarioError::Invalid`].
    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks that the scenario can be simulated.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(invalid(format!("dt must be positive, got {}", self.dt)));
        }

        if let Some(weapon) = self.player.as_ref().and_then(|p| p.weapon.as_ref()) {
            validate_weapon(weapon).map_err(|e| invalid(format!("player weapon: {e}")))?;
        }
        for (index, pickup) in self.pickups.iter().enumerate() {
            validate_weapon(&pickup.weapon)
                .map_err(|e| invalid(format!("pickup {index}: {e}")))?;
        }
        for (index, enemy) in self.enemies.iter().enumerate() {
            validate_enemy(&enemy.config).map_err(|e| invalid(format!("enemy {index}: {e}")))?;
        }

        if self.player.is_none() {
            if !self.script.is_empty() {
                return Err(invalid("script given but there is no player".to_string()));
            }
            if !self.pickups.is_empty() {
                return Err(invalid("pickups need a player".to_string()));
            }
        }
        Ok(())
    }

    /// Spawns the scenario into a new simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] if validation fails.
    pub fn build(&self) -> Result<(Simulation, ScenarioHandles)> {
        self.validate()?;

        let mut sim = Simulation::with_dt(self.seed, self.dt);
        let mut handles = ScenarioHandles::default();
        let arena = sim.arena_mut();

        for obstacle in &self.obstacles {
            let components = if obstacle.ground {
                ObstacleComponents::ground(obstacle.center, obstacle.half_extents)
            } else {
                ObstacleComponents::wall(obstacle.center, obstacle.half_extents)
            };
            arena.spawn(EntityInner::Obstacle(components));
        }

        if let Some(setup) = &self.player {
            let mut components = PlayerComponents::at_position(setup.position);
            components.transform.yaw = setup.yaw;
            if let Some(weapon) = &setup.weapon {
                components = components.with_weapon(weapon.clone());
            }
            handles.player = Some(arena.spawn(EntityInner::Player(components)));
        }

        for enemy in &self.enemies {
            handles.enemies.push(arena.spawn(EntityInner::Enemy(EnemyComponents::new(
                enemy.position,
                enemy.patrol.clone(),
                enemy.config,
                handles.player,
            ))));
        }

        if let Some(player) = handles.player {
            for pickup in &self.pickups {
                handles.pickups.push(arena.spawn(EntityInner::Pickup(PickupComponents::new(
                    pickup.position,
                    pickup.weapon.clone(),
                    player,
                ))));
            }
        }

        info!(
            seed = self.seed,
            entities = sim.arena().entity_count(),
            enemies = handles.enemies.len(),
            pickups = handles.pickups.len(),
            script = self.script.len(),
            "scenario built"
        );
        Ok((sim, handles))
    }

    /// Scripted inputs for `tick`, in file order.
    pub fn script_for(&self, tick: u64) -> impl Iterator<Item = InputAction> + '_ {
        self.script
            .iter()
            .filter(move |entry| entry.tick == tick)
            .map(|entry| entry.input)
    }

    /// Queues this tick's scripted input and steps the simulation once.
    pub fn step_scripted(&self, sim: &mut Simulation, handles: &ScenarioHandles) {
        if let Some(player) = handles.player {
            for input in self.script_for(sim.tick()) {
                sim.queue_input(player, input);
            }
        }
        sim.step();
    }
}

fn invalid(message: String) -> ScenarioError {
    ScenarioError::Invalid(message)
}

fn validate_weapon(weapon: &WeaponSpec) -> std::result::Result<(), String> {
    if weapon.capacity == 0 {
        return Err(format!("{}: capacity must be at least 1", weapon.name));
    }
    let timings = [
        ("fire_rate", weapon.fire_rate),
        ("reload_time", weapon.reload_time),
        ("projectile lifetime", weapon.projectile.lifetime),
    ];
    for (field, value) in timings {
        if !(value.is_finite() && value >= 0.0) {
            return Err(format!("{}: {field} must not be negative, got {value}", weapon.name));
        }
    }
    // A zero rate would leave the recoil animation running forever.
    let rates = [
        ("recoil_speed", weapon.recoil_speed),
        ("projectile speed", weapon.projectile.speed),
        ("projectile radius", weapon.projectile.radius),
    ];
    for (field, value) in rates {
        if !(value.is_finite() && value > 0.0) {
            return Err(format!("{}: {field} must be positive, got {value}", weapon.name));
        }
    }
    Ok(())
}

/// Health must only ever go down and every brain threshold must be usable.
fn validate_enemy(config: &EnemyConfig) -> std::result::Result<(), String> {
    if config.max_health <= 0 {
        return Err(format!("max_health must be positive, got {}", config.max_health));
    }
    if config.damage_per_hit < 1 {
        return Err(format!("damage_per_hit must be at least 1, got {}", config.damage_per_hit));
    }
    if config.minimum_chasing_health < 0 {
        return Err(format!(
            "minimum_chasing_health must not be negative, got {}",
            config.minimum_chasing_health
        ));
    }
    for (field, value) in [
        ("attack_distance", config.attack_distance),
        ("max_vision_distance", config.max_vision_distance),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(format!("{field} must not be negative, got {value}"));
        }
    }
    for (field, value) in [
        ("idle_time", config.idle_time),
        ("blink_duration", config.blink_duration),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(format!("{field} must be positive, got {value}"));
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
