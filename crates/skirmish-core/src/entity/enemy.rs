//! Enemy behaviour: patrol route, state machine, health, and hit flash.
//!
//! The state machine is evaluated once per tick by the enemy plugin through
//! [`EnemyBrain::think`]. It never touches the world directly; it returns a
//! [`NavOrder`] that the plugin turns into a navigation command.
//!
//! ```text
//!            roll < idle chance          idle timer elapsed
//! Patrolling ──────────────────▶ Idle ──────────────────────▶ Patrolling
//!     ▲  ▲                                                     │
//!     │  └──────── lost / too far / low health ─────────┐      │ player visible
//!     │                                                 │      ▼
//!     └──────── low health ──────── Attacking ◀──in range── Chasing
//!                                       └──out of range / unseen──▶
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::components::{yaw_towards, EnemyComponents, MaterialId};

// =============================================================================
// Configuration
// =============================================================================

/// Enemy tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Starting health
    pub max_health: i32,
    /// Health removed by one damaging hit
    pub damage_per_hit: i32,
    /// Distance at which a patrol point counts as reached
    pub position_threshold: f32,
    /// Seconds spent idle before patrolling again
    pub idle_time: f32,
    /// Distance at which a visible player is attacked
    pub attack_distance: f32,
    /// Distance beyond which the player is forgotten
    pub max_vision_distance: f32,
    /// Below this health the enemy stops chasing
    pub minimum_chasing_health: i32,
    /// Percent chance of idling at each reached patrol point
    pub idle_chance_percent: f32,
    /// Duration of the hit flash (s)
    pub blink_duration: f32,
    /// Roll applied when the enemy dies (degrees)
    pub death_tilt: f32,
    /// Navigation speed (m/s)
    pub agent_speed: f32,
    /// Material shown normally
    pub body_material: MaterialId,
    /// Material shown during the hit flash
    pub hit_material: MaterialId,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            damage_per_hit: 10,
            position_threshold: 2.0,
            idle_time: 3.0,
            attack_distance: 5.0,
            max_vision_distance: 15.0,
            minimum_chasing_health: 30,
            idle_chance_percent: 10.0,
            blink_duration: 0.1,
            death_tilt: 5.0,
            agent_speed: 3.5,
            body_material: MaterialId(0),
            hit_material: MaterialId(1),
        }
    }
}

// =============================================================================
// Patrol Route
// =============================================================================

/// Cyclic list of patrol points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolRoute {
    points: Vec<Vec3>,
    index: usize,
}

impl PatrolRoute {
    /// Route starting at its first point.
    #[must_use]
    pub const fn new(points: Vec<Vec3>) -> Self {
        Self { points, index: 0 }
    }

    /// Current target, `None` for an empty route.
    #[must_use]
    pub fn target(&self) -> Option<Vec3> {
        self.points.get(self.index).copied()
    }

    /// Index of the current target.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the route has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Moves to the next point, wrapping to the first.
    pub fn advance(&mut self) {
        if !self.points.is_empty() {
            self.index = (self.index + 1) % self.points.len();
        }
    }
}

// =============================================================================
// State Machine
// =============================================================================

/// Behaviour state of an enemy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Standing still, waiting for the idle timer
    #[default]
    Idle,
    /// Walking the patrol route
    Patrolling,
    /// Moving to the last known player position
    Chasing,
    /// Standing and facing the player
    Attacking,
}

impl fmt::Display for EnemyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Patrolling => write!(f, "Patrolling"),
            Self::Chasing => write!(f, "Chasing"),
            Self::Attacking => write!(f, "Attacking"),
        }
    }
}

/// What the enemy observed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Enemy position
    pub position: Vec3,
    /// Player position, `None` when there is no player
    pub player: Option<Vec3>,
    /// Whether the sight ray towards the player hit the player first
    pub player_visible: bool,
}

/// Navigation decision produced by one `think` step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavOrder {
    /// Clear the destination
    Stop,
    /// Set the destination
    GoTo(Vec3),
    /// Leave the destination unchanged
    Keep,
}

/// Behaviour state machine of one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyBrain {
    /// Current state
    pub state: EnemyState,
    /// Patrol route
    pub route: PatrolRoute,
    /// Seconds left before leaving Idle
    pub idle_counter: f32,
    /// Last position where the player was seen
    pub last_known_player: Vec3,
    /// Visibility result of the latest tick
    pub can_see_player: bool,
}

impl EnemyBrain {
    /// Idle brain with a full idle timer.
    #[must_use]
    pub const fn new(route: PatrolRoute, idle_time: f32) -> Self {
        Self {
            state: EnemyState::Idle,
            route,
            idle_counter: idle_time,
            last_known_player: Vec3::ZERO,
            can_see_player: false,
        }
    }

    /// Advances the state machine by one tick.
    ///
    /// # Arguments
    ///
    /// * `config` - Enemy tunables
    /// * `perception` - Positions and visibility observed this tick
    /// * `health` - Current health
    /// * `dt` - Tick duration (s)
    /// * `patrol_roll` - Uniform roll in `[0, 100)` used when a patrol point is reached
    pub fn think(
        &mut self,
        config: &EnemyConfig,
        perception: &Perception,
        health: i32,
        dt: f32,
        patrol_roll: f32,
    ) -> NavOrder {
        self.can_see_player = perception.player_visible && perception.player.is_some();
        if self.can_see_player {
            if self.state != EnemyState::Attacking {
                self.state = EnemyState::Chasing;
            }
            if let Some(player) = perception.player {
                self.last_known_player = player;
            }
        }

        let player_distance = perception
            .player
            .map_or(f32::INFINITY, |p| perception.position.distance(p));
        let low_health = health < config.minimum_chasing_health;

        match self.state {
            EnemyState::Idle => {
                self.idle_counter -= dt;
                if self.idle_counter <= 0.0 {
                    self.state = EnemyState::Patrolling;
                    self.idle_counter = config.idle_time;
                }
                NavOrder::Stop
            }
            EnemyState::Patrolling => {
                let Some(target) = self.route.target() else {
                    return NavOrder::Stop;
                };
                if perception.position.distance(target) < config.position_threshold {
                    if patrol_roll < config.idle_chance_percent {
                        self.state = EnemyState::Idle;
                    } else {
                        self.route.advance();
                    }
                    NavOrder::Keep
                } else {
                    NavOrder::GoTo(target)
                }
            }
            EnemyState::Chasing => {
                self.idle_counter = config.idle_time;
                let order = NavOrder::GoTo(self.last_known_player);
                if low_health || player_distance > config.max_vision_distance {
                    self.state = EnemyState::Patrolling;
                } else if self.can_see_player && player_distance <= config.attack_distance {
                    self.state = EnemyState::Attacking;
                } else if !self.can_see_player
                    && perception.position.distance(self.last_known_player)
                        < config.position_threshold
                {
                    self.state = EnemyState::Patrolling;
                }
                order
            }
            EnemyState::Attacking => {
                self.idle_counter = config.idle_time;
                if !self.can_see_player || player_distance > config.attack_distance {
                    self.state = if low_health {
                        EnemyState::Patrolling
                    } else {
                        EnemyState::Chasing
                    };
                }
                NavOrder::Stop
            }
        }
    }

    /// Yaw to face while the player is visible.
    #[must_use]
    pub fn facing(&self, perception: &Perception) -> Option<f32> {
        if !self.can_see_player {
            return None;
        }
        perception
            .player
            .and_then(|player| yaw_towards(perception.position, player))
    }
}

// =============================================================================
// Health & Hit Flash
// =============================================================================

/// Health of a damageable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    /// Current health, never negative
    pub health: i32,
    /// False once health reached zero
    pub alive: bool,
}

impl Vitals {
    /// Full health.
    #[must_use]
    pub const fn new(health: i32) -> Self {
        Self {
            health,
            alive: true,
        }
    }
}

/// Timer for the hit-material flash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blink {
    /// Seconds since the flash started
    pub elapsed: f32,
    /// Total flash duration
    pub duration: f32,
}

impl Blink {
    /// A fresh flash.
    #[must_use]
    pub const fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    /// Advances the timer; returns true once the flash is over.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }
}

/// Result of a damaging hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The enemy was already dead
    Ignored,
    /// Health dropped but the enemy survived
    Flinched {
        /// Remaining health
        health: i32,
    },
    /// Health reached zero on this hit
    Killed,
}

impl EnemyComponents {
    /// Applies one damaging hit of `amount`.
    ///
    /// A surviving enemy flashes its hit material. A killed enemy has its
    /// rotation unlocked and tilted, stops navigating, and any running flash
    /// is cancelled with the original material restored. Dead enemies ignore
    /// further hits.
    pub fn take_hit(&mut self, amount: i32) -> HitOutcome {
        if !self.vitals.alive {
            return HitOutcome::Ignored;
        }

        self.vitals.health = (self.vitals.health - amount).max(0);
        if self.vitals.health == 0 {
            self.die();
            return HitOutcome::Killed;
        }

        self.blink = Some(Blink::new(self.config.blink_duration));
        self.materials.apply_all(self.config.hit_material);
        HitOutcome::Flinched {
            health: self.vitals.health,
        }
    }

    fn die(&mut self) {
        self.vitals.alive = false;
        self.body.rotation_locked = false;
        self.body.velocity = Vec3::ZERO;
        self.transform.roll += self.config.death_tilt;
        self.agent.destination = None;
        self.blink = None;
        self.materials.restore();
    }
}
