//! What plugins hand back to the simulation.
//!
//! Outputs come in three kinds, and each resolver subscribes to kinds:
//! - [`Command`]: set, spawn, or remove something (`SetVelocity`, `SpawnProjectile`)
//! - [`Modifier`]: adjust a value that has rules of its own (`ApplyDamage`)
//! - [`Event`]: report what happened (`WeaponFired`, `EnemyKilled`)
//!
//! The simulation wraps each output in an [`OutputEnvelope`] recording who
//! emitted it, in which run, and in what position.
//!
//! # Example
//!
//! ```
//! use skirmish_core::output::{
//!     Output, Command, OutputEnvelope, PluginInstanceId, PluginId, TraceId,
//! };
//! use skirmish_core::entity::EntityId;
//! use glam::Vec3;
//!
//! let command = Command::SetVelocity {
//!     target: EntityId::new(1),
//!     velocity: Vec3::new(5.0, 0.0, 0.0),
//! };
//!
//! let envelope = OutputEnvelope::new(
//!     Output::Command(command),
//!     PluginInstanceId::new(EntityId::new(1), PluginId::new("locomotion")),
//!     TraceId::new(42),
//!     100, // tick
//!     0,   // sequence
//! );
//!
//! assert!(matches!(envelope.output(), Output::Command(_)));
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::entity::{Blink, EnemyBrain, EnemyState, EntityId, ProjectileSpec, WeaponSpec, WeaponState};

// =============================================================================
// Plugin Identification Types
// =============================================================================

/// Name of a plugin, shared by all of its instances.
///
/// Built-in plugins use static names; [`PluginId::from_static`] creates them
/// without allocating.
///
/// # Example
///
/// ```
/// use skirmish_core::output::PluginId;
///
/// const LOOK: PluginId = PluginId::from_static("look");
/// assert_eq!(LOOK, PluginId::new("look"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginId(Cow<'static, str>);

impl PluginId {
    /// Owned id from any string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(Cow::Owned(id.to_string()))
    }

    /// Creates a `PluginId` from a static string in const context.
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// The name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One plugin running for one entity, displayed as `plugin@entity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginInstanceId {
    entity_id: EntityId,
    plugin_id: PluginId,
}

impl PluginInstanceId {
    /// Pairs an entity with a plugin.
    #[must_use]
    pub fn new(entity_id: EntityId, plugin_id: PluginId) -> Self {
        Self {
            entity_id,
            plugin_id,
        }
    }

    /// Entity the plugin ran for.
    #[must_use]
    pub const fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Plugin that ran.
    #[must_use]
    pub fn plugin_id(&self) -> &PluginId {
        &self.plugin_id
    }
}

impl fmt::Display for PluginInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.plugin_id, self.entity_id)
    }
}

// =============================================================================
// Tracing Types
// =============================================================================

/// Identifier of one plugin run, derived from (seed, tick, entity, plugin).
///
/// The trace ID also seeds the plugin's random number generator, so equal
/// trace IDs always see equal random streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(u64);

impl TraceId {
    /// Wraps a raw hash.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw hash, also the RNG seed.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trace:{}", self.0)
    }
}

impl From<u64> for TraceId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// Output Categories
// =============================================================================

/// Direct writes to entity state, plus spawns and removals.
///
/// Commands naming an entity that no longer exists are ignored by the
/// resolvers with a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Replace an entity's velocity.
    SetVelocity {
        /// Entity to modify
        target: EntityId,
        /// New velocity (m/s)
        velocity: Vec3,
    },
    /// Add an instantaneous velocity change (unit mass).
    ApplyImpulse {
        /// Entity to modify
        target: EntityId,
        /// Velocity change (m/s)
        impulse: Vec3,
    },
    /// Set yaw and pitch.
    SetOrientation {
        /// Entity to modify
        target: EntityId,
        /// Yaw in degrees
        yaw: f32,
        /// Pitch in degrees
        pitch: f32,
    },
    /// Set or clear a navigation destination.
    Navigate {
        /// Enemy to steer
        target: EntityId,
        /// Destination, `None` to stop
        destination: Option<Vec3>,
    },
    /// Store the result of the ground probe.
    SetGrounded {
        /// Player to modify
        target: EntityId,
        /// Probe result
        grounded: bool,
    },
    /// Store an enemy's updated state machine.
    SetBrain {
        /// Enemy to modify
        target: EntityId,
        /// New brain state
        brain: Box<EnemyBrain>,
    },
    /// Store an enemy's hit-flash timer; `None` ends the flash.
    SetBlink {
        /// Enemy to modify
        target: EntityId,
        /// New timer
        blink: Option<Blink>,
    },
    /// Store the player's updated weapon.
    SetWeapon {
        /// Player to modify
        target: EntityId,
        /// New weapon state
        weapon: Box<WeaponState>,
    },
    /// Show or hide a pickup's highlight.
    SetHighlight {
        /// Pickup to modify
        target: EntityId,
        /// Highlight on or off
        highlighted: bool,
    },
    /// Launch a bullet.
    SpawnProjectile {
        /// Entity that fired
        source: EntityId,
        /// Muzzle position
        origin: Vec3,
        /// Flight direction
        direction: Vec3,
        /// Bullet parameters
        spec: ProjectileSpec,
    },
    /// Spawn a muzzle flash.
    SpawnEffect {
        /// Entity that caused the effect
        source: EntityId,
        /// Effect position
        origin: Vec3,
        /// Effect lifetime (s)
        lifetime: f32,
    },
    /// Consume a pickup: drop the player's weapon and equip the pickup's.
    EquipWeapon {
        /// Player receiving the weapon
        target: EntityId,
        /// Pickup being consumed
        pickup: EntityId,
        /// Weapon granted
        spec: Box<WeaponSpec>,
    },
    /// Drop the player's weapon as a new pickup in front of them.
    DropWeapon {
        /// Player dropping the weapon
        target: EntityId,
    },
    /// Remove an entity.
    Despawn {
        /// Entity to remove
        target: EntityId,
    },
}

/// Changes that the target applies through its own rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    /// Apply one damaging hit to an entity.
    ApplyDamage {
        /// Entity to damage
        target: EntityId,
        /// Entity whose collider caused the hit
        source: EntityId,
        /// Health to remove
        amount: i32,
    },
}

/// Why a projectile left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetireCause {
    /// It touched a collider
    Impact,
    /// Its lifetime ran out
    Expired,
}

/// Something that happened this tick.
///
/// Events are collected into the arena's journal in resolution order and
/// exposed through `Simulation::events()` for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A round was fired.
    WeaponFired {
        /// Player holding the weapon
        shooter: EntityId,
        /// Rounds left after the shot
        ammo_left: u32,
    },
    /// A reload began.
    ReloadStarted {
        /// Player holding the weapon
        shooter: EntityId,
    },
    /// A reload finished and the magazine is full.
    ReloadCompleted {
        /// Player holding the weapon
        shooter: EntityId,
    },
    /// A projectile was removed.
    ProjectileRetired {
        /// The projectile
        projectile: EntityId,
        /// Why it was removed
        cause: RetireCause,
    },
    /// An enemy changed behaviour state.
    EnemyStateChanged {
        /// The enemy
        enemy: EntityId,
        /// Previous state
        from: EnemyState,
        /// New state
        to: EnemyState,
    },
    /// An enemy took a hit and survived.
    EnemyHit {
        /// The enemy
        enemy: EntityId,
        /// Collider that caused the hit
        source: EntityId,
        /// Health after the hit
        health: i32,
    },
    /// An enemy died.
    EnemyKilled {
        /// The enemy
        enemy: EntityId,
    },
    /// A pickup's highlight changed.
    PickupHighlighted {
        /// The pickup
        pickup: EntityId,
        /// New highlight state
        highlighted: bool,
    },
    /// The player equipped a weapon from a pickup.
    WeaponEquipped {
        /// The player
        player: EntityId,
        /// Weapon name
        weapon: String,
    },
    /// The player dropped a weapon, which became a pickup.
    WeaponDropped {
        /// The player
        player: EntityId,
        /// Weapon name
        weapon: String,
        /// The new pickup
        pickup: EntityId,
    },
}

impl Event {
    /// The entity the event is mainly about.
    #[must_use]
    pub const fn primary_entity(&self) -> EntityId {
        match self {
            Self::WeaponFired { shooter, .. }
            | Self::ReloadStarted { shooter }
            | Self::ReloadCompleted { shooter } => *shooter,
            Self::ProjectileRetired { projectile, .. } => *projectile,
            Self::EnemyStateChanged { enemy, .. }
            | Self::EnemyHit { enemy, .. }
            | Self::EnemyKilled { enemy } => *enemy,
            Self::PickupHighlighted { pickup, .. } => *pickup,
            Self::WeaponEquipped { player, .. } | Self::WeaponDropped { player, .. } => *player,
        }
    }
}

// =============================================================================
// Top-Level Output Enum
// =============================================================================

/// Routing key resolvers subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// [`Command`]
    Command,
    /// [`Modifier`]
    Modifier,
    /// [`Event`]
    Event,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "Command"),
            Self::Modifier => write!(f, "Modifier"),
            Self::Event => write!(f, "Event"),
        }
    }
}

/// One proposal returned by a plugin run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// See [`Command`]
    Command(Command),
    /// See [`Modifier`]
    Modifier(Modifier),
    /// See [`Event`]
    Event(Event),
}

impl Output {
    /// Routing key.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        match self {
            Self::Command(_) => OutputKind::Command,
            Self::Modifier(_) => OutputKind::Modifier,
            Self::Event(_) => OutputKind::Event,
        }
    }

    /// The command, if this is one.
    #[must_use]
    pub const fn as_command(&self) -> Option<&Command> {
        match self {
            Self::Command(command) => Some(command),
            _ => None,
        }
    }

    /// The modifier, if this is one.
    #[must_use]
    pub const fn as_modifier(&self) -> Option<&Modifier> {
        match self {
            Self::Modifier(modifier) => Some(modifier),
            _ => None,
        }
    }

    /// The event, if this is one.
    #[must_use]
    pub const fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }
}

impl From<Command> for Output {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl From<Modifier> for Output {
    fn from(modifier: Modifier) -> Self {
        Self::Modifier(modifier)
    }
}

impl From<Event> for Output {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

// =============================================================================
// Output Envelope
// =============================================================================

/// An output stamped with where it came from.
///
/// Resolvers see envelopes sorted by (entity, plugin id, `sequence`), where
/// `sequence` is the output's index in its plugin run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    output: Output,
    source: PluginInstanceId,
    trace_id: TraceId,
    tick: u64,
    sequence: u32,
}

impl OutputEnvelope {
    /// Stamps `output` with its run coordinates.
    #[must_use]
    pub fn new(
        output: Output,
        source: PluginInstanceId,
        trace_id: TraceId,
        tick: u64,
        sequence: u32,
    ) -> Self {
        Self {
            output,
            source,
            trace_id,
            tick,
            sequence,
        }
    }

    /// The wrapped output.
    #[must_use]
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Plugin instance that emitted it.
    #[must_use]
    pub fn source(&self) -> &PluginInstanceId {
        &self.source
    }

    /// Run that emitted it.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Tick it was emitted in.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Index within its run.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Routing key of the wrapped output.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        self.output.kind()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod plugin_id_tests {
        use super::*;

        #[test]
        fn static_and_owned_equality() {
            const LOOK: PluginId = PluginId::from_static("look");
            assert_eq!(LOOK, PluginId::new("look"));
            assert_eq!(LOOK.as_str(), "look");
        }

        #[test]
        fn display_format() {
            assert_eq!(PluginId::new("weapon").to_string(), "weapon");
        }

        #[test]
        fn hashing() {
            use std::collections::HashSet;

            let mut set = HashSet::new();
            set.insert(PluginId::new("a"));
            set.insert(PluginId::from_static("a"));
            set.insert(PluginId::new("b"));
            assert_eq!(set.len(), 2);
        }

        #[test]
        fn serialization_roundtrip() {
            let id = PluginId::from_static("enemy");
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"enemy\"");
            let back: PluginId = serde_json::from_str(&json).unwrap();
            assert_eq!(id, back);
        }
    }

    mod plugin_instance_id_tests {
        use super::*;

        #[test]
        fn display_format() {
            let instance = PluginInstanceId::new(EntityId::new(42), PluginId::new("weapon"));
            assert_eq!(format!("{instance}"), "weapon@42");
            assert_eq!(instance.entity_id(), EntityId::new(42));
        }

        #[test]
        fn equality() {
            let i1 = PluginInstanceId::new(EntityId::new(1), PluginId::new("a"));
            let i2 = PluginInstanceId::new(EntityId::new(1), PluginId::new("a"));
            let i3 = PluginInstanceId::new(EntityId::new(2), PluginId::new("a"));
            assert_eq!(i1, i2);
            assert_ne!(i1, i3);
        }
    }

    #[test]
    fn trace_id_conversions() {
        let id: TraceId = 99u64.into();
        assert_eq!(id.as_u64(), 99);
        assert_eq!(format!("{id}"), "trace:99");
    }

    mod command_tests {
        use super::*;

        #[test]
        fn serialization_roundtrip() {
            let cmd = Command::Navigate {
                target: EntityId::new(3),
                destination: Some(Vec3::new(1.0, 0.0, 2.0)),
            };
            let json = serde_json::to_string(&cmd).unwrap();
            let back: Command = serde_json::from_str(&json).unwrap();
            assert_eq!(cmd, back);
        }
    }

    #[test]
    fn event_primary_entity() {
        let fired = Event::WeaponFired {
            shooter: EntityId::new(1),
            ammo_left: 19,
        };
        assert_eq!(fired.primary_entity(), EntityId::new(1));

        let retired = Event::ProjectileRetired {
            projectile: EntityId::new(7),
            cause: RetireCause::Expired,
        };
        assert_eq!(retired.primary_entity(), EntityId::new(7));

        let dropped = Event::WeaponDropped {
            player: EntityId::new(1),
            weapon: "rifle".into(),
            pickup: EntityId::new(12),
        };
        assert_eq!(dropped.primary_entity(), EntityId::new(1));
    }

    mod output_tests {
        use super::*;

        #[test]
        fn kinds_and_accessors() {
            let cmd: Output = Command::Despawn {
                target: EntityId::new(1),
            }
            .into();
            assert_eq!(cmd.kind(), OutputKind::Command);
            assert!(cmd.as_command().is_some());
            assert!(cmd.as_event().is_none());

            let event: Output = Event::EnemyKilled {
                enemy: EntityId::new(2),
            }
            .into();
            assert_eq!(event.kind(), OutputKind::Event);
            assert!(event.as_modifier().is_none());
        }

        #[test]
        fn envelope_accessors() {
            let envelope = OutputEnvelope::new(
                Output::Modifier(Modifier::ApplyDamage {
                    target: EntityId::new(2),
                    source: EntityId::new(3),
                    amount: 10,
                }),
                PluginInstanceId::new(EntityId::new(2), PluginId::new("enemy")),
                TraceId::new(100),
                42,
                1,
            );
            assert_eq!(envelope.kind(), OutputKind::Modifier);
            assert_eq!(envelope.tick(), 42);
            assert_eq!(envelope.sequence(), 1);
            assert_eq!(envelope.trace_id(), TraceId::new(100));
            assert_eq!(envelope.source().entity_id(), EntityId::new(2));
            assert!(envelope.output().as_modifier().is_some());
        }
    }
}
