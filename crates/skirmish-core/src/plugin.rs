//! Plugins: per-entity behaviour that reads the world and proposes changes.
//!
//! A plugin never touches the arena. It is handed a
//! [`WorldView`](crate::world_view::WorldView) of the tick's frozen state and
//! returns [`Output`]s, which the resolvers apply to the next state. Because
//! nothing is written during the plugin phase, every (entity, plugin) pair of
//! a tick can run on its own rayon task.
//!
//! # Declarations
//!
//! A [`PluginDeclaration`] names the plugin ([`PluginId`]), the entity tags it
//! runs for, the component kinds its view may read, and the output kinds it
//! may emit.
//!
//! # Example
//!
//! ```
//! use skirmish_core::plugin::{
//!     Plugin, PluginContext, PluginDeclaration, PluginId, PluginRegistry,
//!     ComponentKind,
//! };
//! use skirmish_core::world_view::WorldView;
//! use skirmish_core::output::{Output, OutputKind};
//! use skirmish_core::entity::EntityTag;
//! use std::sync::Arc;
//!
//! struct SpinPlugin {
//!     declaration: PluginDeclaration,
//! }
//!
//! impl Plugin for SpinPlugin {
//!     fn declaration(&self) -> &PluginDeclaration {
//!         &self.declaration
//!     }
//!
//!     fn run(&self, _ctx: &PluginContext, _view: &WorldView) -> Vec<Output> {
//!         vec![]
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! registry.register(
//!     EntityTag::Enemy,
//!     Arc::new(SpinPlugin {
//!         declaration: PluginDeclaration {
//!             id: PluginId::new("spin"),
//!             required_tags: vec![EntityTag::Enemy],
//!             reads: vec![ComponentKind::Transform],
//!             emits: vec![OutputKind::Command],
//!         },
//!     }),
//! );
//! assert_eq!(registry.plugins_for(EntityTag::Enemy).len(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityTag};
use crate::output::{Output, OutputKind, TraceId};
use crate::world_view::WorldView;

pub use crate::output::PluginId;

// =============================================================================
// Component Kind
// =============================================================================

/// Component groups a plugin can ask to read.
///
/// [`WorldView`] checks every component access against the plugin's
/// `reads` list in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Position and orientation of any entity
    Transform,
    /// Rigid body of moving entities
    Body,
    /// Player controller, tunables, and held weapon
    Player,
    /// Enemy brain, health, and materials
    Enemy,
    /// Projectile flight data
    Projectile,
    /// Pickup weapon and highlight state
    Pickup,
    /// Effect lifetime
    Effect,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => write!(f, "Transform"),
            Self::Body => write!(f, "Body"),
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
            Self::Pickup => write!(f, "Pickup"),
            Self::Effect => write!(f, "Effect"),
        }
    }
}

// =============================================================================
// Plugin Declaration
// =============================================================================

/// What a plugin runs on, reads, and emits.
///
/// # Example
///
/// ```
/// use skirmish_core::plugin::{PluginDeclaration, PluginId, ComponentKind};
/// use skirmish_core::output::OutputKind;
/// use skirmish_core::entity::EntityTag;
///
/// let decl = PluginDeclaration {
///     id: PluginId::new("pickup"),
///     required_tags: vec![EntityTag::Pickup],
///     reads: vec![ComponentKind::Pickup, ComponentKind::Player],
///     emits: vec![OutputKind::Command, OutputKind::Event],
/// };
///
/// assert!(decl.reads_component(ComponentKind::Pickup));
/// ```
#[derive(Debug, Clone)]
pub struct PluginDeclaration {
    /// Stable name, also the tie-breaker when sorting outputs.
    pub id: PluginId,
    /// Tags of the entities this plugin runs for.
    pub required_tags: Vec<EntityTag>,
    /// Component groups the view lets this plugin read.
    pub reads: Vec<ComponentKind>,
    /// Output kinds the plugin may return.
    pub emits: Vec<OutputKind>,
}

impl PluginDeclaration {
    /// True if the plugin runs for `tag`.
    #[must_use]
    pub fn supports_tag(&self, tag: EntityTag) -> bool {
        self.required_tags.contains(&tag)
    }

    /// True if `kind` is in `reads`.
    #[must_use]
    pub fn reads_component(&self, kind: ComponentKind) -> bool {
        self.reads.contains(&kind)
    }

    /// True if `kind` is in `emits`.
    #[must_use]
    pub fn emits_output(&self, kind: OutputKind) -> bool {
        self.emits.contains(&kind)
    }
}

// =============================================================================
// Plugin Context
// =============================================================================

/// Per-run inputs a plugin gets besides the view.
///
/// # Example
///
/// ```
/// use skirmish_core::plugin::PluginContext;
/// use skirmish_core::entity::EntityId;
/// use skirmish_core::output::TraceId;
/// use rand::Rng;
///
/// let ctx = PluginContext {
///     entity_id: EntityId::new(42),
///     tick: 100,
///     dt: 1.0 / 60.0,
///     time: 100.0 / 60.0,
///     trace_id: TraceId::new(7),
/// };
///
/// // Same trace ID, same random stream.
/// let a: u32 = ctx.rng().gen();
/// let b: u32 = ctx.rng().gen();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PluginContext {
    /// Entity the plugin runs for.
    pub entity_id: EntityId,
    /// Tick being computed.
    pub tick: u64,
    /// Fixed timestep (s).
    pub dt: f32,
    /// Simulation time at this tick (s).
    pub time: f32,
    /// Trace ID of this plugin run.
    pub trace_id: TraceId,
}

impl PluginContext {
    /// Deterministic random number generator for this plugin run.
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.trace_id.as_u64())
    }
}

// =============================================================================
// Plugin Trait
// =============================================================================

/// Behaviour attached to entities of one or more tags.
///
/// Implementations are shared across rayon workers, hence `Send + Sync`.
///
/// # Rules
///
/// 1. **No side effects**: all effects are expressed through outputs.
/// 2. **Determinism**: use [`PluginContext::rng`] for randomness and
///    [`PluginContext::time`] for timing, never the wall clock.
/// 3. **Respect declarations**: only access components declared in `reads`,
///    and only emit output kinds declared in `emits`.
pub trait Plugin: Send + Sync {
    /// Static description used for scheduling and view scoping.
    fn declaration(&self) -> &PluginDeclaration;

    /// Runs once per tick for `ctx.entity_id` and returns its proposals.
    ///
    /// Output order matters: the sequence number given to each output is its
    /// index in the returned vector.
    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output>;
}

// =============================================================================
// Plugin Registry
// =============================================================================

/// Plugins keyed by the entity tag they run for.
#[derive(Default)]
pub struct PluginRegistry {
    bundles: HashMap<EntityTag, Vec<Arc<dyn Plugin>>>,
}

impl PluginRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }

    /// Adds `plugin` to the bundle for `tag`.
    ///
    /// Registering the same `Arc` under several tags shares one instance.
    pub fn register(&mut self, tag: EntityTag, plugin: Arc<dyn Plugin>) {
        self.bundles.entry(tag).or_default().push(plugin);
    }

    /// Bundle for `tag`, empty if none was registered.
    #[must_use]
    pub fn plugins_for(&self, tag: EntityTag) -> &[Arc<dyn Plugin>] {
        self.bundles.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// Registrations across all tags.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.bundles.values().map(Vec::len).sum()
    }

    /// True when no bundle holds a plugin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.values().all(Vec::is_empty)
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.bundles.clear();
    }

    /// Creates a registry pre-populated with the default plugin bundles.
    ///
    /// - Player: locomotion, look, weapon
    /// - Enemy: enemy behaviour
    /// - Projectile: projectile lifetime and impact
    /// - Pickup: highlight and interaction
    /// - Effect: effect lifetime
    ///
    /// Obstacles have no plugins.
    ///
    /// # Example
    ///
    /// ```
    /// use skirmish_core::plugin::PluginRegistry;
    /// use skirmish_core::entity::EntityTag;
    ///
    /// let registry = PluginRegistry::default_bundles();
    /// assert_eq!(registry.plugins_for(EntityTag::Player).len(), 3);
    /// assert_eq!(registry.plugins_for(EntityTag::Enemy).len(), 1);
    /// assert!(registry.plugins_for(EntityTag::Obstacle).is_empty());
    /// ```
    #[must_use]
    pub fn default_bundles() -> Self {
        use crate::plugins::{
            EffectPlugin, EnemyPlugin, LocomotionPlugin, LookPlugin, PickupPlugin,
            ProjectilePlugin, WeaponPlugin,
        };

        let mut registry = Self::new();

        registry.register(EntityTag::Player, Arc::new(LocomotionPlugin::new()));
        registry.register(EntityTag::Player, Arc::new(LookPlugin::new()));
        registry.register(EntityTag::Player, Arc::new(WeaponPlugin::new()));
        registry.register(EntityTag::Enemy, Arc::new(EnemyPlugin::new()));
        registry.register(EntityTag::Projectile, Arc::new(ProjectilePlugin::new()));
        registry.register(EntityTag::Pickup, Arc::new(PickupPlugin::new()));
        registry.register(EntityTag::Effect, Arc::new(EffectPlugin::new()));

        registry
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("bundle_count", &self.bundles.len())
            .field("registration_count", &self.registration_count())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    struct TestPlugin {
        declaration: PluginDeclaration,
    }

    impl TestPlugin {
        fn new(id: &'static str, tags: Vec<EntityTag>) -> Self {
            Self {
                declaration: PluginDeclaration {
                    id: PluginId::from_static(id),
                    required_tags: tags,
                    reads: vec![ComponentKind::Transform],
                    emits: vec![OutputKind::Command],
                },
            }
        }
    }

    impl Plugin for TestPlugin {
        fn declaration(&self) -> &PluginDeclaration {
            &self.declaration
        }

        fn run(&self, _ctx: &PluginContext, _view: &WorldView) -> Vec<Output> {
            vec![]
        }
    }

    mod declaration_tests {
        use super::*;

        #[test]
        fn queries() {
            let decl = PluginDeclaration {
                id: PluginId::new("test"),
                required_tags: vec![EntityTag::Player],
                reads: vec![ComponentKind::Player],
                emits: vec![OutputKind::Command, OutputKind::Event],
            };

            assert!(decl.supports_tag(EntityTag::Player));
            assert!(!decl.supports_tag(EntityTag::Enemy));
            assert!(decl.reads_component(ComponentKind::Player));
            assert!(!decl.reads_component(ComponentKind::Enemy));
            assert!(decl.emits_output(OutputKind::Event));
            assert!(!decl.emits_output(OutputKind::Modifier));
        }

        #[test]
        fn component_kind_display() {
            assert_eq!(ComponentKind::Pickup.to_string(), "Pickup");
            assert_eq!(ComponentKind::Body.to_string(), "Body");
        }
    }

    mod context_tests {
        use super::*;

        fn ctx(trace: u64) -> PluginContext {
            PluginContext {
                entity_id: EntityId::new(1),
                tick: 0,
                dt: 1.0 / 60.0,
                time: 0.0,
                trace_id: TraceId::new(trace),
            }
        }

        #[test]
        fn rng_is_deterministic_per_trace() {
            let mut first = ctx(5).rng();
            let mut second = ctx(5).rng();
            for _ in 0..4 {
                assert_eq!(first.gen::<u32>(), second.gen::<u32>());
            }
        }

        #[test]
        fn rng_differs_between_traces() {
            let a: u64 = ctx(1).rng().gen();
            let b: u64 = ctx(2).rng().gen();
            assert_ne!(a, b);
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn new_is_empty() {
            let registry = PluginRegistry::new();
            assert!(registry.is_empty());
            assert_eq!(registry.registration_count(), 0);
        }

        #[test]
        fn register_for_multiple_tags() {
            let mut registry = PluginRegistry::new();
            let plugin = Arc::new(TestPlugin::new(
                "shared",
                vec![EntityTag::Player, EntityTag::Enemy],
            ));
            registry.register(EntityTag::Player, plugin.clone());
            registry.register(EntityTag::Enemy, plugin);

            assert_eq!(registry.registration_count(), 2);
            assert_eq!(registry.plugins_for(EntityTag::Player).len(), 1);
            assert!(registry.plugins_for(EntityTag::Pickup).is_empty());
        }

        #[test]
        fn clear_removes_all() {
            let mut registry = PluginRegistry::default_bundles();
            assert!(!registry.is_empty());
            registry.clear();
            assert!(registry.is_empty());
        }

        #[test]
        fn default_bundles_cover_every_active_tag() {
            let registry = PluginRegistry::default_bundles();
            let ids: Vec<_> = registry
                .plugins_for(EntityTag::Player)
                .iter()
                .map(|p| p.declaration().id.as_str().to_string())
                .collect();
            assert_eq!(ids, vec!["locomotion", "look", "weapon"]);
            assert_eq!(registry.plugins_for(EntityTag::Projectile).len(), 1);
            assert_eq!(registry.plugins_for(EntityTag::Pickup).len(), 1);
            assert_eq!(registry.plugins_for(EntityTag::Effect).len(), 1);
            assert_eq!(registry.registration_count(), 7);
        }

        #[test]
        fn registered_plugins_declare_their_tag() {
            let registry = PluginRegistry::default_bundles();
            for tag in [
                EntityTag::Player,
                EntityTag::Enemy,
                EntityTag::Projectile,
                EntityTag::Pickup,
                EntityTag::Effect,
            ] {
                for plugin in registry.plugins_for(tag) {
                    assert!(plugin.declaration().supports_tag(tag));
                }
            }
        }

        #[test]
        fn debug_format() {
            let debug = format!("{:?}", PluginRegistry::default_bundles());
            assert!(debug.contains("registration_count"));
        }
    }
}
