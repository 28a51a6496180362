//! The owned tick loop.
//!
//! Each [`Simulation::step`] runs four phases:
//!
//! 1. **SNAPSHOT**: queued input lands in the player controllers and the
//!    current arena is frozen for the tick
//! 2. **PLUGIN**: every (entity, plugin) pair runs on rayon and the outputs
//!    are put in a fixed order
//! 3. **RESOLUTION**: the next arena starts as a copy of current and the
//!    resolvers write into it
//! 4. **APPLY**: the arenas trade places and the tick counter moves on
//!
//! # Determinism
//!
//! Thread scheduling never shows in the result. Outputs are sorted before
//! resolution, entities live in a `BTreeMap`, and every random stream is
//! seeded from a hash of the master seed and the run's coordinates.
//!
//! # Example
//!
//! ```
//! use skirmish_core::simulation::Simulation;
//! use skirmish_core::entity::{EntityInner, PlayerComponents, WeaponSpec};
//! use skirmish_core::input::InputAction;
//! use skirmish_core::output::Event;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(42);
//! let player = sim.arena_mut().spawn(EntityInner::Player(
//!     PlayerComponents::at_position(Vec3::ZERO).with_weapon(WeaponSpec::default()),
//! ));
//!
//! sim.queue_input(player, InputAction::ShootPressed);
//! sim.step();
//!
//! assert_eq!(sim.tick(), 1);
//! assert!(sim
//!     .events()
//!     .iter()
//!     .any(|e| matches!(e, Event::WeaponFired { ammo_left: 19, .. })));
//! ```

use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{trace, warn};

use crate::arena::{Arena, FIXED_DT};
use crate::entity::EntityId;
use crate::input::InputAction;
use crate::output::{Event, OutputEnvelope, PluginId, PluginInstanceId, TraceId};
use crate::plugin::{PluginContext, PluginRegistry};
use crate::resolver::{default_resolvers, Resolver};
use crate::world_view::WorldView;

// =============================================================================
// Simulation
// =============================================================================

/// A skirmish world and the machinery that advances it.
///
/// Two arenas are kept. Plugins read `current`; resolvers write `next`,
/// which is refilled from `current` at the start of resolution so its
/// allocations are reused. The swap at the end of a step is a pointer swap.
///
/// The same seed, entities, and input at the same ticks always give the same
/// arenas and events.
pub struct Simulation {
    /// State as of the last completed step.
    current: Arena,
    /// Scratch arena the resolvers fill.
    next: Arena,
    plugins: PluginRegistry,
    /// Run in order; see [`default_resolvers`].
    resolvers: Vec<Box<dyn Resolver>>,
    master_seed: u64,
    /// Input applied at the start of the next step, in arrival order.
    pending_input: Vec<(EntityId, InputAction)>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("current", &self.current)
            .field("next", &self.next)
            .field("plugins", &self.plugins)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("master_seed", &self.master_seed)
            .field("pending_input", &self.pending_input)
            .finish()
    }
}

impl Simulation {
    /// Creates a new simulation with the given master seed and the default
    /// timestep.
    ///
    /// The simulation starts at tick 0 with empty arenas, every built-in
    /// plugin registered, and the default resolvers
    /// (State, Lifecycle, Physics, Combat, Event).
    ///
    /// # Example
    ///
    /// ```
    /// use skirmish_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(12345);
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.seed(), 12345);
    /// ```
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_dt(seed, FIXED_DT)
    }

    /// Creates a new simulation stepping `dt` seconds per tick.
    #[must_use]
    pub fn with_dt(seed: u64, dt: f32) -> Self {
        Self {
            current: Arena::with_dt(dt),
            next: Arena::with_dt(dt),
            plugins: PluginRegistry::default_bundles(),
            resolvers: default_resolvers(dt),
            master_seed: seed,
            pending_input: Vec::new(),
        }
    }

    /// Queues an input action for `player`, applied at the start of the next
    /// step. Vector actions replace held state; the others are edges visible
    /// to that step only.
    pub fn queue_input(&mut self, player: EntityId, action: InputAction) {
        self.pending_input.push((player, action));
    }

    /// Advances the world by one fixed step.
    ///
    /// Queued input is applied first, so plugins see this tick's edges. The
    /// next arena drops last tick's events and input edges before the
    /// resolvers run. Contacts found by the physics pass stay in the arena
    /// for the following tick's plugins.
    ///
    /// Resolvers receive outputs ordered by (entity, plugin id, sequence).
    pub fn step(&mut self) {
        let tick = self.current.current_tick();

        // SNAPSHOT
        self.apply_pending_input();

        // PLUGIN
        let outputs = self.execute_plugins_parallel(tick);
        trace!(tick, outputs = outputs.len(), "plugin phase complete");

        // RESOLUTION
        self.next.clone_from(&self.current);
        self.next.begin_frame();
        for resolver in &self.resolvers {
            let relevant: Vec<_> = outputs
                .iter()
                .filter(|o| resolver.handles().contains(&o.output().kind()))
                .collect();
            resolver.resolve(&relevant, &self.current, &mut self.next);
        }

        // APPLY
        std::mem::swap(&mut self.current, &mut self.next);
        self.current.advance_tick();
    }

    /// Runs `ticks` steps.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn apply_pending_input(&mut self) {
        for (player, action) in self.pending_input.drain(..) {
            match self
                .current
                .get_mut(player)
                .and_then(|entity| entity.as_player_mut())
            {
                Some(components) => components.controller.apply(action),
                None => warn!(%player, ?action, "input for missing player ignored"),
            }
        }
    }

    /// Runs every registered plugin for every entity on the rayon pool and
    /// returns the enveloped outputs in resolution order.
    fn execute_plugins_parallel(&self, tick: u64) -> Vec<OutputEnvelope> {
        let dt = self.current.dt();
        let time = self.current.time();

        let runs: Vec<_> = self
            .current
            .entities_sorted()
            .flat_map(|entity| {
                self.plugins
                    .plugins_for(entity.tag())
                    .iter()
                    .map(move |plugin| (entity.id(), Arc::clone(plugin)))
            })
            .collect();

        let mut envelopes: Vec<OutputEnvelope> = runs
            .par_iter()
            .flat_map(|(entity_id, plugin)| {
                let declaration = plugin.declaration();
                let view = WorldView::for_plugin(&self.current, declaration, tick);
                let trace_id = self.generate_trace_id(tick, *entity_id, &declaration.id);

                let ctx = PluginContext {
                    entity_id: *entity_id,
                    tick,
                    dt,
                    time,
                    trace_id,
                };

                let source = PluginInstanceId::new(*entity_id, declaration.id.clone());

                plugin
                    .run(&ctx, &view)
                    .into_iter()
                    .enumerate()
                    .map(|(seq, output)| {
                        OutputEnvelope::new(
                            output,
                            source.clone(),
                            trace_id,
                            tick,
                            u32::try_from(seq).unwrap_or(u32::MAX),
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        envelopes.sort_by(|a, b| {
            a.source()
                .entity_id()
                .cmp(&b.source().entity_id())
                .then_with(|| {
                    a.source()
                        .plugin_id()
                        .as_str()
                        .cmp(b.source().plugin_id().as_str())
                })
                .then_with(|| a.sequence().cmp(&b.sequence()))
        });

        envelopes
    }

    /// Hashes (master seed, tick, entity, plugin id) into a trace ID.
    ///
    /// Keyed by plugin id rather than registration slot, so reordering a
    /// bundle leaves every random stream unchanged.
    fn generate_trace_id(&self, tick: u64, entity: EntityId, plugin: &PluginId) -> TraceId {
        let mut hasher = DefaultHasher::new();
        self.master_seed.hash(&mut hasher);
        tick.hash(&mut hasher);
        entity.as_u64().hash(&mut hasher);
        plugin.as_str().hash(&mut hasher);
        TraceId::new(hasher.finish())
    }

    /// Events produced by the last completed step, in resolution order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.current.events()
    }

    /// World state after the last completed step.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.current
    }

    /// Mutable world state, for spawning and test setup between steps.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.current
    }

    /// Number of completed steps.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.current.current_tick()
    }

    /// Simulation time at the current tick (s).
    #[must_use]
    pub fn time(&self) -> f32 {
        self.current.time()
    }

    /// Plugin bundles, open for replacement or extension.
    ///
    /// # Example
    ///
    /// ```
    /// use skirmish_core::simulation::Simulation;
    /// use skirmish_core::entity::EntityTag;
    ///
    /// let mut sim = Simulation::new(42);
    /// assert_eq!(sim.plugins_mut().plugins_for(EntityTag::Player).len(), 3);
    /// sim.plugins_mut().clear();
    /// assert!(sim.plugins_mut().is_empty());
    /// ```
    #[must_use]
    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// Master seed every trace ID is derived from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.master_seed
    }

    /// Adds a custom resolver, run after the default ones.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// Registered resolvers, defaults included.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
