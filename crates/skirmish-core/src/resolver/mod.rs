//! Resolvers: the only code that writes the world during a step.
//!
//! A resolver subscribes to output kinds through [`Resolver::handles()`] and
//! receives, in sorted order, every output of those kinds from the plugin
//! phase. It turns them into writes on the next arena.
//!
//! # Order
//!
//! [`default_resolvers`] returns the fixed order used by the simulation:
//!
//! 1. [`StateResolver`]: stores plugin-owned state (brains, weapons, highlights)
//! 2. [`LifecycleResolver`]: spawns, despawns, weapon equip and drop
//! 3. [`PhysicsResolver`]: motion commands, steering, integration, contacts
//! 4. [`CombatResolver`]: damage and death
//! 5. [`EventResolver`]: appends plugin events to the journal
//!
//! Lifecycle runs after State so an equip replaces the weapon the weapon
//! plugin stored this tick. Combat runs after Physics so a death clears the
//! destination that steering just used.
//!
//! # Invariants
//!
//! - Resolvers look up the authoritative pre-tick values in `current`
//! - Equal inputs in equal order give equal writes
//! - Commands naming a missing entity are skipped with a warning

mod combat;
mod event;
mod lifecycle;
mod physics;
mod state;

pub use combat::CombatResolver;
pub use event::EventResolver;
pub use lifecycle::LifecycleResolver;
pub use physics::PhysicsResolver;
pub use state::StateResolver;

use crate::arena::Arena;
use crate::output::{OutputEnvelope, OutputKind};

/// Applies one or more output kinds to the next arena.
///
/// # Rules
///
/// 1. **Determinism**: no hash-order iteration, no wall clock. Walk entities
///    in ID order.
///
/// 2. **Read from current, write to next**: `current` is the frozen snapshot
///    the plugins saw. `next` starts as a copy of it and accumulates the
///    changes of every resolver that ran earlier in the tick.
///
/// 3. **Conflicts**: several outputs may touch the same state. Stored state
///    is last-write-wins; each damage modifier is one hit.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::Resolver;
/// use skirmish_core::output::{OutputKind, OutputEnvelope};
/// use skirmish_core::arena::Arena;
///
/// struct CountingResolver;
///
/// impl Resolver for CountingResolver {
///     fn handles(&self) -> &[OutputKind] {
///         &[OutputKind::Command]
///     }
///
///     fn resolve(
///         &self,
///         outputs: &[&OutputEnvelope],
///         current: &Arena,
///         next: &mut Arena,
///     ) {
///         let _ = (outputs.len(), current.entity_count(), next.entity_count());
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Output kinds routed to [`Resolver::resolve`].
    fn handles(&self) -> &[OutputKind];

    /// Applies `outputs`, already filtered to [`Resolver::handles`], by
    /// writing into `next`. `current` is the state the plugins saw.
    fn resolve(&self, outputs: &[&OutputEnvelope], current: &Arena, next: &mut Arena);
}

/// The resolvers of a standard simulation stepping by `dt`, in execution order.
#[must_use]
pub fn default_resolvers(dt: f32) -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(StateResolver::new()),
        Box::new(LifecycleResolver::new()),
        Box::new(PhysicsResolver::with_dt(dt)),
        Box::new(CombatResolver::new()),
        Box::new(EventResolver::new()),
    ]
}
