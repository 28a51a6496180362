//! Event resolver for the per-tick event journal.
//!
//! The `EventResolver` appends plugin events to the next arena's journal.
//! It does not mutate any entity. Resolvers that run earlier in the tick
//! journal their own events (equips, drops, hits, kills), so plugin events
//! come last, in sorted output order.
//!
//! After the buffer swap the journal is readable through
//! `Simulation::events()` until the next tick begins.

use tracing::debug;

use crate::arena::Arena;
use crate::output::{OutputEnvelope, OutputKind};

use super::Resolver;

/// Resolver that journals event outputs.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::EventResolver;
/// use skirmish_core::resolver::Resolver;
/// use skirmish_core::output::OutputKind;
///
/// let resolver = EventResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Event));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventResolver;

impl EventResolver {
    /// Creates a new event resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for EventResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Event]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], _current: &Arena, next: &mut Arena) {
        for envelope in outputs {
            if let Some(event) = envelope.output().as_event() {
                debug!(
                    entity = %event.primary_entity(),
                    source = %envelope.source(),
                    trace = %envelope.trace_id(),
                    tick = envelope.tick(),
                    ?event,
                    "event"
                );
                next.record_event(event.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::output::{Command, Event, Output, PluginId, PluginInstanceId, RetireCause, TraceId};

    fn make_envelope(output: Output, entity: EntityId) -> OutputEnvelope {
        OutputEnvelope::new(
            output,
            PluginInstanceId::new(entity, PluginId::new("test")),
            TraceId::new(0),
            0,
            0,
        )
    }

    mod resolver_trait_tests {
        use super::*;

        #[test]
        fn handles_event_kind() {
            let resolver = EventResolver::new();
            assert!(resolver.handles().contains(&OutputKind::Event));
            assert!(!resolver.handles().contains(&OutputKind::Command));
            assert!(!resolver.handles().contains(&OutputKind::Modifier));
        }
    }

    mod journal_tests {
        use super::*;

        #[test]
        fn events_in_order() {
            let mut arena = Arena::new();
            let shooter = EntityId::new(0);

            let fired = make_envelope(
                Output::Event(Event::WeaponFired {
                    shooter,
                    ammo_left: 19,
                }),
                shooter,
            );
            let retired = make_envelope(
                Output::Event(Event::ProjectileRetired {
                    projectile: EntityId::new(3),
                    cause: RetireCause::Expired,
                }),
                EntityId::new(3),
            );

            let current = arena.clone();
            EventResolver::new().resolve(&[&fired, &retired], &current, &mut arena);

            assert_eq!(arena.events().len(), 2);
            assert!(matches!(
                arena.events()[0],
                Event::WeaponFired { ammo_left: 19, .. }
            ));
            assert!(matches!(
                arena.events()[1],
                Event::ProjectileRetired {
                    cause: RetireCause::Expired,
                    ..
                }
            ));
        }

        #[test]
        fn ignores_command_outputs() {
            let mut arena = Arena::new();
            let envelope = make_envelope(
                Output::Command(Command::Despawn {
                    target: EntityId::new(1),
                }),
                EntityId::new(1),
            );

            let current = arena.clone();
            EventResolver::new().resolve(&[&envelope], &current, &mut arena);
            assert!(arena.events().is_empty());
        }

        #[test]
        fn begin_frame_clears_journal() {
            let mut arena = Arena::new();
            let envelope = make_envelope(
                Output::Event(Event::EnemyKilled {
                    enemy: EntityId::new(2),
                }),
                EntityId::new(2),
            );

            let current = arena.clone();
            EventResolver::new().resolve(&[&envelope], &current, &mut arena);
            assert_eq!(arena.events().len(), 1);

            arena.begin_frame();
            assert!(arena.events().is_empty());
        }
    }
}
