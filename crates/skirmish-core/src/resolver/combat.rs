//! Combat resolver for damage and death.
//!
//! The `CombatResolver` handles `ApplyDamage` modifiers. Each modifier is one
//! hit, applied in output order through [`EnemyComponents::take_hit`]:
//!
//! - A surviving enemy flashes and an `EnemyHit` event is recorded
//! - The hit that takes health to zero kills the enemy and records `EnemyKilled`
//! - Hits on a dead enemy are ignored, including later hits in the same tick
//!
//! [`EnemyComponents::take_hit`]: crate::entity::EnemyComponents::take_hit

use tracing::{debug, info, warn};

use crate::arena::Arena;
use crate::entity::{EntityId, HitOutcome};
use crate::output::{Event, Modifier, OutputEnvelope, OutputKind};

use super::Resolver;

/// Resolver for combat-related modifiers.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::CombatResolver;
/// use skirmish_core::resolver::Resolver;
/// use skirmish_core::output::OutputKind;
///
/// let resolver = CombatResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Modifier));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Applies one hit to an enemy and journals the outcome.
    fn apply_damage(next: &mut Arena, target: EntityId, source: EntityId, amount: i32) {
        let Some(enemy) = next.get_mut(target).and_then(|e| e.as_enemy_mut()) else {
            warn!(%target, "ApplyDamage for missing enemy");
            return;
        };

        match enemy.take_hit(amount) {
            HitOutcome::Ignored => {
                debug!(enemy = %target, "hit on dead enemy ignored");
            }
            HitOutcome::Flinched { health } => {
                debug!(enemy = %target, %source, health, "enemy hit");
                next.record_event(Event::EnemyHit {
                    enemy: target,
                    source,
                    health,
                });
            }
            HitOutcome::Killed => {
                info!(enemy = %target, %source, "enemy killed");
                next.record_event(Event::EnemyKilled { enemy: target });
            }
        }
    }
}

impl Resolver for CombatResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Modifier]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], _current: &Arena, next: &mut Arena) {
        for envelope in outputs {
            if let Some(modifier) = envelope.output().as_modifier() {
                match modifier {
                    Modifier::ApplyDamage {
                        target,
                        source,
                        amount,
                    } => Self::apply_damage(next, *target, *source, *amount),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EnemyComponents, EnemyConfig, EntityInner};
    use crate::output::{Output, PluginId, PluginInstanceId, TraceId};
    use glam::Vec3;

    fn hit(target: EntityId) -> OutputEnvelope {
        OutputEnvelope::new(
            Output::Modifier(Modifier::ApplyDamage {
                target,
                source: EntityId::new(100),
                amount: 10,
            }),
            PluginInstanceId::new(target, PluginId::new("enemy")),
            TraceId::new(0),
            0,
            0,
        )
    }

    fn arena_with_enemy() -> (Arena, EntityId) {
        let mut arena = Arena::new();
        let enemy = arena.spawn(EntityInner::Enemy(EnemyComponents::new(
            Vec3::ZERO,
            vec![],
            EnemyConfig::default(),
            None,
        )));
        (arena, enemy)
    }

    /// Applies `count` hits, one resolution per hit, and returns all events.
    fn hit_times(arena: &mut Arena, enemy: EntityId, count: usize) -> Vec<Event> {
        let resolver = CombatResolver::new();
        let mut events = Vec::new();
        for _ in 0..count {
            let envelope = hit(enemy);
            let current = arena.clone();
            arena.begin_frame();
            resolver.resolve(&[&envelope], &current, arena);
            events.extend_from_slice(arena.events());
        }
        events
    }

    #[test]
    fn handles_modifiers_only() {
        let resolver = CombatResolver::new();
        assert_eq!(resolver.handles(), &[OutputKind::Modifier]);
    }

    #[test]
    fn three_hits_flinch_without_dying() {
        let (mut arena, enemy) = arena_with_enemy();
        let events = hit_times(&mut arena, enemy, 3);

        let state = arena.get(enemy).unwrap().as_enemy().unwrap();
        assert_eq!(state.vitals.health, 70);
        assert!(state.vitals.alive);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::EnemyHit { .. }))
                .count(),
            3
        );
        assert!(!events.iter().any(|e| matches!(e, Event::EnemyKilled { .. })));
    }

    #[test]
    fn tenth_hit_kills_once_and_eleventh_is_ignored() {
        let (mut arena, enemy) = arena_with_enemy();
        let events = hit_times(&mut arena, enemy, 11);

        let state = arena.get(enemy).unwrap().as_enemy().unwrap();
        assert_eq!(state.vitals.health, 0);
        assert!(!state.vitals.alive);
        let kills: Vec<_> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Event::EnemyKilled { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(kills, vec![9]);
        assert_eq!(events.len(), 10);
    }

    #[test]
    fn hits_after_death_in_same_tick_are_ignored() {
        let (mut arena, enemy) = arena_with_enemy();
        let envelopes: Vec<_> = (0..12).map(|_| hit(enemy)).collect();
        let refs: Vec<_> = envelopes.iter().collect();
        let current = arena.clone();
        CombatResolver::new().resolve(&refs, &current, &mut arena);

        assert_eq!(arena.get(enemy).unwrap().as_enemy().unwrap().vitals.health, 0);
        assert_eq!(
            arena
                .events()
                .iter()
                .filter(|e| matches!(e, Event::EnemyKilled { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn damage_to_missing_entity_is_ignored() {
        let mut arena = Arena::new();
        let envelope = hit(EntityId::new(5));
        let current = arena.clone();
        CombatResolver::new().resolve(&[&envelope], &current, &mut arena);
        assert!(arena.events().is_empty());
    }
}
