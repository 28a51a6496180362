//! Enemy plugin: damage contacts, perception, and the behaviour state machine.
//!
//! Runs once per tick for each living enemy:
//!
//! 1. Every new contact with a damaging collider becomes an `ApplyDamage`
//!    modifier. The combat resolver applies them in order and ignores hits
//!    that land after the killing one.
//! 2. A sight ray from the enemy towards its tracked player decides
//!    visibility. The brain is advanced on a copy with a roll drawn from the
//!    per-run RNG and the resulting navigation order, facing, and brain are
//!    emitted as commands.
//! 3. A running hit flash is advanced and ended once its duration elapses.
//!
//! Dead enemies emit nothing.

use rand::Rng;
use tracing::debug;

use crate::entity::{CollisionLayers, EntityTag, NavOrder, Perception};
use crate::geometry::Ray;
use crate::output::{Command, Event, Modifier, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Plugin that drives enemies.
///
/// # Example
///
/// ```
/// use skirmish_core::plugins::EnemyPlugin;
/// use skirmish_core::plugin::Plugin;
/// use skirmish_core::output::OutputKind;
///
/// let plugin = EnemyPlugin::new();
/// assert!(plugin.declaration().emits_output(OutputKind::Modifier));
/// ```
pub struct EnemyPlugin {
    declaration: PluginDeclaration,
}

impl EnemyPlugin {
    /// Creates a new `EnemyPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("enemy"),
                required_tags: vec![EntityTag::Enemy],
                reads: vec![ComponentKind::Enemy, ComponentKind::Transform],
                emits: vec![OutputKind::Command, OutputKind::Modifier, OutputKind::Event],
            },
        }
    }
}

impl Default for EnemyPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for EnemyPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let enemy_id = ctx.entity_id;
        let Some(enemy) = view.get_enemy(enemy_id) else {
            return vec![];
        };
        if !enemy.vitals.alive {
            return vec![];
        }

        let mut outputs: Vec<Output> = vec![];
        let position = enemy.transform.position;

        // Damage
        for source in view.contacts_for(enemy_id) {
            let damaging = view
                .get_entity(source)
                .and_then(|entity| entity.collider())
                .is_some_and(|collider| collider.damaging);
            if damaging {
                outputs.push(
                    Modifier::ApplyDamage {
                        target: enemy_id,
                        source,
                        amount: enemy.config.damage_per_hit,
                    }
                    .into(),
                );
            }
        }

        // Behaviour
        let player = enemy
            .player
            .and_then(|id| view.get_transform(id).map(|t| (id, t.position)));
        if let Some((player_id, player_position)) = player {
            let player_visible = Ray::between(position, player_position)
                .and_then(|ray| {
                    view.raycast(
                        &ray,
                        enemy.config.max_vision_distance,
                        CollisionLayers::SIGHT,
                        Some(enemy_id),
                    )
                })
                .is_some_and(|hit| hit.entity == player_id);
            let perception = Perception {
                position,
                player: Some(player_position),
                player_visible,
            };

            let roll = ctx.rng().gen_range(0.0f32..100.0);
            let mut brain = enemy.brain.clone();
            let order = brain.think(
                &enemy.config,
                &perception,
                enemy.vitals.health,
                ctx.dt,
                roll,
            );

            let destination = match order {
                NavOrder::Stop => Some(None),
                NavOrder::GoTo(target) => Some(Some(target)),
                NavOrder::Keep => None,
            };
            if let Some(destination) = destination {
                if destination != enemy.agent.destination {
                    outputs.push(
                        Command::Navigate {
                            target: enemy_id,
                            destination,
                        }
                        .into(),
                    );
                }
            }

            if let Some(yaw) = brain.facing(&perception) {
                outputs.push(
                    Command::SetOrientation {
                        target: enemy_id,
                        yaw,
                        pitch: enemy.transform.pitch,
                    }
                    .into(),
                );
            }

            if brain.state != enemy.brain.state {
                debug!(
                    enemy = %enemy_id,
                    from = %enemy.brain.state,
                    to = %brain.state,
                    "state changed"
                );
                outputs.push(
                    Event::EnemyStateChanged {
                        enemy: enemy_id,
                        from: enemy.brain.state,
                        to: brain.state,
                    }
                    .into(),
                );
            }

            if brain != enemy.brain {
                outputs.push(
                    Command::SetBrain {
                        target: enemy_id,
                        brain: Box::new(brain),
                    }
                    .into(),
                );
            }
        }

        // Hit flash
        if let Some(mut blink) = enemy.blink {
            let blink = if blink.advance(ctx.dt) {
                None
            } else {
                Some(blink)
            };
            outputs.push(
                Command::SetBlink {
                    target: enemy_id,
                    blink,
                }
                .into(),
            );
        }

        outputs
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, Contact};
    use crate::entity::{
        Blink, EnemyBrain, EnemyComponents, EnemyConfig, EnemyState, EntityId, EntityInner,
        ObstacleComponents, PlayerComponents, ProjectileComponents, ProjectileSpec,
    };
    use crate::plugins::test_context;
    use glam::Vec3;
    use std::collections::BTreeSet;

    struct Setup {
        arena: Arena,
        enemy: EntityId,
        player: EntityId,
    }

    fn setup(player_at: Vec3, route: Vec<Vec3>) -> Setup {
        let mut arena = Arena::new();
        let player = arena.spawn(EntityInner::Player(PlayerComponents::at_position(
            player_at,
        )));
        let enemy = arena.spawn(EntityInner::Enemy(EnemyComponents::new(
            Vec3::ZERO,
            route,
            EnemyConfig::default(),
            Some(player),
        )));
        Setup {
            arena,
            enemy,
            player,
        }
    }

    fn enemy_mut(setup: &mut Setup) -> &mut EnemyComponents {
        setup
            .arena
            .get_mut(setup.enemy)
            .unwrap()
            .as_enemy_mut()
            .unwrap()
    }

    fn run(setup: &Setup) -> Vec<Output> {
        let plugin = EnemyPlugin::new();
        let view = WorldView::for_plugin(
            &setup.arena,
            plugin.declaration(),
            setup.arena.current_tick(),
        );
        plugin.run(&test_context(&setup.arena, setup.enemy), &view)
    }

    fn new_brain(outputs: &[Output]) -> Option<EnemyBrain> {
        outputs.iter().find_map(|o| match o.as_command() {
            Some(Command::SetBrain { brain, .. }) => Some(brain.as_ref().clone()),
            _ => None,
        })
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn damaging_contact_emits_hit() {
            let mut s = setup(Vec3::new(50.0, 0.0, 0.0), vec![]);
            let bullet = s
                .arena
                .spawn(EntityInner::Projectile(ProjectileComponents::launched(
                    s.player,
                    Vec3::ZERO,
                    Vec3::Z,
                    &ProjectileSpec::default(),
                    0.0,
                )));
            let wall = s
                .arena
                .spawn(EntityInner::Obstacle(ObstacleComponents::wall(
                    Vec3::new(0.0, 0.0, 1.0),
                    Vec3::ONE,
                )));
            s.arena.update_touching(BTreeSet::from([
                Contact::new(s.enemy, bullet),
                Contact::new(s.enemy, wall),
            ]));

            let hits: Vec<_> = run(&s)
                .into_iter()
                .filter_map(|o| o.as_modifier().cloned())
                .collect();
            assert_eq!(
                hits,
                vec![Modifier::ApplyDamage {
                    target: s.enemy,
                    source: bullet,
                    amount: 10,
                }]
            );
        }

        #[test]
        fn dead_enemy_emits_nothing() {
            let mut s = setup(Vec3::new(3.0, 0.0, 0.0), vec![]);
            let _ = enemy_mut(&mut s).take_hit(1000);
            assert!(run(&s).is_empty());
        }
    }

    mod behaviour_tests {
        use super::*;

        #[test]
        fn visible_player_in_range_is_attacked_and_faced() {
            let s = setup(Vec3::new(3.0, 0.0, 0.0), vec![]);
            let outputs = run(&s);

            assert_eq!(new_brain(&outputs).unwrap().state, EnemyState::Attacking);
            assert!(outputs.iter().any(|o| matches!(
                o.as_event(),
                Some(Event::EnemyStateChanged {
                    from: EnemyState::Idle,
                    to: EnemyState::Attacking,
                    ..
                })
            )));
            let yaw = outputs
                .iter()
                .find_map(|o| match o.as_command() {
                    Some(Command::SetOrientation { yaw, .. }) => Some(*yaw),
                    _ => None,
                })
                .unwrap();
            assert!((yaw - 90.0).abs() < 1e-3);
        }

        #[test]
        fn visible_player_out_of_attack_range_is_chased() {
            let s = setup(Vec3::new(10.0, 0.0, 0.0), vec![]);
            let outputs = run(&s);

            assert_eq!(new_brain(&outputs).unwrap().state, EnemyState::Chasing);
            assert!(outputs.iter().any(|o| matches!(
                o.as_command(),
                Some(Command::Navigate { destination: Some(d), .. })
                    if (*d - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5
            )));
        }

        #[test]
        fn wall_blocks_sight() {
            let mut s = setup(Vec3::new(3.0, 0.0, 0.0), vec![]);
            s.arena
                .spawn(EntityInner::Obstacle(ObstacleComponents::wall(
                    Vec3::new(1.5, 0.0, 0.0),
                    Vec3::new(0.1, 2.0, 2.0),
                )));
            let outputs = run(&s);

            let brain = new_brain(&outputs).unwrap();
            assert_eq!(brain.state, EnemyState::Idle);
            assert!(!brain.can_see_player);
            assert!(!outputs
                .iter()
                .any(|o| matches!(o.as_command(), Some(Command::SetOrientation { .. }))));
        }

        #[test]
        fn patrol_navigates_to_current_point() {
            let target = Vec3::new(0.0, 0.0, -20.0);
            let mut s = setup(Vec3::new(0.0, 0.0, 40.0), vec![target]);
            enemy_mut(&mut s).brain.state = EnemyState::Patrolling;

            let outputs = run(&s);
            assert!(outputs.iter().any(|o| matches!(
                o.as_command(),
                Some(Command::Navigate { destination: Some(d), .. }) if *d == target
            )));
        }

        #[test]
        fn unchanged_destination_is_not_resent() {
            let target = Vec3::new(0.0, 0.0, -20.0);
            let mut s = setup(Vec3::new(0.0, 0.0, 40.0), vec![target]);
            let enemy = enemy_mut(&mut s);
            enemy.brain.state = EnemyState::Patrolling;
            enemy.agent.destination = Some(target);

            assert!(!run(&s)
                .iter()
                .any(|o| matches!(o.as_command(), Some(Command::Navigate { .. }))));
        }

        #[test]
        fn missing_player_skips_behaviour() {
            let mut s = setup(Vec3::new(3.0, 0.0, 0.0), vec![]);
            enemy_mut(&mut s).player = None;
            assert!(run(&s).is_empty());
        }
    }

    mod blink_tests {
        use super::*;

        #[test]
        fn running_blink_advances() {
            let mut s = setup(Vec3::new(50.0, 0.0, 0.0), vec![]);
            enemy_mut(&mut s).blink = Some(Blink::new(0.1));

            let blink = run(&s).into_iter().find_map(|o| match o.as_command() {
                Some(Command::SetBlink { blink, .. }) => Some(*blink),
                _ => None,
            });
            let blink = blink.unwrap().unwrap();
            assert!(blink.elapsed > 0.0);
        }

        #[test]
        fn finished_blink_ends() {
            let mut s = setup(Vec3::new(50.0, 0.0, 0.0), vec![]);
            enemy_mut(&mut s).blink = Some(Blink {
                elapsed: 0.095,
                duration: 0.1,
            });

            assert!(run(&s).iter().any(|o| matches!(
                o.as_command(),
                Some(Command::SetBlink { blink: None, .. })
            )));
        }
    }
}
