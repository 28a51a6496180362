//! Physics resolver for movement commands and physics integration.
//!
//! The `PhysicsResolver` handles:
//! - `SetVelocity`, `ApplyImpulse`: update body velocity
//! - `SetOrientation`: update yaw and pitch
//! - `Navigate`: set or clear an enemy's navigation destination
//! - Steering, gravity and integration: `position += velocity * dt` each tick
//! - Push-out of solid spheres from static boxes
//! - Contact detection: pairs that started overlapping this tick
//!
//! # Fixed Timestep
//!
//! The physics resolver uses a fixed timestep, 1/60 s unless configured
//! otherwise. This keeps the integration deterministic regardless of actual
//! frame time.

use std::collections::BTreeSet;

use glam::Vec3;
use tracing::warn;

use crate::arena::{Arena, Contact, FIXED_DT};
use crate::entity::components::yaw_towards;
use crate::entity::{ColliderState, CollisionLayers, EnemyComponents, EntityId, Shape};
use crate::geometry::{Aabb, WorldShape};
use crate::output::{Command, OutputEnvelope, OutputKind};

use super::Resolver;

/// Gravitational acceleration along Y (m/s²).
pub const GRAVITY: f32 = -9.81;

/// Horizontal distance at which an agent counts as arrived (m).
const ARRIVAL_DISTANCE: f32 = 1e-4;

/// Resolver for physics-related commands and integration.
///
/// # Processing Order
///
/// 1. Apply motion commands in output order
/// 2. Steer navigation agents straight at their destination
/// 3. Apply gravity and integrate positions
/// 4. Push solid spheres out of the static boxes their mask accepts
/// 5. Record contacts that began this tick
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::PhysicsResolver;
/// use skirmish_core::resolver::Resolver;
/// use skirmish_core::output::OutputKind;
///
/// let resolver = PhysicsResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Command));
/// ```
#[derive(Debug, Clone)]
pub struct PhysicsResolver {
    /// Fixed timestep for physics integration
    dt: f32,
}

impl Default for PhysicsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsResolver {
    /// Creates a new physics resolver with the default fixed timestep.
    #[must_use]
    pub fn new() -> Self {
        Self { dt: FIXED_DT }
    }

    /// Creates a physics resolver with a custom timestep.
    ///
    /// A zero timestep applies commands without moving anything, which is
    /// handy in tests.
    #[must_use]
    pub fn with_dt(dt: f32) -> Self {
        Self { dt }
    }

    /// Returns the timestep used for physics integration.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    fn apply_command(next: &mut Arena, command: &Command) {
        match *command {
            Command::SetVelocity { target, velocity } => {
                match next.get_mut(target).and_then(|e| e.inner_mut().body_mut()) {
                    Some(body) => body.velocity = velocity,
                    None => warn!(%target, "SetVelocity for entity without a body"),
                }
            }
            Command::ApplyImpulse { target, impulse } => {
                match next.get_mut(target).and_then(|e| e.inner_mut().body_mut()) {
                    Some(body) => body.velocity += impulse,
                    None => warn!(%target, "ApplyImpulse for entity without a body"),
                }
            }
            Command::SetOrientation { target, yaw, pitch } => match next.get_mut(target) {
                Some(entity) => {
                    let transform = entity.inner_mut().transform_mut();
                    transform.yaw = yaw;
                    transform.pitch = pitch;
                }
                None => warn!(%target, "SetOrientation for missing entity"),
            },
            Command::Navigate {
                target,
                destination,
            } => match next.get_mut(target).and_then(|e| e.as_enemy_mut()) {
                Some(enemy) if enemy.vitals.alive => enemy.agent.destination = destination,
                Some(_) => {}
                None => warn!(%target, "Navigate for missing enemy"),
            },
            _ => {}
        }
    }

    /// Straight-line stand-in for a navigation agent: head for the
    /// destination on the XZ plane at agent speed, never overshooting.
    fn steer(enemy: &mut EnemyComponents, dt: f32) {
        if !enemy.vitals.alive {
            return;
        }

        let mut horizontal = Vec3::ZERO;
        if let Some(destination) = enemy.agent.destination {
            let mut offset = destination - enemy.transform.position;
            offset.y = 0.0;
            let distance = offset.length();
            if distance > ARRIVAL_DISTANCE && dt > 0.0 {
                let speed = enemy.agent.speed.min(distance / dt);
                horizontal = offset / distance * speed;
            }
        }

        enemy.body.velocity.x = horizontal.x;
        enemy.body.velocity.z = horizontal.z;
        if let Some(yaw) = yaw_towards(Vec3::ZERO, horizontal) {
            enemy.transform.yaw = yaw;
        }
    }

    /// Steering, gravity, then `position += velocity * dt`.
    fn integrate(&self, next: &mut Arena) {
        let dt = self.dt;
        for entity in next.entities_sorted_mut() {
            let inner = entity.inner_mut();
            if let Some(enemy) = inner.as_enemy_mut() {
                Self::steer(enemy, dt);
            }
            let Some(body) = inner.body_mut() else {
                continue;
            };
            if body.gravity {
                body.velocity.y += GRAVITY * dt;
            }
            let velocity = body.velocity;
            inner.transform_mut().position += velocity * dt;
        }
    }

    /// Moves solid spheres out of static boxes and removes the velocity
    /// component pointing into the surface.
    fn push_out(next: &mut Arena) {
        let statics: Vec<(CollisionLayers, Aabb)> = next
            .entities_sorted()
            .filter_map(|entity| {
                let collider = entity.collider()?;
                match collider.shape {
                    Shape::Box { half_extents } => Some((
                        collider.layer,
                        Aabb::from_center_half_extents(entity.transform().position, half_extents),
                    )),
                    Shape::Sphere { .. } => None,
                }
            })
            .collect();
        if statics.is_empty() {
            return;
        }

        for entity in next.entities_sorted_mut() {
            let Some(collider) = entity.collider().copied() else {
                continue;
            };
            let Some(radius) = collider.radius() else {
                continue;
            };
            let inner = entity.inner_mut();
            let Some(mut velocity) = inner.body().filter(|b| b.solid).map(|b| b.velocity) else {
                continue;
            };

            let mut position = inner.transform().position;
            for (layer, aabb) in &statics {
                if !collider.mask.intersects(*layer) {
                    continue;
                }
                if let Some(push) = aabb.sphere_push_out(position, radius) {
                    position += push;
                    let normal = push.normalize_or_zero();
                    let into = velocity.dot(normal);
                    if into < 0.0 {
                        velocity -= normal * into;
                    }
                }
            }

            inner.transform_mut().position = position;
            if let Some(body) = inner.body_mut() {
                body.velocity = velocity;
            }
        }
    }

    /// Collects overlapping pairs where at least one side's mask accepts the
    /// other's layer, and hands them to the arena's contact tracking.
    fn detect_contacts(next: &mut Arena) {
        let placed: Vec<(EntityId, ColliderState, WorldShape)> = next
            .entities_sorted()
            .filter_map(|entity| {
                let collider = entity.collider()?;
                Some((
                    entity.id(),
                    *collider,
                    WorldShape::of(collider, entity.transform().position),
                ))
            })
            .collect();

        let mut overlapping = BTreeSet::new();
        for (i, (a, collider_a, shape_a)) in placed.iter().enumerate() {
            for (b, collider_b, shape_b) in &placed[i + 1..] {
                let interested = collider_a.mask.intersects(collider_b.layer)
                    || collider_b.mask.intersects(collider_a.layer);
                if interested && shape_a.overlaps(shape_b) {
                    overlapping.insert(Contact::new(*a, *b));
                }
            }
        }
        next.update_touching(overlapping);
    }
}

impl Resolver for PhysicsResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], _current: &Arena, next: &mut Arena) {
        // Process commands in order (deterministic)
        for envelope in outputs {
            if let Some(command) = envelope.output().as_command() {
                Self::apply_command(next, command);
            }
        }

        self.integrate(next);
        Self::push_out(next);
        Self::detect_contacts(next);
    }
}
