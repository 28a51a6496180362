//! Component structs for entity types.
//!
//! Components are plain data: every rule that changes them lives in a plugin
//! or a resolver. Angles are stored in degrees, positions in metres, and the
//! world is Y-up with yaw 0 facing +Z.
//!
//! The larger behaviour objects (weapon fire control, enemy brain) are kept
//! in their own modules and embedded here.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::enemy::{Blink, EnemyBrain, EnemyConfig, PatrolRoute, Vitals};
use super::weapon::{ProjectileSpec, WeaponSpec, WeaponState};
use super::EntityId;
use crate::input::ControllerState;

// =============================================================================
// Transform
// =============================================================================

/// Position and orientation of an entity.
///
/// Orientation is stored as Euler angles in degrees. `pitch` is positive when
/// looking down; `roll` is only ever touched by the death tilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World-space position
    pub position: Vec3,
    /// Rotation about +Y in degrees (0 faces +Z)
    pub yaw: f32,
    /// Rotation about the local X axis in degrees (positive looks down)
    pub pitch: f32,
    /// Rotation about the local Z axis in degrees
    pub roll: f32,
}

impl TransformState {
    /// Creates a transform at `position` with no rotation.
    #[must_use]
    pub const fn at_position(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }

    /// Unit view direction including pitch.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        Vec3::new(sy * cp, -sp, cy * cp)
    }

    /// Unit facing direction on the horizontal plane.
    #[must_use]
    pub fn flat_forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(sy, 0.0, cy)
    }

    /// Unit right vector on the horizontal plane.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(cy, 0.0, -sy)
    }
}

/// Yaw in degrees that faces from `from` towards `to` on the horizontal plane.
///
/// Returns `None` when the two points are vertically aligned.
#[must_use]
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let delta = to - from;
    if delta.x.abs() < f32::EPSILON && delta.z.abs() < f32::EPSILON {
        return None;
    }
    Some(delta.x.atan2(delta.z).to_degrees())
}

// =============================================================================
// Body
// =============================================================================

/// Rigid-body state consumed by the physics stand-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Linear velocity (m/s)
    pub velocity: Vec3,
    /// Whether gravity accelerates this body
    pub gravity: bool,
    /// Whether static geometry pushes this body out of overlap
    pub solid: bool,
    /// Whether physics may tip the body over
    pub rotation_locked: bool,
}

impl BodyState {
    /// A solid body affected by gravity (the player).
    #[must_use]
    pub const fn dynamic() -> Self {
        Self {
            velocity: Vec3::ZERO,
            gravity: true,
            solid: true,
            rotation_locked: true,
        }
    }

    /// A solid body that only moves when steered (enemies).
    #[must_use]
    pub const fn kinematic() -> Self {
        Self {
            velocity: Vec3::ZERO,
            gravity: false,
            solid: true,
            rotation_locked: true,
        }
    }

    /// A non-solid body flying in a straight line (bullets).
    #[must_use]
    pub const fn ballistic(velocity: Vec3) -> Self {
        Self {
            velocity,
            gravity: false,
            solid: false,
            rotation_locked: true,
        }
    }
}

// =============================================================================
// Collision
// =============================================================================

bitflags! {
    /// Collision layers used for filtering contacts and spatial queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CollisionLayers: u32 {
        /// The player body
        const PLAYER = 1 << 0;
        /// Enemy bodies
        const ENEMY = 1 << 1;
        /// Bullets
        const PROJECTILE = 1 << 2;
        /// Weapons lying in the world
        const PICKUP = 1 << 3;
        /// Walkable ground
        const GROUND = 1 << 4;
        /// Walls and other static blockers
        const OBSTACLE = 1 << 5;
    }
}

impl CollisionLayers {
    /// Layers that block sight lines and the pickup look ray.
    pub const SIGHT: Self = Self::PLAYER
        .union(Self::ENEMY)
        .union(Self::PICKUP)
        .union(Self::GROUND)
        .union(Self::OBSTACLE);

    /// Static level geometry.
    pub const STATIC: Self = Self::GROUND.union(Self::OBSTACLE);
}

/// Collider geometry, centred on the owner's transform position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Sphere with the given radius
    Sphere {
        /// Radius in metres
        radius: f32,
    },
    /// Axis-aligned box with the given half extents
    Box {
        /// Half size along each axis
        half_extents: Vec3,
    },
}

/// Collider attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderState {
    /// Geometry
    pub shape: Shape,
    /// Layer this collider lives on
    pub layer: CollisionLayers,
    /// Layers this collider reports contacts with
    pub mask: CollisionLayers,
    /// Whether touching this collider counts as a damaging hit
    pub damaging: bool,
}

impl ColliderState {
    /// Sphere collider.
    #[must_use]
    pub const fn sphere(radius: f32, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        Self {
            shape: Shape::Sphere { radius },
            layer,
            mask,
            damaging: false,
        }
    }

    /// Box collider. Static boxes report no contacts of their own.
    #[must_use]
    pub const fn cuboid(half_extents: Vec3, layer: CollisionLayers) -> Self {
        Self {
            shape: Shape::Box { half_extents },
            layer,
            mask: CollisionLayers::empty(),
            damaging: false,
        }
    }

    /// Marks the collider as damaging.
    #[must_use]
    pub const fn damaging(mut self) -> Self {
        self.damaging = true;
        self
    }

    /// Radius of a sphere collider, `None` for boxes.
    #[must_use]
    pub const fn radius(&self) -> Option<f32> {
        match self.shape {
            Shape::Sphere { radius } => Some(radius),
            Shape::Box { .. } => None,
        }
    }
}

// =============================================================================
// Materials
// =============================================================================

/// Opaque render material handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material:{}", self.0)
    }
}

/// Per-slot materials with the originals remembered for restoration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSlots {
    original: Vec<MaterialId>,
    current: Vec<MaterialId>,
}

impl MaterialSlots {
    /// Creates slots showing their original materials.
    #[must_use]
    pub fn new(original: Vec<MaterialId>) -> Self {
        Self {
            current: original.clone(),
            original,
        }
    }

    /// Shows `material` in every slot.
    pub fn apply_all(&mut self, material: MaterialId) {
        self.current.iter_mut().for_each(|slot| *slot = material);
    }

    /// Puts the original materials back.
    pub fn restore(&mut self) {
        self.current.clone_from(&self.original);
    }

    /// Materials currently shown.
    #[must_use]
    pub fn current(&self) -> &[MaterialId] {
        &self.current
    }

    /// Materials the entity was created with.
    #[must_use]
    pub fn original(&self) -> &[MaterialId] {
        &self.original
    }

    /// True when every slot shows its original material.
    #[must_use]
    pub fn is_original(&self) -> bool {
        self.current == self.original
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Navigation agent: steers towards a destination on the walkable plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavAgent {
    /// Current destination, `None` when stopped
    pub destination: Option<Vec3>,
    /// Steering speed (m/s)
    pub speed: f32,
}

impl NavAgent {
    /// Stopped agent with the given speed.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self {
            destination: None,
            speed,
        }
    }
}

// =============================================================================
// Player
// =============================================================================

/// Walking and jumping tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocomotionConfig {
    /// Horizontal speed (m/s)
    pub move_speed: f32,
    /// Upward velocity applied by a jump (m/s)
    pub jump_force: f32,
    /// Ground probe radius below the feet
    pub ground_distance: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 5.0,
            ground_distance: 0.4,
        }
    }
}

/// Mouse-look tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookConfig {
    /// Degrees per unit of look input per second
    pub sensitivity: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self { sensitivity: 50.0 }
    }
}

/// Components for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerComponents {
    /// Body centre and view angles
    pub transform: TransformState,
    /// Rigid body
    pub body: BodyState,
    /// Body collider
    pub collider: ColliderState,
    /// Latest input
    pub controller: ControllerState,
    /// Walking tunables
    pub locomotion: LocomotionConfig,
    /// Look tunables
    pub look: LookConfig,
    /// Result of the last ground probe
    pub grounded: bool,
    /// Height of the eye above the body centre
    pub eye_height: f32,
    /// Held weapon, if any
    pub weapon: Option<WeaponState>,
}

impl PlayerComponents {
    /// Body radius of the player collider.
    pub const RADIUS: f32 = 0.5;

    /// Unarmed player standing at `position`.
    #[must_use]
    pub fn at_position(position: Vec3) -> Self {
        Self {
            transform: TransformState::at_position(position),
            body: BodyState::dynamic(),
            collider: ColliderState::sphere(
                Self::RADIUS,
                CollisionLayers::PLAYER,
                CollisionLayers::STATIC | CollisionLayers::ENEMY,
            ),
            controller: ControllerState::default(),
            locomotion: LocomotionConfig::default(),
            look: LookConfig::default(),
            grounded: false,
            eye_height: 0.6,
            weapon: None,
        }
    }

    /// Builder: equips a weapon.
    #[must_use]
    pub fn with_weapon(mut self, spec: WeaponSpec) -> Self {
        self.weapon = Some(WeaponState::new(spec));
        self
    }

    /// World-space eye position (origin of the look ray).
    #[must_use]
    pub fn eye_position(&self) -> Vec3 {
        self.transform.position + Vec3::Y * self.eye_height
    }

    /// World-space bottom of the body (centre of the ground probe).
    #[must_use]
    pub fn feet_position(&self) -> Vec3 {
        let radius = self.collider.radius().unwrap_or(Self::RADIUS);
        self.transform.position - Vec3::Y * radius
    }
}

// =============================================================================
// Enemy
// =============================================================================

/// Components for an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyComponents {
    /// Position and facing
    pub transform: TransformState,
    /// Rigid body
    pub body: BodyState,
    /// Body collider
    pub collider: ColliderState,
    /// Navigation agent
    pub agent: NavAgent,
    /// Behaviour state machine
    pub brain: EnemyBrain,
    /// Health
    pub vitals: Vitals,
    /// Active hit flash
    pub blink: Option<Blink>,
    /// Rendered materials
    pub materials: MaterialSlots,
    /// Tunables
    pub config: EnemyConfig,
    /// The player this enemy hunts, injected at construction
    pub player: Option<EntityId>,
}

impl EnemyComponents {
    /// Body radius of the enemy collider.
    pub const RADIUS: f32 = 0.5;

    /// Enemy at `position` patrolling `route`.
    #[must_use]
    pub fn new(
        position: Vec3,
        route: Vec<Vec3>,
        config: EnemyConfig,
        player: Option<EntityId>,
    ) -> Self {
        Self {
            transform: TransformState::at_position(position),
            body: BodyState::kinematic(),
            collider: ColliderState::sphere(
                Self::RADIUS,
                CollisionLayers::ENEMY,
                CollisionLayers::STATIC | CollisionLayers::PLAYER | CollisionLayers::PROJECTILE,
            ),
            agent: NavAgent::new(config.agent_speed),
            brain: EnemyBrain::new(PatrolRoute::new(route), config.idle_time),
            vitals: Vitals::new(config.max_health),
            blink: None,
            materials: MaterialSlots::new(vec![config.body_material]),
            config,
            player,
        }
    }
}

// =============================================================================
// Projectile
// =============================================================================

/// Components for an in-flight bullet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileComponents {
    /// Position and flight direction
    pub transform: TransformState,
    /// Ballistic body
    pub body: BodyState,
    /// Damaging collider
    pub collider: ColliderState,
    /// Entity that fired this bullet
    pub owner: EntityId,
    /// Simulation time at launch (s)
    pub spawned_at: f32,
    /// Maximum flight time (s)
    pub lifetime: f32,
}

impl ProjectileComponents {
    /// Launches a bullet from `origin` along `direction`.
    #[must_use]
    pub fn launched(
        owner: EntityId,
        origin: Vec3,
        direction: Vec3,
        spec: &ProjectileSpec,
        now: f32,
    ) -> Self {
        let direction = direction.normalize_or_zero();
        let mut transform = TransformState::at_position(origin);
        if let Some(yaw) = yaw_towards(Vec3::ZERO, direction) {
            transform.yaw = yaw;
        }
        transform.pitch = (-direction.y).clamp(-1.0, 1.0).asin().to_degrees();

        Self {
            transform,
            body: BodyState::ballistic(direction * spec.speed),
            collider: ColliderState::sphere(
                spec.radius,
                CollisionLayers::PROJECTILE,
                CollisionLayers::STATIC | CollisionLayers::ENEMY,
            )
            .damaging(),
            owner,
            spawned_at: now,
            lifetime: spec.lifetime,
        }
    }

    /// True once the bullet has been alive for its full lifetime.
    #[must_use]
    pub fn expired(&self, now: f32) -> bool {
        now - self.spawned_at >= self.lifetime
    }
}

// =============================================================================
// Pickup
// =============================================================================

/// Components for a weapon lying in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupComponents {
    /// Position
    pub transform: TransformState,
    /// Trigger collider hit by the look ray
    pub collider: ColliderState,
    /// Weapon granted on pickup
    pub weapon: WeaponSpec,
    /// Maximum look-ray distance that highlights this pickup
    pub look_range: f32,
    /// Whether the highlight material is shown
    pub highlighted: bool,
    /// Rendered materials
    pub materials: MaterialSlots,
    /// Material shown while highlighted
    pub highlight_material: MaterialId,
    /// The player whose look ray is tested
    pub player: EntityId,
}

impl PickupComponents {
    /// Default look-ray range (m).
    pub const LOOK_RANGE: f32 = 3.0;
    /// Trigger radius (m).
    pub const RADIUS: f32 = 0.3;

    /// Pickup for `weapon` at `position`, watched by `player`.
    #[must_use]
    pub fn new(position: Vec3, weapon: WeaponSpec, player: EntityId) -> Self {
        Self {
            transform: TransformState::at_position(position),
            collider: ColliderState::sphere(
                Self::RADIUS,
                CollisionLayers::PICKUP,
                CollisionLayers::empty(),
            ),
            weapon,
            look_range: Self::LOOK_RANGE,
            highlighted: false,
            materials: MaterialSlots::new(vec![MaterialId(10)]),
            highlight_material: MaterialId(11),
            player,
        }
    }

    /// Shows or hides the highlight material.
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
        if highlighted {
            self.materials.apply_all(self.highlight_material);
        } else {
            self.materials.restore();
        }
    }
}

// =============================================================================
// Effect & Obstacle
// =============================================================================

/// Components for a short-lived visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectComponents {
    /// Position
    pub transform: TransformState,
    /// Simulation time at spawn (s)
    pub spawned_at: f32,
    /// Lifetime (s)
    pub lifetime: f32,
}

impl EffectComponents {
    /// Effect at `position` that lives for `lifetime` seconds from `now`.
    #[must_use]
    pub const fn new(position: Vec3, now: f32, lifetime: f32) -> Self {
        Self {
            transform: TransformState::at_position(position),
            spawned_at: now,
            lifetime,
        }
    }

    /// True once the effect has outlived its lifetime.
    #[must_use]
    pub fn expired(&self, now: f32) -> bool {
        now - self.spawned_at >= self.lifetime
    }
}

/// Components for static level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleComponents {
    /// Box centre
    pub transform: TransformState,
    /// Box collider
    pub collider: ColliderState,
}

impl ObstacleComponents {
    /// Walkable ground box.
    #[must_use]
    pub const fn ground(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            transform: TransformState::at_position(center),
            collider: ColliderState::cuboid(half_extents, CollisionLayers::GROUND),
        }
    }

    /// Wall or crate.
    #[must_use]
    pub const fn wall(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            transform: TransformState::at_position(center),
            collider: ColliderState::cuboid(half_extents, CollisionLayers::OBSTACLE),
        }
    }
}
