//! Collision geometry for the physics stand-in and spatial queries.
//!
//! Only two primitives exist: spheres (moving bodies, pickups, bullets) and
//! axis-aligned boxes (ground and walls). Overlap is strict, so two shapes
//! that merely touch do not collide.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{ColliderState, Shape};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box from centre and half extents.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Closest point inside the box to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Check if a point is inside the box (boundary included).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Check if this box strictly overlaps a sphere.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        center.distance_squared(self.closest_point(center)) < radius * radius
    }

    /// Smallest translation that moves a sphere out of this box.
    ///
    /// Returns `None` when the sphere does not overlap the box.
    #[must_use]
    pub fn sphere_push_out(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        let closest = self.closest_point(center);
        let delta = center - closest;
        let distance = delta.length();
        if distance >= radius {
            return None;
        }
        if distance > f32::EPSILON {
            return Some(delta / distance * (radius - distance));
        }

        // Centre inside the box: leave through the nearest face.
        let to_min = center - self.min;
        let to_max = self.max - center;
        let faces = [
            (to_min.x, Vec3::NEG_X),
            (to_max.x, Vec3::X),
            (to_min.y, Vec3::NEG_Y),
            (to_max.y, Vec3::Y),
            (to_min.z, Vec3::NEG_Z),
            (to_max.z, Vec3::Z),
        ];
        let (depth, normal) = faces
            .into_iter()
            .fold((f32::INFINITY, Vec3::Y), |best, face| {
                if face.0 < best.0 {
                    face
                } else {
                    best
                }
            });
        Some(normal * (depth + radius))
    }
}

/// Half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// Returns `None` for a zero direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Ray from `from` towards `to`.
    #[must_use]
    pub fn between(from: Vec3, to: Vec3) -> Option<Self> {
        Self::new(from, to - from)
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the first surface of a sphere.
    ///
    /// A ray starting inside the sphere does not hit it.
    #[must_use]
    pub fn cast_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let offset = self.origin - center;
        let c = offset.length_squared() - radius * radius;
        if c <= 0.0 {
            return None;
        }
        let b = offset.dot(self.direction);
        if b > 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        Some(-b - discriminant.sqrt())
    }

    /// Distance to the first surface of a box (slab test).
    ///
    /// A ray starting inside the box does not hit it.
    #[must_use]
    pub fn cast_aabb(&self, aabb: &Aabb) -> Option<f32> {
        if aabb.contains(self.origin) {
            return None;
        }
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
            if direction.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv = direction.recip();
            let (mut t0, mut t1) = ((lo - origin) * inv, (hi - origin) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// A collider placed in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    /// Sphere at a world position
    Sphere {
        /// Centre
        center: Vec3,
        /// Radius
        radius: f32,
    },
    /// Box in world space
    Box(Aabb),
}

impl WorldShape {
    /// Places `collider` at `position`.
    #[must_use]
    pub fn of(collider: &ColliderState, position: Vec3) -> Self {
        match collider.shape {
            Shape::Sphere { radius } => Self::Sphere {
                center: position,
                radius,
            },
            Shape::Box { half_extents } => {
                Self::Box(Aabb::from_center_half_extents(position, half_extents))
            }
        }
    }

    /// Distance along `ray` to this shape.
    #[must_use]
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        match self {
            Self::Sphere { center, radius } => ray.cast_sphere(*center, *radius),
            Self::Box(aabb) => ray.cast_aabb(aabb),
        }
    }

    /// Strict overlap with a sphere.
    #[must_use]
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        match self {
            Self::Sphere {
                center: other,
                radius: other_radius,
            } => {
                let reach = radius + other_radius;
                center.distance_squared(*other) < reach * reach
            }
            Self::Box(aabb) => aabb.intersects_sphere(center, radius),
        }
    }

    /// Strict overlap between two placed shapes. Box-box pairs never collide
    /// because static geometry does not interact with itself.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sphere { center, radius }, shape) | (shape, Self::Sphere { center, radius }) => {
                shape.overlaps_sphere(*center, *radius)
            }
            (Self::Box(_), Self::Box(_)) => false,
        }
    }
}
