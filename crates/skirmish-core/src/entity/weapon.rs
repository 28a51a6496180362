//! Held-weapon state: magazine, fire-rate gate, and the reload and recoil
//! animations.
//!
//! All timing is driven by simulation time and `dt`. Nothing here reads a
//! wall clock, so a weapon replays identically for identical inputs.
//!
//! # Reload
//!
//! A reload rotates the weapon out to `reload_offset` over half of
//! `reload_time`, then back over the other half. The magazine is refilled
//! exactly when the return half completes.
//!
//! # Recoil
//!
//! Every shot kicks the weapon back along its local -Z by `recoil_distance`
//! and returns it, each half taking `1 / recoil_speed` seconds.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

// =============================================================================
// Specs
// =============================================================================

/// Bullet parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSpec {
    /// Flight speed (m/s)
    pub speed: f32,
    /// Seconds before the bullet retires on its own
    pub lifetime: f32,
    /// Collider radius (m)
    pub radius: f32,
}

impl Default for ProjectileSpec {
    fn default() -> Self {
        Self {
            speed: 15.0,
            lifetime: 3.0,
            radius: 0.05,
        }
    }
}

/// Static description of a weapon type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSpec {
    /// Display name
    pub name: String,
    /// Magazine size
    pub capacity: u32,
    /// Minimum seconds between shots
    pub fire_rate: f32,
    /// Full reload animation duration (s)
    pub reload_time: f32,
    /// Recoil kick distance (m)
    pub recoil_distance: f32,
    /// Recoil animation speed (1/s)
    pub recoil_speed: f32,
    /// Euler angles (degrees, X/Y/Z) of the reload pose
    pub reload_offset: Vec3,
    /// Distance from the eye to the muzzle along the view direction
    pub muzzle_offset: f32,
    /// Muzzle flash lifetime (s)
    pub flash_lifetime: f32,
    /// Bullet fired by this weapon
    pub projectile: ProjectileSpec,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            name: "rifle".to_string(),
            capacity: 20,
            fire_rate: 0.15,
            reload_time: 1.0,
            recoil_distance: 0.1,
            recoil_speed: 15.0,
            reload_offset: Vec3::new(66.0, 50.0, 50.0),
            muzzle_offset: 0.8,
            flash_lifetime: 0.05,
            projectile: ProjectileSpec::default(),
        }
    }
}

// =============================================================================
// Animations
// =============================================================================

/// Half of a there-and-back animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimPhase {
    /// Moving away from the rest pose
    Out,
    /// Returning to the rest pose
    Back,
}

/// Running reload animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReloadAnim {
    /// Current half
    pub phase: AnimPhase,
    /// Seconds elapsed in the current half
    pub elapsed: f32,
}

/// Running recoil animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoilAnim {
    /// Current half
    pub phase: AnimPhase,
    /// Progress through the current half, `0..=1`
    pub progress: f32,
}

impl RecoilAnim {
    const fn start() -> Self {
        Self {
            phase: AnimPhase::Out,
            progress: 0.0,
        }
    }
}

/// Local pose of the weapon model relative to its rest position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponPose {
    /// Position offset (recoil)
    pub offset: Vec3,
    /// Rotation (reload)
    pub rotation: Quat,
}

impl Default for WeaponPose {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

// =============================================================================
// Weapon State
// =============================================================================

/// Result of pulling the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// A reload is running
    Reloading,
    /// The fire-rate gate has not opened yet
    CoolingDown,
    /// The magazine was empty; a reload began instead
    ReloadStarted,
    /// One round was fired
    Fired,
}

/// A held weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    spec: WeaponSpec,
    ammo: u32,
    next_fire_time: f32,
    reload: Option<ReloadAnim>,
    recoil: Option<RecoilAnim>,
    pose: WeaponPose,
}

impl WeaponState {
    /// Fully loaded weapon at rest.
    #[must_use]
    pub fn new(spec: WeaponSpec) -> Self {
        Self {
            ammo: spec.capacity,
            spec,
            next_fire_time: 0.0,
            reload: None,
            recoil: None,
            pose: WeaponPose::default(),
        }
    }

    /// Static description.
    #[must_use]
    pub const fn spec(&self) -> &WeaponSpec {
        &self.spec
    }

    /// Rounds in the magazine.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Earliest time the next shot may fire.
    #[must_use]
    pub const fn next_fire_time(&self) -> f32 {
        self.next_fire_time
    }

    /// True while the reload animation runs.
    #[must_use]
    pub const fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    /// True while the recoil animation runs.
    #[must_use]
    pub const fn is_recoiling(&self) -> bool {
        self.recoil.is_some()
    }

    /// Current model pose.
    #[must_use]
    pub const fn pose(&self) -> &WeaponPose {
        &self.pose
    }

    /// Pulls the trigger at simulation time `now`.
    pub fn shoot(&mut self, now: f32) -> ShotOutcome {
        if self.is_reloading() {
            return ShotOutcome::Reloading;
        }
        if now < self.next_fire_time {
            return ShotOutcome::CoolingDown;
        }
        if self.ammo == 0 {
            self.start_reload();
            return ShotOutcome::ReloadStarted;
        }

        self.next_fire_time = now + self.spec.fire_rate;
        self.ammo -= 1;
        self.recoil = Some(RecoilAnim::start());
        ShotOutcome::Fired
    }

    /// Starts a reload unless one is running or the magazine is full.
    pub fn try_reload(&mut self) -> bool {
        if self.is_reloading() || self.ammo >= self.spec.capacity {
            return false;
        }
        self.start_reload();
        true
    }

    fn start_reload(&mut self) {
        self.reload = Some(ReloadAnim {
            phase: AnimPhase::Out,
            elapsed: 0.0,
        });
    }

    fn reload_pose(&self) -> Quat {
        let offset = self.spec.reload_offset;
        Quat::from_euler(
            EulerRot::YXZ,
            offset.y.to_radians(),
            offset.x.to_radians(),
            offset.z.to_radians(),
        )
    }

    /// Advances the animations by `dt`.
    ///
    /// Returns `true` on the tick the reload completes and the magazine is
    /// refilled.
    pub fn advance(&mut self, dt: f32) -> bool {
        let completed = self.advance_reload(dt);
        self.advance_recoil(dt);
        completed
    }

    fn advance_reload(&mut self, dt: f32) -> bool {
        let Some(mut reload) = self.reload.take() else {
            return false;
        };

        let half = self.spec.reload_time * 0.5;
        reload.elapsed += dt;
        let t = if half > 0.0 {
            (reload.elapsed / half).min(1.0)
        } else {
            1.0
        };
        let target = self.reload_pose();

        match reload.phase {
            AnimPhase::Out => {
                self.pose.rotation = Quat::IDENTITY.slerp(target, t);
                if reload.elapsed >= half {
                    reload = ReloadAnim {
                        phase: AnimPhase::Back,
                        elapsed: 0.0,
                    };
                }
                self.reload = Some(reload);
                false
            }
            AnimPhase::Back => {
                if reload.elapsed >= half {
                    self.pose.rotation = Quat::IDENTITY;
                    self.ammo = self.spec.capacity;
                    true
                } else {
                    self.pose.rotation = target.slerp(Quat::IDENTITY, t);
                    self.reload = Some(reload);
                    false
                }
            }
        }
    }

    fn advance_recoil(&mut self, dt: f32) {
        let Some(mut recoil) = self.recoil.take() else {
            return;
        };

        let kicked = Vec3::new(0.0, 0.0, -self.spec.recoil_distance);
        recoil.progress += dt * self.spec.recoil_speed;
        let t = recoil.progress.min(1.0);

        match recoil.phase {
            AnimPhase::Out => {
                self.pose.offset = Vec3::ZERO.lerp(kicked, t);
                if recoil.progress >= 1.0 {
                    recoil = RecoilAnim {
                        phase: AnimPhase::Back,
                        progress: 0.0,
                    };
                }
                self.recoil = Some(recoil);
            }
            AnimPhase::Back => {
                if recoil.progress >= 1.0 {
                    self.pose.offset = Vec3::ZERO;
                } else {
                    self.pose.offset = kicked.lerp(Vec3::ZERO, t);
                    self.recoil = Some(recoil);
                }
            }
        }
    }
}
