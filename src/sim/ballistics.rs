//! Projectile ballistics
//!
//! Every projectile shares one sub-stepped integration loop; what happens on
//! terrain contact is decided by its `Behavior` variant.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::terrain::TerrainField;
use super::weapons::{BurstSpec, ExplosiveSpec, GrenadeSpec, WeaponKind};
use crate::consts::{
    GRENADE_REST_DAMPING, GRENADE_SURFACE_NUDGE, MAX_SUBSTEP_DISTANCE, NORMAL_SAMPLE_RADIUS,
};

/// Contact behavior of a projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Explodes on first contact; drifts with the wind
    Shell,
    /// Burst round: explodes on first contact, ignores wind
    Bullet,
    /// Bounces until out of bounces, then grinds to a halt; bursts when the fuse runs out
    Grenade {
        bounces: u32,
        /// Ticks left before detonation
        fuse: f32,
        restitution: f32,
    },
    /// Flies straight, ignoring gravity and wind, until it bites terrain
    Hook { max_length: f32 },
}

impl Behavior {
    fn feels_gravity(&self) -> bool {
        !matches!(self, Behavior::Hook { .. })
    }

    fn feels_wind(&self) -> bool {
        matches!(self, Behavior::Shell | Behavior::Grenade { .. })
    }
}

/// An in-flight projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub weapon: WeaponKind,
    pub behavior: Behavior,
    /// Terrain carve radius of the resulting explosion
    pub blast_radius: f32,
    pub max_damage: u32,
    /// Index of the worm that fired it
    pub owner: usize,
}

/// How a projectile left the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Impact {
    Explode {
        pos: Vec2,
        radius: f32,
        max_damage: u32,
    },
    HookAttached {
        anchor: Vec2,
        length: f32,
    },
    /// Gone without effect (sank, out of range, out of the world)
    Lost,
}

/// Result of advancing a projectile one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Continue,
    Terminate(Impact),
}

/// World inputs for one projectile tick
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub terrain: &'a TerrainField,
    pub gravity: f32,
    pub wind: f32,
    /// Torso of the firing worm (hook range and rope length are measured from here)
    pub origin: Vec2,
}

/// Reflect `vel` off a surface with outward normal `normal`
///
/// The normal component is reversed and scaled by `restitution`; the
/// tangential component is kept as is.
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let normal_part = vel.dot(normal) * normal;
    let tangential = vel - normal_part;
    tangential - normal_part * restitution
}

impl Projectile {
    /// Bazooka shell
    pub fn shell(origin: Vec2, angle: f32, power: f32, spec: &ExplosiveSpec, owner: usize) -> Self {
        Self {
            pos: origin,
            vel: crate::direction(angle) * spec.launch_speed(power),
            radius: spec.projectile_radius,
            weapon: WeaponKind::Bazooka,
            behavior: Behavior::Shell,
            blast_radius: spec.blast_radius,
            max_damage: spec.max_damage,
            owner,
        }
    }

    pub fn grenade(origin: Vec2, angle: f32, power: f32, spec: &GrenadeSpec, owner: usize) -> Self {
        Self {
            pos: origin,
            vel: crate::direction(angle) * spec.launch.launch_speed(power),
            radius: spec.launch.projectile_radius,
            weapon: WeaponKind::Grenade,
            behavior: Behavior::Grenade {
                bounces: spec.bounces,
                fuse: spec.fuse_ticks,
                restitution: spec.restitution,
            },
            blast_radius: spec.launch.blast_radius,
            max_damage: spec.launch.max_damage,
            owner,
        }
    }

    /// One machine-gun round; `jitter` is added to the aimed velocity
    pub fn bullet(origin: Vec2, angle: f32, jitter: Vec2, spec: &BurstSpec, owner: usize) -> Self {
        Self {
            pos: origin,
            vel: crate::direction(angle) * spec.speed + jitter,
            radius: spec.projectile_radius,
            weapon: WeaponKind::MachineGun,
            behavior: Behavior::Bullet,
            blast_radius: spec.blast_radius,
            max_damage: spec.max_damage,
            owner,
        }
    }

    pub fn hook(origin: Vec2, angle: f32, speed: f32, max_length: f32, owner: usize) -> Self {
        Self {
            pos: origin,
            vel: crate::direction(angle) * speed,
            radius: 2.0,
            weapon: WeaponKind::GrapplingHook,
            behavior: Behavior::Hook { max_length },
            blast_radius: 0.0,
            max_damage: 0,
            owner,
        }
    }

    /// Remaining fuse, for timed projectiles
    pub fn fuse(&self) -> Option<f32> {
        match self.behavior {
            Behavior::Grenade { fuse, .. } => Some(fuse),
            _ => None,
        }
    }

    fn explode_here(&self) -> Impact {
        Impact::Explode {
            pos: self.pos,
            radius: self.blast_radius,
            max_damage: self.max_damage,
        }
    }

    /// Advance one tick
    ///
    /// Movement is split into sub-steps of at most `MAX_SUBSTEP_DISTANCE`
    /// so fast projectiles cannot skip over thin terrain. Contact is checked
    /// before the fuse, so a grenade that lands on its last tick bursts where
    /// it landed.
    pub fn advance(&mut self, ctx: &StepContext) -> Step {
        if self.behavior.feels_gravity() {
            self.vel.y += ctx.gravity;
        }
        if self.behavior.feels_wind() {
            self.vel.x += ctx.wind;
        }

        let steps = (self.vel.length() / MAX_SUBSTEP_DISTANCE).ceil().max(1.0) as u32;
        let fraction = 1.0 / steps as f32;
        let floor = ctx.terrain.floor_line();

        for _ in 0..steps {
            self.pos += self.vel * fraction;
            if let Behavior::Grenade { fuse, .. } = &mut self.behavior {
                *fuse -= fraction;
            }

            let below_floor = self.pos.y > floor;
            if below_floor || ctx.terrain.is_solid_at(self.pos) {
                if let Some(impact) = self.on_contact(ctx, below_floor) {
                    return Step::Terminate(impact);
                }
            }

            if let Behavior::Hook { max_length } = self.behavior {
                if self.pos.distance(ctx.origin) > max_length {
                    return Step::Terminate(Impact::Lost);
                }
            }
        }

        if self.fuse().is_some_and(|fuse| fuse <= 0.0) {
            return Step::Terminate(self.explode_here());
        }

        // Drifted a full world width off either side
        let width = ctx.terrain.width() as f32;
        if self.pos.x < -width || self.pos.x > 2.0 * width {
            return Step::Terminate(Impact::Lost);
        }

        Step::Continue
    }

    /// Terrain or water-line contact; `None` means keep flying
    fn on_contact(&mut self, ctx: &StepContext, below_floor: bool) -> Option<Impact> {
        match self.behavior {
            Behavior::Shell | Behavior::Bullet => Some(self.explode_here()),
            Behavior::Hook { .. } => {
                if below_floor {
                    return Some(Impact::Lost);
                }
                Some(Impact::HookAttached {
                    anchor: self.pos,
                    length: self.pos.distance(ctx.origin),
                })
            }
            Behavior::Grenade {
                ref mut bounces,
                restitution,
                ..
            } => {
                if below_floor {
                    return Some(Impact::Lost);
                }
                if *bounces > 0 {
                    let normal =
                        ctx.terrain
                            .surface_normal(self.pos.x, self.pos.y, NORMAL_SAMPLE_RADIUS);
                    self.vel = reflect(self.vel, normal, restitution);
                    *bounces -= 1;
                    self.pos += normal * GRENADE_SURFACE_NUDGE;
                } else {
                    let (damp_x, damp_y) = GRENADE_REST_DAMPING;
                    self.vel.x *= damp_x;
                    self.vel.y *= damp_y;
                }
                None
            }
        }
    }
}
