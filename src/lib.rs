//! Pixel Artillery - turn-based artillery combat on destructible terrain
//!
//! Core modules:
//! - `sim`: Simulation engine (terrain, ballistics, explosions, locomotion, grapple, turns)
//! - `config`: Operator-tunable match configuration

pub mod config;
pub mod sim;

pub use config::{ConfigError, MatchConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, all per-tick constants assume this rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (world units == terrain cells)
    pub const WORLD_WIDTH: u32 = 1024;
    pub const WORLD_HEIGHT: u32 = 576;
    /// Distance of the water line above the bottom edge of the world
    pub const FLOOR_MARGIN: f32 = 10.0;

    /// Coverage above this value counts as solid (>50%)
    pub const SOLID_THRESHOLD: u8 = 128;
    /// Neighborhood radius used for surface normals
    pub const NORMAL_SAMPLE_RADIUS: i32 = 2;

    /// Worm body radius; the torso sits this far above the foot position
    pub const WORM_RADIUS: f32 = 6.0;
    pub const STARTING_HP: u32 = 100;

    /// Explosion damage reaches zero at this multiple of the carve radius
    pub const DAMAGE_FALLOFF_FACTOR: f32 = 1.8;
    /// Peak knockback speed at the explosion center
    pub const KNOCKBACK_SPEED: f32 = 5.0;
    /// Upward bias added to every knockback
    pub const KNOCKBACK_LIFT: f32 = 1.5;

    /// Horizontal drag while free-falling
    pub const FALL_DRAG: f32 = 0.98;
    /// Drag on both axes while hanging from a rope
    pub const ROPE_DRAG: f32 = 0.99;

    /// Resting friction once a grenade has no bounces left
    pub const GRENADE_REST_DAMPING: (f32, f32) = (0.8, 0.5);
    /// Distance a bounced grenade is pushed off the surface
    pub const GRENADE_SURFACE_NUDGE: f32 = 2.5;
    /// Largest displacement of a single projectile sub-step
    pub const MAX_SUBSTEP_DISTANCE: f32 = 2.0;

    /// Particle tuning
    pub const MAX_PARTICLES: usize = 512;
    pub const PARTICLE_DECAY: f32 = 0.02;
    pub const PARTICLE_GRAVITY_SCALE: f32 = 0.4;
    pub const PARTICLE_SPREAD: f32 = 4.0;
    /// One particle per this many units of blast radius
    pub const PARTICLE_RADIUS_STEP: f32 = 1.5;
}

/// Point at the torso of a worm standing at `foot`
#[inline]
pub fn torso_of(foot: Vec2) -> Vec2 {
    Vec2::new(foot.x, foot.y - consts::WORM_RADIUS)
}

/// Unit vector pointing along `angle` (radians, y down)
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
