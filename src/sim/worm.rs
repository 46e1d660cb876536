//! Worms and their locomotion
//!
//! Grounded worms walk, climb small ledges, aim and jump. Airborne worms
//! integrate gravity until they land, bonk their heads, or drop into the water.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::terrain::TerrainField;
use crate::consts::FALL_DRAG;

/// A player-controlled unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worm {
    pub id: u32,
    pub name: String,
    pub team: u8,
    /// Foot position
    pub pos: Vec2,
    pub vel: Vec2,
    /// Aim angle in radians (y down)
    pub angle: f32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub hp: u32,
    pub falling: bool,
    pub dead: bool,
}

impl Worm {
    pub fn new(id: u32, name: impl Into<String>, team: u8, pos: Vec2, hp: u32) -> Self {
        let facing = if team == 0 { 1.0 } else { -1.0 };
        let angle = if team == 0 { -PI / 4.0 } else { -3.0 * PI / 4.0 };
        Self {
            id,
            name: name.into(),
            team,
            pos,
            vel: Vec2::ZERO,
            angle,
            facing,
            hp,
            falling: true,
            dead: false,
        }
    }

    /// Point weapons fire from and explosions measure to
    #[inline]
    pub fn torso(&self) -> Vec2 {
        crate::torso_of(self.pos)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn kill(&mut self) {
        self.hp = 0;
        self.dead = true;
        self.falling = false;
    }

    /// Face left (-1) or right (+1), mirroring the aim so it stays forward
    pub fn turn_to(&mut self, facing: f32) {
        if facing != self.facing {
            self.facing = facing;
            self.angle = -PI - self.angle;
        }
    }

    /// Walk one step in `dir` (-1 or +1)
    ///
    /// Ledges up to `step_height` are climbed; anything taller blocks the
    /// move entirely. The worm turns to face `dir` either way. Returns
    /// whether it moved.
    pub fn walk(&mut self, dir: f32, terrain: &TerrainField, speed: f32, step_height: f32) -> bool {
        self.turn_to(dir);

        let nx = self.pos.x + dir * speed;
        let mut ny = self.pos.y;
        if terrain.is_solid(nx, ny) {
            if terrain.is_solid(nx, ny - step_height) {
                return false;
            }
            while terrain.is_solid(nx, ny) {
                ny -= 1.0;
            }
        }
        self.pos = Vec2::new(nx, ny);
        true
    }

    /// Raise (`up = true`) or lower the aim by `rate` radians
    pub fn aim(&mut self, up: bool, rate: f32) {
        let delta = if up { -rate } else { rate };
        self.angle += delta * self.facing;
        self.clamp_aim();
    }

    /// Keep the aim within the forward half-circle
    pub fn clamp_aim(&mut self) {
        self.angle = if self.facing > 0.0 {
            self.angle.clamp(-FRAC_PI_2, FRAC_PI_2)
        } else {
            self.angle.clamp(-3.0 * FRAC_PI_2, -FRAC_PI_2)
        };
    }

    /// Hop forward; only from the ground
    pub fn jump(&mut self, impulse: (f32, f32)) {
        if self.falling {
            return;
        }
        self.vel = Vec2::new(self.facing * impulse.0, impulse.1);
        self.falling = true;
    }

    /// One tick of free-fall or support checking
    ///
    /// Returns whether the worm is still in motion.
    pub fn step(&mut self, terrain: &TerrainField, gravity: f32) -> bool {
        if self.dead {
            return false;
        }
        if !self.falling {
            if !terrain.is_solid(self.pos.x, self.pos.y + 1.0) {
                self.falling = true;
                return true;
            }
            return false;
        }

        self.vel.y += gravity;
        self.pos += self.vel;
        self.vel.x *= FALL_DRAG;

        if terrain.is_solid_at(self.pos) {
            self.resolve_contact(terrain);
        } else if self.pos.y > terrain.floor_line() {
            log::debug!("{} fell into the water", self.name);
            self.kill();
        }
        true
    }

    /// Push out of terrain after moving into it
    ///
    /// Descending into the ground lands the worm; rising into an overhang
    /// stops the climb and drops it back out underneath.
    pub fn resolve_contact(&mut self, terrain: &TerrainField) {
        if self.vel.y > 0.0 {
            while terrain.is_solid_at(self.pos) && self.pos.y > 0.0 {
                self.pos.y -= 1.0;
            }
            self.vel = Vec2::ZERO;
            self.falling = false;
        } else {
            self.vel.y = 0.0;
            let height = terrain.height() as f32;
            while terrain.is_solid_at(self.pos) && self.pos.y < height {
                self.pos.y += 1.0;
            }
        }
    }
}
