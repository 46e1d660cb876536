//! Rope constraint for the grappling hook
//!
//! While attached, the active worm's torso is held within `length` of the
//! anchor. It swings freely inside that circle and slides along it when the
//! rope goes taut.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::terrain::TerrainField;
use super::worm::Worm;
use crate::consts::{ROPE_DRAG, WORM_RADIUS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grapple {
    pub anchor: Option<Vec2>,
    pub length: f32,
}

impl Grapple {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn attach(&mut self, anchor: Vec2, length: f32, min_length: f32, max_length: f32) {
        self.anchor = Some(anchor);
        self.length = length.clamp(min_length, max_length);
    }

    pub fn release(&mut self) {
        self.anchor = None;
        self.length = 0.0;
    }

    /// Reel in (negative `delta`) or pay out rope
    pub fn adjust_length(&mut self, delta: f32, min_length: f32, max_length: f32) {
        if self.is_active() {
            self.length = (self.length + delta).clamp(min_length, max_length);
        }
    }

    /// Pump the swing left (-1) or right (+1) while hanging from the rope
    pub fn swing(&self, worm: &mut Worm, dir: f32, force: f32) {
        if self.is_active() {
            worm.vel.x += dir * force;
        }
    }

    /// One tick of pendulum motion for the worm hanging from this rope
    ///
    /// Terrain contact is resolved before the tether, so the rope is the
    /// last positional correction and never ends a tick stretched.
    pub fn step(&self, worm: &mut Worm, terrain: &TerrainField, gravity: f32) {
        let Some(anchor) = self.anchor else {
            return;
        };

        worm.vel.y += gravity;
        worm.pos += worm.vel;
        worm.vel *= ROPE_DRAG;

        if terrain.is_solid_at(worm.pos) {
            worm.resolve_contact(terrain);
        } else if worm.pos.y > terrain.floor_line() {
            log::debug!("{} swung into the water", worm.name);
            worm.kill();
        } else {
            worm.falling = true;
        }

        let offset = worm.torso() - anchor;
        let dist = offset.length();
        if dist > self.length && dist > 0.0 {
            let dir = offset / dist;
            worm.pos = anchor + dir * self.length + Vec2::new(0.0, WORM_RADIUS);
            // Only tangential motion survives a taut rope
            let radial = worm.vel.dot(dir);
            worm.vel -= dir * radial;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const G: f32 = 9.8 / 120.0;

    fn hanging(anchor: Vec2, foot: Vec2) -> (Grapple, Worm) {
        let mut grapple = Grapple::default();
        let length = anchor.distance(crate::torso_of(foot));
        grapple.attach(anchor, length, 15.0, 450.0);
        let worm = Worm::new(0, "swinger", 0, foot, 100);
        (grapple, worm)
    }

    #[test]
    fn test_attach_clamps_length() {
        let mut g = Grapple::default();
        g.attach(Vec2::ZERO, 3.0, 15.0, 450.0);
        assert_eq!(g.length, 15.0);
        g.attach(Vec2::ZERO, 1000.0, 15.0, 450.0);
        assert_eq!(g.length, 450.0);
    }

    #[test]
    fn test_adjust_length_bounds() {
        let mut g = Grapple::default();
        g.adjust_length(-5.0, 15.0, 450.0);
        assert_eq!(g.length, 0.0, "inactive rope is untouched");

        g.attach(Vec2::ZERO, 20.0, 15.0, 450.0);
        g.adjust_length(-2.5, 15.0, 450.0);
        assert_eq!(g.length, 17.5);
        g.adjust_length(-2.5, 15.0, 450.0);
        assert_eq!(g.length, 15.0);
        g.adjust_length(1000.0, 15.0, 450.0);
        assert_eq!(g.length, 450.0);
    }

    #[test]
    fn test_release() {
        let mut g = Grapple::default();
        g.attach(Vec2::new(5.0, 5.0), 50.0, 15.0, 450.0);
        g.release();
        assert!(!g.is_active());
    }

    #[test]
    fn test_taut_rope_removes_radial_velocity() {
        let terrain = TerrainField::empty(400, 400);
        let anchor = Vec2::new(200.0, 50.0);
        let (g, mut w) = hanging(anchor, Vec2::new(200.0, 156.0));
        w.vel = Vec2::new(0.0, 5.0);
        g.step(&mut w, &terrain, G);

        assert!((w.torso().distance(anchor) - g.length).abs() < 1e-3);
        assert!(w.vel.y.abs() < 1e-4);
        assert!(w.falling);
    }

    #[test]
    fn test_long_rope_into_water_drowns() {
        let terrain = TerrainField::empty(400, 400);
        let anchor = Vec2::new(200.0, 100.0);
        let (mut g, mut w) = hanging(anchor, Vec2::new(200.0, 389.0));
        g.length = 450.0;
        w.vel = Vec2::new(0.0, 3.0);
        g.step(&mut w, &terrain, G);
        assert!(w.dead);
        assert_eq!(w.hp, 0);
    }

    #[test]
    fn test_swing_pumps_sideways() {
        let (g, mut w) = hanging(Vec2::new(10.0, 0.0), Vec2::new(10.0, 40.0));
        g.swing(&mut w, -1.0, 0.08);
        assert!((w.vel.x + 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_slack_rope_cannot_swing() {
        let mut w = Worm::new(0, "idle", 0, Vec2::new(10.0, 10.0), 100);
        Grapple::default().swing(&mut w, 1.0, 0.08);
        assert_eq!(w.vel, Vec2::ZERO);
    }

    #[test]
    fn test_ground_push_keeps_rope_taut() {
        // Anchor level with the feet, so climbing out of the ground pulls
        // the torso away from it
        let terrain = TerrainField::from_fn(400, 400, |_, y| y >= 160);
        let anchor = Vec2::new(230.0, 160.5);
        let (g, mut w) = hanging(anchor, Vec2::new(200.0, 159.5));

        for _ in 0..60 {
            g.step(&mut w, &terrain, G);
            assert!(w.torso().distance(anchor) <= g.length + 1e-3);
        }
    }

    #[test]
    fn test_inactive_rope_does_nothing() {
        let terrain = TerrainField::empty(400, 400);
        let mut w = Worm::new(0, "idle", 0, Vec2::new(10.0, 10.0), 100);
        let before = w.clone();
        Grapple::default().step(&mut w, &terrain, G);
        assert_eq!(w, before);
    }

    #[test]
    fn test_swinging_into_ground_lands() {
        // Ground right under the worm
        let terrain = TerrainField::from_fn(400, 400, |_, y| y >= 160);
        let anchor = Vec2::new(200.0, 50.0);
        let (mut g, mut w) = hanging(anchor, Vec2::new(200.0, 158.0));
        g.length = 200.0;
        w.vel = Vec2::new(0.0, 3.0);
        g.step(&mut w, &terrain, G);
        assert!(!terrain.is_solid_at(w.pos));
        assert!(!w.falling);
    }

    proptest! {
        #[test]
        fn prop_rope_never_stretches(
            offset in (-150.0f32..150.0, 20.0f32..150.0),
            vel in (-6.0f32..6.0, -6.0f32..6.0),
            swings in prop::collection::vec(-1.0f32..=1.0, 1..120),
            ground in prop::option::of(110u32..260),
        ) {
            let terrain = match ground {
                Some(top) => TerrainField::from_fn(1024, 1024, |_, y| y >= top),
                None => TerrainField::empty(1024, 1024),
            };
            let anchor = Vec2::new(512.0, 100.0);
            let torso = anchor + Vec2::new(offset.0, offset.1);
            let foot = torso + Vec2::new(0.0, WORM_RADIUS);
            let (g, mut w) = hanging(anchor, foot);
            w.vel = Vec2::new(vel.0, vel.1);

            for dir in swings {
                g.swing(&mut w, dir.signum(), 0.08);
                g.step(&mut w, &terrain, G);
                prop_assert!(w.torso().distance(anchor) <= g.length + 1e-3);
            }
        }
    }
}
