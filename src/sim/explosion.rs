//! Explosion resolver
//!
//! Carves the crater, then applies damage and knockback to every living worm
//! within the falloff radius in a single pass, and finally throws a burst of
//! cosmetic debris.

use glam::Vec2;
use rand::Rng;

use super::state::{Particle, ParticleColor};
use super::terrain::TerrainField;
use super::worm::Worm;
use crate::consts::{
    DAMAGE_FALLOFF_FACTOR, KNOCKBACK_LIFT, KNOCKBACK_SPEED, PARTICLE_RADIUS_STEP, PARTICLE_SPREAD,
};

/// A detonation waiting to be applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub center: Vec2,
    /// Terrain carve radius
    pub radius: f32,
    pub max_damage: u32,
}

/// Damage dealt to one worm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Index into the worm list
    pub worm: usize,
    pub damage: u32,
    pub killed: bool,
}

impl Blast {
    /// Distance at which damage and knockback fade to nothing
    #[inline]
    pub fn falloff_radius(&self) -> f32 {
        self.radius * DAMAGE_FALLOFF_FACTOR
    }

    /// Damage at `distance` from the center, with the falloff fraction used for knockback
    pub fn damage_at(&self, distance: f32) -> Option<(u32, f32)> {
        let reach = self.falloff_radius();
        if !(distance < reach) {
            return None;
        }
        let falloff = 1.0 - distance / reach;
        let damage = (self.max_damage as f32 * falloff).floor() as u32;
        Some((damage, falloff))
    }

    /// Carve the crater and hurt every worm in reach
    ///
    /// Dead worms are skipped entirely. Survivors are knocked away from the
    /// center with an upward bias and start falling.
    pub fn resolve(&self, terrain: &mut TerrainField, worms: &mut [Worm]) -> Vec<Hit> {
        terrain.carve(self.center.x, self.center.y, self.radius);

        let mut hits = Vec::new();
        for (index, worm) in worms.iter_mut().enumerate() {
            if worm.dead {
                continue;
            }
            let offset = worm.torso() - self.center;
            let Some((damage, falloff)) = self.damage_at(offset.length()) else {
                continue;
            };

            worm.hp = worm.hp.saturating_sub(damage);
            let away = offset.y.atan2(offset.x);
            worm.vel = Vec2::new(
                away.cos() * KNOCKBACK_SPEED * falloff,
                away.sin() * KNOCKBACK_SPEED * falloff - KNOCKBACK_LIFT,
            );

            let killed = worm.hp == 0;
            if killed {
                worm.kill();
            } else {
                worm.falling = true;
            }
            hits.push(Hit {
                worm: index,
                damage,
                killed,
            });
        }
        hits
    }

    /// Throw debris, dropping the oldest particles past `cap`
    pub fn spray<R: Rng>(&self, rng: &mut R, particles: &mut Vec<Particle>, cap: usize) {
        let count = (self.radius / PARTICLE_RADIUS_STEP).floor() as usize;
        for _ in 0..count {
            let vel = Vec2::new(
                rng.random_range(-PARTICLE_SPREAD..PARTICLE_SPREAD),
                rng.random_range(-PARTICLE_SPREAD..PARTICLE_SPREAD),
            );
            let color = if rng.random_bool(0.5) {
                ParticleColor::Orange
            } else {
                ParticleColor::Yellow
            };
            particles.push(Particle::new(self.center, vel, color));
        }

        let excess = particles.len().saturating_sub(cap);
        if excess > 0 {
            particles.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn worm_with_torso_at(torso: Vec2) -> Worm {
        let mut w = Worm::new(0, "target", 0, torso + Vec2::new(0.0, crate::consts::WORM_RADIUS), 100);
        w.falling = false;
        w
    }

    fn bazooka_blast(center: Vec2) -> Blast {
        Blast {
            center,
            radius: 35.0,
            max_damage: 50,
        }
    }

    #[test]
    fn test_direct_hit_halves_full_health() {
        let mut terrain = TerrainField::from_fn(400, 300, |_, y| y >= 150);
        let center = Vec2::new(200.0, 144.0);
        let mut worms = vec![worm_with_torso_at(center)];

        let hits = bazooka_blast(center).resolve(&mut terrain, &mut worms);

        assert_eq!(hits, vec![Hit { worm: 0, damage: 50, killed: false }]);
        assert_eq!(worms[0].hp, 50);
        assert!(worms[0].falling);
        // Upward bias even with no direction to push in
        assert!(worms[0].vel.y < 0.0);
    }

    #[test]
    fn test_edge_of_falloff_is_harmless() {
        let blast = bazooka_blast(Vec2::ZERO);
        assert_eq!(blast.damage_at(63.5), None);
        assert_eq!(blast.damage_at(100.0), None);
        assert_eq!(blast.damage_at(0.0), Some((50, 1.0)));
    }

    #[test]
    fn test_damage_decoupled_from_carve_radius() {
        // Outside the crater but inside the falloff radius
        let mut terrain = TerrainField::from_fn(400, 300, |_, y| y >= 150);
        let center = Vec2::new(200.0, 150.0);
        let mut worms = vec![worm_with_torso_at(center + Vec2::new(50.0, 0.0))];
        let hits = bazooka_blast(center).resolve(&mut terrain, &mut worms);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].damage, (50.0f32 * (1.0 - 50.0 / 63.0)).floor() as u32);
        // Pushed away from the center
        assert!(worms[0].vel.x > 0.0);
    }

    #[test]
    fn test_lethal_blast() {
        let mut terrain = TerrainField::empty(400, 300);
        let center = Vec2::new(200.0, 100.0);
        let mut worm = worm_with_torso_at(center);
        worm.hp = 30;
        let mut worms = vec![worm];

        let hits = bazooka_blast(center).resolve(&mut terrain, &mut worms);
        assert!(hits[0].killed);
        assert_eq!(worms[0].hp, 0);
        assert!(worms[0].dead);
        assert!(!worms[0].falling);
    }

    #[test]
    fn test_dead_worms_are_ignored() {
        let mut terrain = TerrainField::empty(400, 300);
        let center = Vec2::new(200.0, 100.0);
        let mut corpse = worm_with_torso_at(center);
        corpse.kill();
        let mut worms = vec![corpse.clone()];

        assert!(bazooka_blast(center).resolve(&mut terrain, &mut worms).is_empty());
        assert_eq!(worms[0], corpse);
    }

    #[test]
    fn test_carves_exactly_radius() {
        let mut terrain = TerrainField::from_fn(400, 300, |_, _| true);
        bazooka_blast(Vec2::new(200.0, 150.0)).resolve(&mut terrain, &mut []);
        assert!(!terrain.is_solid(200.0, 150.0));
        assert!(!terrain.is_solid(200.0 + 33.0, 150.0));
        assert!(terrain.is_solid(200.0 + 37.0, 150.0));
    }

    #[test]
    fn test_spray_size_and_cap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut particles = Vec::new();
        let blast = bazooka_blast(Vec2::new(10.0, 10.0));

        blast.spray(&mut rng, &mut particles, 512);
        assert_eq!(particles.len(), 23);
        for p in &particles {
            assert!(p.vel.x.abs() <= PARTICLE_SPREAD && p.vel.y.abs() <= PARTICLE_SPREAD);
            assert_eq!(p.life, 1.0);
        }

        blast.spray(&mut rng, &mut particles, 30);
        assert_eq!(particles.len(), 30);
    }

    proptest! {
        #[test]
        fn prop_hit_iff_within_falloff(
            radius in 3.0f32..60.0,
            max_damage in 1u32..100,
            angle in 0.0f32..std::f32::consts::TAU,
            scale in 0.0f32..2.5,
        ) {
            let center = Vec2::new(500.0, 300.0);
            let blast = Blast { center, radius, max_damage };
            let distance = blast.falloff_radius() * scale;
            let torso = center + Vec2::new(angle.cos(), angle.sin()) * distance;

            let mut worms = vec![worm_with_torso_at(torso)];
            let actual = worms[0].torso().distance(center);
            prop_assume!((actual - blast.falloff_radius()).abs() > 1e-3);

            let mut terrain = TerrainField::empty(1000, 600);
            let hits = blast.resolve(&mut terrain, &mut worms);

            prop_assert_eq!(hits.len() == 1, actual < blast.falloff_radius());
            for hit in hits {
                prop_assert!(hit.damage <= max_damage);
                prop_assert_eq!(worms[0].hp, 100u32.saturating_sub(hit.damage));
                prop_assert_eq!(worms[0].dead, worms[0].hp == 0);
            }
        }
    }
}
