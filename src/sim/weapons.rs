//! Weapon catalog
//!
//! Static per-weapon parameters. The hook's numbers live in
//! `GrappleConfig` since the rope solver shares them.

use serde::{Deserialize, Serialize};

/// Weapon slots, in selection-key order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Bazooka,
    MachineGun,
    Grenade,
    GrapplingHook,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Bazooka,
        WeaponKind::MachineGun,
        WeaponKind::Grenade,
        WeaponKind::GrapplingHook,
    ];

    /// Weapon bound to selection key 1-4
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1..=4 => Some(Self::ALL[slot as usize - 1]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Bazooka => "Bazooka",
            WeaponKind::MachineGun => "Machine Gun",
            WeaponKind::Grenade => "Grenade",
            WeaponKind::GrapplingHook => "Grappling Hook",
        }
    }

    /// Weapons that build up power while fire is held
    pub fn is_charged(&self) -> bool {
        matches!(self, WeaponKind::Bazooka | WeaponKind::Grenade)
    }
}

/// A charged, explosive projectile weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosiveSpec {
    /// Launch speed at zero power
    pub min_speed: f32,
    /// Extra launch speed at full power
    pub power_speed: f32,
    pub projectile_radius: f32,
    /// Terrain carve radius
    pub blast_radius: f32,
    pub max_damage: u32,
}

impl ExplosiveSpec {
    /// Launch speed for a power in [0, 100]
    pub fn launch_speed(&self, power: f32) -> f32 {
        power.clamp(0.0, 100.0) / 100.0 * self.power_speed + self.min_speed
    }
}

impl Default for ExplosiveSpec {
    fn default() -> Self {
        Self {
            min_speed: 2.0,
            power_speed: 9.5,
            projectile_radius: 3.0,
            blast_radius: 35.0,
            max_damage: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrenadeSpec {
    pub launch: ExplosiveSpec,
    pub bounces: u32,
    /// Fuse length in ticks
    pub fuse_ticks: f32,
    pub restitution: f32,
}

impl Default for GrenadeSpec {
    fn default() -> Self {
        Self {
            launch: ExplosiveSpec {
                projectile_radius: 4.0,
                blast_radius: 50.0,
                max_damage: 75,
                ..Default::default()
            },
            bounces: 5,
            fuse_ticks: 180.0,
            restitution: 0.45,
        }
    }
}

/// Machine-gun burst
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstSpec {
    pub bullet_count: u32,
    /// Chance of a bullet leaving the barrel on any given tick
    pub fire_chance: f64,
    pub speed: f32,
    /// Uniform per-axis velocity jitter (+/-)
    pub jitter: f32,
    pub projectile_radius: f32,
    pub blast_radius: f32,
    pub max_damage: u32,
}

impl Default for BurstSpec {
    fn default() -> Self {
        Self {
            bullet_count: 18,
            fire_chance: 0.25,
            speed: 11.0,
            jitter: 0.2,
            projectile_radius: 1.5,
            blast_radius: 6.0,
            max_damage: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponCatalog {
    pub bazooka: ExplosiveSpec,
    pub grenade: GrenadeSpec,
    pub machine_gun: BurstSpec,
}

impl WeaponCatalog {
    pub fn validate(&self) -> Result<(), String> {
        for (name, spec) in [("bazooka", &self.bazooka), ("grenade", &self.grenade.launch)] {
            if !(spec.min_speed >= 0.0) || !(spec.power_speed > 0.0) {
                return Err(format!("{name} launch speeds must be positive"));
            }
            if !(spec.blast_radius > 0.0) {
                return Err(format!("{name} blast_radius must be positive"));
            }
        }
        if !(0.0..=1.0).contains(&self.grenade.restitution) {
            return Err("grenade restitution must be within [0, 1]".to_string());
        }
        if !(self.grenade.fuse_ticks > 0.0) {
            return Err("grenade fuse_ticks must be positive".to_string());
        }
        let mg = &self.machine_gun;
        if mg.bullet_count == 0 {
            return Err("machine_gun bullet_count must be positive".to_string());
        }
        if !(mg.fire_chance > 0.0 && mg.fire_chance <= 1.0) {
            return Err("machine_gun fire_chance must be within (0, 1]".to_string());
        }
        if !(mg.speed > 0.0) {
            return Err("machine_gun speed must be positive".to_string());
        }
        if !(mg.jitter >= 0.0) {
            return Err("machine_gun jitter must be non-negative".to_string());
        }
        Ok(())
    }
}
