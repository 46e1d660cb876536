//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform concerns:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Terrain is touched only through `TerrainField`

pub mod ballistics;
pub mod explosion;
pub mod grapple;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod weapons;
pub mod worm;

pub use ballistics::{Behavior, Impact, Projectile, Step, StepContext, reflect};
pub use explosion::{Blast, Hit};
pub use grapple::Grapple;
pub use state::{
    Charge, GameEvent, GamePhase, GameState, Particle, ParticleColor, SPAWN_COLUMNS, Snapshot,
};
pub use terrain::{TerrainError, TerrainField, find_safe_spawn};
pub use tick::{TickInput, tick};
pub use weapons::{BurstSpec, ExplosiveSpec, GrenadeSpec, WeaponCatalog, WeaponKind};
pub use worm::Worm;
