//! Match state and core simulation types
//!
//! Everything the tick loop reads or writes lives in `GameState`. Renderers
//! see it only through `GameState::snapshot`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ballistics::Projectile;
use super::grapple::Grapple;
use super::terrain::{TerrainField, find_safe_spawn};
use super::weapons::WeaponKind;
use super::worm::Worm;
use crate::config::MatchConfig;
use crate::consts::{PARTICLE_DECAY, PARTICLE_GRAVITY_SCALE, SIM_DT, WORLD_WIDTH};

/// Preferred spawn columns on a full-width map, in worm order
pub const SPAWN_COLUMNS: [f32; 4] = [150.0, 350.0, 674.0, 874.0];

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Outside a match; the tick loop is idle
    Menu,
    /// The active worm may move, aim and fire
    WaitingForInput,
    /// Turn is over, waiting for the world to settle
    ResolvingDestruction,
    /// World is quiet; pick the next worm or declare a winner
    NextTurn,
    GameOver,
}

/// Debris palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleColor {
    Orange,
    Yellow,
}

impl ParticleColor {
    pub fn hex(&self) -> &'static str {
        match self {
            ParticleColor::Orange => "#f97316",
            ParticleColor::Yellow => "#fde047",
        }
    }
}

/// Cosmetic debris thrown by explosions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 when spawned, removed at 0
    pub life: f32,
    pub color: ParticleColor,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: ParticleColor) -> Self {
        Self {
            pos,
            vel,
            life: 1.0,
            color,
        }
    }

    /// Advance one tick; returns false once the particle has burned out
    pub fn advance(&mut self, gravity: f32) -> bool {
        self.pos += self.vel;
        self.vel.y += gravity * PARTICLE_GRAVITY_SCALE;
        self.life -= PARTICLE_DECAY;
        self.life > 0.0
    }
}

/// Power build-up for charged weapons
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub charging: bool,
    /// 0..=100
    pub power: f32,
}

/// Notable things that happened during the last tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Fired { worm: usize, weapon: WeaponKind },
    Exploded { pos: Vec2, radius: f32 },
    WormHit { worm: usize, damage: u32 },
    WormDied { worm: usize },
    HookAttached { anchor: Vec2, length: f32 },
    HookMissed,
    GrappleReleased,
    TurnStarted { worm: usize, team: u8 },
    GameOver { winner: Option<u8> },
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: MatchConfig,
    /// Match seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub terrain: TerrainField,
    pub phase: GamePhase,
    pub paused: bool,

    /// Index of the worm whose turn it is
    pub active: usize,
    pub active_team: u8,
    /// Whole seconds left in the turn
    pub turn_timer: u32,
    /// Sub-second time accumulated towards the next countdown step
    pub timer_accum: f32,
    pub wind: f32,
    pub has_fired: bool,
    pub selected_weapon: WeaponKind,
    pub charge: Charge,
    /// Fire control state on the previous tick, for edge detection
    pub fire_was_held: bool,
    /// Machine-gun rounds still to leave the barrel
    pub burst_remaining: u32,
    pub grapple: Grapple,

    pub worms: Vec<Worm>,
    pub projectiles: Vec<Projectile>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,

    pub winner: Option<u8>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Lay out two teams of two on `terrain` and start the first turn
    ///
    /// A config that fails validation is replaced by the defaults.
    pub fn new_match(config: MatchConfig, terrain: TerrainField, seed: u64) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("{e}, falling back to default match config");
                MatchConfig::default()
            }
        };
        let mut rng = Pcg32::seed_from_u64(seed);
        let wind = sample_wind(&mut rng, config.wind_max);

        let scale = terrain.width() as f32 / WORLD_WIDTH as f32;
        let worms = SPAWN_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, &column)| {
                let team = (i / 2) as u8;
                let name = format!("{} {}", config.team_names[team as usize], i % 2 + 1);
                let pos = find_safe_spawn(&terrain, column * scale, config.spawn_scan_start);
                Worm::new(i as u32, name, team, pos, config.starting_hp)
            })
            .collect();

        log::info!(
            "Match started: seed={seed}, {} vs {}, wind={wind:.3}",
            config.team_names[0],
            config.team_names[1]
        );

        Self {
            turn_timer: config.turn_duration_secs,
            config,
            seed,
            rng,
            terrain,
            phase: GamePhase::WaitingForInput,
            paused: false,
            active: 0,
            active_team: 0,
            timer_accum: 0.0,
            wind,
            has_fired: false,
            selected_weapon: WeaponKind::default(),
            charge: Charge::default(),
            fire_was_held: false,
            burst_remaining: 0,
            grapple: Grapple::default(),
            worms,
            projectiles: Vec::new(),
            particles: Vec::new(),
            winner: None,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Abandon the match and return to the menu
    pub fn reset(&mut self) {
        log::info!("Match reset");
        self.phase = GamePhase::Menu;
        self.paused = false;
        self.projectiles.clear();
        self.particles.clear();
        self.burst_remaining = 0;
        self.grapple.release();
        self.charge = Charge::default();
        self.fire_was_held = false;
        self.winner = None;
    }

    pub fn active_worm(&self) -> Option<&Worm> {
        self.worms.get(self.active).filter(|w| w.is_alive())
    }

    pub fn team_alive(&self, team: u8) -> bool {
        self.worms.iter().any(|w| w.team == team && w.is_alive())
    }

    /// Nothing in the world is still moving
    ///
    /// Particles are cosmetic and never hold up the turn.
    pub fn is_quiescent(&self) -> bool {
        !self.worms.iter().any(|w| w.is_alive() && w.falling)
            && !self.grapple.is_active()
            && self.projectiles.is_empty()
            && self.burst_remaining == 0
    }

    /// Count down the turn timer by `dt` seconds of real time
    pub fn count_down(&mut self, dt: f32) {
        if self.turn_timer == 0 {
            return;
        }
        self.timer_accum += dt;
        // Tolerate float drift from summing fixed steps
        while self.timer_accum >= 1.0 - SIM_DT * 0.5 && self.turn_timer > 0 {
            self.timer_accum -= 1.0;
            self.turn_timer -= 1;
        }
        self.timer_accum = self.timer_accum.max(0.0);
    }

    /// Stop taking input and let the world settle
    pub fn begin_resolution(&mut self) {
        log::debug!("Turn {} over, resolving", self.active);
        if self.grapple.is_active() {
            self.grapple.release();
            self.events.push(GameEvent::GrappleReleased);
        }
        self.charge = Charge::default();
        self.fire_was_held = false;
        self.phase = GamePhase::ResolvingDestruction;
    }

    /// Declare a winner, or hand the turn to the next living worm
    pub fn advance_turn(&mut self) {
        let alive = [self.team_alive(0), self.team_alive(1)];
        if !alive[0] || !alive[1] {
            self.winner = match alive {
                [true, false] => Some(0),
                [false, true] => Some(1),
                _ => None,
            };
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver {
                winner: self.winner,
            });
            match self.winner {
                Some(team) => log::info!(
                    "Game over: {} win",
                    self.config.team_names[team as usize]
                ),
                None => log::info!("Game over: draw"),
            }
            return;
        }

        let count = self.worms.len();
        let mut next = (self.active + 1) % count;
        while self.worms[next].dead {
            next = (next + 1) % count;
        }

        self.active = next;
        self.active_team = self.worms[next].team;
        self.turn_timer = self.config.turn_duration_secs;
        self.timer_accum = 0.0;
        self.has_fired = false;
        self.charge = Charge::default();
        self.fire_was_held = false;
        self.grapple.release();
        self.wind = sample_wind(&mut self.rng, self.config.wind_max);
        self.phase = GamePhase::WaitingForInput;
        self.events.push(GameEvent::TurnStarted {
            worm: next,
            team: self.active_team,
        });
        log::info!(
            "Turn start: {} (wind {:.3})",
            self.worms[next].name,
            self.wind
        );
    }

    /// Read-only view for renderers and tools
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            paused: self.paused,
            active: self.active,
            active_team: self.active_team,
            turn_timer: self.turn_timer,
            wind: self.wind,
            power: self.charge.power,
            charging: self.charge.charging,
            selected_weapon: self.selected_weapon,
            has_fired: self.has_fired,
            winner: self.winner,
            time_ticks: self.time_ticks,
            worms: &self.worms,
            projectiles: &self.projectiles,
            particles: &self.particles,
            grapple: &self.grapple,
        }
    }
}

fn sample_wind(rng: &mut Pcg32, wind_max: f32) -> f32 {
    if wind_max > 0.0 {
        rng.random_range(-wind_max..=wind_max)
    } else {
        0.0
    }
}

/// Borrowed turn-state snapshot, serializable for renderers
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub paused: bool,
    pub active: usize,
    pub active_team: u8,
    pub turn_timer: u32,
    pub wind: f32,
    pub power: f32,
    pub charging: bool,
    pub selected_weapon: WeaponKind,
    pub has_fired: bool,
    pub winner: Option<u8>,
    pub time_ticks: u64,
    pub worms: &'a [Worm],
    pub projectiles: &'a [Projectile],
    pub particles: &'a [Particle],
    pub grapple: &'a Grapple,
}
