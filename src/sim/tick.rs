//! Fixed timestep simulation tick
//!
//! One call advances the match by one step: input for the active worm,
//! burst fire, projectiles, worms, particles, then at most one phase
//! transition. Projectiles and worms are advanced into fresh arenas that
//! replace the previous ones once the whole pass is done.

use glam::Vec2;
use rand::Rng;

use super::ballistics::{Impact, Projectile, Step, StepContext};
use super::explosion::Blast;
use super::state::{Charge, GameEvent, GamePhase, GameState};
use super::weapons::WeaponKind;
use super::worm::Worm;

/// Decoded player intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
    pub jump: bool,
    /// Fire control is held down
    pub fire: bool,
    /// Weapon selection key (1-4)
    pub weapon_slot: Option<u8>,
    pub end_turn: bool,
    /// Pause toggle
    pub pause: bool,
    /// Abandon the match
    pub reset: bool,
}

impl TickInput {
    fn horizontal(&self) -> Option<f32> {
        match (self.move_left, self.move_right) {
            (true, false) => Some(-1.0),
            (false, true) => Some(1.0),
            _ => None,
        }
    }
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.reset {
        state.reset();
        return;
    }
    if state.phase == GamePhase::Menu {
        return;
    }

    if input.pause {
        state.paused = !state.paused;
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }
    if state.paused {
        return;
    }

    state.time_ticks += 1;

    if state.phase == GamePhase::WaitingForInput {
        apply_input(state, input);
        state.count_down(dt);
    }

    emit_burst(state);
    step_projectiles(state);
    step_worms(state);

    let gravity = state.config.gravity;
    state.particles.retain_mut(|p| p.advance(gravity));

    update_phase(state);
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    if state.active_worm().is_none() {
        state.fire_was_held = input.fire;
        return;
    }

    if input.end_turn && state.turn_timer > 0 {
        log::debug!("Turn ended early");
        state.turn_timer = 0;
    }

    if state.grapple.is_active() {
        steer_rope(state, input);
    } else {
        move_worm(state, input);
    }

    if let Some(slot) = input.weapon_slot {
        select_weapon(state, slot);
    }
    handle_fire(state, input.fire);
}

fn steer_rope(state: &mut GameState, input: &TickInput) {
    let GameState {
        config,
        grapple,
        worms,
        active,
        events,
        ..
    } = state;
    let rope = &config.grapple;

    if input.aim_up {
        grapple.adjust_length(-rope.rope_speed, rope.min_length, rope.max_length);
    }
    if input.aim_down {
        grapple.adjust_length(rope.rope_speed, rope.min_length, rope.max_length);
    }
    if let Some(dir) = input.horizontal() {
        grapple.swing(&mut worms[*active], dir, rope.swing_force);
    }
    if input.jump {
        log::debug!("Rope released");
        grapple.release();
        events.push(GameEvent::GrappleReleased);
    }
}

fn move_worm(state: &mut GameState, input: &TickInput) {
    let GameState {
        config,
        terrain,
        worms,
        active,
        ..
    } = state;
    let worm = &mut worms[*active];
    if worm.falling {
        return;
    }

    if let Some(dir) = input.horizontal() {
        worm.walk(dir, terrain, config.walk_speed, config.step_height);
    }
    if input.aim_up {
        worm.aim(true, config.aim_rate);
    } else if input.aim_down {
        worm.aim(false, config.aim_rate);
    }
    if input.jump {
        worm.jump(config.jump_impulse);
    }
}

fn select_weapon(state: &mut GameState, slot: u8) {
    if state.has_fired {
        return;
    }
    let Some(kind) = WeaponKind::from_slot(slot) else {
        return;
    };
    if kind != state.selected_weapon {
        log::debug!("Selected {}", kind.as_str());
        state.selected_weapon = kind;
        state.charge = Charge::default();
    }
}

fn handle_fire(state: &mut GameState, held: bool) {
    let pressed = held && !state.fire_was_held;
    let released = !held && state.fire_was_held;
    state.fire_was_held = held;

    // Fire doubles as the rope release, whatever is selected
    if pressed && state.grapple.is_active() {
        log::debug!("Rope released");
        state.grapple.release();
        state.events.push(GameEvent::GrappleReleased);
        return;
    }

    match state.selected_weapon {
        WeaponKind::GrapplingHook => {
            let hook_in_flight = state
                .projectiles
                .iter()
                .any(|p| p.weapon == WeaponKind::GrapplingHook);
            if pressed && !hook_in_flight {
                launch(state, WeaponKind::GrapplingHook);
            }
        }
        WeaponKind::MachineGun => {
            if pressed && !state.has_fired && state.burst_remaining == 0 {
                state.burst_remaining = state.config.weapons.machine_gun.bullet_count;
                state.has_fired = true;
                record_fire(state, WeaponKind::MachineGun);
            }
        }
        kind if kind.is_charged() => {
            if state.has_fired {
                return;
            }
            if held && (pressed || state.charge.charging) {
                state.charge.charging = true;
                state.charge.power = (state.charge.power + state.config.charge_rate).min(100.0);
            } else if released && state.charge.charging {
                launch(state, kind);
            }
        }
        _ => {}
    }
}

/// Spawn a projectile from the active worm's torso
fn launch(state: &mut GameState, kind: WeaponKind) {
    let Some(worm) = state.active_worm() else {
        return;
    };
    let (origin, angle) = (worm.torso(), worm.angle);
    let owner = state.active;
    let power = state.charge.power;
    let weapons = &state.config.weapons;
    let rope = &state.config.grapple;

    let projectile = match kind {
        WeaponKind::Bazooka => Projectile::shell(origin, angle, power, &weapons.bazooka, owner),
        WeaponKind::Grenade => Projectile::grenade(origin, angle, power, &weapons.grenade, owner),
        WeaponKind::GrapplingHook => {
            Projectile::hook(origin, angle, rope.hook_speed, rope.max_length, owner)
        }
        WeaponKind::MachineGun => return,
    };
    state.projectiles.push(projectile);

    if kind != WeaponKind::GrapplingHook {
        state.has_fired = true;
    }
    record_fire(state, kind);
}

fn record_fire(state: &mut GameState, weapon: WeaponKind) {
    log::debug!(
        "{} fired {} (power {:.0})",
        state.worms[state.active].name,
        weapon.as_str(),
        state.charge.power
    );
    state.charge = Charge::default();
    state.events.push(GameEvent::Fired {
        worm: state.active,
        weapon,
    });
}

/// Let at most one machine-gun round out of the barrel
fn emit_burst(state: &mut GameState) {
    if state.burst_remaining == 0 {
        return;
    }
    let Some(worm) = state.active_worm() else {
        log::debug!("Burst cancelled, shooter is down");
        state.burst_remaining = 0;
        return;
    };
    let (origin, angle) = (worm.torso(), worm.angle);

    let spec = &state.config.weapons.machine_gun;
    if !state.rng.random_bool(spec.fire_chance) {
        return;
    }
    let jitter = Vec2::new(
        state.rng.random_range(-spec.jitter..=spec.jitter),
        state.rng.random_range(-spec.jitter..=spec.jitter),
    );
    state
        .projectiles
        .push(Projectile::bullet(origin, angle, jitter, spec, state.active));
    state.burst_remaining -= 1;
}

fn step_projectiles(state: &mut GameState) {
    if state.projectiles.is_empty() {
        return;
    }

    let in_flight = std::mem::take(&mut state.projectiles);
    let mut next = Vec::with_capacity(in_flight.len());
    let mut impacts = Vec::new();

    for mut projectile in in_flight {
        let origin = state
            .worms
            .get(projectile.owner)
            .map(Worm::torso)
            .unwrap_or(projectile.pos);
        let ctx = StepContext {
            terrain: &state.terrain,
            gravity: state.config.gravity,
            wind: state.wind,
            origin,
        };
        match projectile.advance(&ctx) {
            Step::Continue => next.push(projectile),
            Step::Terminate(impact) => impacts.push((projectile.owner, projectile.weapon, impact)),
        }
    }
    state.projectiles = next;

    for (owner, weapon, impact) in impacts {
        match impact {
            Impact::Explode {
                pos,
                radius,
                max_damage,
            } => detonate(
                state,
                Blast {
                    center: pos,
                    radius,
                    max_damage,
                },
            ),
            Impact::HookAttached { anchor, length } => attach_hook(state, owner, anchor, length),
            Impact::Lost => {
                if weapon == WeaponKind::GrapplingHook {
                    log::debug!("Hook missed");
                    state.events.push(GameEvent::HookMissed);
                }
            }
        }
    }
}

fn attach_hook(state: &mut GameState, owner: usize, anchor: Vec2, length: f32) {
    // A hook that lands after the turn moved on has nobody to hold it
    let holder_ready = state.phase == GamePhase::WaitingForInput
        && owner == state.active
        && state.active_worm().is_some();
    if !holder_ready {
        state.events.push(GameEvent::HookMissed);
        return;
    }

    let rope = &state.config.grapple;
    state
        .grapple
        .attach(anchor, length, rope.min_length, rope.max_length);
    log::debug!(
        "Hook attached at ({:.0}, {:.0}), rope {:.0}",
        anchor.x,
        anchor.y,
        state.grapple.length
    );
    state.events.push(GameEvent::HookAttached {
        anchor,
        length: state.grapple.length,
    });
}

fn detonate(state: &mut GameState, blast: Blast) {
    log::debug!(
        "Explosion at ({:.0}, {:.0}) radius {}",
        blast.center.x,
        blast.center.y,
        blast.radius
    );
    let hits = blast.resolve(&mut state.terrain, &mut state.worms);
    blast.spray(&mut state.rng, &mut state.particles, state.config.max_particles);

    state.events.push(GameEvent::Exploded {
        pos: blast.center,
        radius: blast.radius,
    });
    for hit in hits {
        state.events.push(GameEvent::WormHit {
            worm: hit.worm,
            damage: hit.damage,
        });
        if hit.killed {
            log::info!("{} was blown up", state.worms[hit.worm].name);
            state.events.push(GameEvent::WormDied { worm: hit.worm });
        }
    }
}

fn step_worms(state: &mut GameState) {
    if state.grapple.is_active() && state.active_worm().is_none() {
        state.grapple.release();
        state.events.push(GameEvent::GrappleReleased);
    }

    let roped = state.grapple.is_active().then_some(state.active);
    let gravity = state.config.gravity;
    let next: Vec<Worm> = state
        .worms
        .iter()
        .enumerate()
        .map(|(index, worm)| {
            let mut worm = worm.clone();
            if roped == Some(index) {
                state.grapple.step(&mut worm, &state.terrain, gravity);
            } else {
                worm.step(&state.terrain, gravity);
            }
            worm
        })
        .collect();

    for (index, (before, after)) in state.worms.iter().zip(&next).enumerate() {
        if before.is_alive() && after.dead {
            log::info!("{} drowned", after.name);
            state.events.push(GameEvent::WormDied { worm: index });
        }
    }
    state.worms = next;
}

fn update_phase(state: &mut GameState) {
    match state.phase {
        GamePhase::WaitingForInput => {
            if state.turn_timer == 0 {
                state.begin_resolution();
            }
        }
        GamePhase::ResolvingDestruction => {
            if state.is_quiescent() {
                state.phase = GamePhase::NextTurn;
            }
        }
        GamePhase::NextTurn => state.advance_turn(),
        GamePhase::Menu | GamePhase::GameOver => {}
    }
}
