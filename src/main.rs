//! Pixel Artillery - headless match driver
//!
//! Plays a scripted match on an island map and prints the final state as
//! JSON. Pass a path to a JSON match config as the first argument to
//! override the defaults; set `RUST_LOG=debug` to follow every shot.

#[cfg(not(target_arch = "wasm32"))]
mod driver {
    use std::f32::consts::PI;

    use pixel_artillery::consts::{MAX_SUBSTEPS, SIM_DT, WORLD_HEIGHT, WORLD_WIDTH};
    use pixel_artillery::sim::{GamePhase, GameState, TerrainField, TickInput, tick};
    use pixel_artillery::MatchConfig;

    /// Host frame time; two simulation steps per frame
    const FRAME_DT: f32 = 1.0 / 30.0;
    /// Give up after this many turns
    const MAX_TURNS: u32 = 24;
    const SEED: u64 = 0x5eed_a27;

    /// Rolling hills fading into the sea at both edges
    fn island(width: u32, height: u32) -> TerrainField {
        let edge = 150.0;
        let w = width as f32;
        TerrainField::from_fn(width, height, |x, y| {
            let x = x as f32;
            let fade = if x < edge {
                x / edge
            } else if x > w - edge {
                (w - x) / edge
            } else {
                1.0
            };
            let h = (150.0 + (x * 0.01).sin() * 60.0 + (x * 0.003).sin() * 100.0) * fade;
            y as f32 >= height as f32 - h
        })
    }

    /// Scripted player: aims at the other team, fires the weapon for this
    /// turn, then ends the turn.
    fn scripted_input(state: &GameState, turn: u32, frame: u32) -> TickInput {
        let Some(worm) = state.active_worm() else {
            return TickInput::default();
        };
        let slot = [1, 2, 3, 1][turn as usize % 4];
        let facing_enemy = if worm.team == 0 { 1.0 } else { -1.0 };

        match frame {
            0..=9 => TickInput {
                move_right: facing_enemy > 0.0,
                move_left: facing_enemy < 0.0,
                weapon_slot: Some(slot),
                ..Default::default()
            },
            // Lower the aim towards a flatter arc
            10..=19 => TickInput {
                aim_down: worm.angle.abs() > PI / 8.0 && worm.angle.abs() < 7.0 * PI / 8.0,
                ..Default::default()
            },
            20..=59 => TickInput {
                fire: true,
                ..Default::default()
            },
            60..=239 => TickInput::default(),
            _ => TickInput {
                end_turn: true,
                ..Default::default()
            },
        }
    }

    /// Owns the match and feeds it fixed steps
    struct Driver {
        state: GameState,
        accumulator: f32,
        input: TickInput,
    }

    impl Driver {
        fn update(&mut self, dt: f32) {
            self.accumulator += dt.min(0.1);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // One-shot inputs only apply once
                self.input.weapon_slot = None;
                self.input.end_turn = false;
                self.input.pause = false;
                self.input.reset = false;
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let config = match std::env::args().nth(1) {
            Some(path) => MatchConfig::load(path)?,
            None => MatchConfig::default(),
        };

        let terrain = island(WORLD_WIDTH, WORLD_HEIGHT);
        let mut driver = Driver {
            state: GameState::new_match(config, terrain, SEED),
            accumulator: 0.0,
            input: TickInput::default(),
        };

        let mut turn = 0;
        let mut frame = 0;
        let mut active = driver.state.active;
        while driver.state.phase != GamePhase::GameOver && turn < MAX_TURNS {
            if driver.state.phase == GamePhase::WaitingForInput {
                driver.input = scripted_input(&driver.state, turn, frame);
            } else {
                driver.input = TickInput::default();
            }
            driver.update(FRAME_DT);
            frame += 1;

            if driver.state.active != active
                && driver.state.phase == GamePhase::WaitingForInput
            {
                active = driver.state.active;
                turn += 1;
                frame = 0;
            }
        }

        match driver.state.winner {
            Some(team) => log::info!(
                "{} won after {} turns",
                driver.state.config.team_names[team as usize],
                turn
            ),
            None if driver.state.phase == GamePhase::GameOver => log::info!("Draw"),
            None => log::info!("No winner after {turn} turns"),
        }

        let snapshot = serde_json::to_string_pretty(&driver.state.snapshot())?;
        println!("{snapshot}");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Pixel Artillery (headless) starting...");

    driver::run().inspect_err(|e| log::error!("{e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the deliverable on wasm; hosts call `sim::tick` directly
}
