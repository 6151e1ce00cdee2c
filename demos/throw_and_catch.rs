//! Throw and Catch
//!
//! This example drives a small phone-throwing game from scripted
//! accelerometer readings.
//!
//! Key concepts:
//! - Enter/exit passes inside a single state body
//! - Time-in-state conditions
//! - A `Recovering` handler that sends a failing state back to the menu
//! - A `Runner` that owns the machine and ends it on shutdown
//!
//! Run with: cargo run --example throw_and_catch
//! (set RUST_LOG=warn to hide the per-transition log)

use tickstate::host::Runner;
use tickstate::machine::{Recovering, StateMachine};
use tickstate::state_enum;
use tickstate::StateMachineBuilder;

state_enum! {
    enum Game {
        Menu,
        InHand,
        Falling,
        Hit,
        Shutdown,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Accel {
    Freefall,
    Stationary,
    Moving,
    High,
}

#[derive(Debug, thiserror::Error)]
#[error("sensor returned no reading on frame {frame}")]
struct SensorDropout {
    frame: usize,
}

/// Replays one reading per frame; a `None` reading simulates a dead sensor.
struct ThrowGame {
    readings: Vec<Option<Accel>>,
    frame: usize,
    airtime: f32,
    best_airtime: f32,
}

impl ThrowGame {
    fn new(readings: Vec<Option<Accel>>) -> Self {
        Self {
            readings,
            frame: 0,
            airtime: 0.0,
            best_airtime: 0.0,
        }
    }

    fn reading(&self) -> Result<Accel, SensorDropout> {
        match self.readings.get(self.frame) {
            Some(Some(accel)) => Ok(*accel),
            Some(None) => Err(SensorDropout { frame: self.frame }),
            // past the end of the script the phone rests on the table
            None => Ok(Accel::Stationary),
        }
    }

    fn play(&mut self, state: &Game, sm: &mut StateMachine<Game>) -> Result<(), SensorDropout> {
        if *state == Game::Shutdown {
            if sm.enter_state() {
                println!("  shutting down, best airtime {:.2}s", self.best_airtime);
                sm.end_from_state();
            }
            return Ok(());
        }

        let accel = self.reading()?;
        match state {
            Game::Menu => {
                if sm.enter_state() {
                    println!("  menu shown");
                }
                if accel >= Accel::High {
                    sm.switch_state(Game::InHand);
                }
                if sm.exit_state() {
                    println!("  menu hidden");
                }
            }
            Game::InHand => {
                if accel == Accel::Freefall && sm.time_in_state() > 0.2 {
                    sm.switch_state(Game::Falling);
                }
                if sm.time_in_state() > 8.0 {
                    sm.switch_state(Game::Menu);
                }
            }
            Game::Falling => {
                if sm.enter_state() {
                    println!("  thrown!");
                    self.airtime = 0.0;
                }
                self.airtime += sm.delta_time();

                if accel == Accel::Stationary && sm.time_in_state() > 0.25 {
                    sm.switch_state(Game::InHand);
                }
                if accel >= Accel::High && sm.time_in_state() > 0.1 {
                    sm.switch_state(Game::Hit);
                }
                if sm.exit_state() {
                    println!("  caught after {:.2}s", self.airtime);
                    self.best_airtime = self.best_airtime.max(self.airtime);
                }
            }
            Game::Hit => {
                if sm.enter_state() {
                    println!("  ouch");
                }
                if accel == Accel::Stationary && sm.time_in_state() > 0.3 {
                    sm.switch_state(Game::InHand);
                }
            }
            Game::Shutdown => {}
        }
        Ok(())
    }
}

struct Player {
    game: ThrowGame,
}

impl tickstate::Handler<Game> for Player {
    type Error = SensorDropout;

    fn run(&mut self, state: &Game, sm: &mut StateMachine<Game>) -> Result<(), SensorDropout> {
        self.game.play(state, sm)
    }
}

fn script() -> Vec<Option<Accel>> {
    use Accel::*;

    let mut readings = vec![Some(Stationary); 3];
    readings.push(Some(High));
    readings.extend([Some(Moving); 4]);
    readings.extend([Some(Freefall); 10]);
    readings.extend([Some(Stationary); 6]);
    readings.push(None);
    readings.extend([Some(High); 2]);
    readings.extend([Some(Moving); 3]);
    readings
}

fn main() {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tickstate=debug")),
        )
        .init();

    println!("=== Throw and Catch ===\n");

    let machine = StateMachineBuilder::new()
        .initial(Game::Menu)
        .name("ThrowAndCatch")
        .logging(true)
        .watchdog_limit(10)
        .build()
        .unwrap();
    let handler = Recovering::new(
        Player {
            game: ThrowGame::new(script()),
        },
        |state: &Game, error: &SensorDropout| {
            println!("  {state:?} failed: {error}; back to menu");
            Some(Game::Menu)
        },
    );
    let mut runner = Runner::new("Phone", machine, handler);

    let frames = script().len();
    for _ in 0..frames {
        runner.update_with(0.1).unwrap();
        println!("{}", runner.label());
        runner.handler_mut().inner_mut().game.frame += 1;
    }

    runner.shutdown(Game::Shutdown).unwrap();
    println!("\nEnded: {}", runner.machine().ended());

    println!("\nTransitions:");
    for record in runner.machine().history().records() {
        println!("  {:?}: {:?} -> {:?}", record.kind, record.from, record.to);
    }

    println!("\n=== Example Complete ===");
}
