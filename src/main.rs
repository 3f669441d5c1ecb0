use std::io;
use std::panic;
use std::time::{Duration, Instant};

use clap::Parser;
use grid_snake::config::{
    DEFAULT_CELL_SIZE, DEFAULT_STAGE_HEIGHT, DEFAULT_STAGE_WIDTH, DEFAULT_TICK_INTERVAL_MS,
    Stage, THEMES,
};
use grid_snake::input::{self, GameInput};
use grid_snake::renderer::{TerminalRenderer, cleanup_terminal_best_effort};
use grid_snake::score::{HighScoreTracker, load_high_score, save_high_score};
use grid_snake::session::{GameSession, SessionStatus};

/// How long one input poll may block; doubles as the loop pacing.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Stage width in pixels.
    #[arg(long, default_value_t = DEFAULT_STAGE_WIDTH)]
    width: i32,

    /// Stage height in pixels.
    #[arg(long, default_value_t = DEFAULT_STAGE_HEIGHT)]
    height: i32,

    /// Grid cell size in pixels.
    #[arg(long, default_value_t = DEFAULT_CELL_SIZE)]
    cell: i32,

    /// Tick interval in milliseconds.
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// RNG seed for reproducible food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Theme index in cycle order.
    #[arg(long, default_value_t = 0)]
    theme: usize,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let stored_high = match load_high_score() {
        Ok(score) => score,
        Err(error) => {
            eprintln!("Warning: could not read high score file: {error}");
            0
        }
    };

    install_panic_hook();
    run(cli, stored_high)
}

fn run(cli: Cli, stored_high: u32) -> io::Result<()> {
    let stage = Stage::new(
        cli.width,
        cli.height,
        cli.cell,
        Duration::from_millis(cli.tick_ms),
    );
    let theme = THEMES.get(cli.theme).unwrap_or(&THEMES[0]);

    let mut session = match cli.seed {
        Some(seed) => GameSession::with_seed(stage, seed),
        None => GameSession::new(stage),
    };
    let mut scores = HighScoreTracker::new(stored_high);
    let mut renderer = TerminalRenderer::new(stage, theme)?;
    renderer.set_high_score(stored_high);
    renderer.render_start_screen();

    let mut saved_high = stored_high;
    let mut last_status = session.status;

    loop {
        if let Some(game_input) = input::poll_input(INPUT_POLL_INTERVAL)? {
            match game_input {
                GameInput::Quit => break,
                GameInput::Confirm => match session.status {
                    SessionStatus::Idle | SessionStatus::Dead => {
                        session.start(Instant::now(), &mut renderer, &mut scores);
                    }
                    SessionStatus::Running => {}
                },
                GameInput::Direction(direction) => session.set_direction(direction),
            }
        }

        renderer.set_high_score(scores.high_score());
        session.poll_tick(Instant::now(), &mut renderer, &mut scores);
        renderer.take_error()?;

        if session.status != last_status {
            if session.status == SessionStatus::Dead && scores.high_score() > saved_high {
                if let Err(error) = save_high_score(scores.high_score()) {
                    eprintln!("Failed to save high score: {error}");
                }
                saved_high = scores.high_score();
            }

            last_status = session.status;
        }
    }

    if scores.high_score() > saved_high {
        if let Err(error) = save_high_score(scores.high_score()) {
            eprintln!("Failed to save high score: {error}");
        }
    }

    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = cleanup_terminal_best_effort();
        default_hook(panic_info);
    }));
}
