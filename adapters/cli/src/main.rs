#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Grid Arcade sessions headlessly.

mod config;
mod script;
mod session;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use grid_arcade_core::{Difficulty, WELCOME_BANNER};
use grid_arcade_rendering::TextBackend;

use crate::{
    config::FileConfig,
    session::{PuzzleOptions, SnakeOptions},
};

#[derive(Debug, Parser)]
#[command(name = "grid-arcade", version, about = "Headless grid mini-games")]
struct Cli {
    /// TOML file overriding pacing, snake board and reward settings.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a frame after every step or tick.
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play the path-instruction puzzle.
    Puzzle(PuzzleArgs),
    /// Play a scripted snake run.
    Snake(SnakeArgs),
}

#[derive(Debug, Args)]
struct PuzzleArgs {
    /// Difficulty preset: easy, medium or hard.
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Seed for reproducible levels; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Program to play on the first round, e.g. `RRDDR`; auto-solves when omitted.
    #[arg(long)]
    program: Option<String>,

    /// Rounds to auto-solve.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
}

#[derive(Debug, Args)]
struct SnakeArgs {
    /// Seed for reproducible apple placement; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// One symbol per tick: U, D, L or R to turn, `.` to keep going.
    #[arg(long, default_value = "RRRR....DDDD....LLLL....UUUU....")]
    moves: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    println!("{WELCOME_BANNER}");
    let stdout = io::stdout();
    let mut backend = TextBackend::new(stdout.lock());

    match cli.command {
        Command::Puzzle(args) => {
            let program = args
                .program
                .as_deref()
                .map(script::parse_program)
                .transpose()
                .context("invalid --program")?;
            let options = PuzzleOptions {
                seed: args.seed,
                program,
                rounds: args.rounds,
                trace: cli.trace,
            };
            let summary = session::play_puzzle(file.puzzle(args.difficulty), &options, &mut backend)?;
            match summary.failure {
                Some(reason) => println!(
                    "round failed ({reason}) after {} completed rounds, score {}",
                    summary.completed, summary.score
                ),
                None => println!(
                    "completed {} rounds, score {}",
                    summary.completed, summary.score
                ),
            }
        }
        Command::Snake(args) => {
            let options = SnakeOptions {
                seed: args.seed,
                moves: script::parse_moves(&args.moves).context("invalid --moves")?,
                trace: cli.trace,
            };
            let summary = session::play_snake(file.snake()?, &options, &mut backend)?;
            let outcome = if summary.game_over { "game over" } else { "still alive" };
            println!(
                "{outcome} after {} ticks: score {}, level {}, length {}",
                summary.ticks, summary.score, summary.level, summary.length
            );
        }
    }

    Ok(())
}
