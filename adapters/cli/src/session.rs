//! Headless sessions driving the simulators on a virtual clock.

use anyhow::{bail, Context, Result};
use grid_arcade_core::{
    Direction, FailureReason, PuzzleCommand, PuzzlePhase, SnakeCommand, SnakePhase,
};
use grid_arcade_rendering::{Frame, Presentation, RenderingBackend};
use grid_arcade_system_interpreter::{self as interpreter, Interpreter};
use grid_arcade_system_level_generation::LevelGenerator;
use grid_arcade_system_scheduling::VirtualClock;
use grid_arcade_system_snake::{self as snake, Snake};
use grid_arcade_world::query;

/// Regenerations tolerated per round before giving up on unsolvable levels.
const MAX_REGENERATIONS: u32 = 64;

/// Puzzle run requested on the command line.
#[derive(Clone, Debug)]
pub(crate) struct PuzzleOptions {
    pub(crate) seed: Option<u64>,
    pub(crate) program: Option<Vec<Direction>>,
    pub(crate) rounds: u32,
    pub(crate) trace: bool,
}

/// Outcome of a puzzle run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PuzzleSummary {
    pub(crate) completed: u32,
    pub(crate) score: u64,
    pub(crate) failure: Option<FailureReason>,
}

/// Plays scripted or auto-solved puzzle rounds, presenting frames as it goes.
///
/// A scripted program is played for a single round; without one, each round
/// is solved with a shortest program and unsolvable levels are regenerated.
pub(crate) fn play_puzzle<B>(
    config: interpreter::Config,
    options: &PuzzleOptions,
    backend: &mut B,
) -> Result<PuzzleSummary>
where
    B: RenderingBackend + ?Sized,
{
    let generator = options
        .seed
        .map_or_else(LevelGenerator::from_entropy, LevelGenerator::from_seed);
    let mut interpreter =
        Interpreter::new(config, generator).context("failed to generate the first level")?;
    let mut clock = VirtualClock::new();
    let mut events = Vec::new();
    let rounds = if options.program.is_some() { 1 } else { options.rounds };
    let mut completed = 0;
    let mut regenerations = 0;

    while completed < rounds {
        let program = match &options.program {
            Some(program) => program.clone(),
            None => match query::shortest_program(interpreter.level()) {
                Some(program) => program,
                None => {
                    regenerations += 1;
                    if regenerations > MAX_REGENERATIONS {
                        bail!(
                            "round {} stayed unsolvable after {MAX_REGENERATIONS} regenerations",
                            interpreter.round()
                        );
                    }
                    log::warn!("round {} is unsolvable, regenerating", interpreter.round());
                    interpreter.apply(PuzzleCommand::ResetRound, &mut clock, &mut events)?;
                    continue;
                }
            },
        };
        regenerations = 0;

        let round = interpreter.round();
        for instruction in program {
            interpreter.apply(PuzzleCommand::Enqueue { instruction }, &mut clock, &mut events)?;
        }
        present_puzzle(backend, format!("round {round}"), &interpreter)?;
        interpreter.apply(PuzzleCommand::Run, &mut clock, &mut events)?;

        while interpreter.phase() == PuzzlePhase::Executing {
            if clock.advance_to_next().is_none() {
                bail!("interpreter is executing without a pending step");
            }
            while let Some(timer) = clock.poll() {
                interpreter.apply(PuzzleCommand::TimerFired { timer }, &mut clock, &mut events)?;
                if options.trace && interpreter.phase() == PuzzlePhase::Executing {
                    present_puzzle(backend, format!("round {round} step"), &interpreter)?;
                }
            }
        }
        log::debug!("round {round} produced {} events", events.len());
        events.clear();

        if let PuzzlePhase::Failure(reason) = interpreter.phase() {
            present_puzzle(backend, format!("round {round} failed"), &interpreter)?;
            return Ok(PuzzleSummary {
                completed,
                score: interpreter.score(),
                failure: Some(reason),
            });
        }
        completed += 1;
    }

    present_puzzle(backend, "final", &interpreter)?;
    Ok(PuzzleSummary {
        completed,
        score: interpreter.score(),
        failure: None,
    })
}

fn present_puzzle<B>(backend: &mut B, title: impl Into<String>, interpreter: &Interpreter) -> Result<()>
where
    B: RenderingBackend + ?Sized,
{
    let frame = Frame::from_puzzle(&interpreter.snapshot())?;
    backend.present(&Presentation::new(title, frame))
}

/// Snake run requested on the command line.
#[derive(Clone, Debug)]
pub(crate) struct SnakeOptions {
    pub(crate) seed: Option<u64>,
    pub(crate) moves: Vec<Option<Direction>>,
    pub(crate) trace: bool,
}

/// Outcome of a snake run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SnakeSummary {
    pub(crate) ticks: usize,
    pub(crate) score: u64,
    pub(crate) level: u32,
    pub(crate) length: usize,
    pub(crate) game_over: bool,
}

/// Plays a move script, one tick per move, stopping early on game over.
pub(crate) fn play_snake<B>(
    config: snake::Config,
    options: &SnakeOptions,
    backend: &mut B,
) -> Result<SnakeSummary>
where
    B: RenderingBackend + ?Sized,
{
    let mut snake = match options.seed {
        Some(seed) => Snake::from_seed(config, seed)?,
        None => Snake::from_entropy(config)?,
    };
    let mut clock = VirtualClock::new();
    let mut events = Vec::new();
    snake.apply(SnakeCommand::Start, &mut clock, &mut events);
    present_snake(backend, "start", &snake)?;

    let mut ticks = 0;
    for step in &options.moves {
        if let Some(direction) = *step {
            snake.apply(SnakeCommand::SetDirection { direction }, &mut clock, &mut events);
        }
        clock.advance(config.tick_interval());
        while let Some(timer) = clock.poll() {
            snake.apply(SnakeCommand::TimerFired { timer }, &mut clock, &mut events);
        }
        ticks += 1;
        events.clear();

        if options.trace {
            present_snake(backend, format!("tick {ticks}"), &snake)?;
        }
        if snake.phase() == SnakePhase::GameOver {
            break;
        }
    }

    present_snake(backend, "final", &snake)?;
    Ok(SnakeSummary {
        ticks,
        score: snake.score(),
        level: snake.level(),
        length: snake.len(),
        game_over: snake.phase() == SnakePhase::GameOver,
    })
}

fn present_snake<B>(backend: &mut B, title: impl Into<String>, snake: &Snake) -> Result<()>
where
    B: RenderingBackend + ?Sized,
{
    let frame = Frame::from_snake(&snake.snapshot())?;
    backend.present(&Presentation::new(title, frame))
}
