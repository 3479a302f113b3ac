#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-based instruction interpreter driving the path puzzle.
//!
//! The player queues a program of directional instructions while the
//! interpreter is idle. Running the program replays one instruction per
//! scheduled step against the current [`Level`], extending the path until an
//! instruction walks into a wall or obstacle, or the program runs out. A path
//! that ends on the goal scores `100 × round` and rolls straight into the next
//! round's freshly generated level.

use std::time::Duration;

use grid_arcade_core::{
    CellCoord, Difficulty, Direction, FailureReason, PuzzleCommand, PuzzleEvent, PuzzlePhase,
    PuzzleSnapshot, RejectionReason, Scheduler, TimerId,
};
use grid_arcade_system_level_generation::{GenerationError, LevelGenerator};
use grid_arcade_system_scoring::ScoreKeeper;
use grid_arcade_world::Level;

/// Pause between two replayed instructions.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

/// Points awarded per round number for reaching the goal.
pub const POINTS_PER_ROUND: u64 = 100;

/// Configuration parameters required to construct the interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    difficulty: Difficulty,
    step_delay: Duration,
}

impl Config {
    /// Creates a new configuration using the provided difficulty and pacing.
    #[must_use]
    pub const fn new(difficulty: Difficulty, step_delay: Duration) -> Self {
        Self {
            difficulty,
            step_delay,
        }
    }

    /// Difficulty the session starts with.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Pause between replayed instructions.
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        self.step_delay
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Difficulty::Easy, DEFAULT_STEP_DELAY)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExecutionState {
    Idle,
    Executing { next: usize, pending: TimerId },
    Failed(FailureReason),
}

/// Instruction puzzle state machine.
#[derive(Debug)]
pub struct Interpreter {
    generator: LevelGenerator,
    difficulty: Difficulty,
    step_delay: Duration,
    level: Level,
    round: u32,
    score: ScoreKeeper,
    program: Vec<Direction>,
    path: Vec<CellCoord>,
    state: ExecutionState,
}

impl Interpreter {
    /// Creates an interpreter and generates the first round's level.
    pub fn new(config: Config, mut generator: LevelGenerator) -> Result<Self, GenerationError> {
        let level = generator.generate(config.difficulty(), 1)?;
        Ok(Self::with_level(config, generator, level))
    }

    /// Creates an interpreter that starts on a prepared level.
    ///
    /// The generator is only consulted once the prepared level is completed or
    /// reset.
    #[must_use]
    pub fn with_level(config: Config, generator: LevelGenerator, level: Level) -> Self {
        let start = level.start();
        Self {
            generator,
            difficulty: config.difficulty(),
            step_delay: config.step_delay(),
            level,
            round: 1,
            score: ScoreKeeper::new(),
            program: Vec::new(),
            path: vec![start],
            state: ExecutionState::Idle,
        }
    }

    /// Applies a command, forwarding scheduling requests to `scheduler`.
    pub fn apply<S>(
        &mut self,
        command: PuzzleCommand,
        scheduler: &mut S,
        out_events: &mut Vec<PuzzleEvent>,
    ) -> Result<(), GenerationError>
    where
        S: Scheduler + ?Sized,
    {
        match command {
            PuzzleCommand::Enqueue { instruction } => {
                self.enqueue(instruction, out_events);
                Ok(())
            }
            PuzzleCommand::ClearProgram => {
                self.clear(out_events);
                Ok(())
            }
            PuzzleCommand::Run => self.run(scheduler, out_events),
            PuzzleCommand::ResetRound => self.reset_round(scheduler, out_events),
            PuzzleCommand::Restart => self.restart(scheduler, out_events),
            PuzzleCommand::SelectDifficulty { difficulty } => {
                self.select_difficulty(difficulty, scheduler, out_events)
            }
            PuzzleCommand::TimerFired { timer } => self.handle_timer(timer, scheduler, out_events),
        }
    }

    /// Appends an instruction to the program while idle.
    ///
    /// Rejected during a replay and after a failed round until it is reset.
    pub fn enqueue(&mut self, instruction: Direction, out_events: &mut Vec<PuzzleEvent>) {
        if self.reject_unless_idle(out_events) {
            return;
        }
        self.program.push(instruction);
        out_events.push(PuzzleEvent::InstructionQueued {
            instruction,
            length: self.program.len(),
        });
    }

    /// Empties the program while idle.
    pub fn clear(&mut self, out_events: &mut Vec<PuzzleEvent>) {
        if self.reject_unless_idle(out_events) {
            return;
        }
        self.program.clear();
        out_events.push(PuzzleEvent::ProgramCleared);
    }

    /// Starts replaying the program from the start cell.
    ///
    /// Only accepted while idle. An empty program is judged immediately.
    pub fn run<S>(
        &mut self,
        scheduler: &mut S,
        out_events: &mut Vec<PuzzleEvent>,
    ) -> Result<(), GenerationError>
    where
        S: Scheduler + ?Sized,
    {
        match self.state {
            ExecutionState::Idle => {}
            ExecutionState::Executing { .. } => {
                self.reject(RejectionReason::Executing, out_events);
                return Ok(());
            }
            ExecutionState::Failed(_) => {
                self.reject(RejectionReason::AwaitingReset, out_events);
                return Ok(());
            }
        }

        self.path.clear();
        self.path.push(self.level.start());
        out_events.push(PuzzleEvent::ExecutionStarted {
            steps: self.program.len(),
        });

        if self.program.is_empty() {
            return self.judge(out_events);
        }

        let pending = scheduler.schedule_after(self.step_delay);
        self.state = ExecutionState::Executing { next: 0, pending };
        Ok(())
    }

    /// Replays the next instruction when `timer` is the pending step.
    ///
    /// Timers that do not belong to the current replay are ignored, so a step
    /// scheduled before a reset can never touch the new round.
    pub fn handle_timer<S>(
        &mut self,
        timer: TimerId,
        scheduler: &mut S,
        out_events: &mut Vec<PuzzleEvent>,
    ) -> Result<(), GenerationError>
    where
        S: Scheduler + ?Sized,
    {
        let ExecutionState::Executing { next, pending } = self.state else {
            return Ok(());
        };
        if timer != pending {
            return Ok(());
        }

        let Some(instruction) = self.program.get(next).copied() else {
            return self.judge(out_events);
        };

        let from = self.current_cell();
        let to = from.step(instruction);
        if self.level.world().is_blocked(to) {
            self.fail(FailureReason::WallHit, out_events);
            return Ok(());
        }

        self.path.push(to);
        out_events.push(PuzzleEvent::Stepped { from, to });
        log::debug!("step {} of {}: {from} -> {to}", next + 1, self.program.len());

        if next + 1 < self.program.len() {
            let pending = scheduler.schedule_after(self.step_delay);
            self.state = ExecutionState::Executing {
                next: next + 1,
                pending,
            };
            Ok(())
        } else {
            self.judge(out_events)
        }
    }

    /// Abandons the current attempt and regenerates the round's level.
    ///
    /// The session score and the round number are kept.
    pub fn reset_round<S>(
        &mut self,
        scheduler: &mut S,
        out_events: &mut Vec<PuzzleEvent>,
    ) -> Result<(), GenerationError>
    where
        S: Scheduler + ?Sized,
    {
        self.cancel_pending(scheduler);
        self.regenerate(out_events)
    }

    /// Starts a new session at round one with zero score.
    pub fn restart<S>(
        &mut self,
        scheduler: &mut S,
        out_events: &mut Vec<PuzzleEvent>,
    ) -> Result<(), GenerationError>
    where
        S: Scheduler + ?Sized,
    {
        self.cancel_pending(scheduler);
        self.round = 1;
        self.score.reset();
        log::info!("puzzle restarted on {}", self.difficulty);
        self.regenerate(out_events)
    }

    /// Switches difficulty and regenerates the level for the current round.
    pub fn select_difficulty<S>(
        &mut self,
        difficulty: Difficulty,
        scheduler: &mut S,
        out_events: &mut Vec<PuzzleEvent>,
    ) -> Result<(), GenerationError>
    where
        S: Scheduler + ?Sized,
    {
        self.cancel_pending(scheduler);
        self.difficulty = difficulty;
        self.regenerate(out_events)
    }

    /// Captures an owned view for renderers.
    #[must_use]
    pub fn snapshot(&self) -> PuzzleSnapshot {
        PuzzleSnapshot {
            size: self.level.world().size(),
            obstacles: self.level.world().obstacles().collect(),
            start: self.level.start(),
            goal: self.level.goal(),
            path: self.path.clone(),
            program: self.program.clone(),
            score: self.score.current(),
            round: self.round,
            difficulty: self.difficulty,
            phase: self.phase(),
        }
    }

    /// Current observable state.
    #[must_use]
    pub fn phase(&self) -> PuzzlePhase {
        match self.state {
            ExecutionState::Idle => PuzzlePhase::Idle,
            ExecutionState::Executing { .. } => PuzzlePhase::Executing,
            ExecutionState::Failed(reason) => PuzzlePhase::Failure(reason),
        }
    }

    /// Level currently being played.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Cells visited by the current attempt, beginning at the start.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Pending program.
    #[must_use]
    pub fn program(&self) -> &[Direction] {
        &self.program
    }

    /// Session score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score.current()
    }

    /// Current round, starting at one.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Active difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn current_cell(&self) -> CellCoord {
        self.path.last().copied().unwrap_or(self.level.start())
    }

    fn judge(&mut self, out_events: &mut Vec<PuzzleEvent>) -> Result<(), GenerationError> {
        if self.current_cell() != self.level.goal() {
            self.fail(FailureReason::WrongEndpoint, out_events);
            return Ok(());
        }

        let completed = self.round;
        let awarded = POINTS_PER_ROUND.saturating_mul(u64::from(completed));
        self.score.add(awarded);
        out_events.push(PuzzleEvent::RoundCompleted {
            round: completed,
            awarded,
            score: self.score.current(),
        });
        log::info!(
            "round {completed} completed in {} steps, score {}",
            self.program.len(),
            self.score.current()
        );

        self.round = self.round.saturating_add(1);
        self.regenerate(out_events)
    }

    fn fail(&mut self, reason: FailureReason, out_events: &mut Vec<PuzzleEvent>) {
        let at = self.current_cell();
        self.state = ExecutionState::Failed(reason);
        out_events.push(PuzzleEvent::RoundFailed { reason, at });
        log::info!("round {} failed at {at}: {reason}", self.round);
    }

    fn regenerate(&mut self, out_events: &mut Vec<PuzzleEvent>) -> Result<(), GenerationError> {
        self.level = self.generator.generate(self.difficulty, self.round)?;
        self.program.clear();
        self.path.clear();
        self.path.push(self.level.start());
        self.state = ExecutionState::Idle;
        out_events.push(PuzzleEvent::LevelGenerated {
            round: self.round,
            difficulty: self.difficulty,
        });
        Ok(())
    }

    fn cancel_pending<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        if let ExecutionState::Executing { pending, .. } = self.state {
            scheduler.cancel(pending);
            self.state = ExecutionState::Idle;
        }
    }

    fn reject_unless_idle(&self, out_events: &mut Vec<PuzzleEvent>) -> bool {
        let reason = match self.state {
            ExecutionState::Idle => return false,
            ExecutionState::Executing { .. } => RejectionReason::Executing,
            ExecutionState::Failed(_) => RejectionReason::AwaitingReset,
        };
        self.reject(reason, out_events);
        true
    }

    fn reject(&self, reason: RejectionReason, out_events: &mut Vec<PuzzleEvent>) {
        log::debug!("puzzle input rejected: {reason:?}");
        out_events.push(PuzzleEvent::InputRejected { reason });
    }
}
