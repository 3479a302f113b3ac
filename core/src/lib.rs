#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Arcade engine.
//!
//! This crate defines the message surface that connects adapters, the grid
//! world, and the two simulators. Adapters submit [`PuzzleCommand`] or
//! [`SnakeCommand`] values describing desired mutations, the simulators apply
//! them and broadcast [`PuzzleEvent`] or [`SnakeEvent`] values describing what
//! happened. Renderers never touch simulator state directly; they read the
//! owned [`PuzzleSnapshot`] and [`SnakeSnapshot`] values instead.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Arcade.";

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that a candidate step just past the grid edge is
/// representable and can be rejected by a bounds check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the neighbouring cell one unit away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            column: self.column.saturating_add(dx),
            row: self.row.saturating_add(dy),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the two cells differ by exactly one unit on one axis.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal directions used both as puzzle instructions and snake headings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset applied to a cell when moving in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction pointing the opposite way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction that leads from `from` to the adjacent cell `to`, if any.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| from.step(*direction) == to)
    }
}

/// Difficulty preset selected by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Small grid with few obstacles.
    #[default]
    Easy,
    /// Medium grid with a moderate obstacle base.
    Medium,
    /// Large grid with a dense obstacle base.
    Hard,
}

impl Difficulty {
    /// Grid dimensions used by the instruction puzzle at this difficulty.
    #[must_use]
    pub const fn puzzle_size(self) -> GridSize {
        match self {
            Self::Easy => GridSize::new(10, 10),
            Self::Medium => GridSize::new(15, 15),
            Self::Hard => GridSize::new(30, 30),
        }
    }

    /// Number of obstacles placed on the first round before round scaling.
    #[must_use]
    pub const fn obstacle_base(self) -> u32 {
        match self {
            Self::Easy => 2,
            Self::Medium => 4,
            Self::Hard => 6,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Error returned when a difficulty name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownDifficulty(String);

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown difficulty `{}` (expected easy, medium or hard)",
            self.0
        )
    }
}

impl std::error::Error for UnknownDifficulty {}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(UnknownDifficulty(value.to_owned())),
        }
    }
}

/// Width and height of a grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell in the middle of the grid, rounding toward the origin.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

/// Handle identifying a single delayed or repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Creates a new timer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Cancellable scheduling capability injected into the simulators.
///
/// Implementations deliver fired timers back to the host, which forwards them
/// to the simulator as a `TimerFired` command. Cancelling a timer that already
/// fired, was cancelled, or never existed must be a silent no-op.
pub trait Scheduler {
    /// Requests a single wake-up once `delay` has elapsed.
    fn schedule_after(&mut self, delay: Duration) -> TimerId;

    /// Requests a wake-up every `interval` until cancelled.
    fn schedule_every(&mut self, interval: Duration) -> TimerId;

    /// Cancels a pending timer.
    fn cancel(&mut self, timer: TimerId);
}

/// Why a simulator ignored an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The program is being replayed and cannot be edited or restarted.
    Executing,
    /// The round ended in failure and must be reset before running again.
    AwaitingReset,
    /// The requested heading reverses the snake into its own body.
    Reversal,
    /// The snake game is over and must be reset first.
    GameOver,
}

/// Reason a puzzle round failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// A step left the grid or entered an obstacle.
    WallHit,
    /// Every step was legal but the path ended away from the goal.
    WrongEndpoint,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WallHit => f.write_str("hit a wall"),
            Self::WrongEndpoint => f.write_str("wrong path"),
        }
    }
}

/// Observable state of the instruction puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PuzzlePhase {
    /// Accepting queued instructions.
    Idle,
    /// Replaying the program one step at a time.
    Executing,
    /// The round failed; terminal until reset.
    Failure(FailureReason),
}

/// Commands that express all permissible puzzle mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PuzzleCommand {
    /// Appends an instruction to the pending program.
    Enqueue {
        /// Instruction to append.
        instruction: Direction,
    },
    /// Empties the pending program.
    ClearProgram,
    /// Starts replaying the pending program.
    Run,
    /// Regenerates the current round's level without touching the score.
    ResetRound,
    /// Starts a new session from round one with zero score.
    Restart,
    /// Switches difficulty and regenerates the level.
    SelectDifficulty {
        /// Difficulty to activate.
        difficulty: Difficulty,
    },
    /// Delivers a timer previously requested from the scheduler.
    TimerFired {
        /// Timer that fired.
        timer: TimerId,
    },
}

/// Events broadcast by the puzzle after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PuzzleEvent {
    /// Confirms that an instruction joined the program.
    InstructionQueued {
        /// Instruction that was appended.
        instruction: Direction,
        /// Program length after appending.
        length: usize,
    },
    /// Confirms that the program was emptied.
    ProgramCleared,
    /// Announces that replay began.
    ExecutionStarted {
        /// Number of instructions that will be replayed.
        steps: usize,
    },
    /// Confirms that a single instruction moved the marker.
    Stepped {
        /// Cell occupied before the step.
        from: CellCoord,
        /// Cell occupied after the step.
        to: CellCoord,
    },
    /// Reports that the path ended on the goal.
    RoundCompleted {
        /// Round that was completed.
        round: u32,
        /// Points awarded for the round.
        awarded: u64,
        /// Session score after the award.
        score: u64,
    },
    /// Reports that the round failed.
    RoundFailed {
        /// Why the round failed.
        reason: FailureReason,
        /// Last cell reached by the path.
        at: CellCoord,
    },
    /// Announces that a fresh level was generated.
    LevelGenerated {
        /// Round the level belongs to.
        round: u32,
        /// Difficulty the level was generated for.
        difficulty: Difficulty,
    },
    /// Reports that an input was ignored.
    InputRejected {
        /// Why the input was ignored.
        reason: RejectionReason,
    },
}

/// Read-only view of the instruction puzzle for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PuzzleSnapshot {
    /// Grid dimensions.
    pub size: GridSize,
    /// Obstacle cells in ascending order.
    pub obstacles: Vec<CellCoord>,
    /// Start marker.
    pub start: CellCoord,
    /// Goal marker.
    pub goal: CellCoord,
    /// Cells visited so far, beginning with the start.
    pub path: Vec<CellCoord>,
    /// Pending program.
    pub program: Vec<Direction>,
    /// Session score.
    pub score: u64,
    /// Current round, starting at one.
    pub round: u32,
    /// Active difficulty.
    pub difficulty: Difficulty,
    /// Current state.
    pub phase: PuzzlePhase,
}

/// Reward tier of a collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardClass {
    /// Common apple.
    Regular,
    /// Rare apple worth more points.
    Golden,
}

/// Scoring pickup consumed by the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Collectible {
    /// Cell the collectible occupies.
    pub cell: CellCoord,
    /// Tier the collectible was drawn from.
    pub class: RewardClass,
    /// Points awarded on consumption.
    pub reward: u32,
}

/// Observable state of the snake simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnakePhase {
    /// Advancing once per interval.
    Running,
    /// Frozen until reset.
    GameOver,
}

/// Commands that express all permissible snake mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnakeCommand {
    /// Arms the tick interval.
    Start,
    /// Requests a new heading.
    SetDirection {
        /// Heading to adopt.
        direction: Direction,
    },
    /// Delivers a timer previously requested from the scheduler.
    TimerFired {
        /// Timer that fired.
        timer: TimerId,
    },
    /// Returns to a fresh running game.
    Reset,
}

/// Events broadcast by the snake simulator after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnakeEvent {
    /// Announces that the tick interval was armed.
    Started,
    /// Confirms a heading change.
    DirectionChanged {
        /// Heading now in effect.
        direction: Direction,
    },
    /// Confirms that the snake moved without growing.
    Advanced {
        /// New head cell.
        head: CellCoord,
    },
    /// Confirms that the snake ate a collectible and grew.
    CollectibleConsumed {
        /// Collectible that was eaten.
        collectible: Collectible,
        /// Score after the award.
        score: u64,
        /// Snake length after growing.
        length: usize,
    },
    /// Announces a newly placed collectible.
    CollectibleSpawned {
        /// Collectible that was placed.
        collectible: Collectible,
    },
    /// Reports that the snake crashed.
    GameOver {
        /// Score at the moment of the crash.
        final_score: u64,
        /// Body as it was before the fatal tick, head first.
        body: Vec<CellCoord>,
    },
    /// Confirms that the game returned to a fresh state.
    Reset,
    /// Reports that an input was ignored.
    InputRejected {
        /// Why the input was ignored.
        reason: RejectionReason,
    },
}

/// Read-only view of the snake simulator for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnakeSnapshot {
    /// Grid dimensions.
    pub size: GridSize,
    /// Body cells, head first.
    pub body: Vec<CellCoord>,
    /// Current collectible, absent when the board is full.
    pub collectible: Option<Collectible>,
    /// Current heading, absent until the first input.
    pub heading: Option<Direction>,
    /// Session score.
    pub score: u64,
    /// Level derived from apples eaten, starting at one.
    pub level: u32,
    /// Current state.
    pub phase: SnakePhase,
}
