#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-interval snake simulation.
//!
//! The snake advances one cell per tick of a repeating timer obtained from the
//! injected [`Scheduler`]. Leaving the grid or running into its own body ends
//! the game; eating the apple grows the body by one cell, awards the apple's
//! reward and places a new apple on a free cell.

mod rewards;

use std::{collections::VecDeque, time::Duration};

use grid_arcade_core::{
    CellCoord, Collectible, Direction, GridSize, RejectionReason, Scheduler, SnakeCommand,
    SnakeEvent, SnakePhase, SnakeSnapshot, TimerId,
};
use grid_arcade_system_scoring::ScoreKeeper;
use grid_arcade_world::{query, GridWorld, WorldError};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use rewards::{
    RewardTable, RewardTableError, DEFAULT_GOLDEN_PROBABILITY, DEFAULT_GOLDEN_REWARD,
    DEFAULT_REGULAR_REWARD,
};

/// Board used when no other size is configured.
pub const DEFAULT_GRID: GridSize = GridSize::new(20, 20);

/// Time between two ticks when no other pacing is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Apples needed to advance one level when not configured otherwise.
pub const DEFAULT_APPLES_PER_LEVEL: u32 = 5;

/// Errors raised while setting up a snake board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SnakeError {
    /// The board dimensions were rejected.
    #[error(transparent)]
    World(#[from] WorldError),
    /// A body must hold at least one cell.
    #[error("snake body must contain at least one cell")]
    EmptyBody,
    /// A body cell lies outside the grid.
    #[error("snake segment {cell} lies outside the grid")]
    SegmentOutOfBounds {
        /// Offending segment.
        cell: CellCoord,
    },
    /// Two consecutive segments are not adjacent.
    #[error("snake segment {cell} is not adjacent to the previous segment")]
    Disconnected {
        /// First segment breaking contiguity.
        cell: CellCoord,
    },
    /// A cell appears twice in the body.
    #[error("snake segment {cell} overlaps another segment")]
    Overlapping {
        /// Repeated segment.
        cell: CellCoord,
    },
    /// The heading points back into the second segment.
    #[error("heading {heading:?} reverses the snake into its second segment")]
    Reversal {
        /// Rejected heading.
        heading: Direction,
    },
    /// The apple lies outside the grid or on the body.
    #[error("collectible at {cell} must sit on a free cell")]
    CollectibleMisplaced {
        /// Offending apple cell.
        cell: CellCoord,
    },
}

/// Configuration parameters required to construct the snake simulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    grid: GridSize,
    tick_interval: Duration,
    rewards: RewardTable,
    apples_per_level: u32,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `apples_per_level` is raised to one when zero.
    #[must_use]
    pub fn new(
        grid: GridSize,
        tick_interval: Duration,
        rewards: RewardTable,
        apples_per_level: u32,
    ) -> Self {
        Self {
            grid,
            tick_interval,
            rewards,
            apples_per_level: apples_per_level.max(1),
        }
    }

    /// Board dimensions.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Time between ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Apple reward distribution.
    #[must_use]
    pub const fn rewards(&self) -> RewardTable {
        self.rewards
    }

    /// Apples eaten per level increment.
    #[must_use]
    pub const fn apples_per_level(&self) -> u32 {
        self.apples_per_level
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_GRID,
            DEFAULT_TICK_INTERVAL,
            RewardTable::default(),
            DEFAULT_APPLES_PER_LEVEL,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SimulationState {
    Running { interval: Option<TimerId> },
    GameOver,
}

/// Snake state machine.
#[derive(Debug)]
pub struct Snake<R = ChaCha8Rng> {
    world: GridWorld,
    tick_interval: Duration,
    rewards: RewardTable,
    apples_per_level: u32,
    rng: R,
    body: VecDeque<CellCoord>,
    heading: Option<Direction>,
    collectible: Option<Collectible>,
    score: ScoreKeeper,
    apples: u32,
    state: SimulationState,
}

impl Snake<ChaCha8Rng> {
    /// Creates a reproducible simulator from a numeric seed.
    pub fn from_seed(config: Config, seed: u64) -> Result<Self, SnakeError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a simulator seeded from operating system entropy.
    pub fn from_entropy(config: Config) -> Result<Self, SnakeError> {
        Self::new(config, ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> Snake<R> {
    /// Creates a simulator with a length-one snake at the grid centre.
    ///
    /// The tick interval stays unarmed until [`Snake::start`].
    pub fn new(config: Config, rng: R) -> Result<Self, SnakeError> {
        let world = GridWorld::new(config.grid().width(), config.grid().height())?;
        let mut snake = Self {
            body: VecDeque::from([world.size().center()]),
            world,
            tick_interval: config.tick_interval(),
            rewards: config.rewards(),
            apples_per_level: config.apples_per_level(),
            rng,
            heading: None,
            collectible: None,
            score: ScoreKeeper::new(),
            apples: 0,
            state: SimulationState::Running { interval: None },
        };
        snake.collectible = snake.place_collectible();
        Ok(snake)
    }

    /// Applies a command, forwarding scheduling requests to `scheduler`.
    pub fn apply<S>(
        &mut self,
        command: SnakeCommand,
        scheduler: &mut S,
        out_events: &mut Vec<SnakeEvent>,
    ) where
        S: Scheduler + ?Sized,
    {
        match command {
            SnakeCommand::Start => self.start(scheduler, out_events),
            SnakeCommand::SetDirection { direction } => self.set_direction(direction, out_events),
            SnakeCommand::TimerFired { timer } => self.handle_timer(timer, scheduler, out_events),
            SnakeCommand::Reset => self.reset(scheduler, out_events),
        }
    }

    /// Arms the repeating tick interval.
    pub fn start<S>(&mut self, scheduler: &mut S, out_events: &mut Vec<SnakeEvent>)
    where
        S: Scheduler + ?Sized,
    {
        match self.state {
            SimulationState::GameOver => self.reject(RejectionReason::GameOver, out_events),
            SimulationState::Running { interval: Some(_) } => {
                log::debug!("snake already running");
            }
            SimulationState::Running { interval: None } => {
                self.arm(scheduler);
                out_events.push(SnakeEvent::Started);
                log::info!("snake started on a {}x{} grid", self.world.width(), self.world.height());
            }
        }
    }

    /// Requests a new heading for the next tick.
    ///
    /// A heading pointing straight back into the second segment is rejected,
    /// as is any input after the game ended.
    pub fn set_direction(&mut self, direction: Direction, out_events: &mut Vec<SnakeEvent>) {
        if self.state == SimulationState::GameOver {
            self.reject(RejectionReason::GameOver, out_events);
            return;
        }
        if self.travel() == Some(direction.opposite()) {
            self.reject(RejectionReason::Reversal, out_events);
            return;
        }
        if self.heading != Some(direction) {
            self.heading = Some(direction);
            out_events.push(SnakeEvent::DirectionChanged { direction });
        }
    }

    /// Advances the snake when `timer` is the armed tick interval.
    pub fn handle_timer<S>(
        &mut self,
        timer: TimerId,
        scheduler: &mut S,
        out_events: &mut Vec<SnakeEvent>,
    ) where
        S: Scheduler + ?Sized,
    {
        if self.state == (SimulationState::Running { interval: Some(timer) }) {
            self.tick(scheduler, out_events);
        }
    }

    /// Returns to a fresh running game and re-arms the tick interval.
    pub fn reset<S>(&mut self, scheduler: &mut S, out_events: &mut Vec<SnakeEvent>)
    where
        S: Scheduler + ?Sized,
    {
        self.disarm(scheduler);
        self.body.clear();
        self.body.push_back(self.world.size().center());
        self.heading = None;
        self.score.reset();
        self.apples = 0;
        self.collectible = self.place_collectible();
        self.arm(scheduler);

        out_events.push(SnakeEvent::Reset);
        if let Some(collectible) = self.collectible {
            out_events.push(SnakeEvent::CollectibleSpawned { collectible });
        }
        log::info!("snake reset");
    }

    /// Replaces the body, heading and apple with a prepared arrangement.
    ///
    /// The body is given head first and must be contiguous, in bounds and free
    /// of repeated cells. A heading may not point from the head back into the
    /// second segment. Score, level and timers are left untouched.
    pub fn arrange(
        &mut self,
        body: Vec<CellCoord>,
        heading: Option<Direction>,
        collectible: Option<Collectible>,
    ) -> Result<(), SnakeError> {
        let Some(head) = body.first().copied() else {
            return Err(SnakeError::EmptyBody);
        };
        let mut previous: Option<CellCoord> = None;
        for (index, cell) in body.iter().copied().enumerate() {
            if !self.world.in_bounds(cell) {
                return Err(SnakeError::SegmentOutOfBounds { cell });
            }
            if previous.is_some_and(|previous| !previous.is_adjacent(cell)) {
                return Err(SnakeError::Disconnected { cell });
            }
            if body[..index].contains(&cell) {
                return Err(SnakeError::Overlapping { cell });
            }
            previous = Some(cell);
        }
        if let Some(heading) = heading {
            let travel = body.get(1).and_then(|neck| Direction::between(*neck, head));
            if travel == Some(heading.opposite()) {
                return Err(SnakeError::Reversal { heading });
            }
        }
        if let Some(collectible) = collectible {
            if !self.world.in_bounds(collectible.cell) || body.contains(&collectible.cell) {
                return Err(SnakeError::CollectibleMisplaced {
                    cell: collectible.cell,
                });
            }
        }

        log::debug!("snake arranged with head at {head}, length {}", body.len());
        self.body = body.into();
        self.heading = heading;
        self.collectible = collectible;
        Ok(())
    }

    /// Captures an owned view for renderers.
    #[must_use]
    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            size: self.world.size(),
            body: self.body.iter().copied().collect(),
            collectible: self.collectible,
            heading: self.heading,
            score: self.score.current(),
            level: self.level(),
            phase: self.phase(),
        }
    }

    /// Current observable state.
    #[must_use]
    pub fn phase(&self) -> SnakePhase {
        match self.state {
            SimulationState::Running { .. } => SnakePhase::Running,
            SimulationState::GameOver => SnakePhase::GameOver,
        }
    }

    /// Reports whether the tick interval is armed.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        matches!(self.state, SimulationState::Running { interval: Some(_) })
    }

    /// Body cells, head first.
    pub fn body(&self) -> impl ExactSizeIterator<Item = CellCoord> + '_ {
        self.body.iter().copied()
    }

    /// Number of body cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Reports whether the body holds no cells; a live snake keeps its head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Heading applied on the next tick.
    #[must_use]
    pub const fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Apple currently on the board.
    #[must_use]
    pub const fn collectible(&self) -> Option<Collectible> {
        self.collectible
    }

    /// Session score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score.current()
    }

    /// Level derived from apples eaten, starting at one.
    #[must_use]
    pub fn level(&self) -> u32 {
        1 + self.apples / self.apples_per_level
    }

    /// Board the snake moves on.
    #[must_use]
    pub const fn world(&self) -> &GridWorld {
        &self.world
    }

    fn tick<S>(&mut self, scheduler: &mut S, out_events: &mut Vec<SnakeEvent>)
    where
        S: Scheduler + ?Sized,
    {
        let Some(heading) = self.heading else {
            return;
        };
        let Some(head) = self.body.front().copied() else {
            return;
        };

        let next = head.step(heading);
        if !self.world.in_bounds(next) {
            self.game_over(scheduler, out_events);
            return;
        }

        let vacating = self.body.len() - 1;
        if self.body.iter().take(vacating).any(|cell| *cell == next) {
            self.game_over(scheduler, out_events);
            return;
        }

        match self.collectible {
            Some(collectible) if collectible.cell == next => self.consume(collectible, out_events),
            _ => {
                self.body.push_front(next);
                let _ = self.body.pop_back();
                out_events.push(SnakeEvent::Advanced { head: next });
            }
        }
    }

    fn consume(&mut self, collectible: Collectible, out_events: &mut Vec<SnakeEvent>) {
        let level = self.level();
        self.body.push_front(collectible.cell);
        self.score.add(u64::from(collectible.reward));
        self.apples = self.apples.saturating_add(1);
        out_events.push(SnakeEvent::CollectibleConsumed {
            collectible,
            score: self.score.current(),
            length: self.body.len(),
        });
        if self.level() != level {
            log::info!("snake reached level {}", self.level());
        }

        self.collectible = self.place_collectible();
        if let Some(collectible) = self.collectible {
            out_events.push(SnakeEvent::CollectibleSpawned { collectible });
        }
    }

    fn place_collectible(&mut self) -> Option<Collectible> {
        let free = query::free_cells(&self.world, self.body.make_contiguous());
        let Some(cell) = free.choose(&mut self.rng).copied() else {
            log::debug!("no free cell left for a collectible");
            return None;
        };
        let class = self.rewards.draw(&mut self.rng);
        Some(Collectible {
            cell,
            class,
            reward: self.rewards.reward(class),
        })
    }

    fn game_over<S>(&mut self, scheduler: &mut S, out_events: &mut Vec<SnakeEvent>)
    where
        S: Scheduler + ?Sized,
    {
        self.disarm(scheduler);
        self.state = SimulationState::GameOver;
        out_events.push(SnakeEvent::GameOver {
            final_score: self.score.current(),
            body: self.body.iter().copied().collect(),
        });
        log::info!(
            "snake game over with score {} at length {}",
            self.score.current(),
            self.body.len()
        );
    }

    fn travel(&self) -> Option<Direction> {
        let head = self.body.front().copied()?;
        let neck = self.body.get(1).copied()?;
        Direction::between(neck, head)
    }

    fn arm<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        let interval = scheduler.schedule_every(self.tick_interval);
        self.state = SimulationState::Running {
            interval: Some(interval),
        };
    }

    fn disarm<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        if let SimulationState::Running {
            interval: Some(interval),
        } = self.state
        {
            scheduler.cancel(interval);
            self.state = SimulationState::Running { interval: None };
        }
    }

    fn reject(&self, reason: RejectionReason, out_events: &mut Vec<SnakeEvent>) {
        log::debug!("snake input rejected: {reason:?}");
        out_events.push(SnakeEvent::InputRejected { reason });
    }
}
