#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural level generation for the instruction puzzle.
//!
//! Each round places the start marker on the left boundary column, the goal
//! on the right boundary column, and scatters a round-scaled number of unique
//! obstacles across the remaining cells. Levels are not guaranteed to be
//! solvable.

use grid_arcade_core::{CellCoord, Difficulty, GridSize};
use grid_arcade_world::{GridWorld, Level, WorldError};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Errors raised when a layout cannot host a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The grid leaves no interior row or no room for distinct markers.
    #[error("grid {width}x{height} is too small for a level (need at least 2x3)")]
    GridTooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The world rejected the generated configuration.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Validated grid size and obstacle base for a family of levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    size: GridSize,
    obstacle_base: u32,
}

impl LevelLayout {
    /// Validates a custom layout.
    pub fn new(size: GridSize, obstacle_base: u32) -> Result<Self, GenerationError> {
        if size.width() < 2 || size.height() < 3 {
            return Err(GenerationError::GridTooSmall {
                width: size.width(),
                height: size.height(),
            });
        }
        Ok(Self {
            size,
            obstacle_base,
        })
    }

    /// Layout used by the built-in difficulty presets.
    #[must_use]
    pub const fn preset(difficulty: Difficulty) -> Self {
        Self {
            size: difficulty.puzzle_size(),
            obstacle_base: difficulty.obstacle_base(),
        }
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Obstacles placed before round scaling.
    #[must_use]
    pub const fn obstacle_base(&self) -> u32 {
        self.obstacle_base
    }

    /// Obstacles placed on the given round: `min(base + round, width)`.
    #[must_use]
    pub fn obstacle_count(&self, round: u32) -> u32 {
        self.obstacle_base
            .saturating_add(round)
            .min(self.size.width())
    }
}

/// Seeded generator producing one level per round.
#[derive(Debug)]
pub struct LevelGenerator<R = ChaCha8Rng> {
    rng: R,
}

impl LevelGenerator<ChaCha8Rng> {
    /// Creates a reproducible generator from a numeric seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a generator seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> LevelGenerator<R> {
    /// Wraps an arbitrary random source.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Produces the level for `round` using a built-in difficulty preset.
    pub fn generate(&mut self, difficulty: Difficulty, round: u32) -> Result<Level, GenerationError> {
        self.generate_with(LevelLayout::preset(difficulty), round)
    }

    /// Produces the level for `round` using an explicit layout.
    pub fn generate_with(&mut self, layout: LevelLayout, round: u32) -> Result<Level, GenerationError> {
        let layout = LevelLayout::new(layout.size(), layout.obstacle_base())?;
        let width = layout.size().width();
        let height = layout.size().height();
        let world = GridWorld::new(width, height)?;

        let last_column = i32::try_from(width - 1).unwrap_or(i32::MAX);
        let last_interior_row = i32::try_from(height - 2).unwrap_or(i32::MAX);
        let start = CellCoord::new(0, self.rng.gen_range(1..=last_interior_row));
        let goal = CellCoord::new(last_column, self.rng.gen_range(1..=last_interior_row));

        let candidates: Vec<CellCoord> = world
            .cells()
            .filter(|cell| *cell != start && *cell != goal)
            .collect();
        let count = usize::try_from(layout.obstacle_count(round)).unwrap_or(usize::MAX);
        let obstacles: Vec<CellCoord> = candidates
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();

        log::debug!(
            "generated {}x{} level for round {round}: start {start}, goal {goal}, {} obstacles",
            width,
            height,
            obstacles.len()
        );

        let world = GridWorld::with_obstacles(width, height, obstacles)?;
        Ok(Level::new(world, start, goal)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_count_is_capped_by_width() {
        let layout = LevelLayout::preset(Difficulty::Easy);
        assert_eq!(layout.obstacle_count(1), 3);
        assert_eq!(layout.obstacle_count(8), 10);
        assert_eq!(layout.obstacle_count(500), 10);
    }

    #[test]
    fn undersized_layouts_are_rejected() {
        assert_eq!(
            LevelLayout::new(GridSize::new(1, 10), 2),
            Err(GenerationError::GridTooSmall {
                width: 1,
                height: 10
            })
        );
        assert!(LevelLayout::new(GridSize::new(10, 2), 2).is_err());
        assert!(LevelLayout::new(GridSize::new(2, 3), 0).is_ok());
    }

    #[test]
    fn same_seed_produces_same_level() {
        let mut first = LevelGenerator::from_seed(7);
        let mut second = LevelGenerator::from_seed(7);
        for round in 1..5 {
            assert_eq!(
                first.generate(Difficulty::Medium, round),
                second.generate(Difficulty::Medium, round)
            );
        }
    }
}
