#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded grid worlds and puzzle levels for Grid Arcade.
//!
//! A [`GridWorld`] is an immutable description of the playable space and its
//! static obstacles. A [`Level`] pairs a world with the start and goal markers
//! used by the instruction puzzle and enforces that the markers are distinct,
//! in bounds, and never covered by an obstacle.

mod navigation;

use std::collections::BTreeSet;

use grid_arcade_core::{CellCoord, GridSize};
use thiserror::Error;

/// Errors raised while constructing worlds and levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The grid was requested with a zero width or height.
    #[error("grid dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A start or goal marker lies outside the grid.
    #[error("marker {cell} lies outside the grid")]
    MarkerOutOfBounds {
        /// Offending marker cell.
        cell: CellCoord,
    },
    /// The start and goal markers share a cell.
    #[error("start and goal both occupy {cell}")]
    MarkersCoincide {
        /// Shared cell.
        cell: CellCoord,
    },
    /// An obstacle covers a start or goal marker.
    #[error("obstacle covers marker at {cell}")]
    MarkerOnObstacle {
        /// Covered marker cell.
        cell: CellCoord,
    },
}

/// Bounded coordinate space holding a set of static obstacles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWorld {
    size: GridSize,
    obstacles: BTreeSet<CellCoord>,
}

impl GridWorld {
    /// Creates an empty world with the provided dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        Self::with_obstacles(width, height, std::iter::empty())
    }

    /// Creates a world with the provided dimensions and obstacle cells.
    ///
    /// Duplicate obstacles collapse into a single entry. Obstacles outside the
    /// grid are kept verbatim; they can never be reached so they never block.
    pub fn with_obstacles<I>(width: u32, height: u32, obstacles: I) -> Result<Self, WorldError>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }

        Ok(Self {
            size: GridSize::new(width, height),
            obstacles: obstacles.into_iter().collect(),
        })
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.width()
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.height()
    }

    /// Reports whether the cell lies within `0..width` and `0..height`.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        u32::try_from(cell.column()).is_ok_and(|column| column < self.width())
            && u32::try_from(cell.row()).is_ok_and(|row| row < self.height())
    }

    /// Reports whether the cell holds a static obstacle.
    #[must_use]
    pub fn is_obstacle(&self, cell: CellCoord) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Reports whether the cell belongs to the caller-supplied occupant set.
    #[must_use]
    pub fn is_occupied<'a, I>(&self, cell: CellCoord, occupants: I) -> bool
    where
        I: IntoIterator<Item = &'a CellCoord>,
    {
        occupants.into_iter().any(|occupant| *occupant == cell)
    }

    /// Reports whether the cell cannot be entered: outside the grid or an obstacle.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        !self.in_bounds(cell) || self.is_obstacle(cell)
    }

    /// Iterator over the obstacle cells in ascending order.
    pub fn obstacles(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.obstacles.iter().copied()
    }

    /// Number of distinct obstacles.
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let width = i32::try_from(self.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height()).unwrap_or(i32::MAX);
        (0..height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }
}

/// A puzzle board: a world plus its start and goal markers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    world: GridWorld,
    start: CellCoord,
    goal: CellCoord,
}

impl Level {
    /// Validates and assembles a level.
    pub fn new(world: GridWorld, start: CellCoord, goal: CellCoord) -> Result<Self, WorldError> {
        for cell in [start, goal] {
            if !world.in_bounds(cell) {
                return Err(WorldError::MarkerOutOfBounds { cell });
            }
            if world.is_obstacle(cell) {
                return Err(WorldError::MarkerOnObstacle { cell });
            }
        }
        if start == goal {
            return Err(WorldError::MarkersCoincide { cell: start });
        }

        Ok(Self { world, start, goal })
    }

    /// Underlying grid world.
    #[must_use]
    pub const fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Start marker.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Goal marker.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }
}

/// Query functions that provide read-only derived views of worlds and levels.
pub mod query {
    use std::collections::HashSet;

    use grid_arcade_core::{CellCoord, Direction};

    use super::{navigation::NavigationField, GridWorld, Level};

    /// Enumerates in-bounds, obstacle-free cells not present in `occupants`.
    #[must_use]
    pub fn free_cells(world: &GridWorld, occupants: &[CellCoord]) -> Vec<CellCoord> {
        let occupied: HashSet<CellCoord> = occupants.iter().copied().collect();
        world
            .cells()
            .filter(|cell| !world.is_obstacle(*cell) && !occupied.contains(cell))
            .collect()
    }

    /// Computes a shortest instruction program leading from start to goal.
    ///
    /// Returns `None` when the goal is walled off; generated levels carry no
    /// solvability guarantee.
    #[must_use]
    pub fn shortest_program(level: &Level) -> Option<Vec<Direction>> {
        let world = level.world();
        let mut field = NavigationField::default();
        field.rebuild_with(world.width(), world.height(), level.goal(), |cell| {
            world.is_blocked(cell)
        });

        let mut program = Vec::new();
        let mut current = level.start();
        let mut remaining = field.distance(current)?;
        while remaining > 0 {
            let (direction, next) = Direction::ALL
                .into_iter()
                .map(|direction| (direction, current.step(direction)))
                .find(|(_, next)| field.distance(*next) == Some(remaining - 1))?;
            program.push(direction);
            current = next;
            remaining -= 1;
        }

        Some(program)
    }
}
