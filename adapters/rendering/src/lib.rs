#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Grid Arcade adapters.
//!
//! Simulators hand out owned snapshots; this crate turns them into a
//! backend-agnostic [`Frame`] of glyphs plus a few status lines. Backends only
//! ever see frames, never simulator state.

use anyhow::{Context, Result as AnyResult};
use grid_arcade_core::{
    CellCoord, Direction, GridSize, PuzzlePhase, PuzzleSnapshot, RewardClass, SnakePhase,
    SnakeSnapshot,
};
use std::{error::Error, fmt, io::Write};

/// Visual classification of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// Nothing occupies the cell.
    #[default]
    Empty,
    /// Static obstacle.
    Obstacle,
    /// Puzzle start marker.
    Start,
    /// Puzzle goal marker.
    Goal,
    /// Cell already visited by the replayed path.
    Trail,
    /// Current position of the puzzle marker.
    Marker,
    /// Snake head.
    SnakeHead,
    /// Snake body segment behind the head.
    SnakeBody,
    /// Regular apple.
    Apple,
    /// Golden apple.
    GoldenApple,
}

impl Glyph {
    /// Character used by text backends.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Obstacle => '#',
            Self::Start => 'S',
            Self::Goal => 'G',
            Self::Trail => '*',
            Self::Marker => '@',
            Self::SnakeHead => 'O',
            Self::SnakeBody => 'o',
            Self::Apple => 'a',
            Self::GoldenApple => '$',
        }
    }
}

/// Single-letter spelling of an instruction.
#[must_use]
pub const fn instruction_letter(direction: Direction) -> char {
    match direction {
        Direction::Up => 'U',
        Direction::Down => 'D',
        Direction::Left => 'L',
        Direction::Right => 'R',
    }
}

/// Grid of glyphs with trailing status lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    cells: Vec<Glyph>,
    status: Vec<String>,
}

impl Frame {
    /// Creates an empty frame covering `size`.
    pub fn new(size: GridSize) -> Result<Self, RenderingError> {
        if size.width() == 0 || size.height() == 0 {
            return Err(RenderingError::EmptyFrame {
                width: size.width(),
                height: size.height(),
            });
        }
        let len = size.width() as usize * size.height() as usize;
        Ok(Self {
            width: size.width(),
            height: size.height(),
            cells: vec![Glyph::Empty; len],
            status: Vec::new(),
        })
    }

    /// Draws the puzzle board, path and status.
    pub fn from_puzzle(snapshot: &PuzzleSnapshot) -> Result<Self, RenderingError> {
        let mut frame = Self::new(snapshot.size)?;
        for obstacle in &snapshot.obstacles {
            frame.paint(*obstacle, Glyph::Obstacle);
        }
        for cell in &snapshot.path {
            frame.paint(*cell, Glyph::Trail);
        }
        frame.paint(snapshot.start, Glyph::Start);
        frame.paint(snapshot.goal, Glyph::Goal);
        if let Some(current) = snapshot.path.last() {
            frame.paint(*current, Glyph::Marker);
        }

        let phase = match snapshot.phase {
            PuzzlePhase::Idle => "ready".to_owned(),
            PuzzlePhase::Executing => "running".to_owned(),
            PuzzlePhase::Failure(reason) => format!("failed: {reason}"),
        };
        frame.push_status(format!(
            "round {}  score {}  {}  {phase}",
            snapshot.round, snapshot.score, snapshot.difficulty
        ));
        let program: String = snapshot
            .program
            .iter()
            .copied()
            .map(instruction_letter)
            .collect();
        frame.push_status(format!("program [{program}]"));
        Ok(frame)
    }

    /// Draws the snake board and status.
    pub fn from_snake(snapshot: &SnakeSnapshot) -> Result<Self, RenderingError> {
        let mut frame = Self::new(snapshot.size)?;
        if let Some(collectible) = snapshot.collectible {
            let glyph = match collectible.class {
                RewardClass::Regular => Glyph::Apple,
                RewardClass::Golden => Glyph::GoldenApple,
            };
            frame.paint(collectible.cell, glyph);
        }
        for (index, cell) in snapshot.body.iter().enumerate() {
            let glyph = if index == 0 {
                Glyph::SnakeHead
            } else {
                Glyph::SnakeBody
            };
            frame.paint(*cell, glyph);
        }

        let phase = match snapshot.phase {
            SnakePhase::Running => "running",
            SnakePhase::GameOver => "game over",
        };
        frame.push_status(format!(
            "score {}  level {}  length {}  {phase}",
            snapshot.score,
            snapshot.level,
            snapshot.body.len()
        ));
        Ok(frame)
    }

    /// Sets the glyph of an in-bounds cell; cells outside the frame are ignored.
    pub fn paint(&mut self, cell: CellCoord, glyph: Glyph) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = glyph;
        }
    }

    /// Glyph drawn at `cell`, if the cell lies within the frame.
    #[must_use]
    pub fn glyph(&self, cell: CellCoord) -> Option<Glyph> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Appends a status line shown below the grid.
    pub fn push_status(&mut self, line: impl Into<String>) {
        self.status.push(line.into());
    }

    /// Status lines in insertion order.
    #[must_use]
    pub fn status(&self) -> &[String] {
        &self.status
    }

    /// Grid rows rendered as glyph symbols, top row first.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|glyph| glyph.symbol()).collect())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + column as usize)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        for line in &self.status {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Titled frame handed to a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Heading printed or shown above the frame.
    pub title: String,
    /// Frame content that should be displayed.
    pub frame: Frame,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, frame: Frame) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            frame,
        }
    }
}

/// Rendering backend capable of presenting Grid Arcade frames.
pub trait RenderingBackend {
    /// Displays a single presentation.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}

/// Backend writing frames as plain text to any writer.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    presented: usize,
}

impl<W: Write> TextBackend<W> {
    /// Wraps a writer such as standard output or a byte buffer.
    pub fn new(out: W) -> Self {
        Self { out, presented: 0 }
    }

    /// Number of presentations written so far.
    #[must_use]
    pub const fn presented(&self) -> usize {
        self.presented
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()> {
        write!(self.out, "== {} ==\n{}", presentation.title, presentation.frame)
            .and_then(|()| self.out.flush())
            .with_context(|| format!("failed to write frame `{}`", presentation.title))?;
        self.presented += 1;
        Ok(())
    }
}

/// Errors that can occur when constructing frames.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// A frame needs at least one row and one column.
    EmptyFrame {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFrame { width, height } => {
                write!(f, "frame must not be empty (received {width}x{height})")
            }
        }
    }
}

impl Error for RenderingError {}
