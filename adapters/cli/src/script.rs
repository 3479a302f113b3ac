//! Parsing of textual instruction and move scripts.

use anyhow::{bail, Result};
use grid_arcade_core::Direction;

fn letter(symbol: char) -> Option<Direction> {
    match symbol.to_ascii_uppercase() {
        'U' => Some(Direction::Up),
        'D' => Some(Direction::Down),
        'L' => Some(Direction::Left),
        'R' => Some(Direction::Right),
        _ => None,
    }
}

fn is_separator(symbol: char) -> bool {
    symbol.is_whitespace() || symbol == ','
}

/// Parses a puzzle program such as `RRDD` or `r, r, d`.
pub(crate) fn parse_program(script: &str) -> Result<Vec<Direction>> {
    let mut program = Vec::new();
    for (position, symbol) in script.chars().enumerate() {
        if is_separator(symbol) {
            continue;
        }
        let Some(direction) = letter(symbol) else {
            bail!("unknown instruction `{symbol}` at position {position} (expected U, D, L or R)");
        };
        program.push(direction);
    }
    Ok(program)
}

/// Parses a snake move script; each symbol is one tick and `.` keeps the heading.
pub(crate) fn parse_moves(script: &str) -> Result<Vec<Option<Direction>>> {
    let mut moves = Vec::new();
    for (position, symbol) in script.chars().enumerate() {
        if is_separator(symbol) {
            continue;
        }
        if symbol == '.' {
            moves.push(None);
            continue;
        }
        let Some(direction) = letter(symbol) else {
            bail!("unknown move `{symbol}` at position {position} (expected U, D, L, R or .)");
        };
        moves.push(Some(direction));
    }
    Ok(moves)
}
