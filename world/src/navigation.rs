//! Breadth-first distance field used to answer solvability queries.

use std::collections::VecDeque;

use grid_arcade_core::{CellCoord, Direction};

/// Dense Manhattan-step distance grid seeded from the goal cell.
///
/// Distances default to `u32::MAX` for unreachable or blocked cells so callers
/// can distinguish walls from traversable cells.
#[derive(Clone, Debug, Default)]
pub(crate) struct NavigationField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
}

impl NavigationField {
    /// Rebuilds the distances using a reverse breadth-first search from `goal`.
    pub(crate) fn rebuild_with<F>(&mut self, width: u32, height: u32, goal: CellCoord, is_blocked: F)
    where
        F: Fn(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;
        if self.distances.len() != cell_count {
            self.distances = vec![u32::MAX; cell_count];
        } else {
            self.distances.fill(u32::MAX);
        }

        let Some(goal_index) = self.index(goal) else {
            return;
        };
        if is_blocked(goal) {
            return;
        }

        let mut queue = VecDeque::new();
        self.distances[goal_index] = 0;
        queue.push_back(goal);

        while let Some(cell) = queue.pop_front() {
            let Some(current) = self.distance(cell) else {
                continue;
            };
            for direction in Direction::ALL {
                let neighbor = cell.step(direction);
                let Some(index) = self.index(neighbor) else {
                    continue;
                };
                if self.distances[index] != u32::MAX || is_blocked(neighbor) {
                    continue;
                }
                self.distances[index] = current + 1;
                queue.push_back(neighbor);
            }
        }
    }

    /// Steps required to reach the goal from `cell`, if reachable.
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u32> {
        let index = self.index(cell)?;
        self.distances
            .get(index)
            .copied()
            .filter(|distance| *distance != u32::MAX)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_grow_with_manhattan_steps_on_open_grid() {
        let mut field = NavigationField::default();
        field.rebuild_with(4, 3, CellCoord::new(0, 0), |_| false);
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(0));
        assert_eq!(field.distance(CellCoord::new(3, 2)), Some(5));
        assert_eq!(field.distance(CellCoord::new(4, 0)), None);
    }

    #[test]
    fn blocked_goal_leaves_field_empty() {
        let mut field = NavigationField::default();
        field.rebuild_with(3, 3, CellCoord::new(1, 1), |cell| cell == CellCoord::new(1, 1));
        assert_eq!(field.distance(CellCoord::new(1, 1)), None);
        assert_eq!(field.distance(CellCoord::new(0, 0)), None);
    }
}
