//! Perfect-maze generation: randomized iterative depth-first carving
//! ("recursive backtracker") over a [`Grid`].

use crate::grid::{Direction, Grid};
use rand::seq::SliceRandom;
use rand::Rng;

/// Carving always starts from the same corner cell.
pub const ENTRY: (usize, usize) = (0, 0);

/// Build a freshly carved maze. The result is a spanning tree over the
/// grid graph: every cell reachable from every other, exactly
/// `cols * rows - 1` wall pairs removed, no cycles.
pub fn generate(cols: usize, rows: usize, rng: &mut impl Rng) -> Grid {
    let mut grid = Grid::new(cols, rows);
    carve(&mut grid, rng);
    grid
}

fn carve(grid: &mut Grid, rng: &mut impl Rng) {
    let (entry_col, entry_row) = ENTRY;
    let Some(entry) = grid.cell_mut(entry_col, entry_row) else {
        return;
    };
    entry.visited = true;

    let mut stack = vec![(entry_col, entry_row)];
    while let Some(&(col, row)) = stack.last() {
        let unvisited: Vec<(Direction, (usize, usize))> = Direction::ALL
            .into_iter()
            .filter_map(|dir| {
                let (ncol, nrow) = grid.neighbor(col, row, dir)?;
                let cell = grid.cell(ncol, nrow)?;
                (!cell.visited).then_some((dir, (ncol, nrow)))
            })
            .collect();

        match unvisited.choose(rng) {
            Some(&(dir, (ncol, nrow))) => {
                grid.remove_wall_pair(col, row, dir);
                if let Some(next) = grid.cell_mut(ncol, nrow) {
                    next.visited = true;
                }
                stack.push((ncol, nrow));
            }
            None => {
                stack.pop();
            }
        }
    }
}
