use maze_shared::protocol::{CellWire, WallsWire};

/// The four canonical wall directions of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Column/row offset of the adjacent cell in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Top => (0, -1),
            Direction::Right => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

/// Four independent wall flags. A passage between two adjacent cells
/// exists only when the matching flag is cleared on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    pub fn solid() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }

    pub fn has(&self, dir: Direction) -> bool {
        match dir {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    fn clear(&mut self, dir: Direction) {
        match dir {
            Direction::Top => self.top = false,
            Direction::Right => self.right = false,
            Direction::Bottom => self.bottom = false,
            Direction::Left => self.left = false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
    pub walls: Walls,
    /// Only meaningful while the generator is carving.
    pub(crate) visited: bool,
}

/// Column-major grid of cells (`cells[col][row]`), all walls solid
/// until the maze generator carves passages.
#[derive(Debug, Clone)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cells = (0..cols)
            .map(|col| {
                (0..rows)
                    .map(|row| Cell {
                        col,
                        row,
                        walls: Walls::solid(),
                        visited: false,
                    })
                    .collect()
            })
            .collect();
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Out-of-range coordinates yield `None`, never a fault.
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.cells.get(col)?.get(row)
    }

    pub(crate) fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)?.get_mut(row)
    }

    /// Coordinates of the grid-adjacent cell in `dir`, or `None` off-grid.
    pub fn neighbor(&self, col: usize, row: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dc, dr) = dir.offset();
        let ncol = col.checked_add_signed(dc)?;
        let nrow = row.checked_add_signed(dr)?;
        if ncol < self.cols && nrow < self.rows {
            Some((ncol, nrow))
        } else {
            None
        }
    }

    /// Whether the cell at (col, row) still has its wall in `dir`.
    /// Out-of-range reads as "no wall".
    pub fn wall(&self, col: usize, row: usize, dir: Direction) -> bool {
        self.cell(col, row).is_some_and(|c| c.walls.has(dir))
    }

    /// Clear the matching wall flags on (col, row) and its neighbor in
    /// `dir`. Removal is always symmetric; a missing neighbor is a no-op.
    pub fn remove_wall_pair(&mut self, col: usize, row: usize, dir: Direction) -> bool {
        let Some((ncol, nrow)) = self.neighbor(col, row, dir) else {
            return false;
        };
        if let Some(cell) = self.cell_mut(col, row) {
            cell.walls.clear(dir);
        }
        if let Some(neighbor) = self.cell_mut(ncol, nrow) {
            neighbor.walls.clear(dir.opposite());
        }
        true
    }

    /// Full wall-state snapshot for the `grid` broadcast.
    pub fn to_wire(&self) -> Vec<Vec<CellWire>> {
        self.cells
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|cell| CellWire {
                        col: cell.col as u32,
                        row: cell.row as u32,
                        walls: WallsWire {
                            top: cell.walls.top,
                            right: cell.walls.right,
                            bottom: cell.walls.bottom,
                            left: cell.walls.left,
                        },
                    })
                    .collect()
            })
            .collect()
    }
}
