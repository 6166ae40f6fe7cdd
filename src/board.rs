//! Go board with capture resolution.
//!
//! [`Board`] is a value-like grid: cloning produces an independent board,
//! and nothing in this crate mutates a board it does not own. Moves go
//! through [`Board::play`], which resolves captures and rejects occupied
//! or suicidal plays; setup instructions go through [`Board::set`], which
//! bypasses play rules entirely.

use std::fmt;

use thiserror::Error;

/// Stone color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Stable index for per-color tallies (Black = 0, White = 1).
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

/// A board intersection as `(row, col)`, zero-based.
pub type Point = (usize, usize);

/// Why a play was rejected. The board is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("point ({0}, {1}) is outside the board")]
    OutOfBounds(usize, usize),
    #[error("point ({0}, {1}) is already occupied")]
    Occupied(usize, usize),
    #[error("play at ({0}, {1}) would be suicide")]
    Suicide(usize, usize),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells[self.idx(row, col)]
    }

    /// Place or clear a stone directly, without capture resolution.
    ///
    /// This is the setup-stone path: occupied points are overwritten and
    /// no legality rules apply. Out-of-range points are ignored.
    pub fn set(&mut self, (row, col): Point, stone: Option<Color>) {
        if row >= self.size || col >= self.size {
            return;
        }
        let i = self.idx(row, col);
        self.cells[i] = stone;
    }

    /// Every occupied intersection with its color, in row-major order.
    pub fn occupied_points(&self) -> Vec<(Point, Color)> {
        let mut points = Vec::new();
        for row in 0..self.size {
            for col in 0..self.size {
                if let Some(color) = self.cells[self.idx(row, col)] {
                    points.push(((row, col), color));
                }
            }
        }
        points
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Orthogonal neighbors of a point that lie on the board.
    fn neighbors(&self, (row, col): Point) -> impl Iterator<Item = Point> + '_ {
        const STEPS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        STEPS.into_iter().filter_map(move |(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < self.size && c < self.size).then_some((r, c))
        })
    }

    /// Read the string containing `(row, col)` in one pass: the worklist
    /// doubles as the stone list, every cell is claimed when first reached,
    /// and empty neighbors are tallied as liberties on the spot. `None` on
    /// an empty point.
    fn string_at(&self, row: usize, col: usize) -> Option<GoString> {
        let color = self.get(row, col)?;
        let mut claimed = vec![false; self.size * self.size];
        claimed[self.idx(row, col)] = true;
        let mut string = GoString {
            stones: vec![(row, col)],
            liberties: 0,
        };
        let mut next = 0;
        while next < string.stones.len() {
            let stone = string.stones[next];
            next += 1;
            for (nr, nc) in self.neighbors(stone) {
                let i = self.idx(nr, nc);
                if claimed[i] {
                    continue;
                }
                claimed[i] = true;
                match self.get(nr, nc) {
                    Some(c) if c == color => string.stones.push((nr, nc)),
                    None => string.liberties += 1,
                    Some(_) => {}
                }
            }
        }
        Some(string)
    }

    /// Play a stone with normal rules: the point must be empty, adjacent
    /// opponent strings left without liberties are removed, and a play
    /// whose own string ends up with no liberties is rejected as suicide.
    ///
    /// Returns the number of captured opponent stones. On `Err` the board
    /// is exactly as it was before the call.
    pub fn play(&mut self, row: usize, col: usize, color: Color) -> Result<u32, PlayError> {
        if row >= self.size || col >= self.size {
            return Err(PlayError::OutOfBounds(row, col));
        }
        if self.get(row, col).is_some() {
            return Err(PlayError::Occupied(row, col));
        }
        let idx = self.idx(row, col);
        self.cells[idx] = Some(color);

        let opp = color.opponent();
        let mut captured = 0u32;
        let adjacent: Vec<Point> = self.neighbors((row, col)).collect();
        for (nr, nc) in adjacent {
            if self.get(nr, nc) != Some(opp) {
                continue;
            }
            // a dead string comes off the board immediately, so a string
            // touching the new stone on two sides is only counted once
            if let Some(string) = self.string_at(nr, nc) {
                if string.liberties == 0 {
                    captured += string.stones.len() as u32;
                    for &stone in &string.stones {
                        self.set(stone, None);
                    }
                }
            }
        }

        if captured == 0 {
            let suffocated = self
                .string_at(row, col)
                .is_some_and(|string| string.liberties == 0);
            if suffocated {
                // undo the placement; suicide is rejected, not resolved
                self.cells[idx] = None;
                return Err(PlayError::Suicide(row, col));
            }
        }
        Ok(captured)
    }
}

/// A connected string of same-colored stones with its liberty count.
struct GoString {
    stones: Vec<Point>,
    liberties: usize,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = match self.get(row, col) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board({}x{})", self.size, self.size)?;
        fmt::Display::fmt(self, f)
    }
}
