//! The `n×n` sliding tile puzzle. Tiles are numbered `1..n²` and the blank
//! is `0`. The goal has the tiles in row-major order with the blank last.

use crate::space::SearchSpace;
use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// Boards wider than this have more than 255 tiles.
pub const MAX_WIDTH: usize = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlidingTilesError {
    #[error("{0} tiles do not form a square board of width 2 to {MAX_WIDTH}")]
    NotSquare(usize),
    #[error("Expected each of 0 to {max} exactly once, got {tiles:?}")]
    InvalidTiles { tiles: Vec<u8>, max: usize },
    #[error("This board cannot be brought to the goal")]
    Unsolvable,
}

/// The direction the blank moves in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slide {
    Up,
    Down,
    Left,
    Right,
}

impl Slide {
    pub const ALL: [Slide; 4] = [Slide::Up, Slide::Down, Slide::Left, Slide::Right];

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Slide::Up => Slide::Down,
            Slide::Down => Slide::Up,
            Slide::Left => Slide::Right,
            Slide::Right => Slide::Left,
        }
    }
}

impl fmt::Display for Slide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slide::Up => "U",
            Slide::Down => "D",
            Slide::Left => "L",
            Slide::Right => "R",
        })
    }
}

fn check_width(width: usize, len: usize) -> Result<(), SlidingTilesError> {
    if width * width != len || !(2..=MAX_WIDTH).contains(&width) {
        return Err(SlidingTilesError::NotSquare(len));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    tiles: Vec<u8>,
    blank: usize,
}

impl Board {
    /// # Errors
    ///
    /// If `tiles` is not a square number of entries or is not a permutation
    /// of `0..tiles.len()`.
    pub fn new(tiles: Vec<u8>) -> Result<Self, SlidingTilesError> {
        let width = tiles.len().isqrt();
        check_width(width, tiles.len())?;
        let mut seen = vec![false; tiles.len()];
        let distinct = tiles.iter().all(|&tile| match seen.get_mut(usize::from(tile)) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        });
        match tiles.iter().position(|&tile| tile == 0) {
            Some(blank) if distinct => Ok(Self {
                width,
                tiles,
                blank,
            }),
            _ => Err(SlidingTilesError::InvalidTiles {
                max: tiles.len() - 1,
                tiles,
            }),
        }
    }

    /// The solved board of the given width.
    ///
    /// # Errors
    ///
    /// If `width` is not in `2..=MAX_WIDTH`.
    pub fn goal(width: usize) -> Result<Self, SlidingTilesError> {
        let len = width * width;
        check_width(width, len)?;
        // Every tile is below `MAX_WIDTH²`
        #[allow(clippy::cast_possible_truncation)]
        let tiles = (1..len).chain([0]).map(|tile| tile as u8).collect();
        Ok(Self {
            width,
            tiles,
            blank: len - 1,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    #[must_use]
    pub fn is_goal(&self) -> bool {
        self.blank == self.tiles.len() - 1
            && self
                .tiles
                .iter()
                .take(self.blank)
                .zip(1..)
                .all(|(&tile, expected)| tile == expected)
    }

    /// The number of pairs of tiles, ignoring the blank, that are out of
    /// order in row-major reading.
    #[must_use]
    pub fn inversions(&self) -> usize {
        self.tiles
            .iter()
            .filter(|&&tile| tile != 0)
            .tuple_combinations()
            .filter(|(a, b)| a > b)
            .count()
    }

    /// Whether the goal is reachable. With an odd width every slide keeps the
    /// inversion parity. With an even width vertical slides flip it and
    /// change the blank's row, so their sum's parity is what is kept.
    #[must_use]
    pub fn is_solvable(&self) -> bool {
        let inversions = self.inversions();
        if self.width % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + self.blank / self.width) % 2 == 1
        }
    }

    /// The sum over the tiles of their horizontal and vertical distances to
    /// their goal positions.
    #[must_use]
    pub fn manhattan(&self) -> u32 {
        self.tiles
            .iter()
            .enumerate()
            .filter(|&(_, &tile)| tile != 0)
            .map(|(position, &tile)| {
                let home = usize::from(tile) - 1;
                let rows = (position / self.width).abs_diff(home / self.width);
                let cols = (position % self.width).abs_diff(home % self.width);
                rows + cols
            })
            .sum::<usize>()
            .try_into()
            .unwrap_or(u32::MAX)
    }

    /// The board after moving the blank, or `None` if it would leave the
    /// board.
    #[must_use]
    pub fn slide(&self, slide: Slide) -> Option<Self> {
        let (row, col) = (self.blank / self.width, self.blank % self.width);
        let blank = match slide {
            Slide::Up if row > 0 => self.blank - self.width,
            Slide::Down if row + 1 < self.width => self.blank + self.width,
            Slide::Left if col > 0 => self.blank - 1,
            Slide::Right if col + 1 < self.width => self.blank + 1,
            _ => return None,
        };
        let mut tiles = self.tiles.clone();
        tiles.swap(self.blank, blank);
        Some(Self {
            width: self.width,
            tiles,
            blank,
        })
    }

    /// A uniformly shuffled board, with two tiles swapped if the shuffle came
    /// out unsolvable.
    ///
    /// # Errors
    ///
    /// If `width` is not in `2..=MAX_WIDTH`.
    pub fn random_solvable(
        width: usize,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, SlidingTilesError> {
        let mut board = Self::goal(width)?;
        rng.shuffle(&mut board.tiles);
        if let Some(blank) = board.tiles.iter().position(|&tile| tile == 0) {
            board.blank = blank;
        }
        if !board.is_solvable() {
            // Swapping two tiles flips the inversion parity
            let (a, b) = if board.blank < 2 {
                (2, 3)
            } else {
                (0, 1)
            };
            board.tiles.swap(a, b);
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell_width = (self.tiles.len() - 1).to_string().len();
        for row in self.tiles.chunks(self.width) {
            let line = row
                .iter()
                .map(|&tile| match tile {
                    0 => format!("{:>cell_width$}", "."),
                    tile => format!("{tile:>cell_width$}"),
                })
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SlidingTiles {
    start: Board,
}

impl SlidingTiles {
    /// # Errors
    ///
    /// If `start` cannot reach the goal.
    pub fn new(start: Board) -> Result<Self, SlidingTilesError> {
        if !start.is_solvable() {
            return Err(SlidingTilesError::Unsolvable);
        }
        Ok(Self { start })
    }

    /// Applies `slides` to the start board, or `None` if one of them moves
    /// the blank off the board.
    #[must_use]
    pub fn play(&self, slides: &[Slide]) -> Option<Board> {
        slides
            .iter()
            .try_fold(self.start.clone(), |board, &slide| board.slide(slide))
    }
}

impl SearchSpace for SlidingTiles {
    type State = Board;
    type Action = Slide;

    fn start(&self) -> Board {
        self.start.clone()
    }

    fn successors(&self, board: &Board, history: &[Slide]) -> Vec<(Slide, Board)> {
        let undo = history.last().copied().map(Slide::opposite);
        Slide::ALL
            .into_iter()
            .filter(|&slide| Some(slide) != undo)
            .filter_map(|slide| Some((slide, board.slide(slide)?)))
            .collect()
    }

    fn is_goal(&self, board: &Board) -> bool {
        board.is_goal()
    }

    fn heuristic(&self, board: &Board) -> u32 {
        board.manhattan()
    }
}
