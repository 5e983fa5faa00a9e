//! Shortest paths on a bounded 4-connected grid with blocked cells.

use crate::space::SearchSpace;
use fxhash::FxHashSet;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A step to a neighbouring cell. `y` grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Up, Step::Down, Step::Left, Step::Right];

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Step::Up => Step::Down,
            Step::Down => Step::Up,
            Step::Left => Step::Right,
            Step::Right => Step::Left,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Up => "U",
            Step::Down => "D",
            Step::Left => "L",
            Step::Right => "R",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GridHeuristic {
    #[default]
    Manhattan,
    /// Straight line distance rounded down.
    Euclidean,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("A grid must have at least one cell, got {width}x{height}")]
    Empty { width: usize, height: usize },
    #[error("{0} lies outside of the grid")]
    OutOfBounds(Cell),
    #[error("{0} is blocked by an obstacle")]
    Blocked(Cell),
    #[error("Cannot place {requested} obstacles, only {available} cells are free")]
    TooManyObstacles { requested: usize, available: usize },
}

#[derive(Clone, Debug)]
pub struct GridSpace {
    width: usize,
    height: usize,
    obstacles: FxHashSet<Cell>,
    start: Cell,
    goal: Cell,
    heuristic: GridHeuristic,
}

impl GridSpace {
    /// # Errors
    ///
    /// If the grid has no cells, or if an obstacle, the start or the goal
    /// lies outside of it, or if the start or the goal is blocked.
    pub fn new(
        width: usize,
        height: usize,
        obstacles: impl IntoIterator<Item = Cell>,
        start: Cell,
        goal: Cell,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty { width, height });
        }
        let space = Self {
            width,
            height,
            obstacles: obstacles.into_iter().collect(),
            start,
            goal,
            heuristic: GridHeuristic::default(),
        };
        if let Some(&cell) = space.obstacles.iter().find(|&&cell| !space.contains(cell)) {
            return Err(GridError::OutOfBounds(cell));
        }
        for cell in [start, goal] {
            if !space.contains(cell) {
                return Err(GridError::OutOfBounds(cell));
            }
            if space.obstacles.contains(&cell) {
                return Err(GridError::Blocked(cell));
            }
        }
        Ok(space)
    }

    /// A grid with `obstacle_count` obstacles placed uniformly at random on
    /// cells other than the start and the goal.
    ///
    /// # Errors
    ///
    /// If the start or the goal is not on the grid, or if there is no room
    /// for that many obstacles.
    pub fn random(
        width: usize,
        height: usize,
        obstacle_count: usize,
        start: Cell,
        goal: Cell,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, GridError> {
        let empty = Self::new(width, height, [], start, goal)?;
        let mut free = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(x, y)))
            .filter(|&cell| cell != start && cell != goal)
            .collect::<Vec<_>>();
        if obstacle_count > free.len() {
            return Err(GridError::TooManyObstacles {
                requested: obstacle_count,
                available: free.len(),
            });
        }
        rng.shuffle(&mut free);
        free.truncate(obstacle_count);
        Ok(Self {
            obstacles: free.into_iter().collect(),
            ..empty
        })
    }

    #[must_use]
    pub fn with_heuristic(mut self, heuristic: GridHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    #[must_use]
    pub fn is_open(&self, cell: Cell) -> bool {
        self.contains(cell) && !self.obstacles.contains(&cell)
    }

    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    #[must_use]
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// The neighbour of `cell` in the direction of `step`, if it is open.
    #[must_use]
    pub fn step(&self, cell: Cell, step: Step) -> Option<Cell> {
        let next = match step {
            Step::Up => Cell::new(cell.x, cell.y.checked_sub(1)?),
            Step::Down => Cell::new(cell.x, cell.y + 1),
            Step::Left => Cell::new(cell.x.checked_sub(1)?, cell.y),
            Step::Right => Cell::new(cell.x + 1, cell.y),
        };
        self.is_open(next).then_some(next)
    }

    /// Follows `steps` from the start, or `None` if one of them walks into a
    /// wall or an obstacle.
    #[must_use]
    pub fn walk(&self, steps: &[Step]) -> Option<Cell> {
        steps
            .iter()
            .try_fold(self.start, |cell, &step| self.step(cell, step))
    }
}

impl SearchSpace for GridSpace {
    type State = Cell;
    type Action = Step;

    fn start(&self) -> Cell {
        self.start
    }

    fn successors(&self, &cell: &Cell, history: &[Step]) -> Vec<(Step, Cell)> {
        let undo = history.last().copied().map(Step::opposite);
        Step::ALL
            .into_iter()
            .filter(|&step| Some(step) != undo)
            .filter_map(|step| Some((step, self.step(cell, step)?)))
            .collect()
    }

    fn is_goal(&self, &cell: &Cell) -> bool {
        cell == self.goal
    }

    fn heuristic(&self, &cell: &Cell) -> u32 {
        let dx = cell.x.abs_diff(self.goal.x) as u64;
        let dy = cell.y.abs_diff(self.goal.y) as u64;
        let distance = match self.heuristic {
            GridHeuristic::Manhattan => dx + dy,
            GridHeuristic::Euclidean => (dx * dx + dy * dy).isqrt(),
        };
        u32::try_from(distance).unwrap_or(u32::MAX)
    }
}
