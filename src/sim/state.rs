//! Snake state and core simulation types
//!
//! Everything the tick function reads or writes lives here.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::wrap;

/// A cell on the toroidal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center cell of a grid (integer division, 7,7 for a 15 grid)
    pub const fn center(grid_size: i32) -> Self {
        Self::new(grid_size / 2, grid_size / 2)
    }

    /// Step one cell along `heading`, wrapping both axes
    pub fn step(self, heading: Heading, grid_size: i32) -> Self {
        Self::new(
            wrap(self.x + heading.dx, grid_size),
            wrap(self.y + heading.dy, grid_size),
        )
    }

    pub fn in_bounds(self, grid_size: i32) -> bool {
        (0..grid_size).contains(&self.x) && (0..grid_size).contains(&self.y)
    }
}

/// One of the four input directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Heading in screen coordinates (y grows downward)
    pub const fn heading(self) -> Heading {
        match self {
            Direction::Up => Heading::new(0, -1),
            Direction::Down => Heading::new(0, 1),
            Direction::Left => Heading::new(-1, 0),
            Direction::Right => Heading::new(1, 0),
        }
    }
}

/// Movement vector of the snake head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Heading {
    pub dx: i32,
    pub dy: i32,
}

impl Heading {
    /// Not moving (fresh game or after a collision)
    pub const IDLE: Heading = Heading::new(0, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_idle(self) -> bool {
        self == Self::IDLE
    }

    pub fn reversed(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }

    /// True when `other` points exactly the opposite way
    pub fn is_reverse_of(self, other: Heading) -> bool {
        self == other.reversed()
    }
}

impl From<Direction> for Heading {
    fn from(dir: Direction) -> Self {
        dir.heading()
    }
}

/// Tunable rules of the snake stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub grid_size: i32,
    pub win_score: u32,
    pub collision_penalty: u32,
    pub max_food_attempts: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            win_score: WIN_SCORE,
            collision_penalty: COLLISION_PENALTY,
            max_food_attempts: MAX_FOOD_ATTEMPTS,
        }
    }
}

/// Complete snake state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeState {
    /// Side length of the square grid
    pub grid_size: i32,
    /// Segments, head first
    pub body: VecDeque<GridPos>,
    pub heading: Heading,
    /// Never on a body cell
    pub food: GridPos,
    pub score: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl SnakeState {
    /// A single centered segment, idle, scoreless
    ///
    /// Food starts in the lower-right quadrant; callers that want it random
    /// run the food placer right after.
    pub fn new(grid_size: i32) -> Self {
        let food = GridPos::new(grid_size * 2 / 3, grid_size * 2 / 3);
        Self {
            grid_size,
            body: VecDeque::from([GridPos::center(grid_size)]),
            heading: Heading::IDLE,
            food,
            score: 0,
            time_ticks: 0,
        }
    }

    /// Build a state from an explicit body (head first)
    pub fn with_body(grid_size: i32, body: impl IntoIterator<Item = GridPos>, heading: Heading) -> Self {
        let mut state = Self::new(grid_size);
        let body: VecDeque<GridPos> = body.into_iter().collect();
        if !body.is_empty() {
            state.body = body;
        }
        state.heading = heading;
        state
    }

    pub fn head(&self) -> GridPos {
        // body is never empty
        self.body.front().copied().unwrap_or(GridPos::center(self.grid_size))
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: GridPos) -> bool {
        self.body.contains(&pos)
    }

    /// Replace the heading unless it is the exact reverse of the current one
    ///
    /// Returns whether the heading was accepted.
    pub fn set_heading(&mut self, heading: Heading) -> bool {
        if heading.is_reverse_of(self.heading) {
            return false;
        }
        self.heading = heading;
        true
    }

    /// Collapse to a single center segment after a self-collision
    pub fn collapse(&mut self, penalty: u32) {
        self.body.clear();
        self.body.push_back(GridPos::center(self.grid_size));
        self.heading = Heading::IDLE;
        self.score = self.score.saturating_sub(penalty);
    }
}
