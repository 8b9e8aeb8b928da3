//! Greedy autopilot
//!
//! Steers toward the food along the shortest toroidal route while refusing
//! reversals and cells the snake occupies. Drives the native demo and lets
//! tests play a whole game without a human.

use super::state::{Direction, SnakeState};
use crate::toroidal_distance;

/// Pick the next direction for the snake
pub fn choose_direction(state: &SnakeState) -> Option<Direction> {
    let head = state.head();
    let size = state.grid_size;

    // The tail cell frees up on a non-eating move, but stay conservative
    Direction::ALL
        .into_iter()
        .filter(|dir| !dir.heading().is_reverse_of(state.heading))
        .map(|dir| (dir, head.step(dir.heading(), size)))
        .filter(|(_, cell)| !state.body.iter().skip(1).any(|s| s == cell))
        .min_by_key(|(_, cell)| {
            toroidal_distance(cell.x, state.food.x, size) + toroidal_distance(cell.y, state.food.y, size)
        })
        .map(|(dir, _)| dir)
}
