//! Food placement
//!
//! Uniform rejection sampling over the whole grid. The snake never gets close
//! to filling a grid before the win score ends the stage, so the retry cap is
//! a safety net rather than a tuning knob.

use rand::Rng;

use super::state::{GridPos, SnakeState};
use crate::error::{Error, Result};

/// Pick a free cell for the food and store it in `state.food`
pub fn place_food(state: &mut SnakeState, rng: &mut impl Rng, max_attempts: u32) -> Result<GridPos> {
    let size = state.grid_size;
    for _ in 0..max_attempts {
        let candidate = GridPos::new(rng.random_range(0..size), rng.random_range(0..size));
        if !state.occupies(candidate) {
            state.food = candidate;
            return Ok(candidate);
        }
    }

    log::error!(
        "Food placement gave up after {} attempts ({} of {} cells occupied)",
        max_attempts,
        state.len(),
        size * size
    );
    Err(Error::GridSaturated {
        attempts: max_attempts,
        occupied: state.len(),
    })
}
