//! Fixed timestep simulation tick
//!
//! One call advances the snake by one cell. Pure state -> state: no timers,
//! no rendering, randomness only through the supplied RNG.

use rand::Rng;

use super::food::place_food;
use super::state::{Rules, SnakeState};
use crate::error::Result;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Heading is idle; nothing moved
    Idle,
    /// Moved one cell without eating
    Moved,
    /// Ate the food and grew by one segment
    Ate { score: u32 },
    /// Ran into itself; the snake collapsed to the center
    Collided { score: u32, lost: u32 },
    /// Ate the food that reached the win score
    Won { score: u32 },
}

/// Advance the snake state by one tick
pub fn tick(state: &mut SnakeState, rules: &Rules, rng: &mut impl Rng) -> Result<TickEvent> {
    state.time_ticks += 1;

    if state.heading.is_idle() {
        return Ok(TickEvent::Idle);
    }

    let head = state.head().step(state.heading, state.grid_size);

    // Everything behind the current head counts, the tail included
    if state.body.iter().skip(1).any(|&segment| segment == head) {
        let before = state.score;
        state.collapse(rules.collision_penalty);
        if state.occupies(state.food) {
            place_food(state, rng, rules.max_food_attempts)?;
        }
        log::debug!("Self-collision at {:?}, score {} -> {}", head, before, state.score);
        return Ok(TickEvent::Collided {
            score: state.score,
            lost: before - state.score,
        });
    }

    state.body.push_front(head);

    if head != state.food {
        state.body.pop_back();
        return Ok(TickEvent::Moved);
    }

    // Growth only sticks once the next food has somewhere to go
    if let Err(e) = place_food(state, rng, rules.max_food_attempts) {
        state.body.pop_front();
        return Err(e);
    }
    state.score += 1;

    if state.score >= rules.win_score {
        Ok(TickEvent::Won { score: state.score })
    } else {
        Ok(TickEvent::Ate { score: state.score })
    }
}
