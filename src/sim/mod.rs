//! Deterministic snake simulation
//!
//! All gameplay logic of the snake stage lives here. This module must be pure
//! and deterministic:
//! - Fixed tick only (the platform owns the real timer)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod engine;
pub mod food;
pub mod input;
pub mod state;
pub mod tick;

pub use autopilot::choose_direction;
pub use engine::{SnakeEngine, TimerState};
pub use food::place_food;
pub use input::{SwipeTracker, direction_for_key};
pub use state::{Direction, GridPos, Heading, Rules, SnakeState};
pub use tick::{TickEvent, tick};
