//! Heart Quest - a snake-gated, stage-by-stage love letter
//!
//! Core modules:
//! - `sim`: Deterministic snake simulation (grid, input mapping, tick, engine)
//! - `stage`: Stage sequencer plus the content logic of each panel
//! - `experience`: Orchestrator wiring one engine to one sequencer
//! - `render`: Pure projection of the snake grid into draw commands
//! - `flavor`: Text-generation client for the letter's flavor text
//! - `platform`: Browser glue (DOM, timers, audio)

pub mod error;
pub mod experience;
pub mod flavor;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;
pub mod stage;

pub use error::{Error, Result};
pub use experience::{Effect, Experience};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Cells per grid side
    pub const GRID_SIZE: i32 = 15;
    /// Score that ends the snake stage
    pub const WIN_SCORE: u32 = 10;
    /// Points lost on self-collision (floored at zero)
    pub const COLLISION_PENALTY: u32 = 2;
    /// Fixed tick period of the snake game
    pub const TICK_MS: u32 = 100;
    /// Food rejection sampling cap; only a near-full grid can hit it
    pub const MAX_FOOD_ATTEMPTS: u32 = 10_000;

    /// Minimum swipe displacement (CSS pixels) before a direction is recognized
    pub const SWIPE_THRESHOLD: f32 = 10.0;

    /// Stage slide-out / slide-in durations
    pub const STAGE_EXIT_MS: u32 = 500;
    pub const STAGE_ENTER_MS: u32 = 600;
    /// Horizontal slide distance for stage transitions (px)
    pub const STAGE_SLIDE_PX: f32 = 100.0;

    /// Delay between accepting the choice and entering the certificate
    pub const CHOICE_TO_CERT_MS: u32 = 1500;
    /// Delay between the certificate reveal and the spark burst
    pub const CERT_SPARK_DELAY_MS: u32 = 600;
    pub const SPARK_COUNT: usize = 40;
    /// Progress bar fill time on the loading stage
    pub const LOADING_MS: u32 = 3000;
    /// Flap + paper animation before the letter appears
    pub const ENVELOPE_OPEN_MS: u32 = 1200;
    pub const PARALLAX_HEART_COUNT: usize = 20;
    /// Padding kept around the dodging "no" button (px)
    pub const DODGE_PADDING: f32 = 15.0;
}

/// Wrap a coordinate onto a toroidal axis of `size` cells
#[inline]
pub fn wrap(v: i32, size: i32) -> i32 {
    v.rem_euclid(size)
}

/// Shortest distance between two coordinates on a toroidal axis
#[inline]
pub fn toroidal_distance(a: i32, b: i32, size: i32) -> i32 {
    let d = wrap(a - b, size);
    d.min(size - d)
}
