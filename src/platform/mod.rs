//! Platform abstraction layer
//!
//! Browser-only glue used by the wasm entry point:
//! - DOM lookups and the stage slide animation
//! - Interval / timeout timers
//! - Web Audio cues

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod timer;
