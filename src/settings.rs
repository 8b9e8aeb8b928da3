//! Settings and preferences
//!
//! Persisted in LocalStorage on the web; natively the defaults are used.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Rules;

/// Text-generation service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorSettings {
    /// Base URL of the generateContent API
    pub endpoint: String,
    pub model: String,
    /// No key, no request: the fallback text is shown instead
    pub api_key: Option<String>,
    /// Give up waiting after this long
    pub timeout_ms: u32,
}

impl Default for FlavorSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-2.5-flash-preview-09-2025".to_string(),
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

/// Experience settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Snake ===
    /// Milliseconds between snake ticks
    pub tick_ms: u32,
    pub grid_size: i32,
    pub win_score: u32,
    pub collision_penalty: u32,
    /// Minimum swipe length (CSS px)
    pub swipe_threshold: f32,

    // === Audio ===
    pub sound: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Accessibility ===
    /// Skip slides, sparks and hearts
    pub reduced_motion: bool,

    pub flavor: FlavorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            grid_size: GRID_SIZE,
            win_score: WIN_SCORE,
            collision_penalty: COLLISION_PENALTY,
            swipe_threshold: SWIPE_THRESHOLD,

            sound: true,
            master_volume: 0.8,

            reduced_motion: false,

            flavor: FlavorSettings::default(),
        }
    }
}

impl Settings {
    /// Clamp values a hand-edited LocalStorage entry could break
    pub fn sanitized(mut self) -> Self {
        self.tick_ms = self.tick_ms.max(16);
        self.grid_size = self.grid_size.clamp(5, 64);
        // The snake needs room to grow to the win length with food still placeable
        self.win_score = self.win_score.clamp(1, (self.grid_size * self.grid_size / 2) as u32);
        self.swipe_threshold = self.swipe_threshold.max(1.0);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.flavor.timeout_ms = self.flavor.timeout_ms.max(500);
        self
    }

    /// Simulation rules derived from these settings
    pub fn rules(&self) -> Rules {
        Rules {
            grid_size: self.grid_size,
            win_score: self.win_score,
            collision_penalty: self.collision_penalty,
            max_food_attempts: MAX_FOOD_ATTEMPTS,
        }
    }

    /// Stage slide durations (exit, enter); zero with reduced motion
    pub fn stage_durations_ms(&self) -> (u32, u32) {
        if self.reduced_motion {
            (0, 0)
        } else {
            (STAGE_EXIT_MS, STAGE_ENTER_MS)
        }
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str::<Self>(json)?.sanitized())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "heart_quest_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
