//! Engine and player settings
//!
//! Persisted as JSON in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_STEP;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Engine ===
    /// Ceiling on a single clock step (seconds)
    pub max_step: f64,
    /// Stroke each entity's collision circle
    pub show_outlines: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Rules ===
    pub starting_lives: u32,
    /// Game seconds between alien spawns
    pub alien_spawn_interval: f64,
    /// Fixed RNG seed (wall time when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_step: MAX_STEP,
            show_outlines: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            starting_lives: 10,
            alien_spawn_interval: 1.0,
            seed: None,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "evil_aliens_settings";

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Parse stored JSON, falling back to defaults for anything missing
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.set_master_volume(settings.master_volume);
        settings.set_sfx_volume(settings.sfx_volume);
        if settings.max_step <= 0.0 || !settings.max_step.is_finite() {
            log::warn!("Ignoring invalid max_step {}", settings.max_step);
            settings.max_step = MAX_STEP;
        }
        settings.alien_spawn_interval = settings.alien_spawn_interval.max(0.0);
        Ok(settings)
    }

    /// JSON form written to LocalStorage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

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
                    Err(e) => log::warn!("Discarding stored settings: {}", e),
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
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Could not serialize settings: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No {} store on native, using defaults", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
