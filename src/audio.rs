//! Sound playback
//!
//! Plays sound assets queued by entities during a frame. In the browser each
//! cue clones the preloaded `<audio>` element so overlapping cues don't cut
//! each other off; natively cues are only counted.

use crate::engine::SoundHandle;
use crate::settings::Settings;

#[cfg(target_arch = "wasm32")]
use crate::platform::web::WebAssetStore;

/// Audio manager for the game
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Cues actually played (not muted)
    played: u64,
    #[cfg(target_arch = "wasm32")]
    store: WebAssetStore,
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new(store: WebAssetStore) -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            played: 0,
            store,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            played: 0,
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn played(&self) -> u64 {
        self.played
    }

    /// Play one sound cue
    pub fn play(&mut self, sound: &SoundHandle) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::debug!("Playing {}", sound.key());
        self.played += 1;

        #[cfg(target_arch = "wasm32")]
        self.play_element(sound.key(), vol);
    }

    /// Play every cue from a frame, in order
    pub fn play_all<'a>(&mut self, sounds: impl IntoIterator<Item = &'a SoundHandle>) {
        for sound in sounds {
            self.play(sound);
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn play_element(&self, key: &str, vol: f32) {
        use wasm_bindgen::JsCast;
        use web_sys::HtmlAudioElement;

        let Some(element) = self.store.sound(key) else {
            log::warn!("Sound {} was never loaded", key);
            return;
        };
        let cue: HtmlAudioElement = match element.clone_node() {
            Ok(node) => node.unchecked_into(),
            Err(e) => {
                log::warn!("Could not clone sound {}: {:?}", key, e);
                return;
            }
        };
        cue.set_volume(vol as f64);
        // Autoplay may be blocked until the first user gesture
        if let Err(e) = cue.play() {
            log::debug!("Sound {} did not play: {:?}", key, e);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_muted_cues_are_dropped() {
        let mut audio = AudioManager::new();
        let boom = SoundHandle::new("bullet-boom");
        audio.play(&boom);
        audio.set_muted(true);
        audio.play(&boom);
        assert_eq!(audio.played(), 1);
        assert_eq!(audio.effective_volume(), 0.0);
    }

    #[test]
    fn test_settings_are_clamped() {
        let mut audio = AudioManager::new();
        let mut settings = Settings::default();
        settings.master_volume = 2.0;
        settings.sfx_volume = 0.5;
        audio.apply_settings(&settings);
        assert_eq!(audio.effective_volume(), 0.5);

        audio.set_sfx_volume(0.0);
        audio.play_all(&[SoundHandle::new("bullet")]);
        assert_eq!(audio.played(), 0);
    }
}
