//! Asset manifest
//!
//! Images are keyed by their path; sounds by a short name.

use crate::engine::AssetLoader;
use crate::error::AssetError;
use crate::platform::HeadlessAssetSource;

pub const ALIEN_EXPLOSION_IMAGE: &str = "img/alien-explosion.png";
pub const ALIEN_IMAGE: &str = "img/alien.png";
pub const BULLET_IMAGE: &str = "img/bullet.png";
pub const EARTH_IMAGE: &str = "img/earth.png";
pub const SENTRY_IMAGE: &str = "img/sentry.png";
pub const EXPLOSION_IMAGE: &str = "img/explosion.png";

pub const ALIEN_BOOM_SOUND: &str = "alien-boom";
pub const BULLET_BOOM_SOUND: &str = "bullet-boom";
pub const BULLET_SOUND: &str = "bullet";

pub const IMAGES: [&str; 6] = [
    ALIEN_EXPLOSION_IMAGE,
    ALIEN_IMAGE,
    BULLET_IMAGE,
    EARTH_IMAGE,
    SENTRY_IMAGE,
    EXPLOSION_IMAGE,
];

/// (key, path)
pub const SOUNDS: [(&str, &str); 3] = [
    (ALIEN_BOOM_SOUND, "audio/alien_boom.mp3"),
    (BULLET_BOOM_SOUND, "audio/bullet_boom.mp3"),
    (BULLET_SOUND, "audio/bullet.mp3"),
];

/// Pixel sizes of the shipped sprites (width, height), used when running
/// without a browser
pub const SPRITE_SIZES: [(&str, f64, f64); 6] = [
    (ALIEN_EXPLOSION_IMAGE, 690.0, 69.0),
    (ALIEN_IMAGE, 40.0, 40.0),
    (BULLET_IMAGE, 28.0, 14.0),
    (EARTH_IMAGE, 134.0, 134.0),
    (SENTRY_IMAGE, 32.0, 32.0),
    (EXPLOSION_IMAGE, 272.0, 34.0),
];

/// Queue every image and sound the game uses
pub fn queue_all(loader: &AssetLoader) -> Result<(), AssetError> {
    for path in IMAGES {
        loader.queue_image(path)?;
    }
    for (key, path) in SOUNDS {
        loader.queue_sound(key, path)?;
    }
    Ok(())
}

/// Catalog source answering for the whole manifest
pub fn headless_source() -> HeadlessAssetSource {
    let source = SPRITE_SIZES
        .iter()
        .fold(HeadlessAssetSource::new(), |source, &(key, w, h)| {
            source.with_image(key, w, h)
        });
    SOUNDS
        .iter()
        .fold(source, |source, &(key, _)| source.with_sound(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_manifest_loads_completely_headless() {
        let loader = AssetLoader::new();
        queue_all(&loader).unwrap();
        assert_eq!(loader.pending_count(), IMAGES.len() + SOUNDS.len());

        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        loader
            .load_all(&headless_source(), move || flag.set(true))
            .unwrap();

        assert!(done.get());
        assert_eq!(loader.error_count(), 0);
        assert_eq!(loader.image(EARTH_IMAGE).unwrap().height(), 134.0);
        assert!(loader.sound(BULLET_SOUND).is_ok());
    }

    #[test]
    fn test_queue_all_twice_is_rejected() {
        let loader = AssetLoader::new();
        queue_all(&loader).unwrap();
        assert_eq!(
            queue_all(&loader),
            Err(AssetError::DuplicateKey(ALIEN_EXPLOSION_IMAGE.to_string()))
        );
    }
}
