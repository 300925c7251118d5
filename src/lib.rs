//! Evil Aliens - a planetary-defense arcade game
//!
//! Core modules:
//! - `engine`: Clock, asset loader, entity world and frame driver
//! - `game`: The Evil Aliens entities, session rules and HUD
//! - `renderer`: 2D drawing surface (canvas on web, recorder for headless runs)
//! - `platform`: Browser/native platform abstraction
//! - `audio`: Playback of loaded sound assets
//! - `settings`: Persisted engine and player settings

pub mod audio;
pub mod engine;
pub mod error;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;

pub use error::{AssetError, WorldError};
pub use settings::Settings;

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Ceiling on a single clock step (seconds)
    pub const MAX_STEP: f64 = 0.05;
    /// Fallback frame interval when no animation-frame callback exists (~60 Hz)
    pub const FALLBACK_FRAME_MS: i32 = 1000 / 60;

    /// Planet collision radius
    pub const EARTH_RADIUS: f64 = 67.0;
    /// Sentry orbit distance from the planet center
    pub const SENTRY_DISTANCE: f64 = 85.0;

    /// Alien inward speed (pixels/s)
    pub const ALIEN_SPEED: f64 = 100.0;
    /// Points for each alien caught in an explosion
    pub const SCORE_PER_ALIEN: u32 = 10;

    /// Bullet outward speed (pixels/s)
    pub const BULLET_SPEED: f64 = 250.0;
    /// Radial distance a bullet starts travelling from
    pub const BULLET_START_DISTANCE: f64 = 95.0;

    /// Sprite-sheet frame widths
    pub const BULLET_FRAME_WIDTH: f64 = 7.0;
    pub const BULLET_EXPLOSION_FRAME_WIDTH: f64 = 34.0;
    pub const ALIEN_EXPLOSION_FRAME_WIDTH: f64 = 69.0;
    /// Shared frame duration for every sprite animation
    pub const FRAME_DURATION: f64 = 0.05;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn positive_angle(angle: f64) -> f64 {
    angle.rem_euclid(std::f64::consts::TAU)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: DVec2) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Two circles overlap when the squared center distance is below the squared radius sum
#[inline]
pub fn circles_overlap(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}
