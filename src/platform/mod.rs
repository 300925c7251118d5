//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Asset fetching (DOM image/audio elements on web, a fixed catalog headless)
//! - Frame scheduling and input events (web only)

pub mod headless;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::HeadlessAssetSource;
pub use time::{ManualTime, TimeSource, WallClock};
