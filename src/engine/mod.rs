//! Game engine core
//!
//! The reusable part of the game, independent of any concrete entity:
//! - Clamped wall-clock timing
//! - Asset preloading with a single completion callback
//! - Entity world with snapshot update, removal-by-flag and ordered draw
//! - Frame driver rescheduling the world once per display refresh

pub mod animation;
pub mod assets;
pub mod clock;
pub mod driver;
pub mod entity;
pub mod input;
pub mod world;

pub use animation::Animation;
pub use assets::{
    AssetKind, AssetLoader, AssetRequest, AssetSource, ImageHandle, LoadCallback, Loaded,
    LoaderPhase, SoundHandle,
};
pub use clock::Clock;
pub use driver::{FrameDriver, FrameHandler, QueuedScheduler, Scheduler};
pub use entity::{Body, Entity, FrameContext};
pub use input::{Extents, InputState};
pub use world::{World, WorldPhase};
