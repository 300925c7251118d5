//! Evil Aliens
//!
//! Defend the planet: aliens close in from every direction, the sentry
//! orbiting the planet fires at wherever the player clicks, and each blast
//! takes out every alien it touches.

pub mod actors;
pub mod autopilot;
pub mod manifest;
pub mod session;

pub use actors::{Actor, ActorAssets, Arena};
pub use autopilot::{Autopilot, lead_target};
pub use manifest::{headless_source, queue_all};
pub use session::EvilAliens;
