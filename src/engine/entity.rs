//! Entities and the per-update frame context
//!
//! An entity is anything with a body, an update step and a draw step. Shared
//! geometry lives in the `Body` component rather than in a base type, and the
//! world hands each update a `FrameContext` instead of a back-reference to
//! itself.

use glam::DVec2;

use super::assets::{AssetLoader, SoundHandle};
use super::input::{Extents, InputState};
use crate::circles_overlap;
use crate::polar_to_cartesian;
use crate::renderer::Surface;

/// Position, collision radius and removal flag shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: DVec2,
    /// Collision radius (0 = no collision circle)
    pub radius: f64,
    removal_requested: bool,
}

impl Body {
    pub fn new(position: DVec2, radius: f64) -> Self {
        Self {
            position,
            radius,
            removal_requested: false,
        }
    }

    /// Flag for removal at the end of the current update pass
    pub fn request_removal(&mut self) {
        self.removal_requested = true;
    }

    pub fn removal_requested(&self) -> bool {
        self.removal_requested
    }

    /// Place the body at `r` along angle `theta` from the origin
    pub fn set_polar(&mut self, r: f64, theta: f64) {
        self.position = polar_to_cartesian(r, theta);
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        circles_overlap(self.position, self.radius, other.position, other.radius)
    }

    pub fn is_outside(&self, extents: &Extents) -> bool {
        extents.is_outside(self.position)
    }
}

/// A simulated object owned by a `World`
pub trait Entity: Sized {
    /// Session state every entity may read and mutate (score, lives, ...)
    type Shared;

    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    /// Advance one frame. May flag removal, spawn entities and touch siblings.
    fn update(&mut self, ctx: &mut FrameContext<'_, Self>);

    /// Render without changing simulation state
    fn draw(&self, surface: &mut dyn Surface);

    fn position(&self) -> DVec2 {
        self.body().position
    }

    fn removal_requested(&self) -> bool {
        self.body().removal_requested()
    }

    /// Radius for debug outlines, if the entity has one
    fn radius(&self) -> Option<f64> {
        let r = self.body().radius;
        (r > 0.0).then_some(r)
    }
}

/// Everything an entity can see and affect during its update
pub struct FrameContext<'a, E: Entity> {
    pub(crate) delta: f64,
    pub(crate) game_time: f64,
    pub(crate) input: &'a InputState,
    pub(crate) extents: Extents,
    pub(crate) assets: &'a AssetLoader,
    pub(crate) shared: &'a mut E::Shared,
    pub(crate) sounds: &'a mut Vec<SoundHandle>,
    pub(crate) before: &'a mut [E],
    pub(crate) after: &'a mut [E],
    pub(crate) spawned: &'a mut Vec<E>,
}

impl<E: Entity> FrameContext<'_, E> {
    /// Clamped seconds since the previous frame
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn input(&self) -> &InputState {
        self.input
    }

    pub fn extents(&self) -> Extents {
        self.extents
    }

    pub fn assets(&self) -> &AssetLoader {
        self.assets
    }

    pub fn shared(&self) -> &E::Shared {
        &*self.shared
    }

    pub fn shared_mut(&mut self) -> &mut E::Shared {
        &mut *self.shared
    }

    /// Add an entity to the world.
    ///
    /// It is appended right after the current update returns: later entities
    /// in this pass see it as a sibling, but it is not updated until the next
    /// frame.
    pub fn spawn(&mut self, entity: E) {
        self.spawned.push(entity);
    }

    /// Queue a sound for the host to play after the frame
    pub fn play(&mut self, sound: &SoundHandle) {
        self.sounds.push(sound.clone());
    }

    /// Every other entity in the world, in world order
    pub fn siblings(&self) -> impl Iterator<Item = &E> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn siblings_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.before.iter_mut().chain(self.after.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_body_overlap_uses_radius_sum() {
        let a = Body::new(DVec2::ZERO, 10.0);
        let near = Body::new(DVec2::new(0.0, 19.0), 10.0);
        let far = Body::new(DVec2::new(0.0, 21.0), 10.0);
        assert!(a.overlaps(&near));
        assert!(!a.overlaps(&far));
    }

    #[test]
    fn test_body_polar_placement() {
        let mut body = Body::new(DVec2::ZERO, 0.0);
        body.set_polar(85.0, FRAC_PI_2);
        assert!(body.position.x.abs() < 1e-9);
        assert!((body.position.y - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_removal_flag_is_sticky() {
        let mut body = Body::new(DVec2::ZERO, 1.0);
        assert!(!body.removal_requested());
        body.request_removal();
        body.request_removal();
        assert!(body.removal_requested());
    }

    #[test]
    fn test_outside_extents() {
        let extents = Extents::new(200.0, 100.0);
        assert!(Body::new(DVec2::new(101.0, 0.0), 1.0).is_outside(&extents));
        assert!(!Body::new(DVec2::new(99.0, 49.0), 1.0).is_outside(&extents));
    }
}
