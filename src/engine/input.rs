//! Pointer input and surface extents in world coordinates
//!
//! World coordinates put the origin at the center of the drawing surface.

use glam::DVec2;

/// Latest pointer state, consumed by entities during update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Last pointer-move position (persists until the next move)
    pub mouse: Option<DVec2>,
    /// Click recorded since the last frame (cleared after each frame)
    pub click: Option<DVec2>,
}

impl InputState {
    pub fn record_click(&mut self, pos: DVec2) {
        self.click = Some(pos);
    }

    pub fn record_move(&mut self, pos: DVec2) {
        self.mouse = Some(pos);
    }

    pub fn clear_click(&mut self) {
        self.click = None;
    }
}

/// Translate a client-space pointer position into world coordinates
#[inline]
pub fn client_to_world(client: DVec2, surface_origin: DVec2, surface_size: DVec2) -> DVec2 {
    client - surface_origin - surface_size / 2.0
}

/// Drawing surface dimensions, with the half-extents used for bounds tests
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extents {
    pub width: f64,
    pub height: f64,
}

impl Extents {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// True when the point lies outside the centered half-extent box
    pub fn is_outside(&self, p: DVec2) -> bool {
        p.x > self.half_width()
            || p.x < -self.half_width()
            || p.y > self.half_height()
            || p.y < -self.half_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_world_centers_origin() {
        let origin = DVec2::new(10.0, 20.0);
        let size = DVec2::new(800.0, 600.0);
        assert_eq!(
            client_to_world(DVec2::new(410.0, 320.0), origin, size),
            DVec2::ZERO
        );
        assert_eq!(
            client_to_world(DVec2::new(10.0, 20.0), origin, size),
            DVec2::new(-400.0, -300.0)
        );
    }

    #[test]
    fn test_extents_outside() {
        let extents = Extents::new(800.0, 600.0);
        assert!(!extents.is_outside(DVec2::new(400.0, 300.0)));
        assert!(extents.is_outside(DVec2::new(400.1, 0.0)));
        assert!(extents.is_outside(DVec2::new(0.0, -300.1)));
    }

    #[test]
    fn test_click_clears_but_mouse_persists() {
        let mut input = InputState::default();
        input.record_move(DVec2::new(1.0, 2.0));
        input.record_click(DVec2::new(3.0, 4.0));
        input.clear_click();
        assert_eq!(input.click, None);
        assert_eq!(input.mouse, Some(DVec2::new(1.0, 2.0)));
    }
}
