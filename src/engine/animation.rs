//! Sprite-sheet animation
//!
//! A sheet is a single horizontal strip of equally wide frames. The frame
//! count is `sheet_width / frame_width`; each frame is shown for
//! `frame_duration` seconds.

use glam::DVec2;

use super::assets::ImageHandle;
use crate::renderer::{Rect, Surface};

#[derive(Debug, Clone)]
pub struct Animation {
    sheet: ImageHandle,
    frame_width: f64,
    frame_duration: f64,
    total_time: f64,
    elapsed: f64,
    looping: bool,
}

impl Animation {
    pub fn new(sheet: ImageHandle, frame_width: f64, frame_duration: f64, looping: bool) -> Self {
        let frames = (sheet.width() / frame_width).floor().max(1.0);
        Self {
            total_time: frames * frame_duration,
            sheet,
            frame_width,
            frame_duration,
            elapsed: 0.0,
            looping,
        }
    }

    /// Advance by `dt` seconds; a looping animation wraps back to its first frame
    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
        if self.looping && self.is_done() {
            self.elapsed = 0.0;
        }
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.total_time
    }

    pub fn current_frame(&self) -> usize {
        (self.elapsed / self.frame_duration).floor() as usize
    }

    pub fn frame_count(&self) -> usize {
        (self.total_time / self.frame_duration).round() as usize
    }

    pub fn frame_width(&self) -> f64 {
        self.frame_width
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Draw the current frame centered on `pos`, scaled by `scale`.
    ///
    /// A finished one-shot animation draws nothing.
    pub fn draw(&self, surface: &mut dyn Surface, pos: DVec2, scale: f64) {
        if self.is_done() {
            return;
        }
        let height = self.sheet.height();
        let src = Rect::new(
            self.current_frame() as f64 * self.frame_width,
            0.0,
            self.frame_width,
            height,
        );
        let w = self.frame_width * scale;
        let h = height * scale;
        let dst = Rect::new(pos.x - w / 2.0, pos.y - h / 2.0, w, h);
        surface.draw_image_region(&self.sheet, src, dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingSurface};

    fn explosion(looping: bool) -> Animation {
        // 8 frames of 34px
        Animation::new(ImageHandle::new("img/explosion.png", 272.0, 34.0), 34.0, 0.05, looping)
    }

    #[test]
    fn test_frame_index_follows_elapsed_time() {
        let mut anim = explosion(false);
        assert_eq!(anim.frame_count(), 8);
        assert_eq!(anim.current_frame(), 0);
        anim.advance(0.12);
        assert_eq!(anim.current_frame(), 2);
        assert!(!anim.is_done());
    }

    #[test]
    fn test_one_shot_finishes_and_stops_drawing() {
        let mut anim = explosion(false);
        anim.advance(0.41);
        assert!(anim.is_done());

        let mut surface = RecordingSurface::new(100.0, 100.0);
        anim.draw(&mut surface, DVec2::ZERO, 1.0);
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn test_looping_wraps_to_start() {
        let mut anim = explosion(true);
        anim.advance(0.39);
        assert_eq!(anim.current_frame(), 7);
        anim.advance(0.02);
        assert!(!anim.is_done());
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn test_draw_scales_around_center() {
        let mut anim = explosion(false);
        anim.advance(0.05);
        let mut surface = RecordingSurface::new(100.0, 100.0);
        anim.draw(&mut surface, DVec2::new(10.0, 10.0), 2.0);
        assert_eq!(
            surface.commands,
            vec![DrawCommand::ImageRegion {
                key: "img/explosion.png".to_string(),
                src: Rect::new(34.0, 0.0, 34.0, 34.0),
                dst: Rect::new(-24.0, -24.0, 68.0, 68.0),
            }]
        );
    }
}
