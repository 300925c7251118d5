//! 2D drawing surface
//!
//! Everything the engine draws goes through the `Surface` trait: a raster
//! target with a transform stack and sprite-sheet blits. The browser backs it
//! with a canvas 2D context; headless runs and tests use `RecordingSurface`.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCommand, RecordingSurface};

use glam::DVec2;

use crate::engine::ImageHandle;

/// Axis-aligned rectangle (source or destination region)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Text fill style
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: String,
    pub font: String,
    /// Center horizontally on x instead of starting at it
    pub centered: bool,
}

impl TextStyle {
    pub fn new(color: &str, font: &str) -> Self {
        Self {
            color: color.to_string(),
            font: font.to_string(),
            centered: false,
        }
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }
}

/// Abstract 2D raster surface
pub trait Surface {
    /// Surface size in pixels (width, height)
    fn size(&self) -> (f64, f64);
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, angle: f64);
    /// Draw a whole image with its top-left corner at (x, y)
    fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64);
    /// Draw the `src` region of an image scaled into `dst`
    fn draw_image_region(&mut self, image: &ImageHandle, src: Rect, dst: Rect);
    fn stroke_circle(&mut self, center: DVec2, radius: f64, color: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

/// Draw an image centered on `pos`
pub fn draw_centered(surface: &mut dyn Surface, image: &ImageHandle, pos: DVec2) {
    surface.draw_image(
        image,
        pos.x - image.width() / 2.0,
        pos.y - image.height() / 2.0,
    );
}

/// Run `draw` with the surface rotated by `angle` around `pos`
pub fn with_rotation_about(
    surface: &mut dyn Surface,
    pos: DVec2,
    angle: f64,
    draw: impl FnOnce(&mut dyn Surface),
) {
    surface.save();
    surface.translate(pos.x, pos.y);
    surface.rotate(angle);
    surface.translate(-pos.x, -pos.y);
    draw(&mut *surface);
    surface.restore();
}
