//! Surface that records draw calls instead of rasterizing them

use glam::DVec2;

use super::{Rect, Surface, TextStyle};
use crate::engine::ImageHandle;

/// A single recorded surface operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Image { key: String, x: f64, y: f64 },
    ImageRegion { key: String, src: Rect, dst: Rect },
    Circle { center: DVec2, radius: f64, color: String },
    Text { text: String, x: f64, y: f64 },
}

/// In-memory surface for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Commands recorded since the last `Clear`
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Texts drawn in the last frame
    pub fn texts(&self) -> Vec<&str> {
        self.last_frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Image keys drawn in the last frame, in draw order
    pub fn image_keys(&self) -> Vec<&str> {
        self.last_frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Image { key, .. } | DrawCommand::ImageRegion { key, .. } => {
                    Some(key.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64) {
        self.commands.push(DrawCommand::Image {
            key: image.key().to_string(),
            x,
            y,
        });
    }

    fn draw_image_region(&mut self, image: &ImageHandle, src: Rect, dst: Rect) {
        self.commands.push(DrawCommand::ImageRegion {
            key: image.key().to_string(),
            src,
            dst,
        });
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, color: &str) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, _style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::with_rotation_about;

    #[test]
    fn test_last_frame_starts_at_clear() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.fill_text("old", 0.0, 0.0, &TextStyle::new("red", "Arial"));
        surface.clear();
        surface.fill_text("new", 0.0, 0.0, &TextStyle::new("red", "Arial"));
        assert_eq!(surface.texts(), vec!["new"]);
    }

    #[test]
    fn test_rotation_is_balanced() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        with_rotation_about(&mut surface, DVec2::new(5.0, 6.0), 1.0, |_| {});
        assert_eq!(
            surface.commands,
            vec![
                DrawCommand::Save,
                DrawCommand::Translate(5.0, 6.0),
                DrawCommand::Rotate(1.0),
                DrawCommand::Translate(-5.0, -6.0),
                DrawCommand::Restore,
            ]
        );
    }
}
