//! Canvas 2D surface

use glam::DVec2;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use wasm_bindgen::{JsCast, JsValue};

use super::{Rect, Surface, TextStyle};
use crate::engine::ImageHandle;
use crate::platform::web::WebAssetStore;

/// `Surface` over a canvas 2D context; images are resolved from the store
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    canvas: HtmlCanvasElement,
    store: WebAssetStore,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement, store: WebAssetStore) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into()?;
        Ok(Self {
            ctx,
            canvas: canvas.clone(),
            store,
        })
    }

    fn log_failure(what: &str, result: Result<(), JsValue>) {
        if let Err(e) = result {
            log::warn!("{} failed: {:?}", what, e);
        }
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        Self::log_failure("translate", self.ctx.translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        Self::log_failure("rotate", self.ctx.rotate(angle));
    }

    fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64) {
        let Some(element) = self.store.image(image.key()) else {
            return;
        };
        Self::log_failure(
            "drawImage",
            self.ctx.draw_image_with_html_image_element(&element, x, y),
        );
    }

    fn draw_image_region(&mut self, image: &ImageHandle, src: Rect, dst: Rect) {
        let Some(element) = self.store.image(image.key()) else {
            return;
        };
        Self::log_failure(
            "drawImage",
            self.ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    &element, src.x, src.y, src.w, src.h, dst.x, dst.y, dst.w, dst.h,
                ),
        );
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(color);
        Self::log_failure(
            "arc",
            self.ctx
                .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU),
        );
        self.ctx.stroke();
        self.ctx.close_path();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ctx.set_fill_style_str(&style.color);
        self.ctx.set_font(&style.font);
        self.ctx
            .set_text_align(if style.centered { "center" } else { "start" });
        Self::log_failure("fillText", self.ctx.fill_text(text, x, y));
    }
}
