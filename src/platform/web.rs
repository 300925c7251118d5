//! Browser platform: DOM asset fetching, frame scheduling and pointer input

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::DVec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    EventTarget, HtmlAudioElement, HtmlCanvasElement, HtmlImageElement, MouseEvent, PageTransitionEvent,
    Window,
};

use crate::consts::FALLBACK_FRAME_MS;
use crate::engine::input::client_to_world;
use crate::engine::{AssetKind, AssetRequest, AssetSource, LoadCallback, Loaded, Scheduler};

#[derive(Default)]
struct StoreInner {
    images: HashMap<String, HtmlImageElement>,
    sounds: HashMap<String, HtmlAudioElement>,
}

/// DOM elements backing loaded assets, keyed like the loader's handles.
///
/// Clones share the same elements.
#[derive(Clone, Default)]
pub struct WebAssetStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl WebAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self, key: &str) -> Option<HtmlImageElement> {
        self.inner.borrow().images.get(key).cloned()
    }

    pub fn sound(&self, key: &str) -> Option<HtmlAudioElement> {
        self.inner.borrow().sounds.get(key).cloned()
    }
}

type Pending = Rc<RefCell<Option<LoadCallback>>>;

/// Hand the outcome to the loader at most once (load and error may both fire)
fn settle(pending: &Pending, result: Result<Loaded, String>) {
    let done = pending.borrow_mut().take();
    if let Some(done) = done {
        done(result);
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut()>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Fetches images and sounds through `<img>` and `<audio>` elements
#[derive(Clone, Default)]
pub struct WebAssetSource {
    store: WebAssetStore,
}

impl WebAssetSource {
    pub fn new(store: WebAssetStore) -> Self {
        Self { store }
    }

    fn load_image(&self, request: &AssetRequest, pending: &Pending) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        {
            let pending = pending.clone();
            let loaded = image.clone();
            listen(&image, "load", move || {
                settle(
                    &pending,
                    Ok(Loaded::Image {
                        width: loaded.natural_width() as f64,
                        height: loaded.natural_height() as f64,
                    }),
                )
            })?;
        }
        {
            let pending = pending.clone();
            let source = request.source.clone();
            listen(&image, "error", move || {
                settle(&pending, Err(format!("could not load image {}", source)))
            })?;
        }
        image.set_src(&request.source);
        self.store
            .inner
            .borrow_mut()
            .images
            .insert(request.key.clone(), image);
        Ok(())
    }

    fn load_sound(&self, request: &AssetRequest, pending: &Pending) -> Result<(), JsValue> {
        let audio = HtmlAudioElement::new_with_src(&request.source)?;
        {
            let pending = pending.clone();
            listen(&audio, "canplaythrough", move || {
                settle(&pending, Ok(Loaded::Sound))
            })?;
        }
        {
            let pending = pending.clone();
            let source = request.source.clone();
            listen(&audio, "error", move || {
                settle(&pending, Err(format!("could not load sound {}", source)))
            })?;
        }
        audio.load();
        self.store
            .inner
            .borrow_mut()
            .sounds
            .insert(request.key.clone(), audio);
        Ok(())
    }
}

impl AssetSource for WebAssetSource {
    fn load(&self, request: &AssetRequest, done: LoadCallback) {
        log::debug!("Fetching {}", request.source);
        let pending: Pending = Rc::new(RefCell::new(Some(done)));
        let started = match request.kind {
            AssetKind::Image => self.load_image(request, &pending),
            AssetKind::Sound => self.load_sound(request, &pending),
        };
        if let Err(e) = started {
            settle(&pending, Err(describe(&e)));
        }
    }
}

/// Runs callbacks on `requestAnimationFrame`
pub struct AnimationFrameScheduler {
    window: Window,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for AnimationFrameScheduler {
    fn schedule(&self, callback: Box<dyn FnOnce()>) {
        let closure = Closure::once(move || callback());
        if let Err(e) = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            log::error!("requestAnimationFrame failed: {}", describe(&e));
        }
        closure.forget();
    }
}

/// Runs callbacks on a ~60 Hz `setTimeout`
pub struct TimeoutScheduler {
    window: Window,
}

impl TimeoutScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, callback: Box<dyn FnOnce()>) {
        let closure = Closure::once(move || callback());
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                FALLBACK_FRAME_MS,
            )
        {
            log::error!("setTimeout failed: {}", describe(&e));
        }
        closure.forget();
    }
}

/// Animation-frame scheduling when the browser has it, a timer otherwise
pub fn best_scheduler(window: Window) -> Rc<dyn Scheduler> {
    let has_raf = js_sys::Reflect::has(&window, &JsValue::from_str("requestAnimationFrame"))
        .unwrap_or(false);
    if has_raf {
        Rc::new(AnimationFrameScheduler::new(window))
    } else {
        log::warn!("requestAnimationFrame unavailable, falling back to a timer");
        Rc::new(TimeoutScheduler::new(window))
    }
}

/// Pointer position relative to the canvas center
pub fn event_to_world(canvas: &HtmlCanvasElement, event: &MouseEvent) -> DVec2 {
    let rect = canvas.get_bounding_client_rect();
    client_to_world(
        DVec2::new(event.client_x() as f64, event.client_y() as f64),
        DVec2::new(rect.left(), rect.top()),
        DVec2::new(canvas.width() as f64, canvas.height() as f64),
    )
}

/// Forward pointer events on `canvas` to `handler` in world coordinates
pub fn on_pointer(
    canvas: &HtmlCanvasElement,
    event: &str,
    mut handler: impl FnMut(DVec2) + 'static,
) -> Result<(), JsValue> {
    let target = canvas.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |e: MouseEvent| {
        if event_is_click(&e) {
            e.stop_propagation();
            e.prevent_default();
        }
        handler(event_to_world(&target, &e));
    });
    canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn event_is_click(event: &MouseEvent) -> bool {
    event.type_() == "click"
}

/// Run `handler` whenever the page is hidden for unload or the back/forward cache
pub fn on_page_hide(window: &Window, handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    listen(window, "pagehide", handler)
}

/// Run `handler` whenever the page is shown, with whether it came back from
/// the back/forward cache
pub fn on_page_show(window: &Window, mut handler: impl FnMut(bool) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |e: PageTransitionEvent| handler(e.persisted()));
    window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
